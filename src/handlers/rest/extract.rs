use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{HeaderMap, header::CONTENT_TYPE, request::Parts},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{models::NoteId, service::ServiceError};

pub const INVALID_BODY: &str = "request body must be a JSON object";
pub const INVALID_ID: &str = "invalid note id";

/// `{id}` path segment parsed as a note id, rejected with a JSON 400.
pub struct NotePath(pub NoteId);

impl<S> FromRequestParts<S> for NotePath
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<NoteId>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(e) => {
                tracing::debug!("rejected note id: {e}");
                Err(ServiceError::Validation(INVALID_ID.to_string()).into_response())
            }
        }
    }
}

/// JSON body that must be an object. An empty body, or a body sent without a JSON
/// content type, reads as `{}`.
pub struct JsonObject<T>(pub T);

impl<S, T> FromRequest<S> for JsonObject<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !has_json_content_type(req.headers()) {
            return parse_json_object(&[]).map(Self).map_err(IntoResponse::into_response);
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        parse_json_object(&body)
            .map(Self)
            .map_err(IntoResponse::into_response)
    }
}

/// `application/json` or any `+json` media type, parameters ignored.
fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

fn parse_json_object<T: DeserializeOwned>(body: &[u8]) -> Result<T, ServiceError> {
    let invalid = || ServiceError::Validation(INVALID_BODY.to_string());

    let value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Object(Map::new())
    } else {
        serde_json::from_slice(body).map_err(|e| {
            tracing::debug!("malformed JSON body: {e}");
            invalid()
        })?
    };

    if !value.is_object() {
        return Err(invalid());
    }

    serde_json::from_value(value).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::UpdateNoteRequest;

    #[test]
    fn empty_body_is_an_empty_object() {
        let request: UpdateNoteRequest = parse_json_object(b"  \n").unwrap();
        assert_eq!(request.title, None);
        assert_eq!(request.content, None);
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        let bodies: [&[u8]; 4] = [b"[1, 2]", b"\"title\"", b"null", b"{not json"];
        for body in bodies {
            let err = parse_json_object::<UpdateNoteRequest>(body).unwrap_err();
            assert!(matches!(err, ServiceError::Validation(ref msg) if msg == INVALID_BODY));
        }
    }

    #[test]
    fn only_json_media_types_are_parsed() {
        let content_type = |value: &str| {
            let mut headers = HeaderMap::new();
            headers.insert(CONTENT_TYPE, value.parse().unwrap());
            headers
        };

        for json in [
            "application/json",
            "application/json; charset=utf-8",
            "Application/JSON",
            "application/merge-patch+json",
        ] {
            assert!(has_json_content_type(&content_type(json)), "{json}");
        }

        for other in ["text/plain", "application/x-www-form-urlencoded", "text/json+x"] {
            assert!(!has_json_content_type(&content_type(other)), "{other}");
        }

        assert!(!has_json_content_type(&HeaderMap::new()));
    }
}
