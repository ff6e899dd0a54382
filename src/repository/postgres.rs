use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::{NoTls, Row, config::SslMode};

use super::{NoteStore, StoreError, embedded::migrations};
use crate::models::{NewNote, Note, NoteId, NotePatch};

const LIST_NOTES: &str =
    "SELECT id, title, content, created_at, updated_at FROM notes ORDER BY id DESC";
const GET_NOTE: &str = "SELECT id, title, content, created_at, updated_at FROM notes WHERE id = $1";
const INSERT_NOTE: &str = "INSERT INTO notes (title, content) VALUES ($1, $2) \
     RETURNING id, title, content, created_at, updated_at";
// NULL parameters keep the stored column; the trigger bumps updated_at.
const UPDATE_NOTE: &str = "UPDATE notes \
     SET title = COALESCE($1, title), content = COALESCE($2, content) \
     WHERE id = $3 \
     RETURNING id, title, content, created_at, updated_at";
const DELETE_NOTE: &str = "DELETE FROM notes WHERE id = $1";

pub struct PgNoteStore {
    pool: Pool,
}

impl PgNoteStore {
    /// Builds the connection pool. Connections are opened on first use, and a
    /// connection that fails its recycle check is replaced with a fresh one.
    pub fn new(database_url: &str, ssl: bool, pool_size: usize) -> Result<Self, StoreError> {
        let mut pg_config: tokio_postgres::Config = database_url.parse()?;
        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Verified,
        };

        let manager = if ssl {
            // Encrypted but unverified, like sslmode=require.
            let connector = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .build()?;
            pg_config.ssl_mode(SslMode::Require);
            Manager::from_config(pg_config, MakeTlsConnector::new(connector), manager_config)
        } else {
            Manager::from_config(pg_config, NoTls, manager_config)
        };

        let pool = Pool::builder(manager).max_size(pool_size).build()?;

        tracing::info!(
            "Database pool configured (max size {}, tls {})",
            pool_size,
            if ssl { "on" } else { "off" }
        );

        Ok(Self { pool })
    }

    /// Ensures the `notes` table and its `updated_at` trigger exist.
    ///
    /// Safe to run on every start: applied versions are skipped, and the DDL
    /// itself checks for existing objects.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        let mut client = self.pool.get().await?;
        let migrations_report = migrations::runner().run_async(&mut **client).await?;

        for migration in migrations_report.applied_migrations() {
            tracing::info!(
                "Migration Applied -  Name: {}, Version: {}",
                migration.name(),
                migration.version()
            );
        }

        tracing::info!("DB schema ready");

        Ok(())
    }
}

fn note_from_row(row: &Row) -> Result<Note, tokio_postgres::Error> {
    Ok(Note {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn list(&self) -> Result<Vec<Note>, StoreError> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(LIST_NOTES).await?;
        let rows = client.query(&statement, &[]).await?;

        let notes = rows
            .iter()
            .map(note_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notes)
    }

    async fn get(&self, id: NoteId) -> Result<Option<Note>, StoreError> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(GET_NOTE).await?;
        let row = client.query_opt(&statement, &[&id]).await?;

        Ok(row.as_ref().map(note_from_row).transpose()?)
    }

    async fn create(&self, note: NewNote) -> Result<Note, StoreError> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(INSERT_NOTE).await?;
        let row = client
            .query_one(&statement, &[&note.title, &note.content])
            .await?;

        Ok(note_from_row(&row)?)
    }

    async fn update(&self, id: NoteId, patch: NotePatch) -> Result<Option<Note>, StoreError> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(UPDATE_NOTE).await?;
        let row = client
            .query_opt(&statement, &[&patch.title, &patch.content, &id])
            .await?;

        Ok(row.as_ref().map(note_from_row).transpose()?)
    }

    async fn delete(&self, id: NoteId) -> Result<bool, StoreError> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(DELETE_NOTE).await?;
        let rows = client.execute(&statement, &[&id]).await?;

        Ok(rows == 1)
    }
}
