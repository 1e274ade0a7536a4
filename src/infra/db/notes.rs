use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{CreateNoteParams, NotesRepo, RepoError, UpdateNoteParams},
    domain::entities::NoteRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct NoteRow {
    id: Uuid,
    title: String,
    content: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<NoteRow> for NoteRecord {
    fn from(row: NoteRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl NotesRepo for PostgresRepositories {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<NoteRecord>, RepoError> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT id, title, content, created_at, updated_at
            FROM notes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(NoteRecord::from))
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<NoteRecord>, RepoError> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT id, title, content, created_at, updated_at
            FROM notes
            WHERE title = $1
            "#,
        )
        .bind(title)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(NoteRecord::from))
    }

    async fn list_all(&self) -> Result<Vec<NoteRecord>, RepoError> {
        let rows = sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT id, title, content, created_at, updated_at
            FROM notes
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(NoteRecord::from).collect())
    }

    async fn create_note(&self, params: CreateNoteParams) -> Result<NoteRecord, RepoError> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            INSERT INTO notes (title, content)
            VALUES ($1, $2)
            RETURNING id, title, content, created_at, updated_at
            "#,
        )
        .bind(&params.title)
        .bind(&params.content)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_note(
        &self,
        params: UpdateNoteParams,
    ) -> Result<Option<NoteRecord>, RepoError> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            UPDATE notes
            SET title = $2,
                content = $3,
                updated_at = now()
            WHERE id = $1
            RETURNING id, title, content, created_at, updated_at
            "#,
        )
        .bind(params.id)
        .bind(&params.title)
        .bind(&params.content)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(NoteRecord::from))
    }

    async fn delete_note(&self, id: Uuid) -> Result<Option<NoteRecord>, RepoError> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            DELETE FROM notes
            WHERE id = $1
            RETURNING id, title, content, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(NoteRecord::from))
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        self.ping().await.map_err(map_sqlx_error)
    }
}
