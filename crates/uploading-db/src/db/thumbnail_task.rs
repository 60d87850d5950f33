use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uploading_core::models::{TaskStatus, ThumbnailTask};
use uploading_core::AppError;
use uuid::Uuid;

use crate::traits::ThumbnailScheduler;

/// Channel name for PostgreSQL LISTEN/NOTIFY when a thumbnail task is created.
pub const THUMBNAIL_NOTIFY_CHANNEL: &str = "uploading_thumbnail_task";

/// Repository for the `thumbnail_tasks` queue table
#[derive(Clone)]
pub struct ThumbnailTaskRepository {
    pool: PgPool,
}

impl ThumbnailTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ThumbnailScheduler for ThumbnailTaskRepository {
    async fn schedule_thumbnail(&self, media_id: i32) -> Result<ThumbnailTask, AppError> {
        let task_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO thumbnail_tasks (id, media_id, status)
            VALUES ($1, $2, 'pending')
            RETURNING created_at
            "#,
        )
        .bind(task_id)
        .bind(media_id)
        .fetch_one(&mut *tx)
        .await?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        // Delivered on commit, so the worker never sees an uncommitted task.
        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(THUMBNAIL_NOTIFY_CHANNEL)
            .bind(task_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(task_id = %task_id, media_id, "Thumbnail task enqueued");

        Ok(ThumbnailTask {
            id: task_id,
            media_id,
            status: TaskStatus::Pending,
            created_at,
        })
    }
}
