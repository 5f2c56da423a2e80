/// Version model and database operations
///
/// A Version records one uploaded bundle for an app: a semantic version label
/// plus the object-storage file name ("bucket id") where the bytes live.
/// Uploads upsert on `(app_id, name)` so re-uploading a version label points
/// it at the new object instead of failing.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE app_versions (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     app_id TEXT NOT NULL,
///     user_id UUID NOT NULL,
///     name VARCHAR(255) NOT NULL,
///     bucket_id TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (app_id, name)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Version model representing one uploaded bundle
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Version {
    /// Unique version ID
    pub id: Uuid,

    /// Application this version belongs to
    pub app_id: String,

    /// User who uploaded it
    pub user_id: Uuid,

    /// Version label (semantic version string)
    pub name: String,

    /// Object storage file name for the stored bundle
    pub bucket_id: String,

    /// When the version was first uploaded
    pub created_at: DateTime<Utc>,

    /// When the version was last re-uploaded
    pub updated_at: DateTime<Utc>,
}

/// Input for upserting a version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertVersion {
    /// Application identifier
    pub app_id: String,

    /// Uploading user
    pub user_id: Uuid,

    /// Version label
    pub name: String,

    /// Object storage file name
    pub bucket_id: String,
}

impl Version {
    /// Creates or updates a version row
    ///
    /// Conflicts on `(app_id, name)` update the bucket pointer in place and
    /// return the existing row's id, so channels keep pointing at the same
    /// version record across re-uploads.
    pub async fn upsert(pool: &PgPool, data: UpsertVersion) -> Result<Self, sqlx::Error> {
        let version = sqlx::query_as::<_, Version>(
            r#"
            INSERT INTO app_versions (app_id, user_id, name, bucket_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (app_id, name) DO UPDATE
            SET bucket_id = EXCLUDED.bucket_id,
                user_id = EXCLUDED.user_id,
                updated_at = NOW()
            RETURNING id, app_id, user_id, name, bucket_id, created_at, updated_at
            "#,
        )
        .bind(data.app_id)
        .bind(data.user_id)
        .bind(data.name)
        .bind(data.bucket_id)
        .fetch_one(pool)
        .await?;

        Ok(version)
    }

    /// Finds a version by app and label
    pub async fn find_by_name(
        pool: &PgPool,
        app_id: &str,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let version = sqlx::query_as::<_, Version>(
            r#"
            SELECT id, app_id, user_id, name, bucket_id, created_at, updated_at
            FROM app_versions
            WHERE app_id = $1 AND name = $2
            "#,
        )
        .bind(app_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(version)
    }
}
