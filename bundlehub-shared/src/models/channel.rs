/// Channel model and database operations
///
/// A Channel is a named deployment track within an app ("production", "beta")
/// pointing at the Version currently served on that track. Uploads upsert on
/// `(app_id, name)` so pushing to an existing channel moves its pointer.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE channels (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL,
///     app_id TEXT NOT NULL,
///     created_by UUID NOT NULL,
///     version UUID NOT NULL REFERENCES app_versions(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (app_id, name)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Channel model representing a deployment track
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Channel {
    /// Unique channel ID
    pub id: Uuid,

    /// Channel name (e.g. "production")
    pub name: String,

    /// Application this channel belongs to
    pub app_id: String,

    /// User who created the channel
    pub created_by: Uuid,

    /// Version currently served on this channel
    pub version: Uuid,

    /// When the channel was created
    pub created_at: DateTime<Utc>,

    /// When the channel pointer last moved
    pub updated_at: DateTime<Utc>,
}

/// Input for upserting a channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertChannel {
    /// Channel name
    pub name: String,

    /// Application identifier
    pub app_id: String,

    /// Creating user
    pub created_by: Uuid,

    /// Version to point the channel at
    pub version: Uuid,
}

impl Channel {
    /// Creates the channel or moves its version pointer
    pub async fn upsert(pool: &PgPool, data: UpsertChannel) -> Result<Self, sqlx::Error> {
        let channel = sqlx::query_as::<_, Channel>(
            r#"
            INSERT INTO channels (name, app_id, created_by, version)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (app_id, name) DO UPDATE
            SET version = EXCLUDED.version,
                updated_at = NOW()
            RETURNING id, name, app_id, created_by, version, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.app_id)
        .bind(data.created_by)
        .bind(data.version)
        .fetch_one(pool)
        .await?;

        Ok(channel)
    }

    /// Finds a channel by app and name
    pub async fn find_by_name(
        pool: &PgPool,
        app_id: &str,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let channel = sqlx::query_as::<_, Channel>(
            r#"
            SELECT id, name, app_id, created_by, version, created_at, updated_at
            FROM channels
            WHERE app_id = $1 AND name = $2
            "#,
        )
        .bind(app_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(channel)
    }
}
