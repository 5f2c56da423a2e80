/// App model and database operations
///
/// An App is an application registered by a user, identified by its
/// application id string (e.g. "com.example.app"). Every upload is checked
/// against this table: versions and channels are only written after the app
/// is confirmed to belong to the authenticated user.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE apps (
///     app_id TEXT NOT NULL,
///     user_id UUID NOT NULL,
///     name VARCHAR(255) NOT NULL,
///     icon_url TEXT,
///     last_version TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (app_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// App model representing a registered application
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct App {
    /// Application identifier (reverse-DNS style string)
    pub app_id: String,

    /// Owning user
    pub user_id: Uuid,

    /// Display name
    pub name: String,

    /// Optional icon URL
    pub icon_url: Option<String>,

    /// Version label of the most recent upload
    pub last_version: Option<String>,

    /// When the app was registered
    pub created_at: DateTime<Utc>,

    /// When the app row was last modified
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a new app
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApp {
    /// Application identifier
    pub app_id: String,

    /// Owning user
    pub user_id: Uuid,

    /// Display name
    pub name: String,

    /// Optional icon URL
    pub icon_url: Option<String>,
}

impl App {
    /// Registers a new app
    pub async fn create(pool: &PgPool, data: CreateApp) -> Result<Self, sqlx::Error> {
        let app = sqlx::query_as::<_, App>(
            r#"
            INSERT INTO apps (app_id, user_id, name, icon_url)
            VALUES ($1, $2, $3, $4)
            RETURNING app_id, user_id, name, icon_url, last_version, created_at, updated_at
            "#,
        )
        .bind(data.app_id)
        .bind(data.user_id)
        .bind(data.name)
        .bind(data.icon_url)
        .fetch_one(pool)
        .await?;

        Ok(app)
    }

    /// Finds an app by its application id, scoped to the owning user
    ///
    /// Returns `None` when the app does not exist or belongs to another user.
    /// This is the ownership check that gates all version and channel writes.
    pub async fn find_by_app_id(
        pool: &PgPool,
        app_id: &str,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let app = sqlx::query_as::<_, App>(
            r#"
            SELECT app_id, user_id, name, icon_url, last_version, created_at, updated_at
            FROM apps
            WHERE app_id = $1 AND user_id = $2
            "#,
        )
        .bind(app_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(app)
    }

    /// Updates the app's last-version pointer
    ///
    /// Returns true if a row was updated.
    pub async fn update_last_version(
        pool: &PgPool,
        app_id: &str,
        user_id: Uuid,
        last_version: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE apps
            SET last_version = $3, updated_at = NOW()
            WHERE app_id = $1 AND user_id = $2
            "#,
        )
        .bind(app_id)
        .bind(user_id)
        .bind(last_version)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
