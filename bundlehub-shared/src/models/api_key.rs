/// API Key model and database operations
///
/// API keys are the only credential accepted by the upload API. They are
/// suitable for CI pipelines and server-to-server calls.
///
/// # Security
///
/// - Keys are stored as SHA-256 hashes (never plaintext)
/// - Keys are prefixed with "bhub_" for identification
/// - The full key is only returned on creation (never again)
/// - Keys carry scopes ("read", "upload", "all") and can be revoked or expire
///
/// # Schema
///
/// ```sql
/// CREATE TABLE api_keys (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL,
///     name VARCHAR(255) NOT NULL,
///     key_prefix VARCHAR(10) NOT NULL,
///     key_hash VARCHAR(64) NOT NULL UNIQUE,
///     scopes TEXT[] NOT NULL DEFAULT ARRAY['read'],
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_used_at TIMESTAMPTZ,
///     revoked BOOLEAN NOT NULL DEFAULT FALSE,
///     revoked_at TIMESTAMPTZ,
///     expires_at TIMESTAMPTZ
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use bundlehub_shared::models::api_key::{ApiKey, CreateApiKey};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let (api_key, plaintext_key) = ApiKey::create(&pool, CreateApiKey {
///     user_id: Uuid::new_v4(),
///     name: "CI upload key".to_string(),
///     scopes: vec!["upload".to_string()],
///     expires_at: None,
/// }).await?;
///
/// // IMPORTANT: Save plaintext_key now - it's never shown again!
/// println!("API Key: {}", plaintext_key);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

/// API Key model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ApiKey {
    /// Unique API key ID
    pub id: Uuid,

    /// User this key belongs to
    pub user_id: Uuid,

    /// Human-readable name for the key
    pub name: String,

    /// First 10 characters of the key (for display: "bhub_abc12...")
    pub key_prefix: String,

    /// SHA-256 hash of the full key (never store plaintext!)
    pub key_hash: String,

    /// Permission scopes (e.g., ["read", "upload", "all"])
    pub scopes: Vec<String>,

    /// When the key was created
    pub created_at: DateTime<Utc>,

    /// When the key was last used
    pub last_used_at: Option<DateTime<Utc>>,

    /// Whether the key has been revoked
    pub revoked: bool,

    /// When the key was revoked (if applicable)
    pub revoked_at: Option<DateTime<Utc>>,

    /// Optional expiration date
    pub expires_at: Option<DateTime<Utc>>,
}

/// Input for creating a new API key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApiKey {
    /// Owning user ID
    pub user_id: Uuid,

    /// Human-readable name
    pub name: String,

    /// Permission scopes
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Optional expiration date
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_scopes() -> Vec<String> {
    vec!["read".to_string()]
}

impl ApiKey {
    /// Generates a secure random API key
    ///
    /// Format: bhub_{32_random_chars}
    ///
    /// # Example
    ///
    /// ```
    /// use bundlehub_shared::models::api_key::ApiKey;
    ///
    /// let key = ApiKey::generate_key();
    /// assert!(key.starts_with("bhub_"));
    /// assert_eq!(key.len(), 37); // "bhub_" (5) + 32 chars
    /// ```
    pub fn generate_key() -> String {
        use rand::Rng;
        const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
        let mut rng = rand::thread_rng();

        let random: String = (0..32)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect();

        format!("bhub_{}", random)
    }

    /// Hashes an API key with SHA-256
    pub fn hash_key(key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Extracts the display prefix from a key (first 10 chars)
    pub fn extract_prefix(key: &str) -> String {
        key.chars().take(10).collect()
    }

    /// Checks if the API key is expired
    pub fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            expires_at < Utc::now()
        } else {
            false
        }
    }

    /// Creates a new API key
    ///
    /// Returns both the database record and the plaintext key.
    /// **IMPORTANT**: The plaintext key is only returned once and never stored!
    pub async fn create(pool: &PgPool, data: CreateApiKey) -> Result<(Self, String), sqlx::Error> {
        let plaintext_key = Self::generate_key();
        let key_hash = Self::hash_key(&plaintext_key);
        let key_prefix = Self::extract_prefix(&plaintext_key);

        let api_key = sqlx::query_as::<_, ApiKey>(
            r#"
            INSERT INTO api_keys (user_id, name, key_prefix, key_hash, scopes, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, name, key_prefix, key_hash, scopes, created_at,
                      last_used_at, revoked, revoked_at, expires_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .bind(key_prefix)
        .bind(key_hash)
        .bind(&data.scopes)
        .bind(data.expires_at)
        .fetch_one(pool)
        .await?;

        Ok((api_key, plaintext_key))
    }

    /// Validates an API key and returns the key record if valid
    ///
    /// Checks that the key hash matches, the key is not revoked, and the key
    /// is not expired. Also touches `last_used_at` when the key is valid.
    pub async fn validate(pool: &PgPool, plaintext_key: &str) -> Result<Option<Self>, sqlx::Error> {
        let key_hash = Self::hash_key(plaintext_key);

        let api_key = sqlx::query_as::<_, ApiKey>(
            r#"
            UPDATE api_keys
            SET last_used_at = NOW()
            WHERE key_hash = $1
              AND revoked = FALSE
              AND (expires_at IS NULL OR expires_at > NOW())
            RETURNING id, user_id, name, key_prefix, key_hash, scopes, created_at,
                      last_used_at, revoked, revoked_at, expires_at
            "#,
        )
        .bind(key_hash)
        .fetch_optional(pool)
        .await?;

        Ok(api_key)
    }

    /// Checks if key has a specific scope
    ///
    /// The "all" scope grants every permission.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(&scope.to_string()) || self.scopes.contains(&"all".to_string())
    }
}
