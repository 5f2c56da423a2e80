/// API key authentication
///
/// The upload API authenticates callers with an API key presented in the
/// `apikey` header. This module provides the lookup that handlers use:
/// the presented secret is hashed and matched against the `api_keys` table,
/// then checked against the scopes the endpoint accepts.
///
/// # Example
///
/// ```no_run
/// use bundlehub_shared::auth::check_key;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let key = check_key(&pool, "bhub_abc123...", &["upload", "read"]).await?;
/// if key.is_none() {
///     // reject the request
/// }
/// # Ok(())
/// # }
/// ```

use crate::models::api_key::ApiKey;
use sqlx::PgPool;
use tracing::debug;

/// Validates a presented API key secret against the database
///
/// Returns `Ok(Some(key))` only when the key exists, is not revoked or
/// expired, and carries at least one of `allowed_scopes` (the "all" scope
/// matches anything). Every rejection collapses to `Ok(None)` so callers can
/// answer with a uniform error body that does not leak why the key failed.
pub async fn check_key(
    pool: &PgPool,
    secret: &str,
    allowed_scopes: &[&str],
) -> Result<Option<ApiKey>, sqlx::Error> {
    if !validate_key_format(secret) {
        debug!("Rejected API key with invalid format");
        return Ok(None);
    }

    let Some(api_key) = ApiKey::validate(pool, secret).await? else {
        debug!("API key not found, revoked, or expired");
        return Ok(None);
    };

    if !allowed_scopes.iter().any(|scope| api_key.has_scope(scope)) {
        debug!(key_prefix = %api_key.key_prefix, "API key lacks required scope");
        return Ok(None);
    }

    Ok(Some(api_key))
}

/// Checks that a presented secret looks like a key we could have issued
///
/// This is a cheap pre-filter before the database lookup; it is not a
/// security boundary.
pub fn validate_key_format(secret: &str) -> bool {
    secret.starts_with("bhub_")
        && secret.len() == 37
        && secret[5..].chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::api_key::ApiKey;

    #[test]
    fn test_validate_key_format_accepts_generated_keys() {
        for _ in 0..10 {
            let key = ApiKey::generate_key();
            assert!(validate_key_format(&key), "rejected generated key {key}");
        }
    }

    #[test]
    fn test_validate_key_format_rejects_bad_input() {
        assert!(!validate_key_format(""));
        assert!(!validate_key_format("bhub_short"));
        assert!(!validate_key_format("axon_aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"));
        assert!(!validate_key_format("bhub_aaaaaaaaaaaaaaaaaaaaaaaaaaaaaa!!"));
    }
}
