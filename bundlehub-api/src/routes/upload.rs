/// Bundle upload endpoint
///
/// This endpoint accepts an app bundle (optionally one chunk of a multipart
/// transfer), stores the bytes in object storage, and records version and
/// channel metadata.
///
/// # Endpoint
///
/// `POST /upload`
///
/// # Authentication
///
/// Requires an API key in the `apikey` header with the `read`, `upload`,
/// or `all` scope.
///
/// # Example Request
///
/// ```json
/// {
///   "appid": "com.example.app",
///   "version": "1.2.3",
///   "app": "UEsDBBQACAgIA...",
///   "format": "base64",
///   "channel": "production"
/// }
/// ```
///
/// # Multipart uploads
///
/// Large bundles can be sent in chunks: the first request stores the chunk
/// under a server-generated file name, and each following request sets
/// `isMultipart: true` plus `fileName` so the server downloads the partial
/// object and appends the new chunk. Chunks must be sent sequentially; there
/// is no ordering guard, and concurrent chunks for the same file corrupt the
/// concatenated object.
///
/// # Responses
///
/// Always `{"status": <string>, "error"?: <string>}` with HTTP 200/400/500.
/// The stored object is never rolled back once written: a version or channel
/// write that fails afterwards returns 400 and leaves the object in place.

use crate::app::AppState;
use crate::error::ApiError;
use crate::routes::StatusResponse;
use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use bundlehub_shared::auth::check_key;
use bundlehub_shared::encoding::{decode_payload, PayloadFormat};
use bundlehub_shared::models::app::App;
use bundlehub_shared::models::channel::{Channel, UpsertChannel};
use bundlehub_shared::models::version::{UpsertVersion, Version};
use bundlehub_shared::storage::{versions_prefix, ObjectStore};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Scopes accepted by the upload endpoint
const UPLOAD_SCOPES: &[&str] = &["read", "upload", "all"];

/// Upload request body
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UploadRequest {
    /// Application identifier (reverse-DNS style string)
    #[validate(length(min = 1, max = 255))]
    pub appid: String,

    /// Version label (semantic version string)
    #[validate(length(min = 1, max = 255))]
    pub version: String,

    /// Encoded bundle payload (or one chunk of it)
    #[validate(length(min = 1))]
    pub app: String,

    /// Payload encoding, default "base64"
    pub format: Option<String>,

    /// Object file name to continue a multipart upload
    #[serde(rename = "fileName")]
    #[validate(length(max = 255))]
    pub file_name: Option<String>,

    /// Whether this request continues a multipart upload
    #[serde(rename = "isMultipart", default)]
    pub is_multipart: bool,

    /// Chunk index, informational only
    pub chunk: Option<i32>,

    /// Total chunk count, informational only
    #[serde(rename = "totalChunks")]
    pub total_chunks: Option<i32>,

    /// Channel to point at the uploaded version
    #[validate(length(min = 1, max = 100))]
    pub channel: String,
}

/// Upload endpoint handler
///
/// The sequence is linear: authorize, confirm app ownership, store bytes,
/// upsert the version row and last-version pointer, upsert the channel.
/// Failures map to 400 with a status line naming the step; anything
/// unexpected maps to 500. There are no retries and no storage rollback.
pub async fn upload_bundle(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<StatusResponse>, ApiError> {
    // 1. The apikey header must be present.
    let Some(secret) = headers.get("apikey").and_then(|v| v.to_str().ok()) else {
        return Err(ApiError::bad_request("Cannot find authorization"));
    };

    // 2. The key must resolve to a live key with an accepted scope, and the
    //    request must actually carry a body.
    let Some(api_key) = check_key(&state.db, secret, UPLOAD_SCOPES).await? else {
        return Err(ApiError::bad_request("Cannot Verify User"));
    };
    if body.is_empty() {
        return Err(ApiError::bad_request("Cannot Verify User"));
    }

    let request: UploadRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::internal(e.to_string()))?;

    request.validate().map_err(|e| {
        ApiError::bad_request_with("Invalid request", e.to_string())
    })?;

    tracing::info!(
        user_id = %api_key.user_id,
        appid = %request.appid,
        version = %request.version,
        channel = %request.channel,
        multipart = request.is_multipart,
        chunk = ?request.chunk,
        total_chunks = ?request.total_chunks,
        "Processing bundle upload"
    );

    // 3. Version/channel writes only proceed once the app is confirmed to
    //    belong to the authenticated user.
    let app = App::find_by_app_id(&state.db, &request.appid, api_key.user_id).await?;
    if app.is_none() {
        return Err(ApiError::bad_request(format!(
            "Cannot find app {} in your account",
            request.appid
        )));
    }

    let format = PayloadFormat::parse(request.format.as_deref())
        .map_err(|e| ApiError::bad_request_with("Cannot decode payload", e.to_string()))?;
    let chunk_bytes = decode_payload(&request.app, format)
        .map_err(|e| ApiError::bad_request_with("Cannot decode payload", e.to_string()))?;

    let prefix = versions_prefix(api_key.user_id, &request.appid);

    // 4. Continuations reuse the caller-supplied file name; fresh uploads get
    //    a new UUID.
    let bucket_id = match (&request.file_name, request.is_multipart) {
        (Some(file_name), true) => file_name.clone(),
        _ => Uuid::new_v4().to_string(),
    };
    let object_key = format!("{}/{}", prefix, bucket_id);

    if request.is_multipart && request.file_name.is_some() {
        // 5a. Continue a multipart upload: fetch the partial object and append
        // the new chunk to it, old bytes first.
        let existing = state.storage.get(&object_key).await.map_err(|e| {
            ApiError::bad_request_with("Cannot download partial File to concat", e.to_string())
        })?;

        let mut combined = Vec::with_capacity(existing.len() + chunk_bytes.len());
        combined.extend_from_slice(&existing);
        combined.extend_from_slice(&chunk_bytes);

        state
            .storage
            .put(&object_key, combined.into())
            .await
            .map_err(|e| ApiError::bad_request_with("Cannot Upload File", e.to_string()))?;
    } else {
        // 5b. Fresh upload: create-only, so a key collision is an error
        // rather than silent data loss.
        state
            .storage
            .put_if_not_exists(&object_key, chunk_bytes.into())
            .await
            .map_err(|e| ApiError::bad_request_with("Cannot Upload File", e.to_string()))?;
    }

    tracing::debug!(
        backend = state.storage.backend_name(),
        key = %object_key,
        format = format.as_str(),
        "Bundle bytes stored"
    );

    // 6. Record the version and move the app's last-version pointer. The
    // object stays in storage even if this fails.
    let version = Version::upsert(
        &state.db,
        UpsertVersion {
            app_id: request.appid.clone(),
            user_id: api_key.user_id,
            name: request.version.clone(),
            bucket_id,
        },
    )
    .await
    .map_err(|e| ApiError::bad_request_with("Cannot add version", e.to_string()))?;

    App::update_last_version(&state.db, &request.appid, api_key.user_id, &request.version)
        .await
        .map_err(|e| ApiError::bad_request_with("Cannot add version", e.to_string()))?;

    // 7. Point the channel at the new version.
    Channel::upsert(
        &state.db,
        UpsertChannel {
            name: request.channel.clone(),
            app_id: request.appid.clone(),
            created_by: api_key.user_id,
            version: version.id,
        },
    )
    .await
    .map_err(|e| ApiError::bad_request_with("Cannot update or add channel", e.to_string()))?;

    tracing::info!(
        appid = %request.appid,
        version = %request.version,
        version_id = %version.id,
        channel = %request.channel,
        "Bundle upload complete"
    );

    Ok(Json(StatusResponse::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> UploadRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_request_deserialization_minimal() {
        let request = parse(json!({
            "appid": "com.example.app",
            "version": "1.0.0",
            "app": "aGVsbG8=",
            "channel": "production"
        }));

        assert_eq!(request.appid, "com.example.app");
        assert!(!request.is_multipart);
        assert!(request.format.is_none());
        assert!(request.file_name.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_deserialization_multipart_fields() {
        let request = parse(json!({
            "appid": "com.example.app",
            "version": "1.0.0",
            "app": "aGVsbG8=",
            "format": "base64",
            "fileName": "5b3520ff-8b41-4791-8f45-0a48459616ba",
            "isMultipart": true,
            "chunk": 2,
            "totalChunks": 4,
            "channel": "beta"
        }));

        assert!(request.is_multipart);
        assert_eq!(
            request.file_name.as_deref(),
            Some("5b3520ff-8b41-4791-8f45-0a48459616ba")
        );
        assert_eq!(request.chunk, Some(2));
        assert_eq!(request.total_chunks, Some(4));
    }

    #[test]
    fn test_request_validation_rejects_empty_fields() {
        let request = parse(json!({
            "appid": "",
            "version": "1.0.0",
            "app": "aGVsbG8=",
            "channel": "production"
        }));
        assert!(request.validate().is_err());

        let request = parse(json!({
            "appid": "com.example.app",
            "version": "1.0.0",
            "app": "",
            "channel": "production"
        }));
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_request_validation_rejects_long_channel() {
        let request = parse(json!({
            "appid": "com.example.app",
            "version": "1.0.0",
            "app": "aGVsbG8=",
            "channel": "c".repeat(101)
        }));
        assert!(request.validate().is_err());
    }
}
