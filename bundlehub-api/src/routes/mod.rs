/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `upload`: App bundle upload endpoint

pub mod health;
pub mod upload;

use serde::{Deserialize, Serialize};

/// Wire format shared by every upload API response
///
/// `{"status": <string>, "error"?: <string>}`. The `error` field carries
/// diagnostic detail and is omitted when there is none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Human-readable status line ("ok" on success)
    pub status: String,

    /// Optional diagnostic detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusResponse {
    /// The success body
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
        }
    }
}
