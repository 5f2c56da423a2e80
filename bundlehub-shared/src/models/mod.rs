/// Database models for BundleHub
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `api_key`: API keys for programmatic access to the upload API
/// - `app`: Registered applications, owned by a user
/// - `version`: Uploaded app bundle versions, pointing at stored objects
/// - `channel`: Named deployment tracks pointing at a version

pub mod api_key;
pub mod app;
pub mod channel;
pub mod version;
