//! # BundleHub Shared Library
//!
//! This crate contains the data layer and utilities shared across the
//! BundleHub services.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: API key authentication
//! - `db`: Connection pool and migrations
//! - `storage`: Object storage abstraction and backends
//! - `encoding`: Upload payload decoding

pub mod auth;
pub mod db;
pub mod encoding;
pub mod models;
pub mod storage;

/// Current version of the BundleHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
