//! # Certgen Common Library
//!
//! Shared code for the certificate generator service:
//! - Error taxonomy
//! - Configuration / root folder resolution
//! - Database initialization, schema, and models
//! - Slug derivation

pub mod config;
pub mod db;
pub mod error;
pub mod slug;

pub use error::{Error, Result};
