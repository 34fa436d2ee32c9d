//! # Arkiv Common Library
//!
//! Shared code for the Arkiv repository services including:
//! - Database schema initialisation and row models
//! - Authority-control confidence vocabulary
//! - Configuration loading and root folder resolution
//! - Common error types

pub mod authority;
pub mod config;
pub mod db;
pub mod error;

pub use authority::ConfidenceLevel;
pub use error::{parse_id, Error, Result};
