//! # Lyrica Common Library
//!
//! Shared code for the Lyrica lyrics catalog service including:
//! - Database schema and entity queries (artists, albums, songs, lyrics)
//! - Vote ledger and score recomputation
//! - Error types
//! - Configuration loading

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
