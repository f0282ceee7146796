//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Database: SQLite command store
//! - Storage: In-memory command store
//! - Adapters: Platform listeners (console)

pub mod adapters;
pub mod config;
pub mod database;
pub mod storage;
