//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Services: Command registry, built-in commands and runtime edits
//! - Messaging: Tokenizing and executing command lines
//! - Errors: Domain-specific errors

pub mod errors;
pub mod messaging;
pub mod services;
