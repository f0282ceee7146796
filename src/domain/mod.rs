//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Entities: Core business objects (Sender, Command, Response)
//! - Traits: Abstractions for infrastructure (Bot, CommandStore)

pub mod entities;
pub mod traits;
