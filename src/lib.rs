//! chad - a chat command bot engine
//!
//! Commands are declared with a small argument DSL, published to a registry
//! in atomic generations, and executed for whichever backend a line came from.

pub mod application;
pub mod domain;
pub mod infrastructure;
