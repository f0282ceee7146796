//! Application services - Command registry and the commands it serves

pub mod builtins;
pub mod command_service;
pub mod registry;

pub use command_service::CommandService;
pub use registry::CommandRegistry;
