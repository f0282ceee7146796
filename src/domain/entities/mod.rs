//! Domain entities - Core business objects with no external dependencies

pub mod command;
pub mod response;
pub mod roles;
pub mod sender;

pub use command::{static_command, Command, CommandBuilder, Descriptor, ReplyScope, Slot};
pub use response::Response;
pub use roles::{AuthorizedRoles, RoleRequirement};
pub use sender::{Backend, Sender};
