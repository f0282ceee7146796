//! Command executor - Turns a chat line into a response
//!
//! Lines that don't start with the command character are ignored. Everything
//! else always gets a response: a rejection from tokenizing, lookup, argument
//! bounds or authorization, or the command's reply. Handlers run on the
//! blocking pool so a slow command never stalls the listener, and a failing
//! or panicking handler is reported to the user as a generic failure.

use std::sync::Arc;

use super::tokenizer::tokenize;
use crate::application::errors::TokenizeError;
use crate::application::services::CommandRegistry;
use crate::domain::entities::{Response, Sender};

#[derive(Clone)]
pub struct CommandExecutor {
    command_char: char,
    registry: Arc<CommandRegistry>,
}

impl CommandExecutor {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self {
            command_char: registry.command_char(),
            registry,
        }
    }

    pub fn command_char(&self) -> char {
        self.command_char
    }

    /// Returns `None` when `message` is not a command.
    pub async fn try_execute(&self, sender: &Sender, message: &str) -> Option<Response> {
        let line = message.strip_prefix(self.command_char)?;
        tracing::info!("{}: {}", sender, message);

        let invocation = match tokenize(line) {
            Ok(invocation) => invocation,
            Err(TokenizeError::MissingName) => return Some(Response::invalid_command()),
            Err(e) => {
                tracing::debug!("Rejected `{}`: {}", message, e);
                return Some(Response::invalid_argument());
            }
        };

        let Some(command) = self.registry.lookup(&invocation.name) else {
            return Some(Response::invalid_command());
        };
        if let Err(rejection) = command.check(sender, invocation.args.len()) {
            return Some(rejection);
        }

        let private_reply = command.private_reply();
        let name = invocation.name;
        let args = invocation.args;
        let caller = sender.clone();
        let result = tokio::task::spawn_blocking(move || command.invoke(&caller, &args)).await;

        Some(match result {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::error!("Command `{}` failed for {}: {}", name, sender, e);
                Response::failure(private_reply)
            }
            Err(e) => {
                tracing::error!("Command `{}` panicked for {}: {}", name, sender, e);
                Response::failure(private_reply)
            }
        })
    }
}
