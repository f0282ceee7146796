//! Command registry - Name to command mapping with atomic generations
//!
//! Every published generation is an immutable map behind an `Arc`. Readers
//! clone the `Arc` under a short read lock and never hold it while a command
//! runs. Writers are serialized, build the next map off to the side and swap
//! it in with a single assignment.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::application::errors::DeclarationError;
use crate::domain::entities::{Command, CommandBuilder};

/// The name the generated help command is registered under
pub const HELP: &str = "help";

const HELP_SUMMARY: &str = "Lists the available commands, or shows how to use one.";

pub type Entries = HashMap<String, Arc<Command>>;

struct Generation {
    number: u64,
    commands: Entries,
}

pub struct CommandRegistry {
    command_char: char,
    current: RwLock<Arc<Generation>>,
    writer: Mutex<()>,
}

impl CommandRegistry {
    pub fn new(command_char: char) -> Self {
        Self {
            command_char,
            current: RwLock::new(Arc::new(Generation {
                number: 0,
                commands: HashMap::new(),
            })),
            writer: Mutex::new(()),
        }
    }

    pub fn command_char(&self) -> char {
        self.command_char
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<Command>> {
        self.current().commands.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.current().commands.contains_key(name)
    }

    /// Sorted command names of the current generation.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.current().commands.keys().cloned().collect();
        names.sort();
        names
    }

    /// Help line of every command in the current generation.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        let generation = self.current();
        generation
            .commands
            .iter()
            .map(|(name, cmd)| (name.clone(), cmd.help(self.command_char, name)))
            .collect()
    }

    /// Number of the current generation; 0 until the first publish.
    pub fn generation(&self) -> u64 {
        self.current().number
    }

    pub fn len(&self) -> usize {
        self.current().commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces every command at once.
    pub fn reload(&self, entries: HashMap<String, Command>) -> Result<(), DeclarationError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let commands = entries
            .into_iter()
            .map(|(name, cmd)| (name, Arc::new(cmd)))
            .collect();
        self.publish(commands)
    }

    /// Copies the current map, lets `f` edit it and publishes the result.
    ///
    /// Updates are serialized. Nothing is published if `f` fails, so side
    /// effects performed inside `f` (such as persisting the change) happen
    /// before the new generation becomes visible.
    pub fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Entries) -> Result<T, E>,
        E: From<DeclarationError>,
    {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut commands = self.current().commands.clone();
        let value = f(&mut commands)?;
        self.publish(commands)?;
        Ok(value)
    }

    fn current(&self) -> Arc<Generation> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Caller must hold the writer lock.
    fn publish(&self, mut commands: Entries) -> Result<(), DeclarationError> {
        commands.remove(HELP);
        let help = help_command(self.command_char, &commands)?;
        commands.insert(HELP.to_string(), Arc::new(help));

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let number = current.number + 1;
        let count = commands.len();
        *current = Arc::new(Generation { number, commands });
        drop(current);

        tracing::info!("Published command generation {} ({} commands)", number, count);
        Ok(())
    }
}

/// Builds the help command over the given commands, which must not include
/// the help command itself.
fn help_command(command_char: char, commands: &Entries) -> Result<Command, DeclarationError> {
    let available = {
        let mut names: Vec<&str> = commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names.join(", ")
    };
    let mut messages: HashMap<String, String> = commands
        .iter()
        .map(|(name, cmd)| (name.clone(), cmd.help(command_char, name)))
        .collect();

    let mut cmd = CommandBuilder::new().help(HELP_SUMMARY);
    let command = cmd.optional("command")?;
    messages.insert(
        HELP.to_string(),
        format!("{} Usage: {}{} [command]", HELP_SUMMARY, command_char, HELP),
    );

    Ok(cmd.reply(true, move |scope| {
        Ok(match scope.get(command) {
            Some(name) => messages
                .get(name)
                .cloned()
                .unwrap_or_else(|| "No such command available".to_string()),
            None => format!("Available commands: {}", available),
        })
    }))
}
