//! In-process command store, used when no database file is configured

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::application::errors::StorageError;
use crate::domain::traits::CommandStore;

#[derive(Default)]
pub struct MemoryCommandStore {
    commands: RwLock<BTreeMap<String, String>>,
}

impl MemoryCommandStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_commands<I, K, V>(commands: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            commands: RwLock::new(
                commands
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl CommandStore for MemoryCommandStore {
    fn insert(&self, name: &str, reply: &str) -> Result<(), StorageError> {
        let mut commands = self.commands.write().map_err(|_| StorageError::Poisoned)?;
        commands.insert(name.to_string(), reply.to_string());
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<bool, StorageError> {
        let mut commands = self.commands.write().map_err(|_| StorageError::Poisoned)?;
        Ok(commands.remove(name).is_some())
    }

    fn all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let commands = self.commands.read().map_err(|_| StorageError::Poisoned)?;
        Ok(commands.clone())
    }
}
