use std::collections::BTreeMap;

use crate::application::errors::StorageError;

/// Persistence for commands added at runtime, keyed by command name
///
/// Calls are blocking; they are made from reply handlers, which run off the
/// async executor.
pub trait CommandStore: Send + Sync {
    /// Inserts or overwrites the reply stored under `name`.
    fn insert(&self, name: &str, reply: &str) -> Result<(), StorageError>;

    /// Returns whether anything was removed.
    fn remove(&self, name: &str) -> Result<bool, StorageError>;

    fn all(&self) -> Result<BTreeMap<String, String>, StorageError>;
}
