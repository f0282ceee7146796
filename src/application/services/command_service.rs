use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, Weak};

use super::builtins;
use super::registry::{CommandRegistry, HELP};
use crate::application::errors::{BotError, CommandError, DeclarationError};
use crate::domain::entities::{static_command, AuthorizedRoles, Command, CommandBuilder};
use crate::domain::traits::CommandStore;
use crate::infrastructure::config::Config;

/// Builds command generations from the configuration and the command store,
/// and owns the privileged commands that change them at runtime
pub struct CommandService {
    config_path: Option<PathBuf>,
    config: RwLock<Config>,
    store: Arc<dyn CommandStore>,
    registry: Arc<CommandRegistry>,
    builtin_names: RwLock<HashSet<String>>,
}

impl CommandService {
    pub fn new(config: Config, store: Arc<dyn CommandStore>) -> Arc<Self> {
        Self::build(None, config, store)
    }

    /// Like [`CommandService::new`], but `reload` re-reads the file first.
    pub fn with_config_file(
        path: impl Into<PathBuf>,
        config: Config,
        store: Arc<dyn CommandStore>,
    ) -> Arc<Self> {
        Self::build(Some(path.into()), config, store)
    }

    fn build(config_path: Option<PathBuf>, config: Config, store: Arc<dyn CommandStore>) -> Arc<Self> {
        Arc::new(Self {
            config_path,
            registry: Arc::new(CommandRegistry::new(config.bot.command_char)),
            config: RwLock::new(config),
            store,
            builtin_names: RwLock::new(HashSet::new()),
        })
    }

    pub fn registry(&self) -> Arc<CommandRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn config(&self) -> Config {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtin_names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }

    /// Rebuilds every command from the configuration and the store and
    /// publishes them as one generation. Returns the number of commands.
    pub fn reload(self: &Arc<Self>) -> Result<usize, BotError> {
        if let Some(path) = &self.config_path {
            let fresh = Config::load(path)?;
            if fresh.bot.command_char != self.registry.command_char() {
                tracing::warn!("command-char changed in {:?}; restart to apply it", path);
            }
            *self.config.write().unwrap_or_else(PoisonError::into_inner) = fresh;
        }
        let config = self.config();

        tracing::info!("(Re)loading commands...");
        let mut entries = builtins::commands(&config)?;
        entries.extend(self.privileged(config.authorized_roles.to_roles())?);

        let mut builtin: HashSet<String> = entries.keys().cloned().collect();
        builtin.insert(HELP.to_string());

        // The store is read under the registry's writer lock so a concurrent
        // add or remove is never lost.
        let count = self.registry.update(|commands| -> Result<usize, BotError> {
            for (name, reply) in self.store.all()? {
                if builtin.contains(&name) {
                    tracing::warn!("Stored command `{}` shadows a built-in, skipping", name);
                    continue;
                }
                entries.insert(name, static_command(reply));
            }
            *commands = entries
                .into_iter()
                .map(|(name, cmd)| (name, Arc::new(cmd)))
                .collect();
            *self.builtin_names.write().unwrap_or_else(PoisonError::into_inner) = builtin;
            Ok(commands.len() + 1)
        })?;

        tracing::info!("Loaded {} commands", count);
        Ok(count)
    }

    /// Stores a static command and makes it visible.
    pub fn add(&self, name: &str, message: &str) -> Result<String, BotError> {
        // must be reachable as the first token of a line
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Ok("Command names can't be empty or contain whitespace.".to_string());
        }
        if self.is_builtin(name) {
            return Ok(format!("`{}` is a built-in command and cannot be replaced.", name));
        }
        if message.is_empty() {
            return Ok("Refusing to add a command without a message.".to_string());
        }
        let command = Arc::new(static_command(message));
        self.registry.update(|commands| -> Result<(), BotError> {
            self.store.insert(name, message)?;
            commands.insert(name.to_string(), command);
            Ok(())
        })?;
        tracing::info!("Added command `{}`", name);
        Ok("Done!".to_string())
    }

    /// Deletes a static command from the store and the registry.
    pub fn remove(&self, name: &str) -> Result<String, BotError> {
        if self.is_builtin(name) {
            return Ok(format!("`{}` is a built-in command and cannot be removed.", name));
        }
        let removed = self.registry.update(|commands| -> Result<bool, BotError> {
            let stored = self.store.remove(name)?;
            let live = commands.remove(name).is_some();
            Ok(stored || live)
        })?;
        if !removed {
            return Ok(format!("No command named `{}`", name));
        }
        tracing::info!("Removed command `{}`", name);
        Ok("Done!".to_string())
    }

    fn privileged(self: &Arc<Self>, roles: AuthorizedRoles) -> Result<HashMap<String, Command>, DeclarationError> {
        let mut commands = HashMap::new();

        let mut add = CommandBuilder::new()
            .roles(roles.clone())
            .help("Adds a command that always replies with the given message.");
        let name = add.required("name")?;
        let message = add.vararg("message")?;
        let service = Arc::downgrade(self);
        commands.insert(
            "add".to_string(),
            add.reply(false, move |scope| {
                let message = scope.get(message).join(" ");
                Ok(upgrade(&service)?.add(scope.get(name), &message)?)
            }),
        );

        let mut remove = CommandBuilder::new()
            .roles(roles.clone())
            .help("Removes a command added with add.");
        let name = remove.required("name")?;
        let service = Arc::downgrade(self);
        commands.insert(
            "remove".to_string(),
            remove.reply(false, move |scope| Ok(upgrade(&service)?.remove(scope.get(name))?)),
        );

        let service = Arc::downgrade(self);
        commands.insert(
            "reload".to_string(),
            CommandBuilder::new()
                .roles(roles)
                .help("Reloads the configuration and every command.")
                .reply(false, move |_| {
                    upgrade(&service)?.reload()?;
                    Ok("Done!".to_string())
                }),
        );

        Ok(commands)
    }
}

fn upgrade(service: &Weak<CommandService>) -> Result<Arc<CommandService>, CommandError> {
    service.upgrade().ok_or(CommandError::RegistryGone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Sender;
    use crate::infrastructure::storage::MemoryCommandStore;

    fn staff_config() -> Config {
        let mut config = Config::default();
        config.authorized_roles.default = vec!["staff".to_string()];
        config
    }

    fn run(service: &CommandService, name: &str, args: &[&str]) -> String {
        let command = service.registry().lookup(name).expect("command registered");
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        command
            .run(&Sender::new("admin").with_role("staff"), &args)
            .unwrap()
            .reply
    }

    #[test]
    fn test_reload_merges_stored_commands() {
        let store = Arc::new(MemoryCommandStore::with_commands([("rules", "Be nice.")]));
        let service = CommandService::new(staff_config(), store);
        let count = service.reload().unwrap();

        let registry = service.registry();
        assert_eq!(count, registry.len());
        assert!(registry.contains("apply"));
        assert!(registry.contains("add"));
        assert_eq!(run(&service, "rules", &[]), "Be nice.");
    }

    #[test]
    fn test_stored_command_cannot_shadow_builtin() {
        let store = Arc::new(MemoryCommandStore::with_commands([("apply", "hijacked")]));
        let service = CommandService::new(staff_config(), store);
        service.reload().unwrap();
        assert!(run(&service, "apply", &["fish"]).starts_with("Specify"));
    }

    #[test]
    fn test_add_persists_then_publishes() {
        let store = Arc::new(MemoryCommandStore::new());
        let service = CommandService::new(staff_config(), store.clone());
        service.reload().unwrap();

        assert_eq!(run(&service, "add", &["foo", "bar", "baz"]), "Done!");
        assert_eq!(store.all().unwrap().get("foo").map(String::as_str), Some("bar baz"));
        assert_eq!(run(&service, "foo", &[]), "bar baz");
        assert!(run(&service, "help", &[]).contains("foo"));
    }

    #[test]
    fn test_add_refuses_builtin() {
        let store = Arc::new(MemoryCommandStore::new());
        let service = CommandService::new(staff_config(), store.clone());
        service.reload().unwrap();

        assert!(run(&service, "add", &["help", "x"]).contains("built-in"));
        assert!(run(&service, "add", &["reload", "x"]).contains("built-in"));
        assert!(store.all().unwrap().is_empty());
    }

    #[test]
    fn test_add_refuses_unreachable_names() {
        let store = Arc::new(MemoryCommandStore::new());
        let service = CommandService::new(staff_config(), store.clone());
        service.reload().unwrap();
        let before = service.registry().names();

        assert!(run(&service, "add", &["", "x"]).contains("whitespace"));
        assert!(run(&service, "add", &["a b", "x"]).contains("whitespace"));
        assert!(run(&service, "add", &["tab\there", "x"]).contains("whitespace"));
        assert!(store.all().unwrap().is_empty());
        assert_eq!(service.registry().names(), before);
    }

    #[test]
    fn test_remove() {
        let store = Arc::new(MemoryCommandStore::with_commands([("foo", "bar")]));
        let service = CommandService::new(staff_config(), store.clone());
        service.reload().unwrap();

        assert_eq!(run(&service, "remove", &["foo"]), "Done!");
        assert!(!service.registry().contains("foo"));
        assert!(store.all().unwrap().is_empty());
        assert_eq!(run(&service, "remove", &["foo"]), "No command named `foo`");
        assert!(!run(&service, "help", &[]).contains("foo"));
    }

    #[test]
    fn test_reload_command_rereads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chad.yaml");
        std::fs::write(
            &path,
            "bot:\n  name: chad\n  command-char: ','\nauthorized-roles:\n  default: [staff]\ninsults: ['one %USER%']\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        let service = CommandService::with_config_file(&path, config, Arc::new(MemoryCommandStore::new()));
        service.reload().unwrap();
        assert_eq!(run(&service, "insult", &[]), "one admin");

        std::fs::write(
            &path,
            "bot:\n  name: chad\n  command-char: ','\nauthorized-roles:\n  default: [staff]\ninsults: ['two %USER%']\n",
        )
        .unwrap();
        assert_eq!(run(&service, "reload", &[]), "Done!");
        assert_eq!(run(&service, "insult", &[]), "two admin");
    }

    #[test]
    fn test_privileged_commands_locked_without_roles() {
        let service = CommandService::new(Config::default(), Arc::new(MemoryCommandStore::new()));
        service.reload().unwrap();
        let add = service.registry().lookup("add").unwrap();
        let args = vec!["foo".to_string(), "bar".to_string()];
        let response = add.run(&Sender::new("admin").with_role("staff"), &args).unwrap();
        assert!(response.reply.contains("not authorized"));
    }
}
