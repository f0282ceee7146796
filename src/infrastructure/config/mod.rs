//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::application::errors::ConfigError;
use crate::domain::entities::{AuthorizedRoles, Backend, RoleRequirement, Sender};

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    #[serde(default)]
    pub authorized_roles: AuthorizedRolesConfig,
    #[serde(default)]
    pub insults: Vec<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    pub command_char: char,
    /// SQLite file holding commands added at runtime. Without one they only
    /// live until the process exits.
    pub database_file: Option<PathBuf>,
}

/// Roles allowed to run privileged commands
///
/// `default` applies to every backend without an override. An empty list
/// locks the privileged commands for everybody.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AuthorizedRolesConfig {
    #[serde(default)]
    pub default: Vec<String>,
    pub discord: Option<Vec<String>>,
    pub irc: Option<Vec<String>>,
}

impl AuthorizedRolesConfig {
    pub fn to_roles(&self) -> AuthorizedRoles {
        let mut roles =
            AuthorizedRoles::everywhere(RoleRequirement::restricted_to(self.default.iter().cloned()));
        if let Some(discord) = &self.discord {
            roles = roles.with_backend(
                Backend::Discord,
                RoleRequirement::restricted_to(discord.iter().cloned()),
            );
        }
        if let Some(irc) = &self.irc {
            roles = roles.with_backend(Backend::Irc, RoleRequirement::restricted_to(irc.iter().cloned()));
        }
        roles
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directives, used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// The local console listener, used for development
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub username: String,
    pub backend: Option<Backend>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            username: "console".to_string(),
            backend: None,
            roles: Vec::new(),
        }
    }
}

impl ConsoleConfig {
    pub fn sender(&self) -> Sender {
        let sender = Sender::new(&self.username).with_roles(self.roles.iter().cloned());
        match self.backend {
            Some(backend) => sender.with_backend(backend),
            None => sender,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "chad".to_string(),
                command_char: ',',
                database_file: None,
            },
            authorized_roles: AuthorizedRolesConfig::default(),
            insults: Vec::new(),
            logging: LoggingConfig::default(),
            console: ConsoleConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.command_char == '"' {
            return Err(ConfigError::InvalidValue(
                "command-char cannot be a double quote".to_string(),
            ));
        }
        if self.console.enabled && self.console.username.is_empty() {
            return Err(ConfigError::InvalidValue(
                "console.username must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_loads() {
        let config = Config::from_yaml_str(include_str!("../../../config.example.yaml")).unwrap();
        assert_eq!(config.bot.command_char, ',');
        assert!(!config.insults.is_empty());
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config = Config::from_yaml_str("bot:\n  name: chad\n  command-char: '!'\n").unwrap();
        assert_eq!(config.bot.command_char, '!');
        assert!(config.bot.database_file.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.console.enabled);

        // no roles configured: privileged commands are locked
        let roles = config.authorized_roles.to_roles();
        assert!(!roles.permits(&Sender::new("x").with_role("staff")));
    }

    #[test]
    fn test_backend_role_overrides() {
        let yaml = r#"
bot:
  name: chad
  command-char: ','
authorized-roles:
  default: [staff]
  irc: [op]
"#;
        let roles = Config::from_yaml_str(yaml).unwrap().authorized_roles.to_roles();
        assert!(roles.permits(&Sender::new("a").with_backend(Backend::Irc).with_role("op")));
        assert!(!roles.permits(&Sender::new("a").with_backend(Backend::Irc).with_role("staff")));
        assert!(roles.permits(&Sender::new("a").with_backend(Backend::Discord).with_role("staff")));
    }

    #[test]
    fn test_space_command_char() {
        let config = Config::from_yaml_str("bot:\n  name: chad\n  command-char: ' '\n").unwrap();
        assert_eq!(config.bot.command_char, ' ');
    }

    #[test]
    fn test_rejects_quote_command_char() {
        let result = Config::from_yaml_str("bot:\n  name: chad\n  command-char: '\"'\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_console_sender() {
        let console = ConsoleConfig {
            enabled: true,
            username: "me".to_string(),
            backend: Some(Backend::Irc),
            roles: vec!["staff".to_string()],
        };
        let sender = console.sender();
        assert_eq!(sender.backend, Some(Backend::Irc));
        assert!(sender.has_role("staff"));
    }
}
