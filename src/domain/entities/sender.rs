use serde::{Deserialize, Serialize};
use std::fmt;

/// The messaging backend a command came in from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Discord,
    Irc,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Discord => "discord",
            Backend::Irc => "irc",
        }
    }
}

/// Whoever issued a command, with the roles they held at that moment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub username: String,
    pub backend: Option<Backend>,
    pub roles: Vec<String>,
}

impl Sender {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            backend: None,
            roles: Vec::new(),
        }
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.backend {
            Some(backend) => write!(f, "{}@{}", self.username, backend.as_str()),
            None => write!(f, "{}", self.username),
        }
    }
}
