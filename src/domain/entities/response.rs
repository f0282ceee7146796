/// The outcome of dispatching a command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Response {
    /// Reply text. Empty means no visible reply should be sent.
    pub reply: String,
    /// Deliver to the sender directly instead of the shared channel.
    pub private_reply: bool,
    /// Reactions to attach to the triggering message, in order.
    pub reactions: Vec<String>,
}

pub const INVALID_COMMAND: &str = "Invalid command";
pub const INVALID_ARGUMENT: &str = "Invalid argument";
pub const COMMAND_FAILED: &str = "An error occurred while running the command.";

impl Response {
    pub fn new(reply: impl Into<String>, private_reply: bool) -> Self {
        Self {
            reply: reply.into(),
            private_reply,
            reactions: Vec::new(),
        }
    }

    pub fn with_reactions(mut self, reactions: Vec<String>) -> Self {
        self.reactions = reactions;
        self
    }

    pub fn invalid_command() -> Self {
        Self::new(INVALID_COMMAND, false)
    }

    pub fn invalid_argument() -> Self {
        Self::new(INVALID_ARGUMENT, false)
    }

    pub fn failure(private_reply: bool) -> Self {
        Self::new(COMMAND_FAILED, private_reply)
    }

    /// Whether there is nothing to show in chat.
    pub fn is_silent(&self) -> bool {
        self.reply.is_empty() && self.reactions.is_empty()
    }
}
