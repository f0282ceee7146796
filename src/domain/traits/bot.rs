use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::{Response, Sender};

/// Bot trait - abstraction for messaging backend listeners
#[async_trait]
pub trait Bot: Send + Sync {
    /// Start the bot and begin listening for messages
    async fn start(&self) -> Result<(), BotError>;

    /// Deliver a response to the channel the command came from, or to the
    /// sender directly when it is private
    async fn deliver(&self, sender: &Sender, response: &Response) -> Result<(), BotError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
}
