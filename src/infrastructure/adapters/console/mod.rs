//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

use crate::application::errors::BotError;
use crate::application::messaging::CommandExecutor;
use crate::domain::entities::{Response, Sender};
use crate::domain::traits::{Bot, BotInfo};

/// Reads command lines from stdin and prints the responses
pub struct ConsoleAdapter {
    info: BotInfo,
    sender: Sender,
    executor: CommandExecutor,
}

impl ConsoleAdapter {
    pub fn new(name: impl Into<String>, sender: Sender, executor: CommandExecutor) -> Self {
        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: name.into(),
            },
            sender,
            executor,
        }
    }

    /// Runs every line of `input` through the executor and delivers the
    /// responses. Returns once `input` ends and every started command has
    /// answered, with the number of responses delivered.
    pub async fn serve<R>(&self, input: R) -> Result<usize, BotError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut in_flight = JoinSet::new();
        let mut open = true;
        let mut delivered = 0;

        while open || !in_flight.is_empty() {
            tokio::select! {
                line = lines.next_line(), if open => {
                    match line.map_err(|e| BotError::Internal(format!("stdin: {}", e)))? {
                        Some(line) => {
                            let executor = self.executor.clone();
                            let sender = self.sender.clone();
                            in_flight.spawn(async move {
                                executor.try_execute(&sender, line.trim_end()).await
                            });
                        }
                        None => {
                            tracing::info!("Console closed, waiting for {} command(s)", in_flight.len());
                            open = false;
                        }
                    }
                }
                Some(done) = in_flight.join_next() => match done {
                    Ok(Some(response)) => {
                        self.deliver(&self.sender, &response).await?;
                        delivered += 1;
                    }
                    Ok(None) => {}
                    Err(e) => tracing::error!("Console task failed: {}", e),
                },
            }
        }

        Ok(delivered)
    }
}

/// Formats a response the way it would be delivered, or `None` if there is
/// nothing to send.
fn render(sender: &Sender, response: &Response) -> Option<String> {
    if response.is_silent() {
        return None;
    }
    let mut out = if response.reply.is_empty() {
        String::from("[BOT]")
    } else if response.private_reply {
        format!("[BOT -> {}] {}", sender.username, response.reply)
    } else {
        format!("[BOT] {}", response.reply)
    };
    if !response.reactions.is_empty() {
        out.push_str(&format!("\n  [Reactions] {}", response.reactions.join(" ")));
    }
    Some(out)
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!(
            "Starting console bot (dev mode), commands start with `{}`",
            self.executor.command_char()
        );
        self.serve(BufReader::new(tokio::io::stdin())).await?;
        Ok(())
    }

    async fn deliver(&self, sender: &Sender, response: &Response) -> Result<(), BotError> {
        if let Some(out) = render(sender, response) {
            println!("{}", out);
        }
        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
