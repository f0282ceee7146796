//! Message handling - Tokenizing and executing command lines

pub mod executor;
pub mod tokenizer;

pub use executor::CommandExecutor;
pub use tokenizer::{tokenize, Invocation};
