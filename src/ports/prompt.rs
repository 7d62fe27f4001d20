use async_trait::async_trait;
use thiserror::Error;

/// Error type for interactive prompts
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PromptError {
    /// The input stream ended before an answer was given
    #[error("input exhausted")]
    InputExhausted,

    /// Reading from or writing to the terminal failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for prompt operations
pub type PromptResult<T> = Result<T, PromptError>;

/// InteractivePrompt defines the port for line based operator interaction
#[async_trait]
pub trait InteractivePrompt: Send {
    /// Show a titled, 1-based numbered list of choices
    async fn present(&mut self, title: &str, choices: &[String]) -> PromptResult<()>;

    /// Block until the operator enters a number in `1..=count`
    ///
    /// Non-numeric and out-of-range entries are rejected and asked again.
    async fn select_index(&mut self, count: usize) -> PromptResult<usize>;

    /// Block until the operator enters one line of free text
    async fn read_line(&mut self, label: &str) -> PromptResult<String>;
}
