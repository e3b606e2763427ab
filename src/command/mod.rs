mod commands;
mod context;
mod history;

pub use commands::Command;
pub use context::CommandContext;
pub use history::CommandHistory;

/// Result type for command operations
pub type CommandResult = Result<(), CommandError>;

/// Errors that can occur during command execution
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    /// The command cannot be applied in the current state
    #[error("command not applicable in the current state")]
    InvalidState,
    /// The command refers to pages or strokes that do not exist
    #[error("invalid command parameters: {0}")]
    InvalidParameters(String),
}
