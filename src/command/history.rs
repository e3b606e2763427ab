use log::{debug, warn};

use super::{Command, CommandContext, CommandError, CommandResult};

/// Linear undo/redo log. Pushing a new command drops everything that was undone.
#[derive(Debug, Default)]
pub struct CommandHistory {
    /// Stack of commands that can be undone
    undo_stack: Vec<Command>,
    /// Stack of commands that can be redone
    redo_stack: Vec<Command>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `command` and records it. Failed commands are not recorded.
    pub fn execute(&mut self, command: Command, ctx: &mut CommandContext<'_>) -> CommandResult {
        if let Err(e) = command.execute(ctx) {
            warn!("Command {} rejected: {}", command.name(), e);
            return Err(e);
        }
        debug!("Executed {}", command.name());
        self.undo_stack.push(command);
        self.redo_stack.clear();
        Ok(())
    }

    /// Reverts the most recent command.
    pub fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult {
        let command = self.undo_stack.pop().ok_or(CommandError::InvalidState)?;
        match command.undo(ctx) {
            Ok(()) => {
                debug!("Undid {}", command.name());
                self.redo_stack.push(command);
                Ok(())
            }
            Err(e) => {
                warn!("Undo of {} failed: {}", command.name(), e);
                self.undo_stack.push(command);
                Err(e)
            }
        }
    }

    /// Re-applies the most recently undone command.
    pub fn redo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult {
        let command = self.redo_stack.pop().ok_or(CommandError::InvalidState)?;
        match command.execute(ctx) {
            Ok(()) => {
                debug!("Redid {}", command.name());
                self.undo_stack.push(command);
                Ok(())
            }
            Err(e) => {
                warn!("Redo of {} failed: {}", command.name(), e);
                self.redo_stack.push(command);
                Err(e)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_stack(&self) -> &[Command] {
        &self.undo_stack
    }

    pub fn redo_stack(&self) -> &[Command] {
        &self.redo_stack
    }

    /// Drops all history. Not undoable.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
