use serde::{Deserialize, Serialize};

/// The user-selectable tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToolKind {
    #[default]
    Pen,
    Eraser,
    Select,
    Hand,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [ToolKind::Pen, ToolKind::Eraser, ToolKind::Select, ToolKind::Hand];

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Pen => "Pen",
            ToolKind::Eraser => "Eraser",
            ToolKind::Select => "Select",
            ToolKind::Hand => "Hand",
        }
    }
}

/// The active tool plus the one a transient gesture temporarily replaced.
///
/// Right-click lasso, eraser-tip contact and middle-button pan override the
/// tool for one gesture; releasing restores the remembered one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToolMemory {
    current: ToolKind,
    previous: Option<ToolKind>,
}

impl ToolMemory {
    pub fn new(current: ToolKind) -> Self {
        Self {
            current,
            previous: None,
        }
    }

    pub fn current(&self) -> ToolKind {
        self.current
    }

    pub fn previous(&self) -> Option<ToolKind> {
        self.previous
    }

    /// Permanently selects a tool, forgetting any remembered one.
    pub fn select(&mut self, tool: ToolKind) -> ToolKind {
        self.previous = None;
        std::mem::replace(&mut self.current, tool)
    }

    /// Switches to `tool` for the current gesture, remembering the active one.
    /// Returns the tool that was active.
    pub fn override_with(&mut self, tool: ToolKind) -> ToolKind {
        if self.previous.is_none() {
            self.previous = Some(self.current);
        }
        std::mem::replace(&mut self.current, tool)
    }

    /// Restores the remembered tool. Returns `(old, new)` when it changed anything.
    pub fn restore(&mut self) -> Option<(ToolKind, ToolKind)> {
        let previous = self.previous.take()?;
        let old = std::mem::replace(&mut self.current, previous);
        Some((old, previous))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_then_restore() {
        let mut tools = ToolMemory::new(ToolKind::Pen);
        tools.override_with(ToolKind::Select);
        assert_eq!(tools.current(), ToolKind::Select);
        assert_eq!(tools.restore(), Some((ToolKind::Select, ToolKind::Pen)));
        assert_eq!(tools.current(), ToolKind::Pen);
        assert_eq!(tools.restore(), None);
    }

    #[test]
    fn nested_override_keeps_first_tool() {
        let mut tools = ToolMemory::new(ToolKind::Select);
        tools.override_with(ToolKind::Eraser);
        tools.override_with(ToolKind::Hand);
        tools.restore();
        assert_eq!(tools.current(), ToolKind::Select);
    }
}
