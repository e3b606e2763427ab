//! The interaction state machine.
//!
//! ```text
//!            press (pen)          release
//!   Idle ──────────────► Drawing ─────────► Idle
//!    │  press (select / right)      release, nothing inside
//!    ├─────────────────► Selecting ─────────────────────► Idle
//!    │                       │ release, strokes inside
//!    │                       ▼
//!    │    press outside   Selected ◄──────────┐
//!    ◄────────────────────   │ press inside   │ release
//!                            ▼                │
//!                      ModifyingSelection ────┘
//! ```
//!
//! Panning is not a state: it is a sub-mode entered from `Idle` or
//! `Selected` and tracked next to the state by the editor context.

use egui::Pos2;
use serde::{Deserialize, Serialize};

use crate::stroke::MutableStroke;

/// The possible states of the editor, with the data each gesture carries.
#[derive(Debug, Clone, Default)]
pub enum EditorState {
    /// No gesture in progress and no selection
    #[default]
    Idle,
    /// A pen stroke is being drawn on `page`
    Drawing { page: usize, stroke: MutableStroke },
    /// A lasso is being drawn on `page`, vertices in page space
    Selecting { page: usize, lasso: Vec<Pos2> },
    /// A selection exists and no gesture is in progress
    Selected,
    /// The selection follows the pointer; `last_canvas` is the previous
    /// pointer position in canvas space
    ModifyingSelection { last_canvas: Pos2 },
}

/// Data-free discriminant of [`EditorState`], used in notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateKind {
    Idle,
    Drawing,
    Selecting,
    Selected,
    ModifyingSelection,
}

impl StateKind {
    pub fn name(&self) -> &'static str {
        match self {
            StateKind::Idle => "Idle",
            StateKind::Drawing => "Drawing",
            StateKind::Selecting => "Selecting",
            StateKind::Selected => "Selected",
            StateKind::ModifyingSelection => "ModifyingSelection",
        }
    }
}

impl EditorState {
    pub fn kind(&self) -> StateKind {
        match self {
            EditorState::Idle => StateKind::Idle,
            EditorState::Drawing { .. } => StateKind::Drawing,
            EditorState::Selecting { .. } => StateKind::Selecting,
            EditorState::Selected => StateKind::Selected,
            EditorState::ModifyingSelection { .. } => StateKind::ModifyingSelection,
        }
    }

    /// Idle or Selected: no gesture has partially applied effects, so
    /// undo/redo and page edits are allowed.
    pub fn is_stable(&self) -> bool {
        matches!(self, EditorState::Idle | EditorState::Selected)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, EditorState::Idle)
    }

    /// The lasso being drawn, with its page
    pub fn lasso(&self) -> Option<(usize, &[Pos2])> {
        match self {
            EditorState::Selecting { page, lasso } => Some((*page, lasso)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Color32, pos2};

    #[test]
    fn stable_states() {
        assert!(EditorState::Idle.is_stable());
        assert!(EditorState::Selected.is_stable());
        let drawing = EditorState::Drawing {
            page: 0,
            stroke: MutableStroke::new(Color32::BLACK, 1.0, pos2(0.0, 0.0), 1.0),
        };
        assert!(!drawing.is_stable());
        assert_eq!(drawing.kind(), StateKind::Drawing);
        assert!(!EditorState::ModifyingSelection { last_canvas: Pos2::ZERO }.is_stable());
    }
}
