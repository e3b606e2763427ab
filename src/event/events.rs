use egui::{Rect, Vec2};

use crate::state::StateKind;
use crate::tool::ToolKind;

/// Notifications emitted by the editor core towards the UI shell.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    ToolChanged {
        old: ToolKind,
        new: ToolKind,
    },
    StateChanged {
        old: StateKind,
        new: StateKind,
    },
    /// A mutation was committed (pushed, undone or redone).
    DocumentModified,
    /// The whole document was replaced (new/open).
    DocumentReplaced,
    ViewChanged {
        zoom: f32,
        scroll: Vec2,
    },
    /// Part of a page needs repainting; `None` means the whole view.
    RepaintRequested {
        page: Option<usize>,
        rect: Option<Rect>,
    },
}
