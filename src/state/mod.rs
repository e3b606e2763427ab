mod context;
mod editor_state;
mod interaction;
mod navigation;
mod persistence;

pub use context::EditorContext;
pub use editor_state::{EditorState, StateKind};
pub use navigation::{MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
pub use persistence::{PersistenceError, PersistenceResult, Settings};
