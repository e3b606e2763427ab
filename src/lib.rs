#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod command;
pub mod document;
pub mod event;
pub mod export;
pub mod format;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod page;
pub mod panels;
pub mod raster_cache;
pub mod renderer;
pub mod selection;
pub mod state;
pub mod stroke;
pub mod texture_manager;
pub mod tool;

pub use app::InkApp;
pub use command::{Command, CommandHistory};
pub use document::Document;
pub use page::Page;
pub use selection::{Clipboard, Selection};
pub use state::{EditorContext, EditorState, Settings, StateKind};
pub use stroke::Stroke;
pub use tool::ToolKind;
