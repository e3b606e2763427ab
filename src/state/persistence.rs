use std::fs;
use std::path::Path;

use egui::Color32;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::{InputMode, PressureRange};
use crate::page::{DEFAULT_PAGE_HEIGHT, DEFAULT_PAGE_WIDTH, Page};

/// Errors that can occur while loading or storing settings
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize settings: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// User preferences that survive restarts.
///
/// Missing fields fall back to their defaults, so older files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base width of new strokes, in page units
    pub pen_width: f32,
    pub pen_color: Color32,
    /// Affine remap applied to raw pen pressure
    #[serde(flatten)]
    pub pressure_range: PressureRange,
    /// Zoom used for new sessions
    pub zoom: f32,
    pub page_width: f32,
    pub page_height: f32,
    pub page_background: Color32,
    pub input_mode: InputMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pen_width: 1.41,
            pen_color: Color32::BLACK,
            pressure_range: PressureRange::default(),
            zoom: 1.0,
            page_width: DEFAULT_PAGE_WIDTH,
            page_height: DEFAULT_PAGE_HEIGHT,
            page_background: Color32::WHITE,
            input_mode: InputMode::default(),
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> PersistenceResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&json)?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> PersistenceResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// A blank page with the configured size and background.
    pub fn page_template(&self) -> Page {
        Page::new(self.page_width, self.page_height, self.page_background)
    }
}
