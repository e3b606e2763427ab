use egui::Pos2;
use serde::{Deserialize, Serialize};

use crate::layout::PageLayout;

mod handler;
pub use handler::InputHandler;

/// The physical source of a raw pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    /// Tablet pen, writing end.
    StylusTip,
    /// Tablet pen, eraser end.
    StylusEraser,
    Mouse,
    /// The pan button on the tablet pen barrel.
    PanButton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Press,
    Move,
    Release,
}

/// Which end of the pointer is in use after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pointer {
    Pen,
    Eraser,
}

/// Whether a tablet is driving input. In tablet mode mouse events are
/// ignored, since the windowing system synthesizes them from pen contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputMode {
    #[default]
    Mouse,
    Tablet,
}

/// A pointer sample as delivered by the platform, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawEvent {
    pub device: DeviceClass,
    pub button: Button,
    pub phase: Phase,
    pub position: Pos2,
    /// Raw pen pressure in `[0, 1]`, when the device reports one.
    pub pressure: Option<f32>,
}

impl RawEvent {
    pub fn mouse(phase: Phase, button: Button, position: Pos2) -> Self {
        Self {
            device: DeviceClass::Mouse,
            button,
            phase,
            position,
            pressure: None,
        }
    }

    pub fn stylus(phase: Phase, position: Pos2, pressure: f32) -> Self {
        Self {
            device: DeviceClass::StylusTip,
            button: Button::Primary,
            phase,
            position,
            pressure: Some(pressure),
        }
    }

    pub fn eraser(phase: Phase, position: Pos2, pressure: f32) -> Self {
        Self {
            device: DeviceClass::StylusEraser,
            ..Self::stylus(phase, position, pressure)
        }
    }
}

/// A device-independent event in page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanonicalEvent {
    pub phase: Phase,
    pub pointer: Pointer,
    pub button: Button,
    /// Viewport position, used for screen-space deltas such as panning.
    pub screen_pos: Pos2,
    pub page: usize,
    pub page_pos: Pos2,
    pub pressure: f32,
}

impl CanonicalEvent {
    /// Middle button (or pen barrel button) held with the pen end.
    pub fn is_pan(&self) -> bool {
        self.button == Button::Middle && self.pointer == Pointer::Pen
    }
}

/// Affine remap of raw pen pressure into a width multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureRange {
    pub min_width_multiplier: f32,
    pub max_width_multiplier: f32,
}

impl Default for PressureRange {
    fn default() -> Self {
        Self {
            min_width_multiplier: 0.0,
            max_width_multiplier: 1.0,
        }
    }
}

impl PressureRange {
    pub fn apply(&self, raw: f32) -> f32 {
        self.min_width_multiplier + raw * (self.max_width_multiplier - self.min_width_multiplier)
    }
}

/// Turns raw device events into [`CanonicalEvent`]s.
///
/// Mouse events are dropped while a stylus is in contact, and always in
/// [`InputMode::Tablet`].
#[derive(Debug, Clone, Default)]
pub struct InputNormalizer {
    pub pressure_range: PressureRange,
    stylus_contact: bool,
}

impl InputNormalizer {
    pub fn new(pressure_range: PressureRange) -> Self {
        Self {
            pressure_range,
            stylus_contact: false,
        }
    }

    pub fn stylus_contact(&self) -> bool {
        self.stylus_contact
    }

    pub fn normalize(&mut self, raw: &RawEvent, layout: &PageLayout, mode: InputMode) -> Option<CanonicalEvent> {
        let (pointer, button, pressure) = match raw.device {
            DeviceClass::Mouse => {
                if self.stylus_contact || mode == InputMode::Tablet {
                    return None;
                }
                (Pointer::Pen, raw.button, 1.0)
            }
            DeviceClass::StylusTip | DeviceClass::StylusEraser | DeviceClass::PanButton => {
                match raw.phase {
                    Phase::Press => self.stylus_contact = true,
                    Phase::Release => self.stylus_contact = false,
                    Phase::Move => {}
                }
                let pressure = self.pressure_range.apply(raw.pressure.unwrap_or(1.0));
                match raw.device {
                    DeviceClass::StylusEraser => (Pointer::Eraser, raw.button, pressure),
                    DeviceClass::PanButton => (Pointer::Pen, Button::Middle, pressure),
                    _ => (Pointer::Pen, raw.button, pressure),
                }
            }
        };

        let (page, page_pos) = layout.locate(raw.position);
        Some(CanonicalEvent {
            phase: raw.phase,
            pointer,
            button,
            screen_pos: raw.position,
            page,
            page_pos,
            pressure,
        })
    }
}
