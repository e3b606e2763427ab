use egui::{Context, PointerButton, Rect, TouchPhase};

use super::{Button, DeviceClass, Phase, RawEvent};

/// Collects egui pointer and touch input over the canvas viewport as [`RawEvent`]s.
///
/// Touches that report a force are treated as pen samples; plain finger
/// touches are left to egui's synthesized pointer events.
#[derive(Debug, Default)]
pub struct InputHandler {
    held_button: Option<Button>,
    stylus_down: bool,
}

fn map_button(button: PointerButton) -> Option<Button> {
    match button {
        PointerButton::Primary => Some(Button::Primary),
        PointerButton::Secondary => Some(Button::Secondary),
        PointerButton::Middle => Some(Button::Middle),
        _ => None,
    }
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translates this frame's input. `viewport` is the on-screen rect of the
    /// visible canvas area; positions are reported relative to its top-left.
    pub fn process_input(&mut self, ctx: &Context, viewport: Rect) -> Vec<RawEvent> {
        let mut events = Vec::new();

        ctx.input(|input| {
            for event in &input.events {
                match event {
                    egui::Event::PointerButton {
                        pos,
                        button,
                        pressed,
                        ..
                    } => {
                        let Some(button) = map_button(*button) else {
                            continue;
                        };
                        if *pressed {
                            if !viewport.contains(*pos) || self.held_button.is_some() {
                                continue;
                            }
                            self.held_button = Some(button);
                            events.push(RawEvent::mouse(Phase::Press, button, *pos - viewport.min.to_vec2()));
                        } else if self.held_button == Some(button) {
                            self.held_button = None;
                            events.push(RawEvent::mouse(Phase::Release, button, *pos - viewport.min.to_vec2()));
                        }
                    }
                    egui::Event::PointerMoved(pos) => {
                        if let Some(button) = self.held_button {
                            events.push(RawEvent::mouse(Phase::Move, button, *pos - viewport.min.to_vec2()));
                        }
                    }
                    egui::Event::Touch {
                        phase,
                        pos,
                        force: Some(force),
                        ..
                    } => {
                        let phase = match phase {
                            TouchPhase::Start => {
                                if !viewport.contains(*pos) {
                                    continue;
                                }
                                self.stylus_down = true;
                                Phase::Press
                            }
                            TouchPhase::Move if self.stylus_down => Phase::Move,
                            TouchPhase::End | TouchPhase::Cancel if self.stylus_down => {
                                self.stylus_down = false;
                                Phase::Release
                            }
                            _ => continue,
                        };
                        events.push(RawEvent {
                            device: DeviceClass::StylusTip,
                            button: Button::Primary,
                            phase,
                            position: *pos - viewport.min.to_vec2(),
                            pressure: Some(force.clamp(0.0, 1.0)),
                        });
                    }
                    _ => {}
                }
            }
        });

        events
    }
}
