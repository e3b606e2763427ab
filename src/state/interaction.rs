use egui::{Pos2, Vec2};
use log::{debug, trace};

use super::EditorContext;
use super::context::PanGesture;
use super::editor_state::EditorState;
use crate::command::Command;
use crate::event::EditorEvent;
use crate::geometry::hit_testing::{ERASER_SIZE, EraserSquare, stroke_inside_polygon, strokes_hit_by_eraser};
use crate::input::{Button, CanonicalEvent, Phase, Pointer, RawEvent};
use crate::stroke::MutableStroke;
use crate::tool::ToolKind;

impl EditorContext {
    /// Normalizes a raw device event and feeds it to the state machine.
    pub fn handle_raw_event(&mut self, raw: &RawEvent) {
        let layout = self.layout();
        let input_mode = self.settings.input_mode;
        if let Some(event) = self.normalizer.normalize(raw, &layout, input_mode) {
            self.handle_event(event);
        }
    }

    /// Advances the state machine by one canonical event.
    pub fn handle_event(&mut self, event: CanonicalEvent) {
        let event = CanonicalEvent {
            page: self.document.clamp_page(event.page),
            ..event
        };
        trace!("{:?} in {}", event, self.state.kind().name());

        if self.pan.is_some() {
            self.continue_pan(&event);
            return;
        }
        if event.is_pan() && event.phase == Phase::Press && self.state.is_stable() {
            self.begin_pan(event.screen_pos, true);
            return;
        }

        match std::mem::take(&mut self.state) {
            EditorState::Idle => self.on_idle(event),
            EditorState::Drawing { page, stroke } => self.on_drawing(event, page, stroke),
            EditorState::Selecting { page, lasso } => self.on_selecting(event, page, lasso),
            EditorState::Selected => self.on_selected(event),
            EditorState::ModifyingSelection { last_canvas } => self.on_modifying(event, last_canvas),
        }
        self.announce_state();
    }

    fn begin_pan(&mut self, anchor: Pos2, restores_tool: bool) {
        if restores_tool && self.tools.current() != ToolKind::Hand {
            self.override_tool(ToolKind::Hand);
        }
        self.pan = Some(PanGesture { anchor, restores_tool });
    }

    fn continue_pan(&mut self, event: &CanonicalEvent) {
        let Some(pan) = self.pan else {
            return;
        };
        match event.phase {
            Phase::Press => {}
            Phase::Move => {
                self.scroll_by(pan.anchor - event.screen_pos);
                self.pan = Some(PanGesture {
                    anchor: event.screen_pos,
                    ..pan
                });
            }
            Phase::Release => {
                self.pan = None;
                if pan.restores_tool {
                    self.restore_tool();
                }
            }
        }
    }

    fn on_idle(&mut self, event: CanonicalEvent) {
        match event.phase {
            Phase::Press => {
                if event.pointer == Pointer::Eraser {
                    self.override_tool(ToolKind::Eraser);
                    self.erasing = true;
                    self.erase_at(event.page, event.page_pos);
                    return;
                }
                if event.button == Button::Secondary {
                    self.override_tool(ToolKind::Select);
                    self.begin_lasso(event.page, event.page_pos);
                    return;
                }
                if event.button != Button::Primary {
                    return;
                }
                match self.tools.current() {
                    ToolKind::Pen => {
                        let stroke = MutableStroke::new(
                            self.settings.pen_color,
                            self.settings.pen_width,
                            event.page_pos,
                            event.pressure,
                        );
                        self.set_state(EditorState::Drawing {
                            page: event.page,
                            stroke,
                        });
                    }
                    ToolKind::Eraser => {
                        self.erasing = true;
                        self.erase_at(event.page, event.page_pos);
                    }
                    ToolKind::Select => self.begin_lasso(event.page, event.page_pos),
                    ToolKind::Hand => self.begin_pan(event.screen_pos, false),
                }
            }
            Phase::Move => {
                if self.erasing {
                    self.erase_at(event.page, event.page_pos);
                }
            }
            Phase::Release => {
                self.erasing = false;
                self.restore_tool();
            }
        }
    }

    fn on_drawing(&mut self, event: CanonicalEvent, page: usize, mut stroke: MutableStroke) {
        // Samples stay on the page the stroke started on, even past its edge.
        let pos = self.position_on(page, event.screen_pos);
        match event.phase {
            Phase::Press => self.state = EditorState::Drawing { page, stroke },
            Phase::Move => {
                let dirty = stroke.add_point(pos, event.pressure);
                self.cache
                    .update_region(&self.document, page, dirty, Some(stroke.as_stroke()));
                self.event_bus.emit(EditorEvent::RepaintRequested {
                    page: Some(page),
                    rect: Some(dirty),
                });
                self.state = EditorState::Drawing { page, stroke };
            }
            Phase::Release => {
                stroke.add_point(pos, event.pressure);
                let stroke = stroke.into_stroke();
                debug!("Stroke finished with {} points on page {}", stroke.points().len(), page);
                self.set_state(EditorState::Idle);
                self.run(Command::AddStroke { page, stroke });
                self.restore_tool();
            }
        }
    }

    fn begin_lasso(&mut self, page: usize, start: Pos2) {
        self.set_state(EditorState::Selecting {
            page,
            lasso: vec![start],
        });
    }

    fn on_selecting(&mut self, event: CanonicalEvent, page: usize, mut lasso: Vec<Pos2>) {
        let pos = self.position_on(page, event.screen_pos);
        match event.phase {
            Phase::Press => self.state = EditorState::Selecting { page, lasso },
            Phase::Move => {
                lasso.push(pos);
                self.state = EditorState::Selecting { page, lasso };
                self.event_bus.emit(EditorEvent::RepaintRequested {
                    page: Some(page),
                    rect: None,
                });
            }
            Phase::Release => {
                lasso.push(pos);
                self.finish_lasso(page, lasso);
                self.restore_tool();
            }
        }
    }

    fn finish_lasso(&mut self, page: usize, lasso: Vec<Pos2>) {
        let indices: Vec<usize> = self
            .document
            .page(page)
            .map(|p| {
                p.strokes
                    .iter()
                    .enumerate()
                    .filter(|(_, stroke)| stroke_inside_polygon(stroke, &lasso))
                    .map(|(i, _)| i)
                    .collect()
            })
            .unwrap_or_default();

        if indices.is_empty() {
            debug!("Lasso on page {} contains no strokes", page);
            self.set_state(EditorState::Idle);
            return;
        }

        debug!("Lasso selected {} strokes on page {}", indices.len(), page);
        let committed = self.run(Command::CreateSelection {
            page,
            indices,
            polygon: lasso,
        });
        self.set_state(if committed {
            EditorState::Selected
        } else {
            EditorState::Idle
        });
    }

    fn on_selected(&mut self, event: CanonicalEvent) {
        self.state = EditorState::Selected;
        match event.phase {
            Phase::Press => {
                let inside = self
                    .selection
                    .as_ref()
                    .is_some_and(|selection| selection.hit(event.page, event.page_pos));
                if inside {
                    let last_canvas = self.layout().to_canvas(event.screen_pos);
                    self.set_state(EditorState::ModifyingSelection { last_canvas });
                } else {
                    // The press only releases; it does not start another gesture.
                    self.release_selection();
                }
            }
            Phase::Move => {}
            Phase::Release => self.restore_tool(),
        }
    }

    fn on_modifying(&mut self, event: CanonicalEvent, last_canvas: Pos2) {
        match event.phase {
            Phase::Press => self.state = EditorState::ModifyingSelection { last_canvas },
            Phase::Move => {
                let canvas = self.layout().to_canvas(event.screen_pos);
                self.move_selection(last_canvas, canvas);
                self.state = EditorState::ModifyingSelection { last_canvas: canvas };
            }
            Phase::Release => {
                self.set_state(EditorState::Selected);
                self.restore_tool();
            }
        }
    }

    /// Moves the selection with the pointer from `from` to `to` (canvas space).
    /// Crossing onto another page rebases the selection into that page's coordinates.
    fn move_selection(&mut self, from: Pos2, to: Pos2) {
        let Some(selection) = &self.selection else {
            return;
        };
        let from_page = selection.page();
        let layout = self.layout();
        let from_page = self.document.clamp_page(from_page);
        let to_page = layout.page_at(to);
        let delta = layout.to_page(to, to_page) - layout.to_page(from, from_page);
        if delta == Vec2::ZERO && to_page == from_page {
            return;
        }
        let command = Command::transform_selection(selection, delta, to_page);
        self.run(command);
    }

    /// Removes every stroke on `page` touched by the eraser square at `pos`,
    /// one command per stroke, highest index first.
    fn erase_at(&mut self, page: usize, pos: Pos2) {
        let eraser = EraserSquare::new(pos, ERASER_SIZE);
        let hits = match self.document.page(page) {
            Some(p) => strokes_hit_by_eraser(&p.strokes, &eraser),
            None => return,
        };
        if !hits.is_empty() {
            debug!("Erasing {} strokes on page {}", hits.len(), page);
        }
        for index in hits {
            if let Some(command) = Command::remove_stroke(&self.document, page, index) {
                self.run(command);
            }
        }
    }

    /// Maps a viewport position into the coordinates of a fixed page.
    fn position_on(&self, page: usize, screen_pos: Pos2) -> Pos2 {
        let layout = self.layout();
        layout.to_page(layout.to_canvas(screen_pos), page)
    }
}
