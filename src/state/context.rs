use std::path::Path;

use egui::{Color32, Pos2, Vec2};
use log::{debug, info};

use super::{EditorState, Settings, StateKind};
use crate::command::{Command, CommandContext, CommandHistory};
use crate::document::Document;
use crate::event::{EditorEvent, EventBus};
use crate::format::{self, Compression, DocumentError};
use crate::input::{InputMode, InputNormalizer, PressureRange};
use crate::layout::PageLayout;
use crate::raster_cache::RasterCache;
use crate::selection::{Clipboard, Selection};
use crate::tool::{ToolKind, ToolMemory};

/// An in-progress viewport drag.
#[derive(Debug, Clone, Copy)]
pub(super) struct PanGesture {
    /// Previous pointer position in viewport space
    pub(super) anchor: Pos2,
    /// Whether the tool was overridden for the drag and must be restored
    pub(super) restores_tool: bool,
}

/// Owns one editing session: the document and everything derived from it.
///
/// All mutations go through the command history, so every committed change
/// marks the document modified and emits [`EditorEvent::DocumentModified`].
/// Public operations never fail; invalid requests are ignored.
#[derive(Debug)]
pub struct EditorContext {
    pub(super) document: Document,
    pub(super) history: CommandHistory,
    pub(super) cache: RasterCache,
    pub(super) selection: Option<Selection>,
    pub(super) clipboard: Clipboard,
    pub(super) tools: ToolMemory,
    pub(super) state: EditorState,
    /// Last state kind announced on the event bus
    reported_state: StateKind,
    pub(super) normalizer: InputNormalizer,
    pub(super) settings: Settings,
    pub(super) zoom: f32,
    pub(super) scroll: Vec2,
    pub(super) viewport: Vec2,
    pub(super) pan: Option<PanGesture>,
    /// Whether the current Idle gesture erases on move
    pub(super) erasing: bool,
    /// The event bus for broadcasting editor events
    pub event_bus: EventBus,
}

impl Default for EditorContext {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl EditorContext {
    /// Starts a session on a blank one-page document.
    pub fn new(settings: Settings) -> Self {
        let document = Document::with_page(settings.page_template());
        let zoom = settings.zoom.clamp(super::MIN_ZOOM, super::MAX_ZOOM);
        let mut cache = RasterCache::new(zoom);
        cache.rebuild_all(&document, zoom);
        Self {
            document,
            history: CommandHistory::new(),
            cache,
            selection: None,
            clipboard: Clipboard::default(),
            tools: ToolMemory::default(),
            state: EditorState::Idle,
            reported_state: StateKind::Idle,
            normalizer: InputNormalizer::new(settings.pressure_range),
            settings,
            zoom,
            scroll: Vec2::ZERO,
            viewport: Vec2::ZERO,
            pan: None,
            erasing: false,
            event_bus: EventBus::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn cache(&self) -> &RasterCache {
        &self.cache
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn state_kind(&self) -> StateKind {
        self.state.kind()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn current_tool(&self) -> ToolKind {
        self.tools.current()
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Layout of the pages at the current zoom and scroll.
    pub fn layout(&self) -> PageLayout {
        PageLayout::new(&self.document, self.zoom, self.scroll)
    }

    /// Applies a command through the history. Returns whether it was committed.
    pub(super) fn run(&mut self, command: Command) -> bool {
        let mut ctx = CommandContext::new(&mut self.document, &mut self.cache, &mut self.selection);
        if self.history.execute(command, &mut ctx).is_err() {
            return false;
        }
        self.mark_modified();
        true
    }

    fn mark_modified(&mut self) {
        self.document.set_modified(true);
        self.event_bus.emit(EditorEvent::DocumentModified);
    }

    pub(super) fn set_state(&mut self, new: EditorState) {
        self.state = new;
        self.announce_state();
    }

    /// Emits a state change if the kind differs from the last one announced.
    pub(super) fn announce_state(&mut self) {
        let old = self.reported_state;
        let new = self.state.kind();
        if old != new {
            debug!("State {} -> {}", old.name(), new.name());
            self.reported_state = new;
            self.event_bus.emit(EditorEvent::StateChanged { old, new });
        }
    }

    /// After undo/redo the state follows whether a selection exists.
    fn sync_selection_state(&mut self) {
        let next = if self.selection.is_some() {
            EditorState::Selected
        } else {
            EditorState::Idle
        };
        self.set_state(next);
    }

    /// No gesture is in flight: the state is stable and neither an erase drag
    /// nor a pan is running underneath it.
    pub fn accepts_edits(&self) -> bool {
        self.state.is_stable() && !self.erasing && self.pan.is_none()
    }

    pub fn can_undo(&self) -> bool {
        self.accepts_edits() && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.accepts_edits() && self.history.can_redo()
    }

    /// Reverts the last command. Ignored mid-gesture.
    pub fn undo(&mut self) {
        if !self.can_undo() {
            return;
        }
        let mut ctx = CommandContext::new(&mut self.document, &mut self.cache, &mut self.selection);
        if self.history.undo(&mut ctx).is_ok() {
            self.mark_modified();
        }
        self.sync_selection_state();
    }

    /// Re-applies the last undone command. Ignored mid-gesture.
    pub fn redo(&mut self) {
        if !self.can_redo() {
            return;
        }
        let mut ctx = CommandContext::new(&mut self.document, &mut self.cache, &mut self.selection);
        if self.history.redo(&mut ctx).is_ok() {
            self.mark_modified();
        }
        self.sync_selection_state();
    }

    /// Permanently selects a tool.
    pub fn set_tool(&mut self, tool: ToolKind) {
        let old = self.tools.select(tool);
        if old != tool {
            self.event_bus.emit(EditorEvent::ToolChanged { old, new: tool });
        }
    }

    /// Temporarily replaces the tool for the current gesture.
    pub(super) fn override_tool(&mut self, tool: ToolKind) {
        let old = self.tools.override_with(tool);
        if old != tool {
            self.event_bus.emit(EditorEvent::ToolChanged { old, new: tool });
        }
    }

    /// Restores the tool a transient gesture replaced, if any.
    pub(super) fn restore_tool(&mut self) {
        if let Some((old, new)) = self.tools.restore() {
            if old != new {
                self.event_bus.emit(EditorEvent::ToolChanged { old, new });
            }
        }
    }

    pub fn pen_color(&self) -> Color32 {
        self.settings.pen_color
    }

    /// Sets the pen color; with an active selection also recolors it.
    pub fn set_color(&mut self, color: Color32) {
        self.settings.pen_color = color;
        if matches!(self.state, EditorState::Selected) {
            if let Some(selection) = &self.selection {
                let command = Command::change_selection_color(selection, color);
                self.run(command);
            }
        }
    }

    pub fn pen_width(&self) -> f32 {
        self.settings.pen_width
    }

    pub fn set_pen_width(&mut self, width: f32) {
        if width.is_finite() && width > 0.0 {
            self.settings.pen_width = width;
        }
    }

    pub fn set_input_mode(&mut self, mode: InputMode) {
        self.settings.input_mode = mode;
    }

    pub fn set_pressure_range(&mut self, range: PressureRange) {
        self.settings.pressure_range = range;
        self.normalizer.pressure_range = range;
    }

    /// Adopts loaded preferences without touching the document.
    pub fn apply_settings(&mut self, settings: Settings) {
        self.normalizer.pressure_range = settings.pressure_range;
        let zoom = settings.zoom;
        self.settings = settings;
        self.set_zoom(zoom);
    }

    /// Copies the current selection to the clipboard.
    pub fn copy(&mut self) {
        if let Some(selection) = &self.selection {
            self.clipboard.set(selection.clone());
        }
    }

    /// Moves the current selection to the clipboard, removing it from the document.
    pub fn cut(&mut self) {
        if !self.accepts_edits() || !matches!(self.state, EditorState::Selected) {
            return;
        }
        let Some(selection) = self.selection.clone() else {
            return;
        };
        let command = Command::release_selection(&self.document, &selection, false);
        self.clipboard.set(selection);
        self.run(command);
        self.sync_selection_state();
    }

    /// Releases any selection, then installs the clipboard on the current page.
    pub fn paste(&mut self) {
        if !self.accepts_edits() {
            return;
        }
        let Some(mut pasted) = self.clipboard.get().cloned() else {
            return;
        };
        self.release_selection();
        pasted.rehome(self.current_page());
        if self.run(Command::PasteSelection { selection: pasted }) {
            self.set_state(EditorState::Selected);
        }
    }

    /// Merges the current selection back into its page.
    pub fn release_selection(&mut self) {
        if let Some(selection) = &self.selection {
            let command = Command::release_selection(&self.document, selection, true);
            self.run(command);
        }
        if matches!(self.state, EditorState::Selected) {
            self.set_state(EditorState::Idle);
        }
    }

    /// The document as it should be written to disk: an active selection is
    /// merged back into its page.
    pub fn snapshot(&self) -> Document {
        let mut document = self.document.clone();
        if let Some(selection) = &self.selection {
            let page = document.clamp_page(selection.page());
            if let Some(target) = document.pages.get_mut(page) {
                target.strokes.extend(selection.strokes().iter().cloned());
            }
        }
        document
    }

    fn reset_session(&mut self, document: Document) {
        self.document = document;
        self.history.clear();
        self.selection = None;
        self.pan = None;
        self.erasing = false;
        self.set_state(EditorState::Idle);
        self.scroll = Vec2::ZERO;
        self.cache.rebuild_all(&self.document, self.zoom);
        self.event_bus.emit(EditorEvent::DocumentReplaced);
    }

    /// Replaces the document with a blank one. History is dropped.
    pub fn new_document(&mut self) {
        info!("New document");
        self.reset_session(Document::with_page(self.settings.page_template()));
    }

    /// Installs a loaded document and fits its width to the viewport.
    pub fn set_document(&mut self, document: Document) {
        self.reset_session(document);
        self.zoom_fit_width();
    }

    /// Loads a document from disk. On failure the current session is untouched.
    pub fn open(&mut self, path: &Path) -> Result<(), DocumentError> {
        let mut document = format::load_document(path)?;
        document.set_path(path);
        document.set_modified(false);
        info!("Opened {} ({} pages)", path.display(), document.page_count());
        self.set_document(document);
        Ok(())
    }

    /// Writes the document to `path` and makes it the document's file.
    pub fn save(&mut self, path: &Path, compression: Compression) -> Result<(), DocumentError> {
        format::save_document(&self.snapshot(), path, compression)?;
        self.document.set_path(path);
        self.document.set_modified(false);
        info!("Saved {}", path.display());
        Ok(())
    }
}
