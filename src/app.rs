use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{info, warn};

use crate::event::EditorEvent;
use crate::export;
use crate::format::Compression;
use crate::input::InputHandler;
use crate::panels::{central_panel, tools_panel};
use crate::state::{EditorContext, Settings};
use crate::texture_manager::TextureManager;

/// The eframe shell around one [`EditorContext`].
///
/// Only the [`Settings`] are persisted between runs; documents are saved
/// explicitly.
pub struct InkApp {
    pub(crate) editor: EditorContext,
    pub(crate) input: InputHandler,
    pub(crate) textures: TextureManager,
    /// Path typed into the file field of the tools panel
    pub(crate) file_path: String,
    pub(crate) compress: bool,
    pub(crate) status: Option<String>,
    /// Bumped on every document or view change; versions the selection overlay texture
    pub(crate) overlay_version: Rc<Cell<u64>>,
    title: String,
}

impl Default for InkApp {
    fn default() -> Self {
        Self::with_settings(Settings::default())
    }
}

impl InkApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, open: Option<PathBuf>) -> Self {
        let settings = cc
            .storage
            .and_then(|storage| eframe::get_value::<Settings>(storage, eframe::APP_KEY))
            .unwrap_or_default();
        let mut app = Self::with_settings(settings);
        if let Some(path) = open {
            app.open(&path);
        }
        app
    }

    pub fn with_settings(settings: Settings) -> Self {
        let editor = EditorContext::new(settings);
        let overlay_version = Rc::new(Cell::new(0));
        {
            let overlay_version = Rc::clone(&overlay_version);
            editor.event_bus.subscribe(move |event: &EditorEvent| {
                match event {
                    EditorEvent::ToolChanged { old, new } => {
                        log::debug!("Tool {} -> {}", old.name(), new.name());
                    }
                    EditorEvent::RepaintRequested { .. } => return,
                    _ => {}
                }
                overlay_version.set(overlay_version.get() + 1);
            });
        }
        Self {
            editor,
            input: InputHandler::new(),
            textures: TextureManager::new(),
            file_path: String::new(),
            compress: false,
            status: None,
            overlay_version,
            title: String::new(),
        }
    }

    pub fn editor(&self) -> &EditorContext {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut EditorContext {
        &mut self.editor
    }

    fn report(&mut self, message: String) {
        info!("{message}");
        self.status = Some(message);
    }

    fn report_error(&mut self, message: String) {
        warn!("{message}");
        self.status = Some(message);
    }

    pub(crate) fn new_document(&mut self) {
        self.editor.new_document();
        self.textures.clear_cache();
        self.file_path.clear();
        self.report("New document".to_string());
    }

    pub(crate) fn open(&mut self, path: &Path) {
        match self.editor.open(path) {
            Ok(()) => {
                self.textures.clear_cache();
                self.file_path = path.display().to_string();
                self.report(format!("Opened {}", path.display()));
            }
            Err(e) => self.report_error(format!("Could not open {}: {e}", path.display())),
        }
    }

    pub(crate) fn save(&mut self, path: &Path) {
        let compression = if self.compress {
            Compression::Gzip
        } else {
            Compression::None
        };
        match self.editor.save(path, compression) {
            Ok(()) => self.report(format!("Saved {}", path.display())),
            Err(e) => self.report_error(format!("Could not save {}: {e}", path.display())),
        }
    }

    pub(crate) fn export_pdf(&mut self, path: &Path) {
        match export::export_pdf(&self.editor.snapshot(), path) {
            Ok(()) => self.report(format!("Exported {}", path.display())),
            Err(e) => self.report_error(format!("PDF export failed: {e}")),
        }
    }

    pub(crate) fn export_png(&mut self, path: &Path) {
        let snapshot = self.editor.snapshot();
        let page = self.editor.current_page();
        let Some(page) = snapshot.page(page) else {
            return;
        };
        match export::export_png(page, self.editor.zoom(), path) {
            Ok(()) => self.report(format!("Exported {}", path.display())),
            Err(e) => self.report_error(format!("PNG export failed: {e}")),
        }
    }

    pub(crate) fn load_settings(&mut self, path: &Path) {
        match Settings::load(path) {
            Ok(settings) => {
                self.editor.apply_settings(settings);
                self.report(format!("Loaded settings from {}", path.display()));
            }
            Err(e) => self.report_error(format!("Could not load settings: {e}")),
        }
    }

    pub(crate) fn save_settings(&mut self, path: &Path) {
        match self.editor.settings().save(path) {
            Ok(()) => self.report(format!("Saved settings to {}", path.display())),
            Err(e) => self.report_error(format!("Could not save settings: {e}")),
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (undo, redo, copy, cut, paste, zoom_in, zoom_out, page_up, page_down) = ctx.input(|i| {
            let command = i.modifiers.command;
            let mut copy = false;
            let mut cut = false;
            let mut paste = false;
            for event in &i.events {
                match event {
                    egui::Event::Copy => copy = true,
                    egui::Event::Cut => cut = true,
                    egui::Event::Paste(_) => paste = true,
                    _ => {}
                }
            }
            (
                command && !i.modifiers.shift && i.key_pressed(egui::Key::Z),
                command && (i.key_pressed(egui::Key::Y) || (i.modifiers.shift && i.key_pressed(egui::Key::Z))),
                copy,
                cut,
                paste,
                command && (i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals)),
                command && i.key_pressed(egui::Key::Minus),
                i.key_pressed(egui::Key::PageUp),
                i.key_pressed(egui::Key::PageDown),
            )
        });

        if ctx.wants_keyboard_input() {
            return;
        }
        if undo {
            self.editor.undo();
        }
        if redo {
            self.editor.redo();
        }
        if copy {
            self.editor.copy();
        }
        if cut {
            self.editor.cut();
        }
        if paste {
            self.editor.paste();
        }
        if zoom_in {
            self.editor.zoom_in();
        }
        if zoom_out {
            self.editor.zoom_out();
        }
        if page_up {
            self.editor.page_up();
        }
        if page_down {
            self.editor.page_down();
        }
    }

    fn update_title(&mut self, ctx: &egui::Context) {
        let document = self.editor.document();
        let name = document.name().unwrap_or_else(|| "Untitled".to_string());
        let marker = if document.is_modified() { "*" } else { "" };
        let title = format!("{marker}{name} - eframe_ink");
        if title != self.title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.title = title;
        }
    }
}

impl eframe::App for InkApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self.editor.settings());
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_shortcuts(ctx);
        tools_panel(self, ctx);
        central_panel(self, ctx);
        self.update_title(ctx);
    }
}
