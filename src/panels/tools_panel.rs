use std::path::PathBuf;

use egui::{Color32, RichText};

use crate::app::InkApp;
use crate::format::color::STANDARD_COLORS;
use crate::input::{InputMode, PressureRange};
use crate::state::{MAX_ZOOM, MIN_ZOOM};
use crate::tool::ToolKind;

const SETTINGS_FILE: &str = "eframe_ink_settings.json";

pub fn tools_panel(app: &mut InkApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                tool_section(app, ui);
                ui.separator();
                pen_section(app, ui);
                ui.separator();
                view_section(app, ui);
                ui.separator();
                edit_section(app, ui);
                ui.separator();
                file_section(app, ui);
                ui.separator();
                input_section(app, ui);
                ui.separator();
                history_section(app, ui);

                if let Some(status) = &app.status {
                    ui.separator();
                    ui.label(RichText::new(status).small());
                }
            });
        });
}

fn tool_section(app: &mut InkApp, ui: &mut egui::Ui) {
    ui.heading("Tools");
    ui.horizontal_wrapped(|ui| {
        let active = app.editor.current_tool();
        for tool in ToolKind::ALL {
            if ui.selectable_label(active == tool, tool.name()).clicked() {
                log::info!("Tool selected from UI: {}", tool.name());
                app.editor.set_tool(tool);
            }
        }
    });
    ui.label(format!("State: {}", app.editor.state_kind().name()));
}

fn pen_section(app: &mut InkApp, ui: &mut egui::Ui) {
    ui.heading("Pen");
    ui.horizontal_wrapped(|ui| {
        for (name, color) in STANDARD_COLORS {
            let swatch = egui::Button::new("  ").fill(color).min_size(egui::vec2(18.0, 18.0));
            if ui.add(swatch).on_hover_text(name).clicked() {
                app.editor.set_color(color);
            }
        }
    });

    let mut color = app.editor.pen_color();
    ui.horizontal(|ui| {
        ui.label("Color");
        if ui.color_edit_button_srgba(&mut color).changed() {
            app.editor.set_color(color);
        }
    });

    let mut width = app.editor.pen_width();
    if ui
        .add(egui::Slider::new(&mut width, 0.1..=20.0).text("Width").logarithmic(true))
        .changed()
    {
        app.editor.set_pen_width(width);
    }
}

fn view_section(app: &mut InkApp, ui: &mut egui::Ui) {
    ui.heading("View");
    ui.horizontal(|ui| {
        if ui.button("-").clicked() {
            app.editor.zoom_out();
        }
        ui.label(format!("{:.0}%", app.editor.zoom() * 100.0));
        if ui.button("+").clicked() {
            app.editor.zoom_in();
        }
        if ui.button("1:1").clicked() {
            app.editor.set_zoom(1.0);
        }
        if ui.button("Fit width").clicked() {
            app.editor.zoom_fit_width();
        }
    });
    let mut zoom = app.editor.zoom();
    if ui
        .add(egui::Slider::new(&mut zoom, MIN_ZOOM..=MAX_ZOOM).logarithmic(true).show_value(false))
        .drag_stopped()
    {
        app.editor.set_zoom(zoom);
    }

    let page_count = app.editor.document().page_count();
    ui.label(format!("Page {} of {}", app.editor.current_page() + 1, page_count));
    ui.horizontal(|ui| {
        if ui.button("⏮").on_hover_text("First page").clicked() {
            app.editor.page_first();
        }
        if ui.button("⏶").on_hover_text("Previous page").clicked() {
            app.editor.page_up();
        }
        if ui.button("⏷").on_hover_text("Next page").clicked() {
            app.editor.page_down();
        }
        if ui.button("⏭").on_hover_text("Last page").clicked() {
            app.editor.page_last();
        }
    });

    let stable = app.editor.accepts_edits();
    ui.add_enabled_ui(stable, |ui| {
        ui.horizontal_wrapped(|ui| {
            if ui.button("Add before").clicked() {
                app.editor.page_add_before();
            }
            if ui.button("Add after").clicked() {
                app.editor.page_add_after();
            }
            if ui.button("Add first").clicked() {
                app.editor.page_add_beginning();
            }
            if ui.button("Add last").clicked() {
                app.editor.page_add_end();
            }
            if ui
                .add_enabled(page_count > 1, egui::Button::new("Remove page"))
                .clicked()
            {
                app.editor.page_remove();
            }
        });
    });
}

fn edit_section(app: &mut InkApp, ui: &mut egui::Ui) {
    ui.heading("Edit");
    ui.horizontal(|ui| {
        if ui.add_enabled(app.editor.can_undo(), egui::Button::new("Undo")).clicked() {
            app.editor.undo();
        }
        if ui.add_enabled(app.editor.can_redo(), egui::Button::new("Redo")).clicked() {
            app.editor.redo();
        }
    });
    let has_selection = app.editor.selection().is_some();
    ui.horizontal(|ui| {
        if ui.add_enabled(has_selection, egui::Button::new("Cut")).clicked() {
            app.editor.cut();
        }
        if ui.add_enabled(has_selection, egui::Button::new("Copy")).clicked() {
            app.editor.copy();
        }
        if ui
            .add_enabled(!app.editor.clipboard().is_empty(), egui::Button::new("Paste"))
            .clicked()
        {
            app.editor.paste();
        }
    });
}

fn file_section(app: &mut InkApp, ui: &mut egui::Ui) {
    ui.heading("File");
    ui.horizontal(|ui| {
        ui.label("Path");
        ui.text_edit_singleline(&mut app.file_path);
    });
    ui.checkbox(&mut app.compress, "Gzip on save");

    let path = PathBuf::from(app.file_path.trim());
    let has_path = !app.file_path.trim().is_empty();
    ui.horizontal_wrapped(|ui| {
        if ui.button("New").clicked() {
            app.new_document();
        }
        if ui.add_enabled(has_path, egui::Button::new("Open")).clicked() {
            app.open(&path);
        }
        if ui.add_enabled(has_path, egui::Button::new("Save")).clicked() {
            app.save(&path);
        }
        if ui.add_enabled(has_path, egui::Button::new("Export PDF")).clicked() {
            app.export_pdf(&path.with_extension("pdf"));
        }
        if ui.add_enabled(has_path, egui::Button::new("Export PNG")).clicked() {
            app.export_png(&path.with_extension("png"));
        }
    });

    let document = app.editor.document();
    if document.is_modified() {
        ui.label(RichText::new("Unsaved changes").color(Color32::LIGHT_RED));
    }
}

fn input_section(app: &mut InkApp, ui: &mut egui::Ui) {
    ui.heading("Input");
    let mut mode = app.editor.settings().input_mode;
    ui.horizontal(|ui| {
        ui.radio_value(&mut mode, InputMode::Mouse, "Mouse");
        ui.radio_value(&mut mode, InputMode::Tablet, "Tablet");
    });
    if mode != app.editor.settings().input_mode {
        app.editor.set_input_mode(mode);
    }

    let mut range: PressureRange = app.editor.settings().pressure_range;
    let mut changed = ui
        .add(egui::Slider::new(&mut range.min_width_multiplier, 0.0..=2.0).text("Min pressure width"))
        .changed();
    changed |= ui
        .add(egui::Slider::new(&mut range.max_width_multiplier, 0.0..=2.0).text("Max pressure width"))
        .changed();
    if changed {
        app.editor.set_pressure_range(range);
    }

    ui.horizontal(|ui| {
        if ui.button("Load settings").clicked() {
            app.load_settings(&PathBuf::from(SETTINGS_FILE));
        }
        if ui.button("Save settings").clicked() {
            app.save_settings(&PathBuf::from(SETTINGS_FILE));
        }
    });
}

fn history_section(app: &mut InkApp, ui: &mut egui::Ui) {
    let history = app.editor.history();
    ui.horizontal(|ui| {
        ui.label(format!("Undo stack size: {}", history.undo_stack().len()));
        ui.label(format!("Redo stack size: {}", history.redo_stack().len()));
    });

    egui::Grid::new("command_history_grid")
        .num_columns(2)
        .spacing([40.0, 4.0])
        .striped(true)
        .show(ui, |ui| {
            ui.strong("Undo Stack");
            ui.strong("Redo Stack");
            ui.end_row();

            let undo_stack = history.undo_stack();
            let redo_stack = history.redo_stack();
            for i in 0..undo_stack.len().max(redo_stack.len()) {
                ui.label(undo_stack.get(i).map_or("", |c| c.name()));
                ui.label(redo_stack.get(i).map_or("", |c| c.name()));
                ui.end_row();
            }
        });
}
