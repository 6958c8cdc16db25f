//! Settings panel for storage, dashboard, export, and UI configuration.

use std::path::PathBuf;

use eframe::egui::{self, RichText};

use super::app::App;
use super::components::{back_button, colors, panel_header};
use crate::labels::Language;

/// Show the settings panel.
/// Returns `true` if the back button was clicked.
pub fn show(app: &mut App, ui: &mut egui::Ui) -> bool {
    let go_back = back_button(ui);
    panel_header(ui, "Settings");
    ui.label(RichText::new("Changes apply when saved.").weak());

    egui::ScrollArea::vertical().show(ui, |ui| {
        // Storage
        ui.group(|ui| {
            ui.heading("Storage");
            ui.add_space(5.0);

            egui::Grid::new("storage_settings_grid")
                .num_columns(2)
                .spacing([10.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Data directory:");
                    ui.label(RichText::new(app.store.storage().dir().display().to_string()).weak());
                    ui.end_row();

                    ui.label("Override:");
                    let mut dir = app
                        .config_draft
                        .storage
                        .data_dir
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    if ui
                        .add(egui::TextEdit::singleline(&mut dir).hint_text("Platform default"))
                        .changed()
                    {
                        let dir = dir.trim();
                        app.config_draft.storage.data_dir = (!dir.is_empty()).then(|| PathBuf::from(dir));
                        app.config_modified = true;
                    }
                    ui.end_row();
                });

            ui.label(RichText::new("A new data directory takes effect after restart.").small().weak());
        });

        ui.add_space(15.0);

        // Dashboard
        ui.group(|ui| {
            ui.heading("Dashboard");
            ui.add_space(5.0);

            egui::Grid::new("dashboard_settings_grid")
                .num_columns(2)
                .spacing([10.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Rotation interval (seconds):");
                    let mut secs_str = app.config_draft.dashboard.rotation_secs.to_string();
                    if ui.text_edit_singleline(&mut secs_str).changed()
                        && let Ok(secs) = secs_str.parse()
                    {
                        app.config_draft.dashboard.rotation_secs = secs;
                        app.config_modified = true;
                    }
                    ui.end_row();

                    ui.label("Records per page:");
                    let mut page_str = app.config_draft.dashboard.page_size.to_string();
                    if ui.text_edit_singleline(&mut page_str).changed()
                        && let Ok(page_size) = page_str.parse()
                    {
                        app.config_draft.dashboard.page_size = page_size;
                        app.config_modified = true;
                    }
                    ui.end_row();
                });
        });

        ui.add_space(15.0);

        // Export
        ui.group(|ui| {
            ui.heading("Export");
            ui.add_space(5.0);

            egui::Grid::new("export_settings_grid")
                .num_columns(2)
                .spacing([10.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Records per chat message:");
                    let mut rows_str = app.config_draft.export.chat_max_rows.to_string();
                    if ui.text_edit_singleline(&mut rows_str).changed()
                        && let Ok(rows) = rows_str.parse()
                    {
                        app.config_draft.export.chat_max_rows = rows;
                        app.config_modified = true;
                    }
                    ui.end_row();

                    ui.label("Export folder:");
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(app.config_draft.export_dir().display().to_string()).weak());
                        if ui.button("Browse...").clicked()
                            && let Some(dir) = rfd::FileDialog::new().pick_folder()
                        {
                            app.config_draft.export.export_dir = Some(dir);
                            app.config_modified = true;
                        }
                    });
                    ui.end_row();
                });
        });

        ui.add_space(15.0);

        // UI Options
        ui.group(|ui| {
            ui.heading("UI Options");
            ui.add_space(5.0);

            ui.horizontal(|ui| {
                ui.label("Export language:");
                for lang in [Language::En, Language::Ar] {
                    if ui.radio_value(&mut app.config_draft.ui.language, lang, lang.name()).changed() {
                        app.config_modified = true;
                    }
                }
            });

            if ui
                .checkbox(&mut app.config_draft.ui.confirm_destructive, "Ask before deleting or replacing data")
                .changed()
            {
                app.config_modified = true;
            }
        });

        ui.add_space(20.0);

        // Action buttons
        ui.horizontal(|ui| {
            let save_btn = egui::Button::new("Save Settings");
            if ui.add_enabled(app.config_modified, save_btn).clicked() {
                app.save_config();
            }

            if app.config_modified {
                ui.label(RichText::new("(unsaved changes)").color(colors::WARNING).italics());
            }

            if ui.button("Reset to Defaults").clicked() {
                app.config_draft = crate::config::AppConfig::default();
                app.config_modified = true;
            }
        });

        if let Err(e) = app.config_draft.validate() {
            ui.add_space(5.0);
            ui.label(RichText::new(e.to_string()).color(colors::ERROR));
        }
    });

    go_back
}
