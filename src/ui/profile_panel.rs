//! School profile panel.

use eframe::egui::{self, RichText, Ui};
use egui_phosphor::regular::FLOPPY_DISK;

use super::app::App;
use super::components::{back_button, colors, panel_header, primary_button_with_icon, styled_button};
use super::records::{apply_values, form_values};
use crate::commands;
use crate::labels::column_label;

/// List columns, edited one entry per line.
const LIST_COLUMNS: &[&str] = &["classes", "teachers"];

/// Show the school profile panel.
/// Returns `true` if the back button was clicked.
pub fn show(app: &mut App, ui: &mut Ui) -> bool {
    let go_back = back_button(ui);
    panel_header(ui, "School Profile");

    let lang = app.config.ui.language;
    let modified = app.profile_draft != form_values(&app.document.profile);

    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.group(|ui| {
            egui::Grid::new("profile_grid")
                .num_columns(2)
                .spacing([20.0, 10.0])
                .show(ui, |ui| {
                    for (key, value) in app.profile_draft.iter_mut() {
                        ui.label(format!("{}:", column_label(lang, key)));
                        if LIST_COLUMNS.contains(key) {
                            ui.add(
                                egui::TextEdit::multiline(value)
                                    .desired_width(300.0)
                                    .desired_rows(4)
                                    .hint_text("Separate entries with commas"),
                            );
                        } else {
                            ui.add(egui::TextEdit::singleline(value).desired_width(300.0));
                        }
                        ui.end_row();
                    }
                });
        });

        ui.add_space(20.0);

        ui.horizontal(|ui| {
            let save = ui.add_enabled_ui(modified, |ui| primary_button_with_icon(ui, FLOPPY_DISK, "Save Profile"));
            if save.inner.clicked() {
                save_profile(app);
            }

            if modified {
                ui.label(RichText::new("(unsaved changes)").color(colors::WARNING).italics());
                if styled_button(ui, "Discard").clicked() {
                    app.profile_draft = form_values(&app.document.profile);
                }
            }
        });
    });

    go_back
}

fn save_profile(app: &mut App) {
    // Entries may be separated by newlines as well as commas
    let values: Vec<(&'static str, String)> = app
        .profile_draft
        .iter()
        .map(|(key, value)| {
            let value = if LIST_COLUMNS.contains(key) {
                value.replace('\n', ",")
            } else {
                value.clone()
            };
            (*key, value)
        })
        .collect();

    match apply_values(app.document.profile.clone(), &values) {
        Ok(profile) => {
            let next = commands::set_profile(&app.document, profile);
            app.commit(next, "School profile saved");
            app.profile_draft = form_values(&app.document.profile);
        }
        Err(e) => app.fail("Invalid profile", e),
    }
}
