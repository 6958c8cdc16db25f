//! Data management panel: export, import, backups and the activity log.

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_phosphor::regular::{
    ARROW_COUNTER_CLOCKWISE, CLIPBOARD, DOWNLOAD_SIMPLE, EXPORT, FLOPPY_DISK, TRASH, UPLOAD_SIMPLE, X,
};

use super::app::{App, ConfirmAction, LogLevel};
use super::components::{
    action_button, back_button, colors, danger_action_button, panel_header, primary_button_with_icon,
    styled_button_with_icon,
};
use crate::backup::MAX_BACKUPS;
use crate::export::{ExportFormat, ExportScope};
use crate::labels::kind_label;
use crate::models::EntityKind;
use crate::transfer::ImportMode;

/// Show the data management panel.
/// Returns `true` if the back button was clicked.
pub fn show(app: &mut App, ui: &mut Ui) -> bool {
    let go_back = back_button(ui);
    panel_header(ui, "Data Management");

    ScrollArea::vertical().show(ui, |ui| {
        show_export_section(app, ui);
        ui.add_space(15.0);
        show_import_section(app, ui);
        ui.add_space(15.0);
        show_backup_section(app, ui);
        ui.add_space(15.0);
        show_log_viewer(app, ui);
    });

    go_back
}

#[derive(Clone, Copy, PartialEq)]
enum ScopeChoice {
    Full,
    Teacher,
    Entity,
}

fn show_export_section(app: &mut App, ui: &mut Ui) {
    let lang = app.config.ui.language;

    ui.group(|ui| {
        ui.heading("Export");
        ui.add_space(5.0);

        let current = match &app.export_scope {
            ExportScope::Full => ScopeChoice::Full,
            ExportScope::Teacher(_) => ScopeChoice::Teacher,
            ExportScope::Entity(_) => ScopeChoice::Entity,
        };

        egui::Grid::new("export_grid")
            .num_columns(2)
            .spacing([10.0, 8.0])
            .show(ui, |ui| {
                ui.label("Scope:");
                ui.horizontal(|ui| {
                    let mut choice = current;
                    ui.radio_value(&mut choice, ScopeChoice::Full, "Everything");
                    ui.radio_value(&mut choice, ScopeChoice::Entity, "One record type");
                    ui.radio_value(&mut choice, ScopeChoice::Teacher, "One teacher");
                    if choice != current {
                        app.export_scope = match choice {
                            ScopeChoice::Full => ExportScope::Full,
                            ScopeChoice::Entity => ExportScope::Entity(EntityKind::Violations),
                            ScopeChoice::Teacher => ExportScope::Teacher(app.export_teacher.clone()),
                        };
                    }
                });
                ui.end_row();

                match &mut app.export_scope {
                    ExportScope::Full => {}
                    ExportScope::Entity(kind) => {
                        ui.label("Record type:");
                        egui::ComboBox::from_id_salt("export_kind")
                            .selected_text(kind_label(lang, *kind))
                            .show_ui(ui, |ui| {
                                for option in EntityKind::ALL {
                                    ui.selectable_value(kind, option, kind_label(lang, option));
                                }
                            });
                        ui.end_row();
                    }
                    ExportScope::Teacher(name) => {
                        ui.label("Teacher:");
                        let teachers = app.document.teacher_names();
                        egui::ComboBox::from_id_salt("export_teacher")
                            .selected_text(if name.is_empty() { "Select..." } else { name.as_str() }.to_string())
                            .show_ui(ui, |ui| {
                                for teacher in teachers {
                                    let label = teacher.clone();
                                    ui.selectable_value(name, teacher, label);
                                }
                            });
                        app.export_teacher = name.clone();
                        ui.end_row();
                    }
                }

                ui.label("Format:");
                egui::ComboBox::from_id_salt("export_format")
                    .selected_text(app.export_format.label())
                    .show_ui(ui, |ui| {
                        for format in ExportFormat::ALL {
                            ui.selectable_value(&mut app.export_format, format, format.label());
                        }
                    });
                ui.end_row();
            });

        ui.add_space(10.0);

        let missing_teacher = matches!(&app.export_scope, ExportScope::Teacher(name) if name.trim().is_empty());
        let needs_kind = app.export_format.needs_single_kind() && app.export_scope == ExportScope::Full;

        if needs_kind {
            ui.label(
                RichText::new(format!("{} export needs one record type or a teacher", app.export_format.label()))
                    .color(colors::WARNING),
            );
        }

        ui.add_enabled_ui(!missing_teacher && !needs_kind, |ui| {
            if primary_button_with_icon(ui, EXPORT, "Export...").clicked() {
                app.export();
            }
        });

        if let Some(link) = app.last_share_link.clone() {
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                ui.hyperlink_to("Open in WhatsApp", &link);
                if action_button(ui, CLIPBOARD, "Copy link").clicked() {
                    ui.ctx().copy_text(link);
                    app.log_info("Share link copied");
                }
                if action_button(ui, X, "Dismiss").clicked() {
                    app.last_share_link = None;
                }
            });
        }
    });
}

fn show_import_section(app: &mut App, ui: &mut Ui) {
    ui.group(|ui| {
        ui.heading("Import");
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.label("Mode:");
            ui.radio_value(&mut app.import_mode, ImportMode::Merge, "Merge with current data");
            ui.radio_value(&mut app.import_mode, ImportMode::Overwrite, "Replace current data");
        });

        ui.add_space(5.0);
        ui.label(RichText::new("A backup of the current data is made before every import.").weak());
        ui.add_space(10.0);

        ui.horizontal(|ui| {
            if app.import_pending() {
                ui.spinner();
                ui.label("Reading file...");
                if styled_button_with_icon(ui, X, "Cancel").clicked() {
                    app.cancel_import();
                }
            } else if primary_button_with_icon(ui, UPLOAD_SIMPLE, "Import File...").clicked() {
                let ctx = ui.ctx().clone();
                app.start_import(&ctx);
            }
        });
    });
}

fn show_backup_section(app: &mut App, ui: &mut Ui) {
    ui.group(|ui| {
        ui.horizontal(|ui| {
            ui.heading("Backups");
            ui.label(RichText::new(format!("{} of {MAX_BACKUPS} kept", app.backups.len())).weak());

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if styled_button_with_icon(ui, FLOPPY_DISK, "Create Backup").clicked() {
                    app.create_backup();
                }
            });
        });

        ui.add_space(10.0);

        if app.backups.is_empty() {
            ui.label(RichText::new("No backups yet").weak());
            return;
        }

        let mut action = None;
        egui::Grid::new("backup_grid")
            .striped(true)
            .num_columns(3)
            .spacing([20.0, 6.0])
            .show(ui, |ui| {
                ui.strong("Backup");
                ui.strong("Size");
                ui.strong("Actions");
                ui.end_row();

                for record in app.backups.records() {
                    ui.label(record.label.as_str());
                    ui.label(format!("{:.1} KB", record.size_kb()));
                    ui.horizontal(|ui| {
                        if action_button(ui, ARROW_COUNTER_CLOCKWISE, "Restore").clicked() {
                            action = Some(ConfirmAction::RestoreBackup {
                                id: record.id.clone(),
                                label: record.label.clone(),
                            });
                        }
                        if action_button(ui, DOWNLOAD_SIMPLE, "Copy JSON").clicked() {
                            ui.ctx().copy_text(record.data.clone());
                        }
                        if danger_action_button(ui, TRASH, "Delete").clicked() {
                            action = Some(ConfirmAction::DeleteBackup {
                                id: record.id.clone(),
                                label: record.label.clone(),
                            });
                        }
                    });
                    ui.end_row();
                }
            });

        if let Some(action) = action {
            app.request(action);
        }
    });
}

fn show_log_viewer(app: &mut App, ui: &mut Ui) {
    egui::Frame::new()
        .fill(ui.style().visuals.extreme_bg_color)
        .inner_margin(egui::Margin::same(15))
        .corner_radius(egui::CornerRadius::same(8))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("Activity Log").strong());

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if styled_button_with_icon(ui, TRASH, "Clear").clicked() {
                        app.clear_log();
                    }
                });
            });

            ui.add_space(10.0);

            ScrollArea::vertical()
                .id_salt("data_log")
                .max_height(200.0)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    // Constrain width to enable text wrapping
                    ui.set_width(ui.available_width());

                    if app.log_messages.is_empty() {
                        ui.label(RichText::new("No log entries").weak());
                    } else {
                        for entry in &app.log_messages {
                            let color = match entry.level {
                                LogLevel::Info => Color32::GRAY,
                                LogLevel::Success => colors::SUCCESS,
                                LogLevel::Warning => colors::WARNING,
                                LogLevel::Error => colors::ERROR,
                            };

                            let formatted = format!("[{}] {}", entry.timestamp.format("%H:%M:%S"), entry.message);
                            ui.add(egui::Label::new(RichText::new(formatted).color(color)).wrap());
                        }
                    }
                });
        });
}
