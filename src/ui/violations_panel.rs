//! Violations panel with the custom violation type editor.

use eframe::egui::{self, RichText, Ui};
use egui_phosphor::regular::{PLUS, X};

use super::app::App;
use super::components::{back_button, danger_action_button, panel_header, styled_button_with_icon};
use super::records::show_records;
use crate::commands;
use crate::models::Violation;
use crate::models::violations::BUILTIN_VIOLATIONS;

/// Show the violations panel.
/// Returns `true` if the back button was clicked.
pub fn show(app: &mut App, ui: &mut Ui) -> bool {
    let go_back = back_button(ui);
    panel_header(ui, "Violations");

    egui::CollapsingHeader::new("Custom violation types")
        .default_open(false)
        .show(ui, |ui| show_custom_types(app, ui));

    ui.add_space(10.0);

    show_records::<Violation>(app, ui);

    go_back
}

fn show_custom_types(app: &mut App, ui: &mut Ui) {
    ui.horizontal(|ui| {
        ui.label("Category:");
        let selected = if app.custom_violation_category.is_empty() {
            "Select..."
        } else {
            app.custom_violation_category.as_str()
        };
        egui::ComboBox::from_id_salt("custom_violation_category")
            .selected_text(selected.to_string())
            .show_ui(ui, |ui| {
                for (category, _) in BUILTIN_VIOLATIONS {
                    ui.selectable_value(&mut app.custom_violation_category, category.to_string(), *category);
                }
            });

        ui.label("Type:");
        ui.add(
            egui::TextEdit::singleline(&mut app.custom_violation_name)
                .desired_width(200.0)
                .hint_text("New violation type"),
        );

        if styled_button_with_icon(ui, PLUS, "Add").clicked() {
            match commands::add_custom_violation(
                &app.document,
                &app.custom_violation_category,
                &app.custom_violation_name,
            ) {
                Ok(next) => {
                    let message = format!(
                        "Added violation type '{}' to {}",
                        app.custom_violation_name.trim(),
                        app.custom_violation_category
                    );
                    app.commit(next, message);
                    app.custom_violation_name.clear();
                }
                Err(e) => app.fail("Could not add violation type", e),
            }
        }
    });

    ui.add_space(10.0);

    if app.document.custom_violations.values().all(Vec::is_empty) {
        ui.label(RichText::new("No custom violation types").weak());
        return;
    }

    let mut remove = None;
    egui::Grid::new("custom_violations_grid")
        .striped(true)
        .spacing([20.0, 6.0])
        .show(ui, |ui| {
            for (category, names) in &app.document.custom_violations {
                for name in names {
                    ui.label(category.as_str());
                    ui.label(name.as_str());
                    if danger_action_button(ui, X, "Remove").clicked() {
                        remove = Some((category.clone(), name.clone()));
                    }
                    ui.end_row();
                }
            }
        });

    if let Some((category, name)) = remove {
        let next = commands::remove_custom_violation(&app.document, &category, &name);
        app.commit(next, format!("Removed violation type '{name}'"));
    }
}
