//! Dashboard panel with summary counts, navigation cards, the rotating record
//! view and the activity log.

use chrono::Local;
use eframe::egui::{self, Color32, CornerRadius, Margin, RichText, ScrollArea, Ui};
use egui_phosphor::regular::{CARET_RIGHT, CHALKBOARD_TEACHER, DATABASE, FILE_TEXT, WARNING};

use super::app::{App, LogLevel, Panel};
use super::components::{action_button, colors, dashboard_card, tab_strip};
use crate::dashboard::{self, TimeRange};
use crate::labels::kind_label;
use crate::models::EntityKind;

/// Kinds shown as stat cards, in display order.
const STAT_KINDS: [EntityKind; 6] = [
    EntityKind::Violations,
    EntityKind::DailyReports,
    EntityKind::StudentReports,
    EntityKind::AbsenceLogs,
    EntityKind::LatenessLogs,
    EntityKind::Substitutions,
];

/// Show the dashboard panel.
///
/// Returns `Some(panel)` if navigation is requested.
pub fn show(app: &mut App, ui: &mut Ui) -> Option<Panel> {
    let mut next_panel = None;
    let lang = app.config.ui.language;
    let today = Local::now().date_naive();

    ScrollArea::vertical().show(ui, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);

            // Header
            let title = match app.document.profile.school_name.trim() {
                "" => "School Supervisor",
                name => name,
            };
            ui.label(RichText::new(title).size(32.0).strong());
            ui.add_space(5.0);
            let header = app.document.profile.header_line();
            let subtitle = if header.is_empty() { "Supervision Reports" } else { header.as_str() };
            ui.label(RichText::new(subtitle).size(14.0).weak());

            ui.add_space(20.0);

            let ranges: Vec<(TimeRange, &str)> = TimeRange::ALL.iter().map(|r| (*r, r.label())).collect();
            if let Some(range) = tab_strip(ui, app.dashboard_query.range, &ranges) {
                app.dashboard_query.range = range;
                app.rotation.reset();
            }

            ui.add_space(15.0);

            // Stat cards
            let counts = dashboard::summary_counts(&app.document, app.dashboard_query.range, today);
            ui.horizontal_wrapped(|ui| {
                for kind in STAT_KINDS {
                    let count = counts.get(&kind).copied().unwrap_or(0);
                    stat_card(ui, kind_label(lang, kind), &count.to_string(), app.dashboard_query.range.label());
                }
            });

            ui.add_space(25.0);

            // Navigation cards row
            let available = ui.available_width();
            let num_cards = 4.0;
            let spacing = 30.0;
            let total_spacing = spacing * (num_cards - 1.0);
            let card_width = ((available - total_spacing) / num_cards).clamp(150.0, 250.0);
            let card_size = egui::vec2(card_width, card_width * 0.75);
            let start_offset = ((available - (card_width * num_cards + total_spacing)) / 2.0).max(0.0);

            ui.horizontal(|ui| {
                ui.add_space(start_offset);

                let teachers = "Teacher Follow-up";
                if dashboard_card(ui, teachers, "Daily evaluations", CHALKBOARD_TEACHER, card_size).clicked() {
                    next_panel = Some(Panel::Teachers);
                }

                ui.add_space(spacing);

                if dashboard_card(ui, "Violations", "Students, teachers, staff", WARNING, card_size).clicked() {
                    next_panel = Some(Panel::Violations);
                }

                ui.add_space(spacing);

                if dashboard_card(ui, "Special Reports", "Absence, lateness, visits", FILE_TEXT, card_size).clicked() {
                    next_panel = Some(Panel::SpecialReports);
                }

                ui.add_space(spacing);

                if dashboard_card(ui, "Data", "Export, import, backups", DATABASE, card_size).clicked() {
                    next_panel = Some(Panel::Data);
                }
            });

            ui.add_space(25.0);
        });

        // Two-column layout: Rotating view | Recent Activity
        let column_width = (ui.available_width() - 40.0) / 2.0;

        ui.horizontal(|ui| {
            ui.add_space(10.0);

            ui.vertical(|ui| {
                ui.set_width(column_width);
                section_frame(ui, column_width, |ui| show_rotating_view(app, ui, today));
            });

            ui.add_space(20.0);

            ui.vertical(|ui| {
                ui.set_width(column_width);
                section_frame(ui, column_width, |ui| show_activity(app, ui));
            });
        });
    });

    next_panel
}

fn section_frame(ui: &mut Ui, width: f32, add_contents: impl FnOnce(&mut Ui)) {
    egui::Frame::new()
        .fill(ui.style().visuals.extreme_bg_color)
        .inner_margin(Margin::same(15))
        .corner_radius(CornerRadius::same(8))
        .show(ui, |ui| {
            ui.set_min_width(width - 30.0);
            add_contents(ui);
        });
}

/// Category and sub-field selectors over one page of matching records. The
/// page advances on each rotation tick.
fn show_rotating_view(app: &mut App, ui: &mut Ui, today: chrono::NaiveDate) {
    let lang = app.config.ui.language;
    ui.label(RichText::new("Records").strong());
    ui.add_space(10.0);

    let mut changed = false;
    ui.horizontal(|ui| {
        let query = &mut app.dashboard_query;
        egui::ComboBox::from_id_salt("dashboard_category")
            .selected_text(kind_label(lang, query.category))
            .show_ui(ui, |ui| {
                for kind in EntityKind::ALL {
                    changed |= ui
                        .selectable_value(&mut query.category, kind, kind_label(lang, kind))
                        .changed();
                }
            });
        if changed {
            query.sub_field = None;
        }

        let sub_fields = dashboard::sub_fields(&app.document, query.category);
        egui::ComboBox::from_id_salt("dashboard_sub_field")
            .selected_text(query.sub_field.as_deref().unwrap_or("All"))
            .show_ui(ui, |ui| {
                changed |= ui.selectable_value(&mut query.sub_field, None, "All").changed();
                for field in sub_fields {
                    let label = field.clone();
                    changed |= ui.selectable_value(&mut query.sub_field, Some(field), label).changed();
                }
            });
    });
    if changed {
        app.rotation.reset();
    }

    ui.add_space(10.0);

    let view = dashboard::aggregate(&app.document, &app.dashboard_query, app.rotation.offset, today);
    app.rotation.offset = view.offset;

    ui.horizontal(|ui| {
        if view.count == 0 {
            ui.label(RichText::new("No records in this range").weak());
        } else {
            let first = view.offset + 1;
            let last = view.offset + view.visible.len();
            ui.label(format!("{first}-{last} of {}", view.count));
            if view.count > app.rotation.page_size && action_button(ui, CARET_RIGHT, "Next page").clicked() {
                app.rotation.advance(view.count);
            }
        }
    });

    ui.add_space(5.0);

    for item in &view.visible {
        ui.separator();
        ui.horizontal(|ui| {
            ui.label(RichText::new(&item.title).strong());
            if let Some(date) = item.date {
                ui.label(RichText::new(date.format("%Y-%m-%d").to_string()).small().color(colors::NEUTRAL));
            }
        });
        if !item.detail.is_empty() {
            ui.label(RichText::new(&item.detail).weak());
        }
    }
}

fn show_activity(app: &App, ui: &mut Ui) {
    ui.label(RichText::new("Recent Activity").strong());
    ui.add_space(10.0);

    ScrollArea::vertical().id_salt("activity").max_height(200.0).show(ui, |ui| {
        if app.log_messages.is_empty() {
            ui.label(RichText::new("No recent activity").weak());
        } else {
            for entry in app.log_messages.iter().rev().take(10) {
                let color = match entry.level {
                    LogLevel::Info => Color32::GRAY,
                    LogLevel::Success => colors::SUCCESS,
                    LogLevel::Warning => colors::WARNING,
                    LogLevel::Error => colors::ERROR,
                };

                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(entry.timestamp.format("%H:%M:%S").to_string())
                            .small()
                            .color(Color32::DARK_GRAY),
                    );
                    ui.label(RichText::new(&entry.message).color(color));
                });
            }
        }
    });
}

/// Render a stat card with title, value, and subtitle.
fn stat_card(ui: &mut Ui, title: &str, value: &str, subtitle: &str) {
    egui::Frame::new()
        .fill(ui.style().visuals.extreme_bg_color)
        .inner_margin(Margin::same(15))
        .outer_margin(Margin::same(5))
        .corner_radius(CornerRadius::same(8))
        .show(ui, |ui| {
            ui.set_min_width(150.0);

            ui.vertical(|ui| {
                ui.label(RichText::new(title).small());
                ui.label(RichText::new(value).heading().strong());
                ui.label(RichText::new(subtitle).small().weak());
            });
        });
}
