//! Teacher follow-up panel: one evaluation sheet per day.

use chrono::Local;
use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_phosphor::regular::{PENCIL, PLUS, TRASH};

use super::app::{App, ConfirmAction};
use super::components::{
    action_button, back_button, colors, danger_action_button, date_input, panel_header, primary_button_with_icon,
    styled_button, styled_button_with_icon,
};
use super::records::open_follow_up_form;
use crate::labels::column_label;
use crate::models::teachers::SCORE_COLUMNS;
use crate::models::{EntityKind, Tabular, TeacherFollowUp};

/// Show the teacher follow-up panel.
/// Returns `true` if the back button was clicked.
pub fn show(app: &mut App, ui: &mut Ui) -> bool {
    let go_back = back_button(ui);
    panel_header(ui, "Teacher Follow-up");

    // Date selection
    ui.horizontal(|ui| {
        ui.label("Date:");
        if let Some(date) = date_input(ui, &mut app.report_date_input) {
            app.report_date = date;
        }
        if styled_button(ui, "Today").clicked() {
            app.report_date = Local::now().date_naive();
            app.report_date_input = app.report_date.format("%Y-%m-%d").to_string();
        }

        ui.add_space(20.0);

        if primary_button_with_icon(ui, PLUS, "Add Follow-up").clicked() {
            let date = app.report_date;
            open_follow_up_form(app, date, None);
        }
    });

    ui.add_space(10.0);

    // Days that already have a report
    let mut days: Vec<_> = app.document.daily_reports.iter().map(|r| r.date).collect();
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();
    if !days.is_empty() {
        ScrollArea::horizontal().id_salt("report_days").show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("Recorded days:").weak());
                for day in days {
                    let label = day.format("%Y-%m-%d").to_string();
                    if ui.selectable_label(day == app.report_date, label.as_str()).clicked() {
                        app.report_date = day;
                        app.report_date_input = label;
                    }
                }
            });
        });
    }

    ui.add_space(10.0);
    ui.separator();
    ui.add_space(10.0);

    let Some(report) = app
        .document
        .daily_reports
        .iter()
        .find(|r| r.date == app.report_date)
        .cloned()
    else {
        ui.label(RichText::new(format!("No follow-ups recorded on {}", app.report_date)).weak());
        return go_back;
    };

    let lang = app.config.ui.language;
    let title = format!("{} {}", report.day_name, report.date.format("%Y-%m-%d"));

    ui.horizontal(|ui| {
        ui.label(RichText::new(&title).strong().size(16.0));
        if !report.teachers_data.is_empty() {
            let count = report.teachers_data.len();
            let average = report.teachers_data.iter().map(TeacherFollowUp::percentage).sum::<f64>() / count as f64;
            ui.label(RichText::new(format!("{count} teachers, average {average:.1}%")).weak());
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if styled_button_with_icon(ui, TRASH, "Delete Day").clicked() {
                app.request(ConfirmAction::DeleteRecord {
                    kind: EntityKind::DailyReports,
                    id: report.id.clone(),
                    title: title.clone(),
                });
            }
        });
    });

    ui.add_space(10.0);

    let mut edit = None;
    let mut delete = None;

    ScrollArea::both().id_salt("follow_ups").show(ui, |ui| {
        egui::Grid::new("follow_up_grid")
            .striped(true)
            .spacing([14.0, 6.0])
            .show(ui, |ui| {
                for key in ["teacherName", "subject", "className"].iter().chain(SCORE_COLUMNS) {
                    ui.strong(column_label(lang, key));
                }
                ui.strong(column_label(lang, "total"));
                ui.strong(column_label(lang, "percentage"));
                ui.strong("Actions");
                ui.end_row();

                for follow_up in &report.teachers_data {
                    ui.label(follow_up.teacher_name.as_str());
                    ui.label(follow_up.subject.as_str());
                    ui.label(follow_up.class_name.as_str());
                    for key in SCORE_COLUMNS {
                        ui.label(follow_up.cell(key));
                    }
                    ui.label(format!("{}/{}", follow_up.total(), TeacherFollowUp::max_total()));
                    let percentage = follow_up.percentage();
                    let color = if percentage >= 75.0 {
                        colors::SUCCESS
                    } else if percentage >= 50.0 {
                        colors::WARNING
                    } else {
                        colors::ERROR
                    };
                    ui.colored_label(color, format!("{percentage:.1}%"));
                    ui.horizontal(|ui| {
                        if action_button(ui, PENCIL, "Edit").clicked() {
                            edit = Some(follow_up.clone());
                        }
                        if danger_action_button(ui, TRASH, "Delete").clicked() {
                            delete = Some((follow_up.id.clone(), follow_up.teacher_name.clone()));
                        }
                    });
                    ui.end_row();
                }
            });

        if report.teachers_data.is_empty() {
            ui.add_space(10.0);
            ui.label(RichText::new("No follow-ups for this day yet").weak());
        }
    });

    if let Some(follow_up) = edit {
        open_follow_up_form(app, report.date, Some(&follow_up));
    }
    if let Some((id, name)) = delete {
        app.request(ConfirmAction::DeleteFollowUp {
            report_id: report.id.clone(),
            id,
            title: name,
        });
    }

    go_back
}
