//! Record table and add/edit form shared by every record panel.

use chrono::{Local, NaiveDate};
use eframe::egui::{self, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use egui_phosphor::regular::{PENCIL, PLUS, TRASH};

use super::app::{App, ConfirmAction, FormTarget, RecordForm};
use super::components::{action_button, danger_action_button, primary_button_with_icon, styled_button};
use crate::commands;
use crate::labels::{column_label, kind_label};
use crate::models::teachers::SCORE_COLUMNS;
use crate::models::violations::{BUILTIN_VIOLATIONS, violation_types};
use crate::models::{Entity, EntityKind, KindVisitor, Tabular, TeacherFollowUp, dispatch};
use crate::error::{AppError, Result};

const SCORE_CHOICES: &[&str] = &["0", "1", "2", "3", "4"];

/// Columns prefilled with today's date on new records.
const DATE_COLUMNS: &[&str] = &["date", "createdAt"];

/// One text value per column of `record`.
pub(super) fn form_values<T: Tabular>(record: &T) -> Vec<(&'static str, String)> {
    T::COLUMNS.iter().copied().zip(record.cells()).collect()
}

/// Apply every form value to `base`, validating each field.
pub(super) fn apply_values<T: Tabular>(base: T, values: &[(&'static str, String)]) -> Result<T> {
    values.iter().try_fold(base, |record, (key, text)| record.with_field(key, text))
}

fn new_record_values<T: Tabular + Default>() -> Vec<(&'static str, String)> {
    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    form_values(&T::default())
        .into_iter()
        .map(|(key, value)| {
            if DATE_COLUMNS.contains(&key) {
                (key, today.clone())
            } else {
                (key, value)
            }
        })
        .collect()
}

/// Open an empty form for a new record of `kind`.
pub fn open_add_form(app: &mut App, kind: EntityKind) {
    struct Values;

    impl KindVisitor for Values {
        type Output = Vec<(&'static str, String)>;

        fn visit<T: Entity>(self) -> Self::Output {
            new_record_values::<T>()
        }
    }

    app.record_form = RecordForm {
        target: FormTarget::Record(kind),
        id: None,
        values: dispatch(kind, Values),
        is_open: true,
    };
}

/// Open the form pre-filled with an existing record.
pub fn open_edit_form<T: Entity>(app: &mut App, record: &T) {
    app.record_form = RecordForm {
        target: FormTarget::Record(T::KIND),
        id: Some(record.id().to_string()),
        values: form_values(record),
        is_open: true,
    };
}

/// Open the follow-up form for the daily report of `date`, empty or filled
/// from `existing`.
pub fn open_follow_up_form(app: &mut App, date: NaiveDate, existing: Option<&TeacherFollowUp>) {
    app.record_form = RecordForm {
        target: FormTarget::FollowUp { date },
        id: existing.map(|f| f.id.clone()),
        values: match existing {
            Some(f) => form_values(f),
            None => new_record_values::<TeacherFollowUp>(),
        },
        is_open: true,
    };
}

/// Search box, add button and the table of every record of `T`.
pub fn show_records<T: Entity>(app: &mut App, ui: &mut Ui) {
    let lang = app.config.ui.language;

    ui.horizontal(|ui| {
        if primary_button_with_icon(ui, PLUS, &format!("Add {}", kind_label(lang, T::KIND))).clicked() {
            open_add_form(app, T::KIND);
        }

        ui.add_space(20.0);

        ui.label("Search:");
        ui.add(
            egui::TextEdit::singleline(&mut app.record_search)
                .desired_width(200.0)
                .hint_text("Any column..."),
        );
        if !app.record_search.is_empty() && styled_button(ui, "Clear").clicked() {
            app.record_search.clear();
        }
    });

    ui.add_space(10.0);
    show_table::<T>(app, ui);
}

/// Table of the records of `T` matching the search text, with edit and
/// delete actions per row.
pub fn show_table<T: Entity>(app: &mut App, ui: &mut Ui) {
    let lang = app.config.ui.language;
    let needle = app.record_search.trim().to_lowercase();
    let all = T::records(&app.document);

    // Filter records
    let rows: Vec<(String, String, Vec<String>)> = all
        .iter()
        .map(|r| (r.id().to_string(), r.cell(T::TITLE_COLUMN), r.cells()))
        .filter(|(_, _, cells)| needle.is_empty() || cells.iter().any(|c| c.to_lowercase().contains(&needle)))
        .collect();

    ui.label(format!("Showing {} of {} records", rows.len(), all.len()));
    ui.add_space(10.0);

    let mut edit_id = None;
    let mut delete = None;

    ui.push_id(T::KIND.key(), |ui| {
        ScrollArea::horizontal().show(ui, |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .columns(Column::auto().at_least(70.0).clip(true), T::COLUMNS.len())
                .column(Column::remainder().at_least(70.0))
                .header(24.0, |mut header| {
                    for key in T::COLUMNS {
                        header.col(|ui| {
                            ui.strong(column_label(lang, key));
                        });
                    }
                    header.col(|ui| {
                        ui.strong("Actions");
                    });
                })
                .body(|mut body| {
                    for (id, title, cells) in &rows {
                        body.row(24.0, |mut row| {
                            for cell in cells {
                                row.col(|ui| {
                                    ui.label(if cell.is_empty() { "-" } else { cell.as_str() });
                                });
                            }
                            row.col(|ui| {
                                if action_button(ui, PENCIL, "Edit").clicked() {
                                    edit_id = Some(id.clone());
                                }
                                ui.add_space(4.0);
                                if danger_action_button(ui, TRASH, "Delete").clicked() {
                                    delete = Some((id.clone(), title.clone()));
                                }
                            });
                        });
                    }
                });
        });
    });

    if let Some(id) = edit_id
        && let Some(record) = T::records(&app.document).iter().find(|r| r.id() == id).cloned()
    {
        open_edit_form(app, &record);
    }
    if let Some((id, title)) = delete {
        app.request(ConfirmAction::DeleteRecord {
            kind: T::KIND,
            id,
            title,
        });
    }
}

/// How a form field is edited.
enum FieldInput {
    /// Fixed set of values.
    Choice(Vec<String>),
    /// Free text with suggestions.
    Suggest(Vec<String>),
    Text,
}

fn static_choices(target: &FormTarget, key: &str) -> Option<&'static [&'static str]> {
    struct Choices<'a> {
        key: &'a str,
    }

    impl KindVisitor for Choices<'_> {
        type Output = Option<&'static [&'static str]>;

        fn visit<T: Entity>(self) -> Self::Output {
            T::choices(self.key)
        }
    }

    match target {
        FormTarget::Record(kind) => dispatch(*kind, Choices { key }),
        FormTarget::FollowUp { .. } if SCORE_COLUMNS.contains(&key) => Some(SCORE_CHOICES),
        FormTarget::FollowUp { .. } => TeacherFollowUp::choices(key),
    }
}

fn field_input(app: &App, form: &RecordForm, key: &str) -> FieldInput {
    if let Some(choices) = static_choices(&form.target, key) {
        let mut options: Vec<String> = choices.iter().map(|c| c.to_string()).collect();
        // Categories added through custom violation types are valid too
        if form.target == FormTarget::Record(EntityKind::Violations) && key == "category" {
            for category in app.document.custom_violations.keys() {
                if !options.contains(category) {
                    options.push(category.clone());
                }
            }
        }
        return FieldInput::Choice(options);
    }

    let doc = &app.document;
    match key {
        "violationType" => {
            let category = form.value("category").unwrap_or_default();
            FieldInput::Suggest(violation_types(&doc.custom_violations, category))
        }
        "violations" => {
            let all = BUILTIN_VIOLATIONS
                .iter()
                .flat_map(|(c, _)| violation_types(&doc.custom_violations, c))
                .collect();
            FieldInput::Suggest(all)
        }
        "teacherName" | "absentTeacher" | "substituteTeacher" => FieldInput::Suggest(doc.teacher_names()),
        "className" => FieldInput::Suggest(doc.profile.classes.clone()),
        "studentName" => FieldInput::Suggest(doc.student_names()),
        _ => FieldInput::Text,
    }
}

fn form_title(app: &App) -> String {
    let lang = app.config.ui.language;
    let what = match &app.record_form.target {
        FormTarget::Record(kind) => kind_label(lang, *kind).to_string(),
        FormTarget::FollowUp { .. } => "Teacher Follow-up".to_string(),
    };
    if app.record_form.is_editing() {
        format!("Edit {what}")
    } else {
        format!("Add {what}")
    }
}

pub fn show_form_dialog(app: &mut App, ctx: &egui::Context) {
    let lang = app.config.ui.language;
    let title = form_title(app);
    let inputs: Vec<FieldInput> = app
        .record_form
        .values
        .iter()
        .map(|(key, _)| field_input(app, &app.record_form, key))
        .collect();

    let mut save = false;
    let mut cancel = false;

    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .default_width(450.0)
        .max_height(560.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.add_space(10.0);

            ScrollArea::vertical().max_height(440.0).show(ui, |ui| {
                egui::Grid::new("record_form_grid")
                    .num_columns(2)
                    .spacing([20.0, 10.0])
                    .show(ui, |ui| {
                        for ((key, value), input) in app.record_form.values.iter_mut().zip(&inputs) {
                            ui.label(format!("{}:", column_label(lang, key)));
                            match input {
                                FieldInput::Choice(options) => {
                                    egui::ComboBox::from_id_salt(*key)
                                        .width(250.0)
                                        .selected_text(value.as_str())
                                        .show_ui(ui, |ui| {
                                            for option in options {
                                                ui.selectable_value(value, option.clone(), option.as_str());
                                            }
                                        });
                                }
                                FieldInput::Suggest(options) => {
                                    ui.horizontal(|ui| {
                                        ui.add(egui::TextEdit::singleline(value).desired_width(220.0));
                                        if !options.is_empty() {
                                            ui.menu_button("...", |ui| {
                                                for option in options {
                                                    if ui.button(option.as_str()).clicked() {
                                                        *value = option.clone();
                                                        ui.close();
                                                    }
                                                }
                                            });
                                        }
                                    });
                                }
                                FieldInput::Text => {
                                    ui.add(egui::TextEdit::singleline(value).desired_width(250.0));
                                }
                            }
                            ui.end_row();
                        }
                    });
            });

            ui.add_space(15.0);
            ui.separator();
            ui.add_space(10.0);

            ui.horizontal(|ui| {
                if styled_button(ui, "Cancel").clicked() {
                    cancel = true;
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if primary_button_with_icon(ui, "", "Save").clicked() {
                        save = true;
                    }
                });
            });
        });

    if cancel {
        app.record_form.reset();
    } else if save {
        save_form(app);
    }
}

fn save_form(app: &mut App) {
    let form = app.record_form.clone();
    let saved = match &form.target {
        FormTarget::Record(kind) => dispatch(*kind, SaveRecord { app: &mut *app, form: &form }),
        FormTarget::FollowUp { date } => save_follow_up(app, *date, &form),
    };
    // Keep the form open with its values when validation fails
    if saved {
        app.record_form.reset();
    }
}

struct SaveRecord<'a> {
    app: &'a mut App,
    form: &'a RecordForm,
}

impl KindVisitor for SaveRecord<'_> {
    type Output = bool;

    fn visit<T: Entity>(self) -> bool {
        let app = self.app;
        let base = match &self.form.id {
            Some(id) => match T::records(&app.document).iter().find(|r| r.id() == id) {
                Some(record) => record.clone(),
                None => {
                    app.fail("Save failed", format!("record {id} no longer exists"));
                    return false;
                }
            },
            None => T::default(),
        };

        let applied = apply_values(base, &self.form.values).and_then(|r| commands::link_student(&app.document, r));
        let record = match applied {
            Ok(record) => record,
            Err(e) => {
                app.fail("Invalid value", e);
                return false;
            }
        };

        let title = record.cell(T::TITLE_COLUMN);
        if self.form.id.is_some() {
            match commands::update(&app.document, record) {
                Ok(next) => app.commit(next, format!("Updated {} '{title}'", T::KIND)),
                Err(e) => {
                    app.fail("Save failed", e);
                    return false;
                }
            }
        } else {
            let (next, _) = commands::add(&app.document, record);
            app.commit(next, format!("Added {} '{title}'", T::KIND));
        }
        true
    }
}

fn save_follow_up(app: &mut App, date: NaiveDate, form: &RecordForm) -> bool {
    let report = app.document.daily_reports.iter().find(|r| r.date == date);
    let report_id = report.map(|r| r.id.clone());
    let base = match &form.id {
        Some(id) => report
            .and_then(|r| r.teachers_data.iter().find(|f| &f.id == id))
            .cloned()
            .unwrap_or_default(),
        None => TeacherFollowUp::default(),
    };

    let follow_up = match apply_values(base, &form.values) {
        Ok(f) => f,
        Err(e) => {
            app.fail("Invalid value", e);
            return false;
        }
    };

    let name = follow_up.teacher_name.clone();
    let result = match (form.is_editing(), report_id) {
        (true, Some(report_id)) => commands::update_follow_up(&app.document, &report_id, follow_up),
        (true, None) => Err(AppError::not_found(format!("daily report for {date}"))),
        (false, _) => commands::add_follow_up_on(&app.document, date, follow_up).map(|(next, _)| next),
    };

    match result {
        Ok(next) => {
            app.commit(next, format!("Saved follow-up for '{name}'"));
            true
        }
        Err(e) => {
            app.fail("Save failed", e);
            false
        }
    }
}
