//! Timetable and substitution panel.

use eframe::egui::Ui;

use super::app::App;
use super::components::{back_button, panel_header, tab_strip};
use super::records::show_records;
use crate::labels::kind_label;
use crate::models::{EntityKind, SubstitutionEntry, TimetableEntry};

/// Show the schedule panel.
/// Returns `true` if the back button was clicked.
pub fn show(app: &mut App, ui: &mut Ui) -> bool {
    let go_back = back_button(ui);
    panel_header(ui, "Substitutions and Timetable");

    let lang = app.config.ui.language;
    let tabs = [
        (EntityKind::Substitutions, kind_label(lang, EntityKind::Substitutions)),
        (EntityKind::Timetable, kind_label(lang, EntityKind::Timetable)),
    ];
    if let Some(tab) = tab_strip(ui, app.schedule_tab, &tabs) {
        app.schedule_tab = tab;
        app.record_search.clear();
    }
    ui.add_space(10.0);

    match app.schedule_tab {
        EntityKind::Timetable => show_records::<TimetableEntry>(app, ui),
        _ => show_records::<SubstitutionEntry>(app, ui),
    }

    go_back
}
