//! Special report panel: the per-student logs and free-form reports.

use eframe::egui::Ui;

use super::app::App;
use super::components::{back_button, panel_header, tab_strip};
use super::records::show_records;
use crate::labels::kind_label;
use crate::models::{
    AbsenceLog, DamageLog, EntityKind, ExamLog, ExitLog, GenericSpecialReport, LatenessLog, ParentVisitLog,
};

/// Show the special reports panel.
/// Returns `true` if the back button was clicked.
pub fn show(app: &mut App, ui: &mut Ui) -> bool {
    let go_back = back_button(ui);
    panel_header(ui, "Special Reports");

    let lang = app.config.ui.language;
    let tabs: Vec<(EntityKind, &str)> = EntityKind::STUDENT_LOGS
        .into_iter()
        .chain([EntityKind::GenericSpecialReports])
        .map(|kind| (kind, kind_label(lang, kind)))
        .collect();
    if let Some(tab) = tab_strip(ui, app.special_tab, &tabs) {
        app.special_tab = tab;
        app.record_search.clear();
    }
    ui.add_space(10.0);

    match app.special_tab {
        EntityKind::LatenessLogs => show_records::<LatenessLog>(app, ui),
        EntityKind::ExitLogs => show_records::<ExitLog>(app, ui),
        EntityKind::DamageLogs => show_records::<DamageLog>(app, ui),
        EntityKind::ParentVisitLogs => show_records::<ParentVisitLog>(app, ui),
        EntityKind::ExamLogs => show_records::<ExamLog>(app, ui),
        EntityKind::GenericSpecialReports => show_records::<GenericSpecialReport>(app, ui),
        _ => show_records::<AbsenceLog>(app, ui),
    }

    go_back
}
