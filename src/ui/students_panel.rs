//! Student report panel.

use eframe::egui::Ui;

use super::app::App;
use super::components::{back_button, panel_header};
use super::records::show_records;
use crate::models::StudentReport;

/// Show the student reports panel.
/// Returns `true` if the back button was clicked.
pub fn show(app: &mut App, ui: &mut Ui) -> bool {
    let go_back = back_button(ui);
    panel_header(ui, "Student Reports");

    show_records::<StudentReport>(app, ui);

    go_back
}
