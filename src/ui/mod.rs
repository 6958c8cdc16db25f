//! GUI panels and application state.

pub mod app;
pub mod components;
pub mod dashboard;
pub mod data_panel;
pub mod profile_panel;
pub mod records;
pub mod schedule_panel;
pub mod settings_panel;
pub mod special_panel;
pub mod students_panel;
pub mod teachers_panel;
pub mod violations_panel;

pub use app::App;
