//! Main application UI.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate};
use eframe::egui::{self, Align, Layout};
use egui_phosphor::regular::{
    CALENDAR, CHALKBOARD_TEACHER, DATABASE, FILE_TEXT, GAUGE, GEAR, IDENTIFICATION_CARD, STUDENT, WARNING,
};
use tokio::sync::mpsc;

use crate::backup::BackupRing;
use crate::commands;
use crate::config::{AppConfig, MAX_ROTATION_SECS};
use crate::dashboard::{DashboardQuery, Rotation, TimeRange};
use crate::export::{self, ExportFormat, ExportOptions, ExportScope};
use crate::models::{Document, EntityKind};
use crate::store::{DocumentStore, FileStorage};
use crate::tasks::{self, Generation, TaskHandle};
use crate::transfer::{self, ImportMode};

use super::components::colors;
use super::{
    dashboard, data_panel, profile_panel, records, schedule_panel, settings_panel, special_panel, students_panel,
    teachers_panel, violations_panel,
};

/// Current panel being displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Dashboard,
    Teachers,
    Students,
    Violations,
    Schedule,
    SpecialReports,
    Profile,
    Data,
    Settings,
}

impl Panel {
    /// Get the display name for the panel.
    pub fn name(&self) -> &'static str {
        match self {
            Panel::Dashboard => "Dashboard",
            Panel::Teachers => "Teacher Follow-up",
            Panel::Students => "Student Reports",
            Panel::Violations => "Violations",
            Panel::Schedule => "Substitutions",
            Panel::SpecialReports => "Special Reports",
            Panel::Profile => "School Profile",
            Panel::Data => "Data Management",
            Panel::Settings => "Settings",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Panel::Dashboard => GAUGE,
            Panel::Teachers => CHALKBOARD_TEACHER,
            Panel::Students => STUDENT,
            Panel::Violations => WARNING,
            Panel::Schedule => CALENDAR,
            Panel::SpecialReports => FILE_TEXT,
            Panel::Profile => IDENTIFICATION_CARD,
            Panel::Data => DATABASE,
            Panel::Settings => GEAR,
        }
    }
}

/// Messages from async tasks to UI.
pub enum UiMessage {
    /// Dashboard rotation timer fired.
    RotationTick,
    /// An import file finished reading.
    ImportFileRead {
        /// Import request the read belongs to.
        generation: u64,
        path: PathBuf,
        mode: ImportMode,
        result: Result<Vec<u8>, String>,
    },
}

/// What the open record form edits.
#[derive(Debug, Clone, PartialEq)]
pub enum FormTarget {
    /// A record in one of the document arrays.
    Record(EntityKind),
    /// A teacher follow-up in the daily report for `date`, which is created
    /// on the first save.
    FollowUp { date: NaiveDate },
}

/// Form state for adding or editing one record, one text value per column.
#[derive(Clone)]
pub struct RecordForm {
    pub target: FormTarget,
    pub id: Option<String>,
    pub values: Vec<(&'static str, String)>,
    pub is_open: bool,
}

impl Default for RecordForm {
    fn default() -> Self {
        Self {
            target: FormTarget::Record(EntityKind::Violations),
            id: None,
            values: Vec::new(),
            is_open: false,
        }
    }
}

impl RecordForm {
    /// Reset the form to default values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_editing(&self) -> bool {
        self.id.is_some()
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }
}

/// Log level for UI messages.
#[derive(Clone, Copy, Debug)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Log entry for display in the UI.
#[derive(Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
    pub level: LogLevel,
}

/// Destructive action waiting for confirmation.
#[derive(Clone)]
pub enum ConfirmAction {
    DeleteRecord { kind: EntityKind, id: String, title: String },
    DeleteFollowUp { report_id: String, id: String, title: String },
    RestoreBackup { id: String, label: String },
    DeleteBackup { id: String, label: String },
    OverwriteImport { path: PathBuf, bytes: Vec<u8> },
}

impl ConfirmAction {
    fn title_and_message(&self) -> (&'static str, String) {
        match self {
            ConfirmAction::DeleteRecord { title, .. } | ConfirmAction::DeleteFollowUp { title, .. } => {
                ("Delete Record", format!("Delete '{title}'?"))
            }
            ConfirmAction::RestoreBackup { label, .. } => (
                "Restore Backup",
                format!("Replace all current data with backup '{label}'?\nThe current data is backed up first."),
            ),
            ConfirmAction::DeleteBackup { label, .. } => ("Delete Backup", format!("Delete backup '{label}'?")),
            ConfirmAction::OverwriteImport { path, .. } => (
                "Overwrite Data",
                format!(
                    "Replace all current data with '{}'?\nThe current data is backed up first.",
                    path.display()
                ),
            ),
        }
    }
}

/// Main application state.
pub struct App {
    // Runtime and storage
    pub rt: tokio::runtime::Runtime,
    pub store: DocumentStore<FileStorage>,

    // Message channel for async communication
    pub tx: mpsc::UnboundedSender<UiMessage>,
    pub rx: mpsc::UnboundedReceiver<UiMessage>,

    // Navigation
    pub current_panel: Panel,
    pub schedule_tab: EntityKind,
    pub special_tab: EntityKind,

    // Application state
    pub document: Document,
    /// Set when the last save failed; cleared by the next successful one.
    pub unsaved: bool,

    // Forms and filters
    pub record_form: RecordForm,
    pub record_search: String,
    pub report_date: NaiveDate,
    pub report_date_input: String,
    /// Profile form values, one text value per profile column.
    pub profile_draft: Vec<(&'static str, String)>,
    pub custom_violation_category: String,
    pub custom_violation_name: String,

    // Dashboard
    pub dashboard_query: DashboardQuery,
    pub rotation: Rotation,
    rotation_task: Option<TaskHandle>,

    // Data management
    pub export_scope: ExportScope,
    pub export_format: ExportFormat,
    pub export_teacher: String,
    pub last_share_link: Option<String>,
    pub import_mode: ImportMode,
    import_task: Option<TaskHandle>,
    import_generation: Generation,
    pub backups: BackupRing,

    // Log messages
    pub log_messages: Vec<LogEntry>,

    // Configuration
    /// Last validated and saved configuration.
    pub config: AppConfig,
    /// Settings panel edits, applied by [`App::save_config`].
    pub config_draft: AppConfig,
    pub config_path: PathBuf,
    pub config_modified: bool,

    // Dialogs
    pub confirm_action: Option<ConfirmAction>,
    pub error_message: Option<String>,
    pub success_message: Option<String>,
}

impl App {
    pub fn new(
        store: DocumentStore<FileStorage>,
        document: Document,
        config: AppConfig,
        config_path: PathBuf,
        rt: tokio::runtime::Runtime,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let today = Local::now().date_naive();

        let mut app = Self {
            rt,
            store,
            tx,
            rx,
            current_panel: Panel::default(),
            schedule_tab: EntityKind::Substitutions,
            special_tab: EntityKind::AbsenceLogs,
            profile_draft: records::form_values(&document.profile),
            document,
            unsaved: false,
            record_form: RecordForm::default(),
            record_search: String::new(),
            report_date: today,
            report_date_input: today.format("%Y-%m-%d").to_string(),
            custom_violation_category: String::new(),
            custom_violation_name: String::new(),
            dashboard_query: DashboardQuery {
                page_size: config.dashboard.page_size,
                range: TimeRange::All,
                ..Default::default()
            },
            rotation: Rotation::new(config.dashboard.page_size),
            rotation_task: None,
            export_scope: ExportScope::Full,
            export_format: ExportFormat::Json,
            export_teacher: String::new(),
            last_share_link: None,
            import_mode: ImportMode::Merge,
            import_task: None,
            import_generation: Generation::default(),
            backups: BackupRing::default(),
            log_messages: Vec::new(),
            config_draft: config.clone(),
            config,
            config_path,
            config_modified: false,
            confirm_action: None,
            error_message: None,
            success_message: None,
        };

        app.refresh_backups();
        app.log_info(format!("Data directory: {}", app.store.storage().dir().display()));
        if app.store.found_unreadable() {
            let message = "The saved data could not be read and was moved to the backups. Starting with empty data.";
            app.error_message = Some(message.to_string());
            app.log_warning(message);
        }
        app
    }

    /// Log a message to the UI log.
    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.log_messages.push(LogEntry {
            timestamp: Local::now(),
            message: message.into(),
            level,
        });

        // Keep only last 100 messages
        if self.log_messages.len() > 100 {
            self.log_messages.remove(0);
        }
    }

    /// Log an info message.
    pub fn log_info(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    /// Log a success message.
    pub fn log_success(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Success, message);
    }

    /// Log a warning message.
    pub fn log_warning(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    /// Log an error message.
    pub fn log_error(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    /// Clear the activity log.
    pub fn clear_log(&mut self) {
        self.log_messages.clear();
    }

    /// Make `next` the current document and write it to storage.
    ///
    /// A failed write keeps the change in memory, marks the state unsaved
    /// and reports the error.
    pub fn commit(&mut self, next: Document, message: impl Into<String>) {
        let message = message.into();
        self.document = next;
        match self.store.save(&self.document) {
            Ok(()) => {
                self.unsaved = false;
                self.log_success(message);
            }
            Err(e) => {
                self.unsaved = true;
                self.error_message = Some(format!("Could not save changes: {e}"));
                self.log_error(format!("{message} (not saved: {e})"));
            }
        }
    }

    /// Report a failed command.
    pub fn fail(&mut self, context: &str, error: impl std::fmt::Display) {
        let message = format!("{context}: {error}");
        self.error_message = Some(message.clone());
        self.log_error(message);
    }

    /// Run `action` now, or ask first when destructive actions need confirmation.
    pub fn request(&mut self, action: ConfirmAction) {
        if self.config.ui.confirm_destructive {
            self.confirm_action = Some(action);
        } else {
            self.execute(action);
        }
    }

    fn execute(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::DeleteRecord { kind, id, title } => {
                match commands::delete_by_kind(&self.document, kind, &id) {
                    Ok(next) => self.commit(next, format!("Deleted {kind} record '{title}'")),
                    Err(e) => self.fail("Delete failed", e),
                }
            }
            ConfirmAction::DeleteFollowUp { report_id, id, title } => {
                match commands::delete_follow_up(&self.document, &report_id, &id) {
                    Ok(next) => self.commit(next, format!("Deleted follow-up '{title}'")),
                    Err(e) => self.fail("Delete failed", e),
                }
            }
            ConfirmAction::RestoreBackup { id, label } => self.restore_backup(&id, &label),
            ConfirmAction::DeleteBackup { id, label } => {
                match transfer::delete_backup(&mut self.store, &id) {
                    Ok(()) => self.log_success(format!("Deleted backup '{label}'")),
                    Err(e) => self.fail("Delete backup failed", e),
                }
                self.refresh_backups();
            }
            ConfirmAction::OverwriteImport { path, bytes } => self.run_import(&path, &bytes, ImportMode::Overwrite),
        }
    }

    /// Reload the backup list shown in the data panel.
    pub fn refresh_backups(&mut self) {
        match transfer::list_backups(&self.store) {
            Ok(ring) => self.backups = ring,
            Err(e) => self.fail("Could not read backups", e),
        }
    }

    /// Snapshot the current document into the backup ring.
    pub fn create_backup(&mut self) {
        match self.store.archive_snapshot(&self.document, "Manual backup") {
            Ok(record) => {
                self.success_message = Some(format!("Backup created: {}", record.label));
                self.log_success(format!("Backup created: {}", record.label));
            }
            Err(e) => self.fail("Backup failed", e),
        }
        self.refresh_backups();
    }

    fn restore_backup(&mut self, id: &str, label: &str) {
        match transfer::restore_backup(&mut self.store, &self.document, id) {
            Ok(restored) => {
                self.document = restored;
                self.profile_draft = records::form_values(&self.document.profile);
                self.unsaved = false;
                self.rotation.reset();
                self.success_message = Some(format!("Restored backup '{label}'"));
                self.log_success(format!("Restored backup '{label}'"));
            }
            Err(e) => self.fail("Restore failed", e),
        }
        self.refresh_backups();
    }

    /// Export with the current data panel selection.
    pub fn export(&mut self) {
        let scope = self.export_scope.clone();
        let format = self.export_format;
        let default_name = export::generate_export_filename(&scope.file_prefix(), format.extension());

        let Some(path) = rfd::FileDialog::new()
            .set_directory(self.config.export_dir())
            .set_file_name(&default_name)
            .add_filter(format.filter_name(), &[format.extension()])
            .save_file()
        else {
            return;
        };

        let options = ExportOptions {
            language: self.config.ui.language,
            chat_max_rows: self.config.export.chat_max_rows,
        };
        match export::export_to(&self.document, &scope, format, options, &path) {
            Ok(output) => {
                self.success_message = Some(format!("Exported to: {}", output.path.display()));
                self.log_success(format!("Exported {}: {}", format.label(), output.path.display()));
                self.last_share_link = output.share_link;
            }
            Err(e) => self.fail("Export failed", e),
        }
    }

    /// Pick an import file and read it in the background.
    pub fn start_import(&mut self, ctx: &egui::Context) {
        let Some(path) = rfd::FileDialog::new().add_filter("JSON files", &["json"]).pick_file() else {
            return;
        };

        let mode = self.import_mode;
        let generation = self.import_generation.next();
        let ctx = ctx.clone();
        self.log_info(format!("Reading {}", path.display()));
        // Replacing the handle cancels a read still in flight
        self.import_task = Some(tasks::spawn_file_read(
            self.rt.handle(),
            path.clone(),
            self.tx.clone(),
            move |result| {
                ctx.request_repaint();
                UiMessage::ImportFileRead {
                    generation,
                    path,
                    mode,
                    result: result.map_err(|e| e.to_string()),
                }
            },
        ));
    }

    /// Cancel a pending import read.
    pub fn cancel_import(&mut self) {
        if let Some(task) = self.import_task.take() {
            task.cancel();
            // A result already queued by the read is dropped when polled
            self.import_generation.next();
            self.log_warning("Import cancelled");
        }
    }

    pub fn import_pending(&self) -> bool {
        self.import_task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn run_import(&mut self, path: &std::path::Path, bytes: &[u8], mode: ImportMode) {
        match transfer::import(&mut self.store, &self.document, bytes, mode) {
            Ok(outcome) => {
                self.document = outcome.document.clone();
                self.profile_draft = records::form_values(&self.document.profile);
                self.unsaved = false;
                self.rotation.reset();
                let summary = format!("Imported {} ({}): {}", path.display(), mode.label(), outcome.summary());
                self.success_message = Some(summary.clone());
                self.log_success(summary);
            }
            Err(e) => self.fail("Import failed", e),
        }
        self.refresh_backups();
    }

    /// Save configuration to file.
    pub fn save_config(&mut self) {
        if let Err(e) = self.config_draft.validate() {
            self.error_message = Some(e.to_string());
            return;
        }
        match self.config_draft.save(&self.config_path) {
            Ok(()) => {
                self.config = self.config_draft.clone();
                self.config_modified = false;
                self.dashboard_query.page_size = self.config.dashboard.page_size;
                self.rotation = Rotation::new(self.config.dashboard.page_size);
                // Restart the ticker with the new interval
                self.rotation_task = None;
                self.log_success("Settings saved");
            }
            Err(e) => {
                tracing::error!("Failed to save config: {}", e);
                self.fail("Failed to save settings", e);
            }
        }
    }

    /// Start the rotation ticker on the dashboard and stop it elsewhere.
    fn sync_rotation_task(&mut self, ctx: &egui::Context) {
        let on_dashboard = self.current_panel == Panel::Dashboard;
        if on_dashboard && self.rotation_task.is_none() {
            let ctx = ctx.clone();
            self.rotation_task = Some(tasks::spawn_ticker(
                self.rt.handle(),
                Duration::from_secs(self.config.dashboard.rotation_secs.clamp(1, MAX_ROTATION_SECS)),
                self.tx.clone(),
                move || {
                    ctx.request_repaint();
                    UiMessage::RotationTick
                },
            ));
        } else if !on_dashboard && let Some(task) = self.rotation_task.take() {
            task.cancel();
        }
    }

    /// Poll async operation results.
    fn poll_async_results(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                UiMessage::RotationTick => {
                    let today = Local::now().date_naive();
                    let len = crate::dashboard::filtered(&self.document, &self.dashboard_query, today).len();
                    self.rotation.advance(len);
                }
                UiMessage::ImportFileRead { generation, .. } if !self.import_generation.is_current(generation) => {
                    tracing::debug!("Dropping result of a cancelled import read");
                }
                UiMessage::ImportFileRead { path, mode, result, .. } => {
                    self.import_task = None;
                    match result {
                        Err(e) => self.fail(&format!("Could not read {}", path.display()), e),
                        Ok(bytes) => {
                            // Validate before asking, so a bad file never reaches the confirm dialog
                            if let Err(e) = transfer::parse_import_file(&bytes) {
                                self.fail("Import failed", e);
                            } else if mode == ImportMode::Overwrite {
                                self.request(ConfirmAction::OverwriteImport { path, bytes });
                            } else {
                                self.run_import(&path, &bytes, mode);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Render the navigation side bar.
    fn show_nav_bar(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("nav_bar")
            .resizable(false)
            .exact_width(190.0)
            .show(ctx, |ui| {
                ui.add_space(10.0);
                for panel in [
                    Panel::Dashboard,
                    Panel::Teachers,
                    Panel::Students,
                    Panel::Violations,
                    Panel::Schedule,
                    Panel::SpecialReports,
                    Panel::Profile,
                    Panel::Data,
                    Panel::Settings,
                ] {
                    let text = format!("{} {}", panel.icon(), panel.name());
                    if ui
                        .selectable_label(self.current_panel == panel, egui::RichText::new(text).size(15.0))
                        .clicked()
                    {
                        self.navigate(panel);
                    }
                    ui.add_space(4.0);
                }
            });
    }

    /// Switch panels, closing any open form.
    pub fn navigate(&mut self, panel: Panel) {
        if self.current_panel == Panel::Data && panel != Panel::Data {
            self.cancel_import();
        }
        if panel == Panel::Profile {
            self.profile_draft = records::form_values(&self.document.profile);
        }
        self.record_form.reset();
        self.record_search.clear();
        self.current_panel = panel;
    }

    /// Render status bar (display only, no interaction).
    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .min_height(28.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let school = match self.document.profile.school_name.trim() {
                        "" => "No school profile",
                        name => name,
                    };
                    ui.colored_label(colors::NEUTRAL, school);

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if self.unsaved {
                            ui.colored_label(colors::ERROR, "Unsaved changes");
                        } else {
                            ui.colored_label(colors::SUCCESS, "Saved");
                        }
                        if self.import_pending() {
                            ui.spinner();
                            ui.label("Reading import file...");
                        }
                    });
                });
            });
    }

    /// Render modal dialogs (error, success, confirmation).
    fn show_dialogs(&mut self, ctx: &egui::Context) {
        // Error dialog
        if let Some(ref error) = self.error_message.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.colored_label(colors::ERROR, error);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.error_message = None;
                    }
                });
        }

        // Success dialog
        if let Some(ref msg) = self.success_message.clone() {
            egui::Window::new("Success")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.colored_label(colors::SUCCESS, msg);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.success_message = None;
                    }
                });
        }

        // Confirmation dialog
        if let Some(action) = self.confirm_action.clone() {
            let (title, message) = action.title_and_message();
            let mut decision = None;

            egui::Window::new(title)
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        if ui.button("Cancel").clicked() {
                            decision = Some(false);
                        }
                        if ui.button(egui::RichText::new("Confirm").color(colors::ERROR)).clicked() {
                            decision = Some(true);
                        }
                    });
                });

            match decision {
                Some(true) => {
                    self.confirm_action = None;
                    self.execute(action);
                }
                Some(false) => {
                    self.confirm_action = None;
                    self.log_info("Cancelled");
                }
                None => {}
            }
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll async results
        self.poll_async_results();

        // Timers follow the visible panel
        self.sync_rotation_task(ctx);

        // Request repaint while a file is being read
        if self.import_pending() {
            ctx.request_repaint();
        }

        self.show_nav_bar(ctx);
        self.show_status_bar(ctx);

        // Modal dialogs (error, success, confirmation)
        self.show_dialogs(ctx);

        // Record form dialog
        if self.record_form.is_open {
            records::show_form_dialog(self, ctx);
        }

        // Main content
        egui::CentralPanel::default().show(ctx, |ui| {
            let go_back = match self.current_panel {
                Panel::Dashboard => {
                    if let Some(next) = dashboard::show(self, ui) {
                        self.navigate(next);
                    }
                    false
                }
                Panel::Teachers => teachers_panel::show(self, ui),
                Panel::Students => students_panel::show(self, ui),
                Panel::Violations => violations_panel::show(self, ui),
                Panel::Schedule => schedule_panel::show(self, ui),
                Panel::SpecialReports => special_panel::show(self, ui),
                Panel::Profile => profile_panel::show(self, ui),
                Panel::Data => data_panel::show(self, ui),
                Panel::Settings => settings_panel::show(self, ui),
            };
            if go_back {
                self.navigate(Panel::Dashboard);
            }
        });
    }
}
