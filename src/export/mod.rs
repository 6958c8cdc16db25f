//! Export engine: JSON, Excel and text sinks over a scoped copy of the document.
//!
//! Exports never modify the document they read.

pub mod json;
pub mod tabular;
pub mod text;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Local;

use crate::error::{AppError, Result};
use crate::labels::{Language, kind_label};
use crate::models::{Document, Entity, EntityKind, KindVisitor, ViolationTarget, dispatch};

/// Which part of the document an export covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportScope {
    Full,
    /// One teacher's follow-ups, timetable rows, substitutions and violations.
    Teacher(String),
    /// The profile plus a single record array.
    Entity(EntityKind),
}

impl ExportScope {
    /// Filename prefix describing the scope.
    pub fn file_prefix(&self) -> String {
        match self {
            ExportScope::Full => "school_supervisor_full".to_string(),
            ExportScope::Teacher(name) => format!("teacher_{}", sanitize_file_part(name)),
            ExportScope::Entity(kind) => kind.key().to_string(),
        }
    }
}

impl FromStr for ExportScope {
    type Err = AppError;

    /// Accepts `full`, `teacher:<name>` or an array key such as `violations`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "full" {
            return Ok(ExportScope::Full);
        }
        if let Some(name) = s.strip_prefix("teacher:") {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::validation("teacher scope needs a name, e.g. teacher:Sara"));
            }
            return Ok(ExportScope::Teacher(name.to_string()));
        }
        EntityKind::from_key(s)
            .map(ExportScope::Entity)
            .ok_or_else(|| AppError::validation(format!("unknown export scope '{s}'")))
    }
}

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Xlsx,
    /// Unbounded plain text.
    Text,
    /// Chat message text plus a share link.
    Chat,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [ExportFormat::Json, ExportFormat::Xlsx, ExportFormat::Text, ExportFormat::Chat];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Text | ExportFormat::Chat => "txt",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Json => "JSON",
            ExportFormat::Xlsx => "Excel",
            ExportFormat::Text => "Plain text",
            ExportFormat::Chat => "WhatsApp message",
        }
    }

    /// Whether the format needs a single record array to render.
    pub fn needs_single_kind(self) -> bool {
        matches!(self, ExportFormat::Xlsx | ExportFormat::Chat)
    }

    /// Label shown in export file dialogs.
    pub fn filter_name(self) -> &'static str {
        match self {
            ExportFormat::Json => "JSON files",
            ExportFormat::Xlsx => "Excel files",
            ExportFormat::Text | ExportFormat::Chat => "Text files",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "text" | "txt" => Ok(ExportFormat::Text),
            "chat" | "whatsapp" => Ok(ExportFormat::Chat),
            other => Err(AppError::validation(format!("unknown export format '{other}'"))),
        }
    }
}

/// Settings that shape an export besides scope and format.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    pub language: Language,
    pub chat_max_rows: usize,
}

/// What an export produced.
#[derive(Debug, Clone)]
pub struct ExportOutput {
    pub path: PathBuf,
    /// Chat deep link, for [`ExportFormat::Chat`].
    pub share_link: Option<String>,
}

/// The single record array a scope renders as rows, if it has one.
pub fn scope_kind(scope: &ExportScope) -> Option<EntityKind> {
    match scope {
        ExportScope::Full => None,
        ExportScope::Teacher(_) => Some(EntityKind::DailyReports),
        ExportScope::Entity(kind) => Some(*kind),
    }
}

fn scope_heading(doc: &Document, scope: &ExportScope, kind: EntityKind, lang: Language) -> String {
    let base = match scope {
        ExportScope::Teacher(name) => format!("{}: {name}", kind_label(lang, kind)),
        _ => kind_label(lang, kind).to_string(),
    };
    match doc.profile.header_line() {
        header if header.is_empty() => base,
        header => format!("{header} - {base}"),
    }
}

/// Export `scope` of `doc` as `format` to `path`. The document is not modified.
pub fn export_to(
    doc: &Document,
    scope: &ExportScope,
    format: ExportFormat,
    options: ExportOptions,
    path: &Path,
) -> Result<ExportOutput> {
    let scoped = scope_document(doc, scope);
    let kind = scope_kind(scope);
    let mut share_link = None;
    match (format, kind) {
        (ExportFormat::Json, _) => json::write_json(&scoped, path)?,
        (ExportFormat::Xlsx, Some(kind)) => {
            let table = tabular::table_for(&scoped, kind, options.language)?;
            tabular::write_xlsx(&table, path, options.language)?;
        }
        (ExportFormat::Text, None) => text::write_text(&text::document_text(&scoped, options.language), path)?,
        (ExportFormat::Text, Some(kind)) => {
            let records = text::text_records_for(&scoped, kind, options.language);
            let heading = scope_heading(&scoped, scope, kind, options.language);
            text::write_text(&text::plain_text(&heading, &records), path)?;
        }
        (ExportFormat::Chat, Some(kind)) => {
            let records = text::text_records_for(&scoped, kind, options.language);
            let heading = scope_heading(&scoped, scope, kind, options.language);
            let message = text::chat_message(&heading, &records, options.chat_max_rows);
            text::write_text(&message, path)?;
            share_link = Some(text::chat_share_link(&message));
        }
        (ExportFormat::Xlsx | ExportFormat::Chat, None) => {
            return Err(AppError::export(format!(
                "{} export needs a teacher or a single record type",
                format.label()
            )));
        }
    }

    Ok(ExportOutput {
        path: path.to_path_buf(),
        share_link,
    })
}

/// Build the document an export of `scope` should contain.
pub fn scope_document(doc: &Document, scope: &ExportScope) -> Document {
    match scope {
        ExportScope::Full => doc.clone(),
        ExportScope::Teacher(name) => teacher_document(doc, name),
        ExportScope::Entity(kind) => entity_document(doc, *kind),
    }
}

fn teacher_document(doc: &Document, name: &str) -> Document {
    let daily_reports = doc
        .daily_reports
        .iter()
        .filter_map(|report| {
            let teachers_data: Vec<_> = report
                .teachers_data
                .iter()
                .filter(|t| t.teacher_name == name)
                .cloned()
                .collect();
            (!teachers_data.is_empty()).then(|| {
                let mut report = report.clone();
                report.teachers_data = teachers_data;
                report
            })
        })
        .collect();

    Document {
        profile: doc.profile.clone(),
        daily_reports,
        timetable: doc.timetable.iter().filter(|t| t.teacher_name == name).cloned().collect(),
        substitutions: doc.substitutions.iter().filter(|s| s.involves(name)).cloned().collect(),
        violations: doc
            .violations
            .iter()
            .filter(|v| v.target == ViolationTarget::Teacher && v.name == name)
            .cloned()
            .collect(),
        ..Default::default()
    }
}

fn entity_document(doc: &Document, kind: EntityKind) -> Document {
    struct CopyKind<'a> {
        from: &'a Document,
        to: Document,
    }

    impl KindVisitor for CopyKind<'_> {
        type Output = Document;

        fn visit<T: Entity>(mut self) -> Document {
            *T::records_mut(&mut self.to) = T::records(self.from).clone();
            self.to
        }
    }

    dispatch(
        kind,
        CopyKind {
            from: doc,
            to: Document {
                profile: doc.profile.clone(),
                ..Default::default()
            },
        },
    )
}

/// Generate default filename for export.
pub fn generate_export_filename(prefix: &str, extension: &str) -> String {
    let now = Local::now();
    format!("{prefix}_{ts}.{extension}", ts = now.format("%Y%m%d_%H%M%S"))
}

/// Open save file dialog and return selected path.
pub fn show_save_dialog(default_name: &str, filter_name: &str, extension: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_file_name(default_name)
        .add_filter(filter_name, &[extension])
        .save_file()
}

fn sanitize_file_part(text: &str) -> String {
    let cleaned: String = text
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "unnamed".to_string() } else { cleaned }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AbsenceLog, DailyReportContainer, SubstitutionEntry, TeacherFollowUp, TimetableEntry, Violation,
    };

    fn sample() -> Document {
        let mut doc = Document::default();
        doc.profile.school_name = "Al Noor".into();
        doc.violations = vec![
            Violation {
                id: "v1".into(),
                target: ViolationTarget::Teacher,
                name: "Sara".into(),
                ..Default::default()
            },
            Violation {
                id: "v2".into(),
                name: "Omar".into(),
                ..Default::default()
            },
        ];
        doc.absence_logs = vec![AbsenceLog {
            id: "a1".into(),
            ..Default::default()
        }];
        doc.timetable = vec![
            TimetableEntry {
                id: "t1".into(),
                teacher_name: "Sara".into(),
                ..Default::default()
            },
            TimetableEntry {
                id: "t2".into(),
                teacher_name: "Ali".into(),
                ..Default::default()
            },
        ];
        doc.substitutions = vec![SubstitutionEntry {
            id: "s1".into(),
            absent_teacher: "Ali".into(),
            substitute_teacher: "Sara".into(),
            ..Default::default()
        }];
        doc.daily_reports = vec![
            DailyReportContainer {
                id: "d1".into(),
                teachers_data: vec![
                    TeacherFollowUp {
                        id: "f1".into(),
                        teacher_name: "Sara".into(),
                        ..Default::default()
                    },
                    TeacherFollowUp {
                        id: "f2".into(),
                        teacher_name: "Ali".into(),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            },
            DailyReportContainer {
                id: "d2".into(),
                teachers_data: vec![TeacherFollowUp {
                    id: "f3".into(),
                    teacher_name: "Ali".into(),
                    ..Default::default()
                }],
                ..Default::default()
            },
        ];
        doc.custom_violations.insert("devices".into(), vec!["Smart watch".into()]);
        doc.extra.insert("legacy".into(), serde_json::json!(1));
        doc
    }

    #[test]
    fn test_entity_scope_keeps_only_profile_and_that_array() {
        let doc = sample();
        let out = scope_document(&doc, &ExportScope::Entity(EntityKind::Violations));

        assert_eq!(out.profile, doc.profile);
        assert_eq!(out.violations, doc.violations);
        for kind in EntityKind::ALL.into_iter().filter(|k| *k != EntityKind::Violations) {
            assert_eq!(out.count(kind), 0, "{kind} should be empty");
        }
        assert!(out.custom_violations.is_empty());
        assert!(out.extra.is_empty());
    }

    #[test]
    fn test_teacher_scope_filters_everything_to_that_teacher() {
        let out = scope_document(&sample(), &ExportScope::Teacher("Sara".into()));
        assert_eq!(out.daily_reports.len(), 1);
        assert_eq!(out.daily_reports[0].teachers_data.len(), 1);
        assert_eq!(out.daily_reports[0].teachers_data[0].id, "f1");
        assert_eq!(out.timetable.len(), 1);
        assert_eq!(out.substitutions.len(), 1);
        assert_eq!(out.violations.len(), 1);
        assert!(out.absence_logs.is_empty());
    }

    #[test]
    fn test_full_scope_is_unchanged_copy() {
        let doc = sample();
        assert_eq!(scope_document(&doc, &ExportScope::Full), doc);
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!("full".parse::<ExportScope>().unwrap(), ExportScope::Full);
        assert_eq!(
            "teacher:Sara".parse::<ExportScope>().unwrap(),
            ExportScope::Teacher("Sara".into())
        );
        assert_eq!(
            "examLogs".parse::<ExportScope>().unwrap(),
            ExportScope::Entity(EntityKind::ExamLogs)
        );
        assert!("teacher:".parse::<ExportScope>().is_err());
        assert!("nothing".parse::<ExportScope>().is_err());
    }

    #[test]
    fn test_export_to_every_format() {
        let dir = tempfile::tempdir().unwrap();
        let doc = sample();
        let options = ExportOptions {
            language: Language::En,
            chat_max_rows: 30,
        };
        let scope = ExportScope::Entity(EntityKind::Violations);

        for format in ExportFormat::ALL {
            let path = dir.path().join(generate_export_filename(&scope.file_prefix(), format.extension()));
            let out = export_to(&doc, &scope, format, options, &path).unwrap();
            assert!(out.path.exists(), "{format:?} wrote nothing");
            assert_eq!(out.share_link.is_some(), format == ExportFormat::Chat);
        }
    }

    #[test]
    fn test_full_scope_rejects_single_sheet_formats() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExportOptions {
            language: Language::En,
            chat_max_rows: 30,
        };
        let path = dir.path().join("full.xlsx");
        let result = export_to(&sample(), &ExportScope::Full, ExportFormat::Xlsx, options, &path);
        assert!(matches!(result, Err(AppError::Export(_))));
        assert!(!path.exists());

        let path = dir.path().join("full.txt");
        export_to(&sample(), &ExportScope::Full, ExportFormat::Text, options, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Al Noor"));
        assert!(text.contains("Violations"));
    }

    #[test]
    fn test_export_leaves_document_unchanged() {
        let doc = sample();
        let before = doc.clone();
        let dir = tempfile::tempdir().unwrap();
        let options = ExportOptions {
            language: Language::Ar,
            chat_max_rows: 1,
        };
        let scope = ExportScope::Teacher("Sara".into());
        export_to(&doc, &scope, ExportFormat::Chat, options, &dir.path().join("chat.txt")).unwrap();
        assert_eq!(doc, before);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("xlsx".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert_eq!("Chat".parse::<ExportFormat>().unwrap(), ExportFormat::Chat);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_file_prefix_is_filesystem_safe() {
        assert_eq!(ExportScope::Teacher("Sara Ali/2".into()).file_prefix(), "teacher_Sara_Ali_2");
        assert_eq!(ExportScope::Entity(EntityKind::Violations).file_prefix(), "violations");
    }
}
