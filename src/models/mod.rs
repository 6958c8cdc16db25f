//! Document model: the single root object holding all application state.

pub mod profile;
pub mod schedule;
pub mod special;
pub mod students;
pub mod teachers;
pub mod violations;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};

pub use profile::SchoolProfile;
pub use schedule::{SubstitutionEntry, TimetableEntry};
pub use special::{
    AbsenceLog, DamageLog, ExamLog, ExamStatus, ExitLog, GenericSpecialReport, LatenessLog, ParentVisitLog,
    SpecialCategory,
};
pub use students::StudentReport;
pub use teachers::{DailyReportContainer, MAX_SCORE, TeacherFollowUp};
pub use violations::{Violation, ViolationTarget};

/// Root document persisted under the document storage key.
///
/// Missing top-level keys default on load. Keys this version does not know
/// are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Document {
    pub profile: SchoolProfile,
    pub timetable: Vec<TimetableEntry>,
    pub substitutions: Vec<SubstitutionEntry>,
    pub daily_reports: Vec<DailyReportContainer>,
    pub student_reports: Vec<StudentReport>,
    pub absence_logs: Vec<AbsenceLog>,
    pub lateness_logs: Vec<LatenessLog>,
    pub exit_logs: Vec<ExitLog>,
    pub damage_logs: Vec<DamageLog>,
    pub parent_visit_logs: Vec<ParentVisitLog>,
    pub exam_logs: Vec<ExamLog>,
    pub generic_special_reports: Vec<GenericSpecialReport>,
    pub violations: Vec<Violation>,
    /// User-added violation types, keyed by violation category.
    pub custom_violations: BTreeMap<String, Vec<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Document {
    /// Number of records in the array identified by `kind`.
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Timetable => self.timetable.len(),
            EntityKind::Substitutions => self.substitutions.len(),
            EntityKind::DailyReports => self.daily_reports.len(),
            EntityKind::StudentReports => self.student_reports.len(),
            EntityKind::AbsenceLogs => self.absence_logs.len(),
            EntityKind::LatenessLogs => self.lateness_logs.len(),
            EntityKind::ExitLogs => self.exit_logs.len(),
            EntityKind::DamageLogs => self.damage_logs.len(),
            EntityKind::ParentVisitLogs => self.parent_visit_logs.len(),
            EntityKind::ExamLogs => self.exam_logs.len(),
            EntityKind::GenericSpecialReports => self.generic_special_reports.len(),
            EntityKind::Violations => self.violations.len(),
        }
    }

    /// Every teacher name mentioned in the profile or in daily reports, sorted.
    pub fn teacher_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .profile
            .teachers
            .iter()
            .cloned()
            .chain(
                self.daily_reports
                    .iter()
                    .flat_map(|r| r.teachers_data.iter().map(|t| t.teacher_name.clone())),
            )
            .filter(|n| !n.trim().is_empty())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Names of every student with a report, sorted.
    pub fn student_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .student_reports
            .iter()
            .map(|s| s.name.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

/// Identifies one of the id-keyed record arrays of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Timetable,
    Substitutions,
    DailyReports,
    StudentReports,
    AbsenceLogs,
    LatenessLogs,
    ExitLogs,
    DamageLogs,
    ParentVisitLogs,
    ExamLogs,
    GenericSpecialReports,
    Violations,
}

impl EntityKind {
    pub const ALL: [EntityKind; 12] = [
        EntityKind::Timetable,
        EntityKind::Substitutions,
        EntityKind::DailyReports,
        EntityKind::StudentReports,
        EntityKind::AbsenceLogs,
        EntityKind::LatenessLogs,
        EntityKind::ExitLogs,
        EntityKind::DamageLogs,
        EntityKind::ParentVisitLogs,
        EntityKind::ExamLogs,
        EntityKind::GenericSpecialReports,
        EntityKind::Violations,
    ];

    /// The per-student special report logs.
    pub const STUDENT_LOGS: [EntityKind; 6] = [
        EntityKind::AbsenceLogs,
        EntityKind::LatenessLogs,
        EntityKind::ExitLogs,
        EntityKind::DamageLogs,
        EntityKind::ParentVisitLogs,
        EntityKind::ExamLogs,
    ];

    /// JSON key of the array in the document.
    pub fn key(self) -> &'static str {
        match self {
            EntityKind::Timetable => "timetable",
            EntityKind::Substitutions => "substitutions",
            EntityKind::DailyReports => "dailyReports",
            EntityKind::StudentReports => "studentReports",
            EntityKind::AbsenceLogs => "absenceLogs",
            EntityKind::LatenessLogs => "latenessLogs",
            EntityKind::ExitLogs => "exitLogs",
            EntityKind::DamageLogs => "damageLogs",
            EntityKind::ParentVisitLogs => "parentVisitLogs",
            EntityKind::ExamLogs => "examLogs",
            EntityKind::GenericSpecialReports => "genericSpecialReports",
            EntityKind::Violations => "violations",
        }
    }

    /// Look up a kind by its JSON key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A record type that can be shown as a row of named cells and edited one
/// cell at a time.
///
/// Cells are read from and written to the record's JSON form, so column keys
/// are the record's camelCase field names.
pub trait Tabular: Serialize + DeserializeOwned {
    /// Column keys in display order.
    const COLUMNS: &'static [&'static str];

    /// Fixed choices for a column, if it is an enumeration.
    fn choices(_key: &str) -> Option<&'static [&'static str]> {
        None
    }

    /// Display text of one cell. Unknown keys render empty.
    fn cell(&self, key: &str) -> String {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map.get(key).map(display_value).unwrap_or_default(),
            _ => String::new(),
        }
    }

    /// Display text of every column, in [`Tabular::COLUMNS`] order.
    fn cells(&self) -> Vec<String> {
        let map = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        Self::COLUMNS
            .iter()
            .map(|key| map.get(*key).map(display_value).unwrap_or_default())
            .collect()
    }

    /// Return a copy of the record with one field replaced by parsed `text`.
    ///
    /// The text is coerced to the JSON type the field currently holds, then the
    /// whole record is re-validated by deserialization.
    fn with_field(&self, key: &str, text: &str) -> Result<Self>
    where
        Self: Sized,
    {
        let Value::Object(mut map) = serde_json::to_value(self)? else {
            return Err(AppError::validation("record is not an object"));
        };
        let current = map.get(key).cloned().unwrap_or(Value::Null);
        // Empty text clears an optional field; required text fields keep ""
        if text.trim().is_empty() && current.is_string() {
            let mut cleared = map.clone();
            cleared.insert(key.to_string(), Value::Null);
            if let Ok(record) = serde_json::from_value(Value::Object(cleared)) {
                return Ok(record);
            }
        }
        map.insert(key.to_string(), coerce_text(&current, text).map_err(|e| field_error(key, e))?);
        serde_json::from_value(Value::Object(map)).map_err(|e| field_error(key, e.to_string()))
    }
}

fn field_error(key: &str, msg: impl std::fmt::Display) -> AppError {
    AppError::validation(format!("{key}: {msg}"))
}

/// Render a JSON value as cell text.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => value.to_string(),
    }
}

fn coerce_text(current: &Value, text: &str) -> std::result::Result<Value, String> {
    let trimmed = text.trim();
    match current {
        Value::Bool(_) => parse_bool(trimmed)
            .map(Value::Bool)
            .ok_or_else(|| format!("'{trimmed}' is not yes/no")),
        Value::Number(_) => {
            if let Ok(n) = trimmed.parse::<i64>() {
                Ok(Value::from(n))
            } else if let Ok(f) = trimmed.parse::<f64>() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("'{trimmed}' is not a finite number"))
            } else {
                Err(format!("'{trimmed}' is not a number"))
            }
        }
        Value::Array(_) => Ok(Value::Array(
            trimmed
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect(),
        )),
        Value::Null if trimmed.is_empty() => Ok(Value::Null),
        _ => Ok(Value::String(trimmed.to_string())),
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_lowercase().as_str() {
        "yes" | "true" | "1" | "y" | "نعم" => Some(true),
        "no" | "false" | "0" | "n" | "" | "لا" => Some(false),
        _ => None,
    }
}

/// A record stored in one of the document's id-keyed arrays.
pub trait Entity: Tabular + Clone + PartialEq + Default {
    const KIND: EntityKind;
    /// Column used as the record's headline in lists and messages.
    const TITLE_COLUMN: &'static str;
    /// Column used as the secondary line.
    const DETAIL_COLUMN: &'static str;
    /// Column whose values form the dashboard sub-field groups.
    const GROUP_COLUMN: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn records(doc: &Document) -> &Vec<Self>;
    fn records_mut(doc: &mut Document) -> &mut Vec<Self>;

    /// Date the record refers to, if it has one.
    fn date(&self) -> Option<NaiveDate> {
        None
    }
}

/// An operation that is generic over the entity type behind an [`EntityKind`].
pub trait KindVisitor {
    type Output;
    fn visit<T: Entity>(self) -> Self::Output;
}

/// Run `visitor` with the concrete entity type of `kind`.
pub fn dispatch<V: KindVisitor>(kind: EntityKind, visitor: V) -> V::Output {
    match kind {
        EntityKind::Timetable => visitor.visit::<TimetableEntry>(),
        EntityKind::Substitutions => visitor.visit::<SubstitutionEntry>(),
        EntityKind::DailyReports => visitor.visit::<DailyReportContainer>(),
        EntityKind::StudentReports => visitor.visit::<StudentReport>(),
        EntityKind::AbsenceLogs => visitor.visit::<AbsenceLog>(),
        EntityKind::LatenessLogs => visitor.visit::<LatenessLog>(),
        EntityKind::ExitLogs => visitor.visit::<ExitLog>(),
        EntityKind::DamageLogs => visitor.visit::<DamageLog>(),
        EntityKind::ParentVisitLogs => visitor.visit::<ParentVisitLog>(),
        EntityKind::ExamLogs => visitor.visit::<ExamLog>(),
        EntityKind::GenericSpecialReports => visitor.visit::<GenericSpecialReport>(),
        EntityKind::Violations => visitor.visit::<Violation>(),
    }
}

/// Implements the id accessors and the document slot of an [`Entity`].
///
/// Every entity struct names its id field `id`.
macro_rules! entity_slot {
    ($ty:ty, $field:ident) => {
        fn id(&self) -> &str {
            &self.id
        }

        fn set_id(&mut self, id: String) {
            self.id = id;
        }

        fn records(doc: &$crate::models::Document) -> &Vec<$ty> {
            &doc.$field
        }

        fn records_mut(doc: &mut $crate::models::Document) -> &mut Vec<$ty> {
            &mut doc.$field
        }
    };
}
pub(crate) use entity_slot;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_keys_default() {
        let doc: Document = serde_json::from_value(json!({ "violations": [] })).unwrap();
        assert!(doc.absence_logs.is_empty());
        assert_eq!(doc.profile, SchoolProfile::default());
    }

    #[test]
    fn test_unknown_keys_survive_roundtrip() {
        let doc: Document = serde_json::from_value(json!({ "futureThing": { "a": 1 } })).unwrap();
        assert_eq!(doc.extra.get("futureThing"), Some(&json!({ "a": 1 })));

        let text = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&text).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_entity_kind_keys_roundtrip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(EntityKind::from_key("profile"), None);
    }

    #[test]
    fn test_with_field_coerces_types() {
        let log = AbsenceLog::default();
        let log = log.with_field("excused", "yes").unwrap();
        assert!(log.excused);
        let log = log.with_field("date", "2024-03-05").unwrap();
        assert_eq!(log.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(log.cell("date"), "2024-03-05");
        assert_eq!(log.cell("excused"), "Yes");
    }

    #[test]
    fn test_with_field_rejects_bad_values() {
        let log = AbsenceLog::default();
        assert!(log.with_field("date", "not a date").is_err());
        assert!(log.with_field("excused", "maybe").is_err());

        let damage = DamageLog::default();
        assert!(damage.with_field("estimatedCost", "abc").is_err());
        assert_eq!(damage.with_field("estimatedCost", "12.5").unwrap().estimated_cost, 12.5);
    }

    #[test]
    fn test_with_field_clears_optional_date() {
        let report = StudentReport {
            name: "Omar".into(),
            ..Default::default()
        };
        let report = report.with_field("createdAt", "2024-03-05").unwrap();
        assert_eq!(report.created_at, NaiveDate::from_ymd_opt(2024, 3, 5));

        let report = report.with_field("createdAt", "  ").unwrap();
        assert_eq!(report.created_at, None);
        assert_eq!(report.cell("createdAt"), "");

        // Plain text fields still take an empty value
        let report = report.with_field("name", "").unwrap();
        assert_eq!(report.name, "");
        // A required date still rejects empty text
        assert!(AbsenceLog::default().with_field("date", "").is_err());
    }

    #[test]
    fn test_with_field_splits_lists() {
        let profile = SchoolProfile::default();
        let profile = profile.with_field("classes", "1/A, 1/B ,,2/A").unwrap();
        assert_eq!(profile.classes, vec!["1/A", "1/B", "2/A"]);
        assert_eq!(profile.cell("classes"), "1/A, 1/B, 2/A");
    }

    #[test]
    fn test_teacher_names_merges_sources() {
        let mut doc = Document::default();
        doc.profile.teachers = vec!["Sara".into(), "Ali".into()];
        doc.daily_reports.push(DailyReportContainer {
            teachers_data: vec![TeacherFollowUp {
                teacher_name: "Ali".into(),
                ..Default::default()
            }],
            ..Default::default()
        });
        assert_eq!(doc.teacher_names(), vec!["Ali", "Sara"]);
    }
}
