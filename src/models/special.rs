//! Special reports: per-student logs and free-form category reports.
//!
//! Logs carry `studentId`/`studentName` as plain values. Nothing cascades
//! when a student report is deleted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind, Tabular, entity_slot};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AbsenceLog {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub grade: String,
    pub section: String,
    pub date: NaiveDate,
    pub reason: String,
    pub excused: bool,
    pub notes: String,
}

impl Tabular for AbsenceLog {
    const COLUMNS: &'static [&'static str] =
        &["studentName", "grade", "section", "date", "reason", "excused", "notes"];
}

impl Entity for AbsenceLog {
    const KIND: EntityKind = EntityKind::AbsenceLogs;
    const TITLE_COLUMN: &'static str = "studentName";
    const DETAIL_COLUMN: &'static str = "reason";
    const GROUP_COLUMN: &'static str = "grade";

    entity_slot!(AbsenceLog, absence_logs);

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LatenessLog {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub grade: String,
    pub section: String,
    pub date: NaiveDate,
    /// Arrival time as entered, e.g. "07:52".
    pub arrival_time: String,
    pub reason: String,
    pub notes: String,
}

impl Tabular for LatenessLog {
    const COLUMNS: &'static [&'static str] =
        &["studentName", "grade", "section", "date", "arrivalTime", "reason", "notes"];
}

impl Entity for LatenessLog {
    const KIND: EntityKind = EntityKind::LatenessLogs;
    const TITLE_COLUMN: &'static str = "studentName";
    const DETAIL_COLUMN: &'static str = "arrivalTime";
    const GROUP_COLUMN: &'static str = "grade";

    entity_slot!(LatenessLog, lateness_logs);

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExitLog {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub grade: String,
    pub section: String,
    pub date: NaiveDate,
    pub exit_time: String,
    pub reason: String,
    /// Guardian who collected the student.
    pub guardian_name: String,
    pub notes: String,
}

impl Tabular for ExitLog {
    const COLUMNS: &'static [&'static str] = &[
        "studentName",
        "grade",
        "section",
        "date",
        "exitTime",
        "reason",
        "guardianName",
        "notes",
    ];
}

impl Entity for ExitLog {
    const KIND: EntityKind = EntityKind::ExitLogs;
    const TITLE_COLUMN: &'static str = "studentName";
    const DETAIL_COLUMN: &'static str = "reason";
    const GROUP_COLUMN: &'static str = "grade";

    entity_slot!(ExitLog, exit_logs);

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DamageLog {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub grade: String,
    pub section: String,
    pub date: NaiveDate,
    pub description: String,
    pub estimated_cost: f64,
    pub action_taken: String,
    pub notes: String,
}

impl Tabular for DamageLog {
    const COLUMNS: &'static [&'static str] = &[
        "studentName",
        "grade",
        "section",
        "date",
        "description",
        "estimatedCost",
        "actionTaken",
        "notes",
    ];
}

impl Entity for DamageLog {
    const KIND: EntityKind = EntityKind::DamageLogs;
    const TITLE_COLUMN: &'static str = "studentName";
    const DETAIL_COLUMN: &'static str = "description";
    const GROUP_COLUMN: &'static str = "grade";

    entity_slot!(DamageLog, damage_logs);

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParentVisitLog {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub grade: String,
    pub section: String,
    pub date: NaiveDate,
    pub visitor_name: String,
    pub purpose: String,
    pub outcome: String,
    pub notes: String,
}

impl Tabular for ParentVisitLog {
    const COLUMNS: &'static [&'static str] = &[
        "studentName",
        "grade",
        "section",
        "date",
        "visitorName",
        "purpose",
        "outcome",
        "notes",
    ];
}

impl Entity for ParentVisitLog {
    const KIND: EntityKind = EntityKind::ParentVisitLogs;
    const TITLE_COLUMN: &'static str = "studentName";
    const DETAIL_COLUMN: &'static str = "purpose";
    const GROUP_COLUMN: &'static str = "grade";

    entity_slot!(ParentVisitLog, parent_visit_logs);

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

/// Follow-up state of a student who missed an exam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExamStatus {
    #[default]
    Absent,
    Excused,
    RetakeScheduled,
    Retaken,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExamLog {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub grade: String,
    pub section: String,
    pub date: NaiveDate,
    pub subject: String,
    pub exam_type: String,
    pub status: ExamStatus,
    pub notes: String,
}

impl Tabular for ExamLog {
    const COLUMNS: &'static [&'static str] = &[
        "studentName",
        "grade",
        "section",
        "date",
        "subject",
        "examType",
        "status",
        "notes",
    ];

    fn choices(key: &str) -> Option<&'static [&'static str]> {
        match key {
            "status" => Some(&["absent", "excused", "retakeScheduled", "retaken"]),
            _ => None,
        }
    }
}

impl Entity for ExamLog {
    const KIND: EntityKind = EntityKind::ExamLogs;
    const TITLE_COLUMN: &'static str = "studentName";
    const DETAIL_COLUMN: &'static str = "subject";
    const GROUP_COLUMN: &'static str = "status";

    entity_slot!(ExamLog, exam_logs);

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

/// Category of a free-form special report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpecialCategory {
    #[default]
    Supervisor,
    Staff,
    Tests,
}

/// Free-form titled report filed under a category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenericSpecialReport {
    pub id: String,
    pub category: SpecialCategory,
    pub title: String,
    pub content: String,
    pub date: NaiveDate,
}

impl Tabular for GenericSpecialReport {
    const COLUMNS: &'static [&'static str] = &["category", "title", "content", "date"];

    fn choices(key: &str) -> Option<&'static [&'static str]> {
        match key {
            "category" => Some(&["supervisor", "staff", "tests"]),
            _ => None,
        }
    }
}

impl Entity for GenericSpecialReport {
    const KIND: EntityKind = EntityKind::GenericSpecialReports;
    const TITLE_COLUMN: &'static str = "title";
    const DETAIL_COLUMN: &'static str = "content";
    const GROUP_COLUMN: &'static str = "category";

    entity_slot!(GenericSpecialReport, generic_special_reports);

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}
