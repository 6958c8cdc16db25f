//! Student behavioural and academic reports.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind, Tabular, entity_slot};

/// Level choices used by the academic and behaviour columns.
pub const LEVELS: &[&str] = &["excellent", "veryGood", "good", "acceptable", "weak"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudentReport {
    pub id: String,
    pub name: String,
    pub grade: String,
    pub section: String,
    pub gender: String,
    pub health_status: String,
    pub guardian_phone: String,
    pub reading_level: String,
    pub writing_level: String,
    pub participation_level: String,
    pub behavior_level: String,
    pub main_notes: String,
    pub other_notes: String,
    pub created_at: Option<NaiveDate>,
}

impl Tabular for StudentReport {
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "grade",
        "section",
        "gender",
        "healthStatus",
        "guardianPhone",
        "readingLevel",
        "writingLevel",
        "participationLevel",
        "behaviorLevel",
        "mainNotes",
        "otherNotes",
        "createdAt",
    ];

    fn choices(key: &str) -> Option<&'static [&'static str]> {
        match key {
            "readingLevel" | "writingLevel" | "participationLevel" | "behaviorLevel" => Some(LEVELS),
            "gender" => Some(&["male", "female"]),
            _ => None,
        }
    }
}

impl Entity for StudentReport {
    const KIND: EntityKind = EntityKind::StudentReports;
    const TITLE_COLUMN: &'static str = "name";
    const DETAIL_COLUMN: &'static str = "grade";
    const GROUP_COLUMN: &'static str = "behaviorLevel";

    entity_slot!(StudentReport, student_reports);

    fn date(&self) -> Option<NaiveDate> {
        self.created_at
    }
}
