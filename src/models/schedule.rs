//! Timetable and substitution (coverage) schedule entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind, Tabular, entity_slot};

/// One period of the weekly timetable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimetableEntry {
    pub id: String,
    pub day: String,
    pub period: u8,
    pub class_name: String,
    pub subject: String,
    pub teacher_name: String,
}

impl Tabular for TimetableEntry {
    const COLUMNS: &'static [&'static str] = &["day", "period", "className", "subject", "teacherName"];
}

impl Entity for TimetableEntry {
    const KIND: EntityKind = EntityKind::Timetable;
    const TITLE_COLUMN: &'static str = "teacherName";
    const DETAIL_COLUMN: &'static str = "subject";
    const GROUP_COLUMN: &'static str = "day";

    entity_slot!(TimetableEntry, timetable);
}

/// A period covered by a substitute teacher on a given date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubstitutionEntry {
    pub id: String,
    pub date: NaiveDate,
    pub period: u8,
    pub class_name: String,
    pub subject: String,
    pub absent_teacher: String,
    pub substitute_teacher: String,
    /// Substitute has signed the coverage sheet.
    pub signed: bool,
    pub notes: String,
}

impl Tabular for SubstitutionEntry {
    const COLUMNS: &'static [&'static str] = &[
        "date",
        "period",
        "className",
        "subject",
        "absentTeacher",
        "substituteTeacher",
        "signed",
        "notes",
    ];
}

impl Entity for SubstitutionEntry {
    const KIND: EntityKind = EntityKind::Substitutions;
    const TITLE_COLUMN: &'static str = "substituteTeacher";
    const DETAIL_COLUMN: &'static str = "absentTeacher";
    const GROUP_COLUMN: &'static str = "className";

    entity_slot!(SubstitutionEntry, substitutions);

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

impl SubstitutionEntry {
    /// True when `teacher` is either the absent or the covering teacher.
    pub fn involves(&self, teacher: &str) -> bool {
        self.absent_teacher == teacher || self.substitute_teacher == teacher
    }
}
