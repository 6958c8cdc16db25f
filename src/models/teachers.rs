//! Teacher daily evaluations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind, Tabular, entity_slot};

/// Highest value of a single evaluation criterion.
pub const MAX_SCORE: u8 = 4;

/// Score columns of a follow-up, in display order.
pub const SCORE_COLUMNS: &[&str] = &[
    "attendance",
    "appearance",
    "preparation",
    "classManagement",
    "teachingStrategies",
    "studentEngagement",
    "assessment",
];

/// One day's evaluation sheet, wrapping the follow-ups of every teacher
/// visited that day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DailyReportContainer {
    pub id: String,
    pub day_name: String,
    pub date: NaiveDate,
    pub teachers_data: Vec<TeacherFollowUp>,
}

impl Tabular for DailyReportContainer {
    const COLUMNS: &'static [&'static str] = &["dayName", "date"];
}

impl Entity for DailyReportContainer {
    const KIND: EntityKind = EntityKind::DailyReports;
    const TITLE_COLUMN: &'static str = "dayName";
    const DETAIL_COLUMN: &'static str = "date";
    const GROUP_COLUMN: &'static str = "dayName";

    entity_slot!(DailyReportContainer, daily_reports);

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

/// Evaluation of one teacher within a daily report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeacherFollowUp {
    pub id: String,
    pub teacher_name: String,
    pub subject: String,
    pub class_name: String,
    pub attendance: u8,
    pub appearance: u8,
    pub preparation: u8,
    pub class_management: u8,
    pub teaching_strategies: u8,
    pub student_engagement: u8,
    pub assessment: u8,
    /// Violation types recorded against the teacher during the visit.
    pub violations: Vec<String>,
    pub notes: String,
}

impl Tabular for TeacherFollowUp {
    const COLUMNS: &'static [&'static str] = &[
        "teacherName",
        "subject",
        "className",
        "attendance",
        "appearance",
        "preparation",
        "classManagement",
        "teachingStrategies",
        "studentEngagement",
        "assessment",
        "violations",
        "notes",
    ];
}

impl TeacherFollowUp {
    fn scores(&self) -> [u8; 7] {
        [
            self.attendance,
            self.appearance,
            self.preparation,
            self.class_management,
            self.teaching_strategies,
            self.student_engagement,
            self.assessment,
        ]
    }

    pub fn total(&self) -> u32 {
        self.scores().iter().map(|&s| u32::from(s)).sum()
    }

    pub fn max_total() -> u32 {
        SCORE_COLUMNS.len() as u32 * u32::from(MAX_SCORE)
    }

    /// Total as a percentage of the maximum, rounded to one decimal.
    pub fn percentage(&self) -> f64 {
        let pct = f64::from(self.total()) * 100.0 / f64::from(Self::max_total());
        (pct * 10.0).round() / 10.0
    }

    /// Names of criteria scored above [`MAX_SCORE`].
    pub fn out_of_range(&self) -> Vec<&'static str> {
        SCORE_COLUMNS
            .iter()
            .zip(self.scores())
            .filter(|(_, s)| *s > MAX_SCORE)
            .map(|(name, _)| *name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_and_percentage() {
        let f = TeacherFollowUp {
            attendance: 4,
            appearance: 4,
            preparation: 3,
            class_management: 2,
            teaching_strategies: 4,
            student_engagement: 3,
            assessment: 1,
            ..Default::default()
        };
        assert_eq!(f.total(), 21);
        assert_eq!(TeacherFollowUp::max_total(), 28);
        assert_eq!(f.percentage(), 75.0);
    }

    #[test]
    fn test_out_of_range_scores() {
        let f = TeacherFollowUp {
            preparation: 9,
            ..Default::default()
        };
        assert_eq!(f.out_of_range(), vec!["preparation"]);
    }
}
