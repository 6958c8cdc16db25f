//! Dashboard aggregation: cross-entity counts, filters and the rotating view.
//!
//! Everything here is a pure function of the document, the query and the
//! current date.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Document, Entity, EntityKind, KindVisitor, dispatch};

/// Date window applied to dashboard records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    All,
    Today,
    /// The last 7 days including today.
    Week,
    /// The last 30 days including today.
    Month,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [TimeRange::All, TimeRange::Today, TimeRange::Week, TimeRange::Month];

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::All => "All time",
            TimeRange::Today => "Today",
            TimeRange::Week => "Last 7 days",
            TimeRange::Month => "Last 30 days",
        }
    }

    fn days(self) -> Option<i64> {
        match self {
            TimeRange::All => None,
            TimeRange::Today => Some(1),
            TimeRange::Week => Some(7),
            TimeRange::Month => Some(30),
        }
    }

    /// Whether a record dated `date` falls in the window ending `today`.
    /// Undated records only match [`TimeRange::All`].
    pub fn contains(self, date: Option<NaiveDate>, today: NaiveDate) -> bool {
        match (self.days(), date) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(days), Some(date)) => date <= today && date > today - Duration::days(days),
        }
    }
}

/// One row of the dashboard list.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardItem {
    pub kind: EntityKind,
    pub id: String,
    pub title: String,
    pub detail: String,
    /// Value of the category's group column.
    pub group: String,
    pub date: Option<NaiveDate>,
}

/// Filter selection of the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardQuery {
    pub category: EntityKind,
    pub sub_field: Option<String>,
    pub range: TimeRange,
    pub page_size: usize,
}

impl Default for DashboardQuery {
    fn default() -> Self {
        Self {
            category: EntityKind::Violations,
            sub_field: None,
            range: TimeRange::All,
            page_size: 3,
        }
    }
}

/// What the dashboard shows for one query and offset.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    /// Number of records matching the query.
    pub count: usize,
    pub visible: Vec<DashboardItem>,
    /// Offset actually used; reset to 0 when the requested one is past the end.
    pub offset: usize,
}

/// Every dashboard item of `category`. Daily reports contribute one item per
/// teacher follow-up, grouped by subject.
pub fn items(doc: &Document, category: EntityKind) -> Vec<DashboardItem> {
    struct Collect<'a> {
        doc: &'a Document,
    }

    impl KindVisitor for Collect<'_> {
        type Output = Vec<DashboardItem>;

        fn visit<T: Entity>(self) -> Vec<DashboardItem> {
            T::records(self.doc)
                .iter()
                .map(|record| DashboardItem {
                    kind: T::KIND,
                    id: record.id().to_string(),
                    title: record.cell(T::TITLE_COLUMN),
                    detail: record.cell(T::DETAIL_COLUMN),
                    group: record.cell(T::GROUP_COLUMN),
                    date: record.date(),
                })
                .collect()
        }
    }

    if category == EntityKind::DailyReports {
        return doc
            .daily_reports
            .iter()
            .flat_map(|report| {
                report.teachers_data.iter().map(move |f| DashboardItem {
                    kind: EntityKind::DailyReports,
                    id: f.id.clone(),
                    title: f.teacher_name.clone(),
                    detail: format!("{} ({}%)", f.class_name, f.percentage()),
                    group: f.subject.clone(),
                    date: Some(report.date),
                })
            })
            .collect();
    }
    dispatch(category, Collect { doc })
}

/// Items of the query's category that pass its sub-field and time filters.
pub fn filtered(doc: &Document, query: &DashboardQuery, today: NaiveDate) -> Vec<DashboardItem> {
    items(doc, query.category)
        .into_iter()
        .filter(|item| query.sub_field.as_deref().is_none_or(|g| item.group == g))
        .filter(|item| query.range.contains(item.date, today))
        .collect()
}

/// Filter the document and cut the page starting at `offset`.
pub fn aggregate(doc: &Document, query: &DashboardQuery, offset: usize, today: NaiveDate) -> DashboardView {
    let matching = filtered(doc, query, today);
    let count = matching.len();
    let offset = if offset >= count { 0 } else { offset };
    let page = query.page_size.max(1);
    let visible = matching.into_iter().skip(offset).take(page).collect();
    DashboardView { count, visible, offset }
}

/// Record counts per category within `range`, for the summary cards.
pub fn summary_counts(doc: &Document, range: TimeRange, today: NaiveDate) -> BTreeMap<EntityKind, usize> {
    EntityKind::ALL
        .into_iter()
        .map(|kind| {
            let n = items(doc, kind)
                .iter()
                .filter(|item| range.contains(item.date, today))
                .count();
            (kind, n)
        })
        .collect()
}

/// Distinct non-empty group values of `category`, sorted.
pub fn sub_fields(doc: &Document, category: EntityKind) -> Vec<String> {
    items(doc, category)
        .into_iter()
        .map(|item| item.group)
        .filter(|g| !g.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Page offset of the rotating dashboard list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation {
    pub offset: usize,
    pub page_size: usize,
}

impl Rotation {
    pub fn new(page_size: usize) -> Self {
        Self {
            offset: 0,
            page_size: page_size.max(1),
        }
    }

    /// Move one page forward through a list of `len` items, wrapping to the
    /// start when the next page would begin at or past the end.
    pub fn advance(&mut self, len: usize) -> usize {
        let next = self.offset + self.page_size;
        self.offset = if next >= len { 0 } else { next };
        self.offset
    }

    pub fn reset(&mut self) {
        self.offset = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AbsenceLog, DailyReportContainer, StudentReport, TeacherFollowUp, TimetableEntry, Violation,
    };

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 20).unwrap()
    }

    fn days_ago(n: i64) -> NaiveDate {
        today() - Duration::days(n)
    }

    /// Records dated 0, 3, 6, 7, 20, 29, 30 and 90 days ago, plus one in the future.
    const AGES: [i64; 9] = [0, 3, 6, 7, 20, 29, 30, 90, -2];

    fn sample() -> Document {
        let mut doc = Document::default();
        for (i, age) in AGES.iter().enumerate() {
            let date = days_ago(*age);
            doc.absence_logs.push(AbsenceLog {
                id: format!("a{i}"),
                student_name: format!("S{i}"),
                grade: if i % 2 == 0 { "7".into() } else { "8".into() },
                date,
                ..Default::default()
            });
            doc.violations.push(Violation {
                id: format!("v{i}"),
                category: if i % 3 == 0 { "behavior".into() } else { "uniform".into() },
                date,
                ..Default::default()
            });
            doc.daily_reports.push(DailyReportContainer {
                id: format!("d{i}"),
                date,
                teachers_data: vec![
                    TeacherFollowUp {
                        id: format!("f{i}a"),
                        subject: "Math".into(),
                        ..Default::default()
                    },
                    TeacherFollowUp {
                        id: format!("f{i}b"),
                        subject: "Science".into(),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            });
        }
        doc.student_reports = vec![
            StudentReport {
                id: "s1".into(),
                created_at: Some(days_ago(1)),
                ..Default::default()
            },
            StudentReport {
                id: "s2".into(),
                created_at: None,
                ..Default::default()
            },
        ];
        doc.timetable = vec![TimetableEntry {
            id: "t1".into(),
            ..Default::default()
        }];
        doc
    }

    fn in_window(range: TimeRange, date: NaiveDate) -> bool {
        let age = (today() - date).num_days();
        match range {
            TimeRange::All => true,
            TimeRange::Today => age == 0,
            TimeRange::Week => (0..7).contains(&age),
            TimeRange::Month => (0..30).contains(&age),
        }
    }

    fn independent_count(doc: &Document, kind: EntityKind, range: TimeRange) -> usize {
        match kind {
            EntityKind::AbsenceLogs => doc.absence_logs.iter().filter(|l| in_window(range, l.date)).count(),
            EntityKind::Violations => doc.violations.iter().filter(|v| in_window(range, v.date)).count(),
            EntityKind::DailyReports => doc
                .daily_reports
                .iter()
                .filter(|r| in_window(range, r.date))
                .map(|r| r.teachers_data.len())
                .sum(),
            EntityKind::StudentReports => doc
                .student_reports
                .iter()
                .filter(|s| match s.created_at {
                    Some(d) => in_window(range, d),
                    None => range == TimeRange::All,
                })
                .count(),
            EntityKind::Timetable => {
                if range == TimeRange::All {
                    doc.timetable.len()
                } else {
                    0
                }
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_counts_match_independent_filtering() {
        let doc = sample();
        let kinds = [
            EntityKind::AbsenceLogs,
            EntityKind::Violations,
            EntityKind::DailyReports,
            EntityKind::StudentReports,
            EntityKind::Timetable,
        ];
        for kind in kinds {
            for range in TimeRange::ALL {
                let query = DashboardQuery {
                    category: kind,
                    range,
                    ..Default::default()
                };
                let view = aggregate(&doc, &query, 0, today());
                assert_eq!(view.count, independent_count(&doc, kind, range), "{kind} / {range:?}");
                assert_eq!(summary_counts(&doc, range, today())[&kind], view.count);
            }
        }
    }

    #[test]
    fn test_range_boundaries() {
        assert!(TimeRange::Week.contains(Some(days_ago(6)), today()));
        assert!(!TimeRange::Week.contains(Some(days_ago(7)), today()));
        assert!(TimeRange::Month.contains(Some(days_ago(29)), today()));
        assert!(!TimeRange::Month.contains(Some(days_ago(30)), today()));
        assert!(!TimeRange::Today.contains(Some(days_ago(-1)), today()));
        assert!(!TimeRange::Today.contains(None, today()));
        assert!(TimeRange::All.contains(None, today()));
    }

    #[test]
    fn test_sub_field_filter() {
        let doc = sample();
        assert_eq!(sub_fields(&doc, EntityKind::AbsenceLogs), vec!["7", "8"]);
        assert_eq!(sub_fields(&doc, EntityKind::DailyReports), vec!["Math", "Science"]);

        let query = DashboardQuery {
            category: EntityKind::Violations,
            sub_field: Some("behavior".into()),
            ..Default::default()
        };
        let expected = doc.violations.iter().filter(|v| v.category == "behavior").count();
        assert_eq!(aggregate(&doc, &query, 0, today()).count, expected);
    }

    #[test]
    fn test_paging_and_offset_reset() {
        let doc = sample();
        let query = DashboardQuery {
            category: EntityKind::AbsenceLogs,
            page_size: 4,
            ..Default::default()
        };
        let view = aggregate(&doc, &query, 8, today());
        assert_eq!(view.count, 9);
        assert_eq!(view.offset, 8);
        assert_eq!(view.visible.len(), 1);

        let view = aggregate(&doc, &query, 9, today());
        assert_eq!(view.offset, 0);
        assert_eq!(view.visible.len(), 4);
        assert_eq!(view.visible[0].id, "a0");
    }

    #[test]
    fn test_rotation_wraps() {
        let mut rotation = Rotation::new(3);
        assert_eq!(rotation.advance(7), 3);
        assert_eq!(rotation.advance(7), 6);
        assert_eq!(rotation.advance(7), 0);
        assert_eq!(rotation.advance(3), 0);
        assert_eq!(rotation.advance(0), 0);
    }
}
