//! Document commands: each takes the current document and returns the next one.
//!
//! Callers persist the returned document as a whole; nothing here touches
//! storage.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::{AppError, Result};
use crate::ids::new_id;
use crate::models::{
    DailyReportContainer, Document, Entity, EntityKind, KindVisitor, SchoolProfile, StudentReport, Tabular,
    TeacherFollowUp, dispatch,
};

/// Append `record` under a fresh id. Returns the next document and the id.
pub fn add<T: Entity>(doc: &Document, mut record: T) -> (Document, String) {
    let id = new_id();
    record.set_id(id.clone());
    let mut next = doc.clone();
    T::records_mut(&mut next).push(record);
    (next, id)
}

/// Replace the record with the same id, keeping its position.
pub fn update<T: Entity>(doc: &Document, record: T) -> Result<Document> {
    let mut next = doc.clone();
    let slot = T::records_mut(&mut next)
        .iter_mut()
        .find(|r| r.id() == record.id())
        .ok_or_else(|| AppError::not_found(format!("{} record {}", T::KIND, record.id())))?;
    *slot = record;
    Ok(next)
}

/// Remove exactly the record with `id`.
pub fn delete<T: Entity>(doc: &Document, id: &str) -> Result<Document> {
    let mut next = doc.clone();
    let records = T::records_mut(&mut next);
    let before = records.len();
    records.retain(|r| r.id() != id);
    if records.len() == before {
        return Err(AppError::not_found(format!("{} record {id}", T::KIND)));
    }
    Ok(next)
}

/// [`delete`] for a kind known only at runtime.
pub fn delete_by_kind(doc: &Document, kind: EntityKind, id: &str) -> Result<Document> {
    struct Delete<'a> {
        doc: &'a Document,
        id: &'a str,
    }

    impl KindVisitor for Delete<'_> {
        type Output = Result<Document>;

        fn visit<T: Entity>(self) -> Self::Output {
            delete::<T>(self.doc, self.id)
        }
    }

    dispatch(kind, Delete { doc, id })
}

/// Point a student log at the student report whose name it carries.
///
/// `studentId` is taken from the matching report, preferring one in the
/// log's grade, and empty `grade`/`section` values are filled from it. A name
/// with no report clears the id. Other record kinds are returned unchanged.
pub fn link_student<T: Entity>(doc: &Document, record: T) -> Result<T> {
    if !EntityKind::STUDENT_LOGS.contains(&T::KIND) {
        return Ok(record);
    }
    let name = record.cell("studentName");
    let grade = record.cell("grade");
    let candidates: Vec<&StudentReport> = doc
        .student_reports
        .iter()
        .filter(|s| !name.trim().is_empty() && s.name.trim() == name.trim())
        .collect();
    let report = candidates
        .iter()
        .find(|s| s.grade == grade)
        .or_else(|| candidates.first());

    let Some(report) = report else {
        return record.with_field("studentId", "");
    };
    let mut linked = record.with_field("studentId", &report.id)?;
    for key in ["grade", "section"] {
        if linked.cell(key).trim().is_empty() {
            linked = linked.with_field(key, &report.cell(key))?;
        }
    }
    Ok(linked)
}

pub fn set_profile(doc: &Document, profile: SchoolProfile) -> Document {
    Document {
        profile,
        ..doc.clone()
    }
}

/// Find the daily report for `date`, creating an empty one if none exists.
pub fn ensure_daily_report(doc: &Document, date: NaiveDate) -> (Document, String) {
    if let Some(existing) = doc.daily_reports.iter().find(|r| r.date == date) {
        return (doc.clone(), existing.id.clone());
    }
    add(
        doc,
        DailyReportContainer {
            day_name: day_name(date.weekday()).to_string(),
            date,
            ..Default::default()
        },
    )
}

fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn report_mut<'a>(doc: &'a mut Document, report_id: &str) -> Result<&'a mut DailyReportContainer> {
    doc.daily_reports
        .iter_mut()
        .find(|r| r.id == report_id)
        .ok_or_else(|| AppError::not_found(format!("daily report {report_id}")))
}

/// Append a follow-up to a daily report under a fresh id.
pub fn add_follow_up(doc: &Document, report_id: &str, mut follow_up: TeacherFollowUp) -> Result<(Document, String)> {
    let out_of_range = follow_up.out_of_range();
    if !out_of_range.is_empty() {
        return Err(AppError::validation(format!("scores out of range: {}", out_of_range.join(", "))));
    }
    let mut next = doc.clone();
    let id = new_id();
    follow_up.id = id.clone();
    report_mut(&mut next, report_id)?.teachers_data.push(follow_up);
    Ok((next, id))
}

/// Append a follow-up to the daily report for `date`, creating the report
/// with it when the day has none yet.
pub fn add_follow_up_on(doc: &Document, date: NaiveDate, follow_up: TeacherFollowUp) -> Result<(Document, String)> {
    let (with_day, report_id) = ensure_daily_report(doc, date);
    add_follow_up(&with_day, &report_id, follow_up)
}

pub fn update_follow_up(doc: &Document, report_id: &str, follow_up: TeacherFollowUp) -> Result<Document> {
    let out_of_range = follow_up.out_of_range();
    if !out_of_range.is_empty() {
        return Err(AppError::validation(format!("scores out of range: {}", out_of_range.join(", "))));
    }
    let mut next = doc.clone();
    let slot = report_mut(&mut next, report_id)?
        .teachers_data
        .iter_mut()
        .find(|t| t.id == follow_up.id)
        .ok_or_else(|| AppError::not_found(format!("follow-up {}", follow_up.id)))?;
    *slot = follow_up;
    Ok(next)
}

pub fn delete_follow_up(doc: &Document, report_id: &str, follow_up_id: &str) -> Result<Document> {
    let mut next = doc.clone();
    let teachers = &mut report_mut(&mut next, report_id)?.teachers_data;
    let before = teachers.len();
    teachers.retain(|t| t.id != follow_up_id);
    if teachers.len() == before {
        return Err(AppError::not_found(format!("follow-up {follow_up_id}")));
    }
    Ok(next)
}

/// Add a custom violation type to `category`. Adding an existing type is a no-op.
pub fn add_custom_violation(doc: &Document, category: &str, name: &str) -> Result<Document> {
    let (category, name) = (category.trim(), name.trim());
    if category.is_empty() || name.is_empty() {
        return Err(AppError::validation("category and violation name are required"));
    }
    let mut next = doc.clone();
    let types = next.custom_violations.entry(category.to_string()).or_default();
    if !types.iter().any(|t| t == name) {
        types.push(name.to_string());
    }
    Ok(next)
}

pub fn remove_custom_violation(doc: &Document, category: &str, name: &str) -> Document {
    let mut next = doc.clone();
    if let Some(types) = next.custom_violations.get_mut(category) {
        types.retain(|t| t != name);
        if types.is_empty() {
            next.custom_violations.remove(category);
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AbsenceLog, Tabular, Violation};

    /// Seed `n` blank records of `kind`, returning their ids in order.
    fn seed(doc: &Document, kind: EntityKind, n: usize) -> (Document, Vec<String>) {
        struct Seed<'a> {
            doc: &'a Document,
            n: usize,
        }

        impl KindVisitor for Seed<'_> {
            type Output = (Document, Vec<String>);

            fn visit<T: Entity>(self) -> Self::Output {
                let mut doc = self.doc.clone();
                let mut ids = Vec::new();
                for _ in 0..self.n {
                    let (next, id) = add(&doc, T::default());
                    doc = next;
                    ids.push(id);
                }
                (doc, ids)
            }
        }

        dispatch(kind, Seed { doc, n })
    }

    fn ids_of(doc: &Document, kind: EntityKind) -> Vec<String> {
        struct Ids<'a>(&'a Document);

        impl KindVisitor for Ids<'_> {
            type Output = Vec<String>;

            fn visit<T: Entity>(self) -> Self::Output {
                T::records(self.0).iter().map(|r| r.id().to_string()).collect()
            }
        }

        dispatch(kind, Ids(doc))
    }

    #[test]
    fn test_delete_removes_exactly_one_for_every_kind() {
        let mut doc = Document::default();
        let mut all_ids = Vec::new();
        for kind in EntityKind::ALL {
            let (next, ids) = seed(&doc, kind, 3);
            doc = next;
            all_ids.push((kind, ids));
        }

        for (kind, ids) in &all_ids {
            let next = delete_by_kind(&doc, *kind, &ids[1]).unwrap();
            assert_eq!(ids_of(&next, *kind), vec![ids[0].clone(), ids[2].clone()]);
            for other in EntityKind::ALL.into_iter().filter(|k| k != kind) {
                assert_eq!(ids_of(&next, other), ids_of(&doc, other), "{other} changed");
            }
        }
    }

    #[test]
    fn test_delete_missing_id_is_not_found() {
        let doc = Document::default();
        assert!(matches!(
            delete::<Violation>(&doc, "nope"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_keeps_position() {
        let (doc, a) = add(&Document::default(), AbsenceLog::default());
        let (doc, _b) = add(&doc, AbsenceLog::default());
        let mut edited = doc.absence_logs[0].clone().with_field("reason", "Sick").unwrap();
        edited.id = a.clone();
        let doc = update(&doc, edited).unwrap();
        assert_eq!(doc.absence_logs[0].id, a);
        assert_eq!(doc.absence_logs[0].reason, "Sick");
        assert_eq!(doc.absence_logs.len(), 2);
    }

    #[test]
    fn test_follow_up_lifecycle() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 12).unwrap();
        let (doc, report_id) = ensure_daily_report(&Document::default(), date);
        assert_eq!(doc.daily_reports[0].day_name, "Sunday");

        let (same, same_id) = ensure_daily_report(&doc, date);
        assert_eq!(same_id, report_id);
        assert_eq!(same.daily_reports.len(), 1);

        let follow_up = TeacherFollowUp {
            teacher_name: "Sara".into(),
            attendance: 4,
            ..Default::default()
        };
        let (doc, fid) = add_follow_up(&doc, &report_id, follow_up).unwrap();
        let mut edited = doc.daily_reports[0].teachers_data[0].clone();
        edited.notes = "Good".into();
        let doc = update_follow_up(&doc, &report_id, edited).unwrap();
        assert_eq!(doc.daily_reports[0].teachers_data[0].notes, "Good");

        let doc = delete_follow_up(&doc, &report_id, &fid).unwrap();
        assert!(doc.daily_reports[0].teachers_data.is_empty());
    }

    #[test]
    fn test_link_student_sets_id_and_fills_class() {
        let (doc, omar_id) = add(
            &Document::default(),
            StudentReport {
                name: "Omar".into(),
                grade: "5".into(),
                section: "B".into(),
                ..Default::default()
            },
        );
        let log = AbsenceLog {
            student_name: " Omar ".into(),
            ..Default::default()
        };

        let linked = link_student(&doc, log).unwrap();
        assert_eq!(linked.student_id, omar_id);
        assert_eq!(linked.grade, "5");
        assert_eq!(linked.section, "B");

        let renamed = AbsenceLog {
            student_name: "Someone else".into(),
            ..linked
        };
        let unlinked = link_student(&doc, renamed).unwrap();
        assert!(unlinked.student_id.is_empty());
        assert_eq!(unlinked.grade, "5");
    }

    #[test]
    fn test_link_student_prefers_same_grade() {
        let (doc, _) = add(
            &Document::default(),
            StudentReport {
                name: "Sara".into(),
                grade: "3".into(),
                ..Default::default()
            },
        );
        let (doc, grade_six) = add(
            &doc,
            StudentReport {
                name: "Sara".into(),
                grade: "6".into(),
                ..Default::default()
            },
        );
        let log = AbsenceLog {
            student_name: "Sara".into(),
            grade: "6".into(),
            ..Default::default()
        };
        assert_eq!(link_student(&doc, log).unwrap().student_id, grade_six);
    }

    #[test]
    fn test_link_student_ignores_other_kinds() {
        let (doc, _) = add(
            &Document::default(),
            StudentReport {
                name: "Omar".into(),
                ..Default::default()
            },
        );
        let violation = Violation {
            name: "Omar".into(),
            ..Default::default()
        };
        assert_eq!(link_student(&doc, violation.clone()).unwrap(), violation);
    }

    #[test]
    fn test_follow_up_on_date_creates_day_with_first_entry() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let follow_up = TeacherFollowUp {
            teacher_name: "Mona".into(),
            ..Default::default()
        };

        let (doc, first) = add_follow_up_on(&Document::default(), date, follow_up.clone()).unwrap();
        assert_eq!(doc.daily_reports.len(), 1);
        assert_eq!(doc.daily_reports[0].teachers_data[0].id, first);

        let (doc, second) = add_follow_up_on(&doc, date, follow_up).unwrap();
        assert_eq!(doc.daily_reports.len(), 1);
        assert_eq!(doc.daily_reports[0].teachers_data.len(), 2);
        assert_ne!(first, second);
    }

    #[test]
    fn test_rejected_follow_up_leaves_no_empty_day() {
        let doc = Document::default();
        let follow_up = TeacherFollowUp {
            attendance: 9,
            ..Default::default()
        };
        assert!(add_follow_up_on(&doc, NaiveDate::default(), follow_up).is_err());
        assert!(doc.daily_reports.is_empty());
    }

    #[test]
    fn test_follow_up_score_validation() {
        let (doc, report_id) = ensure_daily_report(&Document::default(), NaiveDate::default());
        let bad = TeacherFollowUp {
            assessment: 7,
            ..Default::default()
        };
        assert!(matches!(add_follow_up(&doc, &report_id, bad), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_custom_violations_are_a_set() {
        let doc = add_custom_violation(&Document::default(), "devices", "Smart watch").unwrap();
        let doc = add_custom_violation(&doc, "devices", " Smart watch ").unwrap();
        assert_eq!(doc.custom_violations["devices"], vec!["Smart watch"]);

        let doc = remove_custom_violation(&doc, "devices", "Smart watch");
        assert!(!doc.custom_violations.contains_key("devices"));
        assert!(add_custom_violation(&doc, "", "x").is_err());
    }
}
