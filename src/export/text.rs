//! Text export: chat-formatted messages, share links and plain text files.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::labels::{Language, column_label, kind_label};
use crate::models::{Document, Entity, EntityKind, KindVisitor, Tabular, TeacherFollowUp, dispatch};

const SHARE_URL: &str = "https://wa.me/?text=";

/// A record rendered as a headline plus labelled, non-empty fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRecord {
    pub title: String,
    pub fields: Vec<(String, String)>,
}

fn labelled_fields<T: Tabular>(record: &T, skip: &str, lang: Language) -> Vec<(String, String)> {
    T::COLUMNS
        .iter()
        .zip(record.cells())
        .filter(|(key, value)| **key != skip && !value.trim().is_empty())
        .map(|(key, value)| (column_label(lang, key), value))
        .collect()
}

fn follow_up_record(date: &str, follow_up: &TeacherFollowUp, lang: Language) -> TextRecord {
    let mut fields = vec![(column_label(lang, "date"), date.to_string())];
    fields.extend(labelled_fields(follow_up, "teacherName", lang));
    fields.push((
        column_label(lang, "total"),
        format!(
            "{}/{} ({}%)",
            follow_up.total(),
            TeacherFollowUp::max_total(),
            follow_up.percentage()
        ),
    ));
    TextRecord {
        title: follow_up.teacher_name.clone(),
        fields,
    }
}

/// Text records for the array `kind`. Daily reports yield one record per
/// teacher follow-up.
pub fn text_records_for(doc: &Document, kind: EntityKind, lang: Language) -> Vec<TextRecord> {
    struct Render<'a> {
        doc: &'a Document,
        lang: Language,
    }

    impl KindVisitor for Render<'_> {
        type Output = Vec<TextRecord>;

        fn visit<T: Entity>(self) -> Vec<TextRecord> {
            T::records(self.doc)
                .iter()
                .map(|record| TextRecord {
                    title: record.cell(T::TITLE_COLUMN),
                    fields: labelled_fields(record, T::TITLE_COLUMN, self.lang),
                })
                .collect()
        }
    }

    if kind == EntityKind::DailyReports {
        return doc
            .daily_reports
            .iter()
            .flat_map(|report| {
                let date = report.date.to_string();
                report
                    .teachers_data
                    .iter()
                    .map(move |f| follow_up_record(&date, f, lang))
            })
            .collect();
    }
    dispatch(kind, Render { doc, lang })
}

/// Chat message with `*bold*` labels. At most `max_rows` records are listed;
/// the rest are summarised in a footer line.
pub fn chat_message(heading: &str, records: &[TextRecord], max_rows: usize) -> String {
    let mut out = format!("*{heading}*\n");
    for (idx, record) in records.iter().take(max_rows).enumerate() {
        out.push_str(&format!("\n{}. *{}*\n", idx + 1, record.title));
        for (label, value) in &record.fields {
            out.push_str(&format!("*{label}:* {value}\n"));
        }
    }
    if records.len() > max_rows {
        out.push_str(&format!("\n... and {} more\n", records.len() - max_rows));
    }
    out
}

/// Unbounded plain-text rendering.
pub fn plain_text(heading: &str, records: &[TextRecord]) -> String {
    let mut out = format!("{heading}\n{}\n", "=".repeat(heading.chars().count()));
    for (idx, record) in records.iter().enumerate() {
        out.push_str(&format!("\n{}. {}\n", idx + 1, record.title));
        for (label, value) in &record.fields {
            out.push_str(&format!("   {label}: {value}\n"));
        }
    }
    out
}

/// Deep link that opens a chat composer pre-filled with `message`.
pub fn chat_share_link(message: &str) -> String {
    format!("{SHARE_URL}{}", urlencoding::encode(message))
}

/// Plain text of every array in `doc` that has records, one section each.
pub fn document_text(doc: &Document, lang: Language) -> String {
    let mut out = String::new();
    if !doc.profile.school_name.is_empty() {
        out.push_str(&doc.profile.header_line());
        out.push_str("\n\n");
    }
    for kind in EntityKind::ALL.into_iter().filter(|k| doc.count(*k) > 0) {
        out.push_str(&plain_text(kind_label(lang, kind), &text_records_for(doc, kind, lang)));
        out.push('\n');
    }
    out
}

pub fn write_text(text: &str, path: &Path) -> Result<()> {
    fs::write(path, text)?;
    info!("Exported text to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AbsenceLog, DailyReportContainer};

    fn logs(n: usize) -> Document {
        let mut doc = Document::default();
        doc.absence_logs = (0..n)
            .map(|i| AbsenceLog {
                id: format!("a{i}"),
                student_name: format!("Student {i}"),
                reason: "Sick".into(),
                ..Default::default()
            })
            .collect();
        doc
    }

    #[test]
    fn test_records_use_title_and_skip_empty_fields() {
        let records = text_records_for(&logs(1), EntityKind::AbsenceLogs, Language::En);
        assert_eq!(records[0].title, "Student 0");
        assert!(records[0].fields.contains(&("Reason".to_string(), "Sick".to_string())));
        assert!(records[0].fields.iter().all(|(_, v)| !v.is_empty()));
        assert!(records[0].fields.iter().all(|(l, _)| l != "Student"));
    }

    #[test]
    fn test_chat_message_truncates_with_footer() {
        let records = text_records_for(&logs(5), EntityKind::AbsenceLogs, Language::En);
        let msg = chat_message("Absence", &records, 3);
        assert!(msg.starts_with("*Absence*\n"));
        assert!(msg.contains("3. *Student 2*"));
        assert!(!msg.contains("Student 3"));
        assert!(msg.trim_end().ends_with("... and 2 more"));

        let msg = chat_message("Absence", &records, 5);
        assert!(!msg.contains("more"));
    }

    #[test]
    fn test_plain_text_is_unbounded() {
        let records = text_records_for(&logs(40), EntityKind::AbsenceLogs, Language::En);
        let text = plain_text("Absence", &records);
        assert!(text.contains("40. Student 39"));
    }

    #[test]
    fn test_share_link_is_url_encoded() {
        let link = chat_share_link("*Hi* there & more");
        assert_eq!(link, "https://wa.me/?text=%2AHi%2A%20there%20%26%20more");
    }

    #[test]
    fn test_follow_ups_render_with_total() {
        let mut doc = Document::default();
        doc.daily_reports.push(DailyReportContainer {
            teachers_data: vec![TeacherFollowUp {
                teacher_name: "Sara".into(),
                attendance: 4,
                ..Default::default()
            }],
            ..Default::default()
        });
        let records = text_records_for(&doc, EntityKind::DailyReports, Language::En);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Sara");
        assert!(records[0].fields.contains(&("Total".to_string(), "4/28 (14.3%)".to_string())));
    }

    #[test]
    fn test_document_text_skips_empty_arrays() {
        let text = document_text(&logs(2), Language::En);
        assert!(text.contains("Absence"));
        assert!(!text.contains("Violations"));
    }
}
