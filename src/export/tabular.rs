//! Tabular export: records to labelled rows, rows to a one-sheet Excel workbook.

use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};
use serde_json::Value;
use tracing::info;

use crate::error::Result;
use crate::labels::{Language, column_label, kind_label};
use crate::models::{
    DailyReportContainer, Document, Entity, EntityKind, KindVisitor, Tabular, TeacherFollowUp, display_value,
    dispatch,
};

/// One cell of an exported table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(n)) => n.as_f64().map(Cell::Number).unwrap_or_else(|| Cell::Text(n.to_string())),
            Some(v) => Cell::Text(display_value(v)),
            None => Cell::Text(String::new()),
        }
    }

    pub fn text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

/// Labelled rows ready for a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

fn row_of(value: &Value, columns: &[&str]) -> Vec<Cell> {
    columns.iter().map(|key| Cell::from_value(value.get(*key))).collect()
}

/// Build a table from any tabular records, labelling columns in `lang`.
pub fn table_from<T: Tabular>(title: &str, records: &[T], lang: Language) -> Result<Table> {
    let rows = records
        .iter()
        .map(|r| Ok(row_of(&serde_json::to_value(r)?, T::COLUMNS)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Table {
        title: title.to_string(),
        headers: T::COLUMNS.iter().map(|key| column_label(lang, key)).collect(),
        rows,
    })
}

/// Daily reports flattened to one row per teacher follow-up, with the
/// container's date and day name in front and the computed total after.
pub fn follow_up_table(reports: &[DailyReportContainer], lang: Language) -> Result<Table> {
    let mut headers = vec![column_label(lang, "date"), column_label(lang, "dayName")];
    headers.extend(TeacherFollowUp::COLUMNS.iter().map(|key| column_label(lang, key)));
    headers.push(column_label(lang, "total"));
    headers.push(column_label(lang, "percentage"));

    let mut rows = Vec::new();
    for report in reports {
        for follow_up in &report.teachers_data {
            let mut row = vec![
                Cell::Text(report.date.to_string()),
                Cell::Text(report.day_name.clone()),
            ];
            row.extend(row_of(&serde_json::to_value(follow_up)?, TeacherFollowUp::COLUMNS));
            row.push(Cell::Number(f64::from(follow_up.total())));
            row.push(Cell::Number(follow_up.percentage()));
            rows.push(row);
        }
    }

    Ok(Table {
        title: kind_label(lang, EntityKind::DailyReports).to_string(),
        headers,
        rows,
    })
}

/// Table of the records of `kind` in `doc`.
pub fn table_for(doc: &Document, kind: EntityKind, lang: Language) -> Result<Table> {
    struct BuildTable<'a> {
        doc: &'a Document,
        lang: Language,
    }

    impl KindVisitor for BuildTable<'_> {
        type Output = Result<Table>;

        fn visit<T: Entity>(self) -> Result<Table> {
            table_from(kind_label(self.lang, T::KIND), T::records(self.doc), self.lang)
        }
    }

    if kind == EntityKind::DailyReports {
        return follow_up_table(&doc.daily_reports, lang);
    }
    dispatch(kind, BuildTable { doc, lang })
}

/// Excel limits sheet names to 31 characters and forbids a few symbols.
fn sheet_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(31)
        .collect();
    if cleaned.trim().is_empty() { "Sheet1".to_string() } else { cleaned }
}

fn column_widths(table: &Table) -> Vec<f64> {
    (0..table.headers.len())
        .map(|col| {
            let longest = table
                .rows
                .iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.text().chars().count())
                .chain(std::iter::once(table.headers[col].chars().count()))
                .max()
                .unwrap_or(0);
            (longest + 2).clamp(8, 50) as f64
        })
        .collect()
}

/// Write `table` to a one-sheet workbook at `path`.
pub fn write_xlsx(table: &Table, path: &Path, lang: Language) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.set_name(sheet_name(&table.title))?;
    if lang == Language::Ar {
        worksheet.set_right_to_left(true);
    }

    // Header format
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin);

    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }

    for (col, width) in column_widths(table).into_iter().enumerate() {
        worksheet.set_column_width(col as u16, width)?;
    }

    // Data rows
    for (idx, record) in table.rows.iter().enumerate() {
        let row = (idx + 1) as u32;
        for (col, cell) in record.iter().enumerate() {
            match cell {
                Cell::Text(text) => worksheet.write_string(row, col as u16, text)?,
                Cell::Number(n) => worksheet.write_number(row, col as u16, *n)?,
            };
        }
    }

    // Autofilter
    if !table.rows.is_empty() && !table.headers.is_empty() {
        let last_row = table.rows.len() as u32;
        worksheet.autofilter(0, 0, last_row, (table.headers.len() - 1) as u16)?;
    }

    // Freeze top row
    worksheet.set_freeze_panes(1, 0)?;

    workbook.save(path)?;
    info!("Exported {} rows to {}", table.rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DamageLog, StudentReport};

    fn report() -> DailyReportContainer {
        DailyReportContainer {
            id: "d1".into(),
            day_name: "Sunday".into(),
            date: chrono::NaiveDate::from_ymd_opt(2025, 9, 14).unwrap(),
            teachers_data: vec![
                TeacherFollowUp {
                    teacher_name: "Sara".into(),
                    attendance: 4,
                    appearance: 4,
                    ..Default::default()
                },
                TeacherFollowUp {
                    teacher_name: "Ali".into(),
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn test_table_headers_use_labels() {
        let students = vec![StudentReport {
            name: "Omar".into(),
            ..Default::default()
        }];
        let table = table_from("Students", &students, Language::En).unwrap();
        assert_eq!(table.headers.len(), StudentReport::COLUMNS.len());
        assert_eq!(table.headers[0], "Name");
        assert_eq!(table.rows[0][0], Cell::Text("Omar".into()));

        let table = table_from("Students", &students, Language::Ar).unwrap();
        assert_eq!(table.headers[0], "الاسم");
    }

    #[test]
    fn test_numbers_stay_numeric() {
        let logs = vec![DamageLog {
            estimated_cost: 12.5,
            ..Default::default()
        }];
        let table = table_from("Damage", &logs, Language::En).unwrap();
        let col = DamageLog::COLUMNS.iter().position(|c| *c == "estimatedCost").unwrap();
        assert_eq!(table.rows[0][col], Cell::Number(12.5));
    }

    #[test]
    fn test_follow_ups_are_flattened() {
        let table = follow_up_table(&[report()], Language::En).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.headers.len(), TeacherFollowUp::COLUMNS.len() + 4);
        assert_eq!(table.rows[0][0], Cell::Text("2025-09-14".into()));
        assert_eq!(table.rows[0][table.headers.len() - 2], Cell::Number(8.0));
    }

    #[test]
    fn test_table_for_every_kind() {
        let mut doc = Document::default();
        doc.daily_reports.push(report());
        for kind in EntityKind::ALL {
            let table = table_for(&doc, kind, Language::En).unwrap();
            assert!(!table.headers.is_empty(), "{kind} has no headers");
        }
    }

    #[test]
    fn test_sheet_name_is_sanitized() {
        assert_eq!(sheet_name("A/B: [C]"), "AB C");
        assert_eq!(sheet_name(&"x".repeat(40)).len(), 31);
        assert_eq!(sheet_name(""), "Sheet1");
    }

    #[test]
    fn test_write_xlsx_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("follow_up.xlsx");
        let table = follow_up_table(&[report()], Language::Ar).unwrap();
        write_xlsx(&table, &path, Language::Ar).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
