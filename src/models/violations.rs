//! Violations and undertakings.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind, Tabular, entity_slot};

/// Built-in violation types per category. User additions live in
/// `Document::custom_violations`.
pub const BUILTIN_VIOLATIONS: &[(&str, &[&str])] = &[
    ("behavior", &["Fighting", "Disrespect", "Bullying", "Disrupting class"]),
    ("attendance", &["Repeated lateness", "Unexcused absence", "Leaving without permission"]),
    ("uniform", &["Incorrect uniform", "Missing ID badge"]),
    ("property", &["Damaging school property", "Writing on walls"]),
    ("devices", &["Mobile phone in class"]),
];

/// Who a violation was recorded against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationTarget {
    #[default]
    Student,
    Teacher,
    Staff,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Violation {
    pub id: String,
    pub target: ViolationTarget,
    pub name: String,
    pub grade: String,
    pub section: String,
    pub category: String,
    pub violation_type: String,
    pub description: String,
    pub date: NaiveDate,
    pub action_taken: String,
    /// A written undertaking was signed.
    pub undertaking_signed: bool,
    pub notes: String,
}

impl Tabular for Violation {
    const COLUMNS: &'static [&'static str] = &[
        "target",
        "name",
        "grade",
        "section",
        "category",
        "violationType",
        "description",
        "date",
        "actionTaken",
        "undertakingSigned",
        "notes",
    ];

    fn choices(key: &str) -> Option<&'static [&'static str]> {
        match key {
            "target" => Some(&["student", "teacher", "staff"]),
            "category" => Some(&["behavior", "attendance", "uniform", "property", "devices"]),
            _ => None,
        }
    }
}

impl Entity for Violation {
    const KIND: EntityKind = EntityKind::Violations;
    const TITLE_COLUMN: &'static str = "name";
    const DETAIL_COLUMN: &'static str = "violationType";
    const GROUP_COLUMN: &'static str = "category";

    entity_slot!(Violation, violations);

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

/// Built-in plus custom violation types of `category`, without duplicates.
pub fn violation_types(custom: &BTreeMap<String, Vec<String>>, category: &str) -> Vec<String> {
    let builtin = BUILTIN_VIOLATIONS
        .iter()
        .filter(|(c, _)| *c == category)
        .flat_map(|(_, types)| types.iter().map(|t| t.to_string()));
    let extra = custom.get(category).into_iter().flatten().cloned();

    let mut out: Vec<String> = Vec::new();
    for t in builtin.chain(extra) {
        if !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_types_merge_custom() {
        let mut custom = BTreeMap::new();
        custom.insert("devices".to_string(), vec!["Smart watch".to_string(), "Mobile phone in class".to_string()]);
        let types = violation_types(&custom, "devices");
        assert_eq!(types, vec!["Mobile phone in class", "Smart watch"]);
    }

    #[test]
    fn test_violation_types_custom_only_category() {
        let mut custom = BTreeMap::new();
        custom.insert("other".to_string(), vec!["Cheating".to_string()]);
        assert_eq!(violation_types(&custom, "other"), vec!["Cheating"]);
        assert!(violation_types(&custom, "missing").is_empty());
    }
}
