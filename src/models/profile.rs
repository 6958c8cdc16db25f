//! School profile singleton.

use serde::{Deserialize, Serialize};

use super::Tabular;

/// School-wide settings shown in report headers and exports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchoolProfile {
    pub school_name: String,
    pub supervisor_name: String,
    pub principal_name: String,
    pub academic_year: String,
    pub semester: String,
    pub branch: String,
    /// Class names, e.g. "7/A".
    pub classes: Vec<String>,
    pub teachers: Vec<String>,
}

impl Tabular for SchoolProfile {
    const COLUMNS: &'static [&'static str] = &[
        "schoolName",
        "supervisorName",
        "principalName",
        "academicYear",
        "semester",
        "branch",
        "classes",
        "teachers",
    ];
}

impl SchoolProfile {
    /// Header line used at the top of text exports.
    pub fn header_line(&self) -> String {
        match (self.school_name.trim(), self.academic_year.trim()) {
            ("", _) => String::new(),
            (school, "") => school.to_string(),
            (school, year) => format!("{school} ({year})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_line() {
        let mut profile = SchoolProfile::default();
        assert_eq!(profile.header_line(), "");
        profile.school_name = "Al Noor".into();
        assert_eq!(profile.header_line(), "Al Noor");
        profile.academic_year = "2025/2026".into();
        assert_eq!(profile.header_line(), "Al Noor (2025/2026)");
    }
}
