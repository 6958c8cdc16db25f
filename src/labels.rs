//! Static English/Arabic label dictionaries for columns and record kinds.

use serde::{Deserialize, Serialize};

use crate::models::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub fn name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ar => "العربية",
        }
    }
}

/// Label of a column key. Unknown keys are returned as-is.
pub fn column_label(lang: Language, key: &str) -> String {
    let pair = match key {
        "schoolName" => ("School", "المدرسة"),
        "supervisorName" => ("Supervisor", "المشرف"),
        "principalName" => ("Principal", "المدير"),
        "academicYear" => ("Academic Year", "العام الدراسي"),
        "semester" => ("Semester", "الفصل الدراسي"),
        "branch" => ("Branch", "الفرع"),
        "classes" => ("Classes", "الفصول"),
        "teachers" => ("Teachers", "المعلمون"),
        "day" => ("Day", "اليوم"),
        "dayName" => ("Day", "اليوم"),
        "period" => ("Period", "الحصة"),
        "className" => ("Class", "الفصل"),
        "subject" => ("Subject", "المادة"),
        "teacherName" => ("Teacher", "المعلم"),
        "date" => ("Date", "التاريخ"),
        "absentTeacher" => ("Absent Teacher", "المعلم الغائب"),
        "substituteTeacher" => ("Substitute", "المعلم البديل"),
        "signed" => ("Signed", "التوقيع"),
        "notes" => ("Notes", "ملاحظات"),
        "attendance" => ("Attendance", "الحضور"),
        "appearance" => ("Appearance", "المظهر"),
        "preparation" => ("Preparation", "التحضير"),
        "classManagement" => ("Class Management", "إدارة الصف"),
        "teachingStrategies" => ("Teaching Strategies", "استراتيجيات التدريس"),
        "studentEngagement" => ("Student Engagement", "تفاعل الطلاب"),
        "assessment" => ("Assessment", "التقويم"),
        "total" => ("Total", "المجموع"),
        "percentage" => ("Percentage", "النسبة"),
        "violations" => ("Violations", "المخالفات"),
        "name" => ("Name", "الاسم"),
        "grade" => ("Grade", "الصف"),
        "section" => ("Section", "الشعبة"),
        "gender" => ("Gender", "الجنس"),
        "healthStatus" => ("Health Status", "الحالة الصحية"),
        "guardianPhone" => ("Guardian Phone", "هاتف ولي الأمر"),
        "readingLevel" => ("Reading", "القراءة"),
        "writingLevel" => ("Writing", "الكتابة"),
        "participationLevel" => ("Participation", "المشاركة"),
        "behaviorLevel" => ("Behaviour", "السلوك"),
        "mainNotes" => ("Main Notes", "الملاحظات الرئيسية"),
        "otherNotes" => ("Other Notes", "ملاحظات أخرى"),
        "createdAt" => ("Created", "تاريخ الإنشاء"),
        "studentName" => ("Student", "الطالب"),
        "reason" => ("Reason", "السبب"),
        "excused" => ("Excused", "بعذر"),
        "arrivalTime" => ("Arrival Time", "وقت الحضور"),
        "exitTime" => ("Exit Time", "وقت الخروج"),
        "guardianName" => ("Guardian", "ولي الأمر"),
        "description" => ("Description", "الوصف"),
        "estimatedCost" => ("Estimated Cost", "التكلفة التقديرية"),
        "actionTaken" => ("Action Taken", "الإجراء المتخذ"),
        "visitorName" => ("Visitor", "الزائر"),
        "purpose" => ("Purpose", "الغرض"),
        "outcome" => ("Outcome", "النتيجة"),
        "examType" => ("Exam Type", "نوع الاختبار"),
        "status" => ("Status", "الحالة"),
        "category" => ("Category", "الفئة"),
        "title" => ("Title", "العنوان"),
        "content" => ("Content", "المحتوى"),
        "target" => ("Recorded Against", "نوع المخالف"),
        "violationType" => ("Violation", "المخالفة"),
        "undertakingSigned" => ("Undertaking Signed", "توقيع التعهد"),
        _ => return key.to_string(),
    };
    pick(lang, pair).to_string()
}

/// Display name of a record kind.
pub fn kind_label(lang: Language, kind: EntityKind) -> &'static str {
    let pair = match kind {
        EntityKind::Timetable => ("Timetable", "الجدول الدراسي"),
        EntityKind::Substitutions => ("Substitutions", "حصص الانتظار"),
        EntityKind::DailyReports => ("Teacher Follow-up", "متابعة المعلمين"),
        EntityKind::StudentReports => ("Student Reports", "تقارير الطلاب"),
        EntityKind::AbsenceLogs => ("Absence", "الغياب"),
        EntityKind::LatenessLogs => ("Lateness", "التأخر"),
        EntityKind::ExitLogs => ("Early Exit", "الخروج المبكر"),
        EntityKind::DamageLogs => ("Damage", "الإتلاف"),
        EntityKind::ParentVisitLogs => ("Parent Visits", "زيارات أولياء الأمور"),
        EntityKind::ExamLogs => ("Exam Absentees", "الغياب عن الاختبارات"),
        EntityKind::GenericSpecialReports => ("Special Reports", "تقارير خاصة"),
        EntityKind::Violations => ("Violations", "المخالفات"),
    };
    pick(lang, pair)
}

fn pick(lang: Language, (en, ar): (&'static str, &'static str)) -> &'static str {
    match lang {
        Language::En => en,
        Language::Ar => ar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_label_fallback() {
        assert_eq!(column_label(Language::En, "studentName"), "Student");
        assert_eq!(column_label(Language::Ar, "studentName"), "الطالب");
        assert_eq!(column_label(Language::En, "mystery"), "mystery");
    }

    #[test]
    fn test_every_kind_has_labels() {
        for kind in EntityKind::ALL {
            assert!(!kind_label(Language::En, kind).is_empty());
            assert!(!kind_label(Language::Ar, kind).is_empty());
        }
    }
}
