use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for students supplied by the grade record store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StudentId(pub String);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubjectId(pub String);

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Grading period identity (quarter, semester term, or similar) from the calendar.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeriodId(pub String);

impl fmt::Display for PeriodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// School year label such as `2024-2025`. Labels sort chronologically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SchoolYear(pub String);

impl fmt::Display for SchoolYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelKey {
    Elementary,
    JuniorHighschool,
    SeniorHighschool,
    College,
}

impl LevelKey {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Elementary,
            Self::JuniorHighschool,
            Self::SeniorHighschool,
            Self::College,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Elementary => "elementary",
            Self::JuniorHighschool => "junior_highschool",
            Self::SeniorHighschool => "senior_highschool",
            Self::College => "college",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Elementary => "Elementary",
            Self::JuniorHighschool => "Junior High School",
            Self::SeniorHighschool => "Senior High School",
            Self::College => "College",
        }
    }

    pub const fn is_college(self) -> bool {
        matches!(self, Self::College)
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ordered()
            .into_iter()
            .find(|level| level.key() == normalized)
    }
}

impl fmt::Display for LevelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Reference entry for an academic level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcademicLevel {
    pub key: LevelKey,
    pub name: &'static str,
    pub sort_order: u8,
}

impl AcademicLevel {
    pub fn standard() -> Vec<Self> {
        LevelKey::ordered()
            .into_iter()
            .zip(1u8..)
            .map(|(key, sort_order)| Self {
                key,
                name: key.label(),
                sort_order,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HonorScope {
    Basic,
    College,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HonorTypeKey {
    WithHonors,
    WithHighHonors,
    WithHighestHonors,
    CollegeHonors,
    DeansList,
    CumLaude,
    MagnaCumLaude,
    SummaCumLaude,
}

impl HonorTypeKey {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::WithHighestHonors,
            Self::WithHighHonors,
            Self::WithHonors,
            Self::DeansList,
            Self::CollegeHonors,
            Self::SummaCumLaude,
            Self::MagnaCumLaude,
            Self::CumLaude,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::WithHonors => "with_honors",
            Self::WithHighHonors => "with_high_honors",
            Self::WithHighestHonors => "with_highest_honors",
            Self::CollegeHonors => "college_honors",
            Self::DeansList => "deans_list",
            Self::CumLaude => "cum_laude",
            Self::MagnaCumLaude => "magna_cum_laude",
            Self::SummaCumLaude => "summa_cum_laude",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::WithHonors => "With Honors",
            Self::WithHighHonors => "With High Honors",
            Self::WithHighestHonors => "With Highest Honors",
            Self::CollegeHonors => "College Honors",
            Self::DeansList => "Dean's List",
            Self::CumLaude => "Cum Laude",
            Self::MagnaCumLaude => "Magna Cum Laude",
            Self::SummaCumLaude => "Summa Cum Laude",
        }
    }

    pub const fn scope(self) -> HonorScope {
        match self {
            Self::WithHonors | Self::WithHighHonors | Self::WithHighestHonors => HonorScope::Basic,
            _ => HonorScope::College,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ordered()
            .into_iter()
            .find(|honor| honor.key() == normalized)
    }
}

impl fmt::Display for HonorTypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Reference entry for an honor type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HonorType {
    pub key: HonorTypeKey,
    pub name: &'static str,
    pub scope: HonorScope,
}

impl HonorType {
    pub fn standard() -> Vec<Self> {
        HonorTypeKey::ordered()
            .into_iter()
            .map(|key| Self {
                key,
                name: key.label(),
                scope: key.scope(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Semester {
    First,
    Second,
    Summer,
}

impl Semester {
    pub const fn label(self) -> &'static str {
        match self {
            Self::First => "1st Semester",
            Self::Second => "2nd Semester",
            Self::Summer => "Summer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "1st" | "first" | "first_semester" | "1st semester" => Some(Self::First),
            "2" | "2nd" | "second" | "second_semester" | "2nd semester" => Some(Self::Second),
            "3" | "summer" | "midyear" => Some(Self::Summer),
            _ => None,
        }
    }
}

/// One finalized grade for a student, subject, and grading period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub student_id: StudentId,
    pub subject_id: SubjectId,
    pub level: LevelKey,
    pub period_id: PeriodId,
    pub school_year: SchoolYear,
    pub grade: f64,
    pub year_of_study: u8,
    pub semester: Option<Semester>,
}

/// Uniqueness key for grade records: one grade per student, subject, school year, and period.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GradeSlot {
    pub student_id: StudentId,
    pub subject_id: SubjectId,
    pub school_year: SchoolYear,
    pub period_id: PeriodId,
}

impl GradeRecord {
    pub fn slot(&self) -> GradeSlot {
        GradeSlot {
            student_id: self.student_id.clone(),
            subject_id: self.subject_id.clone(),
            school_year: self.school_year.clone(),
            period_id: self.period_id.clone(),
        }
    }
}

/// Evaluation-span descriptor carried by each criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationSpan {
    SinglePeriod,
    Semester,
    FullYear,
    #[serde(rename = "multi_year_1_to_4")]
    MultiYear1To4,
}

impl EvaluationSpan {
    pub const fn key(self) -> &'static str {
        match self {
            Self::SinglePeriod => "single_period",
            Self::Semester => "semester",
            Self::FullYear => "full_year",
            Self::MultiYear1To4 => "multi_year_1_to_4",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        [
            Self::SinglePeriod,
            Self::Semester,
            Self::FullYear,
            Self::MultiYear1To4,
        ]
        .into_iter()
        .find(|span| span.key() == normalized)
    }
}

impl fmt::Display for EvaluationSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

pub const FIRST_YEAR_OF_STUDY: u8 = 1;
pub const LAST_YEAR_OF_STUDY: u8 = 4;

/// Concrete span of grade records an evaluation aggregates over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "span", rename_all = "snake_case")]
pub enum ScopeSpan {
    SinglePeriod {
        school_year: SchoolYear,
        period_id: PeriodId,
    },
    Semester {
        school_year: SchoolYear,
        semester: Semester,
    },
    FullYear {
        school_year: SchoolYear,
    },
    MultiYear {
        first_year: u8,
        last_year: u8,
    },
}

impl ScopeSpan {
    pub fn descriptor(&self) -> EvaluationSpan {
        match self {
            ScopeSpan::SinglePeriod { .. } => EvaluationSpan::SinglePeriod,
            ScopeSpan::Semester { .. } => EvaluationSpan::Semester,
            ScopeSpan::FullYear { .. } => EvaluationSpan::FullYear,
            ScopeSpan::MultiYear { .. } => EvaluationSpan::MultiYear1To4,
        }
    }

    pub fn school_year(&self) -> Option<&SchoolYear> {
        match self {
            ScopeSpan::SinglePeriod { school_year, .. }
            | ScopeSpan::Semester { school_year, .. }
            | ScopeSpan::FullYear { school_year } => Some(school_year),
            ScopeSpan::MultiYear { .. } => None,
        }
    }

    fn contains(&self, record: &GradeRecord) -> bool {
        match self {
            ScopeSpan::SinglePeriod {
                school_year,
                period_id,
            } => record.school_year == *school_year && record.period_id == *period_id,
            ScopeSpan::Semester {
                school_year,
                semester,
            } => record.school_year == *school_year && record.semester == Some(*semester),
            ScopeSpan::FullYear { school_year } => record.school_year == *school_year,
            ScopeSpan::MultiYear {
                first_year,
                last_year,
            } => (*first_year..=*last_year).contains(&record.year_of_study),
        }
    }
}

impl fmt::Display for ScopeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeSpan::SinglePeriod {
                school_year,
                period_id,
            } => write!(f, "period {period_id} of {school_year}"),
            ScopeSpan::Semester {
                school_year,
                semester,
            } => write!(f, "{} of {school_year}", semester.label()),
            ScopeSpan::FullYear { school_year } => write!(f, "school year {school_year}"),
            ScopeSpan::MultiYear {
                first_year,
                last_year,
            } => write!(f, "years {first_year}-{last_year}"),
        }
    }
}

/// The student, level, and span an evaluation runs over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationScope {
    pub student_id: StudentId,
    pub level: LevelKey,
    pub span: ScopeSpan,
}

impl EvaluationScope {
    pub fn full_year(student_id: StudentId, level: LevelKey, school_year: SchoolYear) -> Self {
        Self {
            student_id,
            level,
            span: ScopeSpan::FullYear { school_year },
        }
    }

    pub fn single_period(
        student_id: StudentId,
        level: LevelKey,
        school_year: SchoolYear,
        period_id: PeriodId,
    ) -> Self {
        Self {
            student_id,
            level,
            span: ScopeSpan::SinglePeriod {
                school_year,
                period_id,
            },
        }
    }

    pub fn semester(student_id: StudentId, school_year: SchoolYear, semester: Semester) -> Self {
        Self {
            student_id,
            level: LevelKey::College,
            span: ScopeSpan::Semester {
                school_year,
                semester,
            },
        }
    }

    /// College years 1 through 4 merged into one span.
    pub fn college_program(student_id: StudentId) -> Self {
        Self {
            student_id,
            level: LevelKey::College,
            span: ScopeSpan::MultiYear {
                first_year: FIRST_YEAR_OF_STUDY,
                last_year: LAST_YEAR_OF_STUDY,
            },
        }
    }

    pub fn contains(&self, record: &GradeRecord) -> bool {
        record.student_id == self.student_id
            && record.level == self.level
            && self.span.contains(record)
    }
}

/// Honor standing of the immediately preceding evaluated term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorTermStatus {
    Honored(HonorTypeKey),
    NotHonored,
}
