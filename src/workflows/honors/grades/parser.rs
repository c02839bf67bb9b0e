use crate::workflows::honors::domain::{
    GradeRecord, LevelKey, PeriodId, SchoolYear, Semester, StudentId, SubjectId,
};
use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug, thiserror::Error)]
pub enum GradeImportError {
    #[error("failed to read grade export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid grade CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unknown academic level '{value}'")]
    UnknownLevel { row: usize, value: String },
    #[error("row {row}: unknown semester '{value}'")]
    UnknownSemester { row: usize, value: String },
}

pub(super) fn parse_records<R: Read>(reader: R) -> Result<Vec<GradeRecord>, GradeImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (idx, row) in csv_reader.deserialize::<GradeRow>().enumerate() {
        // Header is line 1.
        records.push(row?.into_record(idx + 2)?);
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct GradeRow {
    student_id: String,
    subject_id: String,
    level: String,
    period_id: String,
    school_year: String,
    grade: f64,
    year_of_study: u8,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    semester: Option<String>,
}

impl GradeRow {
    fn into_record(self, row: usize) -> Result<GradeRecord, GradeImportError> {
        let level = LevelKey::parse(&self.level).ok_or_else(|| GradeImportError::UnknownLevel {
            row,
            value: self.level.clone(),
        })?;

        let semester = match self.semester.as_deref() {
            Some(value) => Some(Semester::parse(value).ok_or_else(|| {
                GradeImportError::UnknownSemester {
                    row,
                    value: value.to_string(),
                }
            })?),
            None => None,
        };

        Ok(GradeRecord {
            student_id: StudentId(self.student_id),
            subject_id: SubjectId(self.subject_id),
            level,
            period_id: PeriodId(self.period_id),
            school_year: SchoolYear(self.school_year),
            grade: self.grade,
            year_of_study: self.year_of_study,
            semester,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
