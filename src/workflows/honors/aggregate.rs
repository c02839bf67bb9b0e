//! GPA aggregation over an evaluation scope.
//!
//! The aggregate is an unweighted mean: subjects carry no unit weighting in
//! the grade records, so every grade in scope counts once.

use super::domain::{EvaluationScope, GradeRecord, GradeSlot, SchoolYear, StudentId, SubjectId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const GRADE_SCALE_MIN: f64 = 0.0;
pub const GRADE_SCALE_MAX: f64 = 100.0;

/// Aggregates for one student over one scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeAggregate {
    pub gpa: f64,
    pub min_grade: f64,
    pub grade_count: usize,
    /// Highest year of study present in scope.
    pub year_of_study: u8,
    /// Most recent school year present in scope.
    pub latest_school_year: SchoolYear,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AggregateError {
    #[error("no grade records for student {student_id} in {scope}")]
    InsufficientData { student_id: StudentId, scope: String },
    #[error("grade {grade} for subject {subject_id} is outside the 0-100 scale")]
    GradeOutOfScale { subject_id: SubjectId, grade: f64 },
}

/// Computes GPA and minimum grade over the records that fall inside `scope`.
///
/// Records outside the scope are ignored. Rows sharing a grade slot collapse
/// to the last one seen.
pub fn compute_gpa<'a, I>(records: I, scope: &EvaluationScope) -> Result<GradeAggregate, AggregateError>
where
    I: IntoIterator<Item = &'a GradeRecord>,
{
    let mut in_scope: BTreeMap<GradeSlot, &GradeRecord> = BTreeMap::new();
    for record in records.into_iter().filter(|record| scope.contains(record)) {
        in_scope.insert(record.slot(), record);
    }

    let insufficient = || AggregateError::InsufficientData {
        student_id: scope.student_id.clone(),
        scope: scope.span.to_string(),
    };

    let mut sum = 0.0;
    let mut min_grade = f64::INFINITY;
    let mut year_of_study = 0u8;
    let mut latest_school_year: Option<&SchoolYear> = None;

    for record in in_scope.values() {
        if !record.grade.is_finite()
            || record.grade < GRADE_SCALE_MIN
            || record.grade > GRADE_SCALE_MAX
        {
            return Err(AggregateError::GradeOutOfScale {
                subject_id: record.subject_id.clone(),
                grade: record.grade,
            });
        }

        sum += record.grade;
        min_grade = min_grade.min(record.grade);
        year_of_study = year_of_study.max(record.year_of_study);
        if latest_school_year.map_or(true, |latest| record.school_year > *latest) {
            latest_school_year = Some(&record.school_year);
        }
    }

    let latest_school_year = latest_school_year.cloned().ok_or_else(insufficient)?;
    let grade_count = in_scope.len();

    Ok(GradeAggregate {
        gpa: sum / grade_count as f64,
        min_grade,
        grade_count,
        year_of_study,
        latest_school_year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::honors::domain::{LevelKey, PeriodId, Semester};

    fn grade(subject: &str, period: &str, value: f64, year: &str, year_of_study: u8) -> GradeRecord {
        GradeRecord {
            student_id: StudentId("stu-1".to_string()),
            subject_id: SubjectId(subject.to_string()),
            level: LevelKey::SeniorHighschool,
            period_id: PeriodId(period.to_string()),
            school_year: SchoolYear(year.to_string()),
            grade: value,
            year_of_study,
            semester: Some(Semester::First),
        }
    }

    fn year_scope(year: &str) -> EvaluationScope {
        EvaluationScope::full_year(
            StudentId("stu-1".to_string()),
            LevelKey::SeniorHighschool,
            SchoolYear(year.to_string()),
        )
    }

    #[test]
    fn averages_grades_without_weighting() {
        let records = vec![
            grade("math", "q1", 96.0, "2024-2025", 11),
            grade("science", "q1", 95.0, "2024-2025", 11),
            grade("english", "q1", 97.0, "2024-2025", 11),
            grade("filipino", "q1", 93.0, "2024-2025", 11),
            grade("history", "q1", 91.0, "2024-2025", 11),
        ];

        let aggregate = compute_gpa(&records, &year_scope("2024-2025")).expect("aggregate");
        assert!((aggregate.gpa - 94.4).abs() < 1e-9);
        assert_eq!(aggregate.min_grade, 91.0);
        assert_eq!(aggregate.grade_count, 5);
        assert_eq!(aggregate.year_of_study, 11);
    }

    #[test]
    fn empty_scope_is_insufficient_data_not_zero() {
        let records = vec![grade("math", "q1", 96.0, "2023-2024", 10)];
        let error = compute_gpa(&records, &year_scope("2024-2025")).expect_err("no data");
        assert!(matches!(error, AggregateError::InsufficientData { .. }));
        assert!(error.to_string().contains("school year 2024-2025"));
    }

    #[test]
    fn later_write_for_same_slot_overwrites() {
        let records = vec![
            grade("math", "q1", 70.0, "2024-2025", 11),
            grade("math", "q1", 92.0, "2024-2025", 11),
            grade("math", "q2", 94.0, "2024-2025", 11),
        ];
        let aggregate = compute_gpa(&records, &year_scope("2024-2025")).expect("aggregate");
        assert_eq!(aggregate.grade_count, 2);
        assert_eq!(aggregate.min_grade, 92.0);
        assert!((aggregate.gpa - 93.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_grades_off_scale() {
        let records = vec![
            grade("math", "q1", 101.0, "2024-2025", 11),
            grade("science", "q1", 90.0, "2024-2025", 11),
        ];
        let error = compute_gpa(&records, &year_scope("2024-2025")).expect_err("off scale");
        assert_eq!(
            error,
            AggregateError::GradeOutOfScale {
                subject_id: SubjectId("math".to_string()),
                grade: 101.0,
            }
        );
    }

    #[test]
    fn ignores_other_students() {
        let mut other = grade("math", "q1", 60.0, "2024-2025", 11);
        other.student_id = StudentId("stu-2".to_string());
        let records = vec![other, grade("math", "q1", 99.0, "2024-2025", 11)];
        let aggregate = compute_gpa(&records, &year_scope("2024-2025")).expect("aggregate");
        assert_eq!(aggregate.grade_count, 1);
        assert_eq!(aggregate.min_grade, 99.0);
    }

    #[test]
    fn single_period_scope_filters_by_period_within_the_year() {
        let records = vec![
            grade("math", "q2", 94.0, "2024-2025", 11),
            grade("science", "q2", 90.0, "2024-2025", 11),
            grade("math", "q1", 75.0, "2024-2025", 11),
            grade("math", "q2", 60.0, "2023-2024", 10),
        ];
        let scope = EvaluationScope::single_period(
            StudentId("stu-1".to_string()),
            LevelKey::SeniorHighschool,
            SchoolYear("2024-2025".to_string()),
            PeriodId("q2".to_string()),
        );

        let aggregate = compute_gpa(&records, &scope).expect("aggregate");
        assert_eq!(aggregate.grade_count, 2);
        assert_eq!(aggregate.min_grade, 90.0);
        assert_eq!(aggregate.gpa, 92.0);
        assert_eq!(aggregate.year_of_study, 11);
    }
}
