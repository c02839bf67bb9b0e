use super::{HonorCriterion, QualifyingRule};
use crate::workflows::honors::domain::{EvaluationSpan, HonorTypeKey, LevelKey};

pub(super) fn standard_criteria() -> Vec<HonorCriterion> {
    let mut criteria = Vec::new();

    for level in [
        LevelKey::Elementary,
        LevelKey::JuniorHighschool,
        LevelKey::SeniorHighschool,
    ] {
        criteria.extend(basic_education_criteria(level));
    }

    criteria.extend(college_criteria());
    criteria
}

fn basic_education_criteria(level: LevelKey) -> Vec<HonorCriterion> {
    vec![
        HonorCriterion {
            level,
            honor: HonorTypeKey::WithHighestHonors,
            rule: QualifyingRule::GpaRangeWithFloor {
                min_gpa: 98.0,
                max_gpa: 100.0,
                min_grade: 93.0,
            },
            span: EvaluationSpan::FullYear,
            active: true,
        },
        HonorCriterion {
            level,
            honor: HonorTypeKey::WithHighHonors,
            rule: QualifyingRule::GpaRangeWithFloor {
                min_gpa: 95.0,
                max_gpa: 97.0,
                min_grade: 90.0,
            },
            span: EvaluationSpan::FullYear,
            active: true,
        },
        HonorCriterion {
            level,
            honor: HonorTypeKey::WithHonors,
            rule: QualifyingRule::GpaFloor { min_gpa: 90.0 },
            span: EvaluationSpan::FullYear,
            active: true,
        },
    ]
}

fn college_criteria() -> Vec<HonorCriterion> {
    vec![
        HonorCriterion {
            level: LevelKey::College,
            honor: HonorTypeKey::DeansList,
            rule: QualifyingRule::ConsistentTerm {
                min_gpa: 92.0,
                min_grade: 90.0,
                years_of_study: vec![2, 3],
            },
            span: EvaluationSpan::Semester,
            active: true,
        },
        HonorCriterion {
            level: LevelKey::College,
            honor: HonorTypeKey::CollegeHonors,
            rule: QualifyingRule::NoGradeBelow { min_grade: 87.0 },
            span: EvaluationSpan::Semester,
            active: true,
        },
        HonorCriterion {
            level: LevelKey::College,
            honor: HonorTypeKey::SummaCumLaude,
            rule: QualifyingRule::NoGradeBelow { min_grade: 95.0 },
            span: EvaluationSpan::MultiYear1To4,
            active: true,
        },
        HonorCriterion {
            level: LevelKey::College,
            honor: HonorTypeKey::MagnaCumLaude,
            rule: QualifyingRule::NoGradeBelow { min_grade: 93.0 },
            span: EvaluationSpan::MultiYear1To4,
            active: true,
        },
        HonorCriterion {
            level: LevelKey::College,
            honor: HonorTypeKey::CumLaude,
            rule: QualifyingRule::NoGradeBelow { min_grade: 87.0 },
            span: EvaluationSpan::MultiYear1To4,
            active: true,
        },
    ]
}
