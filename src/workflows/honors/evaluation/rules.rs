use super::policy::{CriterionCheck, DisqualificationReason};
use crate::workflows::honors::aggregate::GradeAggregate;
use crate::workflows::honors::catalog::{HonorCriterion, QualifyingRule};
use crate::workflows::honors::domain::PriorTermStatus;

/// Absorbs floating-point noise from averaging; far below any meaningful grade step.
const GRADE_TOLERANCE: f64 = 1e-9;

fn meets(actual: f64, required: f64) -> bool {
    actual + GRADE_TOLERANCE >= required
}

pub(crate) fn check_criterion(
    criterion: &HonorCriterion,
    aggregate: &GradeAggregate,
    prior_term: Option<PriorTermStatus>,
) -> CriterionCheck {
    let mut notes = Vec::new();
    let mut reasons = Vec::new();

    let gpa_floor = |min_gpa: f64, notes: &mut Vec<String>, reasons: &mut Vec<DisqualificationReason>| {
        if meets(aggregate.gpa, min_gpa) {
            notes.push(format!("GPA {:.2} meets {:.2}", aggregate.gpa, min_gpa));
        } else {
            reasons.push(DisqualificationReason::GpaBelowFloor {
                required: min_gpa,
                actual: aggregate.gpa,
            });
        }
    };

    let grade_floor = |min_grade: f64, notes: &mut Vec<String>, reasons: &mut Vec<DisqualificationReason>| {
        if meets(aggregate.min_grade, min_grade) {
            notes.push(format!(
                "lowest grade {:.2} meets floor {:.2}",
                aggregate.min_grade, min_grade
            ));
        } else {
            reasons.push(DisqualificationReason::GradeBelowFloor {
                required: min_grade,
                actual: aggregate.min_grade,
            });
        }
    };

    match &criterion.rule {
        QualifyingRule::GpaFloor { min_gpa } => {
            gpa_floor(*min_gpa, &mut notes, &mut reasons);
        }
        QualifyingRule::GpaRangeWithFloor {
            min_gpa,
            max_gpa,
            min_grade,
        } => {
            gpa_floor(*min_gpa, &mut notes, &mut reasons);
            grade_floor(*min_grade, &mut notes, &mut reasons);
            // Stricter tiers are checked first, so a GPA past the ceiling only
            // lands here when a stricter tier failed on another condition.
            if aggregate.gpa > *max_gpa + GRADE_TOLERANCE {
                notes.push(format!(
                    "GPA {:.2} above band ceiling {:.2}",
                    aggregate.gpa, max_gpa
                ));
            }
        }
        QualifyingRule::NoGradeBelow { min_grade } => {
            grade_floor(*min_grade, &mut notes, &mut reasons);
        }
        QualifyingRule::ConsistentTerm {
            min_gpa,
            min_grade,
            years_of_study,
        } => {
            if !years_of_study.contains(&aggregate.year_of_study) {
                reasons.push(DisqualificationReason::YearOfStudyNotEligible {
                    year_of_study: aggregate.year_of_study,
                    eligible: years_of_study.clone(),
                });
            }
            gpa_floor(*min_gpa, &mut notes, &mut reasons);
            grade_floor(*min_grade, &mut notes, &mut reasons);
            match prior_term {
                Some(PriorTermStatus::Honored(honor)) => {
                    notes.push(format!("held {} in the preceding term", honor.label()));
                }
                Some(PriorTermStatus::NotHonored) => {
                    reasons.push(DisqualificationReason::PriorTermNotHonored);
                }
                None => reasons.push(DisqualificationReason::MissingPriorTermData),
            }
        }
    }

    CriterionCheck {
        honor: criterion.honor,
        qualified: reasons.is_empty(),
        notes,
        reasons,
    }
}
