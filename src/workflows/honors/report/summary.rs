use super::views::{AwardView, HonorRollSummary, HonorTallyEntry, UnevaluatedView};
use crate::workflows::honors::domain::{HonorTypeKey, StudentId};
use crate::workflows::honors::evaluation::{EvaluationError, HonorResult};
use std::collections::HashMap;

/// Student whose scope could not be evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct UnevaluatedStudent {
    pub student_id: StudentId,
    pub error: EvaluationError,
}

/// Evaluation results for a cohort, grouped for reporting.
#[derive(Debug, Default, Clone)]
pub struct HonorRoll {
    pub awards: Vec<HonorResult>,
    pub not_awarded: Vec<StudentId>,
    pub unevaluated: Vec<UnevaluatedStudent>,
}

impl HonorRoll {
    pub fn record(
        &mut self,
        student_id: StudentId,
        outcome: Result<Option<HonorResult>, EvaluationError>,
    ) {
        match outcome {
            Ok(Some(result)) => self.awards.push(result),
            Ok(None) => self.not_awarded.push(student_id),
            Err(error) => self.unevaluated.push(UnevaluatedStudent { student_id, error }),
        }
    }

    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = (StudentId, Result<Option<HonorResult>, EvaluationError>)>,
    {
        let mut roll = Self::default();
        for (student_id, outcome) in outcomes {
            roll.record(student_id, outcome);
        }
        roll
    }

    pub fn awards_for(&self, honor: HonorTypeKey) -> Vec<&HonorResult> {
        self.awards
            .iter()
            .filter(|result| result.honor == honor)
            .collect()
    }

    pub fn summary(&self) -> HonorRollSummary {
        let mut counts: HashMap<HonorTypeKey, usize> = HashMap::new();
        for result in &self.awards {
            *counts.entry(result.honor).or_default() += 1;
        }

        let tallies = HonorTypeKey::ordered()
            .into_iter()
            .filter_map(|honor| {
                counts.get(&honor).map(|count| HonorTallyEntry {
                    honor,
                    honor_label: honor.label(),
                    count: *count,
                })
            })
            .collect();

        let mut awards: Vec<AwardView> = self.awards.iter().map(award_view).collect();
        awards.sort_by(|a, b| {
            rank(a.honor)
                .cmp(&rank(b.honor))
                .then_with(|| b.gpa.total_cmp(&a.gpa))
                .then_with(|| a.student_id.cmp(&b.student_id))
        });

        let unevaluated = self
            .unevaluated
            .iter()
            .map(|entry| UnevaluatedView {
                student_id: entry.student_id.clone(),
                missing_data: entry.error.is_insufficient_data(),
                reason: entry.error.to_string(),
            })
            .collect();

        HonorRollSummary {
            tallies,
            awards,
            not_awarded: self.not_awarded.len(),
            unevaluated,
        }
    }
}

fn rank(honor: HonorTypeKey) -> usize {
    HonorTypeKey::ordered()
        .iter()
        .position(|candidate| *candidate == honor)
        .unwrap_or(usize::MAX)
}

fn round_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn award_view(result: &HonorResult) -> AwardView {
    AwardView {
        student_id: result.student_id.clone(),
        honor: result.honor,
        honor_label: result.honor.label(),
        level: result.level,
        level_label: result.level.label(),
        school_year: result.school_year.clone(),
        scope: result.span.to_string(),
        gpa: round_two(result.gpa),
        min_grade: round_two(result.min_grade),
    }
}
