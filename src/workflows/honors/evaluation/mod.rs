mod policy;
mod rules;

pub use policy::{CriterionCheck, DisqualificationReason};

use super::aggregate::{compute_gpa, AggregateError, GradeAggregate};
use super::calendar::CollegeTerm;
use super::catalog::CriterionCatalog;
use super::domain::{
    EvaluationScope, EvaluationSpan, GradeRecord, HonorTypeKey, LevelKey, PriorTermStatus,
    SchoolYear, ScopeSpan, StudentId,
};
use policy::select_award;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Error raised while evaluating one scope.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error("criteria for {level} are unusable until corrected: {reason}")]
    Catalog { level: LevelKey, reason: String },
    #[error("no active criteria for {level} over a {span} span")]
    NoCriteriaForScope { level: LevelKey, span: EvaluationSpan },
}

impl EvaluationError {
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            EvaluationError::Aggregate(AggregateError::InsufficientData { .. })
        )
    }
}

/// What to evaluate, plus the preceding term's standing for consistency checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub scope: EvaluationScope,
    pub prior_term: Option<PriorTermStatus>,
}

impl EvaluationRequest {
    pub fn new(scope: EvaluationScope) -> Self {
        Self {
            scope,
            prior_term: None,
        }
    }

    pub fn with_prior_term(mut self, status: PriorTermStatus) -> Self {
        self.prior_term = Some(status);
        self
    }
}

/// Honor awarded to one student for one scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HonorResult {
    pub student_id: StudentId,
    pub honor: HonorTypeKey,
    pub level: LevelKey,
    pub school_year: SchoolYear,
    pub span: ScopeSpan,
    pub gpa: f64,
    pub min_grade: f64,
    pub grade_count: usize,
    pub checks: Vec<CriterionCheck>,
}

/// Full evaluation trail for one scope, whether or not an honor was awarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HonorAssessment {
    pub scope: EvaluationScope,
    pub aggregate: GradeAggregate,
    pub checks: Vec<CriterionCheck>,
    pub award: Option<HonorResult>,
}

impl HonorAssessment {
    /// Standing this assessment hands to the following term.
    pub fn term_status(&self) -> PriorTermStatus {
        match &self.award {
            Some(result) => PriorTermStatus::Honored(result.honor),
            None => PriorTermStatus::NotHonored,
        }
    }
}

/// Outcome of one college term inside a chronological term sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct TermOutcome {
    pub term: CollegeTerm,
    pub result: Result<HonorAssessment, EvaluationError>,
}

impl TermOutcome {
    pub fn award(&self) -> Option<&HonorResult> {
        self.result
            .as_ref()
            .ok()
            .and_then(|assessment| assessment.award.as_ref())
    }
}

/// Stateless evaluator that applies the criterion catalog to grade records.
#[derive(Debug, Clone)]
pub struct HonorEvaluator {
    catalog: Arc<CriterionCatalog>,
}

impl HonorEvaluator {
    pub fn new(catalog: CriterionCatalog) -> Self {
        Self::shared(Arc::new(catalog))
    }

    pub fn shared(catalog: Arc<CriterionCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &CriterionCatalog {
        &self.catalog
    }

    /// Evaluates one scope and keeps every criterion check.
    pub fn assess(
        &self,
        request: &EvaluationRequest,
        records: &[GradeRecord],
    ) -> Result<HonorAssessment, EvaluationError> {
        let scope = &request.scope;
        let span = scope.span.descriptor();
        let criteria = self
            .catalog
            .criteria_for(scope.level, span)
            .map_err(|error| EvaluationError::Catalog {
                level: scope.level,
                reason: error.to_string(),
            })?;
        if criteria.is_empty() {
            return Err(EvaluationError::NoCriteriaForScope {
                level: scope.level,
                span,
            });
        }

        let aggregate = compute_gpa(records, scope)?;

        let checks: Vec<CriterionCheck> = criteria
            .into_iter()
            .map(|criterion| rules::check_criterion(criterion, &aggregate, request.prior_term))
            .collect();
        for check in &checks {
            debug!(student = %scope.student_id, "{}", check.summary());
        }

        let award = select_award(&checks).map(|honor| HonorResult {
            student_id: scope.student_id.clone(),
            honor,
            level: scope.level,
            school_year: scope
                .span
                .school_year()
                .cloned()
                .unwrap_or_else(|| aggregate.latest_school_year.clone()),
            span: scope.span.clone(),
            gpa: aggregate.gpa,
            min_grade: aggregate.min_grade,
            grade_count: aggregate.grade_count,
            checks: checks.clone(),
        });

        debug!(
            student = %scope.student_id,
            level = %scope.level,
            scope = %scope.span,
            gpa = aggregate.gpa,
            min_grade = aggregate.min_grade,
            award = ?award.as_ref().map(|result| result.honor),
            "evaluated honor scope"
        );

        Ok(HonorAssessment {
            scope: scope.clone(),
            aggregate,
            checks,
            award,
        })
    }

    /// Best qualifying honor for the request's scope, or `None` when no tier matches.
    pub fn evaluate(
        &self,
        request: &EvaluationRequest,
        records: &[GradeRecord],
    ) -> Result<Option<HonorResult>, EvaluationError> {
        Ok(self.assess(request, records)?.award)
    }

    /// Basic-education evaluation over one school year.
    pub fn evaluate_school_year(
        &self,
        student_id: StudentId,
        level: LevelKey,
        school_year: SchoolYear,
        records: &[GradeRecord],
    ) -> Result<Option<HonorResult>, EvaluationError> {
        let request = EvaluationRequest::new(EvaluationScope::full_year(student_id, level, school_year));
        self.evaluate(&request, records)
    }

    /// Latin honors over college years 1 through 4.
    pub fn evaluate_program(
        &self,
        student_id: StudentId,
        records: &[GradeRecord],
    ) -> Result<Option<HonorResult>, EvaluationError> {
        let request = EvaluationRequest::new(EvaluationScope::college_program(student_id));
        self.evaluate(&request, records)
    }

    /// Evaluates college terms oldest first, handing each term's standing to the next.
    ///
    /// A term without data fails on its own and leaves the following term with
    /// no prior-term standing.
    pub fn evaluate_terms(
        &self,
        student_id: &StudentId,
        terms: &[CollegeTerm],
        records: &[GradeRecord],
    ) -> Vec<TermOutcome> {
        let mut ordered = terms.to_vec();
        ordered.sort();
        ordered.dedup();

        let mut prior_term: Option<PriorTermStatus> = None;
        let mut outcomes = Vec::with_capacity(ordered.len());

        for term in ordered {
            let request = EvaluationRequest {
                scope: term.scope_for(student_id.clone()),
                prior_term,
            };
            let result = self.assess(&request, records);
            prior_term = result.as_ref().ok().map(HonorAssessment::term_status);
            outcomes.push(TermOutcome { term, result });
        }

        outcomes
    }
}
