use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use tracing::{info, warn};

use super::calendar::CollegeTerm;
use crate::config::BatchConfig;
use super::catalog::CriterionCatalog;
use super::domain::{GradeRecord, LevelKey, SchoolYear, StudentId};
use super::evaluation::{EvaluationError, HonorEvaluator, HonorResult, TermOutcome};
use super::grades::{GradeRecordSource, RepositoryError};
use super::report::HonorRoll;

/// Service composing a grade source, the criterion catalog, and the evaluator
/// for cohort-wide runs.
pub struct HonorEvaluationService<S> {
    source: Arc<S>,
    evaluator: HonorEvaluator,
    pool: Option<ThreadPool>,
}

/// Per-student college term sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentTerms {
    pub student_id: StudentId,
    pub terms: Vec<TermOutcome>,
}

impl<S> HonorEvaluationService<S>
where
    S: GradeRecordSource + 'static,
{
    pub fn new(source: Arc<S>, catalog: CriterionCatalog) -> Self {
        Self {
            source,
            evaluator: HonorEvaluator::new(catalog),
            pool: None,
        }
    }

    /// Runs batches on a dedicated pool of `threads` workers instead of the global pool.
    pub fn with_threads(mut self, threads: usize) -> Result<Self, HonorServiceError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|idx| format!("honor-eval-{idx}"))
            .build()?;
        self.pool = Some(pool);
        Ok(self)
    }

    /// Applies configured batch sizing; without a thread count the global pool is kept.
    pub fn with_batch_config(self, batch: &BatchConfig) -> Result<Self, HonorServiceError> {
        match batch.threads {
            Some(threads) => self.with_threads(threads),
            None => Ok(self),
        }
    }

    pub fn evaluator(&self) -> &HonorEvaluator {
        &self.evaluator
    }

    /// Honor roll for a basic-education level and school year.
    pub fn evaluate_school_year(
        &self,
        level: LevelKey,
        school_year: &SchoolYear,
    ) -> Result<HonorRoll, HonorServiceError> {
        let roll = self.evaluate_cohort(level, |student_id, records| {
            self.evaluator
                .evaluate_school_year(student_id, level, school_year.clone(), records)
        })?;
        info!(
            %level,
            %school_year,
            awarded = roll.awards.len(),
            unevaluated = roll.unevaluated.len(),
            "school year honor roll complete"
        );
        Ok(roll)
    }

    /// Latin honors roll across college years 1 through 4.
    pub fn evaluate_program(&self) -> Result<HonorRoll, HonorServiceError> {
        let roll = self.evaluate_cohort(LevelKey::College, |student_id, records| {
            self.evaluator.evaluate_program(student_id, records)
        })?;
        info!(
            awarded = roll.awards.len(),
            unevaluated = roll.unevaluated.len(),
            "program honor roll complete"
        );
        Ok(roll)
    }

    /// Term-by-term college evaluation for every college student.
    pub fn evaluate_terms(
        &self,
        terms: &[CollegeTerm],
    ) -> Result<Vec<StudentTerms>, HonorServiceError> {
        let cohort = self.load_cohort(LevelKey::College)?;
        let mut outcomes: Vec<StudentTerms> = self.run(|| {
            cohort
                .par_iter()
                .map(|(student_id, records)| StudentTerms {
                    student_id: student_id.clone(),
                    terms: self.evaluator.evaluate_terms(student_id, terms, records.as_slice()),
                })
                .collect()
        });
        outcomes.sort_by(|a, b| a.student_id.cmp(&b.student_id));
        Ok(outcomes)
    }

    fn evaluate_cohort<F>(&self, level: LevelKey, evaluate: F) -> Result<HonorRoll, HonorServiceError>
    where
        F: Fn(StudentId, &[GradeRecord]) -> Result<Option<HonorResult>, EvaluationError> + Sync,
    {
        let cohort = self.load_cohort(level)?;
        let mut outcomes: Vec<(StudentId, Result<Option<HonorResult>, EvaluationError>)> =
            self.run(|| {
                cohort
                    .par_iter()
                    .map(|(student_id, records)| {
                        let outcome = evaluate(student_id.clone(), records.as_slice());
                        if let Err(error) = &outcome {
                            warn!(student = %student_id, %error, "student could not be evaluated");
                        }
                        (student_id.clone(), outcome)
                    })
                    .collect()
            });
        outcomes.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(HonorRoll::from_outcomes(outcomes))
    }

    fn load_cohort(
        &self,
        level: LevelKey,
    ) -> Result<Vec<(StudentId, Vec<GradeRecord>)>, HonorServiceError> {
        let students = self.source.students(level)?;
        students
            .into_iter()
            .map(|student_id| -> Result<_, HonorServiceError> {
                let records = self.source.records_for(&student_id, level)?;
                Ok((student_id, records))
            })
            .collect()
    }

    fn run<T, F>(&self, job: F) -> T
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(job),
            None => job(),
        }
    }
}

/// Error raised by the honor evaluation service.
#[derive(Debug, thiserror::Error)]
pub enum HonorServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("failed to build evaluation thread pool: {0}")]
    ThreadPool(#[from] ThreadPoolBuildError),
}
