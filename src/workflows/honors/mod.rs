//! Honor eligibility determination for basic-education and college grade records.

pub mod aggregate;
pub mod calendar;
pub mod catalog;
pub mod domain;
pub mod evaluation;
pub mod grades;
pub mod report;
pub mod service;

pub use aggregate::{compute_gpa, AggregateError, GradeAggregate};
pub use calendar::{CalendarError, CollegeTerm, GradingCalendar, GradingPeriod};
pub use catalog::{CatalogError, CriterionCatalog, HonorCriterion, QualifyingRule};
pub use domain::{
    AcademicLevel, EvaluationScope, EvaluationSpan, GradeRecord, HonorScope, HonorType,
    HonorTypeKey, LevelKey, PeriodId, PriorTermStatus, SchoolYear, ScopeSpan, Semester,
    StudentId, SubjectId,
};
pub use evaluation::{
    CriterionCheck, DisqualificationReason, EvaluationError, EvaluationRequest, HonorAssessment,
    HonorEvaluator, HonorResult, TermOutcome,
};
pub use grades::{GradeBook, GradeImportError, GradeRecordSource, RepositoryError};
pub use report::HonorRoll;
pub use service::{HonorEvaluationService, HonorServiceError, StudentTerms};
