mod parser;
mod standard;

use super::aggregate::{GRADE_SCALE_MAX, GRADE_SCALE_MIN};
use super::domain::{EvaluationSpan, HonorTypeKey, LevelKey};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Predicate category a criterion qualifies students by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum QualifyingRule {
    /// GPA at or above `min_gpa`; no per-subject floor.
    GpaFloor { min_gpa: f64 },
    /// GPA at or above `min_gpa` and every grade at or above `min_grade`.
    ///
    /// `max_gpa` is the nominal top of the band and never disqualifies: a
    /// stricter tier ranked earlier claims GPAs above it whenever that tier's
    /// own floors hold, so only students who missed it land here. Exceeding
    /// the ceiling is recorded as a note on the check.
    GpaRangeWithFloor {
        min_gpa: f64,
        max_gpa: f64,
        min_grade: f64,
    },
    /// Every grade across the span at or above `min_grade`.
    NoGradeBelow { min_grade: f64 },
    /// Per-term standing that also requires an honor in the preceding term.
    ConsistentTerm {
        min_gpa: f64,
        min_grade: f64,
        years_of_study: Vec<u8>,
    },
}

impl QualifyingRule {
    pub const fn key(&self) -> &'static str {
        match self {
            QualifyingRule::GpaFloor { .. } => "gpa_floor",
            QualifyingRule::GpaRangeWithFloor { .. } => "gpa_range_with_floor",
            QualifyingRule::NoGradeBelow { .. } => "no_grade_below",
            QualifyingRule::ConsistentTerm { .. } => "consistent_term",
        }
    }
}

/// One honor tier for one academic level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HonorCriterion {
    pub level: LevelKey,
    pub honor: HonorTypeKey,
    pub rule: QualifyingRule,
    pub span: EvaluationSpan,
    pub active: bool,
}

impl HonorCriterion {
    /// Lowest individual grade the tier tolerates; zero when the tier has no floor.
    pub fn min_grade_floor(&self) -> f64 {
        match &self.rule {
            QualifyingRule::GpaFloor { .. } => GRADE_SCALE_MIN,
            QualifyingRule::GpaRangeWithFloor { min_grade, .. }
            | QualifyingRule::NoGradeBelow { min_grade }
            | QualifyingRule::ConsistentTerm { min_grade, .. } => *min_grade,
        }
    }

    pub fn gpa_floor(&self) -> f64 {
        match &self.rule {
            QualifyingRule::GpaFloor { min_gpa }
            | QualifyingRule::GpaRangeWithFloor { min_gpa, .. }
            | QualifyingRule::ConsistentTerm { min_gpa, .. } => *min_gpa,
            QualifyingRule::NoGradeBelow { .. } => GRADE_SCALE_MIN,
        }
    }

    /// Nominal upper edge of the GPA band; `None` when unbounded.
    pub fn gpa_ceiling(&self) -> Option<f64> {
        match &self.rule {
            QualifyingRule::GpaRangeWithFloor { max_gpa, .. } => Some(*max_gpa),
            _ => None,
        }
    }

    /// Ordering key for the strictness total order: grade floor first, GPA floor second.
    fn strictness(&self) -> (f64, f64) {
        (self.min_grade_floor(), self.gpa_floor())
    }

    fn validate_range(&self) -> Result<(), CatalogError> {
        let out_of_scale =
            |value: f64| !value.is_finite() || !(GRADE_SCALE_MIN..=GRADE_SCALE_MAX).contains(&value);
        let invalid = |detail: String| CatalogError::InvalidCriterionRange {
            level: self.level,
            honor: self.honor,
            detail,
        };

        let mut bounds = vec![self.min_grade_floor(), self.gpa_floor()];
        bounds.extend(self.gpa_ceiling());
        if let Some(value) = bounds.into_iter().find(|value| out_of_scale(*value)) {
            return Err(invalid(format!("bound {value} is outside the 0-100 scale")));
        }

        if let Some(max_gpa) = self.gpa_ceiling() {
            if self.gpa_floor() > max_gpa {
                return Err(invalid(format!(
                    "minimum GPA {} exceeds maximum GPA {}",
                    self.gpa_floor(),
                    max_gpa
                )));
            }
        }

        if let QualifyingRule::ConsistentTerm { years_of_study, .. } = &self.rule {
            if years_of_study.is_empty() {
                return Err(invalid("no eligible years of study".to_string()));
            }
            if self.span != EvaluationSpan::Semester {
                return Err(CatalogError::UnsupportedSpan {
                    level: self.level,
                    honor: self.honor,
                    span: self.span,
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{honor} criterion for {level} has an invalid range: {detail}")]
    InvalidCriterionRange {
        level: LevelKey,
        honor: HonorTypeKey,
        detail: String,
    },
    #[error("{honor} criterion for {level} cannot be evaluated over a {span} span")]
    UnsupportedSpan {
        level: LevelKey,
        honor: HonorTypeKey,
        span: EvaluationSpan,
    },
    #[error("{honor} is configured more than once for {level} over a {span} span")]
    DuplicateCriterion {
        level: LevelKey,
        honor: HonorTypeKey,
        span: EvaluationSpan,
    },
    #[error("unknown academic level '{0}'")]
    UnknownLevel(String),
    #[error("unknown honor type '{0}'")]
    UnknownHonor(String),
    #[error("unknown qualifying rule '{0}'")]
    UnknownRule(String),
    #[error("unknown evaluation span '{0}'")]
    UnknownSpan(String),
    #[error("{honor} criterion is missing required column '{field}'")]
    MissingValue { honor: HonorTypeKey, field: &'static str },
    #[error("invalid year of study '{0}'")]
    InvalidYearOfStudy(String),
    #[error("failed to read criterion catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid criterion CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Immutable set of honor criteria grouped by level.
///
/// Within a level, criteria keep the order they were supplied in; that order
/// is the strictness rank the evaluator takes the first match from. Each level
/// is validated on its own: a misconfigured level keeps its error and refuses
/// evaluation, while the remaining levels stay usable.
#[derive(Debug, Default)]
pub struct CriterionCatalog {
    levels: BTreeMap<LevelKey, Result<Vec<HonorCriterion>, CatalogError>>,
}

impl CriterionCatalog {
    pub fn new(criteria: Vec<HonorCriterion>) -> Self {
        let mut grouped: BTreeMap<LevelKey, Vec<HonorCriterion>> = BTreeMap::new();
        for criterion in criteria {
            grouped.entry(criterion.level).or_default().push(criterion);
        }

        let levels: BTreeMap<LevelKey, Result<Vec<HonorCriterion>, CatalogError>> = grouped
            .into_iter()
            .map(|(level, criteria)| {
                let validated = validate_level(level, &criteria).map(|()| criteria);
                if let Err(error) = &validated {
                    warn!(%level, %error, "level criteria rejected");
                }
                (level, validated)
            })
            .collect();

        info!(
            levels = levels.len(),
            rejected = levels.values().filter(|criteria| criteria.is_err()).count(),
            "criterion catalog loaded"
        );
        Self { levels }
    }

    /// Built-in criteria for all four academic levels.
    pub fn standard() -> Self {
        Self::new(standard::standard_criteria())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parses a criterion CSV. Malformed rows fail the whole import; ordering
    /// and range problems only disable the level they belong to.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        Ok(Self::new(parser::parse_criteria(reader)?))
    }

    /// Levels whose criteria failed validation, with the reason.
    pub fn faults(&self) -> impl Iterator<Item = (LevelKey, &CatalogError)> + '_ {
        self.levels
            .iter()
            .filter_map(|(level, criteria)| criteria.as_ref().err().map(|error| (*level, error)))
    }

    /// All criteria configured for a level, active or not, in rank order.
    pub fn all_for_level(&self, level: LevelKey) -> Result<&[HonorCriterion], &CatalogError> {
        match self.levels.get(&level) {
            Some(Ok(criteria)) => Ok(criteria.as_slice()),
            Some(Err(error)) => Err(error),
            None => Ok(&[]),
        }
    }

    /// Active criteria for a level, in rank order.
    pub fn for_level(&self, level: LevelKey) -> Result<Vec<&HonorCriterion>, &CatalogError> {
        Ok(self
            .all_for_level(level)?
            .iter()
            .filter(|criterion| criterion.active)
            .collect())
    }

    /// Active criteria for a level that evaluate over `span`, strictest first.
    pub fn criteria_for(
        &self,
        level: LevelKey,
        span: EvaluationSpan,
    ) -> Result<Vec<&HonorCriterion>, &CatalogError> {
        Ok(self
            .all_for_level(level)?
            .iter()
            .filter(|criterion| criterion.active && criterion.span == span)
            .collect())
    }
}

fn validate_level(level: LevelKey, criteria: &[HonorCriterion]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for criterion in criteria {
        criterion.validate_range()?;
        if !seen.insert((criterion.honor, criterion.span)) {
            return Err(CatalogError::DuplicateCriterion {
                level,
                honor: criterion.honor,
                span: criterion.span,
            });
        }
    }

    let mut last_by_span: BTreeMap<EvaluationSpan, &HonorCriterion> = BTreeMap::new();
    for criterion in criteria.iter().filter(|criterion| criterion.active) {
        if let Some(previous) = last_by_span.insert(criterion.span, criterion) {
            let ordering = criterion
                .strictness()
                .partial_cmp(&previous.strictness())
                .unwrap_or(Ordering::Equal);
            if ordering != Ordering::Less {
                return Err(CatalogError::InvalidCriterionRange {
                    level,
                    honor: criterion.honor,
                    detail: format!(
                        "floors must decrease along the ordered set, but {} follows {}",
                        criterion.honor, previous.honor
                    ),
                });
            }
        }
    }
    debug!(%level, criteria = criteria.len(), "validated level criteria");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor(level: LevelKey, honor: HonorTypeKey, min_grade: f64) -> HonorCriterion {
        HonorCriterion {
            level,
            honor,
            rule: QualifyingRule::NoGradeBelow { min_grade },
            span: EvaluationSpan::MultiYear1To4,
            active: true,
        }
    }

    fn honors_floor(level: LevelKey) -> HonorCriterion {
        HonorCriterion {
            level,
            honor: HonorTypeKey::WithHonors,
            rule: QualifyingRule::GpaFloor { min_gpa: 90.0 },
            span: EvaluationSpan::FullYear,
            active: true,
        }
    }

    fn level_error(catalog: &CriterionCatalog, level: LevelKey) -> &CatalogError {
        catalog
            .all_for_level(level)
            .expect_err("level should be rejected")
    }

    fn honors(criteria: Vec<&HonorCriterion>) -> Vec<HonorTypeKey> {
        criteria.into_iter().map(|criterion| criterion.honor).collect()
    }

    #[test]
    fn standard_catalog_passes_validation() {
        let catalog = CriterionCatalog::standard();
        assert_eq!(catalog.faults().count(), 0);
        for level in LevelKey::ordered() {
            let criteria = catalog.for_level(level).expect("valid level");
            assert!(!criteria.is_empty(), "{level} has criteria");
        }
    }

    #[test]
    fn standard_basic_levels_rank_highest_first() {
        let catalog = CriterionCatalog::standard();
        let criteria = catalog
            .criteria_for(LevelKey::Elementary, EvaluationSpan::FullYear)
            .expect("valid level");
        assert_eq!(
            honors(criteria),
            vec![
                HonorTypeKey::WithHighestHonors,
                HonorTypeKey::WithHighHonors,
                HonorTypeKey::WithHonors,
            ]
        );
    }

    #[test]
    fn standard_college_splits_term_and_program_criteria() {
        let catalog = CriterionCatalog::standard();
        let term = catalog
            .criteria_for(LevelKey::College, EvaluationSpan::Semester)
            .expect("valid level");
        assert_eq!(
            honors(term),
            vec![HonorTypeKey::DeansList, HonorTypeKey::CollegeHonors]
        );

        let program = catalog
            .criteria_for(LevelKey::College, EvaluationSpan::MultiYear1To4)
            .expect("valid level");
        assert_eq!(
            honors(program),
            vec![
                HonorTypeKey::SummaCumLaude,
                HonorTypeKey::MagnaCumLaude,
                HonorTypeKey::CumLaude,
            ]
        );
    }

    #[test]
    fn unknown_level_has_no_criteria() {
        let catalog = CriterionCatalog::new(vec![honors_floor(LevelKey::Elementary)]);
        assert!(catalog
            .criteria_for(LevelKey::College, EvaluationSpan::Semester)
            .expect("absent level is not a fault")
            .is_empty());
    }

    #[test]
    fn rejects_minimum_above_maximum() {
        let catalog = CriterionCatalog::new(vec![HonorCriterion {
            level: LevelKey::Elementary,
            honor: HonorTypeKey::WithHighHonors,
            rule: QualifyingRule::GpaRangeWithFloor {
                min_gpa: 97.0,
                max_gpa: 95.0,
                min_grade: 90.0,
            },
            span: EvaluationSpan::FullYear,
            active: true,
        }]);
        assert!(matches!(
            level_error(&catalog, LevelKey::Elementary),
            CatalogError::InvalidCriterionRange { .. }
        ));
    }

    #[test]
    fn rejects_non_monotonic_floors() {
        let catalog = CriterionCatalog::new(vec![
            floor(LevelKey::College, HonorTypeKey::CumLaude, 87.0),
            floor(LevelKey::College, HonorTypeKey::SummaCumLaude, 95.0),
        ]);
        match level_error(&catalog, LevelKey::College) {
            CatalogError::InvalidCriterionRange { honor, .. } => {
                assert_eq!(*honor, HonorTypeKey::SummaCumLaude)
            }
            other => panic!("expected range error, got {other:?}"),
        }
    }

    #[test]
    fn misconfigured_level_leaves_other_levels_usable() {
        let catalog = CriterionCatalog::new(vec![
            honors_floor(LevelKey::Elementary),
            floor(LevelKey::College, HonorTypeKey::CumLaude, 87.0),
            floor(LevelKey::College, HonorTypeKey::SummaCumLaude, 95.0),
        ]);

        let faults: Vec<LevelKey> = catalog.faults().map(|(level, _)| level).collect();
        assert_eq!(faults, vec![LevelKey::College]);
        assert!(catalog
            .criteria_for(LevelKey::College, EvaluationSpan::MultiYear1To4)
            .is_err());
        assert_eq!(
            honors(
                catalog
                    .criteria_for(LevelKey::Elementary, EvaluationSpan::FullYear)
                    .expect("elementary unaffected")
            ),
            vec![HonorTypeKey::WithHonors]
        );
    }

    #[test]
    fn inactive_criteria_do_not_affect_ordering() {
        let mut dormant = floor(LevelKey::College, HonorTypeKey::SummaCumLaude, 95.0);
        dormant.active = false;
        let catalog = CriterionCatalog::new(vec![
            floor(LevelKey::College, HonorTypeKey::CumLaude, 87.0),
            dormant,
        ]);
        assert_eq!(
            catalog.for_level(LevelKey::College).expect("valid level").len(),
            1
        );
        assert_eq!(
            catalog
                .all_for_level(LevelKey::College)
                .expect("valid level")
                .len(),
            2
        );
    }

    #[test]
    fn rejects_duplicate_honor_over_the_same_span() {
        let catalog = CriterionCatalog::new(vec![
            floor(LevelKey::College, HonorTypeKey::CumLaude, 90.0),
            floor(LevelKey::College, HonorTypeKey::CumLaude, 87.0),
        ]);
        assert!(matches!(
            level_error(&catalog, LevelKey::College),
            CatalogError::DuplicateCriterion {
                span: EvaluationSpan::MultiYear1To4,
                ..
            }
        ));
    }

    #[test]
    fn same_honor_may_appear_once_per_span() {
        let mut term = floor(LevelKey::College, HonorTypeKey::CollegeHonors, 87.0);
        term.span = EvaluationSpan::Semester;
        let program = floor(LevelKey::College, HonorTypeKey::CollegeHonors, 87.0);
        let catalog = CriterionCatalog::new(vec![term, program]);
        assert_eq!(catalog.faults().count(), 0);
    }

    #[test]
    fn consistent_term_rules_require_semester_span() {
        let catalog = CriterionCatalog::new(vec![HonorCriterion {
            level: LevelKey::College,
            honor: HonorTypeKey::DeansList,
            rule: QualifyingRule::ConsistentTerm {
                min_gpa: 92.0,
                min_grade: 90.0,
                years_of_study: vec![2, 3],
            },
            span: EvaluationSpan::FullYear,
            active: true,
        }]);
        assert!(matches!(
            level_error(&catalog, LevelKey::College),
            CatalogError::UnsupportedSpan { .. }
        ));
    }
}
