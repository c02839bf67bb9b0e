use super::{CatalogError, HonorCriterion, QualifyingRule};
use crate::workflows::honors::domain::{EvaluationSpan, HonorTypeKey, LevelKey};
use serde::{Deserialize, Deserializer};
use std::io::Read;

pub(super) fn parse_criteria<R: Read>(reader: R) -> Result<Vec<HonorCriterion>, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut criteria = Vec::new();

    for row in csv_reader.deserialize::<CriterionRow>() {
        criteria.push(row?.into_criterion()?);
    }

    Ok(criteria)
}

#[derive(Debug, Deserialize)]
struct CriterionRow {
    level: String,
    honor: String,
    rule: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    min_gpa: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    max_gpa: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    min_grade: Option<String>,
    span: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    years_of_study: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    active: Option<String>,
}

impl CriterionRow {
    fn into_criterion(self) -> Result<HonorCriterion, CatalogError> {
        let level =
            LevelKey::parse(&self.level).ok_or_else(|| CatalogError::UnknownLevel(self.level.clone()))?;
        let honor = HonorTypeKey::parse(&self.honor)
            .ok_or_else(|| CatalogError::UnknownHonor(self.honor.clone()))?;
        let span =
            EvaluationSpan::parse(&self.span).ok_or_else(|| CatalogError::UnknownSpan(self.span.clone()))?;

        let required = |value: &Option<String>, field: &'static str| -> Result<f64, CatalogError> {
            let raw = value
                .as_deref()
                .ok_or(CatalogError::MissingValue { honor, field })?;
            raw.parse::<f64>().map_err(|_| CatalogError::InvalidCriterionRange {
                level,
                honor,
                detail: format!("{field} '{raw}' is not a number"),
            })
        };

        let rule = match self.rule.trim().to_ascii_lowercase().as_str() {
            "gpa_floor" => QualifyingRule::GpaFloor {
                min_gpa: required(&self.min_gpa, "min_gpa")?,
            },
            "gpa_range_with_floor" => QualifyingRule::GpaRangeWithFloor {
                min_gpa: required(&self.min_gpa, "min_gpa")?,
                max_gpa: match self.max_gpa {
                    Some(_) => required(&self.max_gpa, "max_gpa")?,
                    None => 100.0,
                },
                min_grade: required(&self.min_grade, "min_grade")?,
            },
            "no_grade_below" => QualifyingRule::NoGradeBelow {
                min_grade: required(&self.min_grade, "min_grade")?,
            },
            "consistent_term" => QualifyingRule::ConsistentTerm {
                min_gpa: required(&self.min_gpa, "min_gpa")?,
                min_grade: required(&self.min_grade, "min_grade")?,
                years_of_study: parse_years(self.years_of_study.as_deref(), honor)?,
            },
            other => return Err(CatalogError::UnknownRule(other.to_string())),
        };

        Ok(HonorCriterion {
            level,
            honor,
            rule,
            span,
            active: parse_flag(self.active.as_deref()),
        })
    }
}

fn parse_years(value: Option<&str>, honor: HonorTypeKey) -> Result<Vec<u8>, CatalogError> {
    let raw = value.ok_or(CatalogError::MissingValue {
        honor,
        field: "years_of_study",
    })?;

    raw.split('|')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u8>()
                .map_err(|_| CatalogError::InvalidYearOfStudy(part.to_string()))
        })
        .collect()
}

/// Missing flags default to active.
fn parse_flag(value: Option<&str>) -> bool {
    match value.map(|flag| flag.trim().to_ascii_lowercase()) {
        Some(flag) => !matches!(flag.as_str(), "false" | "0" | "no" | "n"),
        None => true,
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
