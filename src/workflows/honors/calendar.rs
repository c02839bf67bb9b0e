use super::domain::{
    EvaluationScope, LevelKey, PeriodId, SchoolYear, Semester, StudentId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Grading period supplied by the external calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingPeriod {
    pub id: PeriodId,
    pub level: LevelKey,
    pub school_year: SchoolYear,
    pub semester: Option<Semester>,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
}

/// College term (semester of a school year), ordered chronologically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CollegeTerm {
    pub school_year: SchoolYear,
    pub semester: Semester,
}

impl CollegeTerm {
    pub fn new(school_year: impl Into<String>, semester: Semester) -> Self {
        Self {
            school_year: SchoolYear(school_year.into()),
            semester,
        }
    }

    pub fn scope_for(&self, student_id: StudentId) -> EvaluationScope {
        EvaluationScope::semester(student_id, self.school_year.clone(), self.semester)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("grading period {id} ends on {ends_on} before it starts on {starts_on}")]
    InvertedPeriod {
        id: PeriodId,
        starts_on: NaiveDate,
        ends_on: NaiveDate,
    },
    #[error("grading period {0} appears more than once")]
    DuplicatePeriod(PeriodId),
}

/// Read-only grading calendar, kept sorted by start date.
#[derive(Debug, Clone, Default)]
pub struct GradingCalendar {
    periods: Vec<GradingPeriod>,
}

impl GradingCalendar {
    pub fn new(mut periods: Vec<GradingPeriod>) -> Result<Self, CalendarError> {
        for period in &periods {
            if period.ends_on < period.starts_on {
                return Err(CalendarError::InvertedPeriod {
                    id: period.id.clone(),
                    starts_on: period.starts_on,
                    ends_on: period.ends_on,
                });
            }
        }

        let mut seen = HashSet::new();
        for period in &periods {
            if !seen.insert((period.level, &period.id)) {
                return Err(CalendarError::DuplicatePeriod(period.id.clone()));
            }
        }

        periods.sort_by(|a, b| a.starts_on.cmp(&b.starts_on).then_with(|| a.id.cmp(&b.id)));

        Ok(Self { periods })
    }

    pub fn periods(&self) -> &[GradingPeriod] {
        &self.periods
    }

    pub fn periods_for(&self, level: LevelKey, school_year: &SchoolYear) -> Vec<&GradingPeriod> {
        self.periods
            .iter()
            .filter(|period| period.level == level && period.school_year == *school_year)
            .collect()
    }

    pub fn period_on(&self, level: LevelKey, date: NaiveDate) -> Option<&GradingPeriod> {
        self.periods.iter().find(|period| {
            period.level == level && period.starts_on <= date && date <= period.ends_on
        })
    }

    /// College terms in the order their first grading period starts.
    pub fn college_terms(&self) -> Vec<CollegeTerm> {
        let mut terms: Vec<CollegeTerm> = Vec::new();
        for period in &self.periods {
            if period.level != LevelKey::College {
                continue;
            }
            let Some(semester) = period.semester else {
                continue;
            };
            let term = CollegeTerm {
                school_year: period.school_year.clone(),
                semester,
            };
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
        terms
    }
}
