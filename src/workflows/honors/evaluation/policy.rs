use crate::workflows::honors::domain::HonorTypeKey;
use serde::{Deserialize, Serialize};

/// Why a single criterion failed to qualify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DisqualificationReason {
    GpaBelowFloor { required: f64, actual: f64 },
    GradeBelowFloor { required: f64, actual: f64 },
    YearOfStudyNotEligible { year_of_study: u8, eligible: Vec<u8> },
    /// The preceding term has no evaluable data; never treated as a pass.
    MissingPriorTermData,
    PriorTermNotHonored,
}

impl DisqualificationReason {
    pub fn summary(&self) -> String {
        match self {
            DisqualificationReason::GpaBelowFloor { required, actual } => {
                format!("GPA {:.2} below required {:.2}", actual, required)
            }
            DisqualificationReason::GradeBelowFloor { required, actual } => {
                format!("lowest grade {:.2} below floor {:.2}", actual, required)
            }
            DisqualificationReason::YearOfStudyNotEligible {
                year_of_study,
                eligible,
            } => {
                let eligible: Vec<String> = eligible.iter().map(u8::to_string).collect();
                format!(
                    "year of study {year_of_study} not in eligible years {}",
                    eligible.join(", ")
                )
            }
            DisqualificationReason::MissingPriorTermData => {
                "no data for the preceding term".to_string()
            }
            DisqualificationReason::PriorTermNotHonored => {
                "no honor held in the preceding term".to_string()
            }
        }
    }
}

/// Audit entry for one criterion evaluated against one scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionCheck {
    pub honor: HonorTypeKey,
    pub qualified: bool,
    pub notes: Vec<String>,
    pub reasons: Vec<DisqualificationReason>,
}

impl CriterionCheck {
    pub fn summary(&self) -> String {
        if self.qualified {
            if self.notes.is_empty() {
                format!("{} qualified", self.honor)
            } else {
                format!("{} qualified: {}", self.honor, self.notes.join("; "))
            }
        } else {
            let reasons: Vec<String> = self.reasons.iter().map(DisqualificationReason::summary).collect();
            format!("{} not met: {}", self.honor, reasons.join("; "))
        }
    }

    pub fn missing_prior_term(&self) -> bool {
        self.reasons.contains(&DisqualificationReason::MissingPriorTermData)
    }
}

/// Checks arrive strictest first, so the first qualifying check is the award.
pub(crate) fn select_award(checks: &[CriterionCheck]) -> Option<HonorTypeKey> {
    checks
        .iter()
        .find(|check| check.qualified)
        .map(|check| check.honor)
}
