use crate::workflows::honors::domain::{HonorTypeKey, LevelKey, SchoolYear, StudentId};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct HonorTallyEntry {
    pub honor: HonorTypeKey,
    pub honor_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AwardView {
    pub student_id: StudentId,
    pub honor: HonorTypeKey,
    pub honor_label: &'static str,
    pub level: LevelKey,
    pub level_label: &'static str,
    pub school_year: SchoolYear,
    pub scope: String,
    pub gpa: f64,
    pub min_grade: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnevaluatedView {
    pub student_id: StudentId,
    pub missing_data: bool,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HonorRollSummary {
    pub tallies: Vec<HonorTallyEntry>,
    pub awards: Vec<AwardView>,
    pub not_awarded: usize,
    pub unevaluated: Vec<UnevaluatedView>,
}

impl HonorRollSummary {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
