//! Boundary to the external grade record store.
//!
//! The engine only reads grades. `GradeBook` is an in-memory adapter that
//! enforces the one-grade-per-slot rule for callers that stage records before
//! evaluating.

mod parser;

pub use parser::GradeImportError;

use super::domain::{GradeRecord, GradeSlot, LevelKey, SchoolYear, StudentId};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Read-only supplier of finalized grade records.
pub trait GradeRecordSource: Send + Sync {
    /// Students holding at least one grade at `level`, in id order.
    fn students(&self, level: LevelKey) -> Result<Vec<StudentId>, RepositoryError>;
    fn records_for(
        &self,
        student_id: &StudentId,
        level: LevelKey,
    ) -> Result<Vec<GradeRecord>, RepositoryError>;
}

/// Error enumeration for grade store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("grade store unavailable: {0}")]
    Unavailable(String),
}

/// In-memory grade store keyed by grade slot.
#[derive(Debug, Clone, Default)]
pub struct GradeBook {
    records: BTreeMap<GradeSlot, GradeRecord>,
}

impl GradeBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, GradeImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, GradeImportError> {
        let mut book = Self::new();
        for record in parser::parse_records(reader)? {
            book.upsert(record);
        }
        debug!(records = book.len(), "imported grade records");
        Ok(book)
    }

    /// Stores a grade, returning the record it replaced for the same slot.
    pub fn upsert(&mut self, record: GradeRecord) -> Option<GradeRecord> {
        self.records.insert(record.slot(), record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn school_years(&self, level: LevelKey) -> BTreeSet<SchoolYear> {
        self.records
            .values()
            .filter(|record| record.level == level)
            .map(|record| record.school_year.clone())
            .collect()
    }
}

impl Extend<GradeRecord> for GradeBook {
    fn extend<T: IntoIterator<Item = GradeRecord>>(&mut self, iter: T) {
        for record in iter {
            self.upsert(record);
        }
    }
}

impl FromIterator<GradeRecord> for GradeBook {
    fn from_iter<T: IntoIterator<Item = GradeRecord>>(iter: T) -> Self {
        let mut book = Self::new();
        book.extend(iter);
        book
    }
}

impl GradeRecordSource for GradeBook {
    fn students(&self, level: LevelKey) -> Result<Vec<StudentId>, RepositoryError> {
        let students: BTreeSet<&StudentId> = self
            .records
            .values()
            .filter(|record| record.level == level)
            .map(|record| &record.student_id)
            .collect();
        Ok(students.into_iter().cloned().collect())
    }

    fn records_for(
        &self,
        student_id: &StudentId,
        level: LevelKey,
    ) -> Result<Vec<GradeRecord>, RepositoryError> {
        Ok(self
            .records
            .values()
            .filter(|record| record.student_id == *student_id && record.level == level)
            .cloned()
            .collect())
    }
}
