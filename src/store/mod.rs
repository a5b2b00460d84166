mod record;
pub mod schema;
mod sink;

pub use record::*;
pub use schema::{SchemaVersion, load_file, load_files, load_records, write_records};
pub use sink::*;

use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Csv file {0} does not match any known schema")]
    UnknownSchema(PathBuf),
    #[error("Could not migrate line {line}: {reason}")]
    Migration { line: u64, reason: String },
}

/// All prediction records of a run. Ids are handed out from a high-water
/// mark so they never repeat, even after rows are removed.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<PredictionRecord>,
    max_id: u64,
}

impl RecordStore {
    pub fn new() -> Self {
        Default::default()
    }

    /// Continues numbering above the largest id found in `records`.
    pub fn resume(records: Vec<PredictionRecord>) -> Self {
        let max_id = records
            .iter()
            .map(|record| record.prediction_id)
            .max()
            .unwrap_or(0);
        Self { records, max_id }
    }

    pub fn next_id(&self) -> u64 {
        self.max_id + 1
    }

    pub fn max_id(&self) -> Option<u64> {
        if self.max_id == 0 {
            None
        } else {
            Some(self.max_id)
        }
    }

    /// Assigns a contiguous block of ids in the given order and returns the
    /// freshly stored rows.
    pub fn append(&mut self, candidates: Vec<Candidate>) -> &[PredictionRecord] {
        let start = self.records.len();
        let next_id = self.next_id();
        self.records.extend(
            candidates
                .into_iter()
                .enumerate()
                .map(|(i, candidate)| PredictionRecord::from_candidate(next_id + i as u64, candidate)),
        );
        if let Some(last) = self.records[start..].last() {
            self.max_id = last.prediction_id;
        }
        &self.records[start..]
    }

    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&PredictionRecord) -> bool,
    {
        self.records.retain(f);
    }

    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PredictionRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
