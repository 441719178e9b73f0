//! The persistence side of a submission.
//!
//! The tracker never writes anything itself: the caller submits, then hands
//! the record to the store it was given at start-up.

use std::error::Error;
use std::fmt::Display;

use log::{debug, warn};

use crate::config::Record;

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum StoreError {
    /// A document with this id already exists. Nothing was written.
    DuplicateRecord { record_id: String },
    Backend { message: String },
}

impl Error for StoreError {}

impl Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::DuplicateRecord { record_id } => {
                write!(f, "a record with id {} is already stored", record_id)
            }
            StoreError::Backend { message } => write!(f, "storage failure: {}", message),
        }
    }
}

/// A document store receiving one document per completed survey.
pub trait RecordStore {
    fn store(
        &mut self,
        record_id: &str,
        submitted_at: &str,
        record: &Record,
    ) -> Result<(), StoreError>;
}

/// A document as kept by [`MemoryStore`].
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StoredDocument {
    pub record_id: String,
    pub submitted_at: String,
    pub record: Record,
}

/// Keeps the documents in memory, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub documents: Vec<StoredDocument>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn get(&self, record_id: &str) -> Option<&StoredDocument> {
        self.documents.iter().find(|d| d.record_id == record_id)
    }
}

impl RecordStore for MemoryStore {
    fn store(
        &mut self,
        record_id: &str,
        submitted_at: &str,
        record: &Record,
    ) -> Result<(), StoreError> {
        if self.get(record_id).is_some() {
            warn!("MemoryStore: refusing to overwrite record {}", record_id);
            return Err(StoreError::DuplicateRecord {
                record_id: record_id.to_string(),
            });
        }
        debug!("MemoryStore: storing record {}", record_id);
        self.documents.push(StoredDocument {
            record_id: record_id.to_string(),
            submitted_at: submitted_at.to_string(),
            record: record.clone(),
        });
        Ok(())
    }
}

/// Builds the control number of a session: `ID_<timestamp>_<suffix>`.
///
/// The control number is drawn when the session starts and becomes the id of
/// the stored record. The suffix is the start of a SHA-256 digest of the
/// timestamp and `seed`, so that two sessions started within the same second
/// get different numbers as long as their seeds differ.
pub fn control_number(timestamp: &str, seed: &str) -> String {
    let hash = sha256::digest(format!("{}/{}", timestamp, seed).as_str());
    format!("ID_{}_{}", timestamp, &hash[..8])
}
