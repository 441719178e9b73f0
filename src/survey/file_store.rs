use std::fs::File;
use std::io::{ErrorKind, Write};

use serde_json::json;
use survey_tracker::store::{RecordStore, StoreError};

use crate::survey::*;

/// Where the documents go.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum StoreTarget {
    Directory(PathBuf),
    Stdout,
}

/// A document store keeping one JSON file per survey:
/// `<directory>/<collection>/<record id>.json`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct JsonFileStore {
    pub target: StoreTarget,
    pub collection: String,
}

impl JsonFileStore {
    /// `location` is a directory, or `stdout` to print the documents.
    pub fn new(location: &str, collection: &str) -> JsonFileStore {
        let target = if location == "stdout" {
            StoreTarget::Stdout
        } else {
            StoreTarget::Directory(PathBuf::from(location))
        };
        JsonFileStore {
            target,
            collection: collection.to_string(),
        }
    }

    pub fn document_path(&self, record_id: &str) -> Option<PathBuf> {
        match &self.target {
            StoreTarget::Directory(dir) => Some(
                dir.join(&self.collection)
                    .join(format!("{}.json", record_id)),
            ),
            StoreTarget::Stdout => None,
        }
    }
}

fn backend_error(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend {
        message: e.to_string(),
    }
}

fn partial_path(path: &Path) -> PathBuf {
    path.with_extension("json.partial")
}

// The document is written next to its final place, then linked in. The link
// fails if the document already exists. The partial file is removed in all
// cases.
fn write_new_file<F>(record_id: &str, path: &Path, fill: F) -> Result<(), StoreError>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let tmp = partial_path(path);
    let written = File::create(&tmp)
        .and_then(|mut f| {
            fill(&mut f)?;
            f.sync_all()
        })
        .map_err(backend_error);
    let res = written.and_then(|_| match fs::hard_link(&tmp, path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(StoreError::DuplicateRecord {
            record_id: record_id.to_string(),
        }),
        Err(e) => Err(backend_error(e)),
    });
    if let Err(e) = fs::remove_file(&tmp) {
        debug!("write_new_file: could not remove {}: {}", tmp.display(), e);
    }
    res
}

impl RecordStore for JsonFileStore {
    fn store(
        &mut self,
        record_id: &str,
        submitted_at: &str,
        record: &Record,
    ) -> Result<(), StoreError> {
        let doc = build_document_js(record_id, submitted_at, record);
        let pretty = serde_json::to_string_pretty(&doc).map_err(backend_error)?;
        let path = match self.document_path(record_id) {
            Some(p) => p,
            None => {
                println!("{}", pretty);
                return Ok(());
            }
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(backend_error)?;
        }
        // Existing documents are never replaced.
        if path.exists() {
            return Err(StoreError::DuplicateRecord {
                record_id: record_id.to_string(),
            });
        }
        write_new_file(record_id, &path, |f| f.write_all(pretty.as_bytes()))?;
        info!("Stored survey {} in {}", record_id, path.display());
        Ok(())
    }
}

pub fn answers_js(record: &Record) -> JSValue {
    let mut answers: JSMap<String, JSValue> = JSMap::new();
    for (field_id, value) in record.fields.iter() {
        answers.insert(field_id.clone(), json!(value));
    }
    JSValue::Object(answers)
}

pub fn build_document_js(record_id: &str, submitted_at: &str, record: &Record) -> JSValue {
    json!({
        "ID": record_id,
        "fechaHora": submitted_at,
        "answers": answers_js(record),
    })
}
