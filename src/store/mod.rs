//! Detection record storage.
//!
//! Every analyzed media file with at least one recognized species becomes a
//! [`DetectionRecord`]. Records live behind the [`RecordStore`] trait so the
//! query engine works the same over the in-memory store used in tests and
//! the JSON file store used by the CLI.

use crate::error::{Error, Result};
use crate::media::MediaType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// A simplified species name paired with how many times it was detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesCount {
    /// Simplified species name.
    pub label: String,
    /// Number of detections of this species in the file.
    pub count: u32,
}

/// One analyzed media file and its recognized species.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionRecord {
    /// Unique record identifier.
    pub file_id: Uuid,
    /// Media type of the source file.
    pub file_type: MediaType,
    /// Location of the original media.
    pub original_url: String,
    /// Location of the annotated output, when one was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotated_url: Option<String>,
    /// Location of the thumbnail, when one was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Recognized species and their counts.
    pub detected_birds: Vec<SpeciesCount>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl DetectionRecord {
    /// Create a record with a fresh id and the current time.
    pub fn new(
        file_type: MediaType,
        original_url: impl Into<String>,
        detected_birds: Vec<SpeciesCount>,
    ) -> Self {
        Self {
            file_id: Uuid::new_v4(),
            file_type,
            original_url: original_url.into(),
            annotated_url: None,
            thumbnail_url: None,
            detected_birds,
            created_at: Utc::now(),
        }
    }

    /// Species counts keyed by lowercase label, for case-insensitive
    /// matching in the query engine.
    pub fn count_map(&self) -> BTreeMap<String, u32> {
        self.detected_birds
            .iter()
            .map(|sc| (sc.label.to_lowercase(), sc.count))
            .collect()
    }
}

/// Storage for detection records.
pub trait RecordStore {
    /// All records, in insertion order.
    fn scan(&self) -> Result<Vec<DetectionRecord>>;

    /// Look up one record by id.
    fn get(&self, file_id: Uuid) -> Result<Option<DetectionRecord>>;

    /// Insert a record, replacing any record with the same id.
    fn put(&mut self, record: DetectionRecord) -> Result<()>;
}

/// In-memory record store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<DetectionRecord>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn scan(&self) -> Result<Vec<DetectionRecord>> {
        Ok(self.records.clone())
    }

    fn get(&self, file_id: Uuid) -> Result<Option<DetectionRecord>> {
        Ok(self.records.iter().find(|r| r.file_id == file_id).cloned())
    }

    fn put(&mut self, record: DetectionRecord) -> Result<()> {
        if let Some(existing) = self.records.iter_mut().find(|r| r.file_id == record.file_id) {
            *existing = record;
        } else {
            self.records.push(record);
        }
        Ok(())
    }
}

/// Record store backed by a JSON file.
///
/// The whole record list is read on open and rewritten on every `put`.
/// A missing file reads as an empty store.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    records: Vec<DetectionRecord>,
}

impl JsonStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = if path.exists() {
            let data = fs::read_to_string(&path).map_err(|e| Error::StoreRead {
                path: path.clone(),
                source: e,
            })?;
            serde_json::from_str(&data).map_err(|e| Error::StoreParse {
                path: path.clone(),
                source: e,
            })?
        } else {
            Vec::new()
        };
        debug!(path = %path.display(), records = records.len(), "opened record store");
        Ok(Self { path, records })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        let data = serde_json::to_string_pretty(&self.records).map_err(|e| Error::StoreWrite {
            path: self.path.clone(),
            source: Box::new(e),
        })?;
        fs::write(&self.path, data).map_err(|e| Error::StoreWrite {
            path: self.path.clone(),
            source: Box::new(e),
        })
    }
}

impl RecordStore for JsonStore {
    fn scan(&self) -> Result<Vec<DetectionRecord>> {
        Ok(self.records.clone())
    }

    fn get(&self, file_id: Uuid) -> Result<Option<DetectionRecord>> {
        Ok(self.records.iter().find(|r| r.file_id == file_id).cloned())
    }

    fn put(&mut self, record: DetectionRecord) -> Result<()> {
        if let Some(existing) = self.records.iter_mut().find(|r| r.file_id == record.file_id) {
            *existing = record;
        } else {
            self.records.push(record);
        }
        self.persist()
    }
}
