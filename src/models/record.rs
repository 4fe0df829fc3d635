//! Record model and the identifiers used by both stores.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use ulid::Ulid;

/// Identifier of a record in the legacy store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegacyRecordId(pub i64);

impl std::fmt::Display for LegacyRecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Key assigned by the new store when a record is inserted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewRecordKey(String);

impl NewRecordKey {
    /// Generates a fresh key (ULID).
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for NewRecordKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl std::fmt::Display for NewRecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Download state of a record.
///
/// Only non-ignored records are considered migrable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    #[default]
    Downloaded,
    Downloading,
    Paused,
    Error,
    Ignored,
}

impl RecordStatus {
    /// Returns the stored string form of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Downloaded => "downloaded",
            RecordStatus::Downloading => "downloading",
            RecordStatus::Paused => "paused",
            RecordStatus::Error => "error",
            RecordStatus::Ignored => "ignored",
        }
    }

    /// Whether records with this status take part in a migration.
    pub fn is_migrable(&self) -> bool {
        !matches!(self, RecordStatus::Ignored)
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "downloaded" => Ok(RecordStatus::Downloaded),
            "downloading" => Ok(RecordStatus::Downloading),
            "paused" => Ok(RecordStatus::Paused),
            "error" => Ok(RecordStatus::Error),
            "ignored" => Ok(RecordStatus::Ignored),
            _ => Err(format!(
                "Invalid status '{}'. Valid values: downloaded, downloading, paused, error, ignored",
                s
            )),
        }
    }
}

/// A library record moved between stores.
///
/// The engine never inspects the content beyond the title used in
/// trace lines; everything else is copied as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Human-readable title.
    pub title: String,
    /// Locator of the record on its source site.
    pub url: String,
    /// Source site, if known.
    pub site: Option<String>,
    /// Download state.
    #[serde(default)]
    pub status: RecordStatus,
    /// Arbitrary metadata (tags, page counts...) kept verbatim.
    #[serde(default)]
    pub metadata: JsonValue,
}

impl Record {
    /// Creates a downloaded record with no metadata.
    pub fn new(title: impl Into<String>, url: impl Into<String>, site: Option<&str>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            site: site.map(|s| s.to_string()),
            status: RecordStatus::Downloaded,
            metadata: JsonValue::Null,
        }
    }

    /// Stand-in carried by progress events when a record could not be read.
    pub fn placeholder() -> Self {
        Self::new("none", "", None)
    }

    pub fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_record() {
        let record = Record::placeholder();
        assert_eq!(record.title, "none");
        assert_eq!(record.url, "");
        assert!(record.site.is_none());
    }

    #[test]
    fn test_status_round_trip_and_migrable() {
        for status in ["downloaded", "downloading", "paused", "error", "ignored"] {
            let parsed: RecordStatus = status.parse().unwrap();
            assert_eq!(parsed.as_str(), status);
        }
        assert!("saved".parse::<RecordStatus>().is_err());
        assert!(RecordStatus::Error.is_migrable());
        assert!(!RecordStatus::Ignored.is_migrable());
    }

    #[test]
    fn test_generated_keys_are_unique() {
        let a = NewRecordKey::generate();
        let b = NewRecordKey::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 26);
    }

    #[test]
    fn test_record_serialization() {
        let record = Record::new("Title", "/g/1", Some("example"))
            .with_metadata(serde_json::json!({"pages": 12}));
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"status\":\"downloaded\""));
        assert!(json.contains("\"pages\":12"));
    }
}
