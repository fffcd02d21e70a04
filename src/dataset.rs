//! Versioned dataset container: serialization, validation, and file naming.
//!
//! A `Dataset` is materialized from a sample list at export time and is the
//! only persisted artifact of a session. Loading is all-or-nothing: a
//! document that fails the version or content checks is rejected whole,
//! never partially imported.

use chrono::{DateTime, Datelike, Local, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sample::Sample;

/// Exact version a loaded document must carry. No migration path: anything
/// else is rejected.
pub const FORMAT_VERSION: &str = "1.0.0";

/// Human-readable account of the record shape, embedded in every export.
const DESCRIPTION: &str = "Each sample carries its metadata and a list of strokes. \
    Each stroke is a list of points of the form {\"x\": 50, \"y\": 60, \"time\": 1620}; \
    where 0 <= x <= frameWidth, 0 <= y <= frameHeight, and 'time' is in milliseconds, \
    potentially shifted to start at zero.";

/// Portable container for a set of samples.
///
/// `sample_count` duplicates `samples.len()` so the size of a file can be
/// read without parsing the whole sample list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub format_version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub frame_margin: f64,
    #[serde(default)]
    pub sample_count: usize,
    #[serde(default)]
    pub samples: Vec<Sample>,
}

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("dataset is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("incompatible dataset version: found '{found}', expected '{expected}'")]
    VersionMismatch { found: String, expected: &'static str },

    #[error("no samples found in the dataset")]
    Empty,
}

/// Wraps a sample list into a dataset carrying the current format version.
pub fn serialize(samples: &[Sample], frame_margin: f64) -> Dataset {
    Dataset {
        format_version: FORMAT_VERSION.to_string(),
        description: DESCRIPTION.to_string(),
        frame_margin,
        sample_count: samples.len(),
        samples: samples.to_vec(),
    }
}

/// Renders a dataset as a JSON document.
pub fn to_json(dataset: &Dataset) -> Result<String, DatasetError> {
    Ok(serde_json::to_string(dataset)?)
}

/// Parses and validates a dataset document.
///
/// Fails with `Parse` on malformed JSON or malformed sample records, with
/// `VersionMismatch` unless the version matches [`FORMAT_VERSION`] exactly,
/// and with `Empty` when `samples` is missing or has zero length.
pub fn deserialize(raw: &str) -> Result<Dataset, DatasetError> {
    let dataset: Dataset = serde_json::from_str(raw)?;
    if dataset.format_version != FORMAT_VERSION {
        return Err(DatasetError::VersionMismatch {
            found: dataset.format_version,
            expected: FORMAT_VERSION,
        });
    }
    if dataset.samples.is_empty() {
        return Err(DatasetError::Empty);
    }
    Ok(dataset)
}

/// Export file name, e.g. `output-2021-05-06-09-46-43.json` (local time).
pub fn export_filename(now: DateTime<Local>) -> String {
    format!(
        "output-{:04}-{:02}-{:02}-{:02}-{:02}-{:02}.json",
        now.year(),
        now.month(),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::Point;
    use chrono::TimeZone;

    fn sample_list() -> Vec<Sample> {
        vec![
            Sample::build(
                0,
                "\\sum",
                "U+2211",
                300,
                300,
                vec![vec![Point::new(30, 30, 0), Point::new(270, 270, 40)]],
            ),
            Sample::build(1, "\\alpha", "U+3B1", 300, 300, vec![vec![Point::new(150, 150, 0)]]),
        ]
    }

    #[test]
    fn test_round_trip_preserves_samples() {
        let samples = sample_list();
        let dataset = serialize(&samples, 0.1);
        let json = to_json(&dataset).unwrap();
        let restored = deserialize(&json).unwrap();

        assert_eq!(restored.sample_count, samples.len());
        assert_eq!(restored.samples, samples);
        assert_eq!(restored.format_version, FORMAT_VERSION);
        assert_eq!(restored.frame_margin, 0.1);
    }

    #[test]
    fn test_deserialize_rejects_invalid_json() {
        assert!(matches!(deserialize("not json {"), Err(DatasetError::Parse(_))));
    }

    #[test]
    fn test_deserialize_rejects_version_mismatch() {
        let mut dataset = serialize(&sample_list(), 0.1);
        dataset.format_version = "0.9.0".to_string();
        let json = to_json(&dataset).unwrap();
        match deserialize(&json) {
            Err(DatasetError::VersionMismatch { found, expected }) => {
                assert_eq!(found, "0.9.0");
                assert_eq!(expected, FORMAT_VERSION);
            }
            other => panic!("expected a version mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_deserialize_rejects_missing_version_field() {
        let json = format!(
            r#"{{"samples": {}}}"#,
            serde_json::to_string(&sample_list()).unwrap()
        );
        assert!(matches!(
            deserialize(&json),
            Err(DatasetError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_deserialize_rejects_missing_or_empty_samples() {
        let no_samples = format!(r#"{{"formatVersion": "{FORMAT_VERSION}"}}"#);
        assert!(matches!(deserialize(&no_samples), Err(DatasetError::Empty)));

        let empty_samples =
            format!(r#"{{"formatVersion": "{FORMAT_VERSION}", "samples": []}}"#);
        assert!(matches!(deserialize(&empty_samples), Err(DatasetError::Empty)));
    }

    #[test]
    fn test_deserialize_rejects_malformed_sample_record() {
        let json = format!(
            r#"{{"formatVersion": "{FORMAT_VERSION}", "samples": [{{"id": 0}}]}}"#
        );
        assert!(matches!(deserialize(&json), Err(DatasetError::Parse(_))));
    }

    #[test]
    fn test_export_filename_zero_padding() {
        let now = Local.with_ymd_and_hms(2021, 5, 6, 9, 4, 3).unwrap();
        assert_eq!(export_filename(now), "output-2021-05-06-09-04-03.json");
    }
}
