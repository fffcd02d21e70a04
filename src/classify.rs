//! HTTP client for the external classification backend.
//!
//! The backend fronts one or more scoring services (e.g. `hwrt`, `detexify`)
//! and optional symbol mappings. This client issues one request per action
//! and never retries: a transport failure is surfaced to the caller as a
//! single message distinguishing an unreachable backend from a named service
//! failing. Whether raw or normalized strokes are sent is an explicit caller
//! choice, not a hidden default.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::geometry;
use crate::stroke::StrokeSet;

/// Metadata listing calls are expected to answer quickly.
pub const METADATA_TIMEOUT: Duration = Duration::from_millis(500);
/// Classification itself may run a real model.
pub const CLASSIFY_TIMEOUT: Duration = Duration::from_secs(5);
/// Ranked predictions are truncated to this many entries for display.
pub const MAX_DISPLAYED_RESULTS: usize = 10;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("cannot classify without any strokes")]
    EmptyStrokes,

    #[error("failed to initialize the HTTP client: {0}")]
    Init(#[source] reqwest::Error),

    #[error("classification backend unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("classification backend returned status {status} for {endpoint}")]
    BackendFailure { endpoint: String, status: u16 },

    #[error("service '{service}' failed (status {status})")]
    ServiceFailure { service: String, status: u16 },

    #[error("unexpected response from the classification backend: {0}")]
    BadResponse(#[source] reqwest::Error),
}

/// Which stroke representation to send to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokePreprocessing {
    /// Strokes exactly as captured, frame-relative.
    Raw,
    /// Strokes rescaled and recentered into the frame first.
    Normalized,
}

/// How a service's scores are meant to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreKind {
    /// 0-1 probability, shown as a percentage.
    Probability,
    /// Distance-like value, shown verbatim (lower is better).
    Distance,
}

/// Score semantics are a property of the scoring service, not of the
/// response, so the client has to know them per service.
pub fn score_kind(service: &str) -> ScoreKind {
    match service {
        "detexify" => ScoreKind::Distance,
        _ => ScoreKind::Probability,
    }
}

/// Formats a score the way the given service intends it to be displayed.
pub fn format_score(service: &str, score: f64) -> String {
    match score_kind(service) {
        ScoreKind::Probability => format!("{:.2} %", 100.0 * score),
        ScoreKind::Distance => format!("{score}"),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServicesAndMappings {
    pub services: Vec<String>,
    #[serde(default)]
    pub mappings: Vec<String>,
}

/// One supported symbol, as listed by `GET /symbols/<service>`.
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolEntry {
    pub symbol_class: String,
    #[serde(default)]
    pub unicode: String,
    #[serde(default)]
    pub package: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyRequest<'a> {
    frame_width: u32,
    frame_height: u32,
    service: &'a str,
    mapping: &'a str,
    strokes: &'a StrokeSet,
}

/// One candidate as returned by the backend. `dataset_id` and `raw_answers`
/// are service-dependent extras and are ignored beyond parsing.
#[derive(Debug, Clone, Deserialize)]
struct RawGuess {
    symbol_class: String,
    #[serde(default)]
    unicode: String,
    score: f64,
    #[serde(default)]
    #[allow(dead_code)]
    dataset_id: Option<serde_json::Value>,
    #[serde(default)]
    #[allow(dead_code)]
    raw_answers: Option<serde_json::Value>,
}

/// A ranked symbol prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub symbol_label: String,
    pub unicode: String,
    pub score: f64,
}

impl From<RawGuess> for Classification {
    fn from(guess: RawGuess) -> Self {
        Self {
            symbol_label: guess.symbol_class,
            unicode: guess.unicode,
            score: guess.score,
        }
    }
}

/// Blocking client for the classification backend. Callers that must not
/// stall (the GUI) run its methods on a worker thread.
pub struct ClassifyClient {
    base_url: String,
    http: reqwest::blocking::Client,
    max_results: usize,
}

impl ClassifyClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClassifyError> {
        let http = reqwest::blocking::Client::builder()
            .build()
            .map_err(ClassifyError::Init)?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            max_results: MAX_DISPLAYED_RESULTS,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lists the services and mappings the backend currently fronts.
    pub fn services_and_mappings(&self) -> Result<ServicesAndMappings, ClassifyError> {
        let endpoint = "services-and-mappings";
        let response = self
            .http
            .get(format!("{}/{endpoint}", self.base_url))
            .timeout(METADATA_TIMEOUT)
            .send()
            .map_err(ClassifyError::Unreachable)?;
        if !response.status().is_success() {
            return Err(ClassifyError::BackendFailure {
                endpoint: endpoint.to_string(),
                status: response.status().as_u16(),
            });
        }
        response.json().map_err(ClassifyError::BadResponse)
    }

    /// Ordered list of symbols supported by a service, optionally projected
    /// through a mapping.
    pub fn symbols(
        &self,
        service: &str,
        mapping: Option<&str>,
    ) -> Result<Vec<SymbolEntry>, ClassifyError> {
        let url = self.symbols_url(service, mapping);
        let response = self
            .http
            .get(&url)
            .timeout(METADATA_TIMEOUT)
            .send()
            .map_err(ClassifyError::Unreachable)?;
        if !response.status().is_success() {
            return Err(ClassifyError::ServiceFailure {
                service: service.to_string(),
                status: response.status().as_u16(),
            });
        }
        response.json().map_err(ClassifyError::BadResponse)
    }

    /// Scores a gesture against a service's known symbol classes.
    ///
    /// An empty gesture is rejected locally, before any network traffic.
    /// Predictions come back in the backend's ranking order and are truncated
    /// to the display cap.
    pub fn classify(
        &self,
        service: &str,
        mapping: &str,
        frame_width: u32,
        frame_height: u32,
        frame_margin: f64,
        strokes: &StrokeSet,
        preprocessing: StrokePreprocessing,
    ) -> Result<Vec<Classification>, ClassifyError> {
        if strokes.is_empty() {
            return Err(ClassifyError::EmptyStrokes);
        }

        let normalized;
        let payload = match preprocessing {
            StrokePreprocessing::Raw => strokes,
            StrokePreprocessing::Normalized => {
                normalized = geometry::normalize(frame_width, frame_height, frame_margin, strokes);
                &normalized
            }
        };
        let request = ClassifyRequest {
            frame_width,
            frame_height,
            service,
            mapping,
            strokes: payload,
        };
        debug!(service, mapping, strokes = payload.len(), "sending classify request");

        let response = self
            .http
            .post(format!("{}/classify", self.base_url))
            .timeout(CLASSIFY_TIMEOUT)
            .json(&request)
            .send()
            .map_err(ClassifyError::Unreachable)?;
        if !response.status().is_success() {
            return Err(ClassifyError::ServiceFailure {
                service: service.to_string(),
                status: response.status().as_u16(),
            });
        }
        let guesses: Vec<RawGuess> = response.json().map_err(ClassifyError::BadResponse)?;
        Ok(rank(guesses, self.max_results))
    }

    fn symbols_url(&self, service: &str, mapping: Option<&str>) -> String {
        match mapping {
            Some(mapping) if !mapping.is_empty() => {
                format!("{}/symbols/{service}/{mapping}", self.base_url)
            }
            _ => format!("{}/symbols/{service}", self.base_url),
        }
    }
}

/// Keeps the backend's ranking order and truncates to the display cap.
fn rank(guesses: Vec<RawGuess>, limit: usize) -> Vec<Classification> {
    guesses
        .into_iter()
        .take(limit)
        .map(Classification::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::Point;

    fn client() -> ClassifyClient {
        // Nothing listens here; tests only exercise the local paths.
        ClassifyClient::new("http://127.0.0.1:9/").unwrap()
    }

    #[test]
    fn test_empty_strokes_rejected_without_network() {
        let err = client()
            .classify("hwrt", "none", 300, 300, 0.1, &Vec::new(), StrokePreprocessing::Raw)
            .unwrap_err();
        assert!(matches!(err, ClassifyError::EmptyStrokes));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(client().base_url(), "http://127.0.0.1:9");
    }

    #[test]
    fn test_symbols_url_with_and_without_mapping() {
        let client = client();
        assert_eq!(
            client.symbols_url("hwrt", None),
            "http://127.0.0.1:9/symbols/hwrt"
        );
        assert_eq!(
            client.symbols_url("hwrt", Some("similar-0")),
            "http://127.0.0.1:9/symbols/hwrt/similar-0"
        );
        assert_eq!(
            client.symbols_url("hwrt", Some("")),
            "http://127.0.0.1:9/symbols/hwrt"
        );
    }

    #[test]
    fn test_classify_request_wire_shape() {
        let strokes: StrokeSet = vec![vec![Point::new(50, 60, 0)]];
        let request = ClassifyRequest {
            frame_width: 300,
            frame_height: 200,
            service: "hwrt",
            mapping: "none",
            strokes: &strokes,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(
            json,
            r#"{"frameWidth":300,"frameHeight":200,"service":"hwrt","mapping":"none","strokes":[[{"x":50,"y":60,"time":0}]]}"#
        );
    }

    #[test]
    fn test_rank_preserves_order_and_truncates() {
        let raw = r#"[
            {"symbol_class": "\\sum", "unicode": "U+2211", "score": 0.8},
            {"symbol_class": "\\Sigma", "unicode": "U+3A3", "score": 0.15, "dataset_id": 31},
            {"symbol_class": "\\int", "unicode": "U+222B", "score": 0.05, "raw_answers": []}
        ]"#;
        let guesses: Vec<RawGuess> = serde_json::from_str(raw).unwrap();
        let ranked = rank(guesses, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].symbol_label, "\\sum");
        assert_eq!(ranked[0].unicode, "U+2211");
        assert_eq!(ranked[1].symbol_label, "\\Sigma");
    }

    #[test]
    fn test_guess_optional_fields_default() {
        let guess: RawGuess =
            serde_json::from_str(r#"{"symbol_class": "\\sim", "score": 1.5}"#).unwrap();
        assert_eq!(guess.unicode, "");
        assert!(guess.dataset_id.is_none());
    }

    #[test]
    fn test_score_kind_per_service() {
        assert_eq!(score_kind("hwrt"), ScoreKind::Probability);
        assert_eq!(score_kind("detexify"), ScoreKind::Distance);
    }

    #[test]
    fn test_format_score_probability_vs_distance() {
        assert_eq!(format_score("hwrt", 0.8731), "87.31 %");
        assert_eq!(format_score("detexify", 1.5), "1.5");
    }
}
