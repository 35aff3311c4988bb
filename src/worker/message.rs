//! Messages exchanged between the coordinator and search units.

use serde::{Deserialize, Serialize};

use crate::config::PerformanceConfig;
use crate::crypto::AddressFormat;
use crate::matcher::PatternPosition;
use crate::result::SearchResult;

/// What a unit does with its request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SearchMode {
    /// Generate a fixed number of addresses without matching
    Batch,
    /// Generate until the pattern matches
    #[default]
    PatternSearch,
}

impl From<String> for SearchMode {
    fn from(s: String) -> Self {
        if s == "batch" {
            SearchMode::Batch
        } else {
            SearchMode::PatternSearch
        }
    }
}

impl From<SearchMode> for String {
    fn from(mode: SearchMode) -> Self {
        match mode {
            SearchMode::Batch => "batch".into(),
            SearchMode::PatternSearch => "search".into(),
        }
    }
}

/// Work description for one search unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRequest {
    #[serde(alias = "type")]
    pub mode: SearchMode,
    #[serde(rename = "addressType")]
    pub address_format: AddressFormat,
    pub pattern: Option<String>,
    pub pattern_position: PatternPosition,
    /// Addresses to generate in batch mode
    pub count: usize,
    /// Matches to find in search mode; absent or zero means one
    pub target_count: Option<usize>,
    #[serde(alias = "workerId")]
    pub unit_id: usize,
    /// Used for every address in batch mode instead of random keys
    pub test_private_key: Option<String>,
    pub performance_config: Option<PerformanceConfig>,
}

impl SearchRequest {
    /// A batch request for `count` random addresses.
    pub fn batch(address_format: AddressFormat, count: usize) -> Self {
        Self {
            mode: SearchMode::Batch,
            address_format,
            count,
            ..Self::default()
        }
    }

    /// A pattern search request.
    pub fn search(address_format: AddressFormat, pattern: &str, position: PatternPosition) -> Self {
        Self {
            mode: SearchMode::PatternSearch,
            address_format,
            pattern: Some(pattern.to_string()),
            pattern_position: position,
            ..Self::default()
        }
    }

    pub fn with_unit_id(mut self, unit_id: usize) -> Self {
        self.unit_id = unit_id;
        self
    }

    pub fn with_target_count(mut self, target_count: usize) -> Self {
        self.target_count = Some(target_count);
        self
    }

    pub fn with_test_private_key(mut self, key: &str) -> Self {
        self.test_private_key = Some(key.to_string());
        self
    }

    pub fn with_performance(mut self, performance: PerformanceConfig) -> Self {
        self.performance_config = Some(performance);
        self
    }

    /// Number of matches a search unit stops at.
    pub fn target(&self) -> usize {
        match self.target_count {
            Some(n) if n > 0 => n,
            _ => 1,
        }
    }

    pub fn performance(&self) -> PerformanceConfig {
        self.performance_config.unwrap_or_default()
    }
}

/// All addresses produced by one batch unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub entries: Vec<SearchResult>,
    pub unit_id: usize,
}

/// Periodic search progress. An empty `current_address` marks a unit that
/// ran out of attempts before reaching its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub attempts: u64,
    pub current_address: String,
    pub unit_id: usize,
}

impl Progress {
    pub fn is_exhausted(&self) -> bool {
        self.current_address.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<usize>,
}

/// A message emitted by a search unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum UnitMessage {
    BatchResult(BatchResult),
    #[serde(rename = "result")]
    Match(SearchResult),
    Progress(Progress),
    Error(ErrorReport),
}

impl UnitMessage {
    /// The unit that sent this message, when known.
    pub fn unit_id(&self) -> Option<usize> {
        match self {
            UnitMessage::BatchResult(batch) => Some(batch.unit_id),
            UnitMessage::Match(result) => result.unit_id,
            UnitMessage::Progress(progress) => Some(progress.unit_id),
            UnitMessage::Error(report) => report.unit_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_wire_format() {
        let message = UnitMessage::Progress(Progress {
            attempts: 5,
            current_address: String::new(),
            unit_id: 2,
        });
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "progress",
                "data": {"attempts": 5, "currentAddress": "", "unitId": 2}
            })
        );
        assert_eq!(message.unit_id(), Some(2));
    }

    #[test]
    fn test_match_wire_format() {
        let result = SearchResult {
            address: "1abc".into(),
            private_key_hex: "00".into(),
            private_key_wif: "K".into(),
            attempts: None,
            unit_id: None,
        }
        .with_origin(42, 1);
        let message = UnitMessage::Match(result);
        assert_eq!(message.unit_id(), Some(1));
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "result");
        assert_eq!(json["data"]["privateKeyWIF"], "K");
        assert_eq!(json["data"]["attempts"], 42);
        assert_eq!(json["data"]["unitId"], 1);
    }

    #[test]
    fn test_request_accepts_worker_style_fields() {
        let request: SearchRequest = serde_json::from_str(
            r#"{
                "type": "search",
                "addressType": "p2wpkh",
                "pattern": "abc",
                "patternPosition": "end",
                "workerId": 3,
                "performanceConfig": {"batchSize": 10, "progressInterval": 500}
            }"#,
        )
        .unwrap();
        assert_eq!(request.mode, SearchMode::PatternSearch);
        assert_eq!(request.address_format, AddressFormat::NativeSegwit);
        assert_eq!(request.pattern_position, PatternPosition::End);
        assert_eq!(request.unit_id, 3);
        assert_eq!(request.target(), 1);
        let perf = request.performance();
        assert_eq!(perf.batch_size, 10);
        assert_eq!(perf.progress_interval_attempts, 500);
        assert_eq!(perf.max_attempts, 2_000_000);
    }

    #[test]
    fn test_request_defaults() {
        let request: SearchRequest =
            serde_json::from_str(r#"{"mode": "batch", "addressType": "p2xx", "count": 4}"#).unwrap();
        assert_eq!(request.mode, SearchMode::Batch);
        assert_eq!(request.address_format, AddressFormat::Legacy);
        assert_eq!(request.count, 4);
        assert_eq!(request.performance(), PerformanceConfig::default());
        assert_eq!(request.with_target_count(0).target(), 1);
    }
}
