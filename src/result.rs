//! Search result record handed to the coordinator.

use serde::{Deserialize, Serialize};

/// A derived address together with the key that produces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub address: String,
    pub private_key_hex: String,
    #[serde(rename = "privateKeyWIF")]
    pub private_key_wif: String,
    /// Attempts made by the unit up to and including this match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<usize>,
}

impl SearchResult {
    /// Attaches the attempt counter and unit that produced a match.
    pub fn with_origin(mut self, attempts: u64, unit_id: usize) -> Self {
        self.attempts = Some(attempts);
        self.unit_id = Some(unit_id);
        self
    }
}
