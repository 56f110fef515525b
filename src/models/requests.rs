use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// Request to run a matching round
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RunMatchingRequest {
    /// Raw survey records, one JSON object per participant
    #[serde(default)]
    pub participants: Vec<Map<String, Value>>,
    /// Fixes the random source for a reproducible run
    #[serde(default)]
    pub seed: Option<u64>,
    /// Overrides the configured per-person connection cap
    #[validate(range(min = 1, max = 16))]
    #[serde(default, alias = "max_connections", rename = "maxConnections")]
    pub max_connections: Option<u16>,
}
