use std::time::Duration;

use serde::Deserialize;

/// Settings for a [`ThemeStudio`](crate::ThemeStudio) session.
///
/// Every field has a default, so a partial JSON object (or none at all)
/// produces a usable configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudioConfig {
    /// Query parameter that carries the encoded document.
    pub query_param: String,
    /// Delay before a text field's deferred commit lands, in milliseconds.
    pub commit_delay_ms: u64,
    /// Seed for the random entry factories. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            query_param: "config".to_string(),
            commit_delay_ms: 60,
            seed: None,
        }
    }
}

impl StudioConfig {
    pub fn commit_delay(&self) -> Duration {
        Duration::from_millis(self.commit_delay_ms)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_query_param(mut self, name: impl Into<String>) -> Self {
        self.query_param = name.into();
        self
    }

    /// Parse a JSON configuration object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
