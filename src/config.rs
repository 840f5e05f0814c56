//! Search configuration
//!
//! Loaded from an optional JSON file; every field has a default and CLI flags
//! override what the file sets.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::geo::DistanceCalc;
use crate::search::SearchLimits;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("epsilon must be a positive finite number, got {0}")]
    InvalidEpsilon(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Order open entries by weight plus estimate instead of weight alone
    pub use_heuristic_for_node_order: bool,
    pub distance_calc: DistanceCalc,
    /// Scale factor on the beeline estimate, 1.0 keeps it admissible
    pub epsilon: f64,
    pub max_visited_nodes: Option<usize>,
    pub timeout_ms: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            use_heuristic_for_node_order: false,
            distance_calc: DistanceCalc::Plane,
            epsilon: 1.0,
            max_visited_nodes: None,
            timeout_ms: None,
        }
    }
}

impl SearchConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(ConfigError::InvalidEpsilon(self.epsilon));
        }
        Ok(())
    }

    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            max_visited_nodes: self.max_visited_nodes,
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = SearchConfig::default();
        assert!(!config.use_heuristic_for_node_order);
        assert_eq!(config.distance_calc, DistanceCalc::Plane);
        assert_eq!(config.limits(), SearchLimits::default());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "use_heuristic_for_node_order": true, "distance_calc": "haversine", "timeout_ms": 250 }}"#
        )
        .unwrap();

        let config = SearchConfig::load(file.path()).unwrap();
        assert!(config.use_heuristic_for_node_order);
        assert_eq!(config.distance_calc, DistanceCalc::Haversine);
        assert_eq!(config.epsilon, 1.0);
        assert_eq!(config.limits().timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.limits().max_visited_nodes, None);
    }

    #[test]
    fn rejects_bad_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "epsilon": 0.0 }}"#).unwrap();
        assert!(matches!(
            SearchConfig::load(file.path()),
            Err(ConfigError::InvalidEpsilon(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "heuristic": true }}"#).unwrap();
        assert!(matches!(
            SearchConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
