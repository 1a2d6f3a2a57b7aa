//! Tunables for a run, optionally loaded from a YAML file.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```yaml
//! workers: 8
//! annotation_marker: "{{IPA"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Number of parser worker threads.
    pub workers: usize,
    /// Work queue slots per worker.
    pub work_queue_per_worker: usize,
    /// Result queue slots per worker.
    pub result_queue_per_worker: usize,
    /// Capacity of the buffered output sink, in bytes.
    pub output_buffer_size: usize,
    /// Titles containing this are meta pages and never produce entries.
    pub namespace_marker: String,
    /// Body text is only buffered once a chunk contains this.
    pub annotation_marker: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: 4,
            work_queue_per_worker: 10_000,
            result_queue_per_worker: 1_000,
            output_buffer_size: 8 * 1024 * 1024,
            namespace_marker: "Wiktionary".to_string(),
            annotation_marker: "IPA".to_string(),
        }
    }
}

impl Config {
    /// Load and validate a YAML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(ExtractError::InvalidConfig("workers must be at least 1".into()));
        }
        if self.work_queue_per_worker == 0 || self.result_queue_per_worker == 0 {
            return Err(ExtractError::InvalidConfig(
                "queue sizes per worker must be at least 1".into(),
            ));
        }
        if self.output_buffer_size == 0 {
            return Err(ExtractError::InvalidConfig(
                "output_buffer_size must be at least 1".into(),
            ));
        }
        if self.namespace_marker.is_empty() || self.annotation_marker.is_empty() {
            return Err(ExtractError::InvalidConfig("markers must not be empty".into()));
        }
        Ok(())
    }

    pub fn work_queue_capacity(&self) -> usize {
        self.workers.saturating_mul(self.work_queue_per_worker)
    }

    pub fn result_queue_capacity(&self) -> usize {
        self.workers.saturating_mul(self.result_queue_per_worker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_size_queues_from_worker_count() {
        let config = Config::default();
        assert_eq!(config.workers, 4);
        assert_eq!(config.work_queue_capacity(), 40_000);
        assert_eq!(config.result_queue_capacity(), 4_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("workers: 8\nannotation_marker: \"{{IPA\"\n").unwrap();
        assert_eq!(config.workers, 8);
        assert_eq!(config.annotation_marker, "{{IPA");
        assert_eq!(config.namespace_marker, "Wiktionary");
        assert_eq!(config.work_queue_capacity(), 80_000);
    }

    #[test]
    fn zero_workers_rejected() {
        let err = Config::from_yaml("workers: 0").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }

    #[test]
    fn empty_marker_rejected() {
        let err = Config::from_yaml("namespace_marker: \"\"").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }

    #[test]
    fn unknown_key_rejected() {
        let err = Config::from_yaml("threads: 2").unwrap_err();
        assert!(matches!(err, ExtractError::Yaml(_)));
    }
}
