//! Configuration for the analyzer pipeline
//!
//! Parameters can come from an optional JSON file and are overridden by
//! command line flags. Validation happens exactly once before any thread is
//! spawned; the pipeline never re-checks parameters per call.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::spectrum::Reduction;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Sound capture frequency in Hz
    pub frequency: u32,
    /// Number of samples captured per block (= FFT size = bin count)
    pub samples_per_block: usize,
    /// Number of previous blocks taken into account
    pub history_size: usize,
    /// Analysis loop interval in milliseconds
    pub analysis_interval_ms: u64,
    /// Static minimum peak value; superseded by the adaptive threshold on
    /// every cycle
    pub min_peak_value: f32,
    /// Number of strongest peaks retained per cycle
    pub top_peaks: usize,
    /// Per-bin reduction across the history window
    pub reduction: Reduction,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            frequency: 44100,
            samples_per_block: 2048,
            history_size: 3,
            analysis_interval_ms: 10,
            min_peak_value: 0.0,
            top_peaks: 5,
            reduction: Reduction::Min,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a JSON file.
    ///
    /// A missing or unparseable file falls back to defaults with a warning,
    /// so a stale config never blocks startup; validation still runs on the
    /// merged result.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "failed to parse config {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Reject parameter combinations that would make spectrum indexing or
    /// scheduling undefined.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frequency == 0 {
            return Err(ConfigError::ZeroFrequency);
        }
        if self.samples_per_block < 2 {
            return Err(ConfigError::BlockTooShort {
                samples: self.samples_per_block,
            });
        }
        if self.history_size == 0 {
            return Err(ConfigError::ZeroHistorySize);
        }
        if self.analysis_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.top_peaks == 0 {
            return Err(ConfigError::ZeroTopPeaks);
        }
        Ok(())
    }

    /// Duration of one captured block at the configured rate.
    pub fn block_duration_secs(&self) -> f64 {
        self.samples_per_block as f64 / self.frequency as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.frequency, 44100);
        assert_eq!(config.samples_per_block, 2048);
        assert_eq!(config.history_size, 3);
        assert_eq!(config.analysis_interval_ms, 10);
        assert_eq!(config.top_peaks, 5);
        assert_eq!(config.reduction, Reduction::Min);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AnalyzerConfig {
            reduction: Reduction::Max,
            top_peaks: 7,
            ..AnalyzerConfig::default()
        };
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AnalyzerConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.top_peaks, 7);
        assert_eq!(parsed.reduction, Reduction::Max);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed: AnalyzerConfig = serde_json::from_str(r#"{"history_size": 8}"#).unwrap();
        assert_eq!(parsed.history_size, 8);
        assert_eq!(parsed.frequency, 44100);
    }

    #[test]
    fn test_validation_rejects_degenerate_values() {
        let mut config = AnalyzerConfig {
            history_size: 0,
            ..AnalyzerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroHistorySize)
        ));

        config.history_size = 3;
        config.top_peaks = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTopPeaks)));

        config.top_peaks = 5;
        config.samples_per_block = 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BlockTooShort { samples: 1 })
        ));

        config.samples_per_block = 2048;
        config.analysis_interval_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroInterval)));
    }

    #[test]
    fn test_block_duration() {
        let config = AnalyzerConfig::default();
        let expected = 2048.0 / 44100.0;
        assert!((config.block_duration_secs() - expected).abs() < 1e-9);
    }
}
