// Error types for the tonewatch analyzer
//
// Configuration errors are fatal at startup: the analyzer refuses to run
// with parameters that would make spectrum indexing undefined. Capture and
// analysis errors are runtime conditions surfaced to the caller.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Startup configuration errors
///
/// Every variant is fatal: validation happens once before any thread is
/// spawned, never per capture callback.
#[derive(Debug)]
pub enum ConfigError {
    /// History capacity must hold at least one spectrum
    ZeroHistorySize,

    /// Top-K capacity must retain at least one peak
    ZeroTopPeaks,

    /// A block needs at least two samples to have analyzable bins
    BlockTooShort { samples: usize },

    /// Capture sample rate must be positive
    ZeroFrequency,

    /// Analysis interval must be positive
    ZeroInterval,

    /// Tone definition file could not be read
    ToneFileRead { path: PathBuf, source: io::Error },

    /// Tone definition file produced no usable entries
    EmptyCatalogue { path: PathBuf },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroHistorySize => {
                write!(f, "history-size must be greater than 0")
            }
            ConfigError::ZeroTopPeaks => {
                write!(f, "top-peaks must be greater than 0")
            }
            ConfigError::BlockTooShort { samples } => {
                write!(f, "samples per block must be at least 2 (got {})", samples)
            }
            ConfigError::ZeroFrequency => {
                write!(f, "capture frequency must be greater than 0")
            }
            ConfigError::ZeroInterval => {
                write!(f, "analysis interval must be greater than 0")
            }
            ConfigError::ToneFileRead { path, source } => {
                write!(f, "failed to read tone file {}: {}", path.display(), source)
            }
            ConfigError::EmptyCatalogue { path } => {
                write!(f, "tone file {} contains no usable entries", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ToneFileRead { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Audio capture errors
///
/// These cover opening and controlling the cpal input stream.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureError {
    /// No default input device is available
    NoInputDevice,

    /// Input device enumeration failed
    DeviceEnumerationFailed { reason: String },

    /// Device default format is not supported
    UnsupportedFormat { format: String },

    /// Failed to open the input stream
    StreamOpenFailed { reason: String },

    /// Failed to start the input stream
    StreamStartFailed { reason: String },

    /// Failed to pause or resume the input stream
    StreamControlFailed { reason: String },
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::NoInputDevice => {
                write!(f, "no default input device found")
            }
            CaptureError::DeviceEnumerationFailed { reason } => {
                write!(f, "failed to enumerate input devices: {}", reason)
            }
            CaptureError::UnsupportedFormat { format } => {
                write!(f, "unsupported input sample format: {}", format)
            }
            CaptureError::StreamOpenFailed { reason } => {
                write!(f, "failed to open input stream: {}", reason)
            }
            CaptureError::StreamStartFailed { reason } => {
                write!(f, "failed to start input stream: {}", reason)
            }
            CaptureError::StreamControlFailed { reason } => {
                write!(f, "failed to control input stream: {}", reason)
            }
        }
    }
}

impl std::error::Error for CaptureError {}

/// Analysis loop errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The spectrum history mutex was poisoned by a panicking writer
    HistoryLockPoisoned,

    /// The report receiver was dropped; there is nobody left to notify
    ReportChannelClosed,
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::HistoryLockPoisoned => {
                write!(f, "spectrum history lock poisoned")
            }
            AnalysisError::ReportChannelClosed => {
                write!(f, "detection report channel closed")
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::ZeroHistorySize;
        assert!(err.to_string().contains("history-size"));

        let err = ConfigError::BlockTooShort { samples: 1 };
        assert!(err.to_string().contains("got 1"));

        let err = ConfigError::EmptyCatalogue {
            path: PathBuf::from("tones.conf"),
        };
        assert!(err.to_string().contains("tones.conf"));
    }

    #[test]
    fn test_tone_file_error_preserves_source() {
        let err = ConfigError::ToneFileRead {
            path: PathBuf::from("missing.conf"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("missing.conf"));
    }

    #[test]
    fn test_capture_error_messages() {
        let err = CaptureError::UnsupportedFormat {
            format: "I16".to_string(),
        };
        assert!(err.to_string().contains("I16"));

        let err = CaptureError::StreamOpenFailed {
            reason: "busy".to_string(),
        };
        assert!(err.to_string().contains("busy"));
    }
}
