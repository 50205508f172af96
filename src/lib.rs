// Tonewatch - real-time audio spectrum analyzer with tone detection
// Capture thread fills a shared spectrum ring; a polling analysis loop
// reduces it, extracts peaks and reports debounced tone matches.

pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod offline;
pub mod spectrum;

pub use analysis::{AnalysisWorker, DetectionReport};
pub use config::AnalyzerConfig;
pub use spectrum::{MagnitudeAggregator, Reduction, SpectrumHistory};
