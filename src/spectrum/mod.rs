// Spectrum module - shared frequency-domain state
//
// SpectrumHistory is the single resource shared between the capture thread
// and the analysis loop; MagnitudeAggregator reduces it into one real-valued
// spectrum per analysis cycle.

pub mod aggregate;
pub mod history;

pub use aggregate::{MagnitudeAggregator, Reduction};
pub use history::SpectrumHistory;
