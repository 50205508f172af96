// Analysis module - polling detection pipeline
//
// The worker runs the per-cycle pipeline against the shared spectrum
// history: aggregate -> extract peaks -> match tones -> debounce -> report.
// Live capture drives it from a dedicated thread at a fixed interval; the
// offline runner calls run_cycle directly with a synthetic clock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub mod debounce;
pub mod peaks;
pub mod tones;

use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, ConfigError};
use crate::spectrum::{MagnitudeAggregator, SpectrumHistory};
use debounce::ToneDebouncer;
use peaks::{Peak, PeakExtractor};
use tones::ToneCatalogue;

/// Log cycle diagnostics every this many cycles at debug level
const LOG_EVERY_N_CYCLES: u64 = 100;

/// One debounced detection, handed to the reporting sink
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DetectionReport {
    /// Space-joined, lexicographically sorted names of detected tones
    pub label: String,
    /// The same names as a list
    pub tones: Vec<String>,
    /// Strongest peak of the cycle, if any
    pub max_peak: Option<Peak>,
    /// Milliseconds since the worker started
    pub elapsed_ms: u64,
}

pub struct AnalysisWorker {
    history: Arc<Mutex<SpectrumHistory>>,
    aggregator: MagnitudeAggregator,
    extractor: PeakExtractor,
    catalogue: ToneCatalogue,
    debouncer: ToneDebouncer,
    reports: Sender<DetectionReport>,
    started: Instant,
    cycles: u64,
}

impl AnalysisWorker {
    pub fn new(
        history: Arc<Mutex<SpectrumHistory>>,
        config: &AnalyzerConfig,
        catalogue: ToneCatalogue,
        reports: Sender<DetectionReport>,
        started: Instant,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            history,
            aggregator: MagnitudeAggregator::new(config.reduction),
            extractor: PeakExtractor::new(config.min_peak_value, config.top_peaks)?,
            catalogue,
            debouncer: ToneDebouncer::new(),
            reports,
            started,
            cycles: 0,
        })
    }

    /// Run one full analysis cycle at the given time.
    ///
    /// The history lock is held only for the aggregation pass; peak
    /// extraction and tone matching run on the private snapshot.
    pub fn run_cycle(&mut self, now: Instant) -> Result<(), AnalysisError> {
        let spectrum = {
            let history = self
                .history
                .lock()
                .map_err(|_| AnalysisError::HistoryLockPoisoned)?;
            self.aggregator.compute(&history)
        };

        self.extractor.update(&spectrum);
        let tones = self.catalogue.detect(self.extractor.peaks());
        let label = tones.join(" ");

        self.cycles += 1;
        if self.cycles % LOG_EVERY_N_CYCLES == 0 {
            log::debug!(
                "cycle {}: {} peaks, threshold {:.3}, label \"{}\"",
                self.cycles,
                self.extractor.peaks().len(),
                self.extractor.threshold(),
                label
            );
        }

        if self.debouncer.update(&label, now) {
            let report = DetectionReport {
                label,
                tones,
                max_peak: self.extractor.max_peak(),
                elapsed_ms: now.duration_since(self.started).as_millis() as u64,
            };
            self.reports
                .send(report)
                .map_err(|_| AnalysisError::ReportChannelClosed)?;
        }

        Ok(())
    }

    /// Spawn the polling loop on its own thread.
    ///
    /// Runs one cycle every `interval` until the shutdown flag is set or a
    /// cycle fails (poisoned history lock, closed report channel).
    pub fn spawn(mut self, interval: Duration, shutdown: Arc<AtomicBool>) -> JoinHandle<()> {
        thread::spawn(move || {
            log::info!("analysis loop started, interval {:?}", interval);
            while !shutdown.load(Ordering::Relaxed) {
                if let Err(err) = self.run_cycle(Instant::now()) {
                    log::error!("analysis loop stopping: {}", err);
                    break;
                }
                thread::sleep(interval);
            }
            log::info!("analysis loop stopped after {} cycles", self.cycles);
        })
    }
}
