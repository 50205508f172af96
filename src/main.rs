use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use tonewatch::analysis::tones::ToneCatalogue;
use tonewatch::analysis::{AnalysisWorker, DetectionReport};
use tonewatch::audio::{capture, CaptureEngine};
use tonewatch::config::AnalyzerConfig;
use tonewatch::offline;
use tonewatch::spectrum::{Reduction, SpectrumHistory};

#[derive(Parser, Debug)]
#[command(
    name = "tonewatch",
    about = "Real-time audio spectrum analyzer with tone detection"
)]
struct Cli {
    /// Tone definition file, one `name bin min_value` triple per line
    #[arg(long, required_unless_present = "list_devices")]
    tones: Option<PathBuf>,

    /// Optional JSON config file; the flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sound capture frequency in Hz (default 44100)
    #[arg(long)]
    frequency: Option<u32>,

    /// Number of samples captured per block (default 2048)
    #[arg(long)]
    samples: Option<usize>,

    /// Number of previous blocks taken into account (default 3)
    #[arg(long)]
    history_size: Option<usize>,

    /// Analysis interval in milliseconds (default 10)
    #[arg(long)]
    interval: Option<u64>,

    /// Number of strongest peaks retained per cycle (default 5)
    #[arg(long)]
    top_peaks: Option<usize>,

    /// Static minimum peak value; superseded by the adaptive threshold
    #[arg(long)]
    min_peak_value: Option<f32>,

    /// Per-bin reduction across the history window (default min)
    #[arg(long, value_enum)]
    reduction: Option<Reduction>,

    /// Analyze a WAV file instead of capturing from a device
    #[arg(long)]
    wav: Option<PathBuf>,

    /// Emit reports as JSON objects instead of bracketed labels
    #[arg(long)]
    json: bool,

    /// Stop live capture after this many seconds (runs until killed when
    /// absent)
    #[arg(long)]
    duration: Option<u64>,

    /// List available input devices and exit
    #[arg(long)]
    list_devices: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.list_devices {
        for (index, name) in capture::input_device_names()?.iter().enumerate() {
            println!("Audio device #{}: {}", index, name);
        }
        return Ok(());
    }

    let config = resolve_config(&cli);
    config.validate()?;
    log::info!("configuration: {:?}", config);

    let tones_path = cli.tones.as_deref().context("--tones is required")?;
    let catalogue = ToneCatalogue::load(tones_path)?;

    let history = Arc::new(Mutex::new(SpectrumHistory::new(
        config.history_size,
        config.samples_per_block,
    )?));
    let (report_tx, report_rx) = mpsc::channel();
    let started = Instant::now();
    let worker = AnalysisWorker::new(
        Arc::clone(&history),
        &config,
        catalogue,
        report_tx,
        started,
    )?;

    let json = cli.json;
    let printer = thread::spawn(move || {
        for report in report_rx {
            emit_report(&report, json);
        }
    });

    if let Some(wav) = cli.wav.as_deref() {
        let mut worker = worker;
        offline::run_wav(wav, &history, &mut worker, &config, started)?;
        drop(worker);
    } else {
        let capture = CaptureEngine::start(Arc::clone(&history), &config)
            .context("starting audio capture")?;
        let shutdown = Arc::new(AtomicBool::new(false));
        let handle = worker.spawn(
            Duration::from_millis(config.analysis_interval_ms),
            Arc::clone(&shutdown),
        );

        match cli.duration {
            Some(secs) => thread::sleep(Duration::from_secs(secs)),
            None => loop {
                thread::park();
            },
        }

        shutdown.store(true, Ordering::Relaxed);
        if handle.join().is_err() {
            log::error!("analysis thread panicked");
        }
        capture.pause().ok();
        drop(capture);
    }

    // All senders are gone at this point, so the printer drains and exits.
    if printer.join().is_err() {
        log::error!("report printer panicked");
    }
    Ok(())
}

fn resolve_config(cli: &Cli) -> AnalyzerConfig {
    let mut config = cli
        .config
        .as_ref()
        .map(AnalyzerConfig::load_from_file)
        .unwrap_or_default();

    if let Some(frequency) = cli.frequency {
        config.frequency = frequency;
    }
    if let Some(samples) = cli.samples {
        config.samples_per_block = samples;
    }
    if let Some(history_size) = cli.history_size {
        config.history_size = history_size;
    }
    if let Some(interval) = cli.interval {
        config.analysis_interval_ms = interval;
    }
    if let Some(top_peaks) = cli.top_peaks {
        config.top_peaks = top_peaks;
    }
    if let Some(min_peak_value) = cli.min_peak_value {
        config.min_peak_value = min_peak_value;
    }
    if let Some(reduction) = cli.reduction {
        config.reduction = reduction;
    }
    config
}

fn emit_report(report: &DetectionReport, json: bool) {
    if json {
        match serde_json::to_string(report) {
            Ok(line) => println!("{line}"),
            Err(err) => log::error!("failed to serialize report: {}", err),
        }
    } else {
        println!("[{}]", report.label);
    }
}
