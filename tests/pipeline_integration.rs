//! End-to-end pipeline tests
//!
//! These drive the full history -> aggregate -> peaks -> tones -> debounce
//! pipeline without audio hardware, either through direct history writes
//! with a controlled clock or through the offline WAV runner.

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};

use tonewatch::analysis::tones::ToneCatalogue;
use tonewatch::analysis::AnalysisWorker;
use tonewatch::config::AnalyzerConfig;
use tonewatch::offline;
use tonewatch::spectrum::SpectrumHistory;

const BLOCK: usize = 256;

fn test_config() -> AnalyzerConfig {
    AnalyzerConfig {
        samples_per_block: BLOCK,
        history_size: 2,
        ..AnalyzerConfig::default()
    }
}

/// Pure cosine with an integer number of cycles per block, so its FFT
/// energy lands exactly on `bin` (and its mirror).
fn cosine_samples(blocks: usize, bin: usize, amplitude: f32) -> Vec<f32> {
    (0..blocks * BLOCK)
        .map(|i| {
            amplitude * (2.0 * std::f32::consts::PI * bin as f32 * i as f32 / BLOCK as f32).cos()
        })
        .collect()
}

fn write_wav(name: &str, samples: &[f32]) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for &sample in samples {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
    path
}

#[test]
fn test_wav_run_detects_configured_tone() {
    let config = test_config();
    let catalogue = ToneCatalogue::from_reader(Cursor::new("t 16 1.0\n"));
    let history = Arc::new(Mutex::new(SpectrumHistory::new(2, BLOCK).unwrap()));
    let (tx, rx) = mpsc::channel();
    let started = Instant::now();
    let mut worker =
        AnalysisWorker::new(Arc::clone(&history), &config, catalogue, tx, started).unwrap();

    let path = write_wav("tonewatch_tone16.wav", &cosine_samples(4, 16, 1.0));
    let processed = offline::run_wav(&path, &history, &mut worker, &config, started).unwrap();
    assert_eq!(processed, 4);
    drop(worker);

    let reports: Vec<_> = rx.iter().collect();
    // First cycle sees a half-filled ring (min reduction -> silence), the
    // second sees the tone; later cycles fall inside the debounce window.
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].label, "");
    assert_eq!(reports[1].label, "t");
    assert_eq!(reports[1].tones, vec!["t"]);
    assert!(reports[1].max_peak.is_some());
}

#[test]
fn test_wav_run_reports_silence_for_unmatched_tone() {
    let config = test_config();
    // Catalogue tone requires bin 40; the signal sits at bin 16.
    let catalogue = ToneCatalogue::from_reader(Cursor::new("x 40 1.0\n"));
    let history = Arc::new(Mutex::new(SpectrumHistory::new(2, BLOCK).unwrap()));
    let (tx, rx) = mpsc::channel();
    let started = Instant::now();
    let mut worker =
        AnalysisWorker::new(Arc::clone(&history), &config, catalogue, tx, started).unwrap();

    let path = write_wav("tonewatch_tone_miss.wav", &cosine_samples(4, 16, 1.0));
    offline::run_wav(&path, &history, &mut worker, &config, started).unwrap();
    drop(worker);

    let reports: Vec<_> = rx.iter().collect();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].label, "");
}

#[test]
fn test_sustained_tone_is_reconfirmed_after_interval() {
    let config = test_config();
    let catalogue = ToneCatalogue::from_reader(Cursor::new("t 16 1.0\n"));
    let history = Arc::new(Mutex::new(SpectrumHistory::new(2, BLOCK).unwrap()));
    let (tx, rx) = mpsc::channel();
    let started = Instant::now();
    let mut worker =
        AnalysisWorker::new(Arc::clone(&history), &config, catalogue, tx, started).unwrap();

    let tone_block: Vec<f32> = cosine_samples(1, 16, 1.0);
    for _ in 0..2 {
        history.lock().unwrap().write(&tone_block);
    }

    // Immediate report on first sight, silence inside the window, one
    // re-confirmation after it elapses.
    worker.run_cycle(started).unwrap();
    worker.run_cycle(started + Duration::from_millis(500)).unwrap();
    worker.run_cycle(started + Duration::from_millis(1001)).unwrap();

    // A change reports immediately even right after a re-confirmation.
    for _ in 0..2 {
        history.lock().unwrap().write(&vec![0.0; BLOCK]);
    }
    worker.run_cycle(started + Duration::from_millis(1002)).unwrap();
    drop(worker);

    let labels: Vec<String> = rx.iter().map(|r| r.label).collect();
    assert_eq!(labels, vec!["t", "t", ""]);
}

#[test]
fn test_multi_tone_label_is_sorted_and_space_joined() {
    let config = test_config();
    let catalogue = ToneCatalogue::from_reader(Cursor::new("g 24 1.0\na 16 1.0\n"));
    let history = Arc::new(Mutex::new(SpectrumHistory::new(2, BLOCK).unwrap()));
    let (tx, rx) = mpsc::channel();
    let started = Instant::now();
    let mut worker =
        AnalysisWorker::new(Arc::clone(&history), &config, catalogue, tx, started).unwrap();

    // Two superposed cosines put peaks at both required bins.
    let block: Vec<f32> = (0..BLOCK)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / BLOCK as f32;
            (phase * 16.0).cos() + (phase * 24.0).cos()
        })
        .collect();
    for _ in 0..2 {
        history.lock().unwrap().write(&block);
    }

    worker.run_cycle(started).unwrap();
    drop(worker);

    let report = rx.iter().next().unwrap();
    assert_eq!(report.label, "a g");
    assert_eq!(report.tones, vec!["a", "g"]);
}
