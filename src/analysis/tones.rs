// ToneCatalogue - named tones and their required peak bins
//
// A tone is defined by the set of frequency bins that must all carry a
// detected peak for the tone to count as present. Definitions are loaded
// once at startup from a plain text file, one `name bin min_value` triple
// per line, and are immutable afterwards.
//
// Detection matches on bin index only. Each required peak also stores the
// minimum value from its definition line, but the value is not enforced by
// the presence check; only the bin membership is.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::analysis::peaks::Peak;
use crate::error::ConfigError;

/// One required peak of a tone definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequiredPeak {
    pub bin: usize,
    /// Minimum magnitude from the definition file; stored but not checked
    /// by `detect`
    pub min_value: f32,
}

/// Immutable mapping from tone name to its required peaks
///
/// Backed by a BTreeMap so iteration order, and therefore detection output,
/// is lexicographic and reproducible.
#[derive(Debug, Default)]
pub struct ToneCatalogue {
    tones: BTreeMap<String, Vec<RequiredPeak>>,
}

impl ToneCatalogue {
    /// Load tone definitions from a text file.
    ///
    /// Returns an error if the file cannot be opened or yields no usable
    /// entries; individually malformed lines are skipped with a warning.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::ToneFileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let catalogue = Self::from_reader(BufReader::new(file));
        if catalogue.is_empty() {
            return Err(ConfigError::EmptyCatalogue {
                path: path.to_path_buf(),
            });
        }
        log::info!(
            "loaded {} tone definitions from {}",
            catalogue.len(),
            path.display()
        );
        Ok(catalogue)
    }

    /// Parse tone definitions from any reader.
    ///
    /// Line format: `name bin min_value`, whitespace separated. Blank lines
    /// and `#` comments are ignored. Repeating a name adds another required
    /// peak to that tone, so chords span multiple lines. A short read simply
    /// ends loading; the partial catalogue is not an error here.
    pub fn from_reader<R: BufRead>(reader: R) -> Self {
        let mut tones: BTreeMap<String, Vec<RequiredPeak>> = BTreeMap::new();

        for (number, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    log::warn!("tone file read ended at line {}: {}", number + 1, err);
                    break;
                }
            };
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut fields = trimmed.split_whitespace();
            let parsed = match (fields.next(), fields.next(), fields.next()) {
                (Some(name), Some(bin), Some(min_value)) => bin
                    .parse::<usize>()
                    .ok()
                    .zip(min_value.parse::<f32>().ok())
                    .map(|(bin, min_value)| (name, bin, min_value)),
                _ => None,
            };

            match parsed {
                Some((name, bin, min_value)) => {
                    tones
                        .entry(name.to_string())
                        .or_default()
                        .push(RequiredPeak { bin, min_value });
                }
                None => {
                    log::warn!("skipping malformed tone definition line {}: {:?}", number + 1, trimmed);
                }
            }
        }

        Self { tones }
    }

    /// Which tones are present in the given peak set.
    ///
    /// A tone is present iff every one of its required bins has a peak with
    /// the same bin index. Names come back lexicographically sorted. Pure
    /// function of (catalogue, peaks).
    pub fn detect(&self, peaks: &[Peak]) -> Vec<String> {
        self.tones
            .iter()
            .filter(|(_, required)| {
                required
                    .iter()
                    .all(|req| peaks.iter().any(|peak| peak.bin == req.bin))
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tones.is_empty()
    }

    /// Required peaks for one tone, if defined.
    pub fn required_peaks(&self, name: &str) -> Option<&[RequiredPeak]> {
        self.tones.get(name).map(Vec::as_slice)
    }
}
