// ToneDebouncer - rate limiting for detection reports
//
// A changed label is reported immediately; an unchanged one is re-reported
// only after the interval elapses, so a sustained tone is periodically
// re-announced without flooding every cycle.

use std::time::{Duration, Instant};

/// How long an unchanged detection stays valid before re-announcement
pub const REPORT_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug)]
pub struct ToneDebouncer {
    last_label: Option<String>,
    valid_until: Option<Instant>,
    interval: Duration,
}

impl ToneDebouncer {
    pub fn new() -> Self {
        Self::with_interval(REPORT_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            last_label: None,
            valid_until: None,
            interval,
        }
    }

    /// Decide whether the current label is due for a report.
    ///
    /// Returns true when the label differs from the stored one (reported
    /// immediately) or when the stored label has outlived its validity
    /// window (periodic re-confirmation). The very first call always
    /// reports.
    pub fn update(&mut self, label: &str, now: Instant) -> bool {
        let changed = self.last_label.as_deref() != Some(label);
        let expired = self.valid_until.map(|until| now > until).unwrap_or(true);

        if changed || expired {
            if changed {
                self.last_label = Some(label.to_string());
            }
            self.valid_until = Some(now + self.interval);
            true
        } else {
            false
        }
    }
}

impl Default for ToneDebouncer {
    fn default() -> Self {
        Self::new()
    }
}
