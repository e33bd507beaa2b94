//! Progress reporting for the hash and sync phases of a session.
//!
//! Each peer runs two phases — hashing the local file, then exchanging
//! blocks — mapped onto the lower and upper half of a single 0-100% scale.
//! Reports are throttled to at most once per second, with an unconditional
//! report on completion.

use std::time::{Duration, Instant};

/// Receives progress updates; the CLI wires this to a printed status line,
/// tests wire it to a `Vec` of recorded reports.
pub trait ProgressSink {
    /// Called with the overall percent complete (0.0-100.0) and a short
    /// phase label.
    fn report(&mut self, percent: f64, phase: &str);
}

/// A sink that discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&mut self, _percent: f64, _phase: &str) {}
}

impl<T: ProgressSink + ?Sized> ProgressSink for &mut T {
    fn report(&mut self, percent: f64, phase: &str) {
        (**self).report(percent, phase);
    }
}

/// Records every report it receives, in order. Used by tests.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    /// `(percent, phase)` pairs in the order they were reported.
    pub reports: Vec<(f64, String)>,
}

impl ProgressSink for RecordingProgress {
    fn report(&mut self, percent: f64, phase: &str) {
        self.reports.push((percent, phase.to_string()));
    }
}

/// Which half of the 0-100% scale a phase occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Hashing the local file: 0% to 50%.
    Hash,
    /// Exchanging and applying blocks: 50% to 100%.
    Sync,
}

impl Phase {
    const fn start_percent(self) -> f64 {
        match self {
            Self::Hash => 0.0,
            Self::Sync => 50.0,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Hash => "hash",
            Self::Sync => "sync",
        }
    }
}

const PHASE_SPAN_PERCENT: f64 = 50.0;
const MIN_REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Tracks progress through one phase of one peer's work and throttles
/// reports to [`ProgressSink`].
pub struct ProgressReporter<S: ProgressSink> {
    sink: S,
    phase: Phase,
    total_bytes: u64,
    last_report_at: Option<Instant>,
}

impl<S: ProgressSink> ProgressReporter<S> {
    /// Starts tracking `phase`, which will run from 0 to `total_bytes`.
    pub const fn new(sink: S, phase: Phase, total_bytes: u64) -> Self {
        Self {
            sink,
            phase,
            total_bytes,
            last_report_at: None,
        }
    }

    fn percent_for(&self, current_bytes: u64) -> f64 {
        if self.total_bytes == 0 {
            return self.phase.start_percent() + PHASE_SPAN_PERCENT;
        }
        let fraction = (current_bytes.min(self.total_bytes) as f64) / (self.total_bytes as f64);
        self.phase.start_percent() + fraction * PHASE_SPAN_PERCENT
    }

    /// Reports progress if at least one second has elapsed since the last
    /// report, or if `current_bytes` reaches `total_bytes`.
    pub fn update(&mut self, current_bytes: u64) {
        self.update_at(current_bytes, Instant::now());
    }

    /// Same as [`Self::update`] but takes an explicit timestamp, so tests
    /// can exercise the throttling without a real clock.
    pub fn update_at(&mut self, current_bytes: u64, now: Instant) {
        let done = current_bytes >= self.total_bytes;
        let due = match self.last_report_at {
            None => true,
            Some(last) => now.duration_since(last) >= MIN_REPORT_INTERVAL,
        };
        if !due && !done {
            return;
        }
        self.sink.report(self.percent_for(current_bytes), self.phase.label());
        self.last_report_at = Some(now);
    }

    /// Forces a final report at 100% of this phase's span, regardless of
    /// throttling.
    pub fn finish(&mut self) {
        self.sink
            .report(self.phase.start_percent() + PHASE_SPAN_PERCENT, self.phase.label());
    }

    /// Returns the wrapped sink, consuming the reporter.
    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_phase_spans_lower_half() {
        let mut reporter = ProgressReporter::new(RecordingProgress::default(), Phase::Hash, 100);
        let t0 = Instant::now();
        reporter.update_at(50, t0);
        let (percent, phase) = reporter.into_sink().reports[0].clone();
        assert!((percent - 25.0).abs() < f64::EPSILON);
        assert_eq!(phase, "hash");
    }

    #[test]
    fn sync_phase_spans_upper_half() {
        let mut reporter = ProgressReporter::new(RecordingProgress::default(), Phase::Sync, 100);
        let t0 = Instant::now();
        reporter.update_at(50, t0);
        let (percent, _) = reporter.into_sink().reports[0];
        assert!((percent - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reports_are_throttled_to_one_per_second() {
        let mut reporter = ProgressReporter::new(RecordingProgress::default(), Phase::Hash, 1000);
        let t0 = Instant::now();
        reporter.update_at(10, t0);
        reporter.update_at(20, t0 + Duration::from_millis(200));
        reporter.update_at(30, t0 + Duration::from_millis(900));
        reporter.update_at(40, t0 + Duration::from_millis(1100));

        let sink = reporter.into_sink();
        assert_eq!(sink.reports.len(), 2);
    }

    #[test]
    fn completion_always_reports_even_within_throttle_window() {
        let mut reporter = ProgressReporter::new(RecordingProgress::default(), Phase::Hash, 100);
        let t0 = Instant::now();
        reporter.update_at(10, t0);
        reporter.update_at(100, t0 + Duration::from_millis(50));

        let sink = reporter.into_sink();
        assert_eq!(sink.reports.len(), 2);
        assert!((sink.reports[1].0 - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn finish_reports_full_phase_span() {
        let mut reporter = ProgressReporter::new(RecordingProgress::default(), Phase::Sync, 100);
        reporter.finish();
        let sink = reporter.into_sink();
        assert_eq!(sink.reports.last().unwrap().0, 100.0);
    }

    #[test]
    fn zero_total_bytes_reports_full_span_immediately() {
        let mut reporter = ProgressReporter::new(RecordingProgress::default(), Phase::Hash, 0);
        reporter.update_at(0, Instant::now());
        let sink = reporter.into_sink();
        assert_eq!(sink.reports[0].0, 50.0);
    }
}
