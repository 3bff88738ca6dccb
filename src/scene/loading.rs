//! Load bookkeeping for the render gate.
//!
//! The tracker counts inputs expected versus inputs completed and keeps
//! per-request download progress. Animation may only advance while the two
//! counters agree, so a multi-part model never starts morphing with some of
//! its parts missing.

use rustc_hash::FxHashMap;
use web_time::{Duration, Instant};

use crate::assets::RequestId;

/// What the render gate is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// Every expected input has arrived.
    Idle,
    /// Inputs are outstanding and progress was seen recently.
    Loading,
    /// Inputs are outstanding and nothing has arrived for longer than the
    /// stall threshold.
    Stalled,
}

/// Aggregate download progress across every request seen so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DownloadProgress {
    /// Sum of expected sizes, or 0 when any request's size is unknown.
    pub total: u64,
    /// Sum of received bytes.
    pub loaded: u64,
    /// Whether any fetch has failed.
    pub errored: bool,
}

/// Expected/completed counters plus progress and stall tracking.
#[derive(Debug)]
pub struct LoadTracker {
    expected: usize,
    completed: usize,
    progress: FxHashMap<RequestId, (u64, u64)>,
    errored: bool,
    stall_after: Duration,
    last_activity: Option<Instant>,
    stall_reported: bool,
}

impl LoadTracker {
    /// Tracker that reports a stall after `stall_after` without activity.
    #[must_use]
    pub fn new(stall_after: Duration) -> Self {
        Self {
            expected: 0,
            completed: 0,
            progress: FxHashMap::default(),
            errored: false,
            stall_after,
            last_activity: None,
            stall_reported: false,
        }
    }

    /// Inputs issued and not cancelled by a failure.
    #[must_use]
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Inputs that produced scene objects.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Whether every expected input has completed.
    #[must_use]
    pub fn all_completed(&self) -> bool {
        self.completed >= self.expected
    }

    /// Count `n` newly issued inputs.
    pub fn expect(&mut self, n: usize, now: Instant) {
        self.expected += n;
        self.touch(now);
    }

    /// Count one completed input.
    pub fn complete(&mut self, now: Instant) {
        self.completed += 1;
        self.touch(now);
    }

    /// A counted input failed: it will never complete, so stop expecting it.
    pub fn fail(&mut self, now: Instant) {
        self.expected = self.expected.saturating_sub(1);
        self.errored = true;
        self.touch(now);
    }

    /// Flag a download error that did not involve a counted input.
    pub fn mark_error(&mut self) {
        self.errored = true;
    }

    /// Record progress for one request.
    pub fn progress(&mut self, id: RequestId, loaded: u64, total: u64, now: Instant) {
        let _ = self.progress.insert(id, (loaded, total));
        self.touch(now);
    }

    /// Aggregate progress. One request with an unknown size makes the
    /// total unknown.
    #[must_use]
    pub fn download_progress(&self) -> DownloadProgress {
        let mut out = DownloadProgress {
            errored: self.errored,
            ..DownloadProgress::default()
        };
        let mut unknown = false;
        for &(loaded, total) in self.progress.values() {
            out.loaded += loaded;
            out.total += total;
            unknown |= total == 0;
        }
        if unknown {
            out.total = 0;
        }
        out
    }

    fn touch(&mut self, now: Instant) {
        self.last_activity = Some(now);
        self.stall_reported = false;
    }

    /// Status at `now`.
    #[must_use]
    pub fn status(&self, now: Instant) -> LoadStatus {
        if self.all_completed() {
            return LoadStatus::Idle;
        }
        match self.last_activity {
            Some(t) if now.saturating_duration_since(t) >= self.stall_after => {
                LoadStatus::Stalled
            }
            _ => LoadStatus::Loading,
        }
    }

    /// Warn once per stall. Returns whether a warning was emitted.
    pub fn report_stall(&mut self, now: Instant) -> bool {
        if self.stall_reported || self.status(now) != LoadStatus::Stalled {
            return false;
        }
        self.stall_reported = true;
        log::warn!(
            "render gate stalled: {}/{} inputs completed, nothing received for {:?}",
            self.completed,
            self.expected,
            self.stall_after
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_releases_the_gate() {
        let now = Instant::now();
        let mut tracker = LoadTracker::new(Duration::from_secs(30));
        tracker.expect(3, now);
        tracker.complete(now);
        tracker.complete(now);
        assert!(!tracker.all_completed());
        tracker.fail(now);
        assert!(tracker.all_completed());
        assert!(tracker.download_progress().errored);
    }

    #[test]
    fn unknown_size_hides_total() {
        let now = Instant::now();
        let mut tracker = LoadTracker::new(Duration::from_secs(30));
        tracker.progress(1, 50, 100, now);
        tracker.progress(2, 10, 40, now);
        assert_eq!(tracker.download_progress(), DownloadProgress {
            total: 140,
            loaded: 60,
            errored: false,
        });
        tracker.progress(3, 5, 0, now);
        let progress = tracker.download_progress();
        assert_eq!(progress.total, 0);
        assert_eq!(progress.loaded, 65);
    }

    #[test]
    fn stall_is_reported_once() {
        let start = Instant::now();
        let mut tracker = LoadTracker::new(Duration::from_secs(30));
        assert_eq!(tracker.status(start), LoadStatus::Idle);
        tracker.expect(1, start);
        assert_eq!(tracker.status(start), LoadStatus::Loading);
        let later = start + Duration::from_secs(31);
        assert_eq!(tracker.status(later), LoadStatus::Stalled);
        assert!(tracker.report_stall(later));
        assert!(!tracker.report_stall(later));
        tracker.progress(9, 1, 2, later);
        assert_eq!(tracker.status(later), LoadStatus::Loading);
        tracker.complete(later);
        assert_eq!(tracker.status(later), LoadStatus::Idle);
    }
}
