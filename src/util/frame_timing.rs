use web_time::{Duration, Instant};

/// Frame clock: per-frame delta in seconds plus a smoothed FPS readout.
pub struct FrameClock {
    /// Last tick timestamp, `None` before the first tick.
    last_frame: Option<Instant>,
    /// Longest delta handed out; longer gaps (a backgrounded tab, a
    /// debugger pause) are clamped so animation does not jump.
    max_delta: Duration,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

impl FrameClock {
    /// Clock clamping deltas to `max_delta`.
    #[must_use]
    pub fn new(max_delta: Duration) -> Self {
        Self {
            last_frame: None,
            max_delta,
            smoothed_fps: 60.0,
            smoothing: 0.05,
        }
    }

    /// Seconds since the previous tick. The first tick returns 0.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// [`tick`](Self::tick) against an explicit timestamp.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let Some(last) = self.last_frame.replace(now) else {
            return 0.0;
        };
        let elapsed = now.saturating_duration_since(last).min(self.max_delta);
        let frame_time = elapsed.as_secs_f32();
        if frame_time > 0.0 {
            let instant_fps = 1.0 / frame_time;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
        frame_time
    }

    /// Forget the previous tick, so the next delta is 0. Called when the
    /// loop restarts after a stop.
    pub fn reset(&mut self) {
        self.last_frame = None;
    }

    /// Get the current FPS (smoothed)
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_zero_then_deltas_follow() {
        let mut clock = FrameClock::default();
        let start = Instant::now();
        assert_eq!(clock.tick_at(start), 0.0);
        let delta = clock.tick_at(start + Duration::from_millis(16));
        assert!((delta - 0.016).abs() < 1e-4);
    }

    #[test]
    fn long_gaps_are_clamped() {
        let mut clock = FrameClock::new(Duration::from_millis(100));
        let start = Instant::now();
        let _ = clock.tick_at(start);
        let delta = clock.tick_at(start + Duration::from_secs(5));
        assert!((delta - 0.1).abs() < 1e-4);
        clock.reset();
        assert_eq!(clock.tick_at(start + Duration::from_secs(6)), 0.0);
    }
}
