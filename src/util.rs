//! Shared utilities

use std::collections::VecDeque;
use std::time::Instant;

// ============================================================================
// Frame Clock
// ============================================================================

/// Millisecond timestamps for frame callbacks, plus rolling frame statistics
pub struct FrameClock {
    start: Instant,
    frame_times: VecDeque<f64>,
    last_frame: Option<f64>,
    sample_count: usize,
}

impl FrameClock {
    /// Create a clock starting now, keeping `sample_count` frame times
    pub fn new(sample_count: usize) -> Self {
        Self {
            start: Instant::now(),
            frame_times: VecDeque::with_capacity(sample_count),
            last_frame: None,
            sample_count: sample_count.max(1),
        }
    }

    /// Milliseconds since the clock was created
    pub fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Read the clock and record the frame. Returns the timestamp in ms.
    pub fn tick(&mut self) -> f64 {
        let now = self.now_ms();
        self.record(now);
        now
    }

    /// Record a frame stamped `timestamp_ms`
    pub fn record(&mut self, timestamp_ms: f64) {
        if let Some(last) = self.last_frame {
            self.frame_times.push_back(timestamp_ms - last);
            if self.frame_times.len() > self.sample_count {
                self.frame_times.pop_front();
            }
        }
        self.last_frame = Some(timestamp_ms);
    }

    /// Get the average frame time in milliseconds
    pub fn avg_frame_time_ms(&self) -> f64 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        self.frame_times.iter().sum::<f64>() / self.frame_times.len() as f64
    }

    pub fn avg_fps(&self) -> f64 {
        let avg = self.avg_frame_time_ms();
        if avg > 0.0 {
            1000.0 / avg
        } else {
            0.0
        }
    }

    /// Get min/max FPS from sample window
    pub fn min_max_fps(&self) -> (f64, f64) {
        if self.frame_times.is_empty() {
            return (0.0, 0.0);
        }
        let min_dt = self.frame_times.iter().copied().fold(f64::INFINITY, f64::min);
        let max_dt = self.frame_times.iter().copied().fold(0.0, f64::max);
        let max_fps = if min_dt > 0.0 { 1000.0 / min_dt } else { 0.0 };
        let min_fps = if max_dt > 0.0 { 1000.0 / max_dt } else { 0.0 };
        (min_fps, max_fps)
    }

    /// Number of frame times in the window
    pub fn frame_count(&self) -> usize {
        self.frame_times.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_first_frame_has_no_interval() {
        let mut clock = FrameClock::new(4);
        clock.record(100.0);
        assert_eq!(clock.frame_count(), 0);
        assert_eq!(clock.avg_fps(), 0.0);
    }

    #[test]
    fn test_rolling_window() {
        let mut clock = FrameClock::new(2);
        for t in [0.0, 10.0, 30.0, 50.0] {
            clock.record(t);
        }
        // window holds the last two intervals: 20, 20
        assert_eq!(clock.frame_count(), 2);
        assert_abs_diff_eq!(clock.avg_frame_time_ms(), 20.0);
        assert_abs_diff_eq!(clock.avg_fps(), 50.0);
    }

    #[test]
    fn test_min_max_fps() {
        let mut clock = FrameClock::new(8);
        for t in [0.0, 10.0, 30.0] {
            clock.record(t);
        }
        let (min, max) = clock.min_max_fps();
        assert_abs_diff_eq!(min, 50.0);
        assert_abs_diff_eq!(max, 100.0);
    }

    #[test]
    fn test_clock_is_monotonic() {
        let mut clock = FrameClock::new(4);
        let a = clock.tick();
        let b = clock.tick();
        assert!(b >= a);
    }
}
