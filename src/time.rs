//! Frame clock for the render loop.
//!
//! The clock is ticked once per presented frame. Children only ever see the
//! elapsed seconds since the clock started, which never decreases.
//!
//! # Example
//!
//! ```ignore
//! use particle_field::time::FrameClock;
//!
//! let mut clock = FrameClock::new();
//!
//! // Once per redraw:
//! let t = clock.tick();
//! scene.tick(t);
//! ```

use std::time::{Duration, Instant};

/// Elapsed-time source for the scene.
///
/// Also keeps a frame counter and a periodically refreshed FPS estimate for
/// diagnostics.
#[derive(Debug)]
pub struct FrameClock {
    /// When the clock was created or last reset.
    start: Instant,
    /// Elapsed seconds at the last tick.
    elapsed_secs: f32,
    /// Seconds between the last two ticks.
    delta_secs: f32,
    /// Ticks since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    /// How often to update FPS calculation.
    fps_update_interval: Duration,
}

impl FrameClock {
    /// Create a clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_secs(2),
        }
    }

    /// Advance the clock. Call once per frame; returns elapsed seconds.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        // `Instant` is monotonic, the max() only guards f32 rounding.
        let elapsed = now.duration_since(self.start).as_secs_f32().max(self.elapsed_secs);
        self.delta_secs = elapsed - self.elapsed_secs;
        self.elapsed_secs = elapsed;
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
            tracing::debug!(fps = self.fps, frame = self.frame_count, "frame rate");
        }

        self.elapsed_secs
    }

    /// Elapsed seconds at the last tick.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Seconds between the last two ticks.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Ticks since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Most recent frames-per-second estimate.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Restart from zero.
    pub fn reset(&mut self) {
        *self = Self {
            fps_update_interval: self.fps_update_interval,
            ..Self::new()
        };
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_new() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_clock_tick() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(10));
        let t = clock.tick();

        assert!(t > 0.0);
        assert!(clock.delta() > 0.0);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_clock_monotonic() {
        let mut clock = FrameClock::new();
        let mut last = 0.0;
        for _ in 0..100 {
            let t = clock.tick();
            assert!(t >= last);
            last = t;
        }
    }

    #[test]
    fn test_tick_at_fixed_instants() {
        let mut clock = FrameClock::new();
        let start = clock.start;
        assert_eq!(clock.tick_at(start + Duration::from_millis(500)), 0.5);
        assert_eq!(clock.tick_at(start + Duration::from_secs(1)), 1.0);
        assert_eq!(clock.delta(), 0.5);
    }

    #[test]
    fn test_clock_reset() {
        let mut clock = FrameClock::new();
        clock.tick();
        clock.reset();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.elapsed(), 0.0);
    }
}
