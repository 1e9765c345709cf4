//! Clock and timing utilities for the preview and capture loops.
//!
//! A recording session is anchored to a monotonic epoch captured at start.
//! The preview loop runs at display refresh rate; the capture loop that
//! feeds the encoder is gated down to the target encode frame rate so the
//! recording canvas is not redrawn faster than frames can be consumed.

use std::time::Instant;

/// A recording clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment recording started).
#[derive(Debug, Clone)]
pub struct RecordingClock {
    /// The instant recording started.
    epoch: Instant,

    /// Wall-clock time at epoch (ISO 8601 string).
    epoch_wall: String,
}

impl RecordingClock {
    /// Create a new recording clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Get milliseconds elapsed since recording start.
    pub fn elapsed_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1_000.0
    }

    /// Get seconds elapsed since recording start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Get nanoseconds elapsed since recording start.
    pub fn elapsed_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Wall-clock time at recording start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}

/// Gates display-rate draw ticks down to the target encode frame rate.
///
/// The preview loop ticks once per display refresh; only every Nth tick
/// is forwarded to the recording canvas, where
/// `N = round(display_hz / target_fps)` (minimum 1).
#[derive(Debug, Clone, Copy)]
pub struct CaptureGate {
    skip_factor: u32,
    tick_count: u64,
}

impl CaptureGate {
    /// Create a gate for the given display refresh and encode rates.
    pub fn new(display_hz: u32, target_fps: u32) -> Self {
        let display_hz = display_hz.max(1) as f64;
        let target_fps = target_fps.max(1) as f64;
        let skip_factor = (display_hz / target_fps).round().max(1.0) as u32;
        Self {
            skip_factor,
            tick_count: 0,
        }
    }

    /// Record one display tick; returns true when this tick should also
    /// be drawn to the recording canvas.
    pub fn tick(&mut self) -> bool {
        let capture = self.tick_count % self.skip_factor as u64 == 0;
        self.tick_count += 1;
        capture
    }

    /// Display ticks per captured frame.
    pub fn skip_factor(&self) -> u32 {
        self.skip_factor
    }
}

/// Format an elapsed duration as `M:SS` for on-canvas display.
pub fn format_elapsed(elapsed_secs: f64) -> String {
    let total = elapsed_secs.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_elapsed() {
        let clock = RecordingClock::start();
        assert!(clock.elapsed_ns() < 1_000_000_000); // less than 1 second
    }

    #[test]
    fn test_capture_gate_skip_factor() {
        assert_eq!(CaptureGate::new(60, 30).skip_factor(), 2);
        assert_eq!(CaptureGate::new(144, 30).skip_factor(), 5);
        assert_eq!(CaptureGate::new(60, 60).skip_factor(), 1);
        // Encode rate above display rate clamps to every tick
        assert_eq!(CaptureGate::new(30, 60).skip_factor(), 1);
    }

    #[test]
    fn test_capture_gate_passes_every_nth_tick() {
        let mut gate = CaptureGate::new(60, 30);
        let captured: Vec<bool> = (0..6).map(|_| gate.tick()).collect();
        assert_eq!(captured, vec![true, false, true, false, true, false]);
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0.0), "0:00");
        assert_eq!(format_elapsed(65.4), "1:05");
        assert_eq!(format_elapsed(600.0), "10:00");
    }
}
