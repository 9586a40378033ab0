/// FramePacer - backend-side swap interval
///
/// The OS-level interval is kept at 0 and presentation is paced here: each
/// `wait` blocks until `interval` refresh periods have elapsed since the
/// previous one.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: u32,
    refresh_rate: u32,
    last_present: Option<Instant>,
    frames: u64,
    total_wait: Duration,
}

impl FramePacer {
    pub fn new(refresh_rate: u32) -> Self {
        Self {
            interval: 0,
            refresh_rate: refresh_rate.max(1),
            last_present: None,
            frames: 0,
            total_wait: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn set_interval(&mut self, interval: u32) {
        self.interval = interval;
    }

    pub fn refresh_rate(&self) -> u32 {
        self.refresh_rate
    }

    /// Minimum time between two presents, None when unpaced
    pub fn frame_budget(&self) -> Option<Duration> {
        if self.interval == 0 {
            return None;
        }
        Some(Duration::from_nanos(self.interval as u64 * 1_000_000_000 / self.refresh_rate as u64))
    }

    /// Block until the current frame's budget has elapsed
    pub fn wait(&mut self) {
        let now = Instant::now();
        if let (Some(budget), Some(last)) = (self.frame_budget(), self.last_present) {
            let deadline = last + budget;
            if deadline > now {
                let remaining = deadline - now;
                std::thread::sleep(remaining);
                self.total_wait += remaining;
            }
        }
        self.last_present = Some(Instant::now());
        self.frames += 1;
    }

    /// Forget the previous present (after a stall such as a resize)
    pub fn reset(&mut self) {
        self.last_present = None;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Accumulated time spent sleeping in `wait`
    pub fn total_wait(&self) -> Duration {
        self.total_wait
    }
}

#[cfg(test)]
#[path = "desktop_frame_pacer_tests.rs"]
mod tests;
