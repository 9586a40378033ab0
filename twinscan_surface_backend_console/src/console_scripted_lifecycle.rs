/// ScriptedLifecycle - ForegroundLifecycle replaying a fixed status script

use std::collections::VecDeque;
use twinscan_surface::twinscan::backend::ForegroundStatus;

use crate::console_foreground::ForegroundLifecycle;

/// Lifecycle answering `InForeground` once its script runs out
#[derive(Debug, Default)]
pub struct ScriptedLifecycle {
    script: VecDeque<ForegroundStatus>,
    pub initialized: bool,
    pub polls: usize,
    pub draw_done_releases: usize,
    pub shutdowns: usize,
    pub exit_blocks: usize,
}

impl ScriptedLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(statuses: &[ForegroundStatus]) -> Self {
        let mut lifecycle = Self::new();
        lifecycle.push(statuses);
        lifecycle
    }

    /// Append statuses to the script
    pub fn push(&mut self, statuses: &[ForegroundStatus]) {
        self.script.extend(statuses.iter().copied());
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ForegroundLifecycle for ScriptedLifecycle {
    fn init(&mut self) {
        self.initialized = true;
    }

    fn process_messages(&mut self) -> ForegroundStatus {
        self.polls += 1;
        self.script.pop_front().unwrap_or(ForegroundStatus::InForeground)
    }

    fn draw_done_release(&mut self) {
        self.draw_done_releases += 1;
    }

    fn shutdown(&mut self) {
        self.shutdowns += 1;
    }

    fn block_threads_on_exit(&mut self) {
        self.exit_blocks += 1;
    }
}
