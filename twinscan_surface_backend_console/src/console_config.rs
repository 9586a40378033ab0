/// Console backend configuration

/// Default GPU command buffer size (4 MiB)
pub const DEFAULT_COMMAND_BUFFER_SIZE: u64 = 0x40_0000;

#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleConfig {
    /// GPU command buffer size in bytes
    pub command_buffer_size: u64,
    /// Display refresh rate in Hz
    pub refresh_rate: u32,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            command_buffer_size: DEFAULT_COMMAND_BUFFER_SIZE,
            refresh_rate: 60,
        }
    }
}

impl ConsoleConfig {
    pub fn with_command_buffer_size(mut self, size: u64) -> Self {
        self.command_buffer_size = size;
        self
    }

    pub fn with_refresh_rate(mut self, hz: u32) -> Self {
        self.refresh_rate = hz;
        self
    }

    /// Effective presentation rate for a swap interval (0 = unpaced)
    pub fn presentation_rate(&self, swap_interval: u32) -> Option<f32> {
        if swap_interval == 0 {
            None
        } else {
            Some(self.refresh_rate as f32 / swap_interval as f32)
        }
    }
}
