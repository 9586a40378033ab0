/// WindowHost trait - windowing library capability interface

use twinscan_surface::twinscan::{Result, WindowConfig};

/// Window notification delivered by the host event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Framebuffer size changed (physical pixels, unclamped)
    Resized { width: i32, height: i32 },
    CloseRequested,
}

/// Native window owning the GL context
pub trait WindowHost {
    /// Create the window and make its GL context current
    ///
    /// Fails with `Error::ContextCreationError` when no context matching
    /// `config.api_version` can be created.
    fn create_window(&mut self, config: &WindowConfig) -> Result<()>;

    fn destroy_window(&mut self);

    fn make_context_current(&mut self);

    fn framebuffer_size(&self) -> (i32, i32);

    /// OS-level swap interval applied by `swap_buffers`
    fn set_os_swap_interval(&mut self, interval: u32);
    fn os_swap_interval(&self) -> u32;

    /// Present the default framebuffer's back buffer
    fn swap_buffers(&mut self);

    /// Drain pending window events
    fn poll_events(&mut self) -> Vec<HostEvent>;

    fn should_close(&self) -> bool;
}
