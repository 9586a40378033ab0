/// ForegroundLifecycle trait - cooperative OS foreground protocol

use twinscan_surface::twinscan::backend::ForegroundStatus;

/// OS process lifecycle messages
///
/// `process_messages` may block while the application is in background.
pub trait ForegroundLifecycle {
    /// Register with the OS lifecycle (once, after the context exists)
    fn init(&mut self);

    /// Process pending lifecycle messages and report the current status
    fn process_messages(&mut self) -> ForegroundStatus;

    /// Acknowledge that every foreground resource has been released
    fn draw_done_release(&mut self);

    /// Unregister from the OS lifecycle
    fn shutdown(&mut self);

    /// Block until host-OS threads waiting on this process are released
    fn block_threads_on_exit(&mut self);
}
