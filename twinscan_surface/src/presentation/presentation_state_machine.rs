/// Presentation state machine
///
/// Owns the "is the application allowed to render" state. Transitions only
/// happen inside `initialize`, `tick` and `terminate`; draw and clear calls
/// never change it.
///
/// ```text
/// Uninitialized --initialize--> Acquired <--reacquire-- Released
///                                   |                       ^
///                                   +----release notice-----+
/// any state --failure/exit/shutdown--> Terminating (irreversible)
/// ```

use std::fmt;

use crate::backend::{self, ForegroundStatus, RenderSurfaceBackend};
use crate::config::WindowConfig;
use crate::error::{Error, Result};
use crate::surface::RenderTargets;
use crate::{surface_debug, surface_err, surface_error, surface_info, surface_warn};

/// Whether GPU-owned memory is valid to touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationState {
    Uninitialized,
    Acquired,
    Released,
    Terminating,
}

impl fmt::Display for PresentationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PresentationState::Uninitialized => "UNINITIALIZED",
            PresentationState::Acquired => "ACQUIRED",
            PresentationState::Released => "RELEASED",
            PresentationState::Terminating => "TERMINATING",
        };
        f.write_str(name)
    }
}

/// Result of one frame-boundary tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing happened; keep rendering
    Continue,
    /// Foreground was lost and regained; render targets were reallocated
    ReleasedResume,
    /// Teardown ran; the application loop must end the process
    Exiting,
}

/// Subsystem teardown run once by `terminate` (audio, ...)
pub type ShutdownHook = Box<dyn FnOnce()>;

pub struct PresentationStateMachine {
    state: PresentationState,
    shutdown_hooks: Vec<ShutdownHook>,
    interruptions: u64,
    /// Size asked for at initialization; resumes negotiate against it again
    requested: (i32, i32),
}

impl PresentationStateMachine {
    pub fn new() -> Self {
        Self {
            state: PresentationState::Uninitialized,
            shutdown_hooks: Vec::new(),
            interruptions: 0,
            requested: (0, 0),
        }
    }

    pub fn state(&self) -> PresentationState {
        self.state
    }

    /// Number of foreground releases survived so far
    pub fn interruptions(&self) -> u64 {
        self.interruptions
    }

    pub fn add_shutdown_hook(&mut self, hook: ShutdownHook) {
        self.shutdown_hooks.push(hook);
    }

    /// Open the device, allocate every surface and build the context
    ///
    /// On success the state is `Acquired`, the primary surface is bound and
    /// the configured swap interval is applied. On failure `terminate` has
    /// already run (state `Terminating`) and the original error is returned.
    pub fn initialize<B: RenderSurfaceBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        config: &WindowConfig,
    ) -> Result<RenderTargets> {
        if self.state != PresentationState::Uninitialized {
            return Err(surface_err!("twinscan::Presentation",
                Error::BackendError(format!("initialize called in state {}", self.state))));
        }

        let mut targets = RenderTargets::empty();
        match self.acquire_all(backend, config, &mut targets) {
            Ok(()) => {
                self.state = PresentationState::Acquired;
                surface_info!("twinscan::Presentation",
                    "Presentation acquired on '{}' backend at {}x{}",
                    backend.name(), targets.width(), targets.height());
                Ok(targets)
            }
            Err(e) => {
                surface_error!("twinscan::Presentation", "Initialization failed: {}", e);
                self.terminate(backend, &mut targets);
                Err(e)
            }
        }
    }

    fn acquire_all<B: RenderSurfaceBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        config: &WindowConfig,
        targets: &mut RenderTargets,
    ) -> Result<()> {
        if !config.has_valid_size() {
            return Err(surface_err!("twinscan::Presentation", Error::InvalidDimensions {
                width: config.width as i64,
                height: config.height as i64,
            }));
        }

        backend.open_device(config)?;
        *targets = backend::acquire(backend, config.width, config.height)?;
        self.requested = (config.width, config.height);
        backend.create_context()?;

        if let Some(primary) = targets.current_set() {
            backend.bind(primary);
        }
        backend.set_swap_interval(config.swap_interval);
        Ok(())
    }

    /// Frame-boundary poll of the foreground lifecycle
    ///
    /// Called once per frame after presentation work was submitted. A
    /// release notice frees every GPU-owned buffer and polls again until
    /// the OS either gives the foreground back (targets are renegotiated from
    /// the initial request, the window takes whatever size the backend
    /// returns and the previously current surface is rebound) or asks the
    /// process to exit.
    ///
    /// # Errors
    ///
    /// `Error::FatalTermination` when reacquisition fails; teardown has
    /// already run.
    pub fn tick<B: RenderSurfaceBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        targets: &mut RenderTargets,
    ) -> Result<TickOutcome> {
        match self.state {
            PresentationState::Terminating => return Ok(TickOutcome::Exiting),
            PresentationState::Acquired => {}
            state => {
                debug_assert!(false, "tick called in state {}", state);
                return Ok(TickOutcome::Continue);
            }
        }

        let mut released = false;
        loop {
            match backend.poll_foreground() {
                ForegroundStatus::InForeground => break,
                ForegroundStatus::ReleaseRequested => {
                    if self.state == PresentationState::Acquired {
                        surface_warn!("twinscan::Presentation", "{}: releasing GPU memory",
                            Error::PresentationInterrupted);
                        backend::release(backend, targets);
                        self.state = PresentationState::Released;
                        self.interruptions += 1;
                    }
                    backend.acknowledge_release();
                    released = true;
                }
                ForegroundStatus::Exiting => {
                    surface_info!("twinscan::Presentation", "Exit requested by host");
                    self.terminate(backend, targets);
                    return Ok(TickOutcome::Exiting);
                }
            }
        }

        if !released {
            return Ok(TickOutcome::Continue);
        }

        self.reacquire(backend, targets)?;
        Ok(TickOutcome::ReleasedResume)
    }

    fn reacquire<B: RenderSurfaceBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        targets: &mut RenderTargets,
    ) -> Result<()> {
        let (old_width, old_height) = (targets.width(), targets.height());
        let current = targets.current();
        let (width, height) = self.requested;

        match backend::acquire(backend, width, height) {
            Ok(mut resumed) => {
                if (resumed.width(), resumed.height()) != (old_width, old_height) {
                    surface_warn!("twinscan::Presentation",
                        "Foreground regained at {}x{} (was {}x{})",
                        resumed.width(), resumed.height(), old_width, old_height);
                }
                resumed.set_current(current);
                *targets = resumed;
                if let Some(set) = targets.current_set() {
                    backend.bind(set);
                }
                self.state = PresentationState::Acquired;
                surface_info!("twinscan::Presentation",
                    "Foreground regained: {}x{} reacquired, {} current",
                    targets.width(), targets.height(), current);
                Ok(())
            }
            Err(e) => {
                self.terminate(backend, targets);
                Err(surface_err!("twinscan::Presentation",
                    Error::FatalTermination(format!("reacquisition failed: {}", e))))
            }
        }
    }

    /// Irreversible teardown
    ///
    /// Frees all owned memory, runs the shutdown hooks, closes the device and
    /// waits for host-OS threads blocked on this process. Never ends the
    /// process: the application loop does that once it sees
    /// `TickOutcome::Exiting` or a fatal error. Calling it again is a no-op.
    pub fn terminate<B: RenderSurfaceBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        targets: &mut RenderTargets,
    ) {
        if self.state == PresentationState::Terminating {
            surface_debug!("twinscan::Presentation", "Terminate skipped: already terminating");
            return;
        }
        self.state = PresentationState::Terminating;

        backend::release(backend, targets);
        for hook in self.shutdown_hooks.drain(..) {
            hook();
        }
        backend.close_device();
        backend.block_threads_on_exit();

        surface_info!("twinscan::Presentation", "Presentation terminated");
    }
}

impl Default for PresentationStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "presentation_state_machine_tests.rs"]
mod tests;
