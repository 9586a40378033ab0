/// SwapChainController - per-frame presentation protocol
///
/// Ordering of one frame end:
///
/// 1. depth test off (render-state collaborator, applied)
/// 2. begin present (desktop: default framebuffer, full viewport)
/// 3. flush, not drain
/// 4. copy color target(s) to the presentable surface(s)
/// 5. flip (non-blocking)
/// 6. restore context / current render target
/// 7. flush, then hard wait for the flip (the frame-pacing point)
/// 8. re-enable outputs
/// 9. presentation tick

use crate::backend::{RenderState, RenderSurfaceBackend};
use crate::error::Result;
use crate::presentation::{PresentationState, PresentationStateMachine, TickOutcome};
use crate::surface::RenderTargets;
use crate::surface_trace;

#[derive(Debug, Default)]
pub struct SwapChainController {
    frames_presented: u64,
}

impl SwapChainController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames presented since creation
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Present the current frame and run the frame-boundary tick
    ///
    /// Once presentation is terminating no GPU work is issued and
    /// `TickOutcome::Exiting` is returned.
    pub fn present<B: RenderSurfaceBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        render_state: &mut dyn RenderState,
        targets: &mut RenderTargets,
        presentation: &mut PresentationStateMachine,
    ) -> Result<TickOutcome> {
        if presentation.state() != PresentationState::Acquired {
            return Ok(TickOutcome::Exiting);
        }

        render_state.set_depth_test(false);
        render_state.apply();

        backend.begin_present(targets.sets());
        backend.flush();
        backend.copy_to_scan_out(targets.sets());
        backend.flip();
        if let Some(current) = targets.current_set() {
            backend.restore_context(current);
        }
        backend.flush();
        backend.wait_for_flip();
        backend.enable_outputs();

        self.frames_presented += 1;
        surface_trace!("twinscan::SwapChain", "Frame {} presented", self.frames_presented);

        presentation.tick(backend, targets)
    }
}

#[cfg(test)]
#[path = "swap_chain_controller_tests.rs"]
mod tests;
