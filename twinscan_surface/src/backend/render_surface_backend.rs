/// RenderSurfaceBackend trait - platform capability interface
///
/// Shared clear/swap orchestration lives above this interface; each
/// presentation platform implements the primitives below it.

use crate::config::WindowConfig;
use crate::error::Result;
use crate::surface::{NativeHandle, RenderTargetSet, Surface};
use super::allocator::SurfaceAllocator;
use super::clear::{ClearEffect, ClearRequest};

/// Foreground status reported by the host OS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForegroundStatus {
    /// The application owns the GPU and displays
    InForeground,
    /// The OS wants GPU/display ownership back
    ReleaseRequested,
    /// The application must shut down
    Exiting,
}

/// One presentation platform
///
/// Every method is called from the single rendering thread. The only
/// method allowed to block for an OS-scheduled duration is
/// `wait_for_flip`.
pub trait RenderSurfaceBackend: SurfaceAllocator {
    /// Backend name (for logs)
    fn name(&self) -> &str;

    /// Surfaces this backend presents, in allocation order
    fn surfaces(&self) -> &'static [Surface];

    // ===== DEVICE =====

    /// Open the native device (command buffer, window, GL context...)
    fn open_device(&mut self, config: &WindowConfig) -> Result<()>;

    /// Build the GPU context state object
    ///
    /// Called once after the first successful allocation. The context
    /// survives foreground release.
    fn create_context(&mut self) -> Result<()>;

    /// Make the native context current on the calling thread
    fn make_context_current(&mut self) {}

    /// Close the native device; must tolerate a device that never opened
    fn close_device(&mut self);

    /// False once the platform asked to stop (close flag, teardown)
    fn is_running(&self) -> bool {
        true
    }

    // ===== BINDING / CLEARS =====

    /// Bind the set's color and depth buffers as the active render target
    fn bind(&mut self, set: &RenderTargetSet);

    /// Clear buffers of the given (current) set
    fn clear(&mut self, set: &mut RenderTargetSet, request: &ClearRequest) -> ClearEffect;

    /// Export the sampling handle of a set's color texture
    fn color_texture_handle(&self, set: &RenderTargetSet) -> NativeHandle {
        set.color_texture.buffer.memory
    }

    // ===== SWAP INTERVAL =====

    fn set_swap_interval(&mut self, interval: u32);

    /// Interval that actually paces presentation
    fn swap_interval(&self) -> u32;

    // ===== PRESENTATION PROTOCOL =====

    /// Prepare the presentable surfaces for the copy
    fn begin_present(&mut self, sets: &[RenderTargetSet]);

    /// Submit pending GPU commands without draining the pipeline
    fn flush(&mut self);

    /// Resolve color targets into the presentable surface(s)
    fn copy_to_scan_out(&mut self, sets: &[RenderTargetSet]);

    /// Swap which physical buffer is presented (non-blocking)
    fn flip(&mut self);

    /// Re-bind the context and the current render target after the copy
    fn restore_context(&mut self, current: &RenderTargetSet);

    /// Block until the flip has completed
    fn wait_for_flip(&mut self);

    /// Turn every physical output back on
    fn enable_outputs(&mut self);

    // ===== FOREGROUND LIFECYCLE =====

    /// Poll the OS for foreground notices
    fn poll_foreground(&mut self) -> ForegroundStatus;

    /// Tell the OS that every GPU-owned resource has been released
    fn acknowledge_release(&mut self) {}

    /// Block until host-OS threads waiting on this process are released
    fn block_threads_on_exit(&mut self) {}

    // ===== DEPTH RESOLVE =====

    fn invalidate_depth_cache(&mut self, set: &RenderTargetSet);

    /// Convert the opaque depth buffer into the linear depth texture
    fn convert_depth_to_texture(&mut self, set: &mut RenderTargetSet) -> Result<()>;

    fn invalidate_depth_texture_cache(&mut self, set: &RenderTargetSet);

    // ===== RESIZE =====

    /// Re-specify storage of every set at a new size, keeping the handles
    ///
    /// Returns `Ok(false)` when the backend does not support resizing. On
    /// error the sets keep their previous size and stay usable; their
    /// contents are undefined.
    fn resize_targets(&mut self, _sets: &mut [RenderTargetSet], _width: u32, _height: u32) -> Result<bool> {
        Ok(false)
    }

    /// Framebuffer size notification received while polling host events
    fn take_pending_resize(&mut self) -> Option<(i32, i32)> {
        None
    }
}
