/// SurfaceAllocator trait and the shared acquire/release front-end
///
/// Backends implement the raw allocation. The front-end functions validate
/// requests before anything is allocated and make release idempotent.

use crate::error::{Error, Result};
use crate::surface::{RenderTargetSet, RenderTargets};
use crate::{surface_bail, surface_debug, surface_info};

/// Platform allocation of render target memory
pub trait SurfaceAllocator {
    /// Allocate one render target set per surface
    ///
    /// The backend may negotiate the size against its supported modes: every
    /// returned set carries the actual dimensions, which can differ from the
    /// request. Buffers written by the CPU before first GPU use must be
    /// published (cache flushed) before they are registered with the GPU.
    ///
    /// # Errors
    ///
    /// `Error::AllocationError` if any single buffer allocation is refused.
    /// Partially created state must be rolled back before returning.
    fn allocate_targets(&mut self, width: u32, height: u32) -> Result<Vec<RenderTargetSet>>;

    /// Free the memory of every given set and zero the structures
    ///
    /// Sets that are already released must be left untouched.
    fn release_targets(&mut self, sets: &mut [RenderTargetSet]);
}

/// Validate a request and allocate every surface's render targets
///
/// # Errors
///
/// - `Error::InvalidDimensions` for zero/negative requests (nothing is allocated)
/// - `Error::AllocationError` from the backend
pub fn acquire<A: SurfaceAllocator + ?Sized>(
    allocator: &mut A,
    width: i32,
    height: i32,
) -> Result<RenderTargets> {
    if width <= 0 || height <= 0 {
        surface_bail!("twinscan::SurfaceAllocator", Error::InvalidDimensions {
            width: width as i64,
            height: height as i64,
        });
    }

    let sets = allocator.allocate_targets(width as u32, height as u32)?;
    let Some(first) = sets.first() else {
        surface_bail!("twinscan::SurfaceAllocator",
            Error::AllocationError("backend returned no render targets".to_string()));
    };
    let (actual_width, actual_height) = (first.width(), first.height());

    surface_info!("twinscan::SurfaceAllocator",
        "Acquired {} render target set(s): requested {}x{}, got {}x{}",
        sets.len(), width, height, actual_width, actual_height);

    Ok(RenderTargets::new(sets, actual_width, actual_height))
}

/// Release every set that still owns memory
///
/// Calling this on already released targets has no effect.
pub fn release<A: SurfaceAllocator + ?Sized>(allocator: &mut A, targets: &mut RenderTargets) {
    if targets.is_empty() || targets.is_released() {
        surface_debug!("twinscan::SurfaceAllocator", "Release skipped: nothing allocated");
        return;
    }

    allocator.release_targets(targets.sets_mut());
    for set in targets.sets_mut() {
        set.release();
    }
    surface_info!("twinscan::SurfaceAllocator", "Released {} render target set(s)", targets.len());
}

#[cfg(test)]
#[path = "allocator_tests.rs"]
mod tests;
