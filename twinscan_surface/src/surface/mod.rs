//! Surface data model
//!
//! Surfaces, pixel formats, buffer layouts and the render target sets
//! that back each presentation target.

mod format;
mod surface_id;
mod render_target_set;
mod render_targets;

pub use format::{
    AllocatedBuffer, BufferLayout, Component, ComponentSwizzle, NativeHandle, PixelFormat,
    SurfaceDesc, SurfaceUsage, TileMode,
};
pub use surface_id::Surface;
pub use render_target_set::{
    ColorBuffer, ColorTexture, DepthBuffer, DepthTexture, RenderTargetSet, RenderTargetSetDesc,
    DEFAULT_CLEAR_DEPTH, DEFAULT_CLEAR_STENCIL,
};
pub use render_targets::RenderTargets;
