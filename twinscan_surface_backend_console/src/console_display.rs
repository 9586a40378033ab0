/// DisplayController trait - the console GPU/display controller primitives
///
/// Thin capability interface over the native graphics library: heap
/// handles, scan buffer setup, surface size queries, cache invalidation,
/// context state, clears and the scan-out copy/flip primitives.

use twinscan_surface::glam::Vec4;
use twinscan_surface::twinscan::backend::ClearFlags;
use twinscan_surface::twinscan::surface::{
    BufferLayout, ColorBuffer, DepthBuffer, DepthTexture, NativeHandle, SurfaceDesc,
};

/// Required alignment of scan buffers
pub const SCAN_BUFFER_ALIGNMENT: u32 = 0x1000;

/// Required alignment of the GPU command buffer
pub const COMMAND_BUFFER_ALIGNMENT: u32 = 0x40;

/// Required alignment and size of the GPU context state object
pub const CONTEXT_STATE_ALIGNMENT: u32 = 0x100;
pub const CONTEXT_STATE_SIZE: u64 = 0xA100;

/// Handheld (DRC) scan buffer dimensions
pub const DRC_WIDTH: u32 = 854;
pub const DRC_HEIGHT: u32 = 480;

/// Base memory heaps exposed by the OS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseHeap {
    /// Fast embedded memory for render targets
    Mem1,
    /// Foreground bucket, only valid while in foreground
    Foreground,
}

/// Address range of a base heap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapRegion {
    pub base: u64,
    pub size: u64,
}

/// Scan mode the TV is configured for in system settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TvScanMode {
    I576,
    I480,
    P480,
    P720,
    I1080,
    P1080,
}

impl TvScanMode {
    /// Interlaced SD modes cannot drive a 1080 scan buffer
    pub fn is_interlaced_sd(self) -> bool {
        matches!(self, TvScanMode::I480 | TvScanMode::I576)
    }
}

/// TV scan buffer render mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TvRenderMode {
    Standard480p,
    Wide480p,
    Wide720p,
    Wide1080p,
}

impl TvRenderMode {
    /// Scan buffer dimensions of this mode
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            TvRenderMode::Standard480p => (640, 480),
            TvRenderMode::Wide480p => (854, 480),
            TvRenderMode::Wide720p => (1280, 720),
            TvRenderMode::Wide1080p => (1920, 1080),
        }
    }
}

/// Physical scan-out target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanTarget {
    Tv,
    Drc,
}

/// Cache invalidation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidateMode {
    /// CPU cache flush of a buffer the GPU reads as raw memory
    Cpu,
    /// CPU cache flush of a buffer the GPU samples as a texture
    CpuTexture,
    /// GPU depth buffer cache
    DepthBuffer,
    /// GPU texture cache
    Texture,
}

/// Console GPU and display controller
pub trait DisplayController {
    /// Initialize the GPU with its command buffer
    fn initialize(&mut self, command_buffer: NativeHandle, size: u64);

    /// Handle of a base heap, None when the OS does not grant it
    fn base_heap(&mut self, heap: BaseHeap) -> Option<HeapRegion>;

    /// Allocate from the process default heap (survives foreground release)
    fn default_heap_alloc(&mut self, size: u64, alignment: u32) -> Option<NativeHandle>;

    fn default_heap_free(&mut self, memory: NativeHandle);

    fn system_tv_scan_mode(&self) -> TvScanMode;

    /// Byte size of a double-buffered TV scan buffer in `mode`
    fn calc_tv_size(&self, mode: TvRenderMode) -> u64;

    /// Byte size of a double-buffered handheld scan buffer
    fn calc_drc_size(&self) -> u64;

    fn set_tv_buffer(&mut self, memory: NativeHandle, size: u64, mode: TvRenderMode);
    fn set_tv_scale(&mut self, width: u32, height: u32);
    fn set_drc_buffer(&mut self, memory: NativeHandle, size: u64);
    fn set_drc_scale(&mut self, width: u32, height: u32);

    /// Size, pitch and alignment of a surface (platform size query)
    fn calc_surface_layout(&self, desc: &SurfaceDesc) -> BufferLayout;

    fn invalidate(&mut self, mode: InvalidateMode, memory: NativeHandle, size: u64);

    /// Initialize a context state object to defaults
    fn setup_context_state(&mut self, state: NativeHandle);
    fn set_context_state(&mut self, state: NativeHandle);
    fn set_color_buffer(&mut self, buffer: &ColorBuffer);
    fn set_depth_buffer(&mut self, buffer: &DepthBuffer);

    /// Clear a color buffer; invalidates the active context binding
    fn clear_color(&mut self, buffer: &ColorBuffer, color: Vec4);

    /// Clear depth and/or stencil; invalidates the active context binding
    fn clear_depth_stencil(&mut self, buffer: &DepthBuffer, depth: f32, stencil: u8, flags: ClearFlags);

    fn flush(&mut self);
    fn copy_color_buffer_to_scan_buffer(&mut self, buffer: &ColorBuffer, target: ScanTarget);
    fn swap_scan_buffers(&mut self);

    /// Block until the last flip has been displayed
    fn wait_for_flip(&mut self);

    fn set_tv_enable(&mut self, enabled: bool);
    fn set_drc_enable(&mut self, enabled: bool);

    fn set_swap_interval(&mut self, interval: u32);
    fn swap_interval(&self) -> u32;

    /// Flatten the tiled depth surface into a linear texture surface
    fn convert_depth_buffer_to_texture(&mut self, src: &DepthBuffer, dst: &DepthTexture);
}
