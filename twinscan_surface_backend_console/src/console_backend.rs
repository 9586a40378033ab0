/// ConsoleBackend - RenderSurfaceBackend for the dual-screen console
///
/// Presents a TV surface and a handheld (DRC) surface through hardware
/// scan buffers. Scan buffers come from the foreground bucket heap and
/// render targets from MEM1; both are frame heaps bulk-freed whenever the
/// OS takes the foreground away. The command buffer and the context state
/// object live in the default heap and survive foreground release.

use twinscan_surface::twinscan::backend::{
    ClearEffect, ClearFlags, ClearRequest, ForegroundStatus, RenderSurfaceBackend, SurfaceAllocator,
};
use twinscan_surface::twinscan::surface::{
    AllocatedBuffer, BufferLayout, NativeHandle, RenderTargetSet, Surface, SurfaceDesc,
};
use twinscan_surface::twinscan::{Error, Result, WindowConfig};
use twinscan_surface::{surface_bail, surface_debug, surface_err, surface_info, surface_trace, surface_warn};

use crate::console_config::ConsoleConfig;
use crate::console_display::{
    BaseHeap, DisplayController, InvalidateMode, ScanTarget, COMMAND_BUFFER_ALIGNMENT,
    CONTEXT_STATE_ALIGNMENT, CONTEXT_STATE_SIZE, DRC_HEIGHT, DRC_WIDTH, SCAN_BUFFER_ALIGNMENT,
};
use crate::console_emulated_display::EmulatedDisplay;
use crate::console_foreground::ForegroundLifecycle;
use crate::console_frame_heap::FrameHeap;
use crate::console_mode_table::{select_tv_mode, TvMode};
use crate::console_scripted_lifecycle::ScriptedLifecycle;

static CONSOLE_SURFACES: [Surface; 2] = [Surface::Primary, Surface::Secondary];

/// Console backend driving the software display and scripted lifecycle
pub type EmulatedConsoleBackend = ConsoleBackend<EmulatedDisplay, ScriptedLifecycle>;

/// Scan buffer registered with the display controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanBuffer {
    pub memory: NativeHandle,
    pub size: u64,
}

pub struct ConsoleBackend<D: DisplayController, L: ForegroundLifecycle> {
    display: D,
    lifecycle: L,
    config: ConsoleConfig,

    command_buffer: Option<NativeHandle>,
    context_state: Option<NativeHandle>,

    mem1: Option<FrameHeap>,
    foreground: Option<FrameHeap>,
    tv_scan: Option<ScanBuffer>,
    drc_scan: Option<ScanBuffer>,
    tv_mode: Option<TvMode>,

    running: bool,
    last_status: ForegroundStatus,
}

impl<D: DisplayController, L: ForegroundLifecycle> ConsoleBackend<D, L> {
    pub fn new(display: D, lifecycle: L) -> Self {
        Self::with_config(display, lifecycle, ConsoleConfig::default())
    }

    pub fn with_config(display: D, lifecycle: L, config: ConsoleConfig) -> Self {
        Self {
            display,
            lifecycle,
            config,
            command_buffer: None,
            context_state: None,
            mem1: None,
            foreground: None,
            tv_scan: None,
            drc_scan: None,
            tv_mode: None,
            running: false,
            last_status: ForegroundStatus::InForeground,
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn lifecycle(&self) -> &L {
        &self.lifecycle
    }

    pub fn lifecycle_mut(&mut self) -> &mut L {
        &mut self.lifecycle
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Negotiated TV mode of the current foreground session
    pub fn tv_mode(&self) -> Option<TvMode> {
        self.tv_mode
    }

    pub fn tv_scan_buffer(&self) -> Option<ScanBuffer> {
        self.tv_scan
    }

    pub fn drc_scan_buffer(&self) -> Option<ScanBuffer> {
        self.drc_scan
    }

    pub fn context_state(&self) -> Option<NativeHandle> {
        self.context_state
    }

    /// Bytes used in (MEM1, foreground bucket), None when not in foreground
    pub fn heap_usage(&self) -> Option<(u64, u64)> {
        match (&self.mem1, &self.foreground) {
            (Some(mem1), Some(fg)) => Some((mem1.used(), fg.used())),
            _ => None,
        }
    }

    // ===== FOREGROUND SESSION =====

    fn acquire_foreground(&mut self, width: u32, height: u32) -> Result<Vec<RenderTargetSet>> {
        let mem1 = self.display.base_heap(BaseHeap::Mem1);
        let foreground = self.display.base_heap(BaseHeap::Foreground);
        let (Some(mem1), Some(foreground)) = (mem1, foreground) else {
            surface_bail!("twinscan::console",
                Error::AllocationError("base heap handles unavailable".to_string()));
        };
        self.mem1 = Some(FrameHeap::new(mem1));
        self.foreground = Some(FrameHeap::new(foreground));

        let mode = select_tv_mode(width, height, self.display.system_tv_scan_mode());
        surface_info!("twinscan::console", "TV mode negotiated: requested {}x{}, using {}x{} ({:?})",
            width, height, mode.width, mode.height, mode.render_mode);
        self.tv_mode = Some(mode);

        // Scan buffers first: they are presentation-side memory, not render targets
        let tv_size = self.display.calc_tv_size(mode.render_mode);
        let tv = Self::heap_alloc(self.foreground.as_mut(), tv_size, SCAN_BUFFER_ALIGNMENT, "TV scan buffer")?;
        self.display.invalidate(InvalidateMode::Cpu, tv, tv_size);
        self.display.set_tv_buffer(tv, tv_size, mode.render_mode);
        self.display.set_tv_scale(mode.width, mode.height);
        self.tv_scan = Some(ScanBuffer { memory: tv, size: tv_size });

        let drc_size = self.display.calc_drc_size();
        let drc = Self::heap_alloc(self.foreground.as_mut(), drc_size, SCAN_BUFFER_ALIGNMENT, "DRC scan buffer")?;
        self.display.invalidate(InvalidateMode::Cpu, drc, drc_size);
        self.display.set_drc_buffer(drc, drc_size);
        self.display.set_drc_scale(DRC_WIDTH, DRC_HEIGHT);
        self.drc_scan = Some(ScanBuffer { memory: drc, size: drc_size });

        // Both surfaces render at the TV size
        let mut sets = Vec::with_capacity(CONSOLE_SURFACES.len());
        for surface in CONSOLE_SURFACES {
            sets.push(self.allocate_set(surface, mode.width, mode.height)?);
        }

        self.display.set_tv_enable(true);
        self.display.set_drc_enable(true);
        Ok(sets)
    }

    fn allocate_set(&mut self, surface: Surface, width: u32, height: u32) -> Result<RenderTargetSet> {
        let desc = RenderTargetSet::describe(surface, width, height);

        let color = self.allocate_published(&desc.color, InvalidateMode::CpuTexture, surface, "color buffer")?;
        let depth = self.allocate_published(&desc.depth, InvalidateMode::Cpu, surface, "depth buffer")?;
        let depth_texture =
            self.allocate_published(&desc.depth_texture, InvalidateMode::CpuTexture, surface, "depth texture")?;

        Ok(RenderTargetSet::assemble(surface, color, depth, depth_texture))
    }

    /// Size-query, allocate from MEM1, then flush from CPU cache
    fn allocate_published(
        &mut self,
        desc: &SurfaceDesc,
        mode: InvalidateMode,
        surface: Surface,
        what: &str,
    ) -> Result<AllocatedBuffer> {
        let layout: BufferLayout = self.display.calc_surface_layout(desc);
        let memory = Self::heap_alloc(
            self.mem1.as_mut(),
            layout.byte_size,
            layout.alignment,
            &format!("{} {}", surface, what),
        )?;
        self.display.invalidate(mode, memory, layout.byte_size);
        Ok(AllocatedBuffer { layout, memory })
    }

    fn heap_alloc(heap: Option<&mut FrameHeap>, size: u64, alignment: u32, what: &str) -> Result<NativeHandle> {
        let Some(heap) = heap else {
            return Err(surface_err!("twinscan::console",
                Error::AllocationError(format!("{}: heap not acquired", what))));
        };
        match heap.alloc(size, alignment) {
            Some(memory) => Ok(memory),
            None => Err(surface_err!("twinscan::console", Error::AllocationError(format!(
                "{}: {} bytes refused ({} of {} bytes free)",
                what, size, heap.available(), heap.region().size)))),
        }
    }

    /// Bulk-free both frame heaps and forget every scan buffer
    fn release_foreground(&mut self) {
        let had_heaps = self.mem1.is_some() || self.foreground.is_some();
        if let Some(mut foreground) = self.foreground.take() {
            foreground.free_all();
        }
        if let Some(mut mem1) = self.mem1.take() {
            mem1.free_all();
        }
        self.tv_scan = None;
        self.drc_scan = None;

        if had_heaps {
            surface_debug!("twinscan::console", "Foreground heaps freed");
        }
    }

    fn scan_target(surface: Surface) -> ScanTarget {
        match surface {
            Surface::Primary => ScanTarget::Tv,
            Surface::Secondary => ScanTarget::Drc,
        }
    }
}

impl EmulatedConsoleBackend {
    /// Backend over a default software display and an empty lifecycle script
    pub fn emulated() -> Self {
        Self::new(EmulatedDisplay::new(), ScriptedLifecycle::new())
    }
}

impl<D: DisplayController, L: ForegroundLifecycle> SurfaceAllocator for ConsoleBackend<D, L> {
    fn allocate_targets(&mut self, width: u32, height: u32) -> Result<Vec<RenderTargetSet>> {
        match self.acquire_foreground(width, height) {
            Ok(sets) => Ok(sets),
            Err(e) => {
                self.release_foreground();
                self.tv_mode = None;
                Err(e)
            }
        }
    }

    fn release_targets(&mut self, sets: &mut [RenderTargetSet]) {
        self.release_foreground();
        for set in sets.iter_mut() {
            set.release();
        }
    }
}

impl<D: DisplayController, L: ForegroundLifecycle> RenderSurfaceBackend for ConsoleBackend<D, L> {
    fn name(&self) -> &str {
        "console"
    }

    fn surfaces(&self) -> &'static [Surface] {
        &CONSOLE_SURFACES
    }

    fn open_device(&mut self, _config: &WindowConfig) -> Result<()> {
        let size = self.config.command_buffer_size;
        let Some(command_buffer) = self.display.default_heap_alloc(size, COMMAND_BUFFER_ALIGNMENT) else {
            surface_bail!("twinscan::console", Error::AllocationError(format!(
                "command buffer of {} bytes refused", size)));
        };
        self.display.initialize(command_buffer, size);
        self.command_buffer = Some(command_buffer);
        surface_info!("twinscan::console", "GPU initialized with a {} KiB command buffer", size / 1024);
        Ok(())
    }

    fn create_context(&mut self) -> Result<()> {
        if self.context_state.is_some() {
            return Ok(());
        }

        let Some(state) = self.display.default_heap_alloc(CONTEXT_STATE_SIZE, CONTEXT_STATE_ALIGNMENT) else {
            surface_bail!("twinscan::console",
                Error::AllocationError("context state object refused".to_string()));
        };
        self.display.setup_context_state(state);
        self.context_state = Some(state);

        self.lifecycle.init();
        self.running = true;
        Ok(())
    }

    fn make_context_current(&mut self) {
        if let Some(state) = self.context_state {
            self.display.set_context_state(state);
        }
    }

    fn close_device(&mut self) {
        self.running = false;
        if let Some(command_buffer) = self.command_buffer.take() {
            self.display.default_heap_free(command_buffer);
        }
        if let Some(state) = self.context_state.take() {
            self.display.default_heap_free(state);
        }
        self.release_foreground();
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn bind(&mut self, set: &RenderTargetSet) {
        self.make_context_current();
        self.display.set_color_buffer(&set.color_buffer);
        self.display.set_depth_buffer(&set.depth_buffer);
    }

    fn clear(&mut self, set: &mut RenderTargetSet, request: &ClearRequest) -> ClearEffect {
        if request.clears_color() {
            self.display.clear_color(&set.color_buffer, request.color);
        }
        let depth_stencil = request.flags & ClearFlags::DEPTH_STENCIL;
        if !depth_stencil.is_empty() {
            self.display.clear_depth_stencil(&set.depth_buffer, request.depth, request.stencil, depth_stencil);
        }
        ClearEffect::BindingInvalidated
    }

    fn set_swap_interval(&mut self, interval: u32) {
        self.display.set_swap_interval(interval);
        match self.config.presentation_rate(interval) {
            Some(rate) => surface_debug!("twinscan::console", "Swap interval {} ({:.1} Hz)", interval, rate),
            None => surface_debug!("twinscan::console", "Swap interval 0 (unpaced)"),
        }
    }

    fn swap_interval(&self) -> u32 {
        self.display.swap_interval()
    }

    fn begin_present(&mut self, _sets: &[RenderTargetSet]) {
        // Scan buffers are always the presentation target
    }

    fn flush(&mut self) {
        self.display.flush();
    }

    fn copy_to_scan_out(&mut self, sets: &[RenderTargetSet]) {
        for set in sets {
            self.display.copy_color_buffer_to_scan_buffer(&set.color_buffer, Self::scan_target(set.surface));
        }
    }

    fn flip(&mut self) {
        self.display.swap_scan_buffers();
    }

    fn restore_context(&mut self, _current: &RenderTargetSet) {
        self.make_context_current();
    }

    fn wait_for_flip(&mut self) {
        self.display.wait_for_flip();
    }

    fn enable_outputs(&mut self) {
        self.display.set_tv_enable(true);
        self.display.set_drc_enable(true);
    }

    fn poll_foreground(&mut self) -> ForegroundStatus {
        let status = self.lifecycle.process_messages();
        if status != self.last_status {
            match status {
                ForegroundStatus::InForeground => surface_info!("twinscan::console", "Foreground acquired"),
                ForegroundStatus::ReleaseRequested => surface_warn!("twinscan::console", "Foreground release requested"),
                ForegroundStatus::Exiting => surface_info!("twinscan::console", "Process exiting"),
            }
            self.last_status = status;
        }
        status
    }

    fn acknowledge_release(&mut self) {
        self.lifecycle.draw_done_release();
    }

    fn block_threads_on_exit(&mut self) {
        self.lifecycle.shutdown();
        self.lifecycle.block_threads_on_exit();
    }

    fn invalidate_depth_cache(&mut self, set: &RenderTargetSet) {
        let depth = &set.depth_buffer.buffer;
        self.display.invalidate(InvalidateMode::DepthBuffer, depth.memory, depth.layout.byte_size);
    }

    fn convert_depth_to_texture(&mut self, set: &mut RenderTargetSet) -> Result<()> {
        self.display.convert_depth_buffer_to_texture(&set.depth_buffer, &set.depth_texture);
        surface_trace!("twinscan::console", "{} depth flattened into texture", set.surface);
        Ok(())
    }

    fn invalidate_depth_texture_cache(&mut self, set: &RenderTargetSet) {
        let texture = &set.depth_texture.buffer;
        self.display.invalidate(InvalidateMode::Texture, texture.memory, texture.layout.byte_size);
    }
}

#[cfg(test)]
#[path = "console_backend_tests.rs"]
mod tests;
