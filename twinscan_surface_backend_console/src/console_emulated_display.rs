/// EmulatedDisplay - software DisplayController for headless runs and tests
///
/// Tracks what real hardware would make observable: the fill value of each
/// buffer, both scan-out front/back buffers, the bound render targets and
/// context, cache publications, flips and flip waits. Buffers are tracked
/// by memory address; pixel contents are modelled as one uniform value per
/// buffer since clears are the only writes issued through this interface.

use rustc_hash::{FxHashMap, FxHashSet};
use twinscan_surface::glam::Vec4;
use twinscan_surface::twinscan::backend::ClearFlags;
use twinscan_surface::twinscan::surface::{
    BufferLayout, ColorBuffer, DepthBuffer, DepthTexture, NativeHandle, SurfaceDesc, TileMode,
};

use crate::console_display::{
    BaseHeap, DisplayController, HeapRegion, InvalidateMode, ScanTarget, TvRenderMode, TvScanMode,
    DRC_HEIGHT, DRC_WIDTH,
};

/// Default MEM1 size (32 MiB)
pub const DEFAULT_MEM1_SIZE: u64 = 0x200_0000;

/// Default foreground bucket size (40 MiB)
pub const DEFAULT_FOREGROUND_SIZE: u64 = 0x280_0000;

const MEM1_BASE: u64 = 0xF400_0000;
const FOREGROUND_BASE: u64 = 0xE000_0000;
const DEFAULT_HEAP_BASE: u64 = 0x1000_0000;

/// Tiled surfaces are padded to these pitch/height multiples
const TILE_PITCH_ALIGN: u32 = 32;
const TILE_HEIGHT_ALIGN: u32 = 8;
const TILED_ALIGNMENT: u32 = 0x800;
const LINEAR_ALIGNMENT: u32 = 0x100;

/// State of one physical scan-out target
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOut {
    pub buffer: Option<(NativeHandle, u64)>,
    pub scale: (u32, u32),
    pub render_mode: Option<TvRenderMode>,
    /// Content copied since the last flip
    pub back: Option<Vec4>,
    /// Content being displayed
    pub front: Option<Vec4>,
    pub enabled: bool,
}

impl ScanOut {
    fn flip(&mut self) {
        if self.back.is_some() {
            self.front = self.back.take();
        }
    }
}

pub struct EmulatedDisplay {
    mem1_size: u64,
    foreground_size: u64,
    grant_heaps: bool,
    tv_scan_mode: TvScanMode,
    command_buffer: Option<(NativeHandle, u64)>,

    default_heap: FxHashMap<u64, u64>,
    default_heap_head: u64,
    default_heap_limit: Option<usize>,

    published: FxHashSet<u64>,
    unpublished_uses: usize,
    invalidations: Vec<(InvalidateMode, NativeHandle)>,

    tv: ScanOut,
    drc: ScanOut,

    context_states: FxHashSet<u64>,
    context_state: Option<NativeHandle>,
    bound_color: Option<NativeHandle>,
    bound_depth: Option<NativeHandle>,

    color_contents: FxHashMap<u64, Vec4>,
    depth_contents: FxHashMap<u64, (f32, u8)>,
    depth_texture_contents: FxHashMap<u64, f32>,

    swap_interval: u32,
    flushes: u64,
    flips: u64,
    flip_waits: u64,
    pending_flip: bool,
    commands: Vec<String>,
}

impl EmulatedDisplay {
    pub fn new() -> Self {
        Self {
            mem1_size: DEFAULT_MEM1_SIZE,
            foreground_size: DEFAULT_FOREGROUND_SIZE,
            grant_heaps: true,
            tv_scan_mode: TvScanMode::P1080,
            command_buffer: None,
            default_heap: FxHashMap::default(),
            default_heap_head: DEFAULT_HEAP_BASE,
            default_heap_limit: None,
            published: FxHashSet::default(),
            unpublished_uses: 0,
            invalidations: Vec::new(),
            tv: ScanOut::default(),
            drc: ScanOut::default(),
            context_states: FxHashSet::default(),
            context_state: None,
            bound_color: None,
            bound_depth: None,
            color_contents: FxHashMap::default(),
            depth_contents: FxHashMap::default(),
            depth_texture_contents: FxHashMap::default(),
            swap_interval: 0,
            flushes: 0,
            flips: 0,
            flip_waits: 0,
            pending_flip: false,
            commands: Vec::new(),
        }
    }

    pub fn with_mem1_size(mut self, size: u64) -> Self {
        self.mem1_size = size;
        self
    }

    pub fn with_foreground_size(mut self, size: u64) -> Self {
        self.foreground_size = size;
        self
    }

    pub fn with_tv_scan_mode(mut self, mode: TvScanMode) -> Self {
        self.tv_scan_mode = mode;
        self
    }

    /// Refuse default heap allocations after `count` live blocks
    pub fn with_default_heap_limit(mut self, count: usize) -> Self {
        self.default_heap_limit = Some(count);
        self
    }

    /// Change the system TV setting, as the user can from the home menu
    pub fn set_tv_scan_mode(&mut self, mode: TvScanMode) {
        self.tv_scan_mode = mode;
    }

    /// Grant or withhold the base heap handles
    pub fn set_heaps_granted(&mut self, granted: bool) {
        self.grant_heaps = granted;
    }

    // ===== OBSERVATION =====

    pub fn tv(&self) -> &ScanOut {
        &self.tv
    }

    pub fn drc(&self) -> &ScanOut {
        &self.drc
    }

    pub fn command_buffer(&self) -> Option<(NativeHandle, u64)> {
        self.command_buffer
    }

    pub fn context_state(&self) -> Option<NativeHandle> {
        self.context_state
    }

    pub fn bound_color(&self) -> Option<NativeHandle> {
        self.bound_color
    }

    pub fn bound_depth(&self) -> Option<NativeHandle> {
        self.bound_depth
    }

    pub fn color_content(&self, memory: NativeHandle) -> Option<Vec4> {
        self.color_contents.get(&memory.0).copied()
    }

    pub fn depth_content(&self, memory: NativeHandle) -> Option<(f32, u8)> {
        self.depth_contents.get(&memory.0).copied()
    }

    pub fn depth_texture_content(&self, memory: NativeHandle) -> Option<f32> {
        self.depth_texture_contents.get(&memory.0).copied()
    }

    /// Buffers handed to the GPU without a prior CPU cache flush
    pub fn unpublished_uses(&self) -> usize {
        self.unpublished_uses
    }

    pub fn invalidations(&self) -> &[(InvalidateMode, NativeHandle)] {
        &self.invalidations
    }

    pub fn default_heap_live(&self) -> usize {
        self.default_heap.len()
    }

    pub fn flushes(&self) -> u64 {
        self.flushes
    }

    pub fn flips(&self) -> u64 {
        self.flips
    }

    pub fn flip_waits(&self) -> u64 {
        self.flip_waits
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    fn require_published(&mut self, memory: NativeHandle) {
        if !self.published.contains(&memory.0) {
            self.unpublished_uses += 1;
        }
    }

    fn forget_region(&mut self, region: HeapRegion) {
        let end = region.base + region.size;
        self.published.retain(|addr| *addr < region.base || *addr >= end);
    }

    fn scan_out(&mut self, target: ScanTarget) -> &mut ScanOut {
        match target {
            ScanTarget::Tv => &mut self.tv,
            ScanTarget::Drc => &mut self.drc,
        }
    }
}

impl Default for EmulatedDisplay {
    fn default() -> Self {
        Self::new()
    }
}

fn align_up(value: u32, align: u32) -> u32 {
    value.div_ceil(align) * align
}

impl DisplayController for EmulatedDisplay {
    fn initialize(&mut self, command_buffer: NativeHandle, size: u64) {
        self.commands.push("initialize".to_string());
        self.command_buffer = Some((command_buffer, size));
    }

    fn base_heap(&mut self, heap: BaseHeap) -> Option<HeapRegion> {
        if !self.grant_heaps {
            return None;
        }
        let region = match heap {
            BaseHeap::Mem1 => HeapRegion { base: MEM1_BASE, size: self.mem1_size },
            BaseHeap::Foreground => HeapRegion { base: FOREGROUND_BASE, size: self.foreground_size },
        };
        // A freshly granted heap holds no published data
        self.forget_region(region);
        Some(region)
    }

    fn default_heap_alloc(&mut self, size: u64, alignment: u32) -> Option<NativeHandle> {
        if let Some(limit) = self.default_heap_limit {
            if self.default_heap.len() >= limit {
                return None;
            }
        }
        let align = alignment.max(1) as u64;
        let addr = self.default_heap_head.div_ceil(align) * align;
        self.default_heap_head = addr + size.max(1);
        self.default_heap.insert(addr, size);
        Some(NativeHandle(addr))
    }

    fn default_heap_free(&mut self, memory: NativeHandle) {
        self.default_heap.remove(&memory.0);
    }

    fn system_tv_scan_mode(&self) -> TvScanMode {
        self.tv_scan_mode
    }

    fn calc_tv_size(&self, mode: TvRenderMode) -> u64 {
        let (w, h) = mode.dimensions();
        w as u64 * h as u64 * 4 * 2
    }

    fn calc_drc_size(&self) -> u64 {
        DRC_WIDTH as u64 * DRC_HEIGHT as u64 * 4 * 2
    }

    fn set_tv_buffer(&mut self, memory: NativeHandle, size: u64, mode: TvRenderMode) {
        self.commands.push(format!("set_tv_buffer {:?}", mode));
        self.require_published(memory);
        self.tv.buffer = Some((memory, size));
        self.tv.render_mode = Some(mode);
        self.tv.back = None;
        self.tv.front = None;
    }

    fn set_tv_scale(&mut self, width: u32, height: u32) {
        self.tv.scale = (width, height);
    }

    fn set_drc_buffer(&mut self, memory: NativeHandle, size: u64) {
        self.commands.push("set_drc_buffer".to_string());
        self.require_published(memory);
        self.drc.buffer = Some((memory, size));
        self.drc.back = None;
        self.drc.front = None;
    }

    fn set_drc_scale(&mut self, width: u32, height: u32) {
        self.drc.scale = (width, height);
    }

    fn calc_surface_layout(&self, desc: &SurfaceDesc) -> BufferLayout {
        let bpp = desc.format.bytes_per_pixel() as u64;
        let (pitch, rows, alignment) = match desc.tile_mode {
            TileMode::Default => (
                align_up(desc.width, TILE_PITCH_ALIGN),
                align_up(desc.height, TILE_HEIGHT_ALIGN),
                TILED_ALIGNMENT,
            ),
            TileMode::Linear => (desc.width, desc.height, LINEAR_ALIGNMENT),
        };
        BufferLayout {
            desc: *desc,
            pitch,
            byte_size: pitch as u64 * rows as u64 * bpp,
            alignment,
        }
    }

    fn invalidate(&mut self, mode: InvalidateMode, memory: NativeHandle, _size: u64) {
        if matches!(mode, InvalidateMode::Cpu | InvalidateMode::CpuTexture) {
            self.published.insert(memory.0);
        }
        self.invalidations.push((mode, memory));
    }

    fn setup_context_state(&mut self, state: NativeHandle) {
        self.context_states.insert(state.0);
    }

    fn set_context_state(&mut self, state: NativeHandle) {
        self.commands.push("set_context_state".to_string());
        if self.context_states.contains(&state.0) {
            self.context_state = Some(state);
        }
    }

    fn set_color_buffer(&mut self, buffer: &ColorBuffer) {
        self.commands.push("set_color_buffer".to_string());
        self.require_published(buffer.buffer.memory);
        self.bound_color = Some(buffer.buffer.memory);
    }

    fn set_depth_buffer(&mut self, buffer: &DepthBuffer) {
        self.commands.push("set_depth_buffer".to_string());
        self.require_published(buffer.buffer.memory);
        self.bound_depth = Some(buffer.buffer.memory);
    }

    fn clear_color(&mut self, buffer: &ColorBuffer, color: Vec4) {
        self.commands.push("clear_color".to_string());
        self.color_contents.insert(buffer.buffer.memory.0, color);
        self.context_state = None;
        self.bound_color = None;
        self.bound_depth = None;
    }

    fn clear_depth_stencil(&mut self, buffer: &DepthBuffer, depth: f32, stencil: u8, flags: ClearFlags) {
        self.commands.push("clear_depth_stencil".to_string());
        let entry = self
            .depth_contents
            .entry(buffer.buffer.memory.0)
            .or_insert((buffer.clear_depth, buffer.clear_stencil));
        if flags.contains(ClearFlags::DEPTH) {
            entry.0 = depth;
        }
        if flags.contains(ClearFlags::STENCIL) {
            entry.1 = stencil;
        }
        self.context_state = None;
        self.bound_color = None;
        self.bound_depth = None;
    }

    fn flush(&mut self) {
        self.commands.push("flush".to_string());
        self.flushes += 1;
    }

    fn copy_color_buffer_to_scan_buffer(&mut self, buffer: &ColorBuffer, target: ScanTarget) {
        self.commands.push(format!("copy_to_scan {:?}", target));
        let content = self
            .color_contents
            .get(&buffer.buffer.memory.0)
            .copied()
            .unwrap_or(Vec4::ZERO);
        self.scan_out(target).back = Some(content);
        self.context_state = None;
    }

    fn swap_scan_buffers(&mut self) {
        self.commands.push("swap_scan_buffers".to_string());
        self.tv.flip();
        self.drc.flip();
        self.flips += 1;
        self.pending_flip = true;
    }

    fn wait_for_flip(&mut self) {
        self.commands.push("wait_for_flip".to_string());
        if self.pending_flip {
            self.pending_flip = false;
            self.flip_waits += 1;
        }
    }

    fn set_tv_enable(&mut self, enabled: bool) {
        self.commands.push(format!("set_tv_enable {}", enabled));
        self.tv.enabled = enabled;
    }

    fn set_drc_enable(&mut self, enabled: bool) {
        self.commands.push(format!("set_drc_enable {}", enabled));
        self.drc.enabled = enabled;
    }

    fn set_swap_interval(&mut self, interval: u32) {
        self.swap_interval = interval;
    }

    fn swap_interval(&self) -> u32 {
        self.swap_interval
    }

    fn convert_depth_buffer_to_texture(&mut self, src: &DepthBuffer, dst: &DepthTexture) {
        self.commands.push("convert_depth".to_string());
        let depth = self
            .depth_contents
            .get(&src.buffer.memory.0)
            .map(|(d, _)| *d)
            .unwrap_or(src.clear_depth);
        self.depth_texture_contents.insert(dst.buffer.memory.0, depth);
    }
}
