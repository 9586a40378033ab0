/// Mock backend for unit tests (no GPU required)
///
/// Records every backend call as a string command and hands out fake
/// memory handles. Foreground notices are scripted through a queue; an
/// empty queue means "in foreground".

#[cfg(test)]
use std::collections::VecDeque;

#[cfg(test)]
use crate::backend::{
    ClearEffect, ClearRequest, ForegroundStatus, RenderSurfaceBackend, SurfaceAllocator,
};
#[cfg(test)]
use crate::config::WindowConfig;
#[cfg(test)]
use crate::error::{Error, Result};
#[cfg(test)]
use crate::surface::{AllocatedBuffer, BufferLayout, NativeHandle, RenderTargetSet, Surface, SurfaceDesc};

#[cfg(test)]
static DUAL: [Surface; 2] = [Surface::Primary, Surface::Secondary];
#[cfg(test)]
static SINGLE: [Surface; 1] = [Surface::Primary];

/// Mock backend that tracks calls and live allocations
#[cfg(test)]
#[derive(Debug)]
pub struct MockBackend {
    pub commands: Vec<String>,
    pub foreground: VecDeque<ForegroundStatus>,
    /// Number of allocate_targets calls that succeed before failures start
    pub allocations_before_failure: Option<usize>,
    pub fail_open: bool,
    pub clear_effect: ClearEffect,
    pub supports_resize: bool,
    pub pending_resize: Option<(i32, i32)>,
    pub running: bool,
    pub swap_interval: u32,
    pub live_buffers: usize,
    pub allocate_calls: usize,
    /// Size handed out instead of the requested one
    pub negotiated_size: Option<(u32, u32)>,
    dual: bool,
    next_handle: u64,
}

#[cfg(test)]
impl MockBackend {
    /// Mock presenting a single surface
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            foreground: VecDeque::new(),
            allocations_before_failure: None,
            fail_open: false,
            clear_effect: ClearEffect::BindingPreserved,
            supports_resize: false,
            pending_resize: None,
            running: true,
            swap_interval: 0,
            live_buffers: 0,
            allocate_calls: 0,
            negotiated_size: None,
            dual: false,
            next_handle: 0x1000,
        }
    }

    /// Mock presenting two surfaces whose clears drop the binding
    pub fn dual() -> Self {
        Self {
            dual: true,
            clear_effect: ClearEffect::BindingInvalidated,
            ..Self::new()
        }
    }

    pub fn script(mut self, statuses: &[ForegroundStatus]) -> Self {
        self.foreground.extend(statuses.iter().copied());
        self
    }

    pub fn count(&self, command: &str) -> usize {
        self.commands.iter().filter(|c| c.as_str() == command).count()
    }

    pub fn position(&self, command: &str) -> Option<usize> {
        self.commands.iter().position(|c| c.as_str() == command)
    }

    pub fn clear_log(&mut self) {
        self.commands.clear();
    }

    fn push(&mut self, command: String) {
        self.commands.push(command);
    }

    fn buffer(&mut self, desc: SurfaceDesc) -> AllocatedBuffer {
        let handle = NativeHandle(self.next_handle);
        self.next_handle += 0x1000;
        self.live_buffers += 1;
        AllocatedBuffer {
            layout: BufferLayout {
                desc,
                pitch: desc.width,
                byte_size: desc.width as u64 * desc.height as u64 * desc.format.bytes_per_pixel() as u64,
                alignment: 0x100,
            },
            memory: handle,
        }
    }
}

#[cfg(test)]
impl SurfaceAllocator for MockBackend {
    fn allocate_targets(&mut self, width: u32, height: u32) -> Result<Vec<RenderTargetSet>> {
        self.push(format!("allocate {}x{}", width, height));
        self.allocate_calls += 1;
        if let Some(limit) = self.allocations_before_failure {
            if self.allocate_calls > limit {
                return Err(Error::AllocationError("mock heap exhausted".to_string()));
            }
        }

        let (width, height) = self.negotiated_size.unwrap_or((width, height));
        let mut sets = Vec::new();
        for surface in self.surfaces() {
            let desc = RenderTargetSet::describe(*surface, width, height);
            let color = self.buffer(desc.color);
            let depth = self.buffer(desc.depth);
            let depth_texture = self.buffer(desc.depth_texture);
            sets.push(RenderTargetSet::assemble(*surface, color, depth, depth_texture));
        }
        Ok(sets)
    }

    fn release_targets(&mut self, sets: &mut [RenderTargetSet]) {
        for set in sets.iter_mut() {
            if set.is_released() {
                continue;
            }
            self.push(format!("release {}", set.surface));
            self.live_buffers -= 3;
            set.release();
        }
    }
}

#[cfg(test)]
impl RenderSurfaceBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn surfaces(&self) -> &'static [Surface] {
        if self.dual {
            &DUAL
        } else {
            &SINGLE
        }
    }

    fn open_device(&mut self, _config: &WindowConfig) -> Result<()> {
        self.push("open_device".to_string());
        if self.fail_open {
            return Err(Error::ContextCreationError("mock device refused".to_string()));
        }
        Ok(())
    }

    fn create_context(&mut self) -> Result<()> {
        self.push("create_context".to_string());
        Ok(())
    }

    fn make_context_current(&mut self) {
        self.push("make_context_current".to_string());
    }

    fn close_device(&mut self) {
        self.push("close_device".to_string());
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn bind(&mut self, set: &RenderTargetSet) {
        self.push(format!("bind {}", set.surface));
    }

    fn clear(&mut self, set: &mut RenderTargetSet, request: &ClearRequest) -> ClearEffect {
        self.push(format!("clear {} {:?}", set.surface, request.flags));
        self.clear_effect
    }

    fn set_swap_interval(&mut self, interval: u32) {
        self.push(format!("swap_interval {}", interval));
        self.swap_interval = interval;
    }

    fn swap_interval(&self) -> u32 {
        self.swap_interval
    }

    fn begin_present(&mut self, _sets: &[RenderTargetSet]) {
        self.push("begin_present".to_string());
    }

    fn flush(&mut self) {
        self.push("flush".to_string());
    }

    fn copy_to_scan_out(&mut self, sets: &[RenderTargetSet]) {
        self.push(format!("copy_to_scan_out {}", sets.len()));
    }

    fn flip(&mut self) {
        self.push("flip".to_string());
    }

    fn restore_context(&mut self, current: &RenderTargetSet) {
        self.push(format!("restore_context {}", current.surface));
    }

    fn wait_for_flip(&mut self) {
        self.push("wait_for_flip".to_string());
    }

    fn enable_outputs(&mut self) {
        self.push("enable_outputs".to_string());
    }

    fn poll_foreground(&mut self) -> ForegroundStatus {
        let status = self.foreground.pop_front().unwrap_or(ForegroundStatus::InForeground);
        self.push(format!("poll {:?}", status));
        status
    }

    fn acknowledge_release(&mut self) {
        self.push("acknowledge_release".to_string());
    }

    fn block_threads_on_exit(&mut self) {
        self.push("block_threads_on_exit".to_string());
    }

    fn invalidate_depth_cache(&mut self, set: &RenderTargetSet) {
        self.push(format!("invalidate_depth_cache {}", set.surface));
    }

    fn convert_depth_to_texture(&mut self, set: &mut RenderTargetSet) -> Result<()> {
        self.push(format!("convert_depth {}", set.surface));
        Ok(())
    }

    fn invalidate_depth_texture_cache(&mut self, set: &RenderTargetSet) {
        self.push(format!("invalidate_depth_texture_cache {}", set.surface));
    }

    fn resize_targets(&mut self, sets: &mut [RenderTargetSet], width: u32, height: u32) -> Result<bool> {
        if !self.supports_resize {
            return Ok(false);
        }
        self.push(format!("resize {}x{}", width, height));
        for set in sets.iter_mut() {
            let desc = RenderTargetSet::describe(set.surface, width, height);
            let layout = |d: SurfaceDesc| BufferLayout {
                desc: d,
                pitch: d.width,
                byte_size: d.width as u64 * d.height as u64 * 4,
                alignment: 0x100,
            };
            set.respecify(layout(desc.color), layout(desc.depth), layout(desc.depth_texture));
        }
        Ok(true)
    }

    fn take_pending_resize(&mut self) -> Option<(i32, i32)> {
        self.pending_resize.take()
    }
}
