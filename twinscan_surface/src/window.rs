/// Window - the explicitly owned rendering surface of the session
///
/// One `Window` is created at startup and dropped at shutdown. It owns the
/// backend, the render targets of every surface and the presentation state,
/// and is passed by reference to whatever needs it.

use crate::backend::{
    ClearEffect, ClearRequest, RenderState, RenderSurfaceBackend, ResizeListener,
};
use crate::config::WindowConfig;
use crate::depth::DepthResolver;
use crate::error::{Error, Result};
use crate::presentation::{PresentationState, PresentationStateMachine, ShutdownHook, TickOutcome};
use crate::surface::{NativeHandle, RenderTargetSet, RenderTargets, Surface};
use crate::swap::SwapChainController;
use crate::{surface_bail, surface_debug, surface_info};
use glam::Vec4;

/// Window-level framebuffer resize callback
pub type ResizeCallback = Box<dyn FnMut(u32, u32)>;

pub struct Window<B: RenderSurfaceBackend> {
    backend: B,
    config: WindowConfig,
    targets: RenderTargets,
    presentation: PresentationStateMachine,
    swap_chain: SwapChainController,
    depth_resolver: DepthResolver,
    render_state: Box<dyn RenderState>,
    resize_listeners: Vec<Box<dyn ResizeListener>>,
    resize_callback: Option<ResizeCallback>,
}

impl<B: RenderSurfaceBackend> Window<B> {
    /// Create the window and acquire every surface
    ///
    /// The actual size may differ from the request (console mode snapping);
    /// read it back with `width()`/`height()`.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidDimensions` for non-positive requests
    /// - `Error::AllocationError` if any render target allocation fails
    /// - `Error::ContextCreationError` if the native context cannot be created
    ///
    /// Partially created state is torn down before the error is returned.
    pub fn create(config: WindowConfig, mut backend: B, render_state: Box<dyn RenderState>) -> Result<Self> {
        let mut presentation = PresentationStateMachine::new();
        let targets = presentation.initialize(&mut backend, &config)?;

        surface_info!("twinscan::Window", "Window created: {}x{} (requested {}x{}) on '{}'",
            targets.width(), targets.height(), config.width, config.height, backend.name());

        Ok(Self {
            backend,
            config,
            targets,
            presentation,
            swap_chain: SwapChainController::new(),
            depth_resolver: DepthResolver::new(),
            render_state,
            resize_listeners: Vec::new(),
            resize_callback: None,
        })
    }

    // ===== QUERIES =====

    pub fn width(&self) -> u32 {
        self.targets.width()
    }

    pub fn height(&self) -> u32 {
        self.targets.height()
    }

    pub fn state(&self) -> PresentationState {
        self.presentation.state()
    }

    pub fn current_surface(&self) -> Surface {
        self.targets.current()
    }

    pub fn current_set(&self) -> Option<&RenderTargetSet> {
        self.targets.current_set()
    }

    pub fn targets(&self) -> &RenderTargets {
        &self.targets
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn frames_presented(&self) -> u64 {
        self.swap_chain.frames_presented()
    }

    pub fn depth_resolves(&self) -> u64 {
        self.depth_resolver.resolves()
    }

    /// False once teardown ran or the platform asked to stop
    pub fn is_running(&self) -> bool {
        self.presentation.state() != PresentationState::Terminating && self.backend.is_running()
    }

    // ===== BINDING =====

    /// Bind `surface`'s color and depth buffers and make it current
    pub fn make_current(&mut self, surface: Surface) -> Result<()> {
        self.debug_assert_acquired();
        if !self.backend.surfaces().contains(&surface) {
            surface_bail!("twinscan::Window", Error::BackendError(format!(
                "surface {} is not presented by the '{}' backend", surface, self.backend.name())));
        }

        self.targets.set_current(surface);
        if let Some(set) = self.targets.current_set() {
            self.backend.bind(set);
        }
        Ok(())
    }

    pub fn make_context_current(&mut self) {
        self.backend.make_context_current();
    }

    pub fn set_swap_interval(&mut self, interval: u32) {
        self.config.swap_interval = interval;
        self.backend.set_swap_interval(interval);
    }

    pub fn swap_interval(&self) -> u32 {
        self.backend.swap_interval()
    }

    // ===== CLEARS =====

    pub fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.clear(ClearRequest::color(Vec4::new(r, g, b, a)));
    }

    /// Clear depth to the depth buffer's clear value
    pub fn clear_depth(&mut self) {
        let (depth, _) = self.default_depth_stencil();
        self.clear_depth_with(depth);
    }

    pub fn clear_depth_with(&mut self, depth: f32) {
        self.clear(ClearRequest::depth(depth));
    }

    /// Clear stencil to the depth buffer's clear value
    pub fn clear_stencil(&mut self) {
        let (_, stencil) = self.default_depth_stencil();
        self.clear_stencil_with(stencil);
    }

    pub fn clear_stencil_with(&mut self, stencil: u8) {
        self.clear(ClearRequest::stencil(stencil));
    }

    pub fn clear_depth_stencil(&mut self) {
        let (depth, stencil) = self.default_depth_stencil();
        self.clear_depth_stencil_with(depth, stencil);
    }

    pub fn clear_depth_stencil_with(&mut self, depth: f32, stencil: u8) {
        self.clear(ClearRequest::depth_stencil(depth, stencil));
    }

    fn default_depth_stencil(&self) -> (f32, u8) {
        self.targets
            .current_set()
            .map(|set| (set.depth_buffer.clear_depth, set.depth_buffer.clear_stencil))
            .unwrap_or((crate::surface::DEFAULT_CLEAR_DEPTH, crate::surface::DEFAULT_CLEAR_STENCIL))
    }

    fn clear(&mut self, request: ClearRequest) {
        self.debug_assert_acquired();
        let Some(set) = self.targets.current_set_mut() else {
            return;
        };

        if self.backend.clear(set, &request) == ClearEffect::BindingInvalidated {
            self.backend.bind(set);
        }
    }

    // ===== FRAME =====

    /// Present the frame and poll the foreground lifecycle
    ///
    /// `TickOutcome::Exiting` (or a fatal error) means teardown already ran
    /// and the application loop must end the process.
    pub fn swap_buffers(&mut self) -> Result<TickOutcome> {
        let outcome = self.swap_chain.present(
            &mut self.backend,
            self.render_state.as_mut(),
            &mut self.targets,
            &mut self.presentation,
        )?;

        if outcome != TickOutcome::Exiting {
            if let Some((width, height)) = self.backend.take_pending_resize() {
                self.on_framebuffer_resized(width, height)?;
            }
        }
        Ok(outcome)
    }

    /// Refresh `surface`'s depth texture from its depth buffer
    pub fn resolve_depth_texture(&mut self, surface: Surface) -> Result<()> {
        self.debug_assert_acquired();
        let Some(set) = self.targets.get_mut(surface) else {
            surface_bail!("twinscan::Window", Error::BackendError(format!(
                "no render targets for surface {}", surface)));
        };
        self.depth_resolver.resolve(&mut self.backend, set)
    }

    /// Sampling handle of the current surface's color texture
    pub fn color_texture_handle(&self) -> NativeHandle {
        self.targets
            .current_set()
            .map(|set| self.backend.color_texture_handle(set))
            .unwrap_or(NativeHandle::NULL)
    }

    // ===== RESIZE =====

    pub fn add_resize_listener(&mut self, listener: Box<dyn ResizeListener>) {
        self.resize_listeners.push(listener);
    }

    pub fn set_resize_callback(&mut self, callback: ResizeCallback) {
        self.resize_callback = Some(callback);
    }

    /// Framebuffer size change notification
    ///
    /// Ignored unless the window is resizable. Sizes are clamped to at
    /// least 1. Storage is re-specified in place, then dependent layers are
    /// notified, then the window-level callback runs.
    pub fn on_framebuffer_resized(&mut self, width: i32, height: i32) -> Result<()> {
        if !self.config.resizable {
            surface_debug!("twinscan::Window", "Resize to {}x{} ignored: window not resizable",
                width, height);
            return Ok(());
        }
        if self.presentation.state() != PresentationState::Acquired {
            return Ok(());
        }

        let width = width.max(1) as u32;
        let height = height.max(1) as u32;
        if !self.backend.resize_targets(self.targets.sets_mut(), width, height)? {
            surface_debug!("twinscan::Window", "Backend '{}' has fixed-size targets",
                self.backend.name());
            return Ok(());
        }
        self.targets.set_size(width, height);
        surface_info!("twinscan::Window", "Framebuffer resized to {}x{}", width, height);

        for listener in self.resize_listeners.iter_mut() {
            listener.on_resize(width, height);
        }
        if let Some(callback) = self.resize_callback.as_mut() {
            callback(width, height);
        }
        Ok(())
    }

    // ===== SHUTDOWN =====

    /// Register a subsystem teardown run once on shutdown
    pub fn add_shutdown_hook(&mut self, hook: ShutdownHook) {
        self.presentation.add_shutdown_hook(hook);
    }

    /// Tear everything down (idempotent)
    pub fn shutdown(&mut self) {
        self.presentation.terminate(&mut self.backend, &mut self.targets);
    }

    fn debug_assert_acquired(&self) {
        debug_assert!(
            self.presentation.state() == PresentationState::Acquired,
            "GPU memory touched in state {}",
            self.presentation.state()
        );
    }
}

impl<B: RenderSurfaceBackend> Drop for Window<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Color texture handle of the window's current surface, or
/// `NativeHandle::NULL` when there is no window
pub fn color_texture_handle<B: RenderSurfaceBackend>(window: Option<&Window<B>>) -> NativeHandle {
    window.map(|w| w.color_texture_handle()).unwrap_or(NativeHandle::NULL)
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
