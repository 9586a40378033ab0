/// External collaborators the window calls into
///
/// The render-state object belongs to the material system and the resize
/// listeners to whatever layers depend on the framebuffer size; the window
/// only knows these narrow interfaces.

/// Generic GPU render state, as far as presentation needs it
pub trait RenderState {
    fn set_depth_test(&mut self, enabled: bool);

    /// Push the state to the GPU
    fn apply(&mut self);
}

/// Layer that must follow the framebuffer size
///
/// Listeners are notified before the window-level resize callback.
pub trait ResizeListener {
    fn on_resize(&mut self, width: u32, height: u32);
}

/// Minimal render state tracking the depth-test flag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicRenderState {
    pub depth_test: bool,
    /// Value of `depth_test` at the last apply
    pub applied_depth_test: Option<bool>,
    pub apply_count: u64,
}

impl BasicRenderState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderState for BasicRenderState {
    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }

    fn apply(&mut self) {
        self.applied_depth_test = Some(self.depth_test);
        self.apply_count += 1;
    }
}
