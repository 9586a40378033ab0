/// SwapGeometry - window size plus the caller's viewport/scissor save slot

use crate::desktop_gl_device::{GlDevice, Rect};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwapGeometry {
    width: u32,
    height: u32,
    saved: Option<(Rect, Rect)>,
}

impl SwapGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, saved: None }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn full_rect(&self) -> Rect {
        Rect::full(self.width, self.height)
    }

    /// Save the caller's viewport/scissor and cover the whole surface
    ///
    /// Nested calls keep the outermost saved pair.
    pub fn enter_full_surface<G: GlDevice + ?Sized>(&mut self, gl: &mut G) {
        if self.saved.is_none() {
            self.saved = Some((gl.viewport(), gl.scissor()));
        }
        let full = self.full_rect();
        gl.set_viewport(full);
        gl.set_scissor(full);
    }

    /// Put back what `enter_full_surface` saved
    pub fn restore<G: GlDevice + ?Sized>(&mut self, gl: &mut G) {
        if let Some((viewport, scissor)) = self.saved.take() {
            gl.set_viewport(viewport);
            gl.set_scissor(scissor);
        }
    }

    pub fn is_saved(&self) -> bool {
        self.saved.is_some()
    }
}
