/// Render target collection of one window session
///
/// Holds one RenderTargetSet per surface driven by the backend, the
/// negotiated dimensions shared by every set, and which surface is current.

use super::render_target_set::RenderTargetSet;
use super::surface_id::Surface;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderTargets {
    sets: Vec<RenderTargetSet>,
    current: Surface,
    width: u32,
    height: u32,
}

impl RenderTargets {
    /// Wrap freshly allocated sets
    ///
    /// The current surface starts as `Surface::Primary`.
    pub fn new(sets: Vec<RenderTargetSet>, width: u32, height: u32) -> Self {
        Self {
            sets,
            current: Surface::Primary,
            width,
            height,
        }
    }

    /// An empty collection (no surface allocated yet)
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, 0)
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

    /// Surface that draws and clears target
    pub fn current(&self) -> Surface {
        self.current
    }

    pub fn set_current(&mut self, surface: Surface) {
        self.current = surface;
    }

    pub fn get(&self, surface: Surface) -> Option<&RenderTargetSet> {
        self.sets.iter().find(|s| s.surface == surface)
    }

    pub fn get_mut(&mut self, surface: Surface) -> Option<&mut RenderTargetSet> {
        self.sets.iter_mut().find(|s| s.surface == surface)
    }

    pub fn current_set(&self) -> Option<&RenderTargetSet> {
        self.get(self.current)
    }

    pub fn current_set_mut(&mut self) -> Option<&mut RenderTargetSet> {
        let current = self.current;
        self.get_mut(current)
    }

    pub fn sets(&self) -> &[RenderTargetSet] {
        &self.sets
    }

    pub fn sets_mut(&mut self) -> &mut [RenderTargetSet] {
        &mut self.sets
    }

    /// Whether every set has been released
    pub fn is_released(&self) -> bool {
        self.sets.iter().all(|s| s.is_released())
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl Default for RenderTargets {
    fn default() -> Self {
        Self::empty()
    }
}
