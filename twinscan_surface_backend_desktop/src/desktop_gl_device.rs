/// GlDevice trait - the subset of an OpenGL 3.3+ context the desktop backend drives
///
/// Object names follow GL conventions: non-zero integers, with framebuffer
/// name 0 standing for the window's default framebuffer.

use twinscan_surface::glam::Vec4;
use twinscan_surface::twinscan::backend::ClearFlags;
use twinscan_surface::twinscan::surface::PixelFormat;
use twinscan_surface::twinscan::Result;

/// GL object name
pub type GlName = u32;

/// The window's default framebuffer
pub const DEFAULT_FRAMEBUFFER: GlName = 0;

/// Integer rectangle (viewport / scissor box), origin at (x, y)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle covering a whole `width` x `height` surface
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }
}

/// Server-side capability toggled with enable/disable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlCapability {
    DepthTest,
    ScissorTest,
}

/// Framebuffer binding point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferTarget {
    Read,
    Draw,
    /// Both read and draw
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentPoint {
    Color0,
    DepthStencil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferStatus {
    Complete,
    IncompleteAttachment,
    MissingAttachment,
    Unsupported,
}

/// Informational context strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextString {
    Renderer,
    Version,
    ShadingLanguageVersion,
}

/// One float vertex attribute inside an interleaved vertex buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: u32,
    /// Byte offset inside one vertex
    pub offset: u32,
}

/// OpenGL context capability interface
pub trait GlDevice {
    // ===== CONTEXT =====

    /// Informational string, None when the driver does not report it
    fn context_string(&self, which: ContextString) -> Option<String>;

    /// GL 4.5 or ARB_clip_control available
    fn has_clip_control(&self) -> bool;

    /// Switch the clip-space origin to the upper-left corner
    fn set_clip_origin_upper_left(&mut self);

    fn set_capability(&mut self, capability: GlCapability, enabled: bool);
    fn is_enabled(&self, capability: GlCapability) -> bool;

    /// Depth-plane write mask; clears honour it
    fn set_depth_mask(&mut self, enabled: bool);
    fn depth_mask(&self) -> bool;

    fn viewport(&self) -> Rect;
    fn set_viewport(&mut self, rect: Rect);
    fn scissor(&self) -> Rect;
    fn set_scissor(&mut self, rect: Rect);

    // ===== TEXTURES / RENDERBUFFERS =====

    fn create_texture(&mut self) -> Option<GlName>;

    /// (Re)specify texture storage; existing contents are discarded
    ///
    /// Fails with `Error::AllocationError` when the driver refuses the storage.
    fn texture_storage(&mut self, texture: GlName, format: PixelFormat, width: u32, height: u32) -> Result<()>;

    fn delete_texture(&mut self, texture: GlName);

    fn create_renderbuffer(&mut self) -> Option<GlName>;

    /// (Re)specify renderbuffer storage; existing contents are discarded
    fn renderbuffer_storage(&mut self, renderbuffer: GlName, format: PixelFormat, width: u32, height: u32) -> Result<()>;

    fn delete_renderbuffer(&mut self, renderbuffer: GlName);

    // ===== FRAMEBUFFERS =====

    fn create_framebuffer(&mut self) -> Option<GlName>;
    fn delete_framebuffer(&mut self, framebuffer: GlName);
    fn bind_framebuffer(&mut self, target: FramebufferTarget, framebuffer: GlName);

    /// Framebuffer currently bound for drawing
    fn draw_framebuffer(&self) -> GlName;

    fn attach_texture(&mut self, framebuffer: GlName, point: AttachmentPoint, texture: GlName);
    fn attach_renderbuffer(&mut self, framebuffer: GlName, point: AttachmentPoint, renderbuffer: GlName);
    fn framebuffer_status(&self, framebuffer: GlName) -> FramebufferStatus;

    // ===== COMMANDS =====

    /// Clear the bound draw framebuffer (scissor-clipped when enabled)
    fn clear(&mut self, flags: ClearFlags, color: Vec4, depth: f32, stencil: u8);

    /// Copy `mask` planes from the read framebuffer to the draw framebuffer
    /// with nearest filtering
    fn blit_framebuffer(&mut self, src: Rect, dst: Rect, mask: ClearFlags);

    /// Shader program by name, None when it cannot be found or linked
    fn load_program(&mut self, name: &str) -> Option<GlName>;
    fn use_program(&mut self, program: GlName);
    fn delete_program(&mut self, program: GlName);

    /// Upload interleaved vertices into a new vertex array
    fn create_vertex_array(&mut self, data: &[u8], stride: u32, attributes: &[VertexAttribute]) -> Option<GlName>;
    fn bind_vertex_array(&mut self, vertex_array: GlName);
    fn delete_vertex_array(&mut self, vertex_array: GlName);

    fn bind_texture(&mut self, unit: u32, texture: GlName);
    fn draw_triangles(&mut self, first: u32, count: u32);

    fn flush(&mut self);

    /// Make texture fetches observe prior framebuffer writes
    fn texture_fetch_barrier(&mut self);
}
