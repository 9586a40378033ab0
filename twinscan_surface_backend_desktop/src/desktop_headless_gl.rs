/// HeadlessGl - software GlDevice + WindowHost
///
/// A CPU implementation of the GL subset used by the desktop backend, plus
/// an invisible window owning a double-buffered default framebuffer. Clears,
/// nearest-filtered blits and textured triangle rasterization are real, so
/// tests can sample pixels of the presented image.
///
/// Storage rows are indexed by window-space y. With the upper-left clip
/// origin row 0 is the top of the rendered image; the default framebuffer is
/// displayed bottom-up, as in GL.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use twinscan_surface::glam::{Vec2, Vec4};
use twinscan_surface::twinscan::backend::ClearFlags;
use twinscan_surface::twinscan::surface::PixelFormat;
use twinscan_surface::twinscan::{Error, Result, WindowConfig};
use twinscan_surface::{surface_bail, surface_debug};

use crate::desktop_gl_device::{
    AttachmentPoint, ContextString, FramebufferStatus, FramebufferTarget, GlCapability, GlDevice,
    GlName, Rect, VertexAttribute, DEFAULT_FRAMEBUFFER,
};
use crate::desktop_name_allocator::NameAllocator;
use crate::desktop_window_host::{HostEvent, WindowHost};

/// Largest texture, renderbuffer or window dimension the driver accepts
pub const DEFAULT_MAX_TEXTURE_SIZE: u32 = 16384;

/// Back color, back depth-stencil and front planes of the window
const DEFAULT_FRAMEBUFFER_PLANES: [PixelFormat; 3] = [
    PixelFormat::R8G8B8A8_UNORM,
    PixelFormat::D24_UNORM_S8_UINT,
    PixelFormat::R8G8B8A8_UNORM,
];

// ============================================================================
// Images
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Texels {
    Color(Vec<Vec4>),
    DepthStencil(Vec<(f32, u8)>),
}

/// Storage of one texture, renderbuffer or default framebuffer plane
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    texels: Texels,
}

impl Image {
    fn new(format: PixelFormat, width: u32, height: u32) -> Self {
        let count = width as usize * height as usize;
        let texels = if format.is_depth() {
            Texels::DepthStencil(vec![(0.0, 0); count])
        } else {
            Texels::Color(vec![Vec4::ZERO; count])
        };
        Self { format, width, height, texels }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn color(&self, x: i32, y: i32) -> Option<Vec4> {
        let i = self.index(x, y)?;
        match &self.texels {
            Texels::Color(texels) => Some(texels[i]),
            Texels::DepthStencil(texels) => Some(Vec4::new(texels[i].0, 0.0, 0.0, 1.0)),
        }
    }

    pub fn depth_stencil(&self, x: i32, y: i32) -> Option<(f32, u8)> {
        let i = self.index(x, y)?;
        match &self.texels {
            Texels::DepthStencil(texels) => Some(texels[i]),
            Texels::Color(_) => None,
        }
    }

    fn set_color(&mut self, x: i32, y: i32, value: Vec4) {
        if let (Some(i), Texels::Color(texels)) = (self.index(x, y), &mut self.texels) {
            texels[i] = value;
        }
    }

    fn set_depth_stencil(&mut self, x: i32, y: i32, mask: ClearFlags, depth: f32, stencil: u8) {
        if let (Some(i), Texels::DepthStencil(texels)) = (self.index(x, y), &mut self.texels) {
            if mask.contains(ClearFlags::DEPTH) {
                texels[i].0 = depth;
            }
            if mask.contains(ClearFlags::STENCIL) {
                texels[i].1 = stencil;
            }
        }
    }

    /// Nearest sample at normalized coordinates
    fn sample(&self, uv: Vec2) -> Vec4 {
        let x = ((uv.x * self.width as f32).floor() as i32).clamp(0, self.width as i32 - 1);
        let y = ((uv.y * self.height as f32).floor() as i32).clamp(0, self.height as i32 - 1);
        self.color(x, y).unwrap_or(Vec4::ZERO)
    }

    pub fn byte_size(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.format.bytes_per_pixel() as u64
    }

    /// Bytes a `width` x `height` image of `format` would take, `None` on overflow
    fn checked_byte_size(format: PixelFormat, width: u32, height: u32) -> Option<u64> {
        (width as u64)
            .checked_mul(height as u64)?
            .checked_mul(format.bytes_per_pixel() as u64)
    }

    fn rect(&self) -> Rect {
        Rect::full(self.width, self.height)
    }
}

// ============================================================================
// Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attachment {
    Texture(GlName),
    Renderbuffer(GlName),
}

#[derive(Debug, Clone, Default)]
struct Framebuffer {
    color: Option<Attachment>,
    depth_stencil: Option<Attachment>,
}

#[derive(Debug, Clone)]
struct VertexArray {
    data: Vec<u8>,
    stride: u32,
    attributes: Vec<VertexAttribute>,
}

impl VertexArray {
    /// Two-component attribute of vertex `index`
    fn read_vec2(&self, index: u32, location: u32) -> Option<Vec2> {
        let attribute = self.attributes.iter().find(|a| a.location == location)?;
        let start = (index * self.stride + attribute.offset) as usize;
        let bytes = self.data.get(start..start + 8)?;
        let value: [f32; 2] = bytemuck::pod_read_unaligned(bytes);
        Some(Vec2::from(value))
    }

    fn vertex_count(&self) -> u32 {
        if self.stride == 0 {
            0
        } else {
            self.data.len() as u32 / self.stride
        }
    }
}

/// Window-space vertex fed to the rasterizer
#[derive(Debug, Clone, Copy)]
struct RasterVertex {
    position: Vec2,
    tex_coord: Vec2,
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

// ============================================================================
// HeadlessGl
// ============================================================================

pub struct HeadlessGl {
    names: NameAllocator,
    textures: FxHashMap<GlName, Option<Image>>,
    renderbuffers: FxHashMap<GlName, Option<Image>>,
    framebuffers: FxHashMap<GlName, Framebuffer>,
    programs: FxHashMap<GlName, String>,
    vertex_arrays: FxHashMap<GlName, VertexArray>,

    // Driver description
    known_programs: Vec<String>,
    clip_control: bool,
    renderer: Option<String>,
    version: Option<String>,
    shading_language: Option<String>,
    max_api_version: (u32, u32),
    max_texture_size: u32,
    memory_limit: Option<u64>,

    // Default framebuffer
    back_color: Image,
    back_depth: Image,
    front: Image,

    // Context state
    read_framebuffer: GlName,
    draw_framebuffer: GlName,
    viewport: Rect,
    scissor: Rect,
    capabilities: FxHashSet<GlCapability>,
    depth_mask: bool,
    clip_upper_left: bool,
    program: GlName,
    vertex_array: GlName,
    texture_units: FxHashMap<u32, GlName>,

    // Window
    window_open: bool,
    visible: bool,
    os_swap_interval: u32,
    events: VecDeque<HostEvent>,
    close_flag: bool,

    swaps: u64,
    flushes: u64,
    barriers: u64,
    commands: Vec<String>,
}

impl HeadlessGl {
    pub fn new() -> Self {
        Self {
            names: NameAllocator::new(),
            textures: FxHashMap::default(),
            renderbuffers: FxHashMap::default(),
            framebuffers: FxHashMap::default(),
            programs: FxHashMap::default(),
            vertex_arrays: FxHashMap::default(),
            known_programs: vec![crate::desktop_config::DEFAULT_SCREEN_SHADER.to_string()],
            clip_control: true,
            renderer: Some("Twinscan software rasterizer".to_string()),
            version: Some("4.6.0 Headless".to_string()),
            shading_language: Some("4.60".to_string()),
            max_api_version: (4, 6),
            max_texture_size: DEFAULT_MAX_TEXTURE_SIZE,
            memory_limit: None,
            back_color: Image::new(PixelFormat::R8G8B8A8_UNORM, 1, 1),
            back_depth: Image::new(PixelFormat::D24_UNORM_S8_UINT, 1, 1),
            front: Image::new(PixelFormat::R8G8B8A8_UNORM, 1, 1),
            read_framebuffer: DEFAULT_FRAMEBUFFER,
            draw_framebuffer: DEFAULT_FRAMEBUFFER,
            viewport: Rect::full(1, 1),
            scissor: Rect::full(1, 1),
            capabilities: FxHashSet::default(),
            depth_mask: true,
            clip_upper_left: false,
            program: 0,
            vertex_array: 0,
            texture_units: FxHashMap::default(),
            window_open: false,
            visible: false,
            os_swap_interval: 1,
            events: VecDeque::new(),
            close_flag: false,
            swaps: 0,
            flushes: 0,
            barriers: 0,
            commands: Vec::new(),
        }
    }

    /// Driver without GL 4.5 / ARB_clip_control
    pub fn without_clip_control(mut self) -> Self {
        self.clip_control = false;
        self
    }

    /// Driver that reports no informational strings
    pub fn without_context_strings(mut self) -> Self {
        self.renderer = None;
        self.version = None;
        self.shading_language = None;
        self
    }

    pub fn with_max_api_version(mut self, major: u32, minor: u32) -> Self {
        self.max_api_version = (major, minor);
        self.version = Some(format!("{}.{}.0 Headless", major, minor));
        self
    }

    /// Refuse storage once this many bytes are in use
    ///
    /// Textures and renderbuffers share the budget. The window's default
    /// framebuffer is checked against it on its own.
    pub fn with_memory_limit(mut self, bytes: u64) -> Self {
        self.memory_limit = Some(bytes);
        self
    }

    pub fn with_max_texture_size(mut self, size: u32) -> Self {
        self.max_texture_size = size.max(1);
        self
    }

    /// Make another program name loadable
    pub fn with_program(mut self, name: &str) -> Self {
        self.known_programs.push(name.to_string());
        self
    }

    // ===== HOST SIMULATION =====

    /// Queue a host event as if the windowing library delivered it
    pub fn push_event(&mut self, event: HostEvent) {
        if event == HostEvent::CloseRequested {
            self.close_flag = true;
        }
        self.events.push_back(event);
    }

    /// Resize the window's framebuffer and queue the notification
    pub fn resize_window(&mut self, width: i32, height: i32) {
        let max = self.max_texture_size;
        self.resize_default_framebuffer((width.max(1) as u32).min(max), (height.max(1) as u32).min(max));
        self.push_event(HostEvent::Resized { width, height });
    }

    pub fn request_close(&mut self) {
        self.push_event(HostEvent::CloseRequested);
    }

    /// Write one texel of a color texture directly
    pub fn write_texel(&mut self, texture: GlName, x: i32, y: i32, value: Vec4) {
        if let Some(Some(image)) = self.textures.get_mut(&texture) {
            image.set_color(x, y, value);
        }
    }

    fn resize_default_framebuffer(&mut self, width: u32, height: u32) {
        let [back_color, back_depth, front] = DEFAULT_FRAMEBUFFER_PLANES;
        self.back_color = Image::new(back_color, width, height);
        self.back_depth = Image::new(back_depth, width, height);
        self.front = Image::new(front, width, height);
    }

    // ===== OBSERVATION =====

    /// Displayed pixel, window coordinates with the origin bottom-left
    pub fn front_pixel(&self, x: i32, y: i32) -> Option<Vec4> {
        self.front.color(x, y)
    }

    pub fn back_pixel(&self, x: i32, y: i32) -> Option<Vec4> {
        self.back_color.color(x, y)
    }

    pub fn texture_image(&self, texture: GlName) -> Option<&Image> {
        self.textures.get(&texture).and_then(|t| t.as_ref())
    }

    pub fn renderbuffer_image(&self, renderbuffer: GlName) -> Option<&Image> {
        self.renderbuffers.get(&renderbuffer).and_then(|r| r.as_ref())
    }

    pub fn bound_texture(&self, unit: u32) -> GlName {
        self.texture_units.get(&unit).copied().unwrap_or(0)
    }

    pub fn read_framebuffer(&self) -> GlName {
        self.read_framebuffer
    }

    /// Names of every live GL object
    pub fn live_objects(&self) -> u32 {
        self.names.live()
    }

    /// Bytes held by texture and renderbuffer storage
    pub fn storage_bytes(&self) -> u64 {
        self.textures
            .values()
            .chain(self.renderbuffers.values())
            .flatten()
            .map(|image| image.byte_size())
            .sum()
    }

    pub fn clip_origin_upper_left(&self) -> bool {
        self.clip_upper_left
    }

    pub fn is_window_open(&self) -> bool {
        self.window_open
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn swaps(&self) -> u64 {
        self.swaps
    }

    pub fn flushes(&self) -> u64 {
        self.flushes
    }

    pub fn barriers(&self) -> u64 {
        self.barriers
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    // ===== INTERNALS =====

    fn attachment(&self, framebuffer: GlName, point: AttachmentPoint) -> Option<Attachment> {
        let fb = self.framebuffers.get(&framebuffer)?;
        match point {
            AttachmentPoint::Color0 => fb.color,
            AttachmentPoint::DepthStencil => fb.depth_stencil,
        }
    }

    fn attachment_image(&self, framebuffer: GlName, point: AttachmentPoint) -> Option<&Image> {
        if framebuffer == DEFAULT_FRAMEBUFFER {
            return Some(match point {
                AttachmentPoint::Color0 => &self.back_color,
                AttachmentPoint::DepthStencil => &self.back_depth,
            });
        }
        match self.attachment(framebuffer, point)? {
            Attachment::Texture(name) => self.textures.get(&name)?.as_ref(),
            Attachment::Renderbuffer(name) => self.renderbuffers.get(&name)?.as_ref(),
        }
    }

    fn attachment_image_mut(&mut self, framebuffer: GlName, point: AttachmentPoint) -> Option<&mut Image> {
        if framebuffer == DEFAULT_FRAMEBUFFER {
            return Some(match point {
                AttachmentPoint::Color0 => &mut self.back_color,
                AttachmentPoint::DepthStencil => &mut self.back_depth,
            });
        }
        match self.attachment(framebuffer, point)? {
            Attachment::Texture(name) => self.textures.get_mut(&name)?.as_mut(),
            Attachment::Renderbuffer(name) => self.renderbuffers.get_mut(&name)?.as_mut(),
        }
    }

    /// Refuse `planes` of `format` storage at `width` x `height` on top of `in_use` bytes
    ///
    /// Runs before any texel is allocated.
    fn check_storage(&self, in_use: u64, planes: &[PixelFormat], width: u32, height: u32) -> Result<()> {
        if width > self.max_texture_size || height > self.max_texture_size {
            surface_bail!("twinscan::headless_gl", Error::AllocationError(format!(
                "{}x{} exceeds the maximum dimension {}", width, height, self.max_texture_size)));
        }

        let requested = planes.iter().try_fold(0u64, |total, format| {
            total.checked_add(Image::checked_byte_size(*format, width, height)?)
        });
        let total = requested.and_then(|bytes| bytes.checked_add(in_use));
        let Some(total) = total else {
            surface_bail!("twinscan::headless_gl", Error::AllocationError(format!(
                "{:?} storage of {}x{} is not addressable", planes, width, height)));
        };
        if let Some(limit) = self.memory_limit {
            if total > limit {
                surface_bail!("twinscan::headless_gl", Error::AllocationError(format!(
                    "{:?} storage of {}x{} exceeds the {} byte budget", planes, width, height, limit)));
            }
        }
        Ok(())
    }

    /// New storage replacing `replaced_bytes` of existing storage
    fn specify(&self, replaced_bytes: u64, format: PixelFormat, width: u32, height: u32) -> Result<Image> {
        let in_use = self.storage_bytes().saturating_sub(replaced_bytes);
        self.check_storage(in_use, &[format], width, height)?;
        Ok(Image::new(format, width, height))
    }

    /// Pixels of `image` the current scissor lets through
    fn write_region(&self, image: &Image) -> Rect {
        let full = image.rect();
        if !self.capabilities.contains(&GlCapability::ScissorTest) {
            return full;
        }
        let x0 = self.scissor.x.max(0);
        let y0 = self.scissor.y.max(0);
        let x1 = (self.scissor.x + self.scissor.width).min(full.width);
        let y1 = (self.scissor.y + self.scissor.height).min(full.height);
        Rect::new(x0, y0, (x1 - x0).max(0), (y1 - y0).max(0))
    }

    fn to_window(&self, ndc: Vec2) -> Vec2 {
        let vp = self.viewport;
        let y = if self.clip_upper_left { -ndc.y } else { ndc.y };
        Vec2::new(
            vp.x as f32 + (ndc.x + 1.0) * 0.5 * vp.width as f32,
            vp.y as f32 + (y + 1.0) * 0.5 * vp.height as f32,
        )
    }

    fn rasterize(&mut self, triangle: [RasterVertex; 3], source: &Image) {
        let [a, b, c] = triangle;
        let area = edge(a.position, b.position, c.position);
        if area == 0.0 {
            return;
        }

        let draw = self.draw_framebuffer;
        let Some(region) = self.attachment_image(draw, AttachmentPoint::Color0).map(|t| self.write_region(t)) else {
            return;
        };
        let Some(target) = self.attachment_image_mut(draw, AttachmentPoint::Color0) else {
            return;
        };

        let min = a.position.min(b.position).min(c.position);
        let max = a.position.max(b.position).max(c.position);
        let x_start = (min.x.floor() as i32).max(region.x);
        let y_start = (min.y.floor() as i32).max(region.y);
        let x_end = (max.x.ceil() as i32).min(region.x + region.width);
        let y_end = (max.y.ceil() as i32).min(region.y + region.height);

        for y in y_start..y_end {
            for x in x_start..x_end {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(b.position, c.position, p) / area;
                let w1 = edge(c.position, a.position, p) / area;
                let w2 = edge(a.position, b.position, p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let uv = a.tex_coord * w0 + b.tex_coord * w1 + c.tex_coord * w2;
                target.set_color(x, y, source.sample(uv));
            }
        }
    }

    fn log(&mut self, command: String) {
        self.commands.push(command);
    }
}

impl Default for HeadlessGl {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// GlDevice
// ============================================================================

impl GlDevice for HeadlessGl {
    fn context_string(&self, which: ContextString) -> Option<String> {
        match which {
            ContextString::Renderer => self.renderer.clone(),
            ContextString::Version => self.version.clone(),
            ContextString::ShadingLanguageVersion => self.shading_language.clone(),
        }
    }

    fn has_clip_control(&self) -> bool {
        self.clip_control
    }

    fn set_clip_origin_upper_left(&mut self) {
        if self.clip_control {
            self.clip_upper_left = true;
        }
    }

    fn set_capability(&mut self, capability: GlCapability, enabled: bool) {
        if enabled {
            self.capabilities.insert(capability);
        } else {
            self.capabilities.remove(&capability);
        }
    }

    fn is_enabled(&self, capability: GlCapability) -> bool {
        self.capabilities.contains(&capability)
    }

    fn set_depth_mask(&mut self, enabled: bool) {
        self.depth_mask = enabled;
    }

    fn depth_mask(&self) -> bool {
        self.depth_mask
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn set_viewport(&mut self, rect: Rect) {
        self.viewport = rect;
    }

    fn scissor(&self) -> Rect {
        self.scissor
    }

    fn set_scissor(&mut self, rect: Rect) {
        self.scissor = rect;
    }

    // ===== TEXTURES / RENDERBUFFERS =====

    fn create_texture(&mut self) -> Option<GlName> {
        let name = self.names.alloc();
        self.textures.insert(name, None);
        Some(name)
    }

    fn texture_storage(&mut self, texture: GlName, format: PixelFormat, width: u32, height: u32) -> Result<()> {
        let Some(current) = self.textures.get(&texture) else {
            surface_bail!("twinscan::headless_gl",
                Error::BackendError(format!("texture {} does not exist", texture)));
        };
        let replaced = current.as_ref().map(|image| image.byte_size()).unwrap_or(0);
        let image = self.specify(replaced, format, width, height)?;
        self.textures.insert(texture, Some(image));
        Ok(())
    }

    fn delete_texture(&mut self, texture: GlName) {
        if self.textures.remove(&texture).is_some() {
            self.names.free(texture);
            self.texture_units.retain(|_, bound| *bound != texture);
        }
    }

    fn create_renderbuffer(&mut self) -> Option<GlName> {
        let name = self.names.alloc();
        self.renderbuffers.insert(name, None);
        Some(name)
    }

    fn renderbuffer_storage(&mut self, renderbuffer: GlName, format: PixelFormat, width: u32, height: u32) -> Result<()> {
        let Some(current) = self.renderbuffers.get(&renderbuffer) else {
            surface_bail!("twinscan::headless_gl",
                Error::BackendError(format!("renderbuffer {} does not exist", renderbuffer)));
        };
        let replaced = current.as_ref().map(|image| image.byte_size()).unwrap_or(0);
        let image = self.specify(replaced, format, width, height)?;
        self.renderbuffers.insert(renderbuffer, Some(image));
        Ok(())
    }

    fn delete_renderbuffer(&mut self, renderbuffer: GlName) {
        if self.renderbuffers.remove(&renderbuffer).is_some() {
            self.names.free(renderbuffer);
        }
    }

    // ===== FRAMEBUFFERS =====

    fn create_framebuffer(&mut self) -> Option<GlName> {
        let name = self.names.alloc();
        self.framebuffers.insert(name, Framebuffer::default());
        Some(name)
    }

    fn delete_framebuffer(&mut self, framebuffer: GlName) {
        if self.framebuffers.remove(&framebuffer).is_some() {
            self.names.free(framebuffer);
            // Deleting a bound framebuffer reverts the binding to the default one
            if self.read_framebuffer == framebuffer {
                self.read_framebuffer = DEFAULT_FRAMEBUFFER;
            }
            if self.draw_framebuffer == framebuffer {
                self.draw_framebuffer = DEFAULT_FRAMEBUFFER;
            }
        }
    }

    fn bind_framebuffer(&mut self, target: FramebufferTarget, framebuffer: GlName) {
        self.log(format!("bind_framebuffer {:?} {}", target, framebuffer));
        match target {
            FramebufferTarget::Read => self.read_framebuffer = framebuffer,
            FramebufferTarget::Draw => self.draw_framebuffer = framebuffer,
            FramebufferTarget::Both => {
                self.read_framebuffer = framebuffer;
                self.draw_framebuffer = framebuffer;
            }
        }
    }

    fn draw_framebuffer(&self) -> GlName {
        self.draw_framebuffer
    }

    fn attach_texture(&mut self, framebuffer: GlName, point: AttachmentPoint, texture: GlName) {
        if let Some(fb) = self.framebuffers.get_mut(&framebuffer) {
            let attachment = Some(Attachment::Texture(texture));
            match point {
                AttachmentPoint::Color0 => fb.color = attachment,
                AttachmentPoint::DepthStencil => fb.depth_stencil = attachment,
            }
        }
    }

    fn attach_renderbuffer(&mut self, framebuffer: GlName, point: AttachmentPoint, renderbuffer: GlName) {
        if let Some(fb) = self.framebuffers.get_mut(&framebuffer) {
            let attachment = Some(Attachment::Renderbuffer(renderbuffer));
            match point {
                AttachmentPoint::Color0 => fb.color = attachment,
                AttachmentPoint::DepthStencil => fb.depth_stencil = attachment,
            }
        }
    }

    fn framebuffer_status(&self, framebuffer: GlName) -> FramebufferStatus {
        if framebuffer == DEFAULT_FRAMEBUFFER {
            return FramebufferStatus::Complete;
        }
        let Some(fb) = self.framebuffers.get(&framebuffer) else {
            return FramebufferStatus::Unsupported;
        };
        if fb.color.is_none() && fb.depth_stencil.is_none() {
            return FramebufferStatus::MissingAttachment;
        }

        for (point, attachment) in [
            (AttachmentPoint::Color0, fb.color),
            (AttachmentPoint::DepthStencil, fb.depth_stencil),
        ] {
            if attachment.is_none() {
                continue;
            }
            let Some(image) = self.attachment_image(framebuffer, point) else {
                return FramebufferStatus::IncompleteAttachment;
            };
            let depth_point = point == AttachmentPoint::DepthStencil;
            if image.format.is_depth() != depth_point || image.width == 0 || image.height == 0 {
                return FramebufferStatus::IncompleteAttachment;
            }
        }
        FramebufferStatus::Complete
    }

    // ===== COMMANDS =====

    fn clear(&mut self, flags: ClearFlags, color: Vec4, depth: f32, stencil: u8) {
        self.log(format!("clear {:?}", flags));
        let draw = self.draw_framebuffer;

        if flags.contains(ClearFlags::COLOR) {
            if let Some(region) = self.attachment_image(draw, AttachmentPoint::Color0).map(|i| self.write_region(i)) {
                if let Some(image) = self.attachment_image_mut(draw, AttachmentPoint::Color0) {
                    for y in region.y..region.y + region.height {
                        for x in region.x..region.x + region.width {
                            image.set_color(x, y, color);
                        }
                    }
                }
            }
        }

        let mut depth_stencil = flags & ClearFlags::DEPTH_STENCIL;
        if !self.depth_mask {
            depth_stencil.remove(ClearFlags::DEPTH);
        }
        if !depth_stencil.is_empty() {
            if let Some(region) = self.attachment_image(draw, AttachmentPoint::DepthStencil).map(|i| self.write_region(i)) {
                if let Some(image) = self.attachment_image_mut(draw, AttachmentPoint::DepthStencil) {
                    for y in region.y..region.y + region.height {
                        for x in region.x..region.x + region.width {
                            image.set_depth_stencil(x, y, depth_stencil, depth, stencil);
                        }
                    }
                }
            }
        }
    }

    fn blit_framebuffer(&mut self, src: Rect, dst: Rect, mask: ClearFlags) {
        self.log(format!("blit {:?}", mask));
        if dst.width <= 0 || dst.height <= 0 || src.width <= 0 || src.height <= 0 {
            return;
        }
        let (read, draw) = (self.read_framebuffer, self.draw_framebuffer);

        let planes = [
            (ClearFlags::COLOR, AttachmentPoint::Color0),
            (ClearFlags::DEPTH_STENCIL, AttachmentPoint::DepthStencil),
        ];
        for (plane, point) in planes {
            let plane_mask = mask & plane;
            if plane_mask.is_empty() {
                continue;
            }
            let Some(source) = self.attachment_image(read, point).cloned() else {
                continue;
            };
            let Some(target) = self.attachment_image_mut(draw, point) else {
                continue;
            };

            for dy in 0..dst.height {
                for dx in 0..dst.width {
                    let sx = src.x + dx * src.width / dst.width;
                    let sy = src.y + dy * src.height / dst.height;
                    let (tx, ty) = (dst.x + dx, dst.y + dy);
                    if point == AttachmentPoint::Color0 {
                        if let Some(value) = source.color(sx, sy) {
                            target.set_color(tx, ty, value);
                        }
                    } else if let Some((depth, stencil)) = source.depth_stencil(sx, sy) {
                        target.set_depth_stencil(tx, ty, plane_mask, depth, stencil);
                    }
                }
            }
        }
    }

    fn load_program(&mut self, name: &str) -> Option<GlName> {
        if !self.known_programs.iter().any(|p| p == name) {
            surface_debug!("twinscan::headless_gl", "Unknown program '{}'", name);
            return None;
        }
        let program = self.names.alloc();
        self.programs.insert(program, name.to_string());
        Some(program)
    }

    fn use_program(&mut self, program: GlName) {
        self.program = program;
    }

    fn delete_program(&mut self, program: GlName) {
        if self.programs.remove(&program).is_some() {
            self.names.free(program);
            if self.program == program {
                self.program = 0;
            }
        }
    }

    fn create_vertex_array(&mut self, data: &[u8], stride: u32, attributes: &[VertexAttribute]) -> Option<GlName> {
        if stride == 0 || attributes.iter().any(|a| a.components != 2) {
            return None;
        }
        let name = self.names.alloc();
        self.vertex_arrays.insert(name, VertexArray {
            data: data.to_vec(),
            stride,
            attributes: attributes.to_vec(),
        });
        Some(name)
    }

    fn bind_vertex_array(&mut self, vertex_array: GlName) {
        self.vertex_array = vertex_array;
    }

    fn delete_vertex_array(&mut self, vertex_array: GlName) {
        if self.vertex_arrays.remove(&vertex_array).is_some() {
            self.names.free(vertex_array);
            if self.vertex_array == vertex_array {
                self.vertex_array = 0;
            }
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: GlName) {
        self.texture_units.insert(unit, texture);
    }

    fn draw_triangles(&mut self, first: u32, count: u32) {
        self.log(format!("draw_triangles {} {}", first, count));
        if !self.programs.contains_key(&self.program) {
            return;
        }
        let Some(vertices) = self.vertex_arrays.get(&self.vertex_array).cloned() else {
            return;
        };
        let Some(source) = self.texture_image(self.bound_texture(0)).cloned() else {
            return;
        };

        let end = (first + count).min(vertices.vertex_count());
        let mut index = first;
        while index + 3 <= end {
            let mut triangle = [RasterVertex { position: Vec2::ZERO, tex_coord: Vec2::ZERO }; 3];
            for (corner, slot) in triangle.iter_mut().enumerate() {
                let vertex = index + corner as u32;
                let position = vertices.read_vec2(vertex, 0).unwrap_or(Vec2::ZERO);
                let tex_coord = vertices.read_vec2(vertex, 1).unwrap_or(Vec2::ZERO);
                *slot = RasterVertex { position: self.to_window(position), tex_coord };
            }
            self.rasterize(triangle, &source);
            index += 3;
        }
    }

    fn flush(&mut self) {
        self.log("flush".to_string());
        self.flushes += 1;
    }

    fn texture_fetch_barrier(&mut self) {
        self.barriers += 1;
    }
}

// ============================================================================
// WindowHost
// ============================================================================

impl WindowHost for HeadlessGl {
    fn create_window(&mut self, config: &WindowConfig) -> Result<()> {
        if config.api_version > self.max_api_version {
            surface_bail!("twinscan::headless_gl", Error::ContextCreationError(format!(
                "OpenGL {}.{} core requested, driver provides {}.{}",
                config.api_version.0, config.api_version.1,
                self.max_api_version.0, self.max_api_version.1)));
        }

        let width = config.width.max(1) as u32;
        let height = config.height.max(1) as u32;
        self.check_storage(0, &DEFAULT_FRAMEBUFFER_PLANES, width, height)?;
        self.resize_default_framebuffer(width, height);
        self.viewport = Rect::full(width, height);
        self.scissor = Rect::full(width, height);
        self.window_open = true;
        self.visible = !config.invisible;
        self.close_flag = false;
        Ok(())
    }

    fn destroy_window(&mut self) {
        self.window_open = false;
        self.visible = false;
    }

    fn make_context_current(&mut self) {}

    fn framebuffer_size(&self) -> (i32, i32) {
        (self.back_color.width as i32, self.back_color.height as i32)
    }

    fn set_os_swap_interval(&mut self, interval: u32) {
        self.os_swap_interval = interval;
    }

    fn os_swap_interval(&self) -> u32 {
        self.os_swap_interval
    }

    fn swap_buffers(&mut self) {
        self.log("swap_buffers".to_string());
        self.front = self.back_color.clone();
        self.swaps += 1;
    }

    fn poll_events(&mut self) -> Vec<HostEvent> {
        self.log("poll_events".to_string());
        self.events.drain(..).collect()
    }

    fn should_close(&self) -> bool {
        self.close_flag
    }
}
