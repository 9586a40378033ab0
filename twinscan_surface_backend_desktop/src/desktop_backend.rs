/// DesktopBackend - RenderSurfaceBackend over an OpenGL window
///
/// The application renders into an offscreen framebuffer (color texture +
/// depth-stencil renderbuffer). Presentation draws that texture into the
/// window's default framebuffer with a full-screen quad, which undoes the
/// upside-down image produced by the upper-left clip origin, then swaps.
///
/// Depth sampling uses a second depth-stencil texture filled on demand by a
/// blit between a dedicated source/destination framebuffer pair.

use twinscan_surface::twinscan::backend::{
    ClearEffect, ClearFlags, ClearRequest, ForegroundStatus, RenderSurfaceBackend, SurfaceAllocator,
};
use twinscan_surface::twinscan::surface::{
    AllocatedBuffer, BufferLayout, NativeHandle, PixelFormat, RenderTargetSet, Surface, SurfaceDesc,
};
use twinscan_surface::twinscan::{Error, Result, WindowConfig};
use twinscan_surface::{surface_bail, surface_debug, surface_err, surface_error, surface_info, surface_warn};

use crate::desktop_config::DesktopConfig;
use crate::desktop_frame_pacer::FramePacer;
use crate::desktop_gl_device::{
    AttachmentPoint, ContextString, FramebufferStatus, FramebufferTarget, GlCapability, GlDevice,
    GlName, DEFAULT_FRAMEBUFFER,
};
use crate::desktop_headless_gl::HeadlessGl;
use crate::desktop_screen_quad::ScreenQuad;
use crate::desktop_swap_geometry::SwapGeometry;
use crate::desktop_window_host::{HostEvent, WindowHost};

static DESKTOP_SURFACES: [Surface; 1] = [Surface::Primary];

/// Desktop backend on the software GL device
pub type HeadlessDesktopBackend = DesktopBackend<HeadlessGl>;

/// GL objects backing the single desktop surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffscreenTargets {
    pub framebuffer: GlName,
    pub color_texture: GlName,
    pub depth_renderbuffer: GlName,
    pub depth_texture: GlName,
    /// Depth resolve source (depth renderbuffer attached)
    pub resolve_src: GlName,
    /// Depth resolve destination (depth texture attached)
    pub resolve_dst: GlName,
}

impl OffscreenTargets {
    fn objects(&self) -> [GlObject; 6] {
        [
            GlObject::Framebuffer(self.resolve_dst),
            GlObject::Framebuffer(self.resolve_src),
            GlObject::Framebuffer(self.framebuffer),
            GlObject::Texture(self.depth_texture),
            GlObject::Renderbuffer(self.depth_renderbuffer),
            GlObject::Texture(self.color_texture),
        ]
    }
}

/// Typed GL object name, for deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GlObject {
    Texture(GlName),
    Renderbuffer(GlName),
    Framebuffer(GlName),
}

pub struct DesktopBackend<P: GlDevice + WindowHost> {
    platform: P,
    config: DesktopConfig,

    targets: Option<OffscreenTargets>,
    screen_quad: Option<ScreenQuad>,
    geometry: SwapGeometry,
    pacer: FramePacer,

    pending_resize: Option<(i32, i32)>,
    close_requested: bool,
    running: bool,
}

impl<P: GlDevice + WindowHost> DesktopBackend<P> {
    pub fn new(platform: P) -> Self {
        Self::with_config(platform, DesktopConfig::default())
    }

    pub fn with_config(platform: P, config: DesktopConfig) -> Self {
        let pacer = FramePacer::new(config.refresh_rate);
        Self {
            platform,
            config,
            targets: None,
            screen_quad: None,
            geometry: SwapGeometry::default(),
            pacer,
            pending_resize: None,
            close_requested: false,
            running: false,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn config(&self) -> &DesktopConfig {
        &self.config
    }

    pub fn offscreen_targets(&self) -> Option<OffscreenTargets> {
        self.targets
    }

    pub fn geometry(&self) -> &SwapGeometry {
        &self.geometry
    }

    pub fn pacer(&self) -> &FramePacer {
        &self.pacer
    }

    /// Interval configured on the windowing library (always 0)
    pub fn os_swap_interval(&self) -> u32 {
        self.platform.os_swap_interval()
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    // ===== DIAGNOSTICS =====

    fn log_context_diagnostics(&self) {
        for (label, which) in [
            ("Renderer", ContextString::Renderer),
            ("OpenGL version", ContextString::Version),
            ("GLSL version", ContextString::ShadingLanguageVersion),
        ] {
            match self.platform.context_string(which) {
                Some(value) => surface_info!("twinscan::desktop", "{}: {}", label, value),
                None => surface_warn!("twinscan::desktop", "{}: unavailable", label),
            }
        }
    }

    // ===== OFFSCREEN TARGETS =====

    fn layout(desc: &SurfaceDesc) -> BufferLayout {
        let bpp = desc.format.bytes_per_pixel();
        BufferLayout {
            desc: *desc,
            pitch: desc.width,
            byte_size: desc.width as u64 * desc.height as u64 * bpp as u64,
            alignment: 4,
        }
    }

    /// Layouts of (color, depth, depth texture) at `width` x `height`
    fn layouts(width: u32, height: u32) -> (BufferLayout, BufferLayout, BufferLayout) {
        let desc = RenderTargetSet::describe(Surface::Primary, width, height);
        let mut depth_texture = desc.depth_texture;
        // Blit targets must match the source depth-stencil format
        depth_texture.format = PixelFormat::D24_UNORM_S8_UINT;
        (Self::layout(&desc.color), Self::layout(&desc.depth), Self::layout(&depth_texture))
    }

    fn track(created: &mut Vec<GlObject>, what: &str, object: Option<GlObject>) -> Result<GlName> {
        match object {
            Some(object) => {
                created.push(object);
                Ok(match object {
                    GlObject::Texture(name) | GlObject::Renderbuffer(name) | GlObject::Framebuffer(name) => name,
                })
            }
            None => Err(surface_err!("twinscan::desktop",
                Error::AllocationError(format!("failed to create {}", what)))),
        }
    }

    fn specify_storage(&mut self, targets: &OffscreenTargets, width: u32, height: u32) -> Result<()> {
        self.platform.texture_storage(targets.color_texture, PixelFormat::R8G8B8A8_UNORM, width, height)?;
        self.platform.renderbuffer_storage(targets.depth_renderbuffer, PixelFormat::D24_UNORM_S8_UINT, width, height)?;
        self.platform.texture_storage(targets.depth_texture, PixelFormat::D24_UNORM_S8_UINT, width, height)?;
        Ok(())
    }

    fn check_complete(&self, targets: &OffscreenTargets) -> Result<()> {
        for (label, framebuffer) in [
            ("offscreen", targets.framebuffer),
            ("depth resolve source", targets.resolve_src),
            ("depth resolve destination", targets.resolve_dst),
        ] {
            let status = self.platform.framebuffer_status(framebuffer);
            if status != FramebufferStatus::Complete {
                surface_bail!("twinscan::desktop", Error::AllocationError(format!(
                    "{} framebuffer incomplete: {:?}", label, status)));
            }
        }
        Ok(())
    }

    fn build_targets(&mut self, created: &mut Vec<GlObject>, width: u32, height: u32) -> Result<OffscreenTargets> {
        let gl = &mut self.platform;
        let color_texture = Self::track(created, "color texture", gl.create_texture().map(GlObject::Texture))?;
        let depth_renderbuffer =
            Self::track(created, "depth renderbuffer", gl.create_renderbuffer().map(GlObject::Renderbuffer))?;
        let depth_texture = Self::track(created, "depth texture", gl.create_texture().map(GlObject::Texture))?;
        let framebuffer = Self::track(created, "framebuffer", gl.create_framebuffer().map(GlObject::Framebuffer))?;
        let resolve_src =
            Self::track(created, "depth resolve source", gl.create_framebuffer().map(GlObject::Framebuffer))?;
        let resolve_dst =
            Self::track(created, "depth resolve destination", gl.create_framebuffer().map(GlObject::Framebuffer))?;

        let targets = OffscreenTargets {
            framebuffer,
            color_texture,
            depth_renderbuffer,
            depth_texture,
            resolve_src,
            resolve_dst,
        };
        self.specify_storage(&targets, width, height)?;

        self.platform.attach_texture(framebuffer, AttachmentPoint::Color0, color_texture);
        self.platform.attach_renderbuffer(framebuffer, AttachmentPoint::DepthStencil, depth_renderbuffer);
        self.platform.attach_renderbuffer(resolve_src, AttachmentPoint::DepthStencil, depth_renderbuffer);
        self.platform.attach_texture(resolve_dst, AttachmentPoint::DepthStencil, depth_texture);
        self.check_complete(&targets)?;

        Ok(targets)
    }

    fn delete_objects(&mut self, objects: &[GlObject]) {
        for object in objects {
            match *object {
                GlObject::Texture(name) => self.platform.delete_texture(name),
                GlObject::Renderbuffer(name) => self.platform.delete_renderbuffer(name),
                GlObject::Framebuffer(name) => self.platform.delete_framebuffer(name),
            }
        }
    }

    fn assemble(targets: &OffscreenTargets, width: u32, height: u32) -> RenderTargetSet {
        let (color, depth, depth_texture) = Self::layouts(width, height);
        RenderTargetSet::assemble(
            Surface::Primary,
            AllocatedBuffer { layout: color, memory: NativeHandle(targets.color_texture as u64) },
            AllocatedBuffer { layout: depth, memory: NativeHandle(targets.depth_renderbuffer as u64) },
            AllocatedBuffer { layout: depth_texture, memory: NativeHandle(targets.depth_texture as u64) },
        )
    }

    fn bind_offscreen(&mut self) {
        if let Some(targets) = self.targets {
            self.platform.bind_framebuffer(FramebufferTarget::Both, targets.framebuffer);
        }
    }

    fn handle_events(&mut self) {
        for event in self.platform.poll_events() {
            match event {
                HostEvent::Resized { width, height } => {
                    surface_debug!("twinscan::desktop", "Framebuffer size changed to {}x{}", width, height);
                    self.pending_resize = Some((width, height));
                }
                HostEvent::CloseRequested => {
                    if !self.close_requested {
                        surface_info!("twinscan::desktop", "Window close requested");
                    }
                    self.close_requested = true;
                }
            }
        }
        if self.platform.should_close() {
            self.close_requested = true;
        }
    }
}

impl HeadlessDesktopBackend {
    /// Backend over a default software GL device
    pub fn headless() -> Self {
        Self::new(HeadlessGl::new())
    }
}

impl<P: GlDevice + WindowHost> SurfaceAllocator for DesktopBackend<P> {
    fn allocate_targets(&mut self, width: u32, height: u32) -> Result<Vec<RenderTargetSet>> {
        if self.targets.is_some() {
            surface_bail!("twinscan::desktop",
                Error::AllocationError("offscreen targets already allocated".to_string()));
        }

        let mut created = Vec::new();
        let targets = match self.build_targets(&mut created, width, height) {
            Ok(targets) => targets,
            Err(e) => {
                created.reverse();
                self.delete_objects(&created);
                return Err(e);
            }
        };

        self.targets = Some(targets);
        self.geometry.set_size(width, height);
        self.bind_offscreen();
        surface_debug!("twinscan::desktop", "Offscreen framebuffer {} created at {}x{}",
            targets.framebuffer, width, height);

        Ok(vec![Self::assemble(&targets, width, height)])
    }

    fn release_targets(&mut self, sets: &mut [RenderTargetSet]) {
        if let Some(targets) = self.targets.take() {
            self.platform.bind_framebuffer(FramebufferTarget::Both, DEFAULT_FRAMEBUFFER);
            self.delete_objects(&targets.objects());
            surface_debug!("twinscan::desktop", "Offscreen framebuffer {} deleted", targets.framebuffer);
        }
        for set in sets.iter_mut() {
            set.release();
        }
    }
}

impl<P: GlDevice + WindowHost> RenderSurfaceBackend for DesktopBackend<P> {
    fn name(&self) -> &str {
        "desktop"
    }

    fn surfaces(&self) -> &'static [Surface] {
        &DESKTOP_SURFACES
    }

    fn open_device(&mut self, config: &WindowConfig) -> Result<()> {
        self.platform.create_window(config)?;
        self.platform.make_context_current();
        self.close_requested = false;
        surface_info!("twinscan::desktop", "OpenGL {}.{} core context created{}",
            config.api_version.0, config.api_version.1,
            if config.invisible { " (invisible window)" } else { "" });
        self.log_context_diagnostics();
        Ok(())
    }

    fn create_context(&mut self) -> Result<()> {
        if self.screen_quad.is_some() {
            return Ok(());
        }

        if self.platform.has_clip_control() {
            self.platform.set_clip_origin_upper_left();
        } else {
            surface_warn!("twinscan::desktop",
                "Required OpenGL extensions not supported: GL_VERSION_4_5, GL_ARB_clip_control. Continuing anyway.");
        }

        let shader = self.config.screen_shader.clone();
        self.screen_quad = Some(ScreenQuad::create(&mut self.platform, &shader)?);

        self.bind_offscreen();
        self.platform.set_capability(GlCapability::ScissorTest, true);
        self.running = true;
        Ok(())
    }

    fn make_context_current(&mut self) {
        self.platform.make_context_current();
        self.bind_offscreen();
    }

    fn close_device(&mut self) {
        self.running = false;
        if let Some(quad) = self.screen_quad.take() {
            quad.destroy(&mut self.platform);
        }
        if let Some(targets) = self.targets.take() {
            self.delete_objects(&targets.objects());
        }
        self.platform.destroy_window();
    }

    fn is_running(&self) -> bool {
        self.running && !self.close_requested
    }

    fn bind(&mut self, _set: &RenderTargetSet) {
        self.bind_offscreen();
    }

    fn clear(&mut self, _set: &mut RenderTargetSet, request: &ClearRequest) -> ClearEffect {
        self.platform.make_context_current();
        if request.flags.contains(ClearFlags::DEPTH) {
            self.platform.set_depth_mask(true);
        }
        self.geometry.enter_full_surface(&mut self.platform);
        self.platform.clear(request.flags, request.color, request.depth, request.stencil);
        self.geometry.restore(&mut self.platform);
        ClearEffect::BindingPreserved
    }

    fn set_swap_interval(&mut self, interval: u32) {
        self.platform.set_os_swap_interval(0);
        self.pacer.set_interval(interval);
        surface_debug!("twinscan::desktop", "Swap interval {} (paced at {} Hz)",
            interval, self.pacer.refresh_rate());
    }

    fn swap_interval(&self) -> u32 {
        self.pacer.interval()
    }

    fn begin_present(&mut self, _sets: &[RenderTargetSet]) {
        self.platform.bind_framebuffer(FramebufferTarget::Both, DEFAULT_FRAMEBUFFER);
        self.geometry.enter_full_surface(&mut self.platform);
    }

    fn flush(&mut self) {
        self.platform.flush();
    }

    fn copy_to_scan_out(&mut self, sets: &[RenderTargetSet]) {
        let (Some(quad), Some(targets)) = (self.screen_quad, self.targets) else {
            return;
        };
        if sets.is_empty() {
            return;
        }
        quad.draw(&mut self.platform, targets.color_texture);
    }

    fn flip(&mut self) {
        self.platform.swap_buffers();
        self.handle_events();
    }

    fn restore_context(&mut self, _current: &RenderTargetSet) {
        self.bind_offscreen();
        self.geometry.restore(&mut self.platform);
    }

    fn wait_for_flip(&mut self) {
        self.pacer.wait();
    }

    fn enable_outputs(&mut self) {}

    fn poll_foreground(&mut self) -> ForegroundStatus {
        if self.close_requested || self.platform.should_close() {
            self.close_requested = true;
            ForegroundStatus::Exiting
        } else {
            ForegroundStatus::InForeground
        }
    }

    fn invalidate_depth_cache(&mut self, _set: &RenderTargetSet) {
        // Renderbuffer writes are coherent with blits
    }

    fn convert_depth_to_texture(&mut self, set: &mut RenderTargetSet) -> Result<()> {
        let Some(targets) = self.targets else {
            surface_bail!("twinscan::desktop",
                Error::BackendError("depth resolve without offscreen targets".to_string()));
        };

        let full = self.geometry.full_rect();
        self.platform.bind_framebuffer(FramebufferTarget::Read, targets.resolve_src);
        self.platform.bind_framebuffer(FramebufferTarget::Draw, targets.resolve_dst);
        self.platform.blit_framebuffer(full, full, ClearFlags::DEPTH_STENCIL);
        self.bind_offscreen();

        surface_debug!("twinscan::desktop", "{} depth blitted into texture {}", set.surface, targets.depth_texture);
        Ok(())
    }

    fn invalidate_depth_texture_cache(&mut self, _set: &RenderTargetSet) {
        self.platform.texture_fetch_barrier();
    }

    fn resize_targets(&mut self, sets: &mut [RenderTargetSet], width: u32, height: u32) -> Result<bool> {
        let Some(targets) = self.targets else {
            return Ok(false);
        };

        let (old_width, old_height) = (self.geometry.width(), self.geometry.height());
        if let Err(e) = self.specify_storage(&targets, width, height).and_then(|_| self.check_complete(&targets)) {
            // Put every attachment back at the old size; contents are lost
            if let Err(restore) = self.specify_storage(&targets, old_width, old_height) {
                surface_error!("twinscan::desktop", "Restoring {}x{} offscreen storage failed: {}",
                    old_width, old_height, restore);
            }
            self.bind_offscreen();
            return Err(e);
        }

        let (color, depth, depth_texture) = Self::layouts(width, height);
        for set in sets.iter_mut() {
            set.respecify(color, depth, depth_texture);
        }
        self.geometry.set_size(width, height);
        self.pacer.reset();
        self.bind_offscreen();
        Ok(true)
    }

    fn take_pending_resize(&mut self) -> Option<(i32, i32)> {
        self.pending_resize.take()
    }
}

#[cfg(test)]
#[path = "desktop_backend_tests.rs"]
mod tests;
