/*!
# Twinscan Surface - Desktop Backend

`RenderSurfaceBackend` for a desktop OpenGL window.

## Rendering model

The application draws into one offscreen framebuffer (RGBA8 color texture
plus a D24S8 depth-stencil renderbuffer) with an upper-left clip origin.
Each swap draws the color texture into the window's default framebuffer
with a full-screen quad, flipping the image upright, then swaps the
window buffers.

Swap pacing is done by `FramePacer`; the windowing library's own interval
is kept at 0.

## Platform seams

- `GlDevice`: the OpenGL entry points the backend uses
- `WindowHost`: window creation, buffer swap and event polling

`HeadlessGl` implements both in software. `translate_window_event` maps
winit window events onto `HostEvent`.
*/

mod desktop_backend;
mod desktop_config;
mod desktop_frame_pacer;
mod desktop_gl_device;
mod desktop_headless_gl;
mod desktop_name_allocator;
mod desktop_screen_quad;
mod desktop_swap_geometry;
mod desktop_window_host;
mod desktop_winit;

pub use desktop_backend::{DesktopBackend, HeadlessDesktopBackend, OffscreenTargets};
pub use desktop_config::{DesktopConfig, DEFAULT_SCREEN_SHADER};
pub use desktop_frame_pacer::FramePacer;
pub use desktop_gl_device::{
    AttachmentPoint, ContextString, FramebufferStatus, FramebufferTarget, GlCapability, GlDevice,
    GlName, Rect, VertexAttribute, DEFAULT_FRAMEBUFFER,
};
pub use desktop_headless_gl::{HeadlessGl, Image, DEFAULT_MAX_TEXTURE_SIZE};
pub use desktop_name_allocator::NameAllocator;
pub use desktop_screen_quad::{ScreenQuad, ScreenVertex, SCREEN_QUAD_VERTICES, SCREEN_VERTEX_ATTRIBUTES};
pub use desktop_swap_geometry::SwapGeometry;
pub use desktop_window_host::{HostEvent, WindowHost};
pub use desktop_winit::{forward_window_event, translate_window_event};
