//! Window tests on the desktop backend
//!
//! Full sessions over the software GL device: exact sizing, clears, the
//! flip-on-present image, resize handling, depth resolve and window close.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec4;
use twinscan_surface::twinscan::backend::{BasicRenderState, ResizeListener};
use twinscan_surface::twinscan::presentation::{PresentationState, TickOutcome};
use twinscan_surface::twinscan::surface::{NativeHandle, Surface};
use twinscan_surface::twinscan::{Error, Window, WindowConfig};
use twinscan_surface_backend_desktop::{
    translate_window_event, DesktopBackend, GlDevice, HeadlessDesktopBackend, HeadlessGl, HostEvent, Rect,
};
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;

const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
const BLUE: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);

fn window_on(gl: HeadlessGl, config: WindowConfig) -> Window<HeadlessDesktopBackend> {
    Window::create(config, DesktopBackend::new(gl), Box::new(BasicRenderState::new())).unwrap()
}

fn window(config: WindowConfig) -> Window<HeadlessDesktopBackend> {
    // Unpaced so the tests never sleep
    window_on(HeadlessGl::new(), config.with_swap_interval(0))
}

fn position(commands: &[String], cmd: &str) -> usize {
    commands
        .iter()
        .position(|c| c == cmd)
        .unwrap_or_else(|| panic!("command '{}' not issued: {:?}", cmd, commands))
}

struct RecordingListener {
    log: Rc<RefCell<Vec<String>>>,
}

impl ResizeListener for RecordingListener {
    fn on_resize(&mut self, width: u32, height: u32) {
        self.log.borrow_mut().push(format!("listener {}x{}", width, height));
    }
}

// ============================================================================
// Tests: creation
// ============================================================================

#[test]
fn test_request_used_exactly() {
    let window = window(WindowConfig::new(100, 100));

    assert_eq!((window.width(), window.height()), (100, 100));
    assert_eq!(window.state(), PresentationState::Acquired);
    assert_eq!(window.current_surface(), Surface::Primary);
    assert!(window.targets().get(Surface::Secondary).is_none());
}

#[test]
fn test_unsupported_api_version_fails() {
    let gl = HeadlessGl::new().with_max_api_version(3, 3);
    let config = WindowConfig::new(64, 64).with_api_version(4, 6);

    let result = Window::create(config, DesktopBackend::new(gl), Box::new(BasicRenderState::new()));

    assert!(matches!(result.err(), Some(Error::ContextCreationError(_))));
}

#[test]
fn test_invalid_dimensions_rejected() {
    let result = Window::create(
        WindowConfig::new(0, 100),
        HeadlessDesktopBackend::headless(),
        Box::new(BasicRenderState::new()),
    );

    assert!(matches!(result.err(), Some(Error::InvalidDimensions { .. })));
}

#[test]
fn test_unaddressable_window_fails_cleanly() {
    let gl = HeadlessGl::new().with_memory_limit(1 << 20);

    let result = Window::create(
        WindowConfig::new(i32::MAX, i32::MAX),
        DesktopBackend::new(gl),
        Box::new(BasicRenderState::new()),
    );

    assert!(matches!(result.err(), Some(Error::AllocationError(_))));
}

#[test]
fn test_window_over_memory_budget_fails_cleanly() {
    // Three 4-byte planes of 512x512 do not fit in 1 MiB
    let gl = HeadlessGl::new().with_memory_limit(1 << 20);

    let result = Window::create(WindowConfig::new(512, 512), DesktopBackend::new(gl), Box::new(BasicRenderState::new()));

    assert!(matches!(result.err(), Some(Error::AllocationError(_))));
}

#[test]
fn test_invisible_window() {
    let window = window(WindowConfig::new(32, 32).with_invisible(true));

    assert!(!window.backend().platform().is_visible());
    assert!(window.backend().platform().is_window_open());
}

#[test]
fn test_swap_interval_split() {
    let mut window = window(WindowConfig::new(32, 32));

    window.set_swap_interval(2);

    assert_eq!(window.swap_interval(), 2);
    assert_eq!(window.backend().os_swap_interval(), 0);
    assert_eq!(window.backend().pacer().interval(), 2);
}

// ============================================================================
// Tests: clears and presentation
// ============================================================================

#[test]
fn test_clear_then_swap_shows_color() {
    let mut window = window(WindowConfig::new(100, 100));

    window.clear_color(1.0, 0.0, 0.0, 1.0);
    let outcome = window.swap_buffers().unwrap();

    assert_eq!(outcome, TickOutcome::Continue);
    let gl = window.backend().platform();
    assert_eq!(gl.front_pixel(0, 0), Some(RED));
    assert_eq!(gl.front_pixel(99, 99), Some(RED));
    assert_eq!(gl.swaps(), 1);
    assert_eq!(window.frames_presented(), 1);
}

#[test]
fn test_present_flips_image_upright() {
    let mut window = window(WindowConfig::new(100, 100));
    window.clear_color(1.0, 0.0, 0.0, 1.0);
    let color_texture = window.backend().offscreen_targets().unwrap().color_texture;

    // Top-left texel of the rendered image
    window.backend_mut().platform_mut().write_texel(color_texture, 0, 0, BLUE);
    window.swap_buffers().unwrap();

    // The default framebuffer origin is bottom-left
    let gl = window.backend().platform();
    assert_eq!(gl.front_pixel(0, 99), Some(BLUE));
    assert_eq!(gl.front_pixel(0, 0), Some(RED));
}

#[test]
fn test_viewport_and_scissor_survive_clear_and_swap() {
    let mut window = window(WindowConfig::new(64, 64));
    window.backend_mut().platform_mut().set_viewport(Rect::new(8, 8, 16, 16));
    window.backend_mut().platform_mut().set_scissor(Rect::new(2, 2, 4, 4));

    window.clear_color(0.0, 1.0, 0.0, 1.0);
    assert_eq!(window.backend().platform().viewport(), Rect::new(8, 8, 16, 16));

    window.swap_buffers().unwrap();

    let gl = window.backend().platform();
    assert_eq!(gl.viewport(), Rect::new(8, 8, 16, 16));
    assert_eq!(gl.scissor(), Rect::new(2, 2, 4, 4));
    // The whole window was presented despite the small caller scissor
    assert_eq!(gl.front_pixel(63, 63), Some(Vec4::new(0.0, 1.0, 0.0, 1.0)));
}

#[test]
fn test_swap_protocol_order() {
    let mut window = window(WindowConfig::new(16, 16));
    let framebuffer = window.backend().offscreen_targets().unwrap().framebuffer;
    window.backend_mut().platform_mut().clear_commands();

    window.swap_buffers().unwrap();

    let commands = window.backend().platform().commands().to_vec();
    let bind_default = position(&commands, "bind_framebuffer Both 0");
    let draw = position(&commands, "draw_triangles 0 6");
    let swap = position(&commands, "swap_buffers");
    let poll = position(&commands, "poll_events");
    let rebind = position(&commands, &format!("bind_framebuffer Both {}", framebuffer));
    assert!(bind_default < position(&commands, "flush"));
    assert!(position(&commands, "flush") < draw);
    assert!(draw < swap && swap < poll && poll < rebind);
    // Second flush after the context is restored
    assert_eq!(commands.iter().filter(|c| *c == "flush").count(), 2);
    assert_eq!(window.backend().platform().draw_framebuffer(), framebuffer);
}

#[test]
fn test_color_texture_handle_is_offscreen_texture() {
    let window = window(WindowConfig::new(16, 16));
    let color_texture = window.backend().offscreen_targets().unwrap().color_texture;

    assert_eq!(window.color_texture_handle(), NativeHandle(color_texture as u64));
}

// ============================================================================
// Tests: depth resolve
// ============================================================================

#[test]
fn test_depth_resolve_copies_cleared_depth() {
    let mut window = window(WindowConfig::new(32, 32));
    window.clear_depth_with(0.25);

    window.resolve_depth_texture(Surface::Primary).unwrap();

    let depth_texture = window.backend().offscreen_targets().unwrap().depth_texture;
    let image = window.backend().platform().texture_image(depth_texture).unwrap();
    assert_eq!(image.depth_stencil(0, 0), Some((0.25, 0)));
    assert_eq!(image.depth_stencil(31, 31), Some((0.25, 0)));
    assert_eq!(window.depth_resolves(), 1);
}

#[test]
fn test_depth_clear_ignores_disabled_depth_writes() {
    let mut window = window(WindowConfig::new(32, 32));
    window.backend_mut().platform_mut().set_depth_mask(false);

    window.clear_depth_with(0.25);
    window.resolve_depth_texture(Surface::Primary).unwrap();

    assert!(window.backend().platform().depth_mask());
    let depth_texture = window.backend().offscreen_targets().unwrap().depth_texture;
    let image = window.backend().platform().texture_image(depth_texture).unwrap();
    assert_eq!(image.depth_stencil(16, 16), Some((0.25, 0)));
}

#[test]
fn test_swap_never_resolves_depth() {
    let mut window = window(WindowConfig::new(32, 32));
    window.clear_depth_with(0.5);

    window.swap_buffers().unwrap();

    let depth_texture = window.backend().offscreen_targets().unwrap().depth_texture;
    let image = window.backend().platform().texture_image(depth_texture).unwrap();
    assert_eq!(image.depth_stencil(0, 0), Some((0.0, 0)));
    assert_eq!(window.depth_resolves(), 0);
}

// ============================================================================
// Tests: resize
// ============================================================================

#[test]
fn test_resize_respecifies_storage_in_place() {
    let mut window = window(WindowConfig::new(100, 100).with_resizable(true));
    let before = window.backend().offscreen_targets().unwrap();

    window.backend_mut().platform_mut().resize_window(200, 150);
    window.swap_buffers().unwrap();

    assert_eq!((window.width(), window.height()), (200, 150));
    assert_eq!(window.backend().offscreen_targets(), Some(before));
    let color = window.backend().platform().texture_image(before.color_texture).unwrap();
    assert_eq!((color.width, color.height), (200, 150));
    let set = window.current_set().unwrap();
    assert_eq!((set.width(), set.height()), (200, 150));
}

#[test]
fn test_repeated_resize_to_same_size_is_idempotent() {
    let mut window = window(WindowConfig::new(100, 100).with_resizable(true));
    let before = window.backend().offscreen_targets().unwrap();

    window.backend_mut().platform_mut().resize_window(80, 60);
    window.swap_buffers().unwrap();
    let storage = window.backend().platform().storage_bytes();
    window.backend_mut().platform_mut().resize_window(80, 60);
    window.swap_buffers().unwrap();

    assert_eq!(window.backend().offscreen_targets(), Some(before));
    assert_eq!(window.backend().platform().storage_bytes(), storage);
    assert_eq!(window.backend().platform().live_objects(), 8);
    assert_eq!((window.width(), window.height()), (80, 60));
}

#[test]
fn test_resize_notifies_listeners_then_callback() {
    let mut window = window(WindowConfig::new(100, 100).with_resizable(true));
    let log = Rc::new(RefCell::new(Vec::new()));
    window.add_resize_listener(Box::new(RecordingListener { log: log.clone() }));
    let callback_log = log.clone();
    window.set_resize_callback(Box::new(move |w, h| {
        callback_log.borrow_mut().push(format!("callback {}x{}", w, h));
    }));

    window.backend_mut().platform_mut().resize_window(0, 40);
    window.swap_buffers().unwrap();

    assert_eq!(*log.borrow(), vec!["listener 1x40".to_string(), "callback 1x40".to_string()]);
    assert_eq!((window.width(), window.height()), (1, 40));
}

#[test]
fn test_resize_ignored_when_not_resizable() {
    let mut window = window(WindowConfig::new(100, 100));
    let storage = window.backend().platform().storage_bytes();

    window.backend_mut().platform_mut().resize_window(200, 150);
    window.swap_buffers().unwrap();

    assert_eq!((window.width(), window.height()), (100, 100));
    assert_eq!(window.backend().platform().storage_bytes(), storage);
}

#[test]
fn test_refused_resize_keeps_window_usable() {
    // The 400x400 color texture fits, its depth renderbuffer does not
    let gl = HeadlessGl::new().with_memory_limit(720_000);
    let mut window = window_on(gl, WindowConfig::new(100, 100).with_resizable(true).with_swap_interval(0));
    let targets = window.backend().offscreen_targets().unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));
    window.add_resize_listener(Box::new(RecordingListener { log: log.clone() }));

    let result = window.on_framebuffer_resized(400, 400);

    assert!(matches!(result, Err(Error::AllocationError(_))));
    assert!(log.borrow().is_empty());
    assert_eq!((window.width(), window.height()), (100, 100));
    let platform = window.backend().platform();
    let color = platform.texture_image(targets.color_texture).unwrap();
    let depth = platform.renderbuffer_image(targets.depth_renderbuffer).unwrap();
    assert_eq!((color.width, color.height), (100, 100));
    assert_eq!((depth.width, depth.height), (100, 100));

    window.clear_color(1.0, 0.0, 0.0, 1.0);
    assert_eq!(window.swap_buffers().unwrap(), TickOutcome::Continue);
    assert_eq!(window.backend().platform().front_pixel(50, 50), Some(RED));
}

// ============================================================================
// Tests: close
// ============================================================================

#[test]
fn test_close_request_terminates_on_next_swap() {
    let mut window = window(WindowConfig::new(32, 32));
    let hook_runs = Rc::new(RefCell::new(0));
    let counter = hook_runs.clone();
    window.add_shutdown_hook(Box::new(move || *counter.borrow_mut() += 1));

    window.backend_mut().platform_mut().request_close();
    let outcome = window.swap_buffers().unwrap();

    assert_eq!(outcome, TickOutcome::Exiting);
    assert_eq!(window.state(), PresentationState::Terminating);
    assert!(!window.is_running());
    let gl = window.backend().platform();
    assert_eq!(gl.live_objects(), 0);
    assert!(!gl.is_window_open());

    drop(window);
    assert_eq!(*hook_runs.borrow(), 1);
}

#[test]
fn test_close_event_from_winit() {
    let mut window = window(WindowConfig::new(32, 32));
    let event = translate_window_event(&WindowEvent::CloseRequested).unwrap();

    window.backend_mut().platform_mut().push_event(event);
    let outcome = window.swap_buffers().unwrap();

    assert_eq!(outcome, TickOutcome::Exiting);
}

#[test]
fn test_winit_resize_translation() {
    let event = WindowEvent::Resized(PhysicalSize::new(800, 600));

    assert_eq!(translate_window_event(&event), Some(HostEvent::Resized { width: 800, height: 600 }));
    assert_eq!(translate_window_event(&WindowEvent::Focused(true)), None);
}
