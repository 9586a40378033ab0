/// Tests for Window
///
/// These tests validate window creation, binding, clears (including the
/// rebind after invalidating clears), swap, depth resolve, resize
/// forwarding, handle export and shutdown against the mock backend.

use super::*;
use crate::backend::{BasicRenderState, ForegroundStatus, MockBackend};
use std::cell::RefCell;
use std::rc::Rc;

fn window(backend: MockBackend, config: WindowConfig) -> Window<MockBackend> {
    let mut window = Window::create(config, backend, Box::new(BasicRenderState::new())).unwrap();
    window.backend_mut().clear_log();
    window
}

/// Resize listener recording into a shared event log
struct RecordingListener {
    events: Rc<RefCell<Vec<String>>>,
}

impl ResizeListener for RecordingListener {
    fn on_resize(&mut self, width: u32, height: u32) {
        self.events.borrow_mut().push(format!("listener {}x{}", width, height));
    }
}

// ============================================================================
// Tests: create
// ============================================================================

#[test]
fn test_create_reports_dimensions() {
    let window = window(MockBackend::new(), WindowConfig::new(100, 100));

    assert_eq!((window.width(), window.height()), (100, 100));
    assert_eq!(window.state(), PresentationState::Acquired);
    assert_eq!(window.current_surface(), Surface::Primary);
    assert!(window.is_running());
}

#[test]
fn test_create_rejects_invalid_dimensions() {
    let result = Window::create(
        WindowConfig::new(-4, 100),
        MockBackend::new(),
        Box::new(BasicRenderState::new()),
    );

    assert_eq!(
        result.err(),
        Some(Error::InvalidDimensions { width: -4, height: 100 })
    );
}

#[test]
fn test_create_allocation_failure() {
    let mut backend = MockBackend::new();
    backend.allocations_before_failure = Some(0);

    let result = Window::create(WindowConfig::default(), backend, Box::new(BasicRenderState::new()));

    assert!(matches!(result.err(), Some(Error::AllocationError(_))));
}

// ============================================================================
// Tests: make_current / clears
// ============================================================================

#[test]
fn test_make_current_binds_surface() {
    let mut window = window(MockBackend::dual(), WindowConfig::default());

    window.make_current(Surface::Secondary).unwrap();

    assert_eq!(window.current_surface(), Surface::Secondary);
    assert_eq!(window.backend().commands, vec!["bind DRC"]);
}

#[test]
fn test_make_current_unknown_surface_fails() {
    let mut window = window(MockBackend::new(), WindowConfig::default());

    let result = window.make_current(Surface::Secondary);

    assert!(matches!(result, Err(Error::BackendError(_))));
    assert_eq!(window.current_surface(), Surface::Primary);
}

#[test]
fn test_invalidating_clear_rebinds() {
    let mut window = window(MockBackend::dual(), WindowConfig::default());

    window.clear_color(1.0, 0.0, 0.0, 1.0);

    assert_eq!(
        window.backend().commands,
        vec!["clear TV ClearFlags(COLOR)", "bind TV"]
    );
}

#[test]
fn test_preserving_clear_does_not_rebind() {
    let mut window = window(MockBackend::new(), WindowConfig::default());

    window.clear_depth_stencil();

    assert_eq!(window.backend().count("bind TV"), 0);
    assert_eq!(window.backend().commands.len(), 1);
}

#[test]
fn test_clear_then_make_current_matches_uncleared_binding() {
    let mut cleared = window(MockBackend::dual(), WindowConfig::default());
    let mut fresh = window(MockBackend::dual(), WindowConfig::default());

    cleared.clear_color(0.2, 0.3, 0.4, 1.0);
    cleared.make_current(Surface::Primary).unwrap();
    fresh.make_current(Surface::Primary).unwrap();

    assert_eq!(cleared.backend().commands.last(), fresh.backend().commands.last());
    assert_eq!(cleared.current_set(), fresh.current_set());
}

#[test]
fn test_clear_variants_target_current_surface() {
    let mut window = window(MockBackend::dual(), WindowConfig::default());
    window.make_current(Surface::Secondary).unwrap();
    window.backend_mut().clear_log();

    window.clear_depth();
    window.clear_stencil_with(3);
    window.clear_depth_with(0.5);
    window.clear_stencil();

    let clears: Vec<&String> = window
        .backend()
        .commands
        .iter()
        .filter(|c| c.starts_with("clear"))
        .collect();
    assert_eq!(clears.len(), 4);
    assert!(clears.iter().all(|c| c.starts_with("clear DRC")));
}

// ============================================================================
// Tests: swap / depth
// ============================================================================

#[test]
fn test_swap_buffers_continue() {
    let mut window = window(MockBackend::new(), WindowConfig::default());

    assert_eq!(window.swap_buffers().unwrap(), TickOutcome::Continue);
    assert_eq!(window.frames_presented(), 1);
}

#[test]
fn test_swap_buffers_release_resume_keeps_surface() {
    let backend = MockBackend::dual()
        .script(&[ForegroundStatus::InForeground]);
    let mut window = window(backend, WindowConfig::new(640, 480));
    window.make_current(Surface::Secondary).unwrap();
    window.swap_buffers().unwrap();
    window
        .backend_mut()
        .foreground
        .extend([ForegroundStatus::ReleaseRequested, ForegroundStatus::InForeground]);

    assert_eq!(window.swap_buffers().unwrap(), TickOutcome::ReleasedResume);
    assert_eq!(window.current_surface(), Surface::Secondary);
    assert_eq!(window.state(), PresentationState::Acquired);
    assert!(window.is_running());
}

#[test]
fn test_swap_buffers_exit() {
    let backend = MockBackend::new().script(&[ForegroundStatus::Exiting]);
    let mut window = window(backend, WindowConfig::default());

    assert_eq!(window.swap_buffers().unwrap(), TickOutcome::Exiting);
    assert!(!window.is_running());
    assert_eq!(window.color_texture_handle(), NativeHandle::NULL);
}

#[test]
fn test_resolve_depth_texture_on_demand_only() {
    let mut window = window(MockBackend::new(), WindowConfig::default());
    window.clear_depth();
    window.swap_buffers().unwrap();
    assert_eq!(window.backend().count("convert_depth TV"), 0);

    window.resolve_depth_texture(Surface::Primary).unwrap();

    assert_eq!(window.backend().count("convert_depth TV"), 1);
    assert_eq!(window.current_set().unwrap().depth_texture.resolve_count, 1);
    assert_eq!(window.depth_resolves(), 1);
}

#[test]
fn test_swap_interval_forwarded() {
    let mut window = window(MockBackend::new(), WindowConfig::default());

    window.set_swap_interval(0);

    assert_eq!(window.swap_interval(), 0);
    assert_eq!(window.config().swap_interval, 0);
}

// ============================================================================
// Tests: handle export
// ============================================================================

#[test]
fn test_color_texture_handle() {
    let window = window(MockBackend::new(), WindowConfig::default());
    let set = *window.current_set().unwrap();

    assert!(!window.color_texture_handle().is_null());
    assert_eq!(window.color_texture_handle(), set.color_buffer.buffer.memory);
    assert_eq!(color_texture_handle(Some(&window)), window.color_texture_handle());
    assert_eq!(color_texture_handle::<MockBackend>(None), NativeHandle::NULL);
}

// ============================================================================
// Tests: resize
// ============================================================================

#[test]
fn test_resize_ignored_when_not_resizable() {
    let mut backend = MockBackend::new();
    backend.supports_resize = true;
    let mut window = window(backend, WindowConfig::new(100, 100));

    window.on_framebuffer_resized(200, 150).unwrap();

    assert_eq!((window.width(), window.height()), (100, 100));
    assert!(window.backend().commands.is_empty());
}

#[test]
fn test_resize_notifies_listeners_before_callback() {
    let mut backend = MockBackend::new();
    backend.supports_resize = true;
    let mut window = window(backend, WindowConfig::new(100, 100).with_resizable(true));
    let events = Rc::new(RefCell::new(Vec::new()));
    window.add_resize_listener(Box::new(RecordingListener { events: events.clone() }));
    let callback_events = events.clone();
    window.set_resize_callback(Box::new(move |w, h| {
        callback_events.borrow_mut().push(format!("callback {}x{}", w, h));
    }));

    window.on_framebuffer_resized(200, 150).unwrap();

    assert_eq!((window.width(), window.height()), (200, 150));
    assert_eq!(*events.borrow(), vec!["listener 200x150", "callback 200x150"]);
}

#[test]
fn test_resize_clamps_to_one() {
    let mut backend = MockBackend::new();
    backend.supports_resize = true;
    let mut window = window(backend, WindowConfig::new(100, 100).with_resizable(true));

    window.on_framebuffer_resized(0, -3).unwrap();

    assert_eq!((window.width(), window.height()), (1, 1));
    assert_eq!(window.backend().commands, vec!["resize 1x1"]);
}

#[test]
fn test_resize_twice_same_size_is_stable() {
    let mut backend = MockBackend::new();
    backend.supports_resize = true;
    let mut window = window(backend, WindowConfig::new(100, 100).with_resizable(true));

    window.on_framebuffer_resized(300, 200).unwrap();
    let first = *window.current_set().unwrap();
    window.on_framebuffer_resized(300, 200).unwrap();
    let second = *window.current_set().unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_resize_unsupported_backend_keeps_size() {
    let mut window = window(MockBackend::new(), WindowConfig::new(100, 100).with_resizable(true));

    window.on_framebuffer_resized(300, 200).unwrap();

    assert_eq!((window.width(), window.height()), (100, 100));
}

#[test]
fn test_pending_resize_applied_after_swap() {
    let mut backend = MockBackend::new();
    backend.supports_resize = true;
    let mut window = window(backend, WindowConfig::new(100, 100).with_resizable(true));
    window.backend_mut().pending_resize = Some((64, 32));

    window.swap_buffers().unwrap();

    assert_eq!((window.width(), window.height()), (64, 32));
}

// ============================================================================
// Tests: shutdown
// ============================================================================

#[test]
fn test_shutdown_runs_hooks_once_and_frees() {
    let mut window = window(MockBackend::dual(), WindowConfig::default());
    let calls = Rc::new(RefCell::new(0));
    let counter = calls.clone();
    window.add_shutdown_hook(Box::new(move || *counter.borrow_mut() += 1));

    window.shutdown();
    window.shutdown();

    assert_eq!(*calls.borrow(), 1);
    assert_eq!(window.state(), PresentationState::Terminating);
    assert_eq!(window.backend().live_buffers, 0);
    assert!(!window.is_running());
}

#[test]
fn test_drop_runs_shutdown_hooks() {
    let calls = Rc::new(RefCell::new(0));
    {
        let mut window = window(MockBackend::new(), WindowConfig::default());
        let counter = calls.clone();
        window.add_shutdown_hook(Box::new(move || *counter.borrow_mut() += 1));
    }
    assert_eq!(*calls.borrow(), 1);
}
