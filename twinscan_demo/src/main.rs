/// Twinscan demo - application loop over either presentation backend
///
/// Usage: twinscan_demo [desktop|console]
///
/// Both runs are headless. The desktop run resizes its window and then
/// closes it through winit events; the console run goes through one
/// foreground release/resume cycle before the host asks it to exit.

use twinscan_surface::twinscan::backend::{BasicRenderState, ForegroundStatus, RenderSurfaceBackend};
use twinscan_surface::twinscan::presentation::TickOutcome;
use twinscan_surface::twinscan::surface::Surface;
use twinscan_surface::twinscan::{Result, Window, WindowConfig};
use twinscan_surface::{surface_error, surface_info, surface_warn};
use twinscan_surface_backend_console::{
    ConsoleBackend, EmulatedConsoleBackend, EmulatedDisplay, ScriptedLifecycle, DEFAULT_MEM1_SIZE,
};
use twinscan_surface_backend_desktop::{forward_window_event, HeadlessDesktopBackend};
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;

/// Frames rendered before the loop gives up waiting for an exit request
const MAX_FRAMES: u64 = 600;

// ============================================================================
// Frame loop
// ============================================================================

/// Clear color for `frame`, cycling slowly through the hues
fn frame_color(frame: u64) -> (f32, f32, f32) {
    let t = (frame % 120) as f32 / 120.0;
    let phase = t * std::f32::consts::TAU;
    (
        0.5 + 0.5 * phase.cos(),
        0.5 + 0.5 * (phase + 2.094).cos(),
        0.5 + 0.5 * (phase + 4.189).cos(),
    )
}

fn render_frame<B: RenderSurfaceBackend>(window: &mut Window<B>, frame: u64) -> Result<()> {
    let surfaces = window.backend().surfaces();
    for &surface in surfaces {
        window.make_current(surface)?;
        let (r, g, b) = frame_color(frame + surface.index() as u64 * 40);
        window.clear_color(r, g, b, 1.0);
        window.clear_depth_stencil();
    }
    window.make_current(Surface::Primary)?;

    // Post effects sample the depth of the primary surface
    if frame % 60 == 0 {
        window.resolve_depth_texture(Surface::Primary)?;
    }
    Ok(())
}

/// Run frames until the platform asks to exit, then end the process
///
/// `host` runs before each frame and plays the part of the OS / window
/// system.
fn run<B: RenderSurfaceBackend>(mut window: Window<B>, mut host: impl FnMut(&mut Window<B>, u64)) -> ! {
    for frame in 0..MAX_FRAMES {
        host(&mut window, frame);

        let presented = render_frame(&mut window, frame).and_then(|_| window.swap_buffers());
        match presented {
            Ok(TickOutcome::Continue) => {}
            Ok(TickOutcome::ReleasedResume) => {
                surface_info!("twinscan::demo", "Frame {}: resumed at {}x{}",
                    frame, window.width(), window.height());
            }
            Ok(TickOutcome::Exiting) => {
                surface_info!("twinscan::demo", "Exiting after {} frames", window.frames_presented());
                std::process::exit(0);
            }
            Err(e) if e.is_fatal() => {
                surface_error!("twinscan::demo", "Fatal: {}", e);
                std::process::exit(1);
            }
            Err(e) => {
                surface_error!("twinscan::demo", "Frame {} failed: {}", frame, e);
                window.shutdown();
                std::process::exit(1);
            }
        }
    }

    surface_warn!("twinscan::demo", "No exit request after {} frames", MAX_FRAMES);
    window.shutdown();
    std::process::exit(0);
}

// ============================================================================
// Platforms
// ============================================================================

fn run_desktop() -> Result<()> {
    let config = WindowConfig::new(800, 600)
        .with_title("Twinscan demo")
        .with_resizable(true)
        .with_invisible(true)
        .with_swap_interval(1);
    let mut window = Window::create(config, HeadlessDesktopBackend::headless(), Box::new(BasicRenderState::new()))?;
    window.set_resize_callback(Box::new(|width, height| {
        surface_info!("twinscan::demo", "Viewport now {}x{}", width, height);
    }));

    run(window, |window: &mut Window<HeadlessDesktopBackend>, frame| {
        let event = match frame {
            30 => WindowEvent::Resized(PhysicalSize::new(1024, 768)),
            90 => WindowEvent::CloseRequested,
            _ => return,
        };
        forward_window_event(window.backend_mut().platform_mut(), &event);
    })
}

fn run_console() -> Result<()> {
    // 1080p needs more than the default MEM1 arena
    let display = EmulatedDisplay::new().with_mem1_size(DEFAULT_MEM1_SIZE * 2);
    let backend: EmulatedConsoleBackend = ConsoleBackend::new(display, ScriptedLifecycle::new());
    let mut window = Window::create(WindowConfig::new(1920, 1080), backend, Box::new(BasicRenderState::new()))?;
    window.add_shutdown_hook(Box::new(|| {
        surface_info!("twinscan::demo", "Audio stopped");
    }));

    run(window, |window: &mut Window<EmulatedConsoleBackend>, frame| {
        let lifecycle = window.backend_mut().lifecycle_mut();
        match frame {
            // Home button: the OS takes the foreground for a few polls
            60 => lifecycle.push(&[ForegroundStatus::ReleaseRequested, ForegroundStatus::ReleaseRequested]),
            120 => lifecycle.push(&[ForegroundStatus::Exiting]),
            _ => {}
        }
    })
}

fn main() {
    let platform = std::env::args().nth(1).unwrap_or_else(|| "desktop".to_string());

    let result = match platform.as_str() {
        "desktop" => run_desktop(),
        "console" => run_console(),
        other => {
            surface_error!("twinscan::demo", "Unknown platform '{}' (expected desktop or console)", other);
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        surface_error!("twinscan::demo", "Startup failed: {}", e);
        std::process::exit(1);
    }
}
