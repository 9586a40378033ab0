/// Tests for ConsoleBackend
///
/// Drive the backend directly over the software display: heap usage,
/// cache publication, scan buffer registration and context handling.

use super::*;
use crate::console_display::TvRenderMode;
use crate::console_emulated_display::DEFAULT_MEM1_SIZE;
use glam::Vec4;

fn opened() -> EmulatedConsoleBackend {
    let mut backend = ConsoleBackend::emulated();
    backend.open_device(&WindowConfig::default()).unwrap();
    backend
}

// ============================================================================
// Tests: device / context
// ============================================================================

#[test]
fn test_open_device_initializes_with_command_buffer() {
    let backend = opened();

    let (buffer, size) = backend.display().command_buffer().unwrap();
    assert!(!buffer.is_null());
    assert_eq!(size, 0x40_0000);
    assert_eq!(buffer.0 % COMMAND_BUFFER_ALIGNMENT as u64, 0);
}

#[test]
fn test_open_device_fails_without_default_heap() {
    let display = EmulatedDisplay::new().with_default_heap_limit(0);
    let mut backend = ConsoleBackend::new(display, ScriptedLifecycle::new());

    let result = backend.open_device(&WindowConfig::default());

    assert!(matches!(result, Err(Error::AllocationError(_))));
}

#[test]
fn test_create_context_once() {
    let mut backend = opened();

    backend.create_context().unwrap();
    let state = backend.context_state();
    backend.create_context().unwrap();

    assert_eq!(backend.context_state(), state);
    assert!(backend.lifecycle().initialized);
    assert!(backend.is_running());
    assert_eq!(backend.display().default_heap_live(), 2);
}

#[test]
fn test_close_device_frees_default_heap() {
    let mut backend = opened();
    backend.create_context().unwrap();

    backend.close_device();

    assert!(!backend.is_running());
    assert_eq!(backend.display().default_heap_live(), 0);
    assert_eq!(backend.context_state(), None);
}

// ============================================================================
// Tests: allocation
// ============================================================================

#[test]
fn test_allocate_targets_both_surfaces() {
    let mut backend = opened();

    let sets = backend.allocate_targets(1280, 720).unwrap();

    assert_eq!(sets.len(), 2);
    assert_eq!(sets[0].surface, Surface::Primary);
    assert_eq!(sets[1].surface, Surface::Secondary);
    for set in &sets {
        assert_eq!((set.width(), set.height()), (1280, 720));
        assert!(!set.is_released());
    }
    assert_eq!(backend.tv_mode().unwrap().render_mode, TvRenderMode::Wide720p);
}

#[test]
fn test_allocate_targets_registers_scan_buffers() {
    let mut backend = opened();

    backend.allocate_targets(1280, 720).unwrap();

    let tv = backend.display().tv();
    assert_eq!(tv.scale, (1280, 720));
    assert_eq!(tv.render_mode, Some(TvRenderMode::Wide720p));
    assert!(tv.enabled);
    let drc = backend.display().drc();
    assert_eq!(drc.scale, (DRC_WIDTH, DRC_HEIGHT));
    assert!(drc.enabled);

    let scan = backend.tv_scan_buffer().unwrap();
    assert_eq!(scan.memory.0 % SCAN_BUFFER_ALIGNMENT as u64, 0);
}

#[test]
fn test_every_buffer_published_before_use() {
    let mut backend = opened();
    backend.create_context().unwrap();

    let sets = backend.allocate_targets(854, 480).unwrap();
    for set in &sets {
        backend.bind(set);
    }

    assert_eq!(backend.display().unpublished_uses(), 0);
    let invalidations = backend.display().invalidations();
    for set in &sets {
        assert!(invalidations.contains(&(InvalidateMode::CpuTexture, set.color_buffer.buffer.memory)));
        assert!(invalidations.contains(&(InvalidateMode::Cpu, set.depth_buffer.buffer.memory)));
        assert!(invalidations.contains(&(InvalidateMode::CpuTexture, set.depth_texture.buffer.memory)));
    }
}

#[test]
fn test_render_targets_live_in_mem1() {
    let mut backend = opened();

    let sets = backend.allocate_targets(640, 480).unwrap();

    let (mem1_used, fg_used) = backend.heap_usage().unwrap();
    let total: u64 = sets.iter().map(|s| s.total_byte_size()).sum();
    assert!(mem1_used >= total);
    assert!(fg_used >= backend.display().calc_drc_size());
    for set in &sets {
        assert!(set.color_buffer.buffer.memory.0 >= 0xF400_0000);
    }
}

#[test]
fn test_allocation_failure_frees_partial_heaps() {
    // 1080p needs more than 32 MiB of render targets
    let mut backend = opened();

    let result = backend.allocate_targets(1920, 1080);

    assert!(matches!(result, Err(Error::AllocationError(_))));
    assert_eq!(backend.heap_usage(), None);
    assert_eq!(backend.tv_mode(), None);
}

#[test]
fn test_1080p_fits_larger_mem1() {
    let display = EmulatedDisplay::new().with_mem1_size(DEFAULT_MEM1_SIZE * 2);
    let mut backend = ConsoleBackend::new(display, ScriptedLifecycle::new());
    backend.open_device(&WindowConfig::default()).unwrap();

    let sets = backend.allocate_targets(1920, 1080).unwrap();

    assert_eq!((sets[0].width(), sets[0].height()), (1920, 1080));
}

#[test]
fn test_withheld_heaps_fail_allocation() {
    let mut backend = opened();
    backend.display_mut().set_heaps_granted(false);

    let result = backend.allocate_targets(1280, 720);

    assert!(matches!(result, Err(Error::AllocationError(_))));
}

#[test]
fn test_release_targets_frees_everything() {
    let mut backend = opened();
    let mut sets = backend.allocate_targets(1280, 720).unwrap();

    backend.release_targets(&mut sets);

    assert!(sets.iter().all(|s| s.is_released()));
    assert_eq!(backend.heap_usage(), None);
    assert_eq!(backend.tv_scan_buffer(), None);
    assert_eq!(backend.drc_scan_buffer(), None);
}

#[test]
fn test_reallocation_reuses_same_addresses() {
    let mut backend = opened();
    let mut first = backend.allocate_targets(1280, 720).unwrap();
    let first_color = first[0].color_buffer.buffer.memory;
    backend.release_targets(&mut first);

    let second = backend.allocate_targets(1280, 720).unwrap();

    assert_eq!(second[0].color_buffer.buffer.memory, first_color);
}

// ============================================================================
// Tests: clears / presentation
// ============================================================================

#[test]
fn test_clear_invalidates_binding() {
    let mut backend = opened();
    backend.create_context().unwrap();
    let mut sets = backend.allocate_targets(640, 480).unwrap();
    backend.bind(&sets[0]);

    let effect = backend.clear(&mut sets[0], &ClearRequest::color(Vec4::new(0.0, 1.0, 0.0, 1.0)));

    assert_eq!(effect, ClearEffect::BindingInvalidated);
    assert_eq!(backend.display().bound_color(), None);
    assert_eq!(
        backend.display().color_content(sets[0].color_buffer.buffer.memory),
        Some(Vec4::new(0.0, 1.0, 0.0, 1.0))
    );
}

#[test]
fn test_stencil_clear_keeps_depth() {
    let mut backend = opened();
    let mut sets = backend.allocate_targets(640, 480).unwrap();

    backend.clear(&mut sets[0], &ClearRequest::depth(0.25));
    backend.clear(&mut sets[0], &ClearRequest::stencil(7));

    assert_eq!(
        backend.display().depth_content(sets[0].depth_buffer.buffer.memory),
        Some((0.25, 7))
    );
}

#[test]
fn test_copy_to_scan_out_routes_surfaces() {
    let mut backend = opened();
    let mut sets = backend.allocate_targets(640, 480).unwrap();
    backend.clear(&mut sets[0], &ClearRequest::color(Vec4::X));
    backend.clear(&mut sets[1], &ClearRequest::color(Vec4::Y));

    backend.copy_to_scan_out(&sets);
    backend.flip();

    assert_eq!(backend.display().tv().front, Some(Vec4::X));
    assert_eq!(backend.display().drc().front, Some(Vec4::Y));
}

#[test]
fn test_depth_resolve_cache_sequence() {
    let mut backend = opened();
    let mut sets = backend.allocate_targets(640, 480).unwrap();
    backend.clear(&mut sets[0], &ClearRequest::depth(0.5));

    backend.invalidate_depth_cache(&sets[0]);
    backend.convert_depth_to_texture(&mut sets[0]).unwrap();
    backend.invalidate_depth_texture_cache(&sets[0]);

    let tail: Vec<InvalidateMode> = backend
        .display()
        .invalidations()
        .iter()
        .rev()
        .take(2)
        .map(|(mode, _)| *mode)
        .collect();
    assert_eq!(tail, vec![InvalidateMode::Texture, InvalidateMode::DepthBuffer]);
    assert_eq!(
        backend.display().depth_texture_content(sets[0].depth_texture.buffer.memory),
        Some(0.5)
    );
}

#[test]
fn test_swap_interval_round_trip() {
    let mut backend = opened();

    backend.set_swap_interval(2);

    assert_eq!(backend.swap_interval(), 2);
}

#[test]
fn test_lifecycle_forwarding() {
    let lifecycle = ScriptedLifecycle::with_script(&[ForegroundStatus::ReleaseRequested]);
    let mut backend = ConsoleBackend::new(EmulatedDisplay::new(), lifecycle);

    assert_eq!(backend.poll_foreground(), ForegroundStatus::ReleaseRequested);
    backend.acknowledge_release();
    assert_eq!(backend.poll_foreground(), ForegroundStatus::InForeground);
    backend.block_threads_on_exit();

    let lifecycle = backend.lifecycle();
    assert_eq!(lifecycle.polls, 2);
    assert_eq!(lifecycle.draw_done_releases, 1);
    assert_eq!(lifecycle.shutdowns, 1);
    assert_eq!(lifecycle.exit_blocks, 1);
}
