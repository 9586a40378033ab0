/// Tests for the acquire/release front-end
///
/// These tests validate request validation, dimension reporting and
/// release idempotence against the mock backend.

use super::*;
use crate::backend::MockBackend;
use crate::surface::Surface;

// ============================================================================
// Tests: acquire
// ============================================================================

#[test]
fn test_acquire_returns_one_set_per_surface() {
    let mut backend = MockBackend::dual();
    let targets = acquire(&mut backend, 640, 480).unwrap();

    assert_eq!(targets.len(), 2);
    assert!(targets.get(Surface::Primary).is_some());
    assert!(targets.get(Surface::Secondary).is_some());
    assert_eq!((targets.width(), targets.height()), (640, 480));
    assert_eq!(targets.current(), Surface::Primary);
}

#[test]
fn test_acquire_rejects_non_positive_dimensions() {
    for (w, h) in [(0, 100), (100, 0), (-1, 100), (100, -20), (0, 0), (i32::MIN, 1)] {
        let mut backend = MockBackend::new();
        let result = acquire(&mut backend, w, h);

        assert_eq!(
            result.unwrap_err(),
            Error::InvalidDimensions { width: w as i64, height: h as i64 }
        );
        assert_eq!(backend.allocate_calls, 0);
        assert_eq!(backend.live_buffers, 0);
    }
}

#[test]
fn test_acquire_propagates_allocation_error() {
    let mut backend = MockBackend::new();
    backend.allocations_before_failure = Some(0);

    let result = acquire(&mut backend, 64, 64);

    assert!(matches!(result, Err(Error::AllocationError(_))));
    assert_eq!(backend.live_buffers, 0);
}

// ============================================================================
// Tests: release
// ============================================================================

#[test]
fn test_release_frees_everything() {
    let mut backend = MockBackend::dual();
    let mut targets = acquire(&mut backend, 64, 64).unwrap();
    assert_eq!(backend.live_buffers, 6);

    release(&mut backend, &mut targets);

    assert_eq!(backend.live_buffers, 0);
    assert!(targets.is_released());
    assert_eq!(targets.len(), 2);
}

#[test]
fn test_release_twice_has_no_further_effect() {
    let mut backend = MockBackend::dual();
    let mut targets = acquire(&mut backend, 64, 64).unwrap();

    release(&mut backend, &mut targets);
    let commands = backend.commands.len();
    let snapshot = targets.clone();

    release(&mut backend, &mut targets);

    assert_eq!(backend.commands.len(), commands);
    assert_eq!(targets, snapshot);
    assert_eq!(backend.live_buffers, 0);
}

#[test]
fn test_release_empty_targets_is_noop() {
    let mut backend = MockBackend::new();
    let mut targets = crate::surface::RenderTargets::empty();

    release(&mut backend, &mut targets);

    assert!(backend.commands.is_empty());
}
