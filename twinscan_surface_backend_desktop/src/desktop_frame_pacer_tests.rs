/// Tests for FramePacer

use super::*;

#[test]
fn test_unpaced_by_default() {
    let pacer = FramePacer::new(60);
    assert_eq!(pacer.interval(), 0);
    assert_eq!(pacer.frame_budget(), None);
}

#[test]
fn test_budget_scales_with_interval() {
    let mut pacer = FramePacer::new(100);

    pacer.set_interval(1);
    assert_eq!(pacer.frame_budget(), Some(Duration::from_millis(10)));

    pacer.set_interval(3);
    assert_eq!(pacer.frame_budget(), Some(Duration::from_millis(30)));
}

#[test]
fn test_zero_refresh_rate_is_clamped() {
    let pacer = FramePacer::new(0);
    assert_eq!(pacer.refresh_rate(), 1);
}

#[test]
fn test_unpaced_wait_never_sleeps() {
    let mut pacer = FramePacer::new(60);

    for _ in 0..5 {
        pacer.wait();
    }

    assert_eq!(pacer.frames(), 5);
    assert_eq!(pacer.total_wait(), Duration::ZERO);
}

#[test]
fn test_paced_wait_holds_frame_budget() {
    let mut pacer = FramePacer::new(1000);
    pacer.set_interval(5);

    let start = Instant::now();
    pacer.wait();
    pacer.wait();
    pacer.wait();

    // First wait has no previous present to pace against
    assert!(start.elapsed() >= Duration::from_millis(10));
    assert_eq!(pacer.frames(), 3);
}

#[test]
fn test_reset_skips_next_wait() {
    let mut pacer = FramePacer::new(1);
    pacer.set_interval(1);
    pacer.wait();

    pacer.reset();
    let start = Instant::now();
    pacer.wait();

    assert!(start.elapsed() < Duration::from_millis(500));
}
