/// Tests for FrameHeap

use super::*;

fn heap(size: u64) -> FrameHeap {
    FrameHeap::new(HeapRegion { base: 0x1000_0000, size })
}

#[test]
fn test_alloc_respects_alignment() {
    let mut heap = heap(0x10000);

    let a = heap.alloc(10, 4).unwrap();
    let b = heap.alloc(16, 0x1000).unwrap();

    assert_eq!(a, NativeHandle(0x1000_0000));
    assert_eq!(b.0 % 0x1000, 0);
    assert!(b.0 >= a.0 + 10);
    assert_eq!(heap.allocation_count(), 2);
}

#[test]
fn test_alloc_fails_when_exhausted() {
    let mut heap = heap(0x1000);

    assert!(heap.alloc(0x800, 0x100).is_some());
    assert!(heap.alloc(0x801, 0x100).is_none());
    assert!(heap.alloc(0x800, 0x100).is_some());
    assert_eq!(heap.available(), 0);
}

#[test]
fn test_alignment_padding_counts_against_capacity() {
    let mut heap = heap(0x2000);

    heap.alloc(1, 1).unwrap();
    // Next 0x1000-aligned address leaves exactly 0x1000 bytes
    assert!(heap.alloc(0x1001, 0x1000).is_none());
    assert!(heap.alloc(0x1000, 0x1000).is_some());
}

#[test]
fn test_free_all_resets() {
    let mut heap = heap(0x1000);
    let first = heap.alloc(0x400, 0x40).unwrap();
    heap.alloc(0x400, 0x40).unwrap();

    heap.free_all();

    assert_eq!(heap.used(), 0);
    assert_eq!(heap.allocation_count(), 0);
    assert_eq!(heap.alloc(0x400, 0x40), Some(first));
}
