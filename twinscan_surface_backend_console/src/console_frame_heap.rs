/// Frame heap - bump allocator over a base heap region
///
/// Allocations are never freed individually: the whole heap is reset in
/// one operation when the foreground session ends.

use twinscan_surface::twinscan::surface::NativeHandle;

use crate::console_display::HeapRegion;

#[derive(Debug, Clone)]
pub struct FrameHeap {
    region: HeapRegion,
    /// Offset of the first free byte from `region.base`
    head: u64,
    allocations: usize,
}

impl FrameHeap {
    /// Wrap a heap region; its base address must be non-zero
    pub fn new(region: HeapRegion) -> Self {
        Self {
            region,
            head: 0,
            allocations: 0,
        }
    }

    /// Allocate `size` bytes aligned to `alignment` (a power of two)
    ///
    /// Returns None when the remaining space cannot hold the aligned block.
    pub fn alloc(&mut self, size: u64, alignment: u32) -> Option<NativeHandle> {
        let align = (alignment.max(1)) as u64;
        debug_assert!(align.is_power_of_two(), "alignment {} is not a power of two", align);

        let start = self.region.base.checked_add(self.head)?;
        let aligned = start.checked_add(align - 1)? & !(align - 1);
        let end = aligned.checked_add(size)?;
        if end > self.region.base + self.region.size {
            return None;
        }

        self.head = end - self.region.base;
        self.allocations += 1;
        Some(NativeHandle(aligned))
    }

    /// Release every allocation at once
    pub fn free_all(&mut self) {
        self.head = 0;
        self.allocations = 0;
    }

    pub fn region(&self) -> HeapRegion {
        self.region
    }

    pub fn used(&self) -> u64 {
        self.head
    }

    pub fn available(&self) -> u64 {
        self.region.size - self.head
    }

    pub fn allocation_count(&self) -> usize {
        self.allocations
    }
}

#[cfg(test)]
#[path = "console_frame_heap_tests.rs"]
mod tests;
