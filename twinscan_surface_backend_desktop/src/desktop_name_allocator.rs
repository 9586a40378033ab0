use crate::desktop_gl_device::GlName;

/// Allocates and recycles GL object names.
///
/// Names start at 1; 0 is reserved for "no object" / the default
/// framebuffer. Deleted names are handed out again by later allocations.
///
/// # Example
///
/// ```ignore
/// let mut names = NameAllocator::new();
/// let a = names.alloc();  // 1
/// let b = names.alloc();  // 2
/// names.free(a);          // 1 is now available
/// let c = names.alloc();  // 1 (recycled)
/// ```
pub struct NameAllocator {
    free_list: Vec<GlName>,
    next_name: GlName,
    live: u32,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self {
            free_list: Vec::new(),
            next_name: 1,
            live: 0,
        }
    }

    /// Allocate the next available name
    pub fn alloc(&mut self) -> GlName {
        self.live += 1;
        self.free_list.pop().unwrap_or_else(|| {
            let name = self.next_name;
            self.next_name += 1;
            name
        })
    }

    /// Return a name to the pool; 0 and unknown names are ignored
    pub fn free(&mut self, name: GlName) -> bool {
        if name == 0 || name >= self.next_name || self.free_list.contains(&name) {
            return false;
        }
        self.live -= 1;
        self.free_list.push(name);
        true
    }

    /// Number of names currently in use
    pub fn live(&self) -> u32 {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

impl Default for NameAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "desktop_name_allocator_tests.rs"]
mod tests;
