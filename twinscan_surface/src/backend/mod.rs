/// Backend module - platform capability interface and collaborators

pub mod render_surface_backend;
pub mod allocator;
pub mod clear;
pub mod collaborators;
pub mod mock_backend;

pub use render_surface_backend::*;
pub use allocator::{acquire, release, SurfaceAllocator};
pub use clear::*;
pub use collaborators::*;

#[cfg(test)]
pub use mock_backend::MockBackend;
