/// Depth module - depth-as-texture resolve

mod depth_resolver;

pub use depth_resolver::DepthResolver;
