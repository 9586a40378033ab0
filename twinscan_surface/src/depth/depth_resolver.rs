/// DepthResolver - on-demand depth buffer to depth texture conversion
///
/// The depth texture of a set is only refreshed here. Clears and swaps
/// never call into the resolver.

use crate::backend::RenderSurfaceBackend;
use crate::error::Result;
use crate::surface::RenderTargetSet;
use crate::surface_trace;

#[derive(Debug, Default)]
pub struct DepthResolver {
    resolves: u64,
}

impl DepthResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total resolves performed through this resolver
    pub fn resolves(&self) -> u64 {
        self.resolves
    }

    /// Refresh `set.depth_texture` from `set.depth_buffer`
    ///
    /// Invalidates the depth buffer cache window, runs the platform
    /// conversion, then invalidates the depth texture cache window so that
    /// later sampling sees the result.
    pub fn resolve<B: RenderSurfaceBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        set: &mut RenderTargetSet,
    ) -> Result<()> {
        backend.invalidate_depth_cache(set);
        backend.convert_depth_to_texture(set)?;
        backend.invalidate_depth_texture_cache(set);

        set.depth_texture.resolve_count += 1;
        self.resolves += 1;
        surface_trace!("twinscan::DepthResolver", "Depth resolved for {}", set.surface);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{acquire, MockBackend};
    use crate::surface::Surface;

    #[test]
    fn test_resolve_order() {
        let mut backend = MockBackend::dual();
        let mut targets = acquire(&mut backend, 64, 64).unwrap();
        backend.clear_log();
        let mut resolver = DepthResolver::new();

        let set = targets.get_mut(Surface::Secondary).unwrap();
        resolver.resolve(&mut backend, set).unwrap();

        assert_eq!(
            backend.commands,
            vec![
                "invalidate_depth_cache DRC",
                "convert_depth DRC",
                "invalidate_depth_texture_cache DRC",
            ]
        );
        assert_eq!(set.depth_texture.resolve_count, 1);
        assert_eq!(resolver.resolves(), 1);
    }

    #[test]
    fn test_resolve_touches_only_given_set() {
        let mut backend = MockBackend::dual();
        let mut targets = acquire(&mut backend, 64, 64).unwrap();
        let mut resolver = DepthResolver::new();

        resolver.resolve(&mut backend, targets.get_mut(Surface::Primary).unwrap()).unwrap();
        resolver.resolve(&mut backend, targets.get_mut(Surface::Primary).unwrap()).unwrap();

        assert_eq!(targets.get(Surface::Primary).unwrap().depth_texture.resolve_count, 2);
        assert_eq!(targets.get(Surface::Secondary).unwrap().depth_texture.resolve_count, 0);
    }
}
