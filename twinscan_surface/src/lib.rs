/*!
# Twinscan Surface

Rendering-surface and swap-chain management for a real-time graphics
runtime that presents identical semantics on two very different
presentation platforms.

This crate is platform-agnostic: it owns the surface lifecycle and the
per-frame presentation protocol, and talks to the platform through the
`RenderSurfaceBackend` capability interface. Backend implementations
(console display controller, desktop GL) live in their own crates.

## Architecture

- **RenderTargetSet**: color + depth buffers and the depth-as-texture mirror of one surface
- **SurfaceAllocator**: platform allocation/release of render target memory
- **PresentationStateMachine**: foreground lifecycle (acquire, release, resume, terminate)
- **SwapChainController**: end-of-frame presentation protocol
- **DepthResolver**: on-demand depth buffer to texture conversion
- **Window**: explicitly owned session object tying everything together
*/

// Internal modules
mod error;
mod config;
mod window;
pub mod log;
pub mod surface;
pub mod backend;
pub mod presentation;
pub mod swap;
pub mod depth;

// Main twinscan namespace module
pub mod twinscan {
    // Error types
    pub use crate::error::{Error, Result};

    // Configuration
    pub use crate::config::WindowConfig;

    // Session object
    pub use crate::window::{color_texture_handle, ResizeCallback, Window};

    // Backend capability interface
    pub use crate::backend::RenderSurfaceBackend;

    // Logging sub-module (types only, macros are exported at crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, set_logger, reset_logger};
    }

    // Backend sub-module with the platform interface and collaborators
    pub mod backend {
        pub use crate::backend::*;
    }

    // Surface sub-module
    pub mod surface {
        pub use crate::surface::*;
    }

    // Presentation sub-module
    pub mod presentation {
        pub use crate::presentation::*;
        pub use crate::swap::SwapChainController;
        pub use crate::depth::DepthResolver;
    }
}

// Re-export math library at crate root
pub use glam;
