/// Clear requests issued against the current render target set

use bitflags::bitflags;
use glam::Vec4;

use crate::surface::{DEFAULT_CLEAR_DEPTH, DEFAULT_CLEAR_STENCIL};

bitflags! {
    /// Buffers touched by one clear
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        const COLOR = 0b001;
        const DEPTH = 0b010;
        const STENCIL = 0b100;
        const DEPTH_STENCIL = Self::DEPTH.bits() | Self::STENCIL.bits();
    }
}

/// One clear of the current surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearRequest {
    pub flags: ClearFlags,
    pub color: Vec4,
    pub depth: f32,
    pub stencil: u8,
}

impl ClearRequest {
    pub fn color(color: Vec4) -> Self {
        Self {
            flags: ClearFlags::COLOR,
            color,
            depth: DEFAULT_CLEAR_DEPTH,
            stencil: DEFAULT_CLEAR_STENCIL,
        }
    }

    pub fn depth(depth: f32) -> Self {
        Self {
            flags: ClearFlags::DEPTH,
            color: Vec4::ZERO,
            depth,
            stencil: DEFAULT_CLEAR_STENCIL,
        }
    }

    pub fn stencil(stencil: u8) -> Self {
        Self {
            flags: ClearFlags::STENCIL,
            color: Vec4::ZERO,
            depth: DEFAULT_CLEAR_DEPTH,
            stencil,
        }
    }

    pub fn depth_stencil(depth: f32, stencil: u8) -> Self {
        Self {
            flags: ClearFlags::DEPTH_STENCIL,
            color: Vec4::ZERO,
            depth,
            stencil,
        }
    }

    pub fn clears_color(&self) -> bool {
        self.flags.contains(ClearFlags::COLOR)
    }

    pub fn clears_depth(&self) -> bool {
        self.flags.contains(ClearFlags::DEPTH)
    }

    pub fn clears_stencil(&self) -> bool {
        self.flags.contains(ClearFlags::STENCIL)
    }
}

/// What a backend clear did to the active render target binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearEffect {
    /// The bound targets are still bound
    BindingPreserved,
    /// The native clear dropped the binding; the caller must rebind
    BindingInvalidated,
}
