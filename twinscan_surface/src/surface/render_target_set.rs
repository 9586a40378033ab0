/// Render target set - the color + depth buffers of one surface
///
/// A set owns one color buffer, a sampling view over the same memory, one
/// depth-stencil buffer, and a separately allocated depth texture that
/// mirrors the depth buffer in a linear, sampleable layout. The depth
/// texture is only refreshed by the depth resolver.

use super::format::{
    AllocatedBuffer, BufferLayout, ComponentSwizzle, NativeHandle, PixelFormat, SurfaceDesc,
    SurfaceUsage, TileMode,
};
use super::surface_id::Surface;

/// Default depth clear value
pub const DEFAULT_CLEAR_DEPTH: f32 = 1.0;

/// Default stencil clear value
pub const DEFAULT_CLEAR_STENCIL: u8 = 0;

/// Color render target
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColorBuffer {
    pub buffer: AllocatedBuffer,
}

/// Read view over the color buffer memory
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColorTexture {
    pub buffer: AllocatedBuffer,
    pub swizzle: ComponentSwizzle,
    pub mip_count: u32,
    pub slice_count: u32,
}

/// Depth-stencil render target
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DepthBuffer {
    pub buffer: AllocatedBuffer,
    pub clear_depth: f32,
    pub clear_stencil: u8,
}

/// Linear, sampleable mirror of the depth buffer
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DepthTexture {
    pub buffer: AllocatedBuffer,
    pub swizzle: ComponentSwizzle,
    /// Number of resolves performed into this texture since allocation
    pub resolve_count: u64,
}

/// Surface descriptors a backend must size and allocate for one set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetSetDesc {
    pub surface: Surface,
    pub color: SurfaceDesc,
    pub depth: SurfaceDesc,
    pub depth_texture: SurfaceDesc,
}

/// Color + depth buffers (and the depth-as-texture mirror) of one surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTargetSet {
    pub surface: Surface,
    pub color_buffer: ColorBuffer,
    pub color_texture: ColorTexture,
    pub depth_buffer: DepthBuffer,
    pub depth_texture: DepthTexture,
}

impl RenderTargetSet {
    /// Derive the descriptors of every buffer of a set
    pub fn describe(surface: Surface, width: u32, height: u32) -> RenderTargetSetDesc {
        let base = SurfaceDesc {
            width,
            height,
            format: PixelFormat::R8G8B8A8_UNORM,
            usage: SurfaceUsage::ColorBuffer,
            tile_mode: TileMode::Default,
            mip_levels: 1,
        };

        RenderTargetSetDesc {
            surface,
            color: base,
            depth: SurfaceDesc {
                format: PixelFormat::D24_UNORM_S8_UINT,
                usage: SurfaceUsage::DepthBuffer,
                ..base
            },
            depth_texture: SurfaceDesc {
                format: PixelFormat::R32_SFLOAT,
                usage: SurfaceUsage::Texture,
                ..base
            },
        }
    }

    /// Assemble a set from allocated buffers
    ///
    /// The color texture is derived from the color buffer: same memory,
    /// sampling usage, identity swizzle, one mip and one slice.
    pub fn assemble(
        surface: Surface,
        color: AllocatedBuffer,
        depth: AllocatedBuffer,
        depth_texture: AllocatedBuffer,
    ) -> Self {
        Self {
            surface,
            color_buffer: ColorBuffer { buffer: color },
            color_texture: Self::color_view(color),
            depth_buffer: DepthBuffer {
                buffer: depth,
                clear_depth: DEFAULT_CLEAR_DEPTH,
                clear_stencil: DEFAULT_CLEAR_STENCIL,
            },
            depth_texture: DepthTexture {
                buffer: depth_texture,
                swizzle: ComponentSwizzle::DEPTH_RED,
                resolve_count: 0,
            },
        }
    }

    /// A zeroed set for `surface` (no backing memory)
    pub fn released(surface: Surface) -> Self {
        Self {
            surface,
            color_buffer: ColorBuffer::default(),
            color_texture: ColorTexture::default(),
            depth_buffer: DepthBuffer::default(),
            depth_texture: DepthTexture::default(),
        }
    }

    fn color_view(color: AllocatedBuffer) -> ColorTexture {
        let mut view = color;
        view.layout.desc.usage = SurfaceUsage::Texture;
        ColorTexture {
            buffer: view,
            swizzle: ComponentSwizzle::IDENTITY,
            mip_count: 1,
            slice_count: 1,
        }
    }

    /// Replace the storage layouts in place, keeping every memory handle
    ///
    /// Used by backends that re-specify storage of existing objects on
    /// resize instead of reallocating them.
    pub fn respecify(&mut self, color: BufferLayout, depth: BufferLayout, depth_texture: BufferLayout) {
        self.color_buffer.buffer.layout = color;
        self.color_texture = Self::color_view(self.color_buffer.buffer);
        self.depth_buffer.buffer.layout = depth;
        self.depth_texture.buffer.layout = depth_texture;
        self.depth_texture.resolve_count = 0;
    }

    /// Zero the structure, dropping every memory handle
    pub fn release(&mut self) {
        *self = Self::released(self.surface);
    }

    /// Whether the set has no backing memory
    pub fn is_released(&self) -> bool {
        self.color_buffer.buffer.memory.is_null()
            && self.depth_buffer.buffer.memory.is_null()
            && self.depth_texture.buffer.memory.is_null()
    }

    pub fn width(&self) -> u32 {
        self.color_buffer.buffer.layout.width()
    }

    pub fn height(&self) -> u32 {
        self.color_buffer.buffer.layout.height()
    }

    /// Sum of the byte sizes of every separately allocated buffer
    pub fn total_byte_size(&self) -> u64 {
        self.color_buffer.buffer.layout.byte_size
            + self.depth_buffer.buffer.layout.byte_size
            + self.depth_texture.buffer.layout.byte_size
    }
}

#[cfg(test)]
#[path = "render_target_set_tests.rs"]
mod tests;
