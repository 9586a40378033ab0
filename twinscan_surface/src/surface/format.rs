/// Surface formats, layouts and opaque native handles

/// Pixel formats used by window render targets
///
/// Color is fixed to 8-bit RGBA and depth-stencil to 24-8; the depth
/// texture mirror is a single 32-bit float channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(non_camel_case_types)]
pub enum PixelFormat {
    #[default]
    R8G8B8A8_UNORM,
    D24_UNORM_S8_UINT,
    R32_SFLOAT,
}

impl PixelFormat {
    /// Bytes per pixel in linear layout
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelFormat::R8G8B8A8_UNORM => 4,
            PixelFormat::D24_UNORM_S8_UINT => 4,
            PixelFormat::R32_SFLOAT => 4,
        }
    }

    pub fn is_depth(self) -> bool {
        matches!(self, PixelFormat::D24_UNORM_S8_UINT)
    }
}

/// How a surface is going to be used by the GPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceUsage {
    /// Color render target that is also sampleable
    #[default]
    ColorBuffer,
    /// Depth-stencil render target
    DepthBuffer,
    /// Sampled texture only
    Texture,
}

/// Memory tiling of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileMode {
    /// Hardware-preferred tiling (opaque to the CPU)
    #[default]
    Default,
    /// Row-major linear layout
    Linear,
}

/// Source of one output component of a texture view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    R,
    G,
    B,
    A,
    Zero,
    One,
}

/// Component mapping of a texture view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentSwizzle(pub [Component; 4]);

impl ComponentSwizzle {
    /// (R, G, B, A)
    pub const IDENTITY: Self = Self([Component::R, Component::G, Component::B, Component::A]);

    /// (R, 0, 0, 1): single-channel depth exposed through the red channel
    pub const DEPTH_RED: Self = Self([Component::R, Component::Zero, Component::Zero, Component::One]);
}

impl Default for ComponentSwizzle {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Opaque native handle of GPU-visible memory or a GPU object
///
/// On the console backend this is an address inside a frame heap; on the
/// desktop backend it is a GL object name. Zero is the null sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NativeHandle(pub u64);

impl NativeHandle {
    pub const NULL: Self = Self(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Requested shape of a surface, before the platform size query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub usage: SurfaceUsage,
    pub tile_mode: TileMode,
    /// Always 1 for window surfaces
    pub mip_levels: u32,
}

/// Surface shape plus the size and alignment reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferLayout {
    pub desc: SurfaceDesc,
    /// Row pitch in pixels (after tiling padding)
    pub pitch: u32,
    /// Total byte size of the backing memory
    pub byte_size: u64,
    /// Required alignment of the backing memory
    pub alignment: u32,
}

impl BufferLayout {
    pub fn width(&self) -> u32 {
        self.desc.width
    }

    pub fn height(&self) -> u32 {
        self.desc.height
    }
}

/// A buffer layout bound to its backing memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllocatedBuffer {
    pub layout: BufferLayout,
    pub memory: NativeHandle,
}
