/// Texture trait, texture format, usage flags, and texture info

use bitflags::bitflags;

/// Pixel format of a texture or surface image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(non_camel_case_types)]
pub enum Format {
    /// No format. In a `SurfaceConfig`, resolves to the surface's preferred format.
    #[default]
    Undefined,
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    B8G8R8A8_UNORM,
    B8G8R8A8_SRGB,
    A2B10G10R10_UNORM,
    R16G16B16A16_SFLOAT,
}

impl Format {
    /// Returns true for formats with an sRGB transfer function
    pub fn is_srgb(self) -> bool {
        matches!(self, Format::R8G8B8A8_SRGB | Format::B8G8R8A8_SRGB)
    }
}

bitflags! {
    /// Texture usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextureUsage: u32 {
        /// Texture can be sampled in shaders
        const SHADER_RESOURCE = 1 << 0;
        /// Texture can be written as a storage image
        const UNORDERED_ACCESS = 1 << 1;
        /// Texture can be used as a color render target
        const RENDER_TARGET = 1 << 2;
        /// Texture can be the source of a copy/blit
        const COPY_SOURCE = 1 << 3;
        /// Texture can be the destination of a copy/blit
        const COPY_DESTINATION = 1 << 4;
        /// Texture can be handed to the presentation engine
        const PRESENT = 1 << 5;
    }
}

impl TextureUsage {
    /// No usage. In a `SurfaceConfig`, resolves to `RENDER_TARGET | PRESENT`.
    pub const NONE: Self = Self::empty();
}

// ===== TEXTURE INFO =====

/// Read-only properties of a created texture.
///
/// Returned by `Texture::info()` to query texture properties
/// without exposing backend-specific details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: Format,
    /// Usage flags
    pub usage: TextureUsage,
    /// Number of array layers (always 1 for surface images)
    pub array_layers: u32,
}

// ===== TEXTURE TRAIT =====

/// Texture resource trait
///
/// Implemented by backend-specific texture types (e.g., the Vulkan swapchain
/// image wrapper). Surface images are owned by the presentation subsystem.
pub trait Texture: Send + Sync {
    /// Get the read-only properties of this texture
    fn info(&self) -> &TextureInfo;
}
