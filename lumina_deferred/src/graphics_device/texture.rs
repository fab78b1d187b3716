/// Texture trait, texture descriptor, and texture info

use std::any::Any;

/// Texture format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    R8G8B8A8_UNORM,
    B8G8R8A8_UNORM,
    /// 10 bits per color channel, 2-bit alpha
    A2B10G10R10_UNORM,
    R16G16B16A16_SFLOAT,
    R32G32B32A32_SFLOAT,
    D16_UNORM,
    D32_FLOAT,
}

impl TextureFormat {
    /// Depth formats can only back depth attachments
    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::D16_UNORM | TextureFormat::D32_FLOAT)
    }

    /// Float color formats store values outside [0, 1]
    pub fn is_float(&self) -> bool {
        matches!(
            self,
            TextureFormat::R16G16B16A16_SFLOAT | TextureFormat::R32G32B32A32_SFLOAT
        )
    }

    /// Size of one texel in bytes
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::R8G8B8A8_UNORM
            | TextureFormat::B8G8R8A8_UNORM
            | TextureFormat::A2B10G10R10_UNORM
            | TextureFormat::D32_FLOAT => 4,
            TextureFormat::D16_UNORM => 2,
            TextureFormat::R16G16B16A16_SFLOAT => 8,
            TextureFormat::R32G32B32A32_SFLOAT => 16,
        }
    }
}

bitflags::bitflags! {
    /// Texture usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Readable by a later pass (subpass input)
        const INPUT_ATTACHMENT = 1 << 0;
        /// Writable as a color attachment
        const COLOR_ATTACHMENT = 1 << 1;
        /// Writable as a depth attachment
        const DEPTH_ATTACHMENT = 1 << 2;
        /// Readable by the host (presentation, readback)
        const TRANSFER_SRC = 1 << 3;
    }
}

// ===== TEXTURE DESC =====

/// Descriptor for creating a texture
#[derive(Debug, Clone)]
pub struct TextureDesc {
    /// Debug name
    pub name: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub usage: TextureUsage,
}

// ===== TEXTURE INFO =====

/// Read-only properties of a created texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
}

impl From<&TextureDesc> for TextureInfo {
    fn from(desc: &TextureDesc) -> Self {
        Self {
            name: desc.name.clone(),
            width: desc.width,
            height: desc.height,
            format: desc.format,
            usage: desc.usage,
        }
    }
}

// ===== TEXTURE TRAIT =====

/// Texture resource trait
///
/// Implemented by backend-specific texture types. Backends recover their
/// concrete type through `as_any`.
pub trait Texture: Send + Sync + Any {
    /// Get the read-only properties of this texture
    fn info(&self) -> &TextureInfo;

    /// Downcast support for backends
    fn as_any(&self) -> &dyn Any;
}
