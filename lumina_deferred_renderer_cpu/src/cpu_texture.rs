/// CpuTexture - host-memory implementation of the Texture trait
///
/// Texels are kept as `Vec4` and quantized to the declared format on every
/// write, so UNORM targets saturate and lose precision exactly where a GPU
/// target would. Depth formats store depth in `x`.

use std::any::Any;
use std::sync::{Arc, PoisonError, RwLock};
use glam::Vec4;
use lumina_deferred::lumina::device::{Texture, TextureDesc, TextureFormat, TextureInfo};

pub struct CpuTexture {
    info: TextureInfo,
    texels: RwLock<Vec<Vec4>>,
}

impl CpuTexture {
    /// Allocate a zero-filled texture
    pub fn new(desc: &TextureDesc) -> Self {
        let count = desc.width as usize * desc.height as usize;
        Self {
            info: TextureInfo::from(desc),
            texels: RwLock::new(vec![Vec4::ZERO; count]),
        }
    }

    /// Recover the CPU texture behind a device texture
    pub fn downcast(texture: &Arc<dyn Texture>) -> Option<&CpuTexture> {
        texture.as_any().downcast_ref::<CpuTexture>()
    }

    pub fn width(&self) -> u32 {
        self.info.width
    }

    pub fn height(&self) -> u32 {
        self.info.height
    }

    pub fn format(&self) -> TextureFormat {
        self.info.format
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.info.width && y < self.info.height)
            .then(|| y as usize * self.info.width as usize + x as usize)
    }

    /// Texel at (x, y), `None` outside the texture
    pub fn read_pixel(&self, x: u32, y: u32) -> Option<Vec4> {
        let offset = self.offset(x, y)?;
        let texels = self.texels.read().unwrap_or_else(PoisonError::into_inner);
        texels.get(offset).copied()
    }

    /// Quantize and store `value`; writes outside the texture are dropped
    pub fn write_pixel(&self, x: u32, y: u32, value: Vec4) {
        let Some(offset) = self.offset(x, y) else {
            return;
        };
        let value = quantize(self.info.format, value);
        let mut texels = self.texels.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(texel) = texels.get_mut(offset) {
            *texel = value;
        }
    }

    /// Set every texel to `value`
    pub fn fill(&self, value: Vec4) {
        let value = quantize(self.info.format, value);
        let mut texels = self.texels.write().unwrap_or_else(PoisonError::into_inner);
        texels.iter_mut().for_each(|texel| *texel = value);
    }

    /// Copy of every texel, row-major
    pub fn pixels(&self) -> Vec<Vec4> {
        self.texels.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Texture for CpuTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn unorm(value: f32, max: f32) -> f32 {
    // NaN saturates to zero like a GPU conversion
    let value = if value.is_nan() { 0.0 } else { value };
    (value.clamp(0.0, 1.0) * max).round() / max
}

/// Value a texel of `format` actually holds after storing `value`
pub fn quantize(format: TextureFormat, value: Vec4) -> Vec4 {
    match format {
        TextureFormat::R8G8B8A8_UNORM | TextureFormat::B8G8R8A8_UNORM => {
            Vec4::from_array(value.to_array().map(|c| unorm(c, 255.0)))
        }
        TextureFormat::A2B10G10R10_UNORM => Vec4::new(
            unorm(value.x, 1023.0),
            unorm(value.y, 1023.0),
            unorm(value.z, 1023.0),
            unorm(value.w, 3.0),
        ),
        // Half floats are kept at f32 precision
        TextureFormat::R16G16B16A16_SFLOAT | TextureFormat::R32G32B32A32_SFLOAT => value,
        TextureFormat::D16_UNORM => Vec4::new(unorm(value.x, 65535.0), 0.0, 0.0, 0.0),
        TextureFormat::D32_FLOAT => Vec4::new(value.x, 0.0, 0.0, 0.0),
    }
}

#[cfg(test)]
#[path = "cpu_texture_tests.rs"]
mod tests;
