/// ParameterBlock - per-draw push-constant payload
///
/// Lifetime is a single draw. Layout is fixed: two vec4, 32 bytes.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use crate::dispatch::LightDescriptor;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct ParameterBlock {
    /// rgb color, intensity in w
    pub color: [f32; 4],
    /// xyz light direction or surface normal; w carries surface depth
    pub direction: [f32; 4],
}

impl ParameterBlock {
    /// Size in bytes of the push-constant range
    pub const SIZE: u32 = std::mem::size_of::<ParameterBlock>() as u32;

    pub fn new(color: Vec3, intensity: f32, direction: Option<Vec3>) -> Self {
        Self {
            color: color.extend(intensity).to_array(),
            direction: direction.unwrap_or(Vec3::ZERO).extend(0.0).to_array(),
        }
    }

    /// Block describing a flat surface for geometry draws
    pub fn surface(albedo: Vec3, normal: Vec3, depth: f32) -> Self {
        Self {
            color: albedo.extend(1.0).to_array(),
            direction: normal.extend(depth).to_array(),
        }
    }

    /// Surface depth carried by `surface` blocks
    pub fn depth(&self) -> f32 {
        self.direction[3]
    }

    /// Block carrying a light's color, intensity (default 1) and direction
    pub fn from_light(light: &LightDescriptor) -> Self {
        Self::new(light.color, light.intensity(), light.direction)
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Read a block back from push-constant bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        bytemuck::try_pod_read_unaligned(bytes.get(..Self::SIZE as usize)?).ok()
    }

    pub fn color(&self) -> Vec4 {
        Vec4::from_array(self.color)
    }

    pub fn rgb(&self) -> Vec3 {
        self.color().truncate()
    }

    pub fn intensity(&self) -> f32 {
        self.color[3]
    }

    pub fn direction(&self) -> Vec3 {
        Vec4::from_array(self.direction).truncate()
    }
}
