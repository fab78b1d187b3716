/// Light descriptors consumed by the DrawBatchDispatcher

use glam::Vec3;
use crate::attachment::NormalEncoding;
use crate::error::{Error, Result};
use crate::graphics_device::Rect2D;

/// Light program variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    /// Constant color added everywhere
    Ambient,
    /// Directional light reading the normal attachment as a raw [-1, 1] direction
    Directional,
    /// Directional light decoding `(n + 1) / 2` normals first
    DirectionalDecoded,
    /// Constant color inside a screen-space light volume
    PointColored,
}

impl LightKind {
    pub const ALL: [LightKind; 4] = [
        LightKind::Ambient,
        LightKind::Directional,
        LightKind::DirectionalDecoded,
        LightKind::PointColored,
    ];

    /// Normal convention the variant's program relies on
    pub fn required_encoding(&self) -> Option<NormalEncoding> {
        match self {
            LightKind::Directional => Some(NormalEncoding::Signed),
            LightKind::DirectionalDecoded => Some(NormalEncoding::Unsigned),
            LightKind::Ambient | LightKind::PointColored => None,
        }
    }

    pub fn needs_direction(&self) -> bool {
        matches!(self, LightKind::Directional | LightKind::DirectionalDecoded)
    }

    pub fn name(&self) -> &'static str {
        match self {
            LightKind::Ambient => "ambient",
            LightKind::Directional => "directional",
            LightKind::DirectionalDecoded => "directional_decoded",
            LightKind::PointColored => "point_colored",
        }
    }
}

/// One light instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightDescriptor {
    pub kind: LightKind,
    pub color: Vec3,
    /// Defaults to 1 when absent
    pub intensity: Option<f32>,
    /// Required for directional kinds; points from the light to the surface
    pub direction: Option<Vec3>,
    /// Screen-space light volume; the whole frame when absent
    pub bounds: Option<Rect2D>,
}

impl LightDescriptor {
    pub fn ambient(color: Vec3) -> Self {
        Self { kind: LightKind::Ambient, color, intensity: None, direction: None, bounds: None }
    }

    pub fn directional(color: Vec3, direction: Vec3) -> Self {
        Self {
            kind: LightKind::Directional,
            color,
            intensity: None,
            direction: Some(direction),
            bounds: None,
        }
    }

    pub fn directional_decoded(color: Vec3, direction: Vec3) -> Self {
        Self { kind: LightKind::DirectionalDecoded, ..Self::directional(color, direction) }
    }

    pub fn point_colored(color: Vec3) -> Self {
        Self { kind: LightKind::PointColored, ..Self::ambient(color) }
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = Some(intensity);
        self
    }

    pub fn with_bounds(mut self, bounds: Rect2D) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn intensity(&self) -> f32 {
        self.intensity.unwrap_or(1.0)
    }

    /// Check fields against the kind
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for a missing, zero, or non-finite direction on a
    /// directional kind, or a negative or non-finite color or intensity.
    pub fn validate(&self) -> Result<()> {
        if !self.color.is_finite() || self.color.min_element() < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "{} light color {:?} must be finite and non-negative", self.kind.name(), self.color)));
        }
        let intensity = self.intensity();
        if !intensity.is_finite() || intensity < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "{} light intensity {} must be finite and non-negative", self.kind.name(), intensity)));
        }
        if self.kind.needs_direction() {
            match self.direction {
                None => {
                    return Err(Error::InvalidParameter(format!(
                        "{} light requires a direction", self.kind.name())));
                }
                Some(direction) if !direction.is_finite() || direction.length_squared() == 0.0 => {
                    return Err(Error::InvalidParameter(format!(
                        "{} light direction {:?} is not usable", self.kind.name(), direction)));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
