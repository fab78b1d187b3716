/// Pipeline configuration
///
/// One value drives attachment allocation, the canonical graph layout and
/// the frames-in-flight count.

use crate::attachment::NormalEncoding;
use crate::error::{Error, Result};
use crate::graphics_device::TextureFormat;
use crate::engine_bail;

/// Program names used by the canonical graph
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramNames {
    pub geometry: String,
    pub compose: String,
    pub tonemap: String,
}

impl Default for ProgramNames {
    fn default() -> Self {
        Self {
            geometry: "geometry.flat".to_string(),
            compose: "compose".to_string(),
            tonemap: "tonemap.aces".to_string(),
        }
    }
}

/// Deferred pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Diffuse albedo attachment format
    pub diffuse_format: TextureFormat,
    /// Encoded normal attachment format
    pub normal_format: TextureFormat,
    /// Light accumulation format (must be float for additive blending)
    pub light_format: TextureFormat,
    /// Depth attachment format
    pub depth_format: TextureFormat,
    /// Linear composite format (compose output)
    pub composite_format: TextureFormat,
    /// Display format (tonemap output)
    pub display_format: TextureFormat,
    /// How the geometry pass stores normals
    pub normal_encoding: NormalEncoding,
    /// Number of light accumulation passes (at least one)
    pub light_pass_count: usize,
    /// Light passes also read the diffuse attachment
    pub light_reads_diffuse: bool,
    /// Compose pass also reads the depth attachment
    pub compose_reads_depth: bool,
    /// Append the ACES tonemap pass
    pub tonemap: bool,
    /// Clear value for color attachments
    pub clear_color: [f32; 4],
    /// Clear value for the depth attachment
    pub depth_clear: f32,
    /// Number of attachment sets in the frame ring
    pub frames_in_flight: usize,
    /// Programs bound by the canonical graph
    pub programs: ProgramNames,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            diffuse_format: TextureFormat::R8G8B8A8_UNORM,
            normal_format: TextureFormat::A2B10G10R10_UNORM,
            light_format: TextureFormat::R16G16B16A16_SFLOAT,
            depth_format: TextureFormat::D32_FLOAT,
            composite_format: TextureFormat::R16G16B16A16_SFLOAT,
            display_format: TextureFormat::R8G8B8A8_UNORM,
            normal_encoding: NormalEncoding::Unsigned,
            light_pass_count: 1,
            light_reads_diffuse: false,
            compose_reads_depth: true,
            tonemap: true,
            clear_color: [0.0, 0.0, 0.0, 0.0],
            depth_clear: 1.0,
            frames_in_flight: 2,
            programs: ProgramNames::default(),
        }
    }
}

impl PipelineConfig {
    /// Configuration storing signed normals in a float attachment
    pub fn signed_normals() -> Self {
        Self {
            normal_format: TextureFormat::R16G16B16A16_SFLOAT,
            normal_encoding: NormalEncoding::Signed,
            ..Self::default()
        }
    }

    /// Check the configuration for contradictions
    ///
    /// # Errors
    ///
    /// - `InvalidResource` for zero light passes, zero frames in flight, or a
    ///   format placed in the wrong attachment class
    /// - `EncodingMismatch` when signed normals target a UNORM format
    pub fn validate(&self) -> Result<()> {
        if self.light_pass_count == 0 {
            engine_bail!("lumina::PipelineConfig",
                Error::InvalidResource("light_pass_count must be at least 1".to_string()));
        }
        if self.frames_in_flight == 0 {
            engine_bail!("lumina::PipelineConfig",
                Error::InvalidResource("frames_in_flight must be at least 1".to_string()));
        }
        if !self.depth_format.is_depth() {
            engine_bail!("lumina::PipelineConfig",
                Error::InvalidResource(format!("{:?} is not a depth format", self.depth_format)));
        }
        let color_formats = [
            ("diffuse", self.diffuse_format),
            ("normal", self.normal_format),
            ("light", self.light_format),
            ("composite", self.composite_format),
            ("display", self.display_format),
        ];
        for (name, format) in color_formats {
            if format.is_depth() {
                engine_bail!("lumina::PipelineConfig",
                    Error::InvalidResource(format!("{} attachment cannot use depth format {:?}", name, format)));
            }
        }
        if !self.light_format.is_float() {
            engine_bail!("lumina::PipelineConfig",
                Error::InvalidResource(format!(
                    "light accumulation format {:?} is not additive-capable", self.light_format)));
        }
        if self.normal_encoding == NormalEncoding::Signed && !self.normal_format.is_float() {
            engine_bail!("lumina::PipelineConfig", Error::EncodingMismatch {
                context: format!("normal attachment format {:?}", self.normal_format),
                expected: NormalEncoding::Unsigned,
                actual: NormalEncoding::Signed,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
