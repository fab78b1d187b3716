//! Unit tests for PipelineConfig

use crate::attachment::NormalEncoding;
use crate::config::PipelineConfig;
use crate::error::Error;
use crate::graphics_device::TextureFormat;

// ============================================================================
// DEFAULT TESTS
// ============================================================================

#[test]
fn test_default_config_is_valid() {
    let config = PipelineConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.normal_encoding, NormalEncoding::Unsigned);
    assert_eq!(config.normal_format, TextureFormat::A2B10G10R10_UNORM);
    assert_eq!(config.depth_clear, 1.0);
    assert_eq!(config.light_pass_count, 1);
}

#[test]
fn test_signed_normals_config_is_valid() {
    let config = PipelineConfig::signed_normals();
    assert!(config.validate().is_ok());
    assert!(config.normal_format.is_float());
}

// ============================================================================
// VALIDATION TESTS
// ============================================================================

#[test]
fn test_zero_light_passes_rejected() {
    let config = PipelineConfig { light_pass_count: 0, ..Default::default() };
    assert!(matches!(config.validate(), Err(Error::InvalidResource(_))));
}

#[test]
fn test_zero_frames_in_flight_rejected() {
    let config = PipelineConfig { frames_in_flight: 0, ..Default::default() };
    assert!(matches!(config.validate(), Err(Error::InvalidResource(_))));
}

#[test]
fn test_unorm_light_format_rejected() {
    let config = PipelineConfig {
        light_format: TextureFormat::R8G8B8A8_UNORM,
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(Error::InvalidResource(_))));
}

#[test]
fn test_depth_format_swap_rejected() {
    let config = PipelineConfig {
        depth_format: TextureFormat::R32G32B32A32_SFLOAT,
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(Error::InvalidResource(_))));

    let config = PipelineConfig {
        diffuse_format: TextureFormat::D32_FLOAT,
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(Error::InvalidResource(_))));
}

#[test]
fn test_signed_normals_in_unorm_rejected() {
    let config = PipelineConfig {
        normal_encoding: NormalEncoding::Signed,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(Error::EncodingMismatch { actual: NormalEncoding::Signed, .. })
    ));
}
