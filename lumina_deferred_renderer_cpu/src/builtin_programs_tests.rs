//! Unit tests for the built-in fragment programs

use super::*;
use glam::Vec4;
use lumina_deferred::lumina::render::{LIGHT_SLOT_NORMAL, TONEMAP_SLOT_COLOR};

const EPSILON: f32 = 1e-5;

fn run(
    program: &dyn FragmentProgram,
    inputs: &[(u32, Vec4)],
    parameters: Option<ParameterBlock>,
    normal_encoding: Option<NormalEncoding>,
) -> FragmentOutput {
    program.shade(&FragmentInput { x: 0, y: 0, inputs, parameters, normal_encoding })
}

// ============================================================================
// GEOMETRY
// ============================================================================

#[test]
fn test_geometry_writes_unsigned_normal_and_depth() {
    let block = ParameterBlock::surface(Vec3::new(0.5, 0.2, 0.8), Vec3::new(0.0, 0.0, 2.0), 0.4);
    let out = run(&GeometryFlat, &[], Some(block), Some(NormalEncoding::Unsigned));

    assert_eq!(out.colors[0], Vec4::new(0.5, 0.2, 0.8, 1.0));
    assert_eq!(out.colors[1], Vec4::new(0.5, 0.5, 1.0, 1.0));
    assert_eq!(out.depth, Some(0.4));
}

#[test]
fn test_geometry_writes_signed_normal() {
    let block = ParameterBlock::surface(Vec3::ONE, Vec3::new(0.0, -3.0, 0.0), 0.0);
    let out = run(&GeometryFlat, &[], Some(block), Some(NormalEncoding::Signed));
    assert_eq!(out.colors[1], Vec4::new(0.0, -1.0, 0.0, 1.0));
}

// ============================================================================
// LIGHTS
// ============================================================================

#[test]
fn test_ambient_scales_by_intensity() {
    let block = ParameterBlock::new(Vec3::new(0.2, 0.4, 0.6), 0.5, None);
    let out = run(&AmbientLight, &[], Some(block), None);
    assert!(out.colors[0].truncate().abs_diff_eq(Vec3::new(0.1, 0.2, 0.3), EPSILON));
}

#[test]
fn test_directional_faces_light() {
    let block = ParameterBlock::new(Vec3::new(1.0, 0.5, 0.25), 1.0, Some(Vec3::NEG_Z));
    let inputs = [(LIGHT_SLOT_NORMAL, Vec4::new(0.0, 0.0, 1.0, 1.0))];
    let out = run(&DirectionalLight, &inputs, Some(block), None);
    assert!(out.colors[0].truncate().abs_diff_eq(Vec3::new(1.0, 0.5, 0.25), EPSILON));
}

#[test]
fn test_directional_back_facing_is_black() {
    let block = ParameterBlock::new(Vec3::ONE, 1.0, Some(Vec3::Z));
    let inputs = [(LIGHT_SLOT_NORMAL, Vec4::new(0.0, 0.0, 1.0, 1.0))];
    let out = run(&DirectionalLight, &inputs, Some(block), None);
    assert_eq!(out.colors[0].truncate(), Vec3::ZERO);
}

#[test]
fn test_decoded_directional_matches_raw_on_encoded_input() {
    let normal = Vec3::new(1.0, 1.0, 0.0).normalize();
    let block = ParameterBlock::new(Vec3::ONE, 2.0, Some(Vec3::new(-1.0, 0.0, 0.0)));

    let raw = run(&DirectionalLight, &[(LIGHT_SLOT_NORMAL, normal.extend(1.0))], Some(block), None);
    let encoded = shading::encode_normal(normal).extend(1.0);
    let decoded = run(&DirectionalDecodedLight, &[(LIGHT_SLOT_NORMAL, encoded)], Some(block), None);

    assert!(raw.colors[0].abs_diff_eq(decoded.colors[0], EPSILON));
}

#[test]
fn test_missing_parameters_draw_black() {
    let out = run(&PointColoredLight, &[], None, None);
    assert_eq!(out.colors[0].truncate(), Vec3::ZERO);
}

// ============================================================================
// COMPOSE / TONEMAP
// ============================================================================

#[test]
fn test_compose_multiplies_without_clamp() {
    let inputs = [
        (COMPOSE_SLOT_DIFFUSE, Vec4::new(0.5, 0.2, 0.8, 1.0)),
        (COMPOSE_SLOT_LIGHT, Vec4::new(4.0, 1.0, 1.0, 1.0)),
    ];
    let out = run(&Compose, &inputs, None, None);
    assert_eq!(out.colors[0], Vec4::new(2.0, 0.2, 0.8, 1.0));
}

#[test]
fn test_tonemap_reference_value() {
    let inputs = [(TONEMAP_SLOT_COLOR, Vec4::new(0.5, 0.2, 0.8, 1.0))];
    let out = run(&TonemapAces, &inputs, None, None);
    assert!(out.colors[0]
        .truncate()
        .abs_diff_eq(Vec3::new(0.6378136, 0.4014449, 0.7476507), 1e-4));
}

// ============================================================================
// DESCRIPTORS
// ============================================================================

#[test]
fn test_light_descs_are_additive_with_push_constants() {
    for kind in LightKind::ALL {
        let desc = light_program_desc(kind);
        assert_eq!(desc.blend, BlendMode::Additive);
        assert_eq!(desc.push_constant_size, ParameterBlock::SIZE);
        assert_eq!(desc.normal_encoding, kind.required_encoding());
        assert_eq!(desc.fragment_entry, light_fragment_entry(kind));
    }
}

#[test]
fn test_pass_descs_use_configured_names() {
    let names = ProgramNames::default();
    let descs = pass_program_descs(&names, NormalEncoding::Signed);
    let names_out: Vec<_> = descs.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names_out, vec!["geometry.flat", "compose", "tonemap.aces"]);
    assert_eq!(descs[0].normal_encoding, Some(NormalEncoding::Signed));
}

#[test]
fn test_every_builtin_entry_is_listed() {
    let entries: Vec<_> = builtin_fragment_programs().into_iter().map(|(e, _)| e).collect();
    for kind in LightKind::ALL {
        assert!(entries.contains(&light_fragment_entry(kind)));
    }
    assert!(entries.contains(&GEOMETRY_FLAT));
    assert!(entries.contains(&COMPOSE));
    assert!(entries.contains(&TONEMAP_ACES));
}
