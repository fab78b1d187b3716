/// Built-in fragment programs for the canonical deferred pipeline
///
/// Each program is a thin wrapper over the shared shading math so the CPU
/// backend and the math tests agree on every constant.

use std::sync::Arc;
use glam::Vec3;
use lumina_deferred::lumina::attachment::NormalEncoding;
use lumina_deferred::lumina::device::{BlendMode, GraphicsDevice, ProgramDesc};
use lumina_deferred::lumina::render::{
    LightKind, LightProgramTable, ParameterBlock, COMPOSE_SLOT_DIFFUSE, COMPOSE_SLOT_LIGHT,
    LIGHT_SLOT_NORMAL, TONEMAP_SLOT_COLOR,
};
use lumina_deferred::lumina::shading;
use lumina_deferred::lumina::{ProgramNames, Result};
use crate::cpu_program::{FragmentInput, FragmentOutput, FragmentProgram};

pub const GEOMETRY_FLAT: &str = "geometry.flat";
pub const LIGHT_AMBIENT: &str = "light.ambient";
pub const LIGHT_DIRECTIONAL: &str = "light.directional";
pub const LIGHT_DIRECTIONAL_DECODED: &str = "light.directional_decoded";
pub const LIGHT_POINT_COLORED: &str = "light.point_colored";
pub const COMPOSE: &str = "compose";
pub const TONEMAP_ACES: &str = "tonemap.aces";

// ===== GEOMETRY =====

/// Writes one flat surface: albedo, normal, depth from a `surface` block
///
/// Outputs are diffuse then normal, matching the canonical geometry pass.
pub struct GeometryFlat;

impl FragmentProgram for GeometryFlat {
    fn shade(&self, input: &FragmentInput) -> FragmentOutput {
        let block = input.parameters.unwrap_or_default();
        let normal = block.direction().normalize_or_zero();
        let stored = match input.normal_encoding.unwrap_or(NormalEncoding::Unsigned) {
            NormalEncoding::Unsigned => shading::encode_normal(normal),
            NormalEncoding::Signed => normal,
        };
        FragmentOutput {
            colors: vec![block.color(), stored.extend(1.0)],
            depth: Some(block.depth()),
        }
    }
}

// ===== LIGHTS =====

fn radiance(block: &ParameterBlock) -> Vec3 {
    block.rgb() * block.intensity()
}

pub struct AmbientLight;

impl FragmentProgram for AmbientLight {
    fn shade(&self, input: &FragmentInput) -> FragmentOutput {
        let block = input.parameters.unwrap_or_default();
        FragmentOutput::color(radiance(&block).extend(1.0))
    }
}

/// Directional light over raw [-1, 1] normals
pub struct DirectionalLight;

impl FragmentProgram for DirectionalLight {
    fn shade(&self, input: &FragmentInput) -> FragmentOutput {
        let block = input.parameters.unwrap_or_default();
        let normal = input.input(LIGHT_SLOT_NORMAL).truncate().normalize_or_zero();
        let lit = shading::directional_light(normal, block.direction(), radiance(&block));
        FragmentOutput::color(lit.extend(1.0))
    }
}

/// Directional light over `(n + 1) / 2` encoded normals
pub struct DirectionalDecodedLight;

impl FragmentProgram for DirectionalDecodedLight {
    fn shade(&self, input: &FragmentInput) -> FragmentOutput {
        let block = input.parameters.unwrap_or_default();
        let normal = shading::decode_normal(input.input(LIGHT_SLOT_NORMAL).truncate());
        let lit = shading::directional_light(normal, block.direction(), radiance(&block));
        FragmentOutput::color(lit.extend(1.0))
    }
}

/// Constant color; the light volume comes from the scissor
pub struct PointColoredLight;

impl FragmentProgram for PointColoredLight {
    fn shade(&self, input: &FragmentInput) -> FragmentOutput {
        let block = input.parameters.unwrap_or_default();
        FragmentOutput::color(radiance(&block).extend(1.0))
    }
}

// ===== COMPOSE / TONEMAP =====

pub struct Compose;

impl FragmentProgram for Compose {
    fn shade(&self, input: &FragmentInput) -> FragmentOutput {
        FragmentOutput::color(shading::compose(
            input.input(COMPOSE_SLOT_DIFFUSE),
            input.input(COMPOSE_SLOT_LIGHT),
        ))
    }
}

pub struct TonemapAces;

impl FragmentProgram for TonemapAces {
    fn shade(&self, input: &FragmentInput) -> FragmentOutput {
        let color = input.input(TONEMAP_SLOT_COLOR).truncate();
        FragmentOutput::color(shading::tonemap(color).extend(1.0))
    }
}

// ===== REGISTRATION =====

/// Every built-in program keyed by fragment entry
pub fn builtin_fragment_programs() -> Vec<(&'static str, Arc<dyn FragmentProgram>)> {
    let programs: [(&'static str, Arc<dyn FragmentProgram>); 7] = [
        (GEOMETRY_FLAT, Arc::new(GeometryFlat)),
        (LIGHT_AMBIENT, Arc::new(AmbientLight)),
        (LIGHT_DIRECTIONAL, Arc::new(DirectionalLight)),
        (LIGHT_DIRECTIONAL_DECODED, Arc::new(DirectionalDecodedLight)),
        (LIGHT_POINT_COLORED, Arc::new(PointColoredLight)),
        (COMPOSE, Arc::new(Compose)),
        (TONEMAP_ACES, Arc::new(TonemapAces)),
    ];
    Vec::from(programs)
}

/// Fragment entry of the built-in program for `kind`
pub fn light_fragment_entry(kind: LightKind) -> &'static str {
    match kind {
        LightKind::Ambient => LIGHT_AMBIENT,
        LightKind::Directional => LIGHT_DIRECTIONAL,
        LightKind::DirectionalDecoded => LIGHT_DIRECTIONAL_DECODED,
        LightKind::PointColored => LIGHT_POINT_COLORED,
    }
}

/// Additive light program for `kind`, tagged with the encoding it assumes
pub fn light_program_desc(kind: LightKind) -> ProgramDesc {
    let entry = light_fragment_entry(kind);
    let desc = ProgramDesc::fullscreen(entry, entry, BlendMode::Additive)
        .with_push_constants(ParameterBlock::SIZE);
    match kind.required_encoding() {
        Some(encoding) => desc.with_normal_encoding(encoding),
        None => desc,
    }
}

/// Geometry, compose and tonemap programs under the configured names
///
/// The geometry program is tagged with `encoding` so it writes normals the
/// way the attachment set records them.
pub fn pass_program_descs(names: &ProgramNames, encoding: NormalEncoding) -> Vec<ProgramDesc> {
    vec![
        ProgramDesc::fullscreen(&names.geometry, GEOMETRY_FLAT, BlendMode::Replace)
            .with_push_constants(ParameterBlock::SIZE)
            .with_normal_encoding(encoding),
        ProgramDesc::fullscreen(&names.compose, COMPOSE, BlendMode::Replace),
        ProgramDesc::fullscreen(&names.tonemap, TONEMAP_ACES, BlendMode::Replace),
    ]
}

/// Create a light program for every kind on `device`
pub fn create_light_program_table(device: &dyn GraphicsDevice) -> Result<LightProgramTable> {
    let mut entries = Vec::with_capacity(LightKind::ALL.len());
    for kind in LightKind::ALL {
        entries.push((kind, device.create_program(light_program_desc(kind))?));
    }
    LightProgramTable::new(entries)
}

#[cfg(test)]
#[path = "builtin_programs_tests.rs"]
mod tests;
