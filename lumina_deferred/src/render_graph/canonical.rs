/// Canonical deferred graph: geometry, N light passes, compose, optional tonemap
///
/// Slot layout read by the built-in programs:
///
/// | pass     | slot 0  | slot 1  | slot 2 |
/// |----------|---------|---------|--------|
/// | light.i  | normal  | diffuse |        |
/// | compose  | diffuse | light   | depth  |
/// | tonemap  | composite |       |        |

use crate::attachment::{AttachmentId, AttachmentSet};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::render_graph::{LoadPolicy, PassDescriptor, PassKind, SubpassGraph};

pub const LIGHT_SLOT_NORMAL: u32 = 0;
pub const LIGHT_SLOT_DIFFUSE: u32 = 1;
pub const COMPOSE_SLOT_DIFFUSE: u32 = 0;
pub const COMPOSE_SLOT_LIGHT: u32 = 1;
pub const COMPOSE_SLOT_DEPTH: u32 = 2;
pub const TONEMAP_SLOT_COLOR: u32 = 0;

/// Name of the i-th light pass
pub fn light_pass_name(index: usize) -> String {
    format!("light.{}", index)
}

/// Pass list for `config`, without validation
pub fn canonical_passes(config: &PipelineConfig) -> Vec<PassDescriptor> {
    let clear = LoadPolicy::clear_color(config.clear_color);
    let mut passes = Vec::with_capacity(config.light_pass_count + 3);

    passes.push(
        PassDescriptor::new("geometry", PassKind::Geometry)
            .output(AttachmentId::DIFFUSE, clear)
            .output(AttachmentId::NORMAL, clear)
            .output(AttachmentId::DEPTH, LoadPolicy::clear_depth(config.depth_clear))
            .program(&config.programs.geometry)
            .expects_normals(config.normal_encoding),
    );

    for index in 0..config.light_pass_count {
        // Exactly one clear of the accumulation attachment per frame
        let load = if index == 0 { LoadPolicy::clear_color([0.0; 4]) } else { LoadPolicy::Preserve };
        let mut light = PassDescriptor::new(&light_pass_name(index), PassKind::Lighting)
            .input(LIGHT_SLOT_NORMAL, AttachmentId::NORMAL)
            .output(AttachmentId::LIGHT, load);
        if config.light_reads_diffuse {
            light = light.input(LIGHT_SLOT_DIFFUSE, AttachmentId::DIFFUSE);
        }
        passes.push(light);
    }

    let mut compose = PassDescriptor::new("compose", PassKind::Compose)
        .input(COMPOSE_SLOT_DIFFUSE, AttachmentId::DIFFUSE)
        .input(COMPOSE_SLOT_LIGHT, AttachmentId::LIGHT)
        .output(AttachmentId::COMPOSITE, clear)
        .program(&config.programs.compose);
    if config.compose_reads_depth {
        compose = compose.input(COMPOSE_SLOT_DEPTH, AttachmentId::DEPTH);
    }
    passes.push(compose);

    if config.tonemap {
        passes.push(
            PassDescriptor::new("tonemap", PassKind::Tonemap)
                .input(TONEMAP_SLOT_COLOR, AttachmentId::COMPOSITE)
                .output(AttachmentId::DISPLAY, clear)
                .program(&config.programs.tonemap),
        );
    }

    passes
}

/// Build and validate the canonical graph for `attachments`
pub fn build_canonical_graph(attachments: &AttachmentSet, config: &PipelineConfig) -> Result<SubpassGraph> {
    config.validate()?;
    SubpassGraph::build(canonical_passes(config), attachments)
}

#[cfg(test)]
#[path = "canonical_tests.rs"]
mod tests;
