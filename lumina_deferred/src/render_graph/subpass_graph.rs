/// SubpassGraph - validated, ordered sequence of passes
///
/// The graph is a linear sequence, so it is acyclic by construction. Building
/// it checks that the sequence is a total order consistent with every
/// attachment read-after-write dependency, and derives the layout
/// transitions each pass needs before it begins.

use rustc_hash::{FxHashMap, FxHashSet};
use crate::attachment::{
    AttachmentId, AttachmentSet, AttachmentUsage, FormatClass, NormalEncoding, Resolution,
};
use crate::error::{Error, Hazard, Result};
use crate::graphics_device::{ClearValue, ImageLayout};
use crate::render_graph::{LoadPolicy, PassDescriptor};
use crate::{engine_bail, engine_debug};

/// Read-after-write edge between two passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubpassDependency {
    /// Last pass writing the attachment before `dst_pass`
    pub src_pass: usize,
    /// Pass reading the attachment
    pub dst_pass: usize,
    pub attachment: AttachmentId,
}

/// Layout change applied to an attachment before a pass begins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutTransition {
    pub attachment: AttachmentId,
    pub from: ImageLayout,
    pub to: ImageLayout,
}

/// A pass together with the transitions that precede it
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPass {
    descriptor: PassDescriptor,
    transitions: Vec<LayoutTransition>,
}

impl CompiledPass {
    pub fn descriptor(&self) -> &PassDescriptor {
        &self.descriptor
    }

    pub fn transitions(&self) -> &[LayoutTransition] {
        &self.transitions
    }
}

/// Per-attachment bookkeeping while walking the pass list
#[derive(Clone, Copy)]
struct AttachmentTrack {
    last_writer: Option<usize>,
    first_reader: Option<usize>,
    layout: ImageLayout,
}

impl Default for AttachmentTrack {
    fn default() -> Self {
        Self { last_writer: None, first_reader: None, layout: ImageLayout::Undefined }
    }
}

/// Immutable pass sequence bound to one attachment layout
#[derive(Debug, Clone)]
pub struct SubpassGraph {
    passes: Vec<CompiledPass>,
    dependencies: Vec<SubpassDependency>,
    layout_id: u64,
    resolution: Resolution,
    normal_encoding: NormalEncoding,
}

fn read_layout(class: FormatClass) -> ImageLayout {
    match class {
        FormatClass::ColorLinearRgba => ImageLayout::ShaderReadOnly,
        FormatClass::Depth => ImageLayout::DepthStencilReadOnly,
    }
}

fn write_layout(class: FormatClass) -> ImageLayout {
    match class {
        FormatClass::ColorLinearRgba => ImageLayout::ColorAttachment,
        FormatClass::Depth => ImageLayout::DepthStencilAttachment,
    }
}

impl SubpassGraph {
    /// Validate `passes` against `attachments` and build the graph
    ///
    /// # Errors
    ///
    /// - `InvalidResource`: empty list, pass without outputs, duplicate pass
    ///   name, duplicate slot or output, unknown attachment, usage violation
    /// - `DependencyOrder`: input not produced by a strictly earlier pass, or
    ///   an attachment written after it was read
    /// - `InvalidLoadPolicy`: first writer does not clear, a later writer
    ///   clears, or the clear value does not match the format class
    /// - `EncodingMismatch`: a pass expects a different normal convention
    ///   than the attachment set records
    pub fn build(passes: Vec<PassDescriptor>, attachments: &AttachmentSet) -> Result<Self> {
        if passes.is_empty() {
            engine_bail!("lumina::SubpassGraph",
                Error::InvalidResource("graph has no passes".to_string()));
        }

        let mut tracks: FxHashMap<AttachmentId, AttachmentTrack> = FxHashMap::default();
        let mut names: FxHashSet<&str> = FxHashSet::default();
        let mut dependencies = Vec::new();
        let mut transitions_per_pass = Vec::with_capacity(passes.len());

        for (index, pass) in passes.iter().enumerate() {
            if !names.insert(pass.name()) {
                engine_bail!("lumina::SubpassGraph", Error::InvalidResource(
                    format!("duplicate pass name '{}'", pass.name())));
            }
            if pass.outputs().is_empty() {
                engine_bail!("lumina::SubpassGraph", Error::InvalidResource(
                    format!("pass {} ('{}') has no outputs", index, pass.name())));
            }
            if let Some(expected) = pass.normal_encoding() {
                if expected != attachments.normal_encoding() {
                    engine_bail!("lumina::SubpassGraph", Error::EncodingMismatch {
                        context: format!("pass {} ('{}')", index, pass.name()),
                        expected,
                        actual: attachments.normal_encoding(),
                    });
                }
            }

            let mut transitions = Vec::new();

            // Inputs first: a pass reading and writing the same attachment
            // is a write after its own read.
            let mut slots = FxHashSet::default();
            for input in pass.inputs() {
                if !slots.insert(input.slot) {
                    engine_bail!("lumina::SubpassGraph", Error::InvalidResource(
                        format!("pass {} ('{}') binds slot {} twice", index, pass.name(), input.slot)));
                }
                let attachment = attachments.get(input.attachment)?;
                if !attachment.usage().contains(AttachmentUsage::INPUT) {
                    engine_bail!("lumina::SubpassGraph", Error::InvalidResource(
                        format!("attachment '{}' cannot be read as an input", input.attachment)));
                }
                let track = tracks.entry(input.attachment).or_default();
                let Some(src_pass) = track.last_writer else {
                    engine_bail!("lumina::SubpassGraph", Error::DependencyOrder {
                        attachment: input.attachment.to_string(),
                        pass_index: index,
                        pass_name: pass.name().to_string(),
                        hazard: Hazard::ReadBeforeWrite,
                    });
                };
                track.first_reader.get_or_insert(index);
                dependencies.push(SubpassDependency {
                    src_pass,
                    dst_pass: index,
                    attachment: input.attachment,
                });
                let to = read_layout(attachment.format_class());
                if track.layout != to {
                    transitions.push(LayoutTransition { attachment: input.attachment, from: track.layout, to });
                    track.layout = to;
                }
            }

            let mut written = FxHashSet::default();
            for output in pass.outputs() {
                if !written.insert(output.attachment) {
                    engine_bail!("lumina::SubpassGraph", Error::InvalidResource(
                        format!("pass {} ('{}') writes '{}' twice", index, pass.name(), output.attachment)));
                }
                let attachment = attachments.get(output.attachment)?;
                if !attachment.usage().contains(AttachmentUsage::OUTPUT) {
                    engine_bail!("lumina::SubpassGraph", Error::InvalidResource(
                        format!("attachment '{}' cannot be written", output.attachment)));
                }
                let track = tracks.entry(output.attachment).or_default();
                if track.first_reader.is_some() {
                    engine_bail!("lumina::SubpassGraph", Error::DependencyOrder {
                        attachment: output.attachment.to_string(),
                        pass_index: index,
                        pass_name: pass.name().to_string(),
                        hazard: Hazard::WriteAfterRead,
                    });
                }
                let class = attachment.format_class();
                match (track.last_writer, output.load) {
                    (None, LoadPolicy::Preserve) => {
                        engine_bail!("lumina::SubpassGraph", Error::InvalidLoadPolicy {
                            attachment: output.attachment.to_string(),
                            pass_index: index,
                            reason: "first writer of the frame must clear".to_string(),
                        });
                    }
                    (Some(first), LoadPolicy::Clear(_)) => {
                        engine_bail!("lumina::SubpassGraph", Error::InvalidLoadPolicy {
                            attachment: output.attachment.to_string(),
                            pass_index: index,
                            reason: format!("already written by pass {}; later writers must preserve", first),
                        });
                    }
                    (None, LoadPolicy::Clear(value)) => {
                        let matches_class = matches!(
                            (class, value),
                            (FormatClass::ColorLinearRgba, ClearValue::Color(_))
                                | (FormatClass::Depth, ClearValue::DepthStencil { .. })
                        );
                        if !matches_class {
                            engine_bail!("lumina::SubpassGraph", Error::InvalidLoadPolicy {
                                attachment: output.attachment.to_string(),
                                pass_index: index,
                                reason: format!("clear value {:?} does not fit {:?}", value, class),
                            });
                        }
                    }
                    (Some(_), LoadPolicy::Preserve) => {}
                }
                track.last_writer = Some(index);
                let to = write_layout(class);
                if track.layout != to {
                    transitions.push(LayoutTransition { attachment: output.attachment, from: track.layout, to });
                    track.layout = to;
                }
            }

            transitions_per_pass.push(transitions);
        }

        let passes: Vec<CompiledPass> = passes
            .into_iter()
            .zip(transitions_per_pass)
            .map(|(descriptor, transitions)| CompiledPass { descriptor, transitions })
            .collect();

        let transition_count: usize = passes.iter().map(|p| p.transitions.len()).sum();
        engine_debug!("lumina::SubpassGraph",
            "Built subpass graph: {} passes, {} dependencies, {} transitions (layout {})",
            passes.len(), dependencies.len(), transition_count, attachments.layout_id());

        Ok(Self {
            passes,
            dependencies,
            layout_id: attachments.layout_id(),
            resolution: attachments.resolution(),
            normal_encoding: attachments.normal_encoding(),
        })
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    pub fn pass(&self, index: usize) -> Option<&CompiledPass> {
        self.passes.get(index)
    }

    pub fn passes(&self) -> &[CompiledPass] {
        &self.passes
    }

    /// Index of the pass named `name`
    pub fn find_pass(&self, name: &str) -> Option<usize> {
        self.passes.iter().position(|p| p.descriptor.name() == name)
    }

    pub fn dependencies(&self) -> &[SubpassDependency] {
        &self.dependencies
    }

    /// Layout stamp of the AttachmentSet this graph was built against
    pub fn layout_id(&self) -> u64 {
        self.layout_id
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn normal_encoding(&self) -> NormalEncoding {
        self.normal_encoding
    }

    /// Whether the graph may run against `attachments`
    pub fn is_compatible(&self, attachments: &AttachmentSet) -> bool {
        self.layout_id == attachments.layout_id()
    }

    /// Like `is_compatible`, failing with `StaleGraph`
    pub fn check_compatible(&self, attachments: &AttachmentSet) -> Result<()> {
        if !self.is_compatible(attachments) {
            engine_bail!("lumina::SubpassGraph", Error::StaleGraph {
                graph_layout: self.layout_id,
                attachments_layout: attachments.layout_id(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "subpass_graph_tests.rs"]
mod tests;
