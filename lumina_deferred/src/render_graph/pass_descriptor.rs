/// PassDescriptor - one rendering stage and the attachments it touches
///
/// Clear-once-then-preserve and attachment index meaning are explicit
/// fields here rather than conventions; SubpassGraph::build enforces them.

use crate::attachment::{AttachmentId, NormalEncoding};
use crate::graphics_device::ClearValue;

/// Role of a pass in the deferred pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Writes diffuse, normal, and depth from scene geometry
    Geometry,
    /// Accumulates light into the light attachment
    Lighting,
    /// Combines diffuse and accumulated light
    Compose,
    /// Maps linear color to display color
    Tonemap,
    /// Any other caller-defined stage
    Custom,
}

/// What happens to an output's previous contents when the pass begins
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadPolicy {
    /// Clear to a value (first writer of the frame)
    Clear(ClearValue),
    /// Keep previous contents (every later writer)
    Preserve,
}

impl LoadPolicy {
    pub fn clear_color(rgba: [f32; 4]) -> Self {
        LoadPolicy::Clear(ClearValue::Color(rgba))
    }

    pub fn clear_depth(depth: f32) -> Self {
        LoadPolicy::Clear(ClearValue::DepthStencil { depth, stencil: 0 })
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, LoadPolicy::Clear(_))
    }
}

/// Read-only attachment visible at a binding slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputBinding {
    pub slot: u32,
    pub attachment: AttachmentId,
}

/// Attachment written by the pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputBinding {
    pub attachment: AttachmentId,
    pub load: LoadPolicy,
}

/// Declaration of one pass
///
/// # Example
///
/// ```
/// use lumina_deferred::lumina::render::{PassDescriptor, PassKind, LoadPolicy};
/// use lumina_deferred::lumina::attachment::AttachmentId;
///
/// let light = PassDescriptor::new("light.0", PassKind::Lighting)
///     .input(0, AttachmentId::NORMAL)
///     .output(AttachmentId::LIGHT, LoadPolicy::clear_color([0.0; 4]));
/// assert_eq!(light.inputs().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PassDescriptor {
    name: String,
    kind: PassKind,
    inputs: Vec<InputBinding>,
    outputs: Vec<OutputBinding>,
    program: Option<String>,
    normal_encoding: Option<NormalEncoding>,
}

impl PassDescriptor {
    pub fn new(name: &str, kind: PassKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            inputs: Vec::new(),
            outputs: Vec::new(),
            program: None,
            normal_encoding: None,
        }
    }

    /// Bind `attachment` as a read-only input at `slot`
    pub fn input(mut self, slot: u32, attachment: AttachmentId) -> Self {
        self.inputs.push(InputBinding { slot, attachment });
        self
    }

    /// Declare `attachment` as an output; outputs are bound in declaration order
    pub fn output(mut self, attachment: AttachmentId, load: LoadPolicy) -> Self {
        self.outputs.push(OutputBinding { attachment, load });
        self
    }

    /// Program bound when the pass begins
    pub fn program(mut self, name: &str) -> Self {
        self.program = Some(name.to_string());
        self
    }

    /// Normal convention this pass produces or consumes
    pub fn expects_normals(mut self, encoding: NormalEncoding) -> Self {
        self.normal_encoding = Some(encoding);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PassKind {
        self.kind
    }

    pub fn inputs(&self) -> &[InputBinding] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[OutputBinding] {
        &self.outputs
    }

    pub fn program_name(&self) -> Option<&str> {
        self.program.as_deref()
    }

    pub fn normal_encoding(&self) -> Option<NormalEncoding> {
        self.normal_encoding
    }

    pub fn reads(&self, attachment: AttachmentId) -> bool {
        self.inputs.iter().any(|i| i.attachment == attachment)
    }

    pub fn writes(&self, attachment: AttachmentId) -> bool {
        self.outputs.iter().any(|o| o.attachment == attachment)
    }
}
