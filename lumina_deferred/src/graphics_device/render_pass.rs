/// Render pass types - load/store behavior, layouts, and pass begin info

use std::sync::Arc;
use crate::graphics_device::{Texture, Rect2D};

/// Load operation for an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOp {
    /// Load existing content
    Load,
    /// Clear the content
    Clear,
    /// Don't care about existing content
    DontCare,
}

/// Store operation for an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    /// Store the rendered content
    Store,
    /// Don't care about storing the content
    DontCare,
}

/// Image layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageLayout {
    /// Undefined layout (initial state)
    Undefined,
    /// Layout for color attachment writes
    ColorAttachment,
    /// Layout for depth attachment writes
    DepthStencilAttachment,
    /// Layout for color subpass input reads
    ShaderReadOnly,
    /// Layout for depth subpass input reads
    DepthStencilReadOnly,
}

/// Clear value for an attachment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    /// Color clear value (RGBA)
    Color([f32; 4]),
    /// Depth/stencil clear value
    DepthStencil { depth: f32, stencil: u32 },
}

/// Layout change for one texture, recorded before a render pass begins
#[derive(Clone)]
pub struct TextureBarrier {
    pub texture: Arc<dyn Texture>,
    pub from: ImageLayout,
    pub to: ImageLayout,
}

/// One written attachment of a render pass
#[derive(Clone)]
pub struct RenderTargetBinding {
    pub texture: Arc<dyn Texture>,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    /// Used only when `load_op` is `LoadOp::Clear`
    pub clear_value: Option<ClearValue>,
}

/// One read-only attachment visible to the pass's programs
#[derive(Clone)]
pub struct InputAttachmentBinding {
    pub slot: u32,
    pub texture: Arc<dyn Texture>,
}

/// Everything a backend needs to open a render pass
///
/// Color targets are listed in output order; a program's N-th color output
/// goes to `color_targets[N]`.
#[derive(Clone)]
pub struct RenderPassBegin {
    pub name: String,
    pub color_targets: Vec<RenderTargetBinding>,
    pub depth_target: Option<RenderTargetBinding>,
    pub inputs: Vec<InputAttachmentBinding>,
    pub render_area: Rect2D,
}
