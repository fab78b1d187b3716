/// Attachment identity, classification, and usage

use std::fmt;
use std::sync::Arc;
use crate::error::{Error, Result};
use crate::graphics_device::{Texture, TextureFormat, TextureUsage};

/// Attachment identity within an AttachmentSet
///
/// Index meaning is fixed by the named constants, not by position in a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttachmentId(pub u32);

impl AttachmentId {
    pub const DIFFUSE: AttachmentId = AttachmentId(0);
    pub const NORMAL: AttachmentId = AttachmentId(1);
    pub const LIGHT: AttachmentId = AttachmentId(2);
    pub const DEPTH: AttachmentId = AttachmentId(3);
    pub const COMPOSITE: AttachmentId = AttachmentId(4);
    pub const DISPLAY: AttachmentId = AttachmentId(5);

    /// Every attachment an AttachmentSet allocates, in id order
    pub const ALL: [AttachmentId; 6] = [
        Self::DIFFUSE,
        Self::NORMAL,
        Self::LIGHT,
        Self::DEPTH,
        Self::COMPOSITE,
        Self::DISPLAY,
    ];

    /// Role of the attachment, or `None` for an unknown id
    pub fn kind(&self) -> Option<AttachmentKind> {
        match *self {
            Self::DIFFUSE => Some(AttachmentKind::Diffuse),
            Self::NORMAL => Some(AttachmentKind::Normal),
            Self::LIGHT => Some(AttachmentKind::LightAccumulation),
            Self::DEPTH => Some(AttachmentKind::Depth),
            Self::COMPOSITE => Some(AttachmentKind::Composite),
            Self::DISPLAY => Some(AttachmentKind::Display),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Some(kind) => write!(f, "{}", kind.name()),
            None => write!(f, "attachment#{}", self.0),
        }
    }
}

/// Role an attachment plays in the deferred pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentKind {
    Diffuse,
    Normal,
    LightAccumulation,
    Depth,
    Composite,
    Display,
}

impl AttachmentKind {
    pub fn name(&self) -> &'static str {
        match self {
            AttachmentKind::Diffuse => "diffuse",
            AttachmentKind::Normal => "normal",
            AttachmentKind::LightAccumulation => "light",
            AttachmentKind::Depth => "depth",
            AttachmentKind::Composite => "composite",
            AttachmentKind::Display => "display",
        }
    }

    /// Declared usage; the display image is never read back by a pass
    pub fn usage(&self) -> AttachmentUsage {
        match self {
            AttachmentKind::Display => AttachmentUsage::OUTPUT,
            _ => AttachmentUsage::INPUT | AttachmentUsage::OUTPUT,
        }
    }
}

/// Storage class of an attachment format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatClass {
    ColorLinearRgba,
    Depth,
}

impl From<TextureFormat> for FormatClass {
    fn from(format: TextureFormat) -> Self {
        if format.is_depth() {
            FormatClass::Depth
        } else {
            FormatClass::ColorLinearRgba
        }
    }
}

bitflags::bitflags! {
    /// How passes may touch an attachment
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AttachmentUsage: u8 {
        /// Readable as a subpass input
        const INPUT = 1 << 0;
        /// Writable as a pass output
        const OUTPUT = 1 << 1;
    }
}

/// How normals are stored in the normal attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalEncoding {
    /// `(n + 1) / 2`, decoded with `normalize(v * 2 - 1)`
    Unsigned,
    /// Raw [-1, 1] direction, requires a float format
    Signed,
}

/// Framebuffer resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Fails with `InvalidResolution` when either dimension is zero
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidResolution { width: self.width, height: self.height });
        }
        Ok(())
    }
}

/// One allocated attachment
#[derive(Clone)]
pub struct Attachment {
    pub(crate) id: AttachmentId,
    pub(crate) kind: AttachmentKind,
    pub(crate) format: TextureFormat,
    pub(crate) resolution: Resolution,
    pub(crate) texture: Arc<dyn Texture>,
}

impl Attachment {
    pub fn id(&self) -> AttachmentId {
        self.id
    }

    pub fn kind(&self) -> AttachmentKind {
        self.kind
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn format_class(&self) -> FormatClass {
        FormatClass::from(self.format)
    }

    pub fn usage(&self) -> AttachmentUsage {
        self.kind.usage()
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn texture(&self) -> &Arc<dyn Texture> {
        &self.texture
    }

    /// Device usage flags derived from kind and format class
    pub(crate) fn texture_usage(kind: AttachmentKind, format: TextureFormat) -> TextureUsage {
        let mut usage = if format.is_depth() {
            TextureUsage::DEPTH_ATTACHMENT
        } else {
            TextureUsage::COLOR_ATTACHMENT
        };
        if kind.usage().contains(AttachmentUsage::INPUT) {
            usage |= TextureUsage::INPUT_ATTACHMENT;
        }
        if matches!(kind, AttachmentKind::Composite | AttachmentKind::Display) {
            usage |= TextureUsage::TRANSFER_SRC;
        }
        usage
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("format", &self.format)
            .field("resolution", &self.resolution)
            .finish()
    }
}
