/// AttachmentSet - owns the intermediate images of one frame
///
/// Every allocation layout carries a `layout_id` stamp. Resizing issues a
/// new stamp, which invalidates every SubpassGraph built against the old one.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use crate::attachment::{
    Attachment, AttachmentId, AttachmentKind, NormalEncoding, Resolution,
};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::graphics_device::{GraphicsDevice, TextureDesc, TextureFormat};
use crate::{engine_bail, engine_err, engine_info};

static NEXT_LAYOUT_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_layout_id() -> u64 {
    NEXT_LAYOUT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Formats the set allocates with, captured from the PipelineConfig
#[derive(Debug, Clone, Copy, PartialEq)]
struct AttachmentFormats {
    diffuse: TextureFormat,
    normal: TextureFormat,
    light: TextureFormat,
    depth: TextureFormat,
    composite: TextureFormat,
    display: TextureFormat,
}

impl AttachmentFormats {
    fn from_config(config: &PipelineConfig) -> Self {
        Self {
            diffuse: config.diffuse_format,
            normal: config.normal_format,
            light: config.light_format,
            depth: config.depth_format,
            composite: config.composite_format,
            display: config.display_format,
        }
    }

    fn format_of(&self, kind: AttachmentKind) -> TextureFormat {
        match kind {
            AttachmentKind::Diffuse => self.diffuse,
            AttachmentKind::Normal => self.normal,
            AttachmentKind::LightAccumulation => self.light,
            AttachmentKind::Depth => self.depth,
            AttachmentKind::Composite => self.composite,
            AttachmentKind::Display => self.display,
        }
    }
}

/// Diffuse, normal, light accumulation, depth, composite and display images
/// sized to one resolution
pub struct AttachmentSet {
    device: Arc<dyn GraphicsDevice>,
    formats: AttachmentFormats,
    normal_encoding: NormalEncoding,
    resolution: Resolution,
    attachments: Vec<Attachment>,
    layout_id: u64,
    frame_index: usize,
}

impl AttachmentSet {
    /// Allocate every attachment at `resolution`
    ///
    /// # Errors
    ///
    /// - `InvalidResolution` when width or height is zero
    /// - any error from `PipelineConfig::validate`
    /// - device allocation errors
    pub fn create(
        device: Arc<dyn GraphicsDevice>,
        resolution: Resolution,
        config: &PipelineConfig,
    ) -> Result<Self> {
        Self::create_with_layout(device, resolution, config, next_layout_id(), 0)
    }

    pub(crate) fn create_with_layout(
        device: Arc<dyn GraphicsDevice>,
        resolution: Resolution,
        config: &PipelineConfig,
        layout_id: u64,
        frame_index: usize,
    ) -> Result<Self> {
        resolution
            .validate()
            .map_err(|e| engine_err!("lumina::AttachmentSet", e))?;
        config.validate()?;

        let formats = AttachmentFormats::from_config(config);
        let attachments = Self::allocate(device.as_ref(), &formats, resolution, frame_index)?;

        engine_info!("lumina::AttachmentSet",
            "Created attachment set {}x{} (layout {}, frame {}, normals {:?})",
            resolution.width, resolution.height, layout_id, frame_index, config.normal_encoding);

        Ok(Self {
            device,
            formats,
            normal_encoding: config.normal_encoding,
            resolution,
            attachments,
            layout_id,
            frame_index,
        })
    }

    fn allocate(
        device: &dyn GraphicsDevice,
        formats: &AttachmentFormats,
        resolution: Resolution,
        frame_index: usize,
    ) -> Result<Vec<Attachment>> {
        let mut attachments = Vec::with_capacity(AttachmentId::ALL.len());
        for id in AttachmentId::ALL {
            let kind = id.kind().ok_or_else(|| engine_err!("lumina::AttachmentSet",
                Error::InvalidResource(format!("no kind for {:?}", id))))?;
            let format = formats.format_of(kind);
            let texture = device.create_texture(TextureDesc {
                name: format!("{}[{}]", kind.name(), frame_index),
                width: resolution.width,
                height: resolution.height,
                format,
                usage: Attachment::texture_usage(kind, format),
            })?;
            attachments.push(Attachment { id, kind, format, resolution, texture });
        }
        Ok(attachments)
    }

    /// Reallocate every attachment at `resolution` under a new layout stamp
    ///
    /// On error the set is left untouched.
    pub fn resize(&mut self, resolution: Resolution) -> Result<()> {
        self.resize_with_layout(resolution, next_layout_id())
    }

    pub(crate) fn resize_with_layout(&mut self, resolution: Resolution, layout_id: u64) -> Result<()> {
        if let Err(e) = resolution.validate() {
            engine_bail!("lumina::AttachmentSet", e);
        }
        let attachments =
            Self::allocate(self.device.as_ref(), &self.formats, resolution, self.frame_index)?;

        engine_info!("lumina::AttachmentSet",
            "Resized attachment set {}x{} -> {}x{} (layout {} -> {})",
            self.resolution.width, self.resolution.height,
            resolution.width, resolution.height, self.layout_id, layout_id);

        self.attachments = attachments;
        self.resolution = resolution;
        self.layout_id = layout_id;
        Ok(())
    }

    /// Look up an attachment
    pub fn attachment(&self, id: AttachmentId) -> Option<&Attachment> {
        self.attachments.get(id.index()).filter(|a| a.id == id)
    }

    /// Look up an attachment, failing with `InvalidResource` when unknown
    pub fn get(&self, id: AttachmentId) -> Result<&Attachment> {
        self.attachment(id).ok_or_else(|| engine_err!("lumina::AttachmentSet",
            Error::InvalidResource(format!("unknown attachment {}", id))))
    }

    pub fn attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments.iter()
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn layout_id(&self) -> u64 {
        self.layout_id
    }

    /// Convention the geometry pass stores normals with
    pub fn normal_encoding(&self) -> NormalEncoding {
        self.normal_encoding
    }

    /// Slot in the owning FrameRing, 0 for a standalone set
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }
}

impl fmt::Debug for AttachmentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentSet")
            .field("resolution", &self.resolution)
            .field("layout_id", &self.layout_id)
            .field("frame_index", &self.frame_index)
            .field("normal_encoding", &self.normal_encoding)
            .field("attachments", &self.attachments)
            .finish()
    }
}

#[cfg(test)]
#[path = "attachment_set_tests.rs"]
mod tests;
