/// FrameRing - one AttachmentSet per frame in flight
///
/// Siblings share a layout stamp, so one SubpassGraph serves every slot.
/// A set is handed out by `acquire` and must come back through `release`
/// before its slot can be acquired again.

use std::sync::Arc;
use crate::attachment::{AttachmentSet, Resolution};
use crate::attachment::attachment_set::next_layout_id;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::graphics_device::GraphicsDevice;
use crate::{engine_bail, engine_debug, engine_error};

pub struct FrameRing {
    slots: Vec<Option<AttachmentSet>>,
    current: usize,
    layout_id: u64,
    resolution: Resolution,
}

impl FrameRing {
    /// Allocate `config.frames_in_flight` sibling sets
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        resolution: Resolution,
        config: &PipelineConfig,
    ) -> Result<Self> {
        if config.frames_in_flight == 0 {
            engine_bail!("lumina::FrameRing",
                Error::InvalidResource("frames_in_flight must be at least 1".to_string()));
        }
        let layout_id = next_layout_id();
        let mut slots = Vec::with_capacity(config.frames_in_flight);
        for frame_index in 0..config.frames_in_flight {
            let set = AttachmentSet::create_with_layout(
                device.clone(), resolution, config, layout_id, frame_index)?;
            slots.push(Some(set));
        }
        Ok(Self { slots, current: 0, layout_id, resolution })
    }

    /// Hand out the set of the current slot
    ///
    /// # Errors
    ///
    /// `InvalidState` if that set has not been released yet.
    pub fn acquire(&mut self) -> Result<AttachmentSet> {
        match self.slots[self.current].take() {
            Some(set) => Ok(set),
            None => engine_bail!("lumina::FrameRing",
                Error::InvalidState(format!("frame slot {} is already acquired", self.current))),
        }
    }

    /// Return a set to its slot
    pub fn release(&mut self, set: AttachmentSet) -> Result<()> {
        let index = set.frame_index();
        if set.layout_id() != self.layout_id {
            engine_bail!("lumina::FrameRing", Error::InvalidResource(format!(
                "set layout {} does not belong to ring layout {}", set.layout_id(), self.layout_id)));
        }
        let Some(slot) = self.slots.get_mut(index) else {
            engine_bail!("lumina::FrameRing",
                Error::InvalidResource(format!("frame slot {} out of range", index)));
        };
        if slot.is_some() {
            engine_bail!("lumina::FrameRing",
                Error::InvalidState(format!("frame slot {} was not acquired", index)));
        }
        *slot = Some(set);
        Ok(())
    }

    /// Move to the next slot, `(current + 1) % len`
    pub fn advance(&mut self) -> usize {
        self.current = (self.current + 1) % self.slots.len();
        self.current
    }

    /// Reallocate every sibling under a fresh shared stamp
    ///
    /// # Errors
    ///
    /// `InvalidState` while any set is acquired, `InvalidResolution` for a
    /// zero dimension.
    pub fn resize(&mut self, resolution: Resolution) -> Result<()> {
        if let Some(index) = self.slots.iter().position(Option::is_none) {
            engine_bail!("lumina::FrameRing",
                Error::InvalidState(format!("cannot resize while frame slot {} is acquired", index)));
        }
        if let Err(e) = resolution.validate() {
            engine_bail!("lumina::FrameRing", e);
        }
        let layout_id = next_layout_id();
        let mut resized = 0;
        let mut failure = None;
        for set in self.slots.iter_mut().flatten() {
            if let Err(e) = set.resize_with_layout(resolution, layout_id) {
                failure = Some(e);
                break;
            }
            resized += 1;
        }
        if let Some(e) = failure {
            // Siblings must keep sharing one stamp
            for set in self.slots.iter_mut().flatten().take(resized) {
                if let Err(restore) = set.resize_with_layout(self.resolution, self.layout_id) {
                    engine_error!("lumina::FrameRing",
                        "Restoring frame slot {} after a failed resize failed: {}",
                        set.frame_index(), restore);
                }
            }
            return Err(e);
        }
        engine_debug!("lumina::FrameRing",
            "Ring of {} resized to {}x{} (layout {})",
            self.slots.len(), resolution.width, resolution.height, layout_id);
        self.layout_id = layout_id;
        self.resolution = resolution;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_available(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Some(_)))
    }

    pub fn layout_id(&self) -> u64 {
        self.layout_id
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }
}

#[cfg(test)]
#[path = "frame_ring_tests.rs"]
mod tests;
