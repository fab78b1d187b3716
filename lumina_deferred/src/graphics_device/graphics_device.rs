/// GraphicsDevice trait - factory for device resources

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{
    Texture, TextureDesc, Program, ProgramDesc, CommandList,
};

/// Counters reported by a device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    /// Textures created over the device lifetime
    pub textures_created: u64,
    /// Programs created over the device lifetime
    pub programs_created: u64,
    /// Command lists created over the device lifetime
    pub command_lists_created: u64,
}

/// Graphics device trait
///
/// Implemented by backends (the CPU reference backend, GPU backends). The
/// pipeline core only ever talks to a device through this trait.
pub trait GraphicsDevice: Send + Sync {
    /// Allocate a texture
    ///
    /// # Errors
    ///
    /// Returns an error if the descriptor has a zero dimension or the backend
    /// cannot allocate the storage.
    fn create_texture(&self, desc: TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Compile or look up a program pair
    fn create_program(&self, desc: ProgramDesc) -> Result<Arc<dyn Program>>;

    /// Create a command list for recording one frame
    fn create_command_list(&self) -> Result<Box<dyn CommandList>>;

    /// Resource counters
    fn stats(&self) -> DeviceStats;
}
