/// Graphics device module - abstract device interface consumed by the pipeline

pub mod graphics_device;
pub mod texture;
pub mod program;
pub mod command_list;
pub mod render_pass;

pub use graphics_device::*;
pub use texture::*;
pub use program::*;
pub use command_list::*;
pub use render_pass::*;

// Mock graphics device for tests (no backend required)
#[cfg(test)]
pub mod mock_graphics_device;
