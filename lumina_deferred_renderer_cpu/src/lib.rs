/*!
# Lumina Deferred - CPU Renderer Backend

Host-memory implementation of the lumina_deferred device traits.

Every command executes immediately on `Vec4` texel storage, quantized to
each texture's format. The backend exists to run the full deferred pipeline
deterministically in tests and tools without a GPU.
*/

mod cpu_texture;
mod cpu_program;
mod cpu_command_list;
mod cpu_graphics_device;
mod builtin_programs;

pub mod lumina {
    pub use crate::cpu_graphics_device::{CpuGraphicsDevice, FULLSCREEN_VERTEX_ENTRY};
    pub use crate::cpu_texture::{CpuTexture, quantize};
    pub use crate::cpu_program::{CpuProgram, FragmentInput, FragmentOutput, FragmentProgram};
    pub use crate::cpu_command_list::{CommandStats, CpuCommandList};

    /// Built-in deferred fragment programs and their descriptors
    pub mod programs {
        pub use crate::builtin_programs::*;
    }
}
