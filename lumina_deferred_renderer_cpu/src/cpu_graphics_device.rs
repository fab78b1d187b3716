/// CpuGraphicsDevice - reference backend running every pass on the host
///
/// Programs resolve their fragment entry against a registry of host fragment
/// functions. The built-in deferred programs are registered by `new`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use rustc_hash::FxHashMap;
use lumina_deferred::lumina::device::{
    CommandList, DeviceStats, GraphicsDevice, Program, ProgramDesc, Texture, TextureDesc,
};
use lumina_deferred::lumina::{Error, Result};
use lumina_deferred::{engine_bail, engine_debug, engine_info};
use crate::builtin_programs::builtin_fragment_programs;
use crate::cpu_command_list::CpuCommandList;
use crate::cpu_program::{CpuProgram, FragmentProgram};
use crate::cpu_texture::CpuTexture;

/// Vertex entry every CPU program uses
pub const FULLSCREEN_VERTEX_ENTRY: &str = "fullscreen";

pub struct CpuGraphicsDevice {
    fragment_programs: RwLock<FxHashMap<String, Arc<dyn FragmentProgram>>>,
    textures_created: AtomicU64,
    programs_created: AtomicU64,
    command_lists_created: AtomicU64,
}

impl CpuGraphicsDevice {
    /// Device with the built-in deferred programs registered
    pub fn new() -> Self {
        let device = Self::empty();
        for (entry, program) in builtin_fragment_programs() {
            device.register_fragment_program(entry, program);
        }
        engine_info!("lumina::cpu", "CPU graphics device created with {} built-in programs",
            device.fragment_program_count());
        device
    }

    /// Device without any fragment program
    pub fn empty() -> Self {
        Self {
            fragment_programs: RwLock::new(FxHashMap::default()),
            textures_created: AtomicU64::new(0),
            programs_created: AtomicU64::new(0),
            command_lists_created: AtomicU64::new(0),
        }
    }

    /// Make `program` available as fragment entry `entry`, replacing any
    /// previous registration
    pub fn register_fragment_program(&self, entry: &str, program: Arc<dyn FragmentProgram>) {
        let mut programs = self.fragment_programs.write().unwrap_or_else(PoisonError::into_inner);
        if programs.insert(entry.to_string(), program).is_some() {
            engine_debug!("lumina::cpu", "Replaced fragment program '{}'", entry);
        }
    }

    pub fn has_fragment_program(&self, entry: &str) -> bool {
        self.fragment_programs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(entry)
    }

    pub fn fragment_program_count(&self) -> usize {
        self.fragment_programs.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for CpuGraphicsDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for CpuGraphicsDevice {
    fn create_texture(&self, desc: TextureDesc) -> Result<Arc<dyn Texture>> {
        if desc.width == 0 || desc.height == 0 {
            engine_bail!("lumina::cpu", Error::InvalidResolution { width: desc.width, height: desc.height });
        }
        self.textures_created.fetch_add(1, Ordering::Relaxed);
        engine_debug!("lumina::cpu", "Created texture '{}' {}x{} {:?}",
            desc.name, desc.width, desc.height, desc.format);
        Ok(Arc::new(CpuTexture::new(&desc)))
    }

    fn create_program(&self, desc: ProgramDesc) -> Result<Arc<dyn Program>> {
        if desc.vertex_entry != FULLSCREEN_VERTEX_ENTRY {
            engine_bail!("lumina::cpu", Error::InvalidResource(format!(
                "program '{}': unsupported vertex entry '{}'", desc.name, desc.vertex_entry)));
        }
        let fragment = self
            .fragment_programs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&desc.fragment_entry)
            .cloned();
        let Some(fragment) = fragment else {
            engine_bail!("lumina::cpu", Error::InvalidResource(format!(
                "program '{}': unknown fragment entry '{}'", desc.name, desc.fragment_entry)));
        };
        self.programs_created.fetch_add(1, Ordering::Relaxed);
        Ok(Arc::new(CpuProgram::new(desc, fragment)))
    }

    fn create_command_list(&self) -> Result<Box<dyn CommandList>> {
        self.command_lists_created.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(CpuCommandList::new()))
    }

    fn stats(&self) -> DeviceStats {
        DeviceStats {
            textures_created: self.textures_created.load(Ordering::Relaxed),
            programs_created: self.programs_created.load(Ordering::Relaxed),
            command_lists_created: self.command_lists_created.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
#[path = "cpu_graphics_device_tests.rs"]
mod tests;
