/// Mock graphics device for unit tests (no backend required)
///
/// Textures and programs only carry their descriptors. The command list
/// records one string per command into a shared log so tests can inspect it
/// after handing the list to an executor.

#[cfg(test)]
use std::any::Any;
#[cfg(test)]
use std::sync::{Arc, Mutex};
#[cfg(test)]
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(test)]
use crate::graphics_device::{
    GraphicsDevice, DeviceStats, Texture, TextureDesc, TextureInfo, Program,
    ProgramDesc, CommandList, RenderPassBegin, TextureBarrier, ShaderStages,
    Viewport, Rect2D,
};
#[cfg(test)]
use crate::error::{Error, Result};

// ============================================================================
// Mock Texture
// ============================================================================

#[cfg(test)]
#[derive(Debug)]
pub struct MockTexture {
    pub info: TextureInfo,
}

#[cfg(test)]
impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Mock Program
// ============================================================================

#[cfg(test)]
#[derive(Debug)]
pub struct MockProgram {
    pub desc: ProgramDesc,
}

#[cfg(test)]
impl MockProgram {
    pub fn new(desc: ProgramDesc) -> Arc<dyn Program> {
        Arc::new(Self { desc })
    }
}

#[cfg(test)]
impl Program for MockProgram {
    fn desc(&self) -> &ProgramDesc {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Mock CommandList
// ============================================================================

#[cfg(test)]
pub type CommandLog = Arc<Mutex<Vec<String>>>;

#[cfg(test)]
pub struct MockCommandList {
    pub commands: CommandLog,
    recording: bool,
    fail_on: Option<String>,
}

#[cfg(test)]
impl MockCommandList {
    pub fn new() -> (Self, CommandLog) {
        let commands: CommandLog = Arc::new(Mutex::new(Vec::new()));
        (Self { commands: commands.clone(), recording: false, fail_on: None }, commands)
    }

    /// List whose commands starting with `prefix` fail with `BackendError`
    /// and are not recorded
    pub fn failing_on(prefix: &str) -> (Self, CommandLog) {
        let (mut list, commands) = Self::new();
        list.fail_on = Some(prefix.to_string());
        (list, commands)
    }

    fn record(&self, command: String) -> Result<()> {
        if let Some(prefix) = &self.fail_on {
            if command.starts_with(prefix.as_str()) {
                return Err(Error::BackendError(format!("mock failure on '{}'", command)));
            }
        }
        self.commands.lock().unwrap().push(command);
        Ok(())
    }
}

#[cfg(test)]
impl CommandList for MockCommandList {
    fn begin(&mut self) -> Result<()> {
        if self.recording {
            return Err(Error::InvalidState("command list already recording".to_string()));
        }
        self.record("begin".to_string())?;
        self.recording = true;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        if !self.recording {
            return Err(Error::InvalidState("command list not recording".to_string()));
        }
        self.record("end".to_string())?;
        self.recording = false;
        Ok(())
    }

    fn pipeline_barrier(&mut self, barriers: &[TextureBarrier]) -> Result<()> {
        self.record(format!("pipeline_barrier:{}", barriers.len()))
    }

    fn begin_render_pass(&mut self, begin: &RenderPassBegin) -> Result<()> {
        self.record(format!("begin_render_pass:{}", begin.name))
    }

    fn end_render_pass(&mut self) -> Result<()> {
        self.record("end_render_pass".to_string())
    }

    fn set_viewport(&mut self, _viewport: Viewport) -> Result<()> {
        self.record("set_viewport".to_string())
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        self.record(format!(
            "set_scissor:{},{},{},{}",
            scissor.x, scissor.y, scissor.width, scissor.height
        ))
    }

    fn bind_program(&mut self, program: &Arc<dyn Program>) -> Result<()> {
        self.record(format!("bind_program:{}", program.desc().name))
    }

    fn push_constants(&mut self, _stages: ShaderStages, _offset: u32, data: &[u8]) -> Result<()> {
        self.record(format!("push_constants:{}", data.len()))
    }

    fn draw(&mut self, vertex_count: u32, _first_vertex: u32) -> Result<()> {
        self.record(format!("draw:{}", vertex_count))
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

#[cfg(test)]
#[derive(Default)]
pub struct MockGraphicsDevice {
    textures_created: AtomicU64,
    programs_created: AtomicU64,
    command_lists_created: AtomicU64,
}

#[cfg(test)]
impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl GraphicsDevice for MockGraphicsDevice {
    fn create_texture(&self, desc: TextureDesc) -> Result<Arc<dyn Texture>> {
        if desc.width == 0 || desc.height == 0 {
            return Err(Error::InvalidResolution { width: desc.width, height: desc.height });
        }
        self.textures_created.fetch_add(1, Ordering::Relaxed);
        Ok(Arc::new(MockTexture { info: TextureInfo::from(&desc) }))
    }

    fn create_program(&self, desc: ProgramDesc) -> Result<Arc<dyn Program>> {
        self.programs_created.fetch_add(1, Ordering::Relaxed);
        Ok(MockProgram::new(desc))
    }

    fn create_command_list(&self) -> Result<Box<dyn CommandList>> {
        self.command_lists_created.fetch_add(1, Ordering::Relaxed);
        let (list, _) = MockCommandList::new();
        Ok(Box::new(list))
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
#[path = "mock_graphics_device_tests.rs"]
mod tests;
