/// CpuCommandList - executes commands immediately on host textures
///
/// Every draw rasterizes the full-screen triangle over the render area
/// clipped by the scissor. Writes land in the target textures at once, so a
/// later pass sees them as soon as the current pass has ended.

use std::sync::Arc;
use glam::Vec4;
use lumina_deferred::lumina::device::{
    BlendMode, ClearValue, CommandList, LoadOp, Program, Rect2D, RenderPassBegin,
    RenderTargetBinding, ShaderStages, Texture, TextureBarrier, Viewport,
};
use lumina_deferred::lumina::render::ParameterBlock;
use lumina_deferred::lumina::{Error, Result};
use lumina_deferred::{engine_bail, engine_err, engine_trace};
use crate::cpu_program::{CpuProgram, FragmentInput};
use crate::cpu_texture::CpuTexture;

/// Counters over the command list lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandStats {
    pub render_passes: u32,
    pub barriers: u32,
    pub draws: u32,
    pub fragments: u64,
}

struct ActivePass {
    name: String,
    color_targets: Vec<Arc<dyn Texture>>,
    depth_target: Option<Arc<dyn Texture>>,
    inputs: Vec<(u32, Arc<dyn Texture>)>,
    render_area: Rect2D,
}

pub struct CpuCommandList {
    recording: bool,
    pass: Option<ActivePass>,
    program: Option<Arc<dyn Program>>,
    push_constants: Vec<u8>,
    viewport: Option<Viewport>,
    scissor: Option<Rect2D>,
    stats: CommandStats,
}

fn cpu_texture(texture: &Arc<dyn Texture>) -> Result<&CpuTexture> {
    CpuTexture::downcast(texture).ok_or_else(|| engine_err!("lumina::cpu",
        Error::InvalidResource(format!("texture '{}' was not created by the CPU device", texture.info().name))))
}

fn clear_texel(target: &RenderTargetBinding) -> Result<Vec4> {
    let is_depth = target.texture.info().format.is_depth();
    match (target.clear_value, is_depth) {
        (Some(ClearValue::Color(rgba)), false) => Ok(Vec4::from_array(rgba)),
        (Some(ClearValue::DepthStencil { depth, .. }), true) => Ok(Vec4::new(depth, 0.0, 0.0, 0.0)),
        (value, _) => engine_bail!("lumina::cpu", Error::InvalidParameter(format!(
            "clear value {:?} does not fit target '{}'", value, target.texture.info().name))),
    }
}

fn blend(mode: BlendMode, dst: Vec4, src: Vec4) -> Vec4 {
    match mode {
        BlendMode::Replace => src,
        BlendMode::Additive => (dst.truncate() + src.truncate()).extend(dst.w.max(src.w)),
    }
}

impl CpuCommandList {
    pub fn new() -> Self {
        Self {
            recording: false,
            pass: None,
            program: None,
            push_constants: Vec::new(),
            viewport: None,
            scissor: None,
            stats: CommandStats::default(),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn stats(&self) -> CommandStats {
        self.stats
    }

    fn require_pass(&self, operation: &str) -> Result<&ActivePass> {
        self.pass.as_ref().ok_or_else(|| engine_err!("lumina::cpu",
            Error::InvalidState(format!("{} outside a render pass", operation))))
    }

    /// Pixels a draw covers: render area, viewport and scissor intersected
    fn coverage(&self, pass: &ActivePass) -> Option<Rect2D> {
        let mut area = pass.render_area;
        if let Some(viewport) = self.viewport {
            let viewport_rect = Rect2D {
                x: viewport.x.floor() as i32,
                y: viewport.y.floor() as i32,
                width: viewport.width.max(0.0).ceil() as u32,
                height: viewport.height.max(0.0).ceil() as u32,
            };
            area = area.intersect(&viewport_rect)?;
        }
        if let Some(scissor) = self.scissor {
            area = area.intersect(&scissor)?;
        }
        Some(area)
    }
}

impl Default for CpuCommandList {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandList for CpuCommandList {
    fn begin(&mut self) -> Result<()> {
        if self.recording {
            engine_bail!("lumina::cpu", Error::InvalidState("command list already recording".to_string()));
        }
        self.recording = true;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        if !self.recording {
            engine_bail!("lumina::cpu", Error::InvalidState("command list not recording".to_string()));
        }
        if let Some(pass) = &self.pass {
            engine_bail!("lumina::cpu", Error::InvalidState(format!(
                "end while render pass '{}' is open", pass.name)));
        }
        self.recording = false;
        Ok(())
    }

    fn pipeline_barrier(&mut self, barriers: &[TextureBarrier]) -> Result<()> {
        if !self.recording {
            engine_bail!("lumina::cpu", Error::InvalidState("barrier outside recording".to_string()));
        }
        // Host writes are visible immediately; layouts are only traced
        for barrier in barriers {
            cpu_texture(&barrier.texture)?;
            engine_trace!("lumina::cpu", "Barrier '{}': {:?} -> {:?}",
                barrier.texture.info().name, barrier.from, barrier.to);
        }
        self.stats.barriers += barriers.len() as u32;
        Ok(())
    }

    fn begin_render_pass(&mut self, begin: &RenderPassBegin) -> Result<()> {
        if !self.recording {
            engine_bail!("lumina::cpu", Error::InvalidState(format!(
                "render pass '{}' begun outside recording", begin.name)));
        }
        if let Some(pass) = &self.pass {
            engine_bail!("lumina::cpu", Error::InvalidState(format!(
                "render pass '{}' begun inside '{}'", begin.name, pass.name)));
        }

        let targets = begin.color_targets.iter().chain(begin.depth_target.iter());
        for target in targets {
            let texture = cpu_texture(&target.texture)?;
            if target.load_op == LoadOp::Clear {
                texture.fill(clear_texel(target)?);
            }
        }
        for input in &begin.inputs {
            cpu_texture(&input.texture)?;
        }

        self.pass = Some(ActivePass {
            name: begin.name.clone(),
            color_targets: begin.color_targets.iter().map(|t| t.texture.clone()).collect(),
            depth_target: begin.depth_target.as_ref().map(|t| t.texture.clone()),
            inputs: begin.inputs.iter().map(|i| (i.slot, i.texture.clone())).collect(),
            render_area: begin.render_area,
        });
        self.viewport = None;
        self.scissor = None;
        self.stats.render_passes += 1;
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        self.require_pass("end_render_pass")?;
        self.pass = None;
        self.program = None;
        self.push_constants.clear();
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.require_pass("set_viewport")?;
        self.viewport = Some(viewport);
        Ok(())
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        self.require_pass("set_scissor")?;
        self.scissor = Some(scissor);
        Ok(())
    }

    fn bind_program(&mut self, program: &Arc<dyn Program>) -> Result<()> {
        self.require_pass("bind_program")?;
        if CpuProgram::downcast(program).is_none() {
            engine_bail!("lumina::cpu", Error::InvalidResource(format!(
                "program '{}' was not created by the CPU device", program.desc().name)));
        }
        self.program = Some(program.clone());
        self.push_constants = vec![0; program.desc().push_constant_size as usize];
        Ok(())
    }

    fn push_constants(&mut self, stages: ShaderStages, offset: u32, data: &[u8]) -> Result<()> {
        self.require_pass("push_constants")?;
        if !stages.contains(ShaderStages::FRAGMENT) {
            return Ok(());
        }
        let start = offset as usize;
        let end = start + data.len();
        let Some(range) = self.push_constants.get_mut(start..end) else {
            engine_bail!("lumina::cpu", Error::InvalidParameter(format!(
                "push constants {}..{} exceed the {} byte range", start, end, self.push_constants.len())));
        };
        range.copy_from_slice(data);
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, _first_vertex: u32) -> Result<()> {
        let pass = self.require_pass("draw")?;
        if vertex_count != 3 {
            engine_bail!("lumina::cpu", Error::InvalidParameter(format!(
                "only the full-screen triangle is supported, got {} vertices", vertex_count)));
        }
        let program = self.program.clone().ok_or_else(|| engine_err!("lumina::cpu",
            Error::InvalidState(format!("draw without a program in pass '{}'", pass.name))))?;
        let cpu_program = CpuProgram::downcast(&program).ok_or_else(|| engine_err!("lumina::cpu",
            Error::InvalidResource(format!("program '{}' is not a CPU program", program.desc().name))))?;

        let Some(area) = self.coverage(pass) else {
            self.stats.draws += 1;
            return Ok(());
        };

        let targets = pass.color_targets.iter().map(cpu_texture).collect::<Result<Vec<_>>>()?;
        let depth = pass.depth_target.as_ref().map(cpu_texture).transpose()?;
        let inputs = pass
            .inputs
            .iter()
            .map(|(slot, texture)| cpu_texture(texture).map(|t| (*slot, t)))
            .collect::<Result<Vec<_>>>()?;

        let parameters = ParameterBlock::from_bytes(&self.push_constants);
        let blend_mode = program.desc().blend;
        let normal_encoding = program.desc().normal_encoding;
        let mut samples = Vec::with_capacity(inputs.len());
        let mut fragments = 0u64;

        let x0 = area.x.max(0) as u32;
        let y0 = area.y.max(0) as u32;
        let x1 = (area.x as i64 + area.width as i64).max(0) as u32;
        let y1 = (area.y as i64 + area.height as i64).max(0) as u32;
        for y in y0..y1 {
            for x in x0..x1 {
                samples.clear();
                samples.extend(inputs.iter().map(|(slot, texture)| {
                    (*slot, texture.read_pixel(x, y).unwrap_or(Vec4::ZERO))
                }));
                let output = cpu_program.shade(&FragmentInput {
                    x,
                    y,
                    inputs: &samples,
                    parameters,
                    normal_encoding,
                });
                for (target, color) in targets.iter().zip(&output.colors) {
                    let dst = target.read_pixel(x, y).unwrap_or(Vec4::ZERO);
                    target.write_pixel(x, y, blend(blend_mode, dst, *color));
                }
                if let (Some(depth), Some(value)) = (depth, output.depth) {
                    depth.write_pixel(x, y, Vec4::new(value, 0.0, 0.0, 0.0));
                }
                fragments += 1;
            }
        }

        self.stats.draws += 1;
        self.stats.fragments += fragments;
        Ok(())
    }
}

#[cfg(test)]
#[path = "cpu_command_list_tests.rs"]
mod tests;
