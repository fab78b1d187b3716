/// PipelineExecutor - walks a SubpassGraph one pass at a time
///
/// State machine: Idle -> PassActive (pass 0 .. N-1) -> Ended. The executor
/// owns the AttachmentSet from `begin` until the frame has ended and
/// `take_attachments` hands it back; nothing else can read it mid-frame.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::attachment::{AttachmentSet, FormatClass};
use crate::dispatch::ParameterBlock;
use crate::error::{Error, Result};
use crate::graphics_device::{
    CommandList, InputAttachmentBinding, LoadOp, Program, Rect2D,
    RenderPassBegin, RenderTargetBinding, ShaderStages, StoreOp, TextureBarrier,
    Viewport,
};
use crate::render_graph::{CompiledPass, LoadPolicy, SubpassGraph};
use crate::{engine_bail, engine_debug, engine_err, engine_trace, engine_warn};

/// Executor state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    /// No frame recorded yet
    Idle,
    /// A pass is open and accepts draws
    PassActive,
    /// The last pass has been closed
    Ended,
}

/// Vertex range of one draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub vertex_count: u32,
    pub first_vertex: u32,
}

impl DrawCall {
    /// Single triangle covering the whole viewport
    pub const FULLSCREEN_TRIANGLE: DrawCall = DrawCall { vertex_count: 3, first_vertex: 0 };
}

/// Counters for the current frame, reset by `begin`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub passes: u32,
    pub draws: u32,
    pub program_binds: u32,
    pub parameter_bytes: u64,
}

pub struct PipelineExecutor {
    command_list: Box<dyn CommandList>,
    programs: FxHashMap<String, Arc<dyn Program>>,
    state: ExecutorState,
    graph: Option<Arc<SubpassGraph>>,
    attachments: Option<AttachmentSet>,
    /// Program each pass starts with, resolved by `begin`
    pass_programs: Vec<Option<Arc<dyn Program>>>,
    pass_index: usize,
    render_pass_open: bool,
    bound_program: Option<Arc<dyn Program>>,
    stats: FrameStats,
}

impl PipelineExecutor {
    pub fn new(command_list: Box<dyn CommandList>) -> Self {
        Self {
            command_list,
            programs: FxHashMap::default(),
            state: ExecutorState::Idle,
            graph: None,
            attachments: None,
            pass_programs: Vec::new(),
            pass_index: 0,
            render_pass_open: false,
            bound_program: None,
            stats: FrameStats::default(),
        }
    }

    /// Make a program available to passes declaring it by name
    pub fn register_program(&mut self, program: Arc<dyn Program>) {
        self.programs.insert(program.desc().name.clone(), program);
    }

    pub fn program(&self, name: &str) -> Option<&Arc<dyn Program>> {
        self.programs.get(name)
    }

    // ===== FRAME CONTROL =====

    /// Start a frame: take ownership of `attachments` and open pass 0
    ///
    /// A set still held from an ended frame is dropped. On any error the
    /// executor is left Idle, holding the set so it can be taken back, with
    /// the command list no longer recording.
    ///
    /// # Errors
    ///
    /// - `InvalidState` while a frame is in progress
    /// - `StaleGraph` when the graph was built against another layout
    /// - `InvalidResource` when a pass names an unregistered program
    /// - `EncodingMismatch` when a pass program declares another normal
    ///   convention than the set
    pub fn begin(&mut self, graph: Arc<SubpassGraph>, attachments: AttachmentSet) -> Result<()> {
        if self.state == ExecutorState::PassActive {
            engine_bail!("lumina::PipelineExecutor", Error::InvalidState(format!(
                "begin while pass {} is active; a frame is atomic", self.pass_index)));
        }
        if let Some(previous) = self.attachments.take() {
            engine_warn!("lumina::PipelineExecutor",
                "Dropping attachment set (layout {}) that was never taken back", previous.layout_id());
        }

        let compatible = graph.check_compatible(&attachments);
        self.attachments = Some(attachments);
        self.state = ExecutorState::Idle;
        self.graph = None;
        compatible?;

        // Nothing is recorded until every pass program is known to bind
        self.pass_programs = self.resolve_pass_programs(&graph)?;
        self.graph = Some(graph);
        self.pass_index = 0;
        self.render_pass_open = false;
        self.bound_program = None;
        self.stats = FrameStats::default();

        self.command_list.begin()?;
        if let Err(e) = self.open_pass(0) {
            self.abort_frame();
            return Err(e);
        }
        self.state = ExecutorState::PassActive;
        Ok(())
    }

    /// Close the current pass and open the next one, or end the frame after
    /// the last pass
    ///
    /// # Errors
    ///
    /// `InvalidState` outside PassActive, including after the last pass.
    /// A backend failure aborts the frame and leaves the executor Idle.
    pub fn advance(&mut self) -> Result<()> {
        if self.state != ExecutorState::PassActive {
            engine_bail!("lumina::PipelineExecutor", Error::InvalidState(format!(
                "advance in state {:?}", self.state)));
        }
        let result = self.advance_pass();
        if result.is_err() {
            self.abort_frame();
        }
        result
    }

    fn advance_pass(&mut self) -> Result<()> {
        let pass_count = self.active_graph()?.pass_count();

        self.command_list.end_render_pass()?;
        self.render_pass_open = false;
        self.bound_program = None;
        engine_debug!("lumina::PipelineExecutor", "Closed pass {}", self.pass_index);

        if self.pass_index + 1 < pass_count {
            self.pass_index += 1;
            self.open_pass(self.pass_index)?;
        } else {
            self.command_list.end()?;
            self.state = ExecutorState::Ended;
            engine_debug!("lumina::PipelineExecutor",
                "Frame ended: {} passes, {} draws, {} binds",
                self.stats.passes, self.stats.draws, self.stats.program_binds);
        }
        Ok(())
    }

    /// Finish the frame
    ///
    /// No-op once Ended. On the last pass this closes it. Earlier passes
    /// cannot be skipped.
    pub fn end(&mut self) -> Result<()> {
        match self.state {
            ExecutorState::Ended => Ok(()),
            ExecutorState::PassActive => {
                let pass_count = self.active_graph()?.pass_count();
                if self.pass_index + 1 == pass_count {
                    self.advance()
                } else {
                    engine_bail!("lumina::PipelineExecutor", Error::InvalidState(format!(
                        "end on pass {} of {}; remaining passes cannot be skipped",
                        self.pass_index, pass_count)));
                }
            }
            ExecutorState::Idle => engine_bail!("lumina::PipelineExecutor",
                Error::InvalidState("end without begin".to_string())),
        }
    }

    /// Give the attachment set back once no pass is active
    pub fn take_attachments(&mut self) -> Result<AttachmentSet> {
        if self.state == ExecutorState::PassActive {
            engine_bail!("lumina::PipelineExecutor", Error::InvalidState(
                "attachments are exclusively owned until the frame ends".to_string()));
        }
        self.attachments.take().ok_or_else(|| engine_err!("lumina::PipelineExecutor",
            Error::InvalidState("no attachment set held".to_string())))
    }

    // ===== DRAWING =====

    /// Bind `program` for subsequent draws in the current pass
    ///
    /// Returns `false` when the same program is already bound.
    ///
    /// # Errors
    ///
    /// `InvalidState` outside PassActive, `EncodingMismatch` when the program
    /// declares a normal convention other than the attachment set's.
    pub fn bind_program(&mut self, program: &Arc<dyn Program>) -> Result<bool> {
        self.require_active("bind_program")?;
        self.bind_program_in_pass(program)
    }

    fn bind_program_in_pass(&mut self, program: &Arc<dyn Program>) -> Result<bool> {
        if let Some(bound) = &self.bound_program {
            if Arc::ptr_eq(bound, program) {
                return Ok(false);
            }
        }
        if let (Some(expected), Some(attachments)) = (program.desc().normal_encoding, &self.attachments) {
            if expected != attachments.normal_encoding() {
                engine_bail!("lumina::PipelineExecutor", Error::EncodingMismatch {
                    context: format!("program '{}'", program.desc().name),
                    expected,
                    actual: attachments.normal_encoding(),
                });
            }
        }
        self.command_list.bind_program(program)?;
        self.bound_program = Some(program.clone());
        self.stats.program_binds += 1;
        engine_trace!("lumina::PipelineExecutor", "Bound program '{}'", program.desc().name);
        Ok(true)
    }

    /// Push `block` and draw a full-screen triangle
    pub fn submit_draw(&mut self, block: &ParameterBlock) -> Result<()> {
        self.submit_draw_with(block, DrawCall::FULLSCREEN_TRIANGLE)
    }

    /// Push `block` and issue `draw`
    ///
    /// # Errors
    ///
    /// - `InvalidState` outside PassActive or with no program bound
    /// - `InvalidParameter` when the bound program's push-constant range is
    ///   smaller than a ParameterBlock
    pub fn submit_draw_with(&mut self, block: &ParameterBlock, draw: DrawCall) -> Result<()> {
        self.require_active("submit_draw")?;
        let program = self.require_program()?;
        if program.desc().push_constant_size < ParameterBlock::SIZE {
            engine_bail!("lumina::PipelineExecutor", Error::InvalidParameter(format!(
                "program '{}' has a {} byte push-constant range, parameter block needs {}",
                program.desc().name, program.desc().push_constant_size, ParameterBlock::SIZE)));
        }
        let bytes = block.as_bytes();
        self.command_list.push_constants(ShaderStages::FRAGMENT, 0, bytes)?;
        self.stats.parameter_bytes += bytes.len() as u64;
        self.issue(draw)
    }

    /// Issue `draw` without parameters (compose, tonemap)
    pub fn draw(&mut self, draw: DrawCall) -> Result<()> {
        self.require_active("draw")?;
        self.require_program()?;
        self.issue(draw)
    }

    fn issue(&mut self, draw: DrawCall) -> Result<()> {
        self.command_list.draw(draw.vertex_count, draw.first_vertex)?;
        self.stats.draws += 1;
        Ok(())
    }

    /// Restrict subsequent draws to `scissor` (light volumes)
    pub fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        self.require_active("set_scissor")?;
        self.command_list.set_scissor(scissor)
    }

    /// Scissor covering the whole frame
    pub fn full_scissor(&self) -> Option<Rect2D> {
        let resolution = self.attachments.as_ref()?.resolution();
        Some(Rect2D::full(resolution.width, resolution.height))
    }

    // ===== OBSERVERS =====

    pub fn state(&self) -> ExecutorState {
        self.state
    }

    pub fn pass_index(&self) -> usize {
        self.pass_index
    }

    /// Pass currently open, if any
    pub fn current_pass(&self) -> Option<&CompiledPass> {
        if self.state != ExecutorState::PassActive {
            return None;
        }
        self.graph.as_ref()?.pass(self.pass_index)
    }

    pub fn graph(&self) -> Option<&Arc<SubpassGraph>> {
        self.graph.as_ref()
    }

    pub fn attachments(&self) -> Option<&AttachmentSet> {
        self.attachments.as_ref()
    }

    pub fn bound_program(&self) -> Option<&Arc<dyn Program>> {
        self.bound_program.as_ref()
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    // ===== INTERNALS =====

    /// Look up every pass program and check it against the held set
    fn resolve_pass_programs(&self, graph: &SubpassGraph) -> Result<Vec<Option<Arc<dyn Program>>>> {
        let encoding = self.attachments.as_ref().map(|a| a.normal_encoding());
        let mut programs = Vec::with_capacity(graph.pass_count());
        for (index, pass) in graph.passes().iter().enumerate() {
            let Some(name) = pass.descriptor().program_name() else {
                programs.push(None);
                continue;
            };
            let program = self.programs.get(name).cloned().ok_or_else(|| engine_err!(
                "lumina::PipelineExecutor",
                Error::InvalidResource(format!("program '{}' of pass {} is not registered", name, index))))?;
            if let (Some(expected), Some(actual)) = (program.desc().normal_encoding, encoding) {
                if expected != actual {
                    engine_bail!("lumina::PipelineExecutor", Error::EncodingMismatch {
                        context: format!("program '{}' of pass {}", name, index),
                        expected,
                        actual,
                    });
                }
            }
            programs.push(Some(program));
        }
        Ok(programs)
    }

    /// Close what a failed frame left open; the set stays held
    fn abort_frame(&mut self) {
        if self.render_pass_open {
            if let Err(e) = self.command_list.end_render_pass() {
                engine_warn!("lumina::PipelineExecutor",
                    "Closing pass {} of an aborted frame failed: {}", self.pass_index, e);
            }
            self.render_pass_open = false;
        }
        if let Err(e) = self.command_list.end() {
            engine_warn!("lumina::PipelineExecutor", "Ending an aborted frame failed: {}", e);
        }
        engine_warn!("lumina::PipelineExecutor", "Frame aborted at pass {}", self.pass_index);
        self.state = ExecutorState::Idle;
        self.graph = None;
        self.pass_programs.clear();
        self.bound_program = None;
    }

    fn require_active(&self, operation: &str) -> Result<()> {
        if self.state != ExecutorState::PassActive {
            engine_bail!("lumina::PipelineExecutor", Error::InvalidState(format!(
                "{} requires an active pass, executor is {:?}", operation, self.state)));
        }
        Ok(())
    }

    fn require_program(&self) -> Result<Arc<dyn Program>> {
        self.bound_program.clone().ok_or_else(|| engine_err!("lumina::PipelineExecutor",
            Error::InvalidState(format!("no program bound in pass {}", self.pass_index))))
    }

    fn active_graph(&self) -> Result<Arc<SubpassGraph>> {
        self.graph.clone().ok_or_else(|| engine_err!("lumina::PipelineExecutor",
            Error::InvalidState("no graph bound".to_string())))
    }

    fn open_pass(&mut self, index: usize) -> Result<()> {
        let graph = self.active_graph()?;
        let pass = graph.pass(index).ok_or_else(|| engine_err!("lumina::PipelineExecutor",
            Error::InvalidState(format!("pass {} out of range", index))))?;
        let descriptor = pass.descriptor();

        let attachments = self.attachments.as_ref().ok_or_else(|| engine_err!(
            "lumina::PipelineExecutor", Error::InvalidState("no attachment set held".to_string())))?;

        let mut barriers = Vec::with_capacity(pass.transitions().len());
        for transition in pass.transitions() {
            barriers.push(TextureBarrier {
                texture: attachments.get(transition.attachment)?.texture().clone(),
                from: transition.from,
                to: transition.to,
            });
        }

        let mut color_targets = Vec::new();
        let mut depth_target = None;
        for output in descriptor.outputs() {
            let attachment = attachments.get(output.attachment)?;
            let (load_op, clear_value) = match output.load {
                LoadPolicy::Clear(value) => (LoadOp::Clear, Some(value)),
                LoadPolicy::Preserve => (LoadOp::Load, None),
            };
            let binding = RenderTargetBinding {
                texture: attachment.texture().clone(),
                load_op,
                store_op: StoreOp::Store,
                clear_value,
            };
            match attachment.format_class() {
                FormatClass::ColorLinearRgba => color_targets.push(binding),
                FormatClass::Depth => depth_target = Some(binding),
            }
        }

        let mut inputs = Vec::with_capacity(descriptor.inputs().len());
        for input in descriptor.inputs() {
            inputs.push(InputAttachmentBinding {
                slot: input.slot,
                texture: attachments.get(input.attachment)?.texture().clone(),
            });
        }

        let resolution = attachments.resolution();
        let begin = RenderPassBegin {
            name: descriptor.name().to_string(),
            color_targets,
            depth_target,
            inputs,
            render_area: Rect2D::full(resolution.width, resolution.height),
        };

        if !barriers.is_empty() {
            self.command_list.pipeline_barrier(&barriers)?;
        }
        self.command_list.begin_render_pass(&begin)?;
        self.render_pass_open = true;
        self.command_list.set_viewport(Viewport::full(resolution.width, resolution.height))?;
        self.command_list.set_scissor(begin.render_area)?;
        self.stats.passes += 1;

        let clears = descriptor.outputs().iter().filter(|o| o.load.is_clear()).count();
        engine_debug!("lumina::PipelineExecutor",
            "Opened pass {} '{}' ({:?}): {} inputs, {} outputs ({} cleared), {} transitions",
            index, descriptor.name(), descriptor.kind(), descriptor.inputs().len(),
            descriptor.outputs().len(), clears, barriers.len());

        // Passes that declare a program start with it bound
        if let Some(program) = self.pass_programs.get(index).cloned().flatten() {
            self.bind_program_in_pass(&program)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "pipeline_executor_tests.rs"]
mod tests;
