/// DrawBatchDispatcher - one draw per light in a light accumulation pass
///
/// Lights are drawn in caller order. Additive blending makes the result
/// order-independent, but a fixed order keeps output reproducible.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::dispatch::{LightDescriptor, LightKind, ParameterBlock};
use crate::error::{Error, Result};
use crate::executor::{ExecutorState, PipelineExecutor};
use crate::graphics_device::{BlendMode, Program};
use crate::render_graph::PassKind;
use crate::{engine_bail, engine_err, engine_trace};

/// Program variant per light kind
pub struct LightProgramTable {
    programs: FxHashMap<LightKind, Arc<dyn Program>>,
}

impl LightProgramTable {
    /// Build a table; every program must blend additively
    pub fn new(entries: impl IntoIterator<Item = (LightKind, Arc<dyn Program>)>) -> Result<Self> {
        let mut programs = FxHashMap::default();
        for (kind, program) in entries {
            if program.desc().blend != BlendMode::Additive {
                engine_bail!("lumina::DrawBatchDispatcher", Error::InvalidResource(format!(
                    "light program '{}' for {:?} must blend additively", program.desc().name, kind)));
            }
            programs.insert(kind, program);
        }
        Ok(Self { programs })
    }

    pub fn get(&self, kind: LightKind) -> Option<&Arc<dyn Program>> {
        self.programs.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

/// Result of one dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub draws: u32,
    pub program_binds: u32,
}

pub struct DrawBatchDispatcher {
    table: LightProgramTable,
}

impl DrawBatchDispatcher {
    pub fn new(table: LightProgramTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &LightProgramTable {
        &self.table
    }

    /// Draw every light into the executor's current lighting pass
    ///
    /// All lights are checked before the first draw, so an invalid light
    /// anywhere in `lights` submits nothing.
    ///
    /// # Errors
    ///
    /// - `InvalidState` when the executor is not on an active lighting pass
    /// - `InvalidParameter` for an invalid light descriptor
    /// - `InvalidResource` when a light kind has no program
    /// - `EncodingMismatch` when a light kind or its program needs a normal
    ///   convention the attachment set does not use
    /// - `InvalidParameter` when a light program's push-constant range is
    ///   smaller than a ParameterBlock
    pub fn dispatch(&self, executor: &mut PipelineExecutor, lights: &[LightDescriptor]) -> Result<DispatchStats> {
        let kind = executor.current_pass().map(|p| p.descriptor().kind());
        if executor.state() != ExecutorState::PassActive || kind != Some(PassKind::Lighting) {
            engine_bail!("lumina::DrawBatchDispatcher", Error::InvalidState(format!(
                "light dispatch needs an active lighting pass (state {:?}, pass kind {:?})",
                executor.state(), kind)));
        }
        let encoding = executor
            .attachments()
            .map(|a| a.normal_encoding())
            .ok_or_else(|| engine_err!("lumina::DrawBatchDispatcher",
                Error::InvalidState("executor holds no attachment set".to_string())))?;
        let full_frame = executor.full_scissor().ok_or_else(|| engine_err!(
            "lumina::DrawBatchDispatcher",
            Error::InvalidState("executor holds no attachment set".to_string())))?;

        let mut plan = Vec::with_capacity(lights.len());
        for (index, light) in lights.iter().enumerate() {
            if let Err(e) = light.validate() {
                engine_bail!("lumina::DrawBatchDispatcher", e);
            }
            if let Some(required) = light.kind.required_encoding() {
                if required != encoding {
                    engine_bail!("lumina::DrawBatchDispatcher", Error::EncodingMismatch {
                        context: format!("light {} ({})", index, light.kind.name()),
                        expected: required,
                        actual: encoding,
                    });
                }
            }
            let program = self.table.get(light.kind).ok_or_else(|| engine_err!(
                "lumina::DrawBatchDispatcher",
                Error::InvalidResource(format!("no program for {} lights", light.kind.name()))))?;
            let desc = program.desc();
            if let Some(expected) = desc.normal_encoding {
                if expected != encoding {
                    engine_bail!("lumina::DrawBatchDispatcher", Error::EncodingMismatch {
                        context: format!("light {} program '{}'", index, desc.name),
                        expected,
                        actual: encoding,
                    });
                }
            }
            if desc.push_constant_size < ParameterBlock::SIZE {
                engine_bail!("lumina::DrawBatchDispatcher", Error::InvalidParameter(format!(
                    "light {} program '{}' has a {} byte push-constant range, parameter block needs {}",
                    index, desc.name, desc.push_constant_size, ParameterBlock::SIZE)));
            }
            plan.push((light, program));
        }

        let mut stats = DispatchStats::default();
        for (light, program) in plan {
            if executor.bind_program(program)? {
                stats.program_binds += 1;
            }
            let volume = match (light.kind, light.bounds) {
                (LightKind::PointColored, Some(bounds)) => Some(bounds),
                _ => None,
            };
            match volume {
                Some(bounds) => {
                    // A volume fully off screen draws nothing
                    let Some(clipped) = bounds.intersect(&full_frame) else {
                        continue;
                    };
                    executor.set_scissor(clipped)?;
                    executor.submit_draw(&ParameterBlock::from_light(light))?;
                    executor.set_scissor(full_frame)?;
                }
                None => executor.submit_draw(&ParameterBlock::from_light(light))?,
            }
            stats.draws += 1;
        }

        engine_trace!("lumina::DrawBatchDispatcher",
            "Dispatched {} lights: {} draws, {} program binds",
            lights.len(), stats.draws, stats.program_binds);
        Ok(stats)
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
