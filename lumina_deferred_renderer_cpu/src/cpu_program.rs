/// CpuProgram - fragment programs evaluated per pixel on the host
///
/// The only vertex stage is the full-screen triangle, so a program is fully
/// described by its fragment function.

use std::any::Any;
use std::sync::Arc;
use glam::Vec4;
use lumina_deferred::lumina::attachment::NormalEncoding;
use lumina_deferred::lumina::device::{Program, ProgramDesc};
use lumina_deferred::lumina::render::ParameterBlock;

/// Everything a fragment invocation can see
pub struct FragmentInput<'a> {
    /// Pixel coordinate inside the render area
    pub x: u32,
    pub y: u32,
    /// Input attachment samples as (slot, texel)
    pub inputs: &'a [(u32, Vec4)],
    /// Push constants decoded as a ParameterBlock, when enough were pushed
    pub parameters: Option<ParameterBlock>,
    /// Normal convention the program was created for
    pub normal_encoding: Option<NormalEncoding>,
}

impl FragmentInput<'_> {
    /// Sample bound at `slot`; zero when the pass binds nothing there
    pub fn input(&self, slot: u32) -> Vec4 {
        self.inputs
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, texel)| *texel)
            .unwrap_or(Vec4::ZERO)
    }
}

/// Result of one fragment invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FragmentOutput {
    /// One value per color target, in target order
    pub colors: Vec<Vec4>,
    /// Written to the depth target when present
    pub depth: Option<f32>,
}

impl FragmentOutput {
    pub fn color(color: Vec4) -> Self {
        Self { colors: vec![color], depth: None }
    }
}

/// Host-side fragment function
pub trait FragmentProgram: Send + Sync {
    fn shade(&self, input: &FragmentInput) -> FragmentOutput;
}

pub struct CpuProgram {
    desc: ProgramDesc,
    fragment: Arc<dyn FragmentProgram>,
}

impl CpuProgram {
    pub fn new(desc: ProgramDesc, fragment: Arc<dyn FragmentProgram>) -> Self {
        Self { desc, fragment }
    }

    pub fn downcast(program: &Arc<dyn Program>) -> Option<&CpuProgram> {
        program.as_any().downcast_ref::<CpuProgram>()
    }

    pub fn shade(&self, input: &FragmentInput) -> FragmentOutput {
        self.fragment.shade(input)
    }
}

impl Program for CpuProgram {
    fn desc(&self) -> &ProgramDesc {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
