/// Program trait - a vertex/fragment pair plus its fixed pipeline state

use std::any::Any;
use crate::attachment::NormalEncoding;

bitflags::bitflags! {
    /// Shader stages that can receive push constants
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStages: u32 {
        const VERTEX = 1 << 0;
        const FRAGMENT = 1 << 1;
    }
}

/// Color blend applied to every color output of a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Output overwrites the target
    Replace,
    /// rgb = src + dst, alpha = max(src, dst)
    Additive,
}

/// Descriptor for creating a program
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramDesc {
    /// Unique program name
    pub name: String,
    /// Vertex entry point (backend-defined)
    pub vertex_entry: String,
    /// Fragment entry point (backend-defined)
    pub fragment_entry: String,
    /// Color blend mode
    pub blend: BlendMode,
    /// Size in bytes of the push-constant range
    pub push_constant_size: u32,
    /// Normal convention the program produces or consumes, if it touches normals
    pub normal_encoding: Option<NormalEncoding>,
}

impl ProgramDesc {
    /// Program drawing a full-screen triangle with the given fragment entry
    pub fn fullscreen(name: &str, fragment_entry: &str, blend: BlendMode) -> Self {
        Self {
            name: name.to_string(),
            vertex_entry: "fullscreen".to_string(),
            fragment_entry: fragment_entry.to_string(),
            blend,
            push_constant_size: 0,
            normal_encoding: None,
        }
    }

    /// Set the push-constant range size
    pub fn with_push_constants(mut self, size: u32) -> Self {
        self.push_constant_size = size;
        self
    }

    /// Declare the normal convention
    pub fn with_normal_encoding(mut self, encoding: NormalEncoding) -> Self {
        self.normal_encoding = Some(encoding);
        self
    }
}

/// Program resource trait
pub trait Program: Send + Sync + Any {
    /// Descriptor the program was created from
    fn desc(&self) -> &ProgramDesc;

    /// Downcast support for backends
    fn as_any(&self) -> &dyn Any;
}
