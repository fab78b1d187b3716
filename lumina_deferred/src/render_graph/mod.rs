/// Render graph module - pass declarations and their validated ordering

pub mod pass_descriptor;
pub mod subpass_graph;
pub mod canonical;

pub use pass_descriptor::*;
pub use subpass_graph::*;
pub use canonical::*;
