/// Dispatch module - light descriptors, parameter blocks, and light draws

pub mod light;
pub mod parameter_block;
pub mod dispatcher;

pub use light::*;
pub use parameter_block::*;
pub use dispatcher::*;
