/*!
# Lumina Deferred

Render-graph executor for a tile-free deferred shading pipeline.

A geometry pass writes diffuse color and normals, one or more light passes
accumulate radiance additively, a compose pass multiplies light by albedo,
and an optional ACES tonemap pass produces display color. Backends plug in
through the trait-based device interface.

## Architecture

- **AttachmentSet**: intermediate images and their layout stamp
- **PassDescriptor / SubpassGraph**: validated pass ordering
- **DrawBatchDispatcher**: one draw per light with a push-constant block
- **PipelineExecutor**: frame state machine over a SubpassGraph
- **GraphicsDevice**: factory trait implemented by backends
*/

// Internal modules
mod error;
mod engine;
mod config;
pub mod log;
pub mod shading;
pub mod graphics_device;
pub mod attachment;
pub mod render_graph;
pub mod dispatch;
pub mod executor;

// Main lumina namespace module
pub mod lumina {
    // Error types
    pub use crate::error::{Error, Hazard, Result};

    // Engine facade
    pub use crate::engine::Engine;

    // Configuration
    pub use crate::config::{PipelineConfig, ProgramNames};

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Abstract device interface
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Attachments
    pub mod attachment {
        pub use crate::attachment::*;
    }

    // Pass orchestration: graph, dispatcher, executor
    pub mod render {
        pub use crate::render_graph::*;
        pub use crate::dispatch::*;
        pub use crate::executor::*;
    }

    // Pure shading math
    pub mod shading {
        pub use crate::shading::*;
    }
}

// Re-export math library at crate root
pub use glam;
