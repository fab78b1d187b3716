//! Error types for the Lumina deferred pipeline
//!
//! Every error in this module is a construction-time or call-time contract
//! violation. None of them are transient, so callers should not retry.

use std::fmt;
use crate::attachment::NormalEncoding;

/// Result type for Lumina operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which side of an attachment dependency was violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hazard {
    /// A pass reads an attachment no earlier pass has written
    ReadBeforeWrite,
    /// A pass writes an attachment that was already read this frame
    WriteAfterRead,
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hazard::ReadBeforeWrite => write!(f, "read before write"),
            Hazard::WriteAfterRead => write!(f, "write after read"),
        }
    }
}

/// Lumina errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Attachment resolution with a zero dimension
    InvalidResolution { width: u32, height: u32 },

    /// Attachment referenced out of dependency order
    DependencyOrder {
        attachment: String,
        pass_index: usize,
        pass_name: String,
        hazard: Hazard,
    },

    /// Load policy breaks the one-clear-per-frame rule
    InvalidLoadPolicy {
        attachment: String,
        pass_index: usize,
        reason: String,
    },

    /// Operation not legal in the current executor/resource state
    InvalidState(String),

    /// Normal encoding convention disagrees between producer and consumer
    EncodingMismatch {
        context: String,
        expected: NormalEncoding,
        actual: NormalEncoding,
    },

    /// Graph was built against a different attachment layout
    StaleGraph { graph_layout: u64, attachments_layout: u64 },

    /// Invalid light or draw parameter
    InvalidParameter(String),

    /// Invalid resource (texture, program, attachment, pass, etc.)
    InvalidResource(String),

    /// Backend-specific error
    BackendError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidResolution { width, height } => {
                write!(f, "Invalid resolution: {}x{}", width, height)
            }
            Error::DependencyOrder { attachment, pass_index, pass_name, hazard } => write!(
                f,
                "Dependency order error: attachment '{}' at pass {} ('{}'): {}",
                attachment, pass_index, pass_name, hazard
            ),
            Error::InvalidLoadPolicy { attachment, pass_index, reason } => write!(
                f,
                "Invalid load policy: attachment '{}' at pass {}: {}",
                attachment, pass_index, reason
            ),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Error::EncodingMismatch { context, expected, actual } => write!(
                f,
                "Encoding mismatch in {}: expected {:?}, found {:?}",
                context, expected, actual
            ),
            Error::StaleGraph { graph_layout, attachments_layout } => write!(
                f,
                "Stale graph: built for layout {}, attachments are layout {}",
                graph_layout, attachments_layout
            ),
            Error::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an error at ERROR severity and return it from the current function
///
/// # Example
///
/// ```ignore
/// engine_bail!("lumina::SubpassGraph", Error::InvalidResource("empty graph".to_string()));
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $error:expr) => {{
        let error: $crate::lumina::Error = $error;
        $crate::engine_error!($source, "{}", error);
        return Err(error);
    }};
}

/// Log an error at ERROR severity and evaluate to it
///
/// Intended for `ok_or_else` and `map_err` closures.
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $error:expr) => {{
        let error: $crate::lumina::Error = $error;
        $crate::engine_error!($source, "{}", error);
        error
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
