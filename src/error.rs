//! Unified error types for the bridge and the engine collaborator traits.

use thiserror::Error;

/// Errors surfaced by a codec engine implementation.
///
/// The engine is a black box; everything it can fail with collapses into
/// either exhausted native memory or a codec-level rejection with a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("out of native memory allocating {0} bytes")]
    OutOfMemory(usize),

    #[error("{0}")]
    Codec(String),
}

/// Errors produced while handling a single bridge request.
///
/// Every variant is fatal to its request only; resources are never shared
/// across requests, so no failure here can corrupt another request's state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The engine's memory arena could not satisfy an allocation.
    #[error("native allocation of {0} bytes failed")]
    Allocation(usize),

    /// The engine rejected the input or failed mid-operation.
    #[error("codec error: {0}")]
    Codec(String),

    /// A caller-supplied pixel buffer does not match its declared geometry.
    /// Raised before any native allocation is attempted.
    #[error(
        "pixel buffer length mismatch: {width}x{height} at {bit_depth}-bit \
         needs {expected} bytes, got {actual}"
    )]
    BufferMismatch {
        width: u32,
        height: u32,
        bit_depth: u8,
        expected: usize,
        actual: usize,
    },

    /// A frame declared zero width or height.
    #[error("frame dimensions must be non-zero, got {width}x{height}")]
    EmptyFrame { width: u32, height: u32 },

    /// The request itself is malformed: empty uuid, or a uuid that is
    /// already in flight.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// The bridge worker is no longer running.
    #[error("bridge worker is no longer running")]
    Closed,
}

impl From<EngineError> for BridgeError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::OutOfMemory(bytes) => BridgeError::Allocation(bytes),
            EngineError::Codec(message) => BridgeError::Codec(message),
        }
    }
}
