//! # flif-bridge
//!
//! A bridge between an application thread and a FLIF codec engine running
//! on a dedicated worker thread. The bridge marshals byte buffers in and
//! out of the engine's native memory arena, drives progressive decoding
//! with time-based preview throttling, translates sparse option records
//! into engine setter calls, and correlates every request with exactly one
//! terminal response over a message channel.
//!
//! The codec itself is a collaborator, consumed through the traits in
//! [`engine`]; the bridge never implements pixel coding. Spawn a
//! [`FlifBridge`] with an engine constructor, queue [`DecodeInput`] /
//! [`EncodeInput`] requests under caller-chosen uuids, and read
//! [`BridgeMessage`]s off the returned receiver: zero or more `Progress`
//! previews per decode, then exactly one terminal `Complete`, `Result`,
//! or `Error` per request.

pub mod bridge;
pub mod engine;
mod error;
pub mod options;

pub use bridge::{
    combine_bytes_read, BitDepth, BridgeMessage, DecodeInput, DecodedFrame, EncodeInput, Frame,
    FlifBridge, ProgressEvent, Request, RequestPayload,
};
pub use error::{BridgeError, EngineError};
pub use options::{DecoderOptions, EncoderOptions};
