//! The caller-facing protocol: request and message types plus the worker
//! runtime that drives the codec engine.
//!
//! A caller submits [`Request`]s through [`FlifBridge`] and reads
//! [`BridgeMessage`]s off the receiver returned by [`FlifBridge::spawn`].
//! Messages for different requests may interleave, but each request's own
//! messages arrive in order and end in exactly one terminal message:
//! [`BridgeMessage::Complete`] (decode), [`BridgeMessage::Result`]
//! (encode), or [`BridgeMessage::Error`] (either).

pub(crate) mod decode;
pub(crate) mod encode;
pub(crate) mod rows;
mod worker;

use smallvec::SmallVec;

pub use decode::combine_bytes_read;
pub use worker::FlifBridge;

use crate::error::BridgeError;
use crate::options::{DecoderOptions, EncoderOptions};

/// Interleaved-RGB channel count for frames submitted to the encoder.
pub const ENCODE_CHANNELS: usize = 3;

/// Bits per channel of a frame submitted for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitDepth {
    #[default]
    Eight,
    Sixteen,
}

impl BitDepth {
    pub fn bytes_per_channel(self) -> usize {
        match self {
            BitDepth::Eight => 1,
            BitDepth::Sixteen => 2,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
        }
    }
}

/// One frame of pixel data to encode: interleaved RGB, row-major,
/// little-endian u16 channels when `bit_depth` is [`BitDepth::Sixteen`].
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub bit_depth: BitDepth,
    pub pixel_bytes: Vec<u8>,
    /// Display duration in milliseconds, for animation frames.
    pub frame_delay: Option<u32>,
}

impl Frame {
    pub fn expected_byte_len(&self) -> usize {
        self.width as usize
            * self.height as usize
            * ENCODE_CHANNELS
            * self.bit_depth.bytes_per_channel()
    }

    /// Check the declared geometry against the supplied buffer. Runs
    /// before any native allocation so a bad frame never touches the
    /// arena.
    pub(crate) fn validate(&self) -> Result<(), BridgeError> {
        if self.width == 0 || self.height == 0 {
            return Err(BridgeError::EmptyFrame {
                width: self.width,
                height: self.height,
            });
        }
        let expected = self.expected_byte_len();
        if self.pixel_bytes.len() != expected {
            return Err(BridgeError::BufferMismatch {
                width: self.width,
                height: self.height,
                bit_depth: self.bit_depth.bits(),
                expected,
                actual: self.pixel_bytes.len(),
            });
        }
        Ok(())
    }
}

/// One frame of a decode preview: RGBA8, 4 bytes per pixel, row-major.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    pub rgba_data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Display duration in milliseconds (0 for still images).
    pub frame_delay: u32,
}

/// A progressive decode preview. Ephemeral: emitted once, never retained
/// by the bridge.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Quality reached, `0..=10000`.
    pub quality: i32,
    /// Encoded bytes consumed so far.
    pub bytes_read: u64,
    pub frames: SmallVec<[DecodedFrame; 1]>,
    /// Animation loop count.
    pub loop_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct DecodeInput {
    pub bytes: Vec<u8>,
    pub options: Option<DecoderOptions>,
}

#[derive(Debug, Clone, Default)]
pub struct EncodeInput {
    pub frames: Vec<Frame>,
    pub options: Option<EncoderOptions>,
}

#[derive(Debug, Clone)]
pub enum RequestPayload {
    Decode(DecodeInput),
    Encode(EncodeInput),
}

impl RequestPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            RequestPayload::Decode(_) => "decode",
            RequestPayload::Encode(_) => "encode",
        }
    }
}

/// An inbound request. `uuid` must be non-empty and unique among requests
/// still in flight.
#[derive(Debug, Clone)]
pub struct Request {
    pub uuid: String,
    pub payload: RequestPayload,
}

/// Outbound message from the bridge worker.
#[derive(Debug, Clone)]
pub enum BridgeMessage {
    /// A decode preview. Zero or more per decode request.
    Progress { uuid: String, event: ProgressEvent },
    /// The encoded stream. Terminal; encode only.
    Result { uuid: String, data: Vec<u8> },
    /// Successful end of a decode. Terminal; decode only.
    Complete { uuid: String },
    /// Request failed. Terminal; mutually exclusive with `Result` and
    /// `Complete` for the same uuid.
    Error { uuid: String, message: String },
}

impl BridgeMessage {
    pub fn uuid(&self) -> &str {
        match self {
            BridgeMessage::Progress { uuid, .. }
            | BridgeMessage::Result { uuid, .. }
            | BridgeMessage::Complete { uuid }
            | BridgeMessage::Error { uuid, .. } => uuid,
        }
    }
}
