//! Progressive decode driver.
//!
//! One decode request is one blocking [`FlifDecoder::decode_memory`] call;
//! the engine drives the checkpoint callback synchronously until the
//! stream is exhausted or fails. At each checkpoint the driver decides
//! whether to materialize a preview (throttling below) and always hands
//! the engine `quality + step` as the next checkpoint target.

use std::time::{Duration, Instant};

use smallvec::SmallVec;

use super::rows;
use super::{DecodeInput, DecodedFrame, ProgressEvent};
use crate::engine::{ArenaRegion, FlifDecoder, FlifEngine};
use crate::error::BridgeError;
use crate::options;

/// Quality value of the engine's final checkpoint.
pub(crate) const FINAL_QUALITY: i32 = 10_000;

/// Default quality increment between checkpoints.
pub(crate) const DEFAULT_PROGRESSIVE_STEP: i32 = 5_000;

/// Minimum wall-clock gap between two emitted previews.
pub(crate) const PREVIEW_MIN_INTERVAL: Duration = Duration::from_millis(600);

/// Reassemble a 64-bit byte count from the two 32-bit halves the engine
/// reports.
pub fn combine_bytes_read(lo: u32, hi: u32) -> u64 {
    u64::from(lo) | u64::from(hi) << 32
}

/// Decides which checkpoints become visible previews.
///
/// The first checkpoint and the final one (quality 10000) always emit;
/// in between, previews are dropped while less than the minimum interval
/// has passed since the last emission.
pub(crate) struct PreviewThrottle {
    min_interval: Duration,
    last_emit: Option<Instant>,
}

impl PreviewThrottle {
    pub(crate) fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_emit: None,
        }
    }

    pub(crate) fn should_emit(&self, quality: i32, now: Instant) -> bool {
        if quality == FINAL_QUALITY {
            return true;
        }
        match self.last_emit {
            None => true,
            Some(last) => now.duration_since(last) >= self.min_interval,
        }
    }

    pub(crate) fn mark_emitted(&mut self, now: Instant) {
        self.last_emit = Some(now);
    }
}

/// Run one decode request to completion, emitting previews through `emit`.
///
/// Cleanup is scoped: the callback borrow ends when `decode_memory`
/// returns, the input region is freed next, and the decoder handle is
/// released last, on success, error, and unwind alike.
pub(crate) fn run_decode<E: FlifEngine>(
    engine: &E,
    input: &DecodeInput,
    emit: &mut dyn FnMut(ProgressEvent),
) -> Result<(), BridgeError> {
    let step = input
        .options
        .as_ref()
        .and_then(|options| options.progressive_step)
        .unwrap_or(DEFAULT_PROGRESSIVE_STEP);

    let mut decoder = engine.create_decoder()?;
    if let Some(options) = &input.options {
        options::apply_decoder_options(&mut decoder, options);
    }
    let input_region = ArenaRegion::copy_from(engine, &input.bytes)?;

    let mut throttle = PreviewThrottle::new(PREVIEW_MIN_INTERVAL);
    let mut preview_failure: Option<BridgeError> = None;

    decoder.decode_memory(
        input_region.ptr(),
        input_region.len(),
        &mut |decoder, checkpoint| {
            let next_quality = checkpoint.quality.saturating_add(step);
            if preview_failure.is_some() {
                return next_quality;
            }
            let now = Instant::now();
            if !throttle.should_emit(checkpoint.quality, now) {
                return next_quality;
            }
            throttle.mark_emitted(now);
            match materialize_preview(decoder) {
                Ok((frames, loop_count)) => {
                    let bytes_read =
                        combine_bytes_read(checkpoint.bytes_read_lo, checkpoint.bytes_read_hi);
                    log::debug!(
                        "progressive preview: quality={} bytes_read={} frames={}",
                        checkpoint.quality,
                        bytes_read,
                        frames.len()
                    );
                    emit(ProgressEvent {
                        quality: checkpoint.quality,
                        bytes_read,
                        frames,
                        loop_count,
                    });
                }
                Err(err) => preview_failure = Some(err),
            }
            next_quality
        },
    )?;

    match preview_failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Fetch every decoded image at the current checkpoint. Each engine frame
/// handle is released as soon as its pixels are copied out, before the
/// next image is fetched.
fn materialize_preview<D: FlifDecoder>(
    decoder: &mut D,
) -> Result<(SmallVec<[DecodedFrame; 1]>, u32), BridgeError> {
    let mut frames = SmallVec::new();
    for index in 0..decoder.num_images() {
        let mut frame = decoder.get_image(index)?;
        frames.push(rows::copy_frame_rgba8(&mut frame)?);
    }
    Ok((frames, decoder.num_loops()))
}
