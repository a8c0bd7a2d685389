//! Sparse decoder/encoder configuration and its translation into engine
//! setter calls.
//!
//! Every field is optional and independently settable; translation invokes
//! only the setters whose field is present and silently skips the rest.
//! The order of the calls carries no meaning; each setter touches an
//! independent engine parameter.

use crate::engine::{FlifDecoder, FlifEncoder};

/// Decoder configuration. Only fields that are `Some` reach the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecoderOptions {
    pub crc_check: Option<bool>,
    /// Decode scaled down to fit within `(width, height)`.
    pub fit: Option<(u32, u32)>,
    /// Lossy decode quality, `0..=100`.
    pub quality: Option<i32>,
    /// Decode directly to `(width, height)`.
    pub resize: Option<(u32, u32)>,
    /// Power-of-two downscale factor.
    pub scale: Option<u32>,
    /// Quality the engine should reach before the first progress checkpoint.
    pub progressive_initial_limit: Option<i32>,
    /// Quality increment between progress checkpoints. Consumed by the
    /// decode driver's preview cadence; never forwarded to the engine.
    pub progressive_step: Option<i32>,
}

/// Encoder configuration. Only fields that are `Some` reach the engine;
/// `alpha_zero_lossless` is a bare flag and fires only when `Some(true)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncoderOptions {
    pub alpha_zero_lossless: Option<bool>,
    pub auto_color_buckets: Option<i32>,
    pub chance_alpha: Option<i32>,
    pub chance_cutoff: Option<i32>,
    pub crc_check: Option<bool>,
    pub divisor: Option<i32>,
    pub frame_shape: Option<i32>,
    pub interlaced: Option<bool>,
    pub learn_repeat: Option<i32>,
    pub lookback: Option<i32>,
    pub min_size: Option<i32>,
    pub palette_size: Option<i32>,
    pub split_threshold: Option<i32>,
    pub ycocg: Option<bool>,
}

pub(crate) fn apply_decoder_options<D: FlifDecoder>(decoder: &mut D, options: &DecoderOptions) {
    if let Some(enabled) = options.crc_check {
        decoder.set_crc_check(enabled);
    }
    if let Some((width, height)) = options.fit {
        decoder.set_fit(width, height);
    }
    if let Some(quality) = options.quality {
        decoder.set_quality(quality);
    }
    if let Some((width, height)) = options.resize {
        decoder.set_resize(width, height);
    }
    if let Some(scale) = options.scale {
        decoder.set_scale(scale);
    }
    if let Some(limit) = options.progressive_initial_limit {
        decoder.set_first_callback_quality(limit);
    }
}

pub(crate) fn apply_encoder_options<E: FlifEncoder>(encoder: &mut E, options: &EncoderOptions) {
    if options.alpha_zero_lossless == Some(true) {
        encoder.set_alpha_zero_lossless();
    }
    if let Some(buckets) = options.auto_color_buckets {
        encoder.set_auto_color_buckets(buckets);
    }
    if let Some(chance) = options.chance_alpha {
        encoder.set_chance_alpha(chance);
    }
    if let Some(cutoff) = options.chance_cutoff {
        encoder.set_chance_cutoff(cutoff);
    }
    if let Some(enabled) = options.crc_check {
        encoder.set_crc_check(enabled);
    }
    if let Some(divisor) = options.divisor {
        encoder.set_divisor(divisor);
    }
    if let Some(shape) = options.frame_shape {
        encoder.set_frame_shape(shape);
    }
    if let Some(interlaced) = options.interlaced {
        encoder.set_interlaced(interlaced);
    }
    if let Some(repeats) = options.learn_repeat {
        encoder.set_learn_repeat(repeats);
    }
    if let Some(lookback) = options.lookback {
        encoder.set_lookback(lookback);
    }
    if let Some(min_size) = options.min_size {
        encoder.set_min_size(min_size);
    }
    if let Some(size) = options.palette_size {
        encoder.set_palette_size(size);
    }
    if let Some(threshold) = options.split_threshold {
        encoder.set_split_threshold(threshold);
    }
    if let Some(enabled) = options.ycocg {
        encoder.set_ycocg(enabled);
    }
}
