//! Traits describing the FLIF codec engine the bridge drives.
//!
//! The codec itself lives elsewhere (an emscripten build, a linked C
//! library, or the scripted engine used by the tests). The bridge only
//! relies on the surface below: raw arena memory, decoder/encoder handles
//! with option setters, row-level pixel access, and a checkpoint callback
//! driven synchronously from inside [`FlifDecoder::decode_memory`].
//!
//! Handle release (`delete` in the engine's own API) is expressed as
//! `Drop` on the implementing types, so every handle is released exactly
//! once on every exit path, including unwinding.

use crate::error::EngineError;


/// Opaque address inside the engine's memory arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaPtr(pub u32);

/// One decode progress checkpoint, as reported by the engine.
///
/// The byte count arrives split into two 32-bit halves; see
/// [`crate::bridge::combine_bytes_read`] for the reconstruction.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint {
    /// Quality reached so far, `0..=10000`. `10000` is the final checkpoint.
    pub quality: i32,
    pub bytes_read_lo: u32,
    pub bytes_read_hi: u32,
}

/// The engine root: arena memory plus handle factories.
///
/// A single engine instance is owned by one worker thread and is not
/// thread-safe; the bridge never shares it across concurrent operations.
pub trait FlifEngine {
    type Decoder: FlifDecoder;
    type Encoder: FlifEncoder<Image = Self::Image>;
    type Image: FlifEncoderImage;

    /// Allocate `len` bytes inside the engine arena.
    fn malloc(&self, len: usize) -> Result<ArenaPtr, EngineError>;

    /// Release a region previously returned by [`malloc`](Self::malloc).
    /// The pointer must not be used again afterwards.
    fn free(&self, ptr: ArenaPtr);

    /// Copy `bytes` into an allocated region at `offset`.
    fn write(&self, ptr: ArenaPtr, offset: usize, bytes: &[u8]);

    /// Copy `len` bytes out of the arena into an owned buffer.
    fn read(&self, ptr: ArenaPtr, len: usize) -> Vec<u8>;

    fn create_decoder(&self) -> Result<Self::Decoder, EngineError>;

    fn create_encoder(&self) -> Result<Self::Encoder, EngineError>;

    /// Create an 8-bit-per-channel image to encode into.
    fn create_image(&self, width: u32, height: u32) -> Result<Self::Image, EngineError>;

    /// Create a 16-bit-per-channel (HDR) image to encode into.
    fn create_image_hdr(&self, width: u32, height: u32) -> Result<Self::Image, EngineError>;
}

/// A decoder handle. Dropping it releases the native decoder.
pub trait FlifDecoder {
    type Frame: FlifDecodedFrame;

    fn set_crc_check(&mut self, enabled: bool);
    fn set_fit(&mut self, width: u32, height: u32);
    fn set_quality(&mut self, quality: i32);
    fn set_resize(&mut self, width: u32, height: u32);
    fn set_scale(&mut self, scale: u32);
    fn set_first_callback_quality(&mut self, quality: i32);

    /// Decode an encoded stream previously copied into the arena.
    ///
    /// This is a single blocking call: the engine invokes `on_checkpoint`
    /// synchronously at each internal quality checkpoint and resumes with
    /// the quality threshold the callback returns. The callback receives
    /// the decoder itself so it can materialize previews mid-decode.
    fn decode_memory(
        &mut self,
        ptr: ArenaPtr,
        len: usize,
        on_checkpoint: &mut dyn FnMut(&mut Self, Checkpoint) -> i32,
    ) -> Result<(), EngineError>;

    /// Number of images decoded so far (more than one for animations).
    fn num_images(&self) -> u32;

    /// Animation loop count for the stream being decoded.
    fn num_loops(&self) -> u32;

    /// Fetch a handle to image `index` at the current decode state.
    fn get_image(&mut self, index: u32) -> Result<Self::Frame, EngineError>;
}

/// A decoded image handle obtained from [`FlifDecoder::get_image`].
///
/// Dropping the handle releases it without affecting the decoder's own
/// internal image state.
pub trait FlifDecodedFrame {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn frame_delay(&self) -> u32;

    /// Materialize scanline `row` as RGBA8 (4 bytes per pixel).
    ///
    /// The engine backs each read with an internal row buffer that is NOT
    /// released automatically; call [`clear_buffer`](Self::clear_buffer)
    /// after copying the row out, or the buffer leaks for the remainder of
    /// the decode.
    fn read_row_rgba8(&mut self, row: u32) -> Result<Vec<u8>, EngineError>;

    /// Release the internal row buffer created by the last row read.
    fn clear_buffer(&mut self);
}

/// An encoder handle. Dropping it releases the native encoder and any
/// result buffer still owned by it.
pub trait FlifEncoder {
    type Image;

    fn set_alpha_zero_lossless(&mut self);
    fn set_auto_color_buckets(&mut self, buckets: i32);
    fn set_chance_alpha(&mut self, chance: i32);
    fn set_chance_cutoff(&mut self, cutoff: i32);
    fn set_crc_check(&mut self, enabled: bool);
    fn set_divisor(&mut self, divisor: i32);
    fn set_frame_shape(&mut self, shape: i32);
    fn set_interlaced(&mut self, interlaced: bool);
    fn set_learn_repeat(&mut self, repeats: i32);
    fn set_lookback(&mut self, lookback: i32);
    fn set_min_size(&mut self, min_size: i32);
    fn set_palette_size(&mut self, size: i32);
    fn set_split_threshold(&mut self, threshold: i32);
    fn set_ycocg(&mut self, enabled: bool);

    fn add_image(&mut self, image: &Self::Image) -> Result<(), EngineError>;

    /// Encode every added image into a buffer inside the engine arena.
    ///
    /// The returned `(ptr, len)` view is owned by the encoder and is only
    /// valid until the encoder is dropped; callers must copy the bytes out
    /// first.
    fn encode_to_memory(&mut self) -> Result<(ArenaPtr, usize), EngineError>;
}

/// An image handle being filled for encoding. Dropping it releases the
/// native image.
pub trait FlifEncoderImage {
    /// Write one RGB8 scanline from an arena region of `len` bytes.
    fn write_row_rgb8(&mut self, row: u32, ptr: ArenaPtr, len: usize) -> Result<(), EngineError>;

    /// Write one 16-bit-per-channel scanline from an arena region.
    fn write_row_rgba16(&mut self, row: u32, ptr: ArenaPtr, len: usize)
        -> Result<(), EngineError>;

    fn set_frame_delay(&mut self, delay_ms: u32);
}

/// A scoped arena allocation, freed when the guard drops.
///
/// Every allocation the bridge makes goes through this guard so that the
/// paired [`FlifEngine::free`] runs on every exit path, error or not.
pub struct ArenaRegion<'e, E: FlifEngine> {
    engine: &'e E,
    ptr: ArenaPtr,
    len: usize,
}

impl<'e, E: FlifEngine> ArenaRegion<'e, E> {
    pub fn alloc(engine: &'e E, len: usize) -> Result<Self, EngineError> {
        let ptr = engine.malloc(len)?;
        Ok(Self { engine, ptr, len })
    }

    /// Allocate a region and fill it with `bytes`.
    pub fn copy_from(engine: &'e E, bytes: &[u8]) -> Result<Self, EngineError> {
        let region = Self::alloc(engine, bytes.len())?;
        region.engine.write(region.ptr, 0, bytes);
        Ok(region)
    }

    pub fn ptr(&self) -> ArenaPtr {
        self.ptr
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<E: FlifEngine> Drop for ArenaRegion<'_, E> {
    fn drop(&mut self) {
        self.engine.free(self.ptr);
    }
}
