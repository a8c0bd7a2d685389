//! Scanline-level pixel transfer between caller buffers and the engine.

use super::{BitDepth, DecodedFrame, Frame};
use crate::engine::{ArenaRegion, FlifDecodedFrame, FlifEncoderImage, FlifEngine};
use crate::error::BridgeError;

/// Copy a decoded engine frame out, one scanline at a time, into an owned
/// RGBA8 buffer.
///
/// The engine materializes an internal buffer for every row read and does
/// not release it between reads, so each row is cleared as soon as it has
/// been copied.
pub(crate) fn copy_frame_rgba8<F: FlifDecodedFrame>(
    frame: &mut F,
) -> Result<DecodedFrame, BridgeError> {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let stride = width * 4;
    let mut rgba_data = vec![0u8; stride * height];
    for row in 0..height {
        let row_bytes = frame.read_row_rgba8(row as u32)?;
        if row_bytes.len() != stride {
            frame.clear_buffer();
            return Err(BridgeError::Codec(format!(
                "engine returned a {}-byte row for width {width}",
                row_bytes.len()
            )));
        }
        let offset = stride * row;
        rgba_data[offset..offset + stride].copy_from_slice(&row_bytes);
        frame.clear_buffer();
    }
    Ok(DecodedFrame {
        rgba_data,
        width: frame.width(),
        height: frame.height(),
        frame_delay: frame.frame_delay(),
    })
}

/// Feed a caller frame into an engine image, one scanline at a time.
///
/// Each row gets its own arena region, sized for 3 channels at the
/// frame's bit depth, which is handed to the engine's row writer and
/// freed immediately afterwards; no row buffer is reused.
pub(crate) fn write_frame_rows<E: FlifEngine>(
    engine: &E,
    image: &mut E::Image,
    frame: &Frame,
) -> Result<(), BridgeError> {
    let row_len = frame.width as usize * 3 * frame.bit_depth.bytes_per_channel();
    for row in 0..frame.height as usize {
        let offset = row_len * row;
        let region = ArenaRegion::copy_from(engine, &frame.pixel_bytes[offset..offset + row_len])?;
        match frame.bit_depth {
            BitDepth::Eight => image.write_row_rgb8(row as u32, region.ptr(), region.len())?,
            BitDepth::Sixteen => image.write_row_rgba16(row as u32, region.ptr(), region.len())?,
        }
    }
    Ok(())
}
