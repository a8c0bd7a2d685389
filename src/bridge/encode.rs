//! Single-pass encode driver.

use super::{rows, BitDepth, EncodeInput};
use crate::engine::{FlifEncoder, FlifEncoderImage, FlifEngine};
use crate::error::BridgeError;
use crate::options;

/// Encode a frame set into an owned byte buffer.
///
/// Every frame is validated before the arena is touched. Image handles and
/// the encoder are released when their bindings drop, whichever way the
/// function exits; the result bytes are copied out of the arena first,
/// since the engine's result view dies with the encoder.
pub(crate) fn run_encode<E: FlifEngine>(
    engine: &E,
    input: &EncodeInput,
) -> Result<Vec<u8>, BridgeError> {
    for frame in &input.frames {
        frame.validate()?;
    }

    let mut encoder = engine.create_encoder()?;
    let mut images = Vec::with_capacity(input.frames.len());
    for frame in &input.frames {
        let mut image = match frame.bit_depth {
            BitDepth::Eight => engine.create_image(frame.width, frame.height)?,
            BitDepth::Sixteen => engine.create_image_hdr(frame.width, frame.height)?,
        };
        rows::write_frame_rows(engine, &mut image, frame)?;
        if let Some(delay) = frame.frame_delay {
            image.set_frame_delay(delay);
        }
        encoder.add_image(&image)?;
        images.push(image);
    }

    if let Some(options) = &input.options {
        options::apply_encoder_options(&mut encoder, options);
    }

    let (ptr, len) = encoder.encode_to_memory()?;
    let data = engine.read(ptr, len);
    log::debug!(
        "encode produced {} bytes from {} frame(s)",
        data.len(),
        images.len()
    );
    Ok(data)
}
