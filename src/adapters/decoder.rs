//! JPEG decoder adapter (component H): the scheduler's only source of RGB
//! pixels. Grounded on `VideoDecoder.c`'s turbojpeg usage; kept behind a
//! trait so the scheduler can be exercised with a fake decoder in tests.

use crate::error::Error;

/// Decodes one JPEG frame into a pre-sized RGB buffer.
///
/// Implementations own their scratch state (turbojpeg handle, output
/// buffer) and reuse it across calls; `decode` never allocates per frame.
pub trait JpegDecoder {
    fn decode(&mut self, jpeg: &[u8]) -> Result<&[u8], Error>;
}

/// turbojpeg-backed decoder producing packed 8-bit RGB at a fixed
/// resolution, matching `VideoDecoderCreate`/`VideoDecoderDecodeFrame`.
pub struct TurboJpegDecoder {
    decompressor: turbojpeg::Decompressor,
    width: usize,
    height: usize,
    rgb_buffer: Vec<u8>,
}

impl TurboJpegDecoder {
    pub fn new(width: u32, height: u32) -> Result<Self, Error> {
        let decompressor =
            turbojpeg::Decompressor::new().map_err(|e| Error::Decode(e.to_string()))?;
        let rgb_buffer = vec![0u8; width as usize * height as usize * 3];
        Ok(TurboJpegDecoder {
            decompressor,
            width: width as usize,
            height: height as usize,
            rgb_buffer,
        })
    }
}

impl JpegDecoder for TurboJpegDecoder {
    fn decode(&mut self, jpeg: &[u8]) -> Result<&[u8], Error> {
        let image = turbojpeg::Image {
            pixels: self.rgb_buffer.as_mut_slice(),
            width: self.width,
            pitch: self.width * 3,
            height: self.height,
            format: turbojpeg::PixelFormat::RGB,
        };
        self.decompressor
            .decompress(jpeg, image)
            .map_err(|e| Error::Decode(e.to_string()))?;
        Ok(&self.rgb_buffer)
    }
}

#[cfg(test)]
pub mod fakes {
    use super::*;

    /// Counts calls instead of actually decoding, so scheduler tests can
    /// assert lazy materialization without linking turbojpeg.
    pub struct CountingDecoder {
        pub calls: usize,
        pub rgb_buffer: Vec<u8>,
    }

    impl CountingDecoder {
        pub fn new(rgb_len: usize) -> Self {
            CountingDecoder {
                calls: 0,
                rgb_buffer: vec![0u8; rgb_len],
            }
        }
    }

    impl JpegDecoder for CountingDecoder {
        fn decode(&mut self, _jpeg: &[u8]) -> Result<&[u8], Error> {
            self.calls += 1;
            Ok(&self.rgb_buffer)
        }
    }
}
