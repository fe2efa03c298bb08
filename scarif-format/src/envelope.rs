//! Stream compressor wrapped around the whole SCRF payload.

use std::io::{self, Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

/// Brotli window used by every SCRF writer so far (4 MiB).
const BROTLI_WINDOW: i32 = 22;
const BROTLI_BUFFER: usize = 4096;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Envelope {
    /// Brotli. Existing SCRF files all use it.
    #[default]
    Brotli,
    /// zlib (RFC 1950).
    Zlib,
}

impl Envelope {
    /// Highest accepted level; larger values are clamped.
    pub fn max_level(self) -> u32 {
        match self {
            Envelope::Brotli => 11,
            Envelope::Zlib => 9,
        }
    }

    /// Guess the envelope from the first bytes of a stream.
    ///
    /// A zlib header is `CMF FLG` with deflate in the low nibble of CMF and
    /// `CMF * 256 + FLG` divisible by 31. Brotli streams with a window above
    /// 64 KiB start with an odd byte, so they never pass that test.
    pub fn detect(head: &[u8]) -> Self {
        match head {
            [cmf, flg, ..]
                if cmf & 0x0F == 8 && cmf >> 4 <= 7 && u16::from_be_bytes([*cmf, *flg]) % 31 == 0 =>
            {
                Envelope::Zlib
            }
            _ => Envelope::Brotli,
        }
    }

    pub(crate) fn compress<W: Write>(self, payload: &[u8], mut out: W, level: u32) -> io::Result<W> {
        let level = level.min(self.max_level());
        match self {
            Envelope::Brotli => {
                let mut params = brotli::enc::BrotliEncoderParams::default();
                params.quality = level as i32;
                params.lgwin = BROTLI_WINDOW;
                brotli::enc::BrotliCompress(&mut &payload[..], &mut out, &params)?;
                Ok(out)
            }
            Envelope::Zlib => {
                let mut encoder = ZlibEncoder::new(out, flate2::Compression::new(level));
                encoder.write_all(payload)?;
                encoder.finish()
            }
        }
    }

    pub(crate) fn decoder<'a, R: Read + 'a>(self, input: R) -> Box<dyn Read + 'a> {
        match self {
            Envelope::Brotli => Box::new(brotli::Decompressor::new(input, BROTLI_BUFFER)),
            Envelope::Zlib => Box::new(ZlibDecoder::new(input)),
        }
    }
}

impl std::fmt::Display for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Envelope::Brotli => f.write_str("brotli"),
            Envelope::Zlib => f.write_str("zlib"),
        }
    }
}

/// Envelope and level used when writing a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compression {
    pub envelope: Envelope,
    pub level: u32,
}

impl Compression {
    pub fn new(envelope: Envelope, level: u32) -> Self {
        Self { envelope, level }
    }
}

impl Default for Compression {
    fn default() -> Self {
        Self::new(Envelope::Brotli, crate::DEFAULT_COMPRESSION_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(envelope: Envelope, level: u32) -> Vec<u8> {
        envelope.compress(b"SCRF payload bytes", Vec::new(), level).unwrap()
    }

    #[test]
    fn test_detect() {
        for level in [0, 1, 6, 9] {
            assert_eq!(Envelope::detect(&pack(Envelope::Zlib, level)), Envelope::Zlib);
        }
        for level in [0, 5, 11] {
            assert_eq!(Envelope::detect(&pack(Envelope::Brotli, level)), Envelope::Brotli);
        }
        assert_eq!(Envelope::detect(&[]), Envelope::Brotli);
        assert_eq!(Envelope::detect(&[0x78]), Envelope::Brotli);
    }

    #[test]
    fn test_both_envelopes_decode() {
        for envelope in [Envelope::Brotli, Envelope::Zlib] {
            let packed = pack(envelope, 99);
            let mut out = Vec::new();
            envelope.decoder(packed.as_slice()).read_to_end(&mut out).unwrap();
            assert_eq!(out, b"SCRF payload bytes", "{envelope}");
        }
    }

    #[test]
    fn test_brotli_output_is_plain_brotli() {
        let packed = pack(Envelope::Brotli, 11);
        let mut out = Vec::new();
        brotli::BrotliDecompress(&mut packed.as_slice(), &mut out).unwrap();
        assert_eq!(out, b"SCRF payload bytes");
    }
}
