//! Length-prefixed deflate envelope used for compressed `Cell` payloads.
//!
//! Wire layout: `4-byte big-endian original length || raw deflate stream`.
//! The length prefix is *not* part of the deflate format; it is this
//! codec's own framing, stripped before the remainder is inflated. Do not
//! substitute a zlib/gzip-wrapped stream here — only the raw DEFLATE
//! bitstream is written, matching what the reference implementation's
//! `qCompress`-style envelope expects.

use std::io::Write as _;

use flate2::write::{DeflateDecoder, DeflateEncoder};
use flate2::Compression;

use crate::error::{CodecError, CodecResult};

/// Payloads at or below this size never get the compressed flag set, even
/// if the caller requested compression.
pub const COMPRESSION_THRESHOLD: usize = 127;

/// Compresses `data`, returning `4-byte BE original length || deflate stream`.
pub fn compress(data: &[u8]) -> CodecResult<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() / 2 + 8);
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    let mut enc = DeflateEncoder::new(&mut out, Compression::default());
    enc.write_all(data)
        .map_err(|e| CodecError::wrong_format(format!("deflate compression failed: {e}")))?;
    enc.finish()
        .map_err(|e| CodecError::wrong_format(format!("deflate compression failed: {e}")))?;
    Ok(out)
}

/// Decompresses a buffer produced by [`compress`].
pub fn decompress(envelope: &[u8]) -> CodecResult<Vec<u8>> {
    if envelope.len() < 4 {
        return Err(CodecError::wrong_format("compressed payload shorter than length prefix"));
    }
    let (len_bytes, body) = envelope.split_at(4);
    let original_len = u32::from_be_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]) as usize;
    let mut out = Vec::with_capacity(original_len);
    let mut dec = DeflateDecoder::new(&mut out);
    dec.write_all(body)
        .map_err(|e| CodecError::wrong_format(format!("deflate decompression failed: {e}")))?;
    dec.finish()
        .map_err(|e| CodecError::wrong_format(format!("deflate decompression failed: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(10);
        let enc = compress(&data).unwrap();
        assert_eq!(&enc[..4], &(data.len() as u32).to_be_bytes());
        let dec = decompress(&enc).unwrap();
        assert_eq!(dec, data);
    }

    #[test]
    fn scenario_s4_length_prefix() {
        let data = vec![b'A'; 200];
        let enc = compress(&data).unwrap();
        assert_eq!(&enc[..4], &0x0000_00C8u32.to_be_bytes());
    }
}
