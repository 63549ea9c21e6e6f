//! Gzip codec for report objects

use flate2::read::MultiGzDecoder;
use std::io::{self, Read};

/// Suffix carried by every compressed report object
pub const COMPRESSED_SUFFIX: &str = ".gz";

/// Decompress a complete gzip buffer
///
/// Concatenated gzip members are decoded back to back, matching the
/// behaviour of common `gzip` tooling. Empty input is rejected: a
/// zero-byte object is never a valid report.
///
/// # Errors
///
/// Returns an [`io::Error`] when the header, body or trailer checksum is
/// malformed or the stream is truncated.
///
/// # Examples
///
/// ```
/// use std::io::Write;
/// use flate2::{Compression, write::GzEncoder};
/// use report_sync::codec::decompress;
///
/// let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
/// encoder.write_all(b"usage,cost\n").unwrap();
/// let compressed = encoder.finish().unwrap();
///
/// assert_eq!(decompress(&compressed).unwrap(), b"usage,cost\n");
/// assert!(decompress(b"not gzip").is_err());
/// ```
pub fn decompress(compressed: &[u8]) -> io::Result<Vec<u8>> {
    if compressed.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "empty input is not a gzip stream",
        ));
    }

    // Reports are CSV and typically compress 5-10x
    let mut decoded = Vec::with_capacity(compressed.len().saturating_mul(4));
    MultiGzDecoder::new(compressed).read_to_end(&mut decoded)?;
    Ok(decoded)
}
