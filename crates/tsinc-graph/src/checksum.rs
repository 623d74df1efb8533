//! Content checksums for change detection.
//!
//! The checksum is a change-detector, not a content-addressing scheme: any
//! detectable edit must change the output with overwhelming probability, but
//! the small residual collision risk of a non-cryptographic hash is accepted.
//! False negatives (a missed change) are what the design guards against, and
//! determinism across processes is what makes the cached record durable.

/// Compute the checksum of a source file's content.
///
/// Order-sensitive rolling hash over the content's UTF-16 code units,
/// reduced with wrapping two's-complement 32-bit arithmetic
/// (`hash = hash * 31 + unit`, expressed as `(hash << 5) - hash + unit`).
/// Empty content hashes to zero.
///
/// Pure function of the content: the caller is responsible for reading the
/// file; this never touches storage.
pub fn checksum(content: &str) -> i32 {
    let mut hash: i32 = 0;
    for unit in content.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    hash
}
