//! Document fingerprinting.
//!
//! The entire addressing scheme of the cache is this one function: a
//! document state maps to a digest, the digest names the record file.
//! There is no index to maintain and nothing to invalidate; a modified
//! document simply hashes to a different address.

/// Derives the cache fingerprint for a document state.
///
/// Hashes the logical path's UTF-8 bytes followed by the modification time
/// as eight little-endian bytes. The fixed-width tail keeps the mapping
/// injective over its inputs: a digit-suffixed path can never alias a
/// shorter path with a longer mtime, which plain string concatenation
/// would allow.
///
/// Both the algorithm and the message encoding are on-disk format
/// decisions. Changing either one re-addresses, and thereby abandons,
/// every record ever written.
///
/// Pure function. The path is expected to be non-empty; `mtime` may be any
/// value, including zero.
///
/// # Examples
///
/// ```
/// use magpie_cache::fingerprint;
///
/// let digest = fingerprint("Notes/scan.pdf", 1_700_000_000_000);
/// assert_eq!(digest.len(), 64);
/// assert_eq!(digest, fingerprint("Notes/scan.pdf", 1_700_000_000_000));
/// ```
pub fn fingerprint(path: &str, mtime: i64) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(path.as_bytes());
    hasher.update(&mtime.to_le_bytes());
    hasher.finalize().to_string()
}
