//! Content fingerprinting using bounded BLAKE3 reads.
//!
//! A fingerprint identifies a file by a prefix of its contents rather than by
//! its name. Hashing stops after a fixed read budget, so fingerprinting a
//! multi-gigabyte video costs the same as fingerprinting a small clip. The
//! trade-off is accepted deliberately: two files that agree on the whole
//! budgeted prefix receive the same fingerprint.

use crate::error::{Error, Result};
use std::fmt;
use std::io::Read;
use std::path::Path;

/// Fingerprint digest size in bytes (BLAKE3 produces 256-bit hashes).
pub const FINGERPRINT_SIZE: usize = 32;

/// Size of a single read while fingerprinting, in bytes.
pub const CHUNK_SIZE: usize = 4096;

/// Number of chunks hashed by the default fingerprinter.
///
/// 61 chunks of 4 KiB give a 249 856-byte budget, just under 256 KiB of each
/// file's prefix.
pub const DEFAULT_MAX_CHUNKS: usize = 61;

/// A 32-byte BLAKE3 digest of a file's budgeted prefix.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_SIZE]);

impl Fingerprint {
    /// Create a Fingerprint from raw bytes.
    pub fn from_bytes(bytes: [u8; FINGERPRINT_SIZE]) -> Self {
        Fingerprint(bytes)
    }

    /// Create a Fingerprint from a hex string (64 hex characters).
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        if hex_str.len() != FINGERPRINT_SIZE * 2 {
            return Err(Error::invalid_fingerprint(format!(
                "Expected {} hex characters, got {}",
                FINGERPRINT_SIZE * 2,
                hex_str.len()
            )));
        }

        let bytes = hex::decode(hex_str)
            .map_err(|e| Error::invalid_fingerprint(format!("Invalid hex: {}", e)))?;

        let mut digest = [0u8; FINGERPRINT_SIZE];
        digest.copy_from_slice(&bytes);
        Ok(Fingerprint(digest))
    }

    /// Convert to hex string (64 lowercase characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_SIZE] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

/// Bounded-prefix fingerprinting of files and readers.
///
/// The budget is `chunk_size * max_chunks` bytes; hashing a shorter input is
/// simply a hash of the whole input. A `Fingerprinter` is cheap to copy and
/// holds no I/O state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprinter {
    chunk_size: usize,
    max_chunks: usize,
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            max_chunks: DEFAULT_MAX_CHUNKS,
        }
    }
}

impl Fingerprinter {
    /// Create a fingerprinter with a custom read budget.
    ///
    /// A zero budget is allowed and maps every input to the digest of the
    /// empty prefix.
    pub fn new(chunk_size: usize, max_chunks: usize) -> Self {
        Self {
            chunk_size,
            max_chunks,
        }
    }

    /// Total read budget in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.chunk_size as u64 * self.max_chunks as u64
    }

    /// Hash at most the budgeted prefix of a reader.
    fn digest<R: Read>(&self, reader: R) -> std::io::Result<Fingerprint> {
        let mut hasher = blake3::Hasher::new();
        let mut bounded = reader.take(self.max_bytes());
        std::io::copy(&mut bounded, &mut hasher)?;
        Ok(Fingerprint(*hasher.finalize().as_bytes()))
    }

    /// Fingerprint data from a reader.
    pub fn fingerprint_reader<R: Read>(&self, reader: R) -> Result<Fingerprint> {
        Ok(self.digest(reader)?)
    }

    /// Fingerprint a file.
    ///
    /// Fails with a `Fingerprint` error if the file cannot be opened or read.
    pub fn fingerprint_file(&self, path: &Path) -> Result<Fingerprint> {
        let file = std::fs::File::open(path).map_err(|e| Error::fingerprint(path, e))?;
        self.digest(file).map_err(|e| Error::fingerprint(path, e))
    }
}
