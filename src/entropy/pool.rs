//! Per-session entropy accumulation.
//!
//! Collects raw sensor bytes over one shake and collapses them into a
//! fixed-size cryptographic digest. Uses standard hash functions so the
//! output is uniformly distributed regardless of structure in the input.

use blake3::Hasher as Blake3Hasher;
use sha2::{Digest as _, Sha256};

/// Digest size in bytes (256 bits for both BLAKE3 and SHA-256).
pub const DIGEST_LEN: usize = 32;

/// Supported hash algorithms for pool finalization.
#[derive(Debug, Clone, Copy, Default)]
pub enum HashAlgorithm {
    /// BLAKE3 - fast, secure, recommended default.
    #[default]
    Blake3,
    /// SHA-256 - widely deployed, conservative choice.
    Sha256,
}

/// Finalized pool output.
///
/// Fixed-size digest of everything appended during one session, ready
/// for range mapping.
#[derive(Clone, PartialEq, Eq)]
pub struct PoolDigest {
    data: [u8; DIGEST_LEN],
}

impl PoolDigest {
    /// Returns the digest bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.data
    }
}

impl std::fmt::Debug for PoolDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolDigest").finish_non_exhaustive()
    }
}

enum PoolHasher {
    Blake3(Blake3Hasher),
    Sha256(Sha256),
}

/// Accumulates raw sensor bytes for one shake session.
///
/// The pool is a streaming hash accumulator: appends feed the hasher
/// directly, and [`finalize`](EntropyPool::finalize) consumes the pool
/// to produce the digest. Because finalization takes ownership,
/// append-after-finalize and double-finalize are unrepresentable -
/// the session-sequencing contract is enforced by the type system
/// rather than a runtime check.
pub struct EntropyPool {
    hasher: PoolHasher,
    bytes_appended: u64,
    appends: u64,
}

impl EntropyPool {
    /// Creates a new empty pool using the given algorithm.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        let hasher = match algorithm {
            HashAlgorithm::Blake3 => PoolHasher::Blake3(Blake3Hasher::new()),
            HashAlgorithm::Sha256 => PoolHasher::Sha256(Sha256::new()),
        };
        Self {
            hasher,
            bytes_appended: 0,
            appends: 0,
        }
    }

    /// Appends raw bytes to the pool.
    pub fn append(&mut self, bytes: &[u8]) {
        match &mut self.hasher {
            PoolHasher::Blake3(h) => {
                h.update(bytes);
            }
            PoolHasher::Sha256(h) => h.update(bytes),
        }
        self.bytes_appended += bytes.len() as u64;
        self.appends += 1;

        tracing::trace!(
            bytes_added = bytes.len(),
            pool_bytes = self.bytes_appended,
            "Appended entropy to pool"
        );
    }

    /// Returns the total bytes appended so far.
    pub fn bytes_appended(&self) -> u64 {
        self.bytes_appended
    }

    /// Returns the number of append calls so far.
    pub fn appends(&self) -> u64 {
        self.appends
    }

    /// Finalizes the pool into a fixed-size digest, consuming it.
    pub fn finalize(self) -> PoolDigest {
        let data = match self.hasher {
            PoolHasher::Blake3(h) => *h.finalize().as_bytes(),
            PoolHasher::Sha256(h) => {
                let result = h.finalize();
                let mut data = [0u8; DIGEST_LEN];
                data.copy_from_slice(&result);
                data
            }
        };

        tracing::debug!(
            bytes_appended = self.bytes_appended,
            appends = self.appends,
            "Finalized entropy pool"
        );

        PoolDigest { data }
    }
}

impl Default for EntropyPool {
    fn default() -> Self {
        Self::new(HashAlgorithm::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blake3_digest_length() {
        let mut pool = EntropyPool::new(HashAlgorithm::Blake3);
        pool.append(&[0x42; 100]);
        assert_eq!(pool.finalize().as_bytes().len(), DIGEST_LEN);
    }

    #[test]
    fn test_sha256_digest_length() {
        let mut pool = EntropyPool::new(HashAlgorithm::Sha256);
        pool.append(&[0x42; 100]);
        assert_eq!(pool.finalize().as_bytes().len(), DIGEST_LEN);
    }

    #[test]
    fn test_different_input_different_digest() {
        let mut a = EntropyPool::default();
        let mut b = EntropyPool::default();
        a.append(&[0x00; 50]);
        b.append(&[0x01; 50]);
        assert_ne!(a.finalize(), b.finalize());
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let mut split = EntropyPool::default();
        split.append(b"abc");
        split.append(b"def");

        let mut whole = EntropyPool::default();
        whole.append(b"abcdef");

        assert_eq!(split.finalize(), whole.finalize());
    }

    #[test]
    fn test_empty_pool_still_produces_digest() {
        // A vanishingly short session may append only the entry timestamp;
        // the pool must produce a valid-length digest either way.
        let pool = EntropyPool::default();
        assert_eq!(pool.finalize().as_bytes().len(), DIGEST_LEN);
    }

    #[test]
    fn test_append_accounting() {
        let mut pool = EntropyPool::default();
        pool.append(&[0u8; 8]);
        pool.append(&[0u8; 32]);
        assert_eq!(pool.bytes_appended(), 40);
        assert_eq!(pool.appends(), 2);
    }
}
