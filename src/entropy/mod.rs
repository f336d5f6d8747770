//! Entropy accumulation via cryptographic hashing.
//!
//! This module collects raw sensor bytes during a shake session and
//! collapses them into a fixed-size digest. Hashing removes bias and
//! correlations so the digest bits are uniform even though the raw
//! samples are highly structured.

mod pool;

pub use pool::{EntropyPool, HashAlgorithm, PoolDigest, DIGEST_LEN};
