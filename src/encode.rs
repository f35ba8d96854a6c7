//! Message encoding: the 32-byte message digest followed by a 2-byte
//! little-endian checksum, each byte naming a position on its chain.
//!
//! The checksum sums the distance from every digest byte to the chain top.
//! Lowering any digest byte raises the checksum, so a forger who only holds
//! revealed chain values cannot push every position upward at once.

use crate::chain::hash;
use crate::{CHAINS, CHAIN_TOP, DIGEST_LEN};

/// Largest possible checksum, reached by an all-zero digest.
pub const MAX_CHECKSUM: u16 = DIGEST_LEN as u16 * CHAIN_TOP as u16;

/// Sum of `255 - b` over every digest byte. Never exceeds [`MAX_CHECKSUM`].
pub fn checksum(digest: &[u8; DIGEST_LEN]) -> u16 {
    digest.iter().map(|&b| u16::from(CHAIN_TOP - b)).sum()
}

/// Maps `message` to the 34 chain positions used by signing and verification.
pub fn encode(message: &[u8]) -> [u8; CHAINS] {
    let digest = hash(message);

    let mut encoded = [0u8; CHAINS];
    encoded[..DIGEST_LEN].copy_from_slice(&digest);
    encoded[DIGEST_LEN..].copy_from_slice(&checksum(&digest).to_le_bytes());
    encoded
}
