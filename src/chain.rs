use crate::{CHAINS, CHAIN_TOP, HASH_LEN};

/// The one-way function every chain step applies.
pub fn hash(bytes: &[u8]) -> [u8; HASH_LEN] {
    blake3::hash(bytes).into()
}

/// Hashes `value` exactly `count` times. A count of zero returns `value`.
///
/// Chains have 256 positions, so `count` is a `u8` and can never walk past
/// the top of a chain.
pub fn iterate(value: &[u8; HASH_LEN], count: u8) -> [u8; HASH_LEN] {
    let mut current = *value;
    for _ in 0..count {
        current = hash(&current);
    }
    current
}

/// Walks a value found at `position` the rest of the way to the chain top.
pub fn complete(value: &[u8; HASH_LEN], position: u8) -> [u8; HASH_LEN] {
    iterate(value, CHAIN_TOP - position)
}

/// Hash of the in-order concatenation of all chain tops.
pub fn fingerprint(tops: &[[u8; HASH_LEN]; CHAINS]) -> [u8; HASH_LEN] {
    let mut hasher = blake3::Hasher::new();
    for top in tops {
        hasher.update(top);
    }
    hasher.finalize().into()
}
