//! Deterministic expansion of a secret seed into hash chain seeds.
//!
//! The seed keys a ChaCha20 keystream with a fixed stream id and a zero
//! word position, so the byte stream is a pure function of the seed.
//! Key generation and signing both re-derive the chain seeds from here and
//! must agree byte for byte.

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use zeroize::Zeroizing;

use crate::{CHAINS, HASH_LEN, SECRET_KEY_LEN, SIGNATURE_LEN};

/// ChaCha20 stream id (nonce) used for every expansion.
pub const EXPANDER_STREAM: u64 = 0;

/// Fills `out` with the first `out.len()` bytes of the keystream for `seed`.
///
/// Shorter outputs are prefixes of longer ones.
pub fn expand(seed: &[u8; SECRET_KEY_LEN], out: &mut [u8]) {
    let mut rng = ChaCha20Rng::from_seed(*seed);
    rng.set_stream(EXPANDER_STREAM);
    rng.set_word_pos(0);
    rng.fill_bytes(out);
}

/// Derives the bottom value (position 0) of each of the 34 hash chains.
pub fn chain_seeds(seed: &[u8; SECRET_KEY_LEN]) -> Zeroizing<[[u8; HASH_LEN]; CHAINS]> {
    let mut stream = Zeroizing::new([0u8; SIGNATURE_LEN]);
    expand(seed, &mut stream[..]);

    let mut seeds = Zeroizing::new([[0u8; HASH_LEN]; CHAINS]);
    for (chain_seed, chunk) in seeds.iter_mut().zip(stream.chunks_exact(HASH_LEN)) {
        chain_seed.copy_from_slice(chunk);
    }
    seeds
}
