//! Winternitz One-Time Signatures built from the Blake 3 hash function.
//!
//! A 32-byte [`SecretKey`] seed is expanded with ChaCha20 into 34 hash chain
//! seeds. Each chain is walked 255 times with Blake 3, and the hash of the 34
//! chain tops is the 32-byte [`PublicKey`]. A message is hashed and suffixed
//! with a 2-byte checksum; each of the resulting 34 bytes picks how far along
//! its chain the [`Signature`] reveals.
//!
//! **A secret key must sign at most one message.** Every signature reveals
//! intermediate chain values, and a second signature under the same key
//! hands out enough of them to forge signatures on other messages. Nothing
//! in this crate tracks key usage; that is the caller's responsibility.
//!
//! ```rust
//! use blake3_winternitz_signatures::{generate_key, sign, verify};
//! use rand_chacha::rand_core::SeedableRng;
//!
//! let mut rng = rand_chacha::ChaCha20Rng::from_seed([7u8; 32]);
//! let (public_key, secret_key) = generate_key(&mut rng).unwrap();
//!
//! let signature = sign(&secret_key, b"Hello, world!");
//! assert!(verify(&public_key, b"Hello, world!", &signature));
//! assert!(!verify(&public_key, b"Hello, not world!", &signature));
//! ```

pub mod chain;
pub mod encode;
pub mod error;
pub mod expand;
pub mod winternitz;

pub use error::{Error, Result};
pub use winternitz::{
    generate_key, generate_key_from_os_rng, sign, verify, PublicKey, SecretKey, Signature,
};

/// Output length of the hash function, and the size of every chain value.
pub const HASH_LEN: usize = 32;

/// Length of a serialized [`SecretKey`].
pub const SECRET_KEY_LEN: usize = 32;

/// Length of a serialized [`PublicKey`].
pub const PUBLIC_KEY_LEN: usize = HASH_LEN;

/// Number of chains driven by the message digest.
pub const DIGEST_LEN: usize = HASH_LEN;

/// Number of chains driven by the little-endian checksum.
pub const CHECKSUM_LEN: usize = 2;

/// Total number of hash chains, one per encoded message byte.
pub const CHAINS: usize = DIGEST_LEN + CHECKSUM_LEN;

/// Length of a serialized [`Signature`].
pub const SIGNATURE_LEN: usize = CHAINS * HASH_LEN;

/// Index of the last value in every chain; chains hold positions `0..=255`.
pub const CHAIN_TOP: u8 = u8::MAX;
