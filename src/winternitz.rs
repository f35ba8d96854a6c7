use std::fmt;

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::chain::{complete, fingerprint, iterate};
use crate::encode::encode;
use crate::error::{Error, Result};
use crate::expand::chain_seeds;
use crate::{CHAINS, CHAIN_TOP, HASH_LEN, PUBLIC_KEY_LEN, SECRET_KEY_LEN, SIGNATURE_LEN};

/// A secret key is the 32-byte seed every hash chain is expanded from.
///
/// It may sign **one** message. Signing a second, different message with the
/// same key reveals chain values that let anyone forge further signatures.
/// The key is wiped from memory when dropped and is deliberately not
/// [`Clone`].
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; SECRET_KEY_LEN]);

impl SecretKey {
    /// The raw 32-byte seed, for storage.
    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_LEN] {
        &self.0
    }

    /// Creates the [`PublicKey`] associated with this [`SecretKey`] by
    /// walking every chain to its top and fingerprinting the result.
    pub fn public_key(&self) -> PublicKey {
        let mut chains = chain_seeds(&self.0);
        for value in chains.iter_mut() {
            *value = iterate(value, CHAIN_TOP);
        }
        PublicKey(fingerprint(&chains))
    }

    /// Signs the message, producing a [`Signature`] which another party can
    /// check with [`PublicKey::verify`].
    ///
    /// This must be called at most once per key. The chain seeds are derived
    /// again from the seed rather than cached from key generation.
    pub fn sign<A: AsRef<[u8]>>(&self, message: A) -> Signature {
        let message = message.as_ref();
        let positions = encode(message);
        let seeds = chain_seeds(&self.0);

        let mut chains = [[0u8; HASH_LEN]; CHAINS];
        for ((value, seed), &position) in chains.iter_mut().zip(seeds.iter()).zip(&positions) {
            *value = iterate(seed, position);
        }

        tracing::trace!(message_len = message.len(), "signed message with one-time key");
        Signature { chains }
    }
}

impl From<[u8; SECRET_KEY_LEN]> for SecretKey {
    fn from(seed: [u8; SECRET_KEY_LEN]) -> Self {
        SecretKey(seed)
    }
}

impl TryFrom<&[u8]> for SecretKey {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        fixed_size("secret key", bytes).map(SecretKey)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// The public key is the fingerprint of the 34 chain tops of a
/// [`SecretKey`]. It verifies the single [`Signature`] made by that key.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct PublicKey([u8; PUBLIC_KEY_LEN]);

impl PublicKey {
    /// The raw 32-byte fingerprint.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }

    /// Walks every signature value the rest of the way up its chain and
    /// compares the fingerprint of the tops against this key.
    pub fn verify<A: AsRef<[u8]>>(&self, message: A, signature: &Signature) -> bool {
        let positions = encode(message.as_ref());

        let mut tops = [[0u8; HASH_LEN]; CHAINS];
        for ((top, value), &position) in tops.iter_mut().zip(&signature.chains).zip(&positions) {
            *top = complete(value, position);
        }

        // Public values only, no constant-time comparison needed.
        let valid = fingerprint(&tops) == self.0;
        if !valid {
            tracing::debug!("signature does not reproduce the public key fingerprint");
        }
        valid
    }
}

impl From<[u8; PUBLIC_KEY_LEN]> for PublicKey {
    fn from(bytes: [u8; PUBLIC_KEY_LEN]) -> Self {
        PublicKey(bytes)
    }
}

impl From<PublicKey> for [u8; PUBLIC_KEY_LEN] {
    fn from(public_key: PublicKey) -> Self {
        public_key.0
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        fixed_size("public key", bytes).map(PublicKey)
    }
}

/// The result of [`SecretKey::sign`]ing a message: one value per chain,
/// taken at the position the encoded message byte selects, in encoding
/// order (32 digest positions, then the 2 checksum positions).
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct Signature {
    chains: [[u8; HASH_LEN]; CHAINS],
}

impl Signature {
    /// The revealed value of each chain, in encoding order.
    pub fn chains(&self) -> &[[u8; HASH_LEN]; CHAINS] {
        &self.chains
    }

    /// Concatenates the chain values into the 1088-byte wire form.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        self.into()
    }
}

impl From<[u8; SIGNATURE_LEN]> for Signature {
    fn from(bytes: [u8; SIGNATURE_LEN]) -> Self {
        let mut chains = [[0u8; HASH_LEN]; CHAINS];
        for (value, chunk) in chains.iter_mut().zip(bytes.chunks_exact(HASH_LEN)) {
            value.copy_from_slice(chunk);
        }
        Signature { chains }
    }
}

impl From<&Signature> for [u8; SIGNATURE_LEN] {
    fn from(signature: &Signature) -> Self {
        let mut out = [0u8; SIGNATURE_LEN];
        for (chunk, value) in out.chunks_exact_mut(HASH_LEN).zip(&signature.chains) {
            chunk.copy_from_slice(value);
        }
        out
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        fixed_size::<SIGNATURE_LEN>("signature", bytes).map(Signature::from)
    }
}

fn fixed_size<const N: usize>(kind: &'static str, bytes: &[u8]) -> Result<[u8; N]> {
    bytes.try_into().map_err(|_| Error::InvalidLength {
        kind,
        expected: N,
        actual: bytes.len(),
    })
}

/// Generates a key pair, reading the 32-byte secret seed from `rng` in a
/// single read.
///
/// A failing entropy source is reported as [`Error::EntropySource`] and is
/// not retried.
pub fn generate_key<R: RngCore + CryptoRng>(rng: &mut R) -> Result<(PublicKey, SecretKey)> {
    let mut seed = Zeroizing::new([0u8; SECRET_KEY_LEN]);
    rng.try_fill_bytes(&mut seed[..])?;

    let secret_key = SecretKey(*seed);
    let public_key = secret_key.public_key();
    tracing::debug!("generated winternitz key pair");
    Ok((public_key, secret_key))
}

/// Generates a key pair from the operating system random number generator.
pub fn generate_key_from_os_rng() -> Result<(PublicKey, SecretKey)> {
    generate_key(&mut OsRng)
}

/// Signs `message` with `secret_key`. See [`SecretKey::sign`].
///
/// # One-time use
///
/// The caller must never sign two different messages with the same key.
/// Nothing here detects reuse.
pub fn sign<A: AsRef<[u8]>>(secret_key: &SecretKey, message: A) -> Signature {
    secret_key.sign(message)
}

/// Checks whether `signature` over `message` was made by the secret key of
/// `public_key`. Invalid signatures yield `false`, never an error.
pub fn verify<A: AsRef<[u8]>>(public_key: &PublicKey, message: A, signature: &Signature) -> bool {
    public_key.verify(message, signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn zero_seed_keys() -> (PublicKey, SecretKey) {
        let mut rng = ChaCha20Rng::from_seed([0u8; 32]);
        generate_key(&mut rng).unwrap()
    }

    struct ExhaustedRng;

    impl RngCore for ExhaustedRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {}

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            Err(rand::Error::new("entropy exhausted"))
        }
    }

    impl CryptoRng for ExhaustedRng {}

    #[test]
    fn end_to_end() {
        let (public_key, secret_key) = zero_seed_keys();
        let message = b"message";

        let signature = sign(&secret_key, message);
        assert!(verify(&public_key, message, &signature));
        assert!(!verify(&public_key, b"messagf", &signature));
        assert!(!verify(&public_key, b"", &signature));
    }

    #[test]
    fn key_generation_is_deterministic() {
        let (pk1, sk1) = zero_seed_keys();
        let (pk2, sk2) = zero_seed_keys();
        assert_eq!(pk1, pk2);
        assert_eq!(sk1.as_bytes(), sk2.as_bytes());
        assert_eq!(sk1.public_key(), pk1);
    }

    #[test]
    fn secret_key_is_the_first_entropy_bytes() {
        let mut rng = ChaCha20Rng::from_seed([0u8; 32]);
        let mut expected = [0u8; SECRET_KEY_LEN];
        rng.fill_bytes(&mut expected);

        let (_, secret_key) = zero_seed_keys();
        assert_eq!(secret_key.as_bytes(), &expected);
    }

    #[test]
    fn failing_entropy_source_is_reported() {
        let err = generate_key(&mut ExhaustedRng).unwrap_err();
        assert!(matches!(err, Error::EntropySource(_)));
        assert!(err.to_string().contains("entropy"));
    }

    #[test]
    fn signature_reveals_selected_chain_positions() {
        let (_, secret_key) = zero_seed_keys();
        let message = b"message";
        let signature = secret_key.sign(message);

        let positions = encode(message);
        let seeds = chain_seeds(secret_key.as_bytes());
        for i in 0..CHAINS {
            assert_eq!(signature.chains()[i], iterate(&seeds[i], positions[i]));
            assert_eq!(
                complete(&signature.chains()[i], positions[i]),
                iterate(&seeds[i], CHAIN_TOP)
            );
        }
    }

    #[test]
    fn signing_is_deterministic() {
        let (_, secret_key) = zero_seed_keys();
        assert_eq!(secret_key.sign(b"message"), secret_key.sign(b"message"));
    }

    #[test]
    fn empty_message() {
        let (public_key, secret_key) = zero_seed_keys();
        let signature = secret_key.sign(b"");
        assert!(public_key.verify(b"", &signature));
        assert!(!public_key.verify(b"\0", &signature));
    }

    #[test]
    fn any_mutated_message_byte_fails() {
        let (public_key, secret_key) = zero_seed_keys();
        let message = b"message".to_vec();
        let signature = secret_key.sign(&message);

        for i in 0..message.len() {
            let mut tampered = message.clone();
            tampered[i] ^= 0x01;
            assert!(!public_key.verify(&tampered, &signature));
        }
    }

    #[test]
    fn flipped_low_bit_anywhere_fails() {
        let (public_key, secret_key) = zero_seed_keys();
        let signature = secret_key.sign(b"message");

        for index in 0..SIGNATURE_LEN {
            let mut bytes = signature.to_bytes();
            bytes[index] ^= 0x01;
            assert!(
                !public_key.verify(b"message", &Signature::from(bytes)),
                "flipped byte {} still verifies",
                index
            );
        }
    }

    #[test]
    fn wrong_public_key_fails() {
        let (_, secret_key) = zero_seed_keys();
        let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
        let (other_public_key, _) = generate_key(&mut rng).unwrap();

        let signature = secret_key.sign(b"message");
        assert!(!other_public_key.verify(b"message", &signature));
    }

    #[test]
    fn byte_conversions() {
        let (public_key, secret_key) = zero_seed_keys();
        let signature = secret_key.sign(b"message");

        let bytes = signature.to_bytes();
        assert_eq!(Signature::try_from(&bytes[..]).unwrap(), signature);
        assert_eq!(&bytes[..HASH_LEN], &signature.chains()[0][..]);

        let pk_bytes: [u8; PUBLIC_KEY_LEN] = public_key.into();
        assert_eq!(PublicKey::try_from(&pk_bytes[..]).unwrap(), public_key);

        let restored = SecretKey::try_from(&secret_key.as_bytes()[..]).unwrap();
        assert_eq!(restored.public_key(), public_key);
    }

    #[test]
    fn malformed_lengths_are_rejected() {
        match Signature::try_from(&[0u8; SIGNATURE_LEN - 1][..]) {
            Err(Error::InvalidLength {
                kind,
                expected,
                actual,
            }) => {
                assert_eq!(kind, "signature");
                assert_eq!(expected, SIGNATURE_LEN);
                assert_eq!(actual, SIGNATURE_LEN - 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(PublicKey::try_from(&[0u8; 33][..]).is_err());
        assert!(SecretKey::try_from(&[0u8; 0][..]).is_err());
    }

    #[test]
    fn secret_key_debug_is_redacted() {
        let secret_key = SecretKey::from([0x5au8; SECRET_KEY_LEN]);
        let debug = format!("{:?}", secret_key);
        assert!(!debug.contains("90"));
        assert!(debug.contains("redacted"));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 32, .. ProptestConfig::default()
        })]

        #[test]
        fn really_works(seed in any::<[u8; 32]>(), s in "\\PC*") {
            let secret_key = SecretKey::from(seed);
            let public_key = secret_key.public_key();
            let message = s.as_bytes();

            let signature = secret_key.sign(message);
            prop_assert!(public_key.verify(message, &signature));
        }

        #[test]
        fn other_messages_fail(seed in any::<[u8; 32]>(), a in "\\PC*", b in "\\PC*") {
            prop_assume!(a != b);
            let secret_key = SecretKey::from(seed);
            let public_key = secret_key.public_key();

            let signature = secret_key.sign(a.as_bytes());
            prop_assert!(!public_key.verify(b.as_bytes(), &signature));
        }
    }
}
