use crate::types::Glyph;
use crate::Error;
use rand_core::CryptoRngCore;
#[cfg(feature = "default-rng")]
use rand_core::OsRng;


/// The `KeyGen` trait is implemented by [`Glyph`], the per-profile context.
pub trait KeyGen {
    /// A public key bound to this context's profile
    type PublicKey;
    /// A private (secret) key bound to this context's profile
    type PrivateKey;

    /// Generates a public and private key pair for this profile. <br>
    /// This function utilizes the OS default random number generator.
    /// # Errors
    /// Returns an error when the random number generator fails.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use glyph_sig::Glyph;
    /// use glyph_sig::traits::{KeyGen, Signer, Verifier};
    ///
    /// let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
    ///
    /// let glyph = Glyph::small()?;
    /// let (pk, sk) = glyph.try_keygen()?; // Generate both public and secret keys
    /// let sig = sk.try_sign(&message)?; // Use the secret key to generate a message signature
    /// assert!(pk.verify(&message, &sig));
    /// # Ok(())}
    /// ```
    #[cfg(feature = "default-rng")]
    fn try_keygen(&self) -> Result<(Self::PublicKey, Self::PrivateKey), Error> {
        self.try_keygen_with_rng(&mut OsRng)
    }

    /// Generates a public and private key pair for this profile using a supplied
    /// random number generator.
    /// # Errors
    /// Returns an error when the random number generator fails.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use glyph_sig::Glyph;
    /// use glyph_sig::traits::{KeyGen, Signer};
    /// use rand_chacha::rand_core::SeedableRng;
    ///
    /// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
    /// let (pk, sk) = Glyph::small()?.try_keygen_with_rng(&mut rng)?;
    /// assert_eq!(sk.get_public_key(), pk);
    /// # Ok(())}
    /// ```
    fn try_keygen_with_rng(
        &self, rng: &mut impl CryptoRngCore,
    ) -> Result<(Self::PublicKey, Self::PrivateKey), Error>;

    /// Deterministically derives a key pair from a 32-byte seed.
    /// # Errors
    /// Propagates internal errors.
    fn keygen_from_seed(&self, seed: &[u8; 32]) -> Result<(Self::PublicKey, Self::PrivateKey), Error>;
}


/// The Signer trait is implemented for the [`crate::PrivateKey`] struct.
pub trait Signer {
    /// The signature type produced
    type Signature;
    /// The matching public key type
    type PublicKey;

    /// Attempt to sign the given message with the OS default random number generator.
    /// Attempts run in parallel on a worker pool until one passes rejection or the
    /// profile's deadline expires.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails or signing times out.
    #[cfg(feature = "default-rng")]
    fn try_sign(&self, message: &[u8]) -> Result<Self::Signature, Error> {
        self.try_sign_with_rng(&mut OsRng, message)
    }

    /// Attempt to sign the given message with a supplied random number generator, which
    /// seeds one independent stream per worker.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails or signing times out.
    fn try_sign_with_rng(
        &self, rng: &mut impl CryptoRngCore, message: &[u8],
    ) -> Result<Self::Signature, Error>;

    /// Recomputes the public key `t = a·s + e`.
    fn get_public_key(&self) -> Self::PublicKey;
}


/// The Verifier trait is implemented for the [`crate::PublicKey`] struct.
pub trait Verifier {
    /// The signature type checked
    type Signature;

    /// Verifies a signature with respect to this public key. Malformed or foreign-profile
    /// signatures simply fail; this function never errors.
    fn verify(&self, message: &[u8], signature: &Self::Signature) -> bool;
}


/// The `SerDes` trait provides validated serialization and deserialization. Sizes are fixed
/// per profile, so decoding needs the [`Glyph`] context the bytes belong to.
pub trait SerDes {
    /// Produces the exact-length wire encoding.
    fn to_bytes(&self) -> Vec<u8>;

    /// Decodes and validates bytes produced for the given context.
    /// # Errors
    /// Returns [`Error::Decode`] on malformed input.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use glyph_sig::{Glyph, PublicKey};
    /// use glyph_sig::traits::{KeyGen, SerDes};
    /// use rand_chacha::rand_core::SeedableRng;
    ///
    /// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
    /// let glyph = Glyph::small()?;
    /// let (pk, _sk) = glyph.try_keygen_with_rng(&mut rng)?;
    /// let pk_bytes = pk.to_bytes();
    /// let pk2 = PublicKey::try_from_bytes(&glyph, &pk_bytes)?;
    /// assert_eq!(pk, pk2);
    /// # Ok(())}
    /// ```
    fn try_from_bytes(glyph: &Glyph, bytes: &[u8]) -> Result<Self, Error>
    where
        Self: Sized;
}
