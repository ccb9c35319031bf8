#![no_main]
use glyph_sig::traits::{KeyGen, SerDes, Signer, Verifier};
use glyph_sig::{Glyph, Profile, Signature};
use libfuzzer_sys::fuzz_target;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;
use std::num::NonZeroUsize;


// Helper to create deterministic RNG from data
fn create_rng(seed_data: &[u8]) -> ChaCha20Rng {
    let mut seed = [0u8; 32];
    let len = seed_data.len().min(32);
    seed[..len].copy_from_slice(&seed_data[..len]);
    ChaCha20Rng::from_seed(seed)
}


fuzz_target!(|data: &[u8]| {
    // Skip empty inputs
    if data.is_empty() {
        return;
    }

    let mut rng = create_rng(data);
    let profile = Profile { workers: NonZeroUsize::new(2), ..Profile::small() };
    let glyph = Glyph::new(profile).unwrap();
    let (pk, sk) = glyph.try_keygen_with_rng(&mut rng).unwrap();

    // Sign, verify, and check the signature survives serialization
    let sig1 = sk.try_sign_with_rng(&mut rng, data).unwrap();
    assert!(pk.verify(data, &sig1));
    let sig1b = Signature::try_from_bytes(&glyph, &sig1.to_bytes()).unwrap();
    assert!(pk.verify(data, &sig1b));

    // Signing twice gives a different, equally valid signature
    let sig2 = sk.try_sign_with_rng(&mut rng, data).unwrap();
    assert!(sig1 != sig2);
    assert!(pk.verify(data, &sig2));

    // Derived public key agrees
    assert!(sk.get_public_key() == pk);

    // Modified message should not verify
    let mut modified = data.to_vec();
    modified[0] ^= 1;
    assert!(!pk.verify(&modified, &sig1));
});
