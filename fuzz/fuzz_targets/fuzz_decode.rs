#![no_main]

use glyph_sig::suite::Envelope;
use glyph_sig::traits::{KeyGen, SerDes, Signer, Verifier};
use glyph_sig::{Glyph, PrivateKey, PublicKey, Signature};
use libfuzzer_sys::fuzz_target;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

fuzz_target!(|data: &[u8]| {
    let glyph = Glyph::small().unwrap();
    let sizes = glyph.profile().encoded_sizes();

    // Envelope parsing must never panic, and must re-encode to the input when it succeeds
    if let Ok(env) = Envelope::from_bytes(data) {
        assert_eq!(env.to_bytes(), data);
    }

    // Stretch the input to each exact length so the content checks get exercised
    let stretch = |len: usize| data.iter().copied().cycle().take(len).collect::<Vec<u8>>();
    if data.is_empty() {
        return;
    }

    // A 'fuzzy' secret key rarely deserializes, but if it does it must sign
    if let Ok(sk) = PrivateKey::try_from_bytes(&glyph, &stretch(sizes.private_key)) {
        let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
        let sig = sk.try_sign_with_rng(&mut rng, &[0u8, 1, 2, 3]).unwrap();
        assert!(sk.get_public_key().verify(&[0u8, 1, 2, 3], &sig));
    }

    // A 'fuzzy' signature may deserialize but must not verify under an honest key
    let sig_bytes = stretch(sizes.signature);
    if let Ok(sig) = Signature::try_from_bytes(&glyph, &sig_bytes) {
        assert_eq!(sig.to_bytes(), sig_bytes);
        let (pk, _) = glyph.keygen_from_seed(&[42u8; 32]).unwrap();
        assert!(!pk.verify(&[0u8, 1, 2, 3], &sig));
    }

    // A 'fuzzy' public key re-encodes to itself
    let pk_bytes = stretch(sizes.public_key);
    if let Ok(pk) = PublicKey::try_from_bytes(&glyph, &pk_bytes) {
        assert_eq!(pk.to_bytes(), pk_bytes);
    }
});
