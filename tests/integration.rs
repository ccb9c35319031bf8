use glyph_sig::suite::{Envelope, GlyphSuite, Registry, Suite};
use glyph_sig::traits::{KeyGen, SerDes, Signer, Verifier};
use glyph_sig::{DecodeError, Error, Glyph, PrivateKey, Profile, PublicKey, Signature};
use rand_chacha::rand_core::SeedableRng;
use rand_core::{CryptoRng, RngCore};
use std::num::NonZeroU32;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

// cargo flamegraph --test integration

// $ cargo test --release -- --nocapture --ignored
#[ignore]
#[test]
fn forever() {
    let mut msg = [0u8; 32];
    let mut i = 0u64;
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
    let glyph = Glyph::small().unwrap();
    loop {
        rng.fill_bytes(&mut msg);
        let (pk, sk) = glyph.try_keygen_with_rng(&mut rng).unwrap();
        let sig = sk.try_sign(&msg).unwrap();
        assert!(pk.verify(&msg, &sig));
        if i % 1000 == 0 {println!("So far i: {}", i)};
        i += 1;
    }
}


#[test]
fn test_small_rounds() {
    let mut msg = [0u8, 1, 2, 3, 4, 5, 6, 7];
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
    let glyph = Glyph::small().unwrap();
    for i in 0..8 {
        msg[0] = i as u8;
        let (pk, sk) = glyph.try_keygen_with_rng(&mut rng).unwrap();
        let sig = sk.try_sign_with_rng(&mut rng, &msg).unwrap();
        assert!(pk.verify(&msg, &sig))
    }
}

#[test]
fn test_general_rounds() {
    let mut msg = [0u8, 1, 2, 3, 4, 5, 6, 7];
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(456);
    let glyph = Glyph::general().unwrap();
    for i in 0..4 {
        msg[0] = i as u8;
        let (pk, sk) = glyph.try_keygen_with_rng(&mut rng).unwrap();
        let sig = sk.try_sign_with_rng(&mut rng, &msg).unwrap();
        assert!(pk.verify(&msg, &sig));
        let bound = glyph.profile().z_bound();
        for (z_k, &q) in sig.z1().residues().iter().zip(&glyph.profile().moduli) {
            assert!(z_k.iter().all(|&x| x.min(q - x) <= bound));
        }
    }
}

#[test]
fn test_three_moduli() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(789);
    let glyph = Glyph::new(Profile::general(&[59393, 61441, 65537])).unwrap();
    let (pk, sk) = glyph.try_keygen_with_rng(&mut rng).unwrap();
    let sig = sk.try_sign_with_rng(&mut rng, b"three").unwrap();
    assert!(pk.verify(b"three", &sig));
    assert_eq!(sig.c().residues().len(), 3);
}

#[test]
fn test_deadbeef_scenario() {
    let msg = b"deadbeef";
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0xdead_beef);
    let glyph = Glyph::small().unwrap();
    let (pk, sk) = glyph.try_keygen_with_rng(&mut rng).unwrap();
    let sig = sk.try_sign_with_rng(&mut rng, msg).unwrap();
    assert!(pk.verify(msg, &sig));

    // last byte of z1's encoding, kept below q so the buffer still decodes
    let mut bytes = sig.to_bytes();
    let z1_last = glyph.profile().encoded_sizes().public_key - 1;
    bytes[z1_last] = if bytes[z1_last] == 0 { 1 } else { bytes[z1_last] - 1 };
    let tampered = Signature::try_from_bytes(&glyph, &bytes).unwrap();
    assert!(!pk.verify(msg, &tampered));

    let sig_bytes = sig.to_bytes();
    let err = Signature::try_from_bytes(&glyph, &sig_bytes[..sig_bytes.len() - 1]).unwrap_err();
    assert!(matches!(err, Error::Decode(DecodeError::Length { .. })));
}

#[test]
fn test_small_no_verif() {
    let msg = [0u8, 1, 2, 3, 4, 5, 6, 7];
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
    let glyph = Glyph::small().unwrap();
    let (pk, sk) = glyph.try_keygen_with_rng(&mut rng).unwrap();
    let sig = sk.try_sign_with_rng(&mut rng, &msg).unwrap();

    // Bad messages
    for i in 0..8 {
        let mut msg_bad = msg;
        msg_bad[i] ^= 0x08;
        assert!(!pk.verify(&msg_bad, &sig));
    }

    // Bad public key
    let (pk_bad, _) = glyph.try_keygen_with_rng(&mut rng).unwrap();
    assert!(!pk_bad.verify(&msg, &sig));

    // Bad challenge encodings: flip a low bit of several sparse entries
    let sig_bytes = sig.to_bytes();
    let c_start = sig_bytes.len() - 2 * glyph.profile().challenge_weight();
    for entry in [0, 5, 15] {
        let mut bytes = sig_bytes.clone();
        bytes[c_start + 2 * entry] ^= 0x01;
        match Signature::try_from_bytes(&glyph, &bytes) {
            Ok(sig_bad) => assert!(!pk.verify(&msg, &sig_bad)),
            Err(err) => assert!(matches!(err, Error::Decode(_))),
        }
    }
}

#[test]
fn test_serdes_round_trip() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(321);
    for glyph in [Glyph::small().unwrap(), Glyph::general().unwrap()] {
        let sizes = glyph.profile().encoded_sizes();
        let (pk, sk) = glyph.try_keygen_with_rng(&mut rng).unwrap();
        let sig = sk.try_sign_with_rng(&mut rng, b"serdes").unwrap();

        let sk_bytes = sk.to_bytes();
        assert_eq!(sk_bytes.len(), sizes.private_key);
        let sk2 = PrivateKey::try_from_bytes(&glyph, &sk_bytes).unwrap();
        assert_eq!(sk2.to_bytes(), sk_bytes);
        assert_eq!(sk2.get_public_key(), pk);

        let pk_bytes = pk.to_bytes();
        assert_eq!(pk_bytes.len(), sizes.public_key);
        assert_eq!(PublicKey::try_from_bytes(&glyph, &pk_bytes).unwrap(), pk);

        let sig_bytes = sig.to_bytes();
        assert_eq!(sig_bytes.len(), sizes.signature);
        let sig2 = Signature::try_from_bytes(&glyph, &sig_bytes).unwrap();
        assert_eq!(sig2, sig);
        assert!(pk.verify(b"serdes", &sig2));
    }
}

#[test]
fn test_public_key_is_not_a_private_key() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(5);
    let glyph = Glyph::small().unwrap();
    let (pk, _sk) = glyph.try_keygen_with_rng(&mut rng).unwrap();
    let mut bytes = pk.to_bytes();
    bytes.extend_from_slice(&pk.to_bytes());
    let err = PrivateKey::try_from_bytes(&glyph, &bytes).unwrap_err();
    assert!(matches!(err, Error::Decode(DecodeError::NotTernary { .. })));
}

#[test]
fn test_keygen_from_seed() {
    let glyph = Glyph::small().unwrap();
    let (pk1, sk1) = glyph.keygen_from_seed(&[7u8; 32]).unwrap();
    let (pk2, sk2) = glyph.keygen_from_seed(&[7u8; 32]).unwrap();
    let (pk3, _) = glyph.keygen_from_seed(&[8u8; 32]).unwrap();
    assert_eq!(pk1, pk2);
    assert_eq!(sk1.to_bytes(), sk2.to_bytes());
    assert_ne!(pk1, pk3);
}

#[test]
fn test_concurrent_signers() {
    let glyph = Glyph::new(Profile { workers: NonZeroUsize::new(2), ..Profile::small() }).unwrap();
    let (pk, sk) = glyph.keygen_from_seed(&[1u8; 32]).unwrap();
    std::thread::scope(|s| {
        for t in 0..4u8 {
            let (pk, sk) = (&pk, &sk);
            let _handle = s.spawn(move || {
                let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(u64::from(t));
                let msg = [t; 16];
                let sig = sk.try_sign_with_rng(&mut rng, &msg).unwrap();
                assert!(pk.verify(&msg, &sig));
            });
        }
    });
}

#[test]
fn test_sign_timeout() {
    let profile = Profile {
        b: 17,
        sign_timeout: Duration::from_millis(100),
        workers: NonZeroUsize::new(2),
        ..Profile::small()
    };
    let glyph = Glyph::new(profile).unwrap();
    let (_pk, sk) = glyph.keygen_from_seed(&[2u8; 32]).unwrap();
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(9);
    match sk.try_sign_with_rng(&mut rng, b"too tight") {
        Err(Error::SignTimeout { elapsed }) => assert!(elapsed >= Duration::from_millis(100)),
        other => panic!("expected timeout, got {other:?}"),
    }
}


struct FailingRng;

impl RngCore for FailingRng {
    fn next_u32(&mut self) -> u32 { 0 }

    fn next_u64(&mut self) -> u64 { 0 }

    fn fill_bytes(&mut self, dest: &mut [u8]) { dest.fill(0) }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand_core::Error> {
        Err(NonZeroU32::new(rand_core::Error::CUSTOM_START).unwrap().into())
    }
}

impl CryptoRng for FailingRng {}

#[test]
fn test_rng_failure_is_reported() {
    let glyph = Glyph::small().unwrap();
    assert!(matches!(glyph.try_keygen_with_rng(&mut FailingRng), Err(Error::Rng(_))));
    let (_pk, sk) = glyph.keygen_from_seed(&[3u8; 32]).unwrap();
    assert!(matches!(sk.try_sign_with_rng(&mut FailingRng, b"m"), Err(Error::Rng(_))));
}

#[test]
fn test_profile_validation_on_construction() {
    assert!(matches!(Glyph::new(Profile::general(&[65521])), Err(Error::InvalidProfile(_))));
    assert!(matches!(
        Glyph::new(Profile { n: 48, ..Profile::small() }),
        Err(Error::InvalidProfile(_))
    ));
}

#[test]
fn test_registry_round_trip() {
    let registry = Registry::with_defaults().unwrap();
    for name in ["glyph-small", "glyph"] {
        let (pk, sk) = registry.keygen(name).unwrap();
        assert_eq!(pk.suite(), name);
        let sig = registry.sign(&sk, b"registry").unwrap();
        registry.verify(&pk, &sig, b"registry").unwrap();
        assert!(matches!(registry.verify(&pk, &sig, b"registrz"), Err(Error::VerificationFailed)));

        // envelopes survive their own byte encoding
        let pk2 = Envelope::from_bytes(&pk.to_bytes()).unwrap();
        let sig2 = Envelope::from_bytes(&sig.to_bytes()).unwrap();
        registry.verify(&pk2, &sig2, b"registry").unwrap();
    }
}

#[test]
fn test_registry_cross_suite() {
    let registry = Registry::with_defaults().unwrap();
    let (pk_small, _) = registry.keygen("glyph-small").unwrap();
    let (_, sk_general) = registry.keygen("glyph").unwrap();
    let sig_general = registry.sign(&sk_general, b"x").unwrap();
    assert!(matches!(
        registry.verify(&pk_small, &sig_general, b"x"),
        Err(Error::MismatchedSuite { .. })
    ));

    // a payload relabelled with another suite's name fails to decode there
    let relabelled = Envelope::new("glyph-small", sig_general.payload().to_vec()).unwrap();
    assert!(matches!(
        registry.verify(&pk_small, &relabelled, b"x"),
        Err(Error::Decode(DecodeError::Length { .. }))
    ));
}

#[test]
fn test_registry_concurrent_register() {
    let registry = Registry::new();
    let winners: Vec<Arc<dyn Suite>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    let suite = GlyphSuite::new(Profile::small()).unwrap();
                    registry.register(Arc::new(suite))
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(winners.iter().all(|w| Arc::ptr_eq(w, &winners[0])));
    assert_eq!(registry.names(), vec!["glyph-small".to_owned()]);
}

#[test]
fn test_typed_pack_unpack() {
    let suite = GlyphSuite::new(Profile::small()).unwrap();
    let (pk, sk) = suite.glyph().keygen_from_seed(&[4u8; 32]).unwrap();
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(4);
    let sig = sk.try_sign_with_rng(&mut rng, b"typed").unwrap();

    let pk_env = suite.pack_public_key(&pk).unwrap();
    let sig_env = suite.pack_signature(&sig).unwrap();
    let sk_env = suite.pack_private_key(&sk).unwrap();
    assert_eq!(suite.unpack_public_key(&pk_env).unwrap(), pk);
    assert_eq!(suite.unpack_signature(&sig_env).unwrap(), sig);
    assert_eq!(suite.unpack_private_key(&sk_env).unwrap().to_bytes(), sk.to_bytes());
    suite.verify(&pk_env, &sig_env, b"typed").unwrap();

    let other = GlyphSuite::new(Profile::general_default()).unwrap();
    assert!(matches!(other.pack_public_key(&pk), Err(Error::MismatchedSuite { .. })));
}

#[test]
fn test_signing_knobs_do_not_split_suites() {
    let plain = Glyph::small().unwrap();
    let tuned = Glyph::new(Profile {
        workers: NonZeroUsize::new(2),
        sign_timeout: Duration::from_secs(60),
        ..Profile::small()
    })
    .unwrap();
    let (pk, sk) = plain.keygen_from_seed(&[6u8; 32]).unwrap();

    // same key material loaded under a context with a different pool configuration
    let sk_tuned = PrivateKey::try_from_bytes(&tuned, &sk.to_bytes()).unwrap();
    assert_eq!(sk_tuned.get_public_key(), pk);
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(6);
    let sig = sk_tuned.try_sign_with_rng(&mut rng, b"knobs").unwrap();
    assert!(pk.verify(b"knobs", &sig));
    let sig_plain = Signature::try_from_bytes(&plain, &sig.to_bytes()).unwrap();
    assert_eq!(sig_plain, sig);

    let suite = GlyphSuite::new(Profile::small()).unwrap();
    let sig_env = suite.pack_signature(&sig).unwrap();
    let pk_env = suite.pack_public_key(&pk).unwrap();
    suite.verify(&pk_env, &sig_env, b"knobs").unwrap();
}
