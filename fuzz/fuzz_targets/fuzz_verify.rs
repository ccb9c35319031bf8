#![no_main]
use glyph_sig::traits::{KeyGen, SerDes, Verifier};
use glyph_sig::{Glyph, Signature};
use libfuzzer_sys::fuzz_target;


fuzz_target!(|data: &[u8]| {
    // Static keypair (for speed)
    let glyph = Glyph::small().unwrap();
    let (pk, _sk) = glyph.keygen_from_seed(&[42u8; 32]).unwrap();
    let sig_len = glyph.profile().encoded_sizes().signature;

    // Use the data as both the message and a 'fuzzy' signature
    if data.len() < sig_len {
        return;
    }
    let (sig_bytes, msg) = data.split_at(sig_len);
    if let Ok(sig) = Signature::try_from_bytes(&glyph, sig_bytes) {
        assert!(!pk.verify(msg, &sig));
    }
});
