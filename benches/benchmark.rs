use criterion::{criterion_group, criterion_main, Criterion};
use glyph_sig::traits::{KeyGen, SerDes, Signer, Verifier};
use glyph_sig::{Glyph, Profile, Signature};
use std::num::NonZeroUsize;


pub fn criterion_benchmark(c: &mut Criterion) {
    let message = [0u8, 1, 2, 3, 4, 5, 6, 7];

    let small = Glyph::small().unwrap();
    let (pk_small, sk_small) = small.try_keygen().unwrap();
    let sig_small = sk_small.try_sign(&message).unwrap();
    let sig_small_bytes = sig_small.to_bytes();

    let general = Glyph::general().unwrap();
    let (pk_general, sk_general) = general.try_keygen().unwrap();
    let sig_general = sk_general.try_sign(&message).unwrap();

    // single worker, to separate attempt cost from pool overhead
    let single = Glyph::new(Profile { workers: NonZeroUsize::new(1), ..Profile::small() }).unwrap();
    let (_, sk_single) = single.try_keygen().unwrap();


    c.bench_function("glyph-small keygen", |b| b.iter(|| small.try_keygen()));
    c.bench_function("glyph-small sign", |b| b.iter(|| sk_small.try_sign(&message)));
    c.bench_function("glyph-small sign 1 worker", |b| b.iter(|| sk_single.try_sign(&message)));
    c.bench_function("glyph-small verify", |b| b.iter(|| pk_small.verify(&message, &sig_small)));
    c.bench_function("glyph-small sig decode", |b| {
        b.iter(|| Signature::try_from_bytes(&small, &sig_small_bytes))
    });

    c.bench_function("glyph keygen", |b| b.iter(|| general.try_keygen()));
    c.bench_function("glyph sign", |b| b.iter(|| sk_general.try_sign(&message)));
    c.bench_function("glyph verify", |b| b.iter(|| pk_general.verify(&message, &sig_general)));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

// cargo bench
