// This file implements the parallel signing engine: a pool of workers racing independent
// attempts, a single-slot completion channel and cooperative cancellation

use crate::glyph::sign_attempt;
use crate::types::{PrivateKey, Signature};
use crate::Error;
use crossbeam_channel::{bounded, RecvTimeoutError, Sender, TrySendError};
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rand_core::CryptoRngCore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;
use tracing::{debug, trace, warn};


type Outcome = Result<Signature, Error>;


/// Raises the cancellation flag when dropped, so every exit path stops the workers.
struct CancelOnDrop<'a>(&'a AtomicBool);

impl Drop for CancelOnDrop<'_> {
    fn drop(&mut self) { self.0.store(true, Ordering::Release); }
}


/// Signs `message` with a pool of `profile.worker_count()` workers. Each worker runs
/// attempts from its own `ChaCha20` stream, seeded up front from `rng`. The first
/// accepted signature (or error) is returned; the rest of the pool is cancelled and
/// joined before this function returns.
///
/// # Errors
/// Returns [`Error::SignTimeout`] when no worker succeeds within `profile.sign_timeout`,
/// [`Error::Rng`] when seeding fails, and propagates errors raised by an attempt.
pub(crate) fn sign(sk: &PrivateKey, message: &[u8], rng: &mut impl CryptoRngCore) -> Outcome {
    let profile = sk.glyph.profile();
    let workers = profile.worker_count();
    let seeds = (0..workers)
        .map(|_| {
            let mut seed = [0u8; 32];
            rng.try_fill_bytes(&mut seed).map_err(Error::Rng)?;
            Ok(seed)
        })
        .collect::<Result<Vec<[u8; 32]>, Error>>()?;

    let start = Instant::now();
    let cancel = AtomicBool::new(false);
    let (tx, rx) = bounded::<Outcome>(1);
    debug!(suite = %profile.name, workers, "signing pool started");

    let received = thread::scope(|scope| {
        let _cancel_guard = CancelOnDrop(&cancel);
        for (id, seed) in seeds.into_iter().enumerate() {
            let tx = tx.clone();
            let cancel = &cancel;
            let _worker = scope.spawn(move || worker(id, sk, message, seed, cancel, &tx));
        }
        drop(tx);
        rx.recv_timeout(profile.sign_timeout)
    });

    match received {
        Ok(outcome) => outcome,
        Err(RecvTimeoutError::Timeout) => {
            let elapsed = start.elapsed();
            warn!(suite = %profile.name, ?elapsed, "signing timed out");
            Err(Error::SignTimeout { elapsed })
        }
        Err(RecvTimeoutError::Disconnected) => {
            Err(Error::InvariantViolation("signing workers exited without a result"))
        }
    }
}


fn worker(
    id: usize, sk: &PrivateKey, message: &[u8], seed: [u8; 32], cancel: &AtomicBool,
    tx: &Sender<Outcome>,
) {
    let mut rng = ChaCha20Rng::from_seed(seed);
    let mut attempts = 0u64;
    while !cancel.load(Ordering::Acquire) {
        attempts += 1;
        let outcome = match sign_attempt(sk, message, &mut rng) {
            Ok(None) => {
                trace!(worker = id, attempts, "attempt rejected");
                continue;
            }
            Ok(Some(sig)) => {
                debug!(worker = id, attempts, "signature accepted");
                Ok(sig)
            }
            Err(err) => Err(err),
        };
        // first writer wins; later results are dropped
        match tx.try_send(outcome) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => trace!(worker = id, "result discarded"),
            Err(TrySendError::Disconnected(_)) => trace!(worker = id, "caller gone, result discarded"),
        }
        cancel.store(true, Ordering::Release);
        return;
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::{key_gen, verify};
    use crate::params::Profile;
    use crate::types::Glyph;
    use std::num::NonZeroUsize;
    use std::time::Duration;

    #[test]
    fn test_pool_signs_and_returns() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(21);
        let profile = Profile { workers: NonZeroUsize::new(4), ..Profile::small() };
        let glyph = Glyph::new(profile).unwrap();
        let (pk, sk) = key_gen(&glyph, &mut rng).unwrap();
        for i in 0..3u8 {
            let sig = sign(&sk, &[i], &mut rng).unwrap();
            assert!(verify(&pk, &[i], &sig));
        }
    }

    #[test]
    fn test_surplus_results_are_dropped() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(23);
        // eight workers race for the single result slot
        let profile = Profile { workers: NonZeroUsize::new(8), ..Profile::small() };
        let glyph = Glyph::new(profile).unwrap();
        let (pk, sk) = key_gen(&glyph, &mut rng).unwrap();
        for i in 0..4u8 {
            let sig = sign(&sk, &[i, i], &mut rng).unwrap();
            assert!(verify(&pk, &[i, i], &sig));
        }
    }

    #[test]
    fn test_pool_times_out() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(22);
        // b = omega + 1 leaves a zero-width acceptance window
        let profile = Profile {
            b: 17,
            sign_timeout: Duration::from_millis(200),
            workers: NonZeroUsize::new(2),
            ..Profile::small()
        };
        let glyph = Glyph::new(profile).unwrap();
        let (_pk, sk) = key_gen(&glyph, &mut rng).unwrap();
        let started = Instant::now();
        let result = sign(&sk, b"never", &mut rng);
        assert!(matches!(result, Err(Error::SignTimeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(30));
    }
}
