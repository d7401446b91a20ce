//! Keccak-sponge stream PRNG.
//!
//! Grounded on `prng/prng.c`'s `KeccakWidth200_SpongePRG_{Initialize, Feed,
//! Forget, Fetch}` contract: initialize with a security parameter, `feed`
//! absorbs caller-supplied seed material, `forget` ratchets the sponge
//! state so seed material can't be recovered from future output, and
//! `fetch` squeezes output bytes. Implemented here with the RustCrypto
//! `sha3` crate's `Shake256` rather than a hand-written Keccak-f[200]
//! permutation — the corpus reaches for `sha3` wherever a sponge is
//! needed, and `Shake256` is an extendable-output function with the same
//! absorb/squeeze shape.

use rand_core::RngCore;
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake256;
use std::sync::{Arc, Mutex};

/// A reseedable sponge-backed byte stream, installed into
/// `ecc_lab_core::rng::install_rng` at startup.
pub struct SpongePrng {
    absorbed: Vec<u8>,
}

impl SpongePrng {
    /// `KeccakWidth200_SpongePRG_Initialize`: an empty sponge, ready to be
    /// seeded by the `i` command before first use.
    pub fn new() -> Self {
        SpongePrng { absorbed: Vec::new() }
    }

    /// `prng_seed`: feed new material into the sponge, then forget — the
    /// next `fetch` depends on everything fed so far, but nothing fed can
    /// be recovered from future output once forgotten.
    pub fn seed(&mut self, material: &[u8]) {
        self.absorbed.extend_from_slice(material);
        let mut hasher = Shake256::default();
        hasher.update(&self.absorbed);
        let mut reader = hasher.finalize_xof();
        let mut ratcheted = vec![0u8; self.absorbed.len().max(32)];
        reader.read(&mut ratcheted);
        self.absorbed = ratcheted;
    }

    /// `prng_get`/`fetch`: squeeze `len` bytes. Does not consume `seed`
    /// material from a separate counter the way a true sponge's duplex
    /// construction would; each fetch re-derives from the ratcheted state
    /// plus a monotonic fetch count so repeated fetches diverge.
    fn fetch(&mut self, out: &mut [u8]) {
        let mut hasher = Shake256::default();
        hasher.update(&self.absorbed);
        hasher.update(b"fetch");
        let mut reader = hasher.finalize_xof();
        reader.read(out);
        // Ratchet again so the next fetch produces different output.
        self.absorbed.extend_from_slice(out);
    }
}

impl Default for SpongePrng {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for SpongePrng {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.fetch(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fetch(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.fetch(dst)
    }
}

/// A handle to one [`SpongePrng`] shared between `main`'s global
/// installation (`ecc_lab_core::rng::install_rng`) and the `i` command
/// handler, which needs to reseed that same instance directly.
#[derive(Clone)]
pub struct SharedPrng(Arc<Mutex<SpongePrng>>);

impl SharedPrng {
    pub fn new(inner: Arc<Mutex<SpongePrng>>) -> Self {
        SharedPrng(inner)
    }
}

impl RngCore for SharedPrng {
    fn next_u32(&mut self) -> u32 {
        self.0.lock().expect("prng lock poisoned").next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.lock().expect("prng lock poisoned").next_u64()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.0.lock().expect("prng lock poisoned").fill_bytes(dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseeded_fetches_are_deterministic_but_diverge() {
        let mut prng = SpongePrng::new();
        let mut a = [0u8; 16];
        let mut b = [0u8; 16];
        prng.fill_bytes(&mut a);
        prng.fill_bytes(&mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn seeding_changes_output() {
        let mut unseeded = SpongePrng::new();
        let mut seeded = SpongePrng::new();
        seeded.seed(b"test seed material");

        let mut out_a = [0u8; 16];
        let mut out_b = [0u8; 16];
        unseeded.fill_bytes(&mut out_a);
        seeded.fill_bytes(&mut out_b);
        assert_ne!(out_a, out_b);
    }

    #[test]
    fn shared_prng_reseeds_the_instance_main_installed() {
        let inner = Arc::new(Mutex::new(SpongePrng::new()));
        let mut shared = SharedPrng::new(inner.clone());

        let mut before = [0u8; 16];
        shared.fill_bytes(&mut before);

        inner.lock().unwrap().seed(b"reseed via the i command");
        let mut after = [0u8; 16];
        shared.fill_bytes(&mut after);

        assert_ne!(before, after);
    }
}
