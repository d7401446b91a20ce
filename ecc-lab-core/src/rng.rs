//! Process-wide injected random source.
//!
//! Spec §4.1/§5: "The random source is injected as a process-wide callback
//! (set once at initialisation)." A `OnceLock<Mutex<Box<dyn RngCore +
//! Send>>>` plays that role here; `install_rng` is the one-shot setter and
//! `with_rng` is how [`crate::bigint::BigInt::rand_mod_sample`]/
//! [`crate::bigint::BigInt::rand_mod_reduce`] callers reach it without
//! threading a `&mut dyn RngCore` through every scalar-generation call site.

use crate::error::{Error, Result};
use rand_core::RngCore;
use std::sync::{Mutex, OnceLock};

static RNG: OnceLock<Mutex<Box<dyn RngCore + Send>>> = OnceLock::new();

/// Installs the process-wide random source. Spec: set once at
/// initialisation; a second call is a programming error, not a runtime one
/// the caller should retry, so it returns [`Error::InvalidInput`] rather
/// than silently replacing the source.
pub fn install_rng(rng: Box<dyn RngCore + Send>) -> Result<()> {
    RNG.set(Mutex::new(rng)).map_err(|_| Error::InvalidInput)
}

/// Runs `f` with exclusive access to the installed random source.
/// [`Error::InvalidInput`] if no source has been installed yet.
pub fn with_rng<T>(f: impl FnOnce(&mut dyn RngCore) -> T) -> Result<T> {
    let cell = RNG.get().ok_or(Error::InvalidInput)?;
    let mut guard = cell.lock().map_err(|_| Error::InvalidInput)?;
    Ok(f(&mut **guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::{impls, RngCore};

    struct Fixed(u64);
    impl RngCore for Fixed {
        fn next_u32(&mut self) -> u32 {
            self.0 as u32
        }
        fn next_u64(&mut self) -> u64 {
            self.0
        }
        fn fill_bytes(&mut self, dst: &mut [u8]) {
            impls::fill_bytes_via_next(self, dst)
        }
    }

    #[test]
    fn installed_source_is_reachable() {
        let _ = install_rng(Box::new(Fixed(42)));
        let value = with_rng(|rng| rng.next_u64()).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn second_install_is_rejected() {
        let _ = install_rng(Box::new(Fixed(1)));
        assert!(install_rng(Box::new(Fixed(2))).is_err());
    }
}
