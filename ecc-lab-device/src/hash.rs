//! Message-digest selection and the ECDSA truncation rule.
//!
//! Grounded on `hash/hash.h`'s `HASH_NONE`/`HASH_SHA1`/`HASH_SHA224`/
//! `HASH_SHA256`/`HASH_SHA384`/`HASH_SHA512` selector, wired here to the
//! RustCrypto `sha1`/`sha2` crates instead of the original's own digest
//! implementations.

use ecc_lab_core::config::HashAlgorithm;
use ecc_lab_core::BigInt;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

/// Digests `msg` under `algorithm`. `HashAlgorithm::None` passes the
/// message through unchanged, matching a degenerate "no hash" backend some
/// scenarios in spec §8 exercise directly on small inputs.
pub fn digest(algorithm: HashAlgorithm, msg: &[u8]) -> Vec<u8> {
    match algorithm {
        HashAlgorithm::None => msg.to_vec(),
        HashAlgorithm::Sha1 => Sha1::digest(msg).to_vec(),
        HashAlgorithm::Sha224 => Sha224::digest(msg).to_vec(),
        HashAlgorithm::Sha256 => Sha256::digest(msg).to_vec(),
        HashAlgorithm::Sha384 => Sha384::digest(msg).to_vec(),
        HashAlgorithm::Sha512 => Sha512::digest(msg).to_vec(),
    }
}

/// `e = H(m)` truncated from the left to `bitlen(n)` bits, spec §6.
pub fn truncate_to_order(digest: &[u8], order_bit_length: usize) -> BigInt {
    let e = BigInt::from_bytes_be(digest);
    let digest_bits = digest.len() * 8;
    if digest_bits > order_bit_length {
        e.shr(digest_bits - order_bit_length)
    } else {
        e
    }
}
