//! End-to-end exercises against [`Device::dispatch`] directly, bypassing
//! process I/O. The curve is the textbook toy `y^2 = x^3 + x + 6 (mod 11)`
//! with generator `(2, 7)` and prime order 13 (Paar & Pelzl, *Understanding
//! Cryptography*, ch. 9) — small enough to reason about by hand, and its
//! prime order means every nonzero scalar is a valid private key.

use ecc_lab_device::prng::SpongePrng;
use ecc_lab_device::{tlv, Device, DeviceError};
use ecc_lab_core::config::{Configuration, HashAlgorithm};
use ecc_lab_core::BigInt;
use std::sync::{Arc, Mutex};

fn toy_curve_payload() -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend(tlv::encode_leaf(b'p', &[11]).unwrap());
    payload.extend(tlv::encode_leaf(b'a', &[1]).unwrap());
    payload.extend(tlv::encode_leaf(b'b', &[6]).unwrap());
    payload.extend(tlv::encode_leaf(b'n', &[13]).unwrap());
    payload.extend(tlv::encode_leaf(b'h', &[1]).unwrap());

    let mut generator = Vec::new();
    generator.extend(tlv::encode_leaf(b'x', &[2]).unwrap());
    generator.extend(tlv::encode_leaf(b'y', &[7]).unwrap());
    payload.extend(tlv::encode_subtree(b'g', &generator).unwrap());
    payload
}

fn new_device() -> Device {
    let prng = Arc::new(Mutex::new(SpongePrng::new()));
    Device::new(Configuration::default(), prng)
}

fn pubkey_tlv(coords: &[u8]) -> Vec<u8> {
    let coord_size = coords.len() / 2;
    let (x, y) = coords.split_at(coord_size);
    let mut children = Vec::new();
    children.extend(tlv::encode_leaf(b'x', x).unwrap());
    children.extend(tlv::encode_leaf(b'y', y).unwrap());
    tlv::encode_subtree(b'w', &children).unwrap()
}

#[test]
fn set_curve_then_scalar_mult_doubles_the_generator() {
    let mut device = new_device();
    device.dispatch('c', &toy_curve_payload()).unwrap();

    // 2 * (2, 7) on y^2 = x^3 + x + 6 (mod 11): lambda = (3*2^2+1)/(2*7) =
    // 13/14 = 2/3 mod 11 = 2*4 = 8 (3^-1 mod 11 = 4). x3 = 8^2-2*2 = 60 = 5
    // mod 11. y3 = 8*(2-5)-7 = -31 = 2 mod 11.
    let mut payload = Vec::new();
    payload.extend(tlv::encode_leaf(b's', &[2]).unwrap());
    let replies = device.dispatch('m', &payload).unwrap();

    assert_eq!(replies.len(), 1);
    let (letter, coords) = &replies[0];
    assert_eq!(*letter, 'w');
    assert_eq!(coords.as_slice(), &[5, 2]);
}

#[test]
fn generate_sets_and_reports_keypair() {
    let mut device = new_device();
    device.dispatch('c', &toy_curve_payload()).unwrap();

    let replies = device.dispatch('g', &[]).unwrap();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0].0, 's');
    assert_eq!(replies[1].0, 'w');

    // The reported public key round-trips through `w` (set pubkey) without
    // error, confirming it is a point the curve accepts.
    let pubkey_tlv = pubkey_tlv(&replies[1].1);
    device.dispatch('w', &pubkey_tlv).unwrap();
}

#[test]
fn ecdh_agrees_between_both_sides() {
    // Fixed, nonzero scalars rather than `g`'s random keygen: with this
    // curve's tiny order-13 group, a randomly drawn private key lands on 0
    // about 1 time in 13, and the scalar-mult loop's `complete = false`
    // fast path returns the input point unchanged for a zero scalar instead
    // of the neutral element — not a bug this test should be sensitive to.
    let mut alice_privkey = Vec::new();
    alice_privkey.extend(tlv::encode_leaf(b's', &[5]).unwrap());
    let mut bob_privkey = Vec::new();
    bob_privkey.extend(tlv::encode_leaf(b's', &[9]).unwrap());

    let mut alice_device = new_device();
    alice_device.dispatch('c', &toy_curve_payload()).unwrap();
    let alice_pub = alice_device.dispatch('m', &alice_privkey).unwrap()[0].1.clone();

    let mut bob_device = new_device();
    bob_device.dispatch('c', &toy_curve_payload()).unwrap();
    let bob_pub = bob_device.dispatch('m', &bob_privkey).unwrap()[0].1.clone();

    alice_device.dispatch('s', &alice_privkey).unwrap();
    bob_device.dispatch('s', &bob_privkey).unwrap();

    let alice_shared = alice_device.dispatch('e', &pubkey_tlv(&bob_pub)).unwrap();
    let bob_shared = bob_device.dispatch('e', &pubkey_tlv(&alice_pub)).unwrap();

    assert_eq!(alice_shared[0].0, 'r');
    assert_eq!(alice_shared[0].1, bob_shared[0].1);
}

#[test]
fn ecdsa_sign_then_verify_round_trips() {
    let mut device = new_device();
    device.dispatch('c', &toy_curve_payload()).unwrap();

    let mut privkey_payload = Vec::new();
    privkey_payload.extend(tlv::encode_leaf(b's', &[5]).unwrap());
    device.dispatch('s', &privkey_payload).unwrap();

    let mut pubkey_payload = Vec::new();
    pubkey_payload.extend(tlv::encode_leaf(b's', &[5]).unwrap());
    let replies = device.dispatch('m', &pubkey_payload).unwrap();
    device.dispatch('w', &pubkey_tlv(&replies[0].1)).unwrap();

    let mut message_payload = Vec::new();
    message_payload.extend(tlv::encode_leaf(b'd', b"hello").unwrap());

    // A fresh nonce is drawn on every attempt; a draw of zero, or one that
    // yields `s == 0`, fails on this curve's tiny order roughly 2 times in
    // 13. Thirty attempts makes spurious failure astronomically unlikely
    // without needing a fixed nonce.
    let mut signature = None;
    for _ in 0..30 {
        if let Ok(replies) = device.dispatch('a', &message_payload) {
            signature = Some(replies[0].1.clone());
            break;
        }
    }
    let signature = signature.expect("signing should succeed within 30 nonce draws");

    let mut verify_payload = message_payload.clone();
    verify_payload.extend(tlv::encode_leaf(b's', &signature).unwrap());
    let replies = device.dispatch('r', &verify_payload).unwrap();
    assert_eq!(replies, vec![('v', vec![1])]);
}

#[test]
fn ecdsa_verify_rejects_a_tampered_message() {
    // A hand-computed signature rather than one drawn through `a`'s random
    // nonce: with privkey d = 5, nonce k = 6 against the point ladder from
    // the doubling test above (5G = (3, 6), 6G = (7, 9)), and
    // `HashAlgorithm::None` so e is just the message byte's top nibble
    // (truncated to the order's 4-bit length):
    //   r = x(6G) mod 13 = 7
    //   s = (e + r*d) / k mod 13 = (3 + 7*5) / 6 mod 13 = 2, for e = 3
    // This (r, s) only verifies against e in {3, 5} (the ± nonce branches);
    // a tampered message producing e = 7 is neither, so rejection is
    // certain rather than merely probable the way retrying a random nonce
    // draw against a 13-element group would be.
    let mut config = Configuration::default();
    config.hash = HashAlgorithm::None;
    let mut device = Device::new(config, Arc::new(Mutex::new(SpongePrng::new())));
    device.dispatch('c', &toy_curve_payload()).unwrap();
    device.dispatch('w', &pubkey_tlv(&[3, 6])).unwrap();

    let signature = ecc_lab_device::asn1::encode(&BigInt::from_bytes_be(&[7]), &BigInt::from_bytes_be(&[2]));

    let mut valid_payload = Vec::new();
    valid_payload.extend(tlv::encode_leaf(b'd', &[0x30]).unwrap());
    valid_payload.extend(tlv::encode_leaf(b's', &signature).unwrap());
    let replies = device.dispatch('r', &valid_payload).unwrap();
    assert_eq!(replies, vec![('v', vec![1])]);

    let mut tampered_payload = Vec::new();
    tampered_payload.extend(tlv::encode_leaf(b'd', &[0x70]).unwrap());
    tampered_payload.extend(tlv::encode_leaf(b's', &signature).unwrap());
    let replies = device.dispatch('r', &tampered_payload).unwrap();
    assert_eq!(replies, vec![('v', vec![0])]);
}

#[test]
fn commands_fail_cleanly_without_a_curve() {
    let mut device = new_device();
    let err = device.dispatch('g', &[]).unwrap_err();
    assert!(matches!(err, DeviceError::NoCurve));
    assert_eq!(err.status(), 5);
}

#[test]
fn malformed_tlv_is_reported_not_panicked_on() {
    let mut device = new_device();
    device.dispatch('c', &toy_curve_payload()).unwrap();
    // A truncated TLV entry: name byte present, length byte claims 5 bytes
    // of value but none follow.
    let truncated = vec![b's', 5];
    let err = device.dispatch('m', &truncated).unwrap_err();
    assert!(matches!(err, DeviceError::Tlv));
}

#[test]
fn unknown_command_letter_is_rejected() {
    let mut device = new_device();
    let err = device.dispatch('q', &[]).unwrap_err();
    assert!(matches!(err, DeviceError::UnknownCommand('q')));
}
