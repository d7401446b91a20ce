//! The command-channel device: reads `simpleserial`-style ASCII frames from
//! stdin, drives [`ecc_lab_core`] with them, and writes the replies to
//! stdout. [`main`] wires the pieces together; everything else here is a
//! reusable library surface so integration tests can drive [`commands::Device`]
//! directly without going through process I/O.

pub mod asn1;
pub mod commands;
pub mod config;
pub mod error;
pub mod framing;
pub mod hal;
pub mod hash;
pub mod prng;
pub mod tlv;

pub use commands::Device;
pub use error::{DeviceError, Result};
