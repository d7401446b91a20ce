//! Errors surfaced by the command layer.
//!
//! Spec §7: "command handlers translate failures to a non-zero status
//! byte; malformed TLV yields a no-op with error status" — nothing here
//! panics on malformed input, every variant maps to [`DeviceError::status`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("malformed command frame")]
    Framing,
    #[error("malformed TLV payload")]
    Tlv,
    #[error("malformed ASN.1 DER payload")]
    Asn1,
    #[error("unknown command letter {0:?}")]
    UnknownCommand(char),
    #[error("no curve configured")]
    NoCurve,
    #[error("no private key configured")]
    NoPrivateKey,
    #[error("no public key configured")]
    NoPublicKey,
    #[error("core engine error: {0}")]
    Core(#[from] ecc_lab_core::Error),
    #[error("signature has a zero component")]
    ZeroSignatureComponent,
}

impl DeviceError {
    /// The non-zero status byte spec §7 describes.
    pub fn status(&self) -> u8 {
        match self {
            DeviceError::Framing => 1,
            DeviceError::Tlv => 2,
            DeviceError::Asn1 => 3,
            DeviceError::UnknownCommand(_) => 4,
            DeviceError::NoCurve => 5,
            DeviceError::NoPrivateKey => 6,
            DeviceError::NoPublicKey => 7,
            DeviceError::Core(_) => 8,
            DeviceError::ZeroSignatureComponent => 9,
        }
    }
}

pub type Result<T> = std::result::Result<T, DeviceError>;
