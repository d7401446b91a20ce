//! Hardware-abstraction stub.
//!
//! Grounded on `hal/hal.h`/`hal/host/host_hal.h`: on the `HAL_host` target
//! `trigger_setup`/`trigger_high`/`trigger_low` are no-ops because there is
//! no GPIO to toggle. This module keeps those call sites so a future
//! embedded backend slots in without touching [`crate::commands`].

/// The trigger-action bitmap set by the `t` command (spec §6): which
/// commands should toggle the (absent, on a host build) trigger GPIO.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TriggerBitmap(pub u32);

impl TriggerBitmap {
    pub fn from_le_bytes(bytes: [u8; 4]) -> Self {
        TriggerBitmap(u32::from_le_bytes(bytes))
    }
}

/// `platform_init`: no host-specific setup needed.
pub fn platform_init() {}

/// `trigger_setup`: no-op on a host build.
pub fn trigger_setup() {}

/// `trigger_high`: no-op on a host build; a real HAL backend would raise a
/// GPIO line here, gated on whether `bitmap` flags the current command.
pub fn trigger_high(_bitmap: TriggerBitmap) {}

/// `trigger_low`: no-op on a host build.
pub fn trigger_low(_bitmap: TriggerBitmap) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_reads_little_endian() {
        let bitmap = TriggerBitmap::from_le_bytes([0x01, 0x00, 0x00, 0x00]);
        assert_eq!(bitmap.0, 1);
    }
}
