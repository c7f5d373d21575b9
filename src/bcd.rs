//! Binary-coded decimal helpers.
//!
//! Every time and alarm register of the DS3231 stores its value as two BCD
//! nibbles. Flag bits that share a register with a BCD value must be masked
//! off by the caller before decoding.

/// Encodes `value` (0-99) as a BCD byte.
///
/// Values above 99 are not meaningful and produce an unspecified byte.
#[must_use]
pub const fn to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Decodes a BCD byte into its binary value.
#[must_use]
pub const fn from_bcd(bcd: u8) -> u8 {
    (bcd >> 4) * 10 + (bcd & 0x0F)
}
