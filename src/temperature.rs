//! Die temperature decoding.
//!
//! The DS3231 reports temperature as a 10-bit two's complement value in
//! quarter degrees Celsius: the integer part in register 0x11 and the
//! fraction in the top two bits of 0x12.

use crate::{Temperature, TemperatureFraction};

/// Decodes the two temperature registers into quarter degrees Celsius.
#[must_use]
pub fn decode_quarters(msb: u8, lsb: u8) -> i16 {
    let whole = Temperature::from(msb).temperature();
    let fraction = TemperatureFraction::from(lsb).temperature_fraction();
    (i16::from(whole) << 2) | i16::from(fraction)
}

/// Converts quarter degrees to degrees Celsius.
#[cfg(feature = "temperature_f32")]
#[must_use]
pub fn quarters_to_celsius(quarters: i16) -> f32 {
    f32::from(quarters) * 0.25
}

/// Converts degrees Celsius to degrees Fahrenheit.
#[cfg(feature = "temperature_f32")]
#[must_use]
pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 1.8 + 32.0
}
