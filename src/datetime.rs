//! Time register block conversion for the DS3231 RTC.
//!
//! The DS3231 stores date and time in 7 consecutive BCD registers starting at
//! 0x00: seconds, minutes, hours, day of week, date, month (with the century
//! flag in bit 7) and year.
//!
//! # Decoding
//!
//! Bit 6 of the hours register selects 12-hour mode. In that mode the hour is
//! the BCD value of bits 0-4 plus 12 when bit 5 is *clear*; this matches the
//! convention of the clocks this driver was written against and is kept as is.
//! The century flag adds 100 to the year offset.
//!
//! # Encoding
//!
//! Hours are always written in 24-hour form, a zero day of week is written as
//! 1, and the century flag is never set, so years 2100-2199 are written as
//! 2000-2099.
//!
//! # Error Handling
//!
//! Conversion errors are reported via [`DS3231DateTimeError`].

use crate::bcd::{from_bcd, to_bcd};
use crate::calendar::RtcDateTime;
use crate::{debug, Hours, Month, TimeRepresentation};

/// Internal representation of the DS3231 time register block.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct DS3231DateTime {
    seconds: u8,
    minutes: u8,
    hours: Hours,
    day: u8,
    date: u8,
    month: Month,
    year: u8,
}

impl DS3231DateTime {
    fn decode_hours(hours: Hours) -> u8 {
        match hours.time_representation() {
            TimeRepresentation::TwelveHour => {
                let pm_offset = if hours.pm_or_twenty_hours() == 0 { 12 } else { 0 };
                from_bcd(hours.twelve_hour_bcd()) + pm_offset
            }
            TimeRepresentation::TwentyFourHour => from_bcd(hours.twenty_four_hour_bcd()),
        }
    }

    pub(crate) fn from_datetime(datetime: &RtcDateTime) -> Self {
        let day = match datetime.day_of_week() {
            0 => 1,
            dow => dow,
        };
        if datetime.year_offset() > 99 {
            debug!(
                "year {} written without century flag",
                datetime.year()
            );
        }
        let raw = DS3231DateTime {
            seconds: to_bcd(datetime.second()),
            minutes: to_bcd(datetime.minute()),
            hours: Hours::from(to_bcd(datetime.hour())),
            day: to_bcd(day),
            date: to_bcd(datetime.day()),
            month: Month::from(to_bcd(datetime.month())),
            year: to_bcd(datetime.year_offset() % 100),
        };
        debug!(
            "encoded time block hours={} month={} year={}",
            u8::from(raw.hours),
            u8::from(raw.month),
            raw.year
        );
        raw
    }

    pub(crate) fn into_datetime(self) -> Result<RtcDateTime, DS3231DateTimeError> {
        let hour = Self::decode_hours(self.hours);
        debug!("raw_hour={} h={}", u8::from(self.hours), hour);

        let century = if self.month.century() { 100 } else { 0 };
        let year_offset = from_bcd(self.year)
            .checked_add(century)
            .ok_or(DS3231DateTimeError::YearNotBefore2200)?;

        RtcDateTime::from_device_fields(
            year_offset,
            from_bcd(self.month.month_bcd()),
            from_bcd(self.date),
            from_bcd(self.day),
            hour,
            from_bcd(self.minutes),
            from_bcd(self.seconds),
        )
    }
}

impl From<[u8; 7]> for DS3231DateTime {
    fn from(data: [u8; 7]) -> Self {
        DS3231DateTime {
            seconds: data[0],
            minutes: data[1],
            hours: Hours::from(data[2]),
            day: data[3],
            date: data[4],
            month: Month::from(data[5]),
            year: data[6],
        }
    }
}

impl From<&DS3231DateTime> for [u8; 7] {
    fn from(dt: &DS3231DateTime) -> [u8; 7] {
        [
            dt.seconds,
            dt.minutes,
            dt.hours.into(),
            dt.day,
            dt.date,
            dt.month.into(),
            dt.year,
        ]
    }
}

/// Decodes the 7-byte time register block read from 0x00.
///
/// # Errors
///
/// Returns an error when the registers do not hold a valid date and time.
pub fn decode_time_block(data: [u8; 7]) -> Result<RtcDateTime, DS3231DateTimeError> {
    DS3231DateTime::from(data).into_datetime()
}

/// Encodes a date-time as the 7-byte time register block written at 0x00.
#[must_use]
pub fn encode_time_block(datetime: &RtcDateTime) -> [u8; 7] {
    (&DS3231DateTime::from_datetime(datetime)).into()
}

#[derive(Debug)]
/// Errors that can occur during DS3231 date/time conversion or validation.
pub enum DS3231DateTimeError {
    /// The provided or decoded date/time is invalid (e.g., out of range, not representable)
    InvalidDateTime,
    /// The year is not before 2200 (DS3231 only supports years < 2200)
    YearNotBefore2200,
    /// The year is not after 1999 (DS3231 only supports years >= 2000)
    YearNotAfter1999,
}
