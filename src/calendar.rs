//! Calendar math and the [`RtcDateTime`] value type.
//!
//! The DS3231 counts years as an offset from 2000 with a century flag, so only
//! calendar years 2000 through 2199 can be represented. [`RtcDateTime`] keeps
//! its broken-down fields and its unixtime in lock-step: every mutator
//! validates the new fields and recomputes the other half before committing.
//!
//! Unixtime conversions assume UTC in both directions. The `std` feature adds
//! [`RtcDateTime::from_unixtime_local`] for callers who keep the clock in
//! local wall time.

use core::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::datetime::DS3231DateTimeError;
use crate::error;

/// First calendar year the device can hold.
pub const BASE_YEAR: u16 = 2000;
/// Last calendar year the device can hold (offset 199 with the century bit).
pub const MAX_YEAR: u16 = 2199;

/// Computes the day of the week for a Gregorian date.
///
/// Returns 1 for Monday through 7 for Sunday. The inputs are not validated.
#[must_use]
pub fn day_of_week(year: u16, month: u8, day: u8) -> u8 {
    let a = (14 - i32::from(month)) / 12;
    let y = i32::from(year) - a;
    let m = i32::from(month) + 12 * a - 2;
    let d = (i32::from(day) + y + y / 4 - y / 100 + y / 400 + (31 * m) / 12).rem_euclid(7);
    match d {
        0 => 7,
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        d => d as u8,
    }
}

/// Converts broken-down UTC fields to seconds since 1970-01-01T00:00:00Z.
pub(crate) fn unixtime_from_fields(
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
) -> Result<i64, DS3231DateTimeError> {
    NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
        .and_then(|d| d.and_hms_opt(u32::from(hour), u32::from(minute), u32::from(second)))
        .map(|ndt| ndt.and_utc().timestamp())
        .ok_or(DS3231DateTimeError::InvalidDateTime)
}

fn check_year(year: u16) -> Result<(), DS3231DateTimeError> {
    if year > MAX_YEAR {
        error!("Year {} is too late! must be before 2200", year);
        return Err(DS3231DateTimeError::YearNotBefore2200);
    }
    if year < BASE_YEAR {
        error!("Year {} is too early! must be greater than 1999", year);
        return Err(DS3231DateTimeError::YearNotAfter1999);
    }
    Ok(())
}

/// A wall-clock date and time as stored by the DS3231.
///
/// Construct one with [`RtcDateTime::new`], [`RtcDateTime::from_unixtime`] or
/// from a chrono [`NaiveDateTime`]; read one from the device with
/// [`crate::DS3231::datetime`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RtcDateTime {
    second: u8,
    minute: u8,
    hour: u8,
    day_of_week: u8,
    day: u8,
    month: u8,
    year: u8,
    unixtime: i64,
}

impl Default for RtcDateTime {
    /// 2000-01-01 00:00:00, a Saturday.
    fn default() -> Self {
        Self {
            second: 0,
            minute: 0,
            hour: 0,
            day_of_week: 6,
            day: 1,
            month: 1,
            year: 0,
            unixtime: 946_684_800,
        }
    }
}

impl RtcDateTime {
    /// Builds a date-time from calendar fields interpreted as UTC.
    ///
    /// # Errors
    ///
    /// Fails when the year is outside 2000-2199 or the fields do not name a
    /// real date and time.
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, DS3231DateTimeError> {
        let mut dt = Self::default();
        dt.set_date(year, month, day)?;
        dt.set_time(hour, minute, second)?;
        Ok(dt)
    }

    /// Builds a date-time from seconds since the Unix epoch, decomposed in UTC.
    ///
    /// # Errors
    ///
    /// Fails when the instant falls outside 2000-2199.
    pub fn from_unixtime(unixtime: i64) -> Result<Self, DS3231DateTimeError> {
        let utc = DateTime::from_timestamp(unixtime, 0).ok_or(DS3231DateTimeError::InvalidDateTime)?;
        Self::try_from(utc.naive_utc())
    }

    /// Builds a date-time from seconds since the Unix epoch, decomposed in the
    /// host's local time zone.
    ///
    /// The fields hold local wall time. [`RtcDateTime::unixtime`] on the result
    /// reads those fields as UTC, so it differs from `unixtime` by the local
    /// UTC offset.
    ///
    /// # Errors
    ///
    /// Fails when the local time is ambiguous or outside 2000-2199.
    #[cfg(feature = "std")]
    pub fn from_unixtime_local(unixtime: i64) -> Result<Self, DS3231DateTimeError> {
        use chrono::{Local, TimeZone};

        let local = Local
            .timestamp_opt(unixtime, 0)
            .single()
            .ok_or(DS3231DateTimeError::InvalidDateTime)?;
        Self::try_from(local.naive_local())
    }

    /// Builds a date-time from decoded device registers.
    ///
    /// The day of week is kept as read rather than recomputed.
    pub(crate) fn from_device_fields(
        year_offset: u8,
        month: u8,
        day: u8,
        day_of_week: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, DS3231DateTimeError> {
        let year = BASE_YEAR + u16::from(year_offset);
        check_year(year)?;
        let unixtime = unixtime_from_fields(year, month, day, hour, minute, second)?;
        Ok(Self {
            second,
            minute,
            hour,
            day_of_week,
            day,
            month,
            year: year_offset,
            unixtime,
        })
    }

    /// Sets the calendar date, deriving the day of week and the unixtime.
    ///
    /// # Errors
    ///
    /// Fails when the year is outside 2000-2199 or the date does not exist.
    /// The value is unchanged on error.
    pub fn set_date(&mut self, year: u16, month: u8, day: u8) -> Result<(), DS3231DateTimeError> {
        check_year(year)?;
        let unixtime =
            unixtime_from_fields(year, month, day, self.hour, self.minute, self.second)?;
        #[allow(clippy::cast_possible_truncation)]
        let offset = (year - BASE_YEAR) as u8;
        self.year = offset;
        self.month = month;
        self.day = day;
        self.day_of_week = day_of_week(year, month, day);
        self.unixtime = unixtime;
        Ok(())
    }

    /// Sets the time of day (UTC) and recomputes the unixtime.
    ///
    /// # Errors
    ///
    /// Fails when the fields are out of range. The value is unchanged on error.
    pub fn set_time(&mut self, hour: u8, minute: u8, second: u8) -> Result<(), DS3231DateTimeError> {
        let unixtime =
            unixtime_from_fields(self.year(), self.month, self.day, hour, minute, second)?;
        self.hour = hour;
        self.minute = minute;
        self.second = second;
        self.unixtime = unixtime;
        Ok(())
    }

    /// Replaces every field from a unixtime, decomposed in UTC.
    ///
    /// # Errors
    ///
    /// Fails when the instant falls outside 2000-2199. The value is unchanged
    /// on error.
    pub fn set_unixtime(&mut self, unixtime: i64) -> Result<(), DS3231DateTimeError> {
        *self = Self::from_unixtime(unixtime)?;
        Ok(())
    }

    /// Seconds since the Unix epoch, reading the fields as UTC.
    #[must_use]
    pub fn unixtime(&self) -> i64 {
        self.unixtime
    }

    /// Full calendar year (2000-2199).
    #[must_use]
    pub fn year(&self) -> u16 {
        BASE_YEAR + u16::from(self.year)
    }

    /// Year as stored by the device: an offset from 2000 (0-199).
    #[must_use]
    pub fn year_offset(&self) -> u8 {
        self.year
    }

    /// Month, 1-12.
    #[must_use]
    pub fn month(&self) -> u8 {
        self.month
    }

    /// Day of the month, 1-31.
    #[must_use]
    pub fn day(&self) -> u8 {
        self.day
    }

    /// Day of the week, 1 (Monday) through 7 (Sunday).
    ///
    /// Values read from the device are passed through unchanged.
    #[must_use]
    pub fn day_of_week(&self) -> u8 {
        self.day_of_week
    }

    /// Hour, 0-23.
    #[must_use]
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute, 0-59.
    #[must_use]
    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Second, 0-59.
    #[must_use]
    pub fn second(&self) -> u8 {
        self.second
    }

    /// Converts to a chrono [`NaiveDateTime`].
    #[must_use]
    pub fn to_naive(&self) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(
            i32::from(self.year()),
            u32::from(self.month),
            u32::from(self.day),
        )
        .and_then(|d| {
            d.and_hms_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
            )
        })
        .unwrap_or_default()
    }
}

impl TryFrom<NaiveDateTime> for RtcDateTime {
    type Error = DS3231DateTimeError;

    fn try_from(ndt: NaiveDateTime) -> Result<Self, Self::Error> {
        let year = u16::try_from(ndt.year()).map_err(|_| {
            error!("Year {} is too early! must be greater than 1999", ndt.year());
            DS3231DateTimeError::YearNotAfter1999
        })?;
        let narrow = |v: u32| u8::try_from(v).map_err(|_| DS3231DateTimeError::InvalidDateTime);
        Self::new(
            year,
            narrow(ndt.month())?,
            narrow(ndt.day())?,
            narrow(ndt.hour())?,
            narrow(ndt.minute())?,
            narrow(ndt.second())?,
        )
    }
}

impl From<RtcDateTime> for NaiveDateTime {
    fn from(dt: RtcDateTime) -> Self {
        dt.to_naive()
    }
}

impl fmt::Display for RtcDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year(),
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second
        )
    }
}
