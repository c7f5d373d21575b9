//! Alarm mode codes and alarm register encoding for the DS3231 RTC.
//!
//! An alarm is requested with an 8-bit [`AlarmMode`] and an [`RtcDateTime`]
//! supplying the values to match. The mode code packs:
//!
//! | bit | meaning |
//! |-----|---------|
//! | 7 | seconds are a wildcard (Alarm 1 only) |
//! | 6 | minutes are a wildcard |
//! | 5 | hours are a wildcard |
//! | 4 | day/date is a wildcard |
//! | 3 | day/date matches the day of week instead of the date |
//! | 1-0 | `01` Alarm 1, `10` Alarm 2, `11` custom |
//!
//! Custom modes (hourly, daily, weekly, monthly) are served by Alarm 2: the
//! target's low bit is cleared and the remaining bits already describe the
//! equivalent Alarm 2 match.
//!
//! The hardware has no alarm-disable bit. [`crate::DS3231::disable_alarms`]
//! pins both alarms to the current time instead, which will not recur until
//! the next month.

use crate::bcd::{from_bcd, to_bcd};
use crate::calendar::RtcDateTime;
use crate::registers::from_register_u8;
use crate::{
    AlarmDayDate, AlarmHours, AlarmMinutes, AlarmSeconds, Control, DayDateSelect,
    InterruptControl, RegAddr, Status,
};

/// A field of an alarm register block.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmField {
    /// Seconds (Alarm 1 only)
    Seconds,
    /// Minutes
    Minutes,
    /// Hours
    Hours,
    /// Day of week or date of month
    DayDate,
}

impl AlarmField {
    /// Bit of the mode code that marks this field as a wildcard.
    #[must_use]
    pub const fn mask_bit(self) -> u8 {
        match self {
            AlarmField::Seconds => 7,
            AlarmField::Minutes => 6,
            AlarmField::Hours => 5,
            AlarmField::DayDate => 4,
        }
    }
}

/// Which alarm a mode code addresses.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmTarget {
    /// Alarm 1: seconds resolution, registers 0x07-0x0A
    Alarm1,
    /// Alarm 2: minute resolution, registers 0x0B-0x0D
    Alarm2,
    /// A preset served by Alarm 2
    Custom,
}

/// Packed alarm mode code, see the [module documentation](self).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmMode(u8);
from_register_u8!(AlarmMode);

impl AlarmMode {
    const DAY_OF_WEEK_BIT: u8 = 3;
    const TARGET_MASK: u8 = 0b0000_0011;

    /// Alarm 1: once per second
    pub const EVERY_SECOND: Self = Self(0b1111_0001);
    /// Alarm 1: when seconds match
    pub const MATCH_SECOND: Self = Self(0b0111_0001);
    /// Alarm 1: when minutes and seconds match
    pub const MATCH_SECOND_MINUTE: Self = Self(0b0011_0001);
    /// Alarm 1: when hours, minutes and seconds match
    pub const MATCH_SECOND_MINUTE_HOUR: Self = Self(0b0001_0001);
    /// Alarm 1: when date, hours, minutes and seconds match
    pub const MATCH_SECOND_MINUTE_HOUR_DATE: Self = Self(0b0000_0001);
    /// Alarm 1: when day of week, hours, minutes and seconds match
    pub const MATCH_SECOND_MINUTE_HOUR_DOW: Self = Self(0b0000_1001);

    /// Alarm 2: once per minute
    pub const EVERY_MINUTE: Self = Self(0b0111_0010);
    /// Alarm 2: when minutes match
    pub const MATCH_MINUTE: Self = Self(0b0011_0010);
    /// Alarm 2: when hours and minutes match
    pub const MATCH_MINUTE_HOUR: Self = Self(0b0001_0010);
    /// Alarm 2: when date, hours and minutes match
    pub const MATCH_MINUTE_HOUR_DATE: Self = Self(0b0000_0010);
    /// Alarm 2: when day of week, hours and minutes match
    pub const MATCH_MINUTE_HOUR_DOW: Self = Self(0b0000_1010);

    /// Custom: every hour at the given minute
    pub const HOURLY: Self = Self(0b0011_0011);
    /// Custom: every day at the given hour and minute
    pub const DAILY: Self = Self(0b0001_0011);
    /// Custom: every week on the given day of week
    pub const WEEKLY: Self = Self(0b0000_1011);
    /// Custom: every month on the given date
    pub const MONTHLY: Self = Self(0b0000_0011);

    /// Raw mode code.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Alarm addressed by the low bits. `00` is served by Alarm 2.
    #[must_use]
    pub const fn target(self) -> AlarmTarget {
        match self.0 & Self::TARGET_MASK {
            0b01 => AlarmTarget::Alarm1,
            0b11 => AlarmTarget::Custom,
            _ => AlarmTarget::Alarm2,
        }
    }

    /// The mode actually programmed: custom presets collapse onto Alarm 2.
    #[must_use]
    pub const fn effective(self) -> Self {
        match self.target() {
            AlarmTarget::Custom => Self(self.0 & !0b01),
            _ => self,
        }
    }

    /// Whether `field` is a wildcard.
    #[must_use]
    pub const fn is_masked(self, field: AlarmField) -> bool {
        (self.0 >> field.mask_bit()) & 1 == 1
    }

    /// Whether the day/date field matches the day of week.
    #[must_use]
    pub const fn matches_day_of_week(self) -> bool {
        (self.0 >> Self::DAY_OF_WEEK_BIT) & 1 == 1
    }
}

/// Alarm flags from the status register, as returned by
/// [`crate::DS3231::check_alarms`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmFlags(u8);

impl AlarmFlags {
    /// Neither alarm fired.
    pub const NONE: Self = Self(0);

    /// 0 for none, 1 for Alarm 1, 2 for Alarm 2, 3 for both.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Alarm 1 fired.
    #[must_use]
    pub const fn alarm1(self) -> bool {
        self.0 & 0b01 != 0
    }

    /// Alarm 2 fired.
    #[must_use]
    pub const fn alarm2(self) -> bool {
        self.0 & 0b10 != 0
    }

    /// Either alarm fired.
    #[must_use]
    pub const fn any(self) -> bool {
        self.0 != 0
    }
}

impl From<Status> for AlarmFlags {
    fn from(status: Status) -> Self {
        Self(status.alarm_flags())
    }
}

fn encode_minutes(mode: AlarmMode, at: &RtcDateTime) -> AlarmMinutes {
    let mut minutes = AlarmMinutes::from(to_bcd(at.minute()));
    minutes.set_alarm_mask2(mode.is_masked(AlarmField::Minutes));
    minutes
}

fn encode_hours(mode: AlarmMode, at: &RtcDateTime) -> AlarmHours {
    let mut hours = AlarmHours::from(to_bcd(at.hour()));
    hours.set_alarm_mask3(mode.is_masked(AlarmField::Hours));
    hours
}

fn encode_day_date(mode: AlarmMode, at: &RtcDateTime) -> AlarmDayDate {
    let mut day_date = if mode.matches_day_of_week() {
        let mut value = AlarmDayDate::from(to_bcd(at.day_of_week()));
        value.set_day_date_select(DayDateSelect::Day);
        value
    } else {
        AlarmDayDate::from(to_bcd(at.day()))
    };
    day_date.set_alarm_mask4(mode.is_masked(AlarmField::DayDate));
    day_date
}

fn mode_bits(masks: [bool; 4], day_date: AlarmDayDate, target: u8) -> AlarmMode {
    let fields = [
        AlarmField::Seconds,
        AlarmField::Minutes,
        AlarmField::Hours,
        AlarmField::DayDate,
    ];
    let mut bits = target;
    for (field, masked) in fields.into_iter().zip(masks) {
        bits |= u8::from(masked) << field.mask_bit();
    }
    if day_date.day_date_select() == DayDateSelect::Day {
        bits |= 1 << AlarmMode::DAY_OF_WEEK_BIT;
    }
    AlarmMode(bits)
}

/// Alarm 1 register block (0x07-0x0A).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DS3231Alarm1 {
    seconds: AlarmSeconds,
    minutes: AlarmMinutes,
    hours: AlarmHours,
    day_date: AlarmDayDate,
}

impl DS3231Alarm1 {
    /// Encodes `at` under `mode`'s match mask.
    #[must_use]
    pub fn from_mode(mode: AlarmMode, at: &RtcDateTime) -> Self {
        let mut seconds = AlarmSeconds::from(to_bcd(at.second()));
        seconds.set_alarm_mask1(mode.is_masked(AlarmField::Seconds));
        Self {
            seconds,
            minutes: encode_minutes(mode, at),
            hours: encode_hours(mode, at),
            day_date: encode_day_date(mode, at),
        }
    }

    /// Matches seconds, minutes, hours and date of a raw time block, copied
    /// as stored. The block does not have to hold a valid calendar time.
    #[must_use]
    pub fn pinned(block: &[u8; 7]) -> Self {
        Self {
            seconds: AlarmSeconds::from(block[0] & 0x7F),
            minutes: AlarmMinutes::from(block[1] & 0x7F),
            hours: AlarmHours::from(block[2] & 0x7F),
            day_date: AlarmDayDate::from(block[4] & 0x3F),
        }
    }

    /// Reconstructs the mode code programmed in these registers.
    #[must_use]
    pub fn mode(&self) -> AlarmMode {
        mode_bits(
            [
                self.seconds.alarm_mask1(),
                self.minutes.alarm_mask2(),
                self.hours.alarm_mask3(),
                self.day_date.alarm_mask4(),
            ],
            self.day_date,
            0b01,
        )
    }

    /// Gets the alarm seconds register
    #[must_use]
    pub fn seconds(&self) -> AlarmSeconds {
        self.seconds
    }

    /// Gets the alarm minutes register
    #[must_use]
    pub fn minutes(&self) -> AlarmMinutes {
        self.minutes
    }

    /// Gets the alarm hours register
    #[must_use]
    pub fn hours(&self) -> AlarmHours {
        self.hours
    }

    /// Gets the alarm day/date register
    #[must_use]
    pub fn day_date(&self) -> AlarmDayDate {
        self.day_date
    }

    /// Decoded match values: (seconds, minutes, hours, day or date).
    #[must_use]
    pub fn values(&self) -> (u8, u8, u8, u8) {
        (
            from_bcd(self.seconds.seconds_bcd()),
            from_bcd(self.minutes.minutes_bcd()),
            from_bcd(self.hours.hours_bcd()),
            from_bcd(self.day_date.day_or_date_bcd()),
        )
    }
}

impl From<[u8; 4]> for DS3231Alarm1 {
    fn from(data: [u8; 4]) -> Self {
        Self {
            seconds: AlarmSeconds::from(data[0]),
            minutes: AlarmMinutes::from(data[1]),
            hours: AlarmHours::from(data[2]),
            day_date: AlarmDayDate::from(data[3]),
        }
    }
}

impl From<&DS3231Alarm1> for [u8; 4] {
    fn from(alarm: &DS3231Alarm1) -> [u8; 4] {
        [
            alarm.seconds.into(),
            alarm.minutes.into(),
            alarm.hours.into(),
            alarm.day_date.into(),
        ]
    }
}

/// Alarm 2 register block (0x0B-0x0D). Alarm 2 fires at 00 seconds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DS3231Alarm2 {
    minutes: AlarmMinutes,
    hours: AlarmHours,
    day_date: AlarmDayDate,
}

impl DS3231Alarm2 {
    /// Encodes `at` under `mode`'s match mask. The seconds mask bit is ignored.
    #[must_use]
    pub fn from_mode(mode: AlarmMode, at: &RtcDateTime) -> Self {
        Self {
            minutes: encode_minutes(mode, at),
            hours: encode_hours(mode, at),
            day_date: encode_day_date(mode, at),
        }
    }

    /// Matches minutes, hours and date of a raw time block, copied as
    /// stored.
    #[must_use]
    pub fn pinned(block: &[u8; 7]) -> Self {
        Self {
            minutes: AlarmMinutes::from(block[1] & 0x7F),
            hours: AlarmHours::from(block[2] & 0x7F),
            day_date: AlarmDayDate::from(block[4] & 0x3F),
        }
    }

    /// Reconstructs the mode code programmed in these registers.
    #[must_use]
    pub fn mode(&self) -> AlarmMode {
        mode_bits(
            [
                false,
                self.minutes.alarm_mask2(),
                self.hours.alarm_mask3(),
                self.day_date.alarm_mask4(),
            ],
            self.day_date,
            0b10,
        )
    }

    /// Gets the alarm minutes register
    #[must_use]
    pub fn minutes(&self) -> AlarmMinutes {
        self.minutes
    }

    /// Gets the alarm hours register
    #[must_use]
    pub fn hours(&self) -> AlarmHours {
        self.hours
    }

    /// Gets the alarm day/date register
    #[must_use]
    pub fn day_date(&self) -> AlarmDayDate {
        self.day_date
    }

    /// Decoded match values: (minutes, hours, day or date).
    #[must_use]
    pub fn values(&self) -> (u8, u8, u8) {
        (
            from_bcd(self.minutes.minutes_bcd()),
            from_bcd(self.hours.hours_bcd()),
            from_bcd(self.day_date.day_or_date_bcd()),
        )
    }
}

impl From<[u8; 3]> for DS3231Alarm2 {
    fn from(data: [u8; 3]) -> Self {
        Self {
            minutes: AlarmMinutes::from(data[0]),
            hours: AlarmHours::from(data[1]),
            day_date: AlarmDayDate::from(data[2]),
        }
    }
}

impl From<&DS3231Alarm2> for [u8; 3] {
    fn from(alarm: &DS3231Alarm2) -> [u8; 3] {
        [
            alarm.minutes.into(),
            alarm.hours.into(),
            alarm.day_date.into(),
        ]
    }
}

/// An encoded alarm, ready to be written as one contiguous block.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum AlarmRegisters {
    /// Four bytes starting at 0x07
    Alarm1(DS3231Alarm1),
    /// Three bytes starting at 0x0B
    Alarm2(DS3231Alarm2),
}

impl AlarmRegisters {
    /// Encodes an alarm request. Custom modes are collapsed first.
    #[must_use]
    pub fn encode(mode: AlarmMode, at: &RtcDateTime) -> Self {
        let mode = mode.effective();
        match mode.target() {
            AlarmTarget::Alarm1 => Self::Alarm1(DS3231Alarm1::from_mode(mode, at)),
            _ => Self::Alarm2(DS3231Alarm2::from_mode(mode, at)),
        }
    }

    /// First register of the block.
    #[must_use]
    pub fn start(&self) -> RegAddr {
        match self {
            Self::Alarm1(_) => RegAddr::Alarm1Seconds,
            Self::Alarm2(_) => RegAddr::Alarm2Minutes,
        }
    }

    /// Sets the interrupt enable bit for this alarm and routes alarms to INT/SQW.
    pub fn enable(&self, control: &mut Control) {
        match self {
            Self::Alarm1(_) => control.set_alarm1_interrupt_enable(true),
            Self::Alarm2(_) => control.set_alarm2_interrupt_enable(true),
        }
        control.set_interrupt_control(InterruptControl::Interrupt);
    }

    /// Register address followed by the block bytes, and the used length.
    pub(crate) fn frame(&self) -> ([u8; 5], usize) {
        let mut frame = [self.start() as u8, 0, 0, 0, 0];
        match self {
            Self::Alarm1(alarm) => {
                frame[1..5].copy_from_slice(&<[u8; 4]>::from(alarm));
                (frame, 5)
            }
            Self::Alarm2(alarm) => {
                frame[1..4].copy_from_slice(&<[u8; 3]>::from(alarm));
                (frame, 4)
            }
        }
    }
}
