//! Register definitions and bitfield structures for the DS3231 RTC.
//!
//! This module contains the register map and typed wrappers for the
//! registers that mix BCD values with flag bits. Registers holding a bare BCD
//! value are handled as plain bytes through [`crate::bcd`].

use bitfield::bitfield;

/// DS3231 register map. Multi-byte blocks are read and written starting at
/// their first register; the device auto-increments the address.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Time block: seconds, minutes, hours, day, date, month, year
    Seconds = 0x00,
    Minutes = 0x01,
    Hours = 0x02,
    Day = 0x03,
    Date = 0x04,
    Month = 0x05,
    Year = 0x06,
    /// Alarm 1 block: seconds, minutes, hours, day/date
    Alarm1Seconds = 0x07,
    Alarm1Minutes = 0x08,
    Alarm1Hours = 0x09,
    Alarm1DayDate = 0x0A,
    /// Alarm 2 block: minutes, hours, day/date
    Alarm2Minutes = 0x0B,
    Alarm2Hours = 0x0C,
    Alarm2DayDate = 0x0D,
    Control = 0x0E,
    ControlStatus = 0x0F,
    AgingOffset = 0x10,
    /// Temperature block: integer degrees, then quarter degrees
    MSBTemp = 0x11,
    LSBTemp = 0x12,
}

// Single-bit register fields exposed as two-state enums. Only bit 0 of the
// raw value is looked at, so the bitfield getters never fail.
macro_rules! bit_enum {
    ($(#[$meta:meta])* $name:ident { $clear:ident, $set:ident }) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub enum $name {
            $clear = 0,
            $set = 1,
        }

        impl From<u8> for $name {
            fn from(v: u8) -> Self {
                if v & 1 == 0 {
                    $name::$clear
                } else {
                    $name::$set
                }
            }
        }

        impl From<$name> for u8 {
            fn from(v: $name) -> Self {
                v as u8
            }
        }
    };
}

bit_enum!(
    /// Hours register mode bit: `TwentyFourHour` (0-23) or `TwelveHour` (1-12 with AM/PM).
    TimeRepresentation { TwentyFourHour, TwelveHour }
);

bit_enum!(
    /// INTCN: INT/SQW drives a `SquareWave`, or goes low on an alarm `Interrupt`.
    InterruptControl { SquareWave, Interrupt }
);

bit_enum!(
    /// DY/DT: an alarm matches the `Date` of the month or the `Day` of the week.
    DayDateSelect { Date, Day }
);

// Raw byte conversions for single-byte newtypes
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}
pub(crate) use from_register_u8;

bitfield! {
    /// Hours register (0x02). The meaning of bit 5 depends on bit 6.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Hours(u8);
    impl Debug;
    /// 12/24-hour mode select
    pub from into TimeRepresentation, time_representation, set_time_representation: 6, 6;
    /// PM flag (12-hour) or 20-hour bit (24-hour)
    pub pm_or_twenty_hours, set_pm_or_twenty_hours: 5, 5;
    /// BCD hour in 24-hour mode, including the 20-hour bit
    pub twenty_four_hour_bcd, set_twenty_four_hour_bcd: 5, 0;
    /// BCD hour in 12-hour mode, excluding the AM/PM bit
    pub twelve_hour_bcd, set_twelve_hour_bcd: 4, 0;
}
from_register_u8!(Hours);

#[cfg(feature = "defmt")]
impl defmt::Format for Hours {
    fn format(&self, f: defmt::Formatter) {
        match self.time_representation() {
            TimeRepresentation::TwentyFourHour => {
                defmt::write!(f, "Hours({=u8:#x})", self.twenty_four_hour_bcd())
            }
            TimeRepresentation::TwelveHour => defmt::write!(
                f,
                "Hours({=u8:#x}, 12h, bit5={=u8})",
                self.twelve_hour_bcd(),
                self.pm_or_twenty_hours()
            ),
        }
    }
}

bitfield! {
    /// Month register (1-12) with century bit.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Month(u8);
    impl Debug;
    /// Century flag, adds 100 to the year offset
    pub century, set_century: 7;
    /// BCD month
    pub month_bcd, set_month_bcd: 6, 0;
}
from_register_u8!(Month);

bitfield! {
    /// Control register (0x0E).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control(u8);
    impl Debug;
    /// Oscillator disabled while on battery (EOSC, active high)
    pub oscillator_disabled, set_oscillator_disabled: 7;
    /// BBSQW: keep INT/SQW running on battery
    pub battery_backed_square_wave, set_battery_backed_square_wave: 6;
    /// CONV: start a temperature conversion
    pub convert_temperature, set_convert_temperature: 5;
    /// Square wave output rate select (RS2:RS1)
    pub square_wave_rate, set_square_wave_rate: 4, 3;
    /// INTCN
    pub from into InterruptControl, interrupt_control, set_interrupt_control: 2, 2;
    /// A2IE
    pub alarm2_interrupt_enable, set_alarm2_interrupt_enable: 1;
    /// A1IE
    pub alarm1_interrupt_enable, set_alarm1_interrupt_enable: 0;
}
from_register_u8!(Control);

#[cfg(feature = "defmt")]
impl defmt::Format for Control {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Control({=u8:#x}", self.0);
        if self.interrupt_control() == InterruptControl::Interrupt {
            defmt::write!(f, ", INTCN");
        }
        if self.alarm2_interrupt_enable() {
            defmt::write!(f, ", A2IE");
        }
        if self.alarm1_interrupt_enable() {
            defmt::write!(f, ", A1IE");
        }
        defmt::write!(f, ")");
    }
}

bitfield! {
    /// Status register for device state and flags.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Status(u8);
    impl Debug;
    /// Oscillator stop flag
    pub oscillator_stop_flag, set_oscillator_stop_flag: 7;
    /// Enable 32kHz output
    pub enable_32khz_output, set_enable_32khz_output: 3;
    /// Device busy flag
    pub busy, set_busy: 2;
    /// Alarm 2 triggered flag
    pub alarm2_flag, set_alarm2_flag: 1;
    /// Alarm 1 triggered flag
    pub alarm1_flag, set_alarm1_flag: 0;
    /// Both alarm flags as a 2-bit value
    pub alarm_flags, set_alarm_flags: 1, 0;
}
from_register_u8!(Status);

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Status(osf={=bool}, a2f={=bool}, a1f={=bool})",
            self.oscillator_stop_flag(),
            self.alarm2_flag(),
            self.alarm1_flag()
        )
    }
}

bitfield! {
    /// Temperature MSB register: integer degrees, two's complement.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Temperature(u8);
    impl Debug;
    pub i8, temperature, set_temperature: 7, 0;
}
from_register_u8!(Temperature);

bitfield! {
    /// Temperature LSB register: quarter degrees in the upper two bits.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct TemperatureFraction(u8);
    impl Debug;
    pub temperature_fraction, set_temperature_fraction: 7, 6;
}
from_register_u8!(TemperatureFraction);

// Alarm register types with mask bits and special control bits

bitfield! {
    /// Alarm Seconds register with mask bit (only used by Alarm 1).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmSeconds(u8);
    impl Debug;
    /// Alarm mask bit 1 (A1M1)
    pub alarm_mask1, set_alarm_mask1: 7;
    /// BCD seconds
    pub seconds_bcd, set_seconds_bcd: 6, 0;
}
from_register_u8!(AlarmSeconds);

bitfield! {
    /// Alarm Minutes register with mask bit (used by both Alarm 1 and Alarm 2).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmMinutes(u8);
    impl Debug;
    /// Alarm mask bit 2 (A1M2/A2M2)
    pub alarm_mask2, set_alarm_mask2: 7;
    /// BCD minutes
    pub minutes_bcd, set_minutes_bcd: 6, 0;
}
from_register_u8!(AlarmMinutes);

bitfield! {
    /// Alarm Hours register with mask bit and time format control (used by both Alarm 1 and Alarm 2).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmHours(u8);
    impl Debug;
    /// Alarm mask bit 3 (A1M3/A2M3)
    pub alarm_mask3, set_alarm_mask3: 7;
    /// Time representation format (12/24 hour)
    pub from into TimeRepresentation, time_representation, set_time_representation: 6, 6;
    /// BCD hours in 24-hour form
    pub hours_bcd, set_hours_bcd: 5, 0;
}
from_register_u8!(AlarmHours);

bitfield! {
    /// Alarm Day/Date register with mask bit and DY/DT control (used by both Alarm 1 and Alarm 2).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmDayDate(u8);
    impl Debug;
    /// Alarm mask bit 4 (A1M4/A2M4)
    pub alarm_mask4, set_alarm_mask4: 7;
    /// Day/Date select (1=day of week, 0=date of month)
    pub from into DayDateSelect, day_date_select, set_day_date_select: 6, 6;
    /// BCD day of week (DY/DT=1) or date of month (DY/DT=0)
    pub day_or_date_bcd, set_day_or_date_bcd: 5, 0;
}
from_register_u8!(AlarmDayDate);

#[cfg(feature = "defmt")]
impl defmt::Format for AlarmDayDate {
    fn format(&self, f: defmt::Formatter) {
        let select = match self.day_date_select() {
            DayDateSelect::Day => "day",
            DayDateSelect::Date => "date",
        };
        defmt::write!(
            f,
            "AlarmDayDate({=str} {=u8:#x}, masked={=bool})",
            select,
            self.day_or_date_bcd(),
            self.alarm_mask4()
        )
    }
}
