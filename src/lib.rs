//! Platform-agnostic driver for the DS3231 real-time clock.
//!
//! The driver reads and writes the calendar as an [`RtcDateTime`] (or seconds
//! since the Unix epoch), programs the two hardware alarms from packed
//! [`AlarmMode`] codes, reports the die temperature and detects oscillator
//! stops.
//!
//! # Features
//!
//! * `async`: adds `asynch::DS3231` over `embedded-hal-async`
//! * `log` / `defmt`: debug and error logging
//! * `temperature_f32` (default): floating point temperature readings
//! * `std`: local-time decomposition with [`RtcDateTime::from_unixtime_local`]
//!
//! # Example
//!
//! ```rust,ignore
//! use ds3231_rtc::{AlarmMode, DS3231, DEFAULT_ADDRESS};
//!
//! let mut rtc = DS3231::create(i2c, DEFAULT_ADDRESS)?;
//! rtc.set_unixtime(1_710_430_245)?;
//!
//! let now = rtc.datetime()?;
//! rtc.set_alarm(AlarmMode::DAILY, &now)?;
//!
//! if rtc.check_alarms()?.alarm2() {
//!     // a day has passed
//! }
//! ```
#![no_std]

cfg_if::cfg_if! {
    if #[cfg(feature = "log")] {
        #[allow(unused_imports)]
        pub(crate) use log::{debug, error};
    } else if #[cfg(feature = "defmt")] {
        #[allow(unused_imports)]
        pub(crate) use defmt::{debug, error};
    } else {
        #[allow(unused_imports)]
        pub(crate) use crate::no_log::{debug, error};
    }
}

// Logging compiles away when neither `log` nor `defmt` is enabled.
#[cfg(not(any(feature = "log", feature = "defmt")))]
mod no_log {
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }
    macro_rules! error {
        ($($arg:tt)*) => {};
    }
    pub(crate) use debug;
    pub(crate) use error;
}

pub mod alarm;
#[cfg(feature = "async")]
pub mod asynch;
pub mod bcd;
pub mod calendar;
pub mod datetime;
pub mod registers;
pub mod temperature;

use embedded_hal::i2c::I2c;

pub use alarm::{
    AlarmField, AlarmFlags, AlarmMode, AlarmRegisters, AlarmTarget, DS3231Alarm1, DS3231Alarm2,
};
pub use calendar::{day_of_week, RtcDateTime};
pub use datetime::{decode_time_block, encode_time_block, DS3231DateTimeError};
pub use registers::{
    AlarmDayDate, AlarmHours, AlarmMinutes, AlarmSeconds, Control, DayDateSelect, Hours,
    InterruptControl, Month, RegAddr, Status, Temperature, TemperatureFraction,
    TimeRepresentation,
};

/// Fixed I2C address of the DS3231.
pub const DEFAULT_ADDRESS: u8 = 0x68;

/// Largest valid 7-bit I2C address.
const MAX_ADDRESS: u8 = 0x7F;

/// Errors reported by the driver.
#[derive(Debug)]
pub enum DS3231Error<I2CE> {
    /// Bus transaction failed
    I2c(I2CE),
    /// Registers or arguments do not form a supported date and time
    DateTime(DS3231DateTimeError),
    /// Address does not fit in 7 bits
    InvalidAddress(u8),
    /// The host clock rejected the new time with this status code
    SystemClock(i32),
}

impl<I2CE> From<I2CE> for DS3231Error<I2CE> {
    fn from(e: I2CE) -> Self {
        DS3231Error::I2c(e)
    }
}

/// Host clock that can be set from the RTC.
pub trait SystemClock {
    /// Sets the host time to `unixtime` seconds since the epoch.
    ///
    /// # Errors
    ///
    /// Returns the host's status code when the clock could not be set.
    fn set_unixtime(&mut self, unixtime: i64) -> Result<(), i32>;
}

impl<F> SystemClock for F
where
    F: FnMut(i64) -> Result<(), i32>,
{
    fn set_unixtime(&mut self, unixtime: i64) -> Result<(), i32> {
        self(unixtime)
    }
}

macro_rules! set_and_get_register {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        $(
            paste::item! {
                #[doc = concat!("Writes the ", stringify!($name), " register.")]
                ///
                /// # Errors
                ///
                /// Returns an error when the bus transaction fails.
                pub fn [< set_ $name >](&mut self, value: $typ) -> Result<(), DS3231Error<I2C::Error>> {
                    self.i2c.write(self.address, &[$regaddr as u8, value.into()])?;
                    Ok(())
                }
            }

            #[doc = concat!("Reads the ", stringify!($name), " register.")]
            ///
            /// # Errors
            ///
            /// Returns an error when the bus transaction fails.
            pub fn $name(&mut self) -> Result<$typ, DS3231Error<I2C::Error>> {
                let mut data = [0];
                self.i2c
                    .write_read(self.address, &[$regaddr as u8], &mut data)?;
                Ok(<$typ>::from(data[0]))
            }
        )+
    }
}

/// Blocking DS3231 session bound to an I2C bus and device address.
pub struct DS3231<I2C: I2c> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> DS3231<I2C> {
    /// Wraps the bus without touching the device.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Wraps the bus and brings the device to a known state: control
    /// register cleared and both alarms disarmed.
    ///
    /// # Errors
    ///
    /// Fails with [`DS3231Error::InvalidAddress`] for addresses above 0x7F,
    /// or with the first bus error while initializing.
    pub fn create(i2c: I2C, address: u8) -> Result<Self, DS3231Error<I2C::Error>> {
        if address > MAX_ADDRESS {
            error!("invalid I2C address {}", address);
            return Err(DS3231Error::InvalidAddress(address));
        }
        let mut dev = Self::new(i2c, address);
        dev.init()?;
        Ok(dev)
    }

    /// Clears the control register and disarms both alarms.
    ///
    /// # Errors
    ///
    /// Returns the first bus error.
    pub fn init(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_control(Control::default())?;
        self.disable_alarms()
    }

    /// Device address of this session.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Ends the session and hands back the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Reads the 7-byte time block.
    ///
    /// # Errors
    ///
    /// Fails on bus errors or when the registers do not hold a valid time.
    pub fn datetime(&mut self) -> Result<RtcDateTime, DS3231Error<I2C::Error>> {
        let data = self.read_time_block()?;
        let datetime = decode_time_block(data).map_err(DS3231Error::DateTime)?;
        debug!("read unixtime {}", datetime.unixtime());
        Ok(datetime)
    }

    fn read_time_block(&mut self) -> Result<[u8; 7], DS3231Error<I2C::Error>> {
        let mut data = [0; 7];
        self.i2c
            .write_read(self.address, &[RegAddr::Seconds as u8], &mut data)?;
        Ok(data)
    }

    /// Writes the 7-byte time block in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when the bus transaction fails.
    pub fn set_datetime(&mut self, datetime: &RtcDateTime) -> Result<(), DS3231Error<I2C::Error>> {
        let data = encode_time_block(datetime);
        let mut frame = [RegAddr::Seconds as u8, 0, 0, 0, 0, 0, 0, 0];
        frame[1..].copy_from_slice(&data);
        self.i2c.write(self.address, &frame)?;
        Ok(())
    }

    /// Sets the clock from seconds since the Unix epoch, decomposed in UTC.
    ///
    /// # Errors
    ///
    /// Fails when the instant falls outside 2000-2199 or on bus errors.
    pub fn set_unixtime(&mut self, unixtime: i64) -> Result<(), DS3231Error<I2C::Error>> {
        let datetime = RtcDateTime::from_unixtime(unixtime).map_err(DS3231Error::DateTime)?;
        self.set_datetime(&datetime)
    }

    /// Reads the device time and hands it to the host clock.
    ///
    /// # Errors
    ///
    /// Fails on bus or decoding errors, or with [`DS3231Error::SystemClock`]
    /// when the host rejects the time.
    pub fn set_system_time(
        &mut self,
        clock: &mut impl SystemClock,
    ) -> Result<RtcDateTime, DS3231Error<I2C::Error>> {
        let datetime = self.datetime()?;
        clock.set_unixtime(datetime.unixtime()).map_err(|code| {
            error!("host clock rejected unixtime, status {}", code);
            DS3231Error::SystemClock(code)
        })?;
        Ok(datetime)
    }

    /// Reads the die temperature in quarter degrees Celsius.
    ///
    /// # Errors
    ///
    /// Returns an error when the bus transaction fails.
    pub fn temperature_quarters(&mut self) -> Result<i16, DS3231Error<I2C::Error>> {
        let mut data = [0; 2];
        self.i2c
            .write_read(self.address, &[RegAddr::MSBTemp as u8], &mut data)?;
        Ok(temperature::decode_quarters(data[0], data[1]))
    }

    /// Reads the die temperature in degrees Celsius.
    ///
    /// # Errors
    ///
    /// Returns an error when the bus transaction fails.
    #[cfg(feature = "temperature_f32")]
    pub fn temperature_celsius(&mut self) -> Result<f32, DS3231Error<I2C::Error>> {
        Ok(temperature::quarters_to_celsius(self.temperature_quarters()?))
    }

    /// Reads the die temperature in degrees Fahrenheit.
    ///
    /// # Errors
    ///
    /// Returns an error when the bus transaction fails.
    #[cfg(feature = "temperature_f32")]
    pub fn temperature_fahrenheit(&mut self) -> Result<f32, DS3231Error<I2C::Error>> {
        Ok(temperature::celsius_to_fahrenheit(self.temperature_celsius()?))
    }

    /// Programs an alarm and enables its interrupt on INT/SQW.
    ///
    /// Returns the mode actually programmed, with custom presets collapsed
    /// onto Alarm 2.
    ///
    /// # Errors
    ///
    /// Returns an error when a bus transaction fails.
    pub fn set_alarm(
        &mut self,
        mode: AlarmMode,
        at: &RtcDateTime,
    ) -> Result<AlarmMode, DS3231Error<I2C::Error>> {
        let registers = AlarmRegisters::encode(mode, at);
        debug!("alarm mode {} at register {}", mode.bits(), registers.start() as u8);
        self.write_alarm(&registers)?;
        Ok(mode.effective())
    }

    fn write_alarm(&mut self, registers: &AlarmRegisters) -> Result<(), DS3231Error<I2C::Error>> {
        let (frame, len) = registers.frame();
        self.i2c.write(self.address, &frame[..len])?;

        let mut control = self.control()?;
        registers.enable(&mut control);
        self.set_control(control)
    }

    /// Disarms both alarms by pinning them to the current date and time,
    /// then clears any flags raised while doing so.
    ///
    /// The alarm bytes are copied from the raw time block, so this works
    /// even when the block does not hold a valid calendar time.
    ///
    /// # Errors
    ///
    /// Returns the first bus error.
    pub fn disable_alarms(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        let block = self.read_time_block()?;
        self.write_alarm(&AlarmRegisters::Alarm2(DS3231Alarm2::pinned(&block)))?;
        self.write_alarm(&AlarmRegisters::Alarm1(DS3231Alarm1::pinned(&block)))?;
        self.check_alarms()?;
        Ok(())
    }

    /// Returns which alarms fired and clears their flags.
    ///
    /// # Errors
    ///
    /// Returns an error when a bus transaction fails.
    pub fn check_alarms(&mut self) -> Result<AlarmFlags, DS3231Error<I2C::Error>> {
        let mut status = self.status()?;
        let flags = AlarmFlags::from(status);
        if flags.any() {
            debug!("alarm flags {}", flags.bits());
            status.set_alarm_flags(0);
            self.set_status(status)?;
        }
        Ok(flags)
    }

    /// Returns whether the oscillator stopped since the flag was last
    /// cleared, clearing it when `clear` is set.
    ///
    /// # Errors
    ///
    /// Returns an error when a bus transaction fails.
    pub fn check_stop_flag(&mut self, clear: bool) -> Result<bool, DS3231Error<I2C::Error>> {
        let mut status = self.status()?;
        let stopped = status.oscillator_stop_flag();
        if stopped && clear {
            status.set_oscillator_stop_flag(false);
            self.set_status(status)?;
        }
        Ok(stopped)
    }

    /// Reads the raw Alarm 1 block (0x07-0x0A).
    ///
    /// # Errors
    ///
    /// Returns an error when the bus transaction fails.
    pub fn alarm1_registers(&mut self) -> Result<[u8; 4], DS3231Error<I2C::Error>> {
        let mut data = [0; 4];
        self.i2c
            .write_read(self.address, &[RegAddr::Alarm1Seconds as u8], &mut data)?;
        Ok(data)
    }

    /// Reads the raw Alarm 2 block (0x0B-0x0D).
    ///
    /// # Errors
    ///
    /// Returns an error when the bus transaction fails.
    pub fn alarm2_registers(&mut self) -> Result<[u8; 3], DS3231Error<I2C::Error>> {
        let mut data = [0; 3];
        self.i2c
            .write_read(self.address, &[RegAddr::Alarm2Minutes as u8], &mut data)?;
        Ok(data)
    }

    /// Reads Alarm 1 as a typed view.
    ///
    /// # Errors
    ///
    /// Returns an error when the bus transaction fails.
    pub fn alarm1(&mut self) -> Result<DS3231Alarm1, DS3231Error<I2C::Error>> {
        Ok(DS3231Alarm1::from(self.alarm1_registers()?))
    }

    /// Reads Alarm 2 as a typed view.
    ///
    /// # Errors
    ///
    /// Returns an error when the bus transaction fails.
    pub fn alarm2(&mut self) -> Result<DS3231Alarm2, DS3231Error<I2C::Error>> {
        Ok(DS3231Alarm2::from(self.alarm2_registers()?))
    }

    set_and_get_register!(
        (control, RegAddr::Control, Control),
        (status, RegAddr::ControlStatus, Status)
    );
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use alloc::vec;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    const DEVICE_ADDRESS: u8 = 0x68;

    // 2024-03-14 15:30:45, Thursday
    const TIME_BLOCK: [u8; 7] = [0x45, 0x30, 0x15, 0x04, 0x14, 0x03, 0x24];

    fn setup_mock(expectations: &[I2cTrans]) -> I2cMock {
        I2cMock::new(expectations)
    }

    fn disable_alarms_transactions(control: u8, status: u8) -> vec::Vec<I2cTrans> {
        let mut transactions = vec![
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x00], TIME_BLOCK.to_vec()),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x0B, 0x30, 0x15, 0x14]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x0E], vec![control]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x0E, control | 0x06]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x07, 0x45, 0x30, 0x15, 0x14]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x0E], vec![control | 0x06]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x0E, control | 0x07]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x0F], vec![status]),
        ];
        if status & 0x03 != 0 {
            transactions.push(I2cTrans::write(
                DEVICE_ADDRESS,
                vec![0x0F, status & !0x03],
            ));
        }
        transactions
    }

    #[test]
    fn test_new_does_not_touch_bus() {
        let mock = setup_mock(&[]);
        let dev = DS3231::new(mock, DEVICE_ADDRESS);
        assert_eq!(dev.address(), DEVICE_ADDRESS);
        let mut i2c = dev.release();
        i2c.done();
    }

    #[test]
    fn test_create_initializes_device() {
        let mut transactions = vec![I2cTrans::write(DEVICE_ADDRESS, vec![0x0E, 0x00])];
        transactions.extend(disable_alarms_transactions(0x00, 0x88));
        let mock = setup_mock(&transactions);

        let mut dev = DS3231::create(mock, DEVICE_ADDRESS).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_create_with_undecodable_time_block() {
        // 12-hour mode, 12 with bit 5 clear decodes to hour 24
        let block = vec![0x00, 0x15, 0x52, 0x04, 0x14, 0x03, 0x24];
        let transactions = [
            I2cTrans::write(DEVICE_ADDRESS, vec![0x0E, 0x00]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x00], block.clone()),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x0B, 0x15, 0x52, 0x14]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x0E], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x0E, 0x06]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x07, 0x00, 0x15, 0x52, 0x14]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x0E], vec![0x06]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x0E, 0x07]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x0F], vec![0x00]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x00], block),
        ];
        let mock = setup_mock(&transactions);

        let mut dev = DS3231::create(mock, DEVICE_ADDRESS).unwrap();
        assert!(matches!(
            dev.datetime(),
            Err(DS3231Error::DateTime(DS3231DateTimeError::InvalidDateTime))
        ));
        dev.i2c.done();
    }

    #[test]
    fn test_create_rejects_invalid_address() {
        let mut mock = setup_mock(&[]);
        let result = DS3231::create(mock.clone(), 0x80);
        assert!(matches!(result, Err(DS3231Error::InvalidAddress(0x80))));
        mock.done();
    }

    #[test]
    fn test_read_datetime() {
        let mock = setup_mock(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Seconds as u8],
            TIME_BLOCK.to_vec(),
        )]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        let dt = dev.datetime().unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 3);
        assert_eq!(dt.day(), 14);
        assert_eq!(dt.day_of_week(), 4);
        assert_eq!(dt.hour(), 15);
        assert_eq!(dt.minute(), 30);
        assert_eq!(dt.second(), 45);
        assert_eq!(dt.unixtime(), 1_710_430_245);
        dev.i2c.done();
    }

    #[test]
    fn test_read_datetime_bus_error() {
        let mock = setup_mock(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Seconds as u8],
            vec![0; 7],
        )
        .with_error(ErrorKind::Other)]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        assert!(matches!(
            dev.datetime(),
            Err(DS3231Error::I2c(ErrorKind::Other))
        ));
        dev.i2c.done();
    }

    #[test]
    fn test_read_datetime_invalid_registers() {
        let mock = setup_mock(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Seconds as u8],
            vec![0; 7],
        )]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        assert!(matches!(
            dev.datetime(),
            Err(DS3231Error::DateTime(DS3231DateTimeError::InvalidDateTime))
        ));
        dev.i2c.done();
    }

    #[test]
    fn test_set_datetime_writes_one_block() {
        let dt = RtcDateTime::new(2024, 3, 14, 15, 30, 45).unwrap();
        let mock = setup_mock(&[I2cTrans::write(
            DEVICE_ADDRESS,
            vec![0x00, 0x45, 0x30, 0x15, 0x04, 0x14, 0x03, 0x24],
        )]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        dev.set_datetime(&dt).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_set_unixtime() {
        let mock = setup_mock(&[I2cTrans::write(
            DEVICE_ADDRESS,
            vec![0x00, 0x45, 0x30, 0x15, 0x04, 0x14, 0x03, 0x24],
        )]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        dev.set_unixtime(1_710_430_245).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_set_unixtime_out_of_range() {
        let mock = setup_mock(&[]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        // 1999-12-31 23:59:59
        assert!(matches!(
            dev.set_unixtime(946_684_799),
            Err(DS3231Error::DateTime(DS3231DateTimeError::YearNotAfter1999))
        ));
        dev.i2c.done();
    }

    #[test]
    fn test_set_system_time() {
        let mock = setup_mock(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![0x00],
            TIME_BLOCK.to_vec(),
        )]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        let mut seen = None;
        let dt = dev
            .set_system_time(&mut |t: i64| -> Result<(), i32> {
                seen = Some(t);
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, Some(1_710_430_245));
        assert_eq!(dt.unixtime(), 1_710_430_245);
        dev.i2c.done();
    }

    #[test]
    fn test_set_system_time_host_failure() {
        let mock = setup_mock(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![0x00],
            TIME_BLOCK.to_vec(),
        )]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        assert!(matches!(
            dev.set_system_time(&mut |_t: i64| -> Result<(), i32> { Err(-1) }),
            Err(DS3231Error::SystemClock(-1))
        ));
        dev.i2c.done();
    }

    #[test]
    fn test_read_temperature() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x11], vec![0x19, 0x40]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x11], vec![0xE7, 0x00]),
        ]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        assert_eq!(dev.temperature_quarters().unwrap(), 101);
        assert_eq!(dev.temperature_quarters().unwrap(), -100);
        dev.i2c.done();
    }

    #[cfg(feature = "temperature_f32")]
    #[test]
    fn test_read_temperature_f32() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x11], vec![0x19, 0x00]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x11], vec![0x19, 0x00]),
        ]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        let celsius = dev.temperature_celsius().unwrap();
        assert!(celsius > 24.999 && celsius < 25.001);
        let fahrenheit = dev.temperature_fahrenheit().unwrap();
        assert!(fahrenheit > 76.999 && fahrenheit < 77.001);
        dev.i2c.done();
    }

    #[test]
    fn test_set_alarm1_full_match() {
        let at = RtcDateTime::new(2024, 3, 14, 15, 30, 45).unwrap();
        let mock = setup_mock(&[
            I2cTrans::write(DEVICE_ADDRESS, vec![0x07, 0x45, 0x30, 0x15, 0x14]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x0E], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x0E, 0x05]),
        ]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        let mode = dev
            .set_alarm(AlarmMode::MATCH_SECOND_MINUTE_HOUR_DATE, &at)
            .unwrap();
        assert_eq!(mode, AlarmMode::MATCH_SECOND_MINUTE_HOUR_DATE);
        dev.i2c.done();
    }

    #[test]
    fn test_set_alarm_every_second() {
        let at = RtcDateTime::new(2024, 3, 14, 15, 30, 45).unwrap();
        let mock = setup_mock(&[
            I2cTrans::write(DEVICE_ADDRESS, vec![0x07, 0xC5, 0xB0, 0x95, 0x94]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x0E], vec![0x1C]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x0E, 0x1D]),
        ]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        dev.set_alarm(AlarmMode::EVERY_SECOND, &at).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_set_alarm_weekly_collapses_to_alarm2() {
        let at = RtcDateTime::new(2024, 3, 14, 15, 30, 45).unwrap();
        let mock = setup_mock(&[
            I2cTrans::write(DEVICE_ADDRESS, vec![0x0B, 0x30, 0x15, 0x44]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x0E], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x0E, 0x06]),
        ]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        let mode = dev.set_alarm(AlarmMode::WEEKLY, &at).unwrap();
        assert_eq!(mode, AlarmMode::MATCH_MINUTE_HOUR_DOW);
        assert_eq!(mode.bits(), 0x0A);
        dev.i2c.done();
    }

    #[test]
    fn test_set_alarm_block_write_failure_skips_control() {
        let at = RtcDateTime::new(2024, 3, 14, 15, 30, 45).unwrap();
        let mock = setup_mock(&[I2cTrans::write(
            DEVICE_ADDRESS,
            vec![0x0B, 0x30, 0x95, 0x94],
        )
        .with_error(ErrorKind::Other)]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        assert!(matches!(
            dev.set_alarm(AlarmMode::HOURLY, &at),
            Err(DS3231Error::I2c(ErrorKind::Other))
        ));
        dev.i2c.done();
    }

    #[test]
    fn test_check_alarms_clears_on_read() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x0F], vec![0x89]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x0F, 0x88]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x0F], vec![0x88]),
        ]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        let flags = dev.check_alarms().unwrap();
        assert_eq!(flags.bits(), 1);
        assert!(flags.alarm1());
        assert!(!flags.alarm2());

        let flags = dev.check_alarms().unwrap();
        assert_eq!(flags, AlarmFlags::NONE);
        dev.i2c.done();
    }

    #[test]
    fn test_disable_alarms_then_check_alarms() {
        let mut transactions = disable_alarms_transactions(0x00, 0x03);
        transactions.push(I2cTrans::write_read(DEVICE_ADDRESS, vec![0x0F], vec![0x00]));
        let mock = setup_mock(&transactions);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        dev.disable_alarms().unwrap();
        assert!(!dev.check_alarms().unwrap().any());
        dev.i2c.done();
    }

    #[test]
    fn test_check_stop_flag() {
        let mock = setup_mock(&[
            // Set, not cleared
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x0F], vec![0x88]),
            // Set and cleared
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x0F], vec![0x88]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x0F, 0x08]),
            // Clear-on-read: second call sees nothing
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x0F], vec![0x08]),
        ]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        assert!(dev.check_stop_flag(false).unwrap());
        assert!(dev.check_stop_flag(true).unwrap());
        assert!(!dev.check_stop_flag(true).unwrap());
        dev.i2c.done();
    }

    #[test]
    fn test_read_alarm_registers() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x07], vec![0x45, 0x30, 0x15, 0x14]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x0B], vec![0x30, 0x15, 0x44]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x0B], vec![0xB0, 0x95, 0x94]),
        ]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        assert_eq!(dev.alarm1_registers().unwrap(), [0x45, 0x30, 0x15, 0x14]);
        assert_eq!(dev.alarm2_registers().unwrap(), [0x30, 0x15, 0x44]);
        assert_eq!(dev.alarm2().unwrap().mode(), AlarmMode::EVERY_MINUTE);
        dev.i2c.done();
    }

    #[test]
    fn test_register_operations() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control as u8], vec![0x1C]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control as u8, 0x05]),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::ControlStatus as u8],
                vec![0x80],
            ),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::ControlStatus as u8, 0x00]),
        ]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        let control = dev.control().unwrap();
        assert_eq!(control.interrupt_control(), InterruptControl::Interrupt);
        assert_eq!(control.square_wave_rate(), 0b11);
        dev.set_control(Control::from(0x05)).unwrap();

        let status = dev.status().unwrap();
        assert!(status.oscillator_stop_flag());
        dev.set_status(Status::default()).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_error_conversion() {
        let error: DS3231Error<ErrorKind> = ErrorKind::Other.into();
        assert!(matches!(error, DS3231Error::I2c(ErrorKind::Other)));
        let debug_str = alloc::format!("{:?}", DS3231Error::<ErrorKind>::InvalidAddress(0x80));
        assert!(debug_str.contains("InvalidAddress"));
    }
}
