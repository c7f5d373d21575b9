//! Async implementation of the DS3231 driver.
//!
//! This module mirrors [`crate::DS3231`] over `embedded-hal-async` traits.
//! Register encoding is shared with the blocking driver; only the bus
//! transactions are awaited. It is only available when the `async` feature
//! is enabled.
//!
//! # Example
//!
//! ```rust,ignore
//! use ds3231_rtc::asynch::DS3231;
//! use ds3231_rtc::DEFAULT_ADDRESS;
//!
//! let mut rtc = DS3231::create(i2c, DEFAULT_ADDRESS).await?;
//! let now = rtc.datetime().await?;
//! ```

use embedded_hal_async::i2c::I2c;
use paste::paste;

use crate::temperature;
use crate::{
    debug, decode_time_block, encode_time_block, error, AlarmFlags, AlarmMode, AlarmRegisters,
    Control, DS3231Alarm1, DS3231Alarm2, DS3231Error, RegAddr, RtcDateTime, Status, SystemClock,
    MAX_ADDRESS,
};

/// DS3231 Real-Time Clock async driver.
///
/// Operations are awaited one bus transaction at a time; read-modify-write
/// sequences on the control and status registers are not atomic with respect
/// to other bus users.
pub struct DS3231<I2C: I2c> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> DS3231<I2C> {
    /// Wraps the bus without touching the device.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Wraps the bus, clears the control register and disarms both alarms.
    ///
    /// # Errors
    ///
    /// Fails with [`DS3231Error::InvalidAddress`] for addresses above 0x7F,
    /// or with the first bus error while initializing.
    pub async fn create(i2c: I2C, address: u8) -> Result<Self, DS3231Error<I2C::Error>> {
        if address > MAX_ADDRESS {
            error!("invalid I2C address {}", address);
            return Err(DS3231Error::InvalidAddress(address));
        }
        let mut dev = Self::new(i2c, address);
        dev.init().await?;
        Ok(dev)
    }

    /// Clears the control register and disarms both alarms.
    ///
    /// # Errors
    ///
    /// Returns the first bus error.
    pub async fn init(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_control(Control::default()).await?;
        self.disable_alarms().await
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
    pub async fn datetime(&mut self) -> Result<RtcDateTime, DS3231Error<I2C::Error>> {
        let data = self.read_time_block().await?;
        let datetime = decode_time_block(data).map_err(DS3231Error::DateTime)?;
        debug!("read unixtime {}", datetime.unixtime());
        Ok(datetime)
    }

    async fn read_time_block(&mut self) -> Result<[u8; 7], DS3231Error<I2C::Error>> {
        let mut data = [0; 7];
        self.i2c
            .write_read(self.address, &[RegAddr::Seconds as u8], &mut data)
            .await?;
        Ok(data)
    }

    /// Writes the 7-byte time block in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when the bus transaction fails.
    pub async fn set_datetime(
        &mut self,
        datetime: &RtcDateTime,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let data = encode_time_block(datetime);
        let mut frame = [RegAddr::Seconds as u8, 0, 0, 0, 0, 0, 0, 0];
        frame[1..].copy_from_slice(&data);
        self.i2c.write(self.address, &frame).await?;
        Ok(())
    }

    /// Sets the clock from seconds since the Unix epoch, decomposed in UTC.
    ///
    /// # Errors
    ///
    /// Fails when the instant falls outside 2000-2199 or on bus errors.
    pub async fn set_unixtime(&mut self, unixtime: i64) -> Result<(), DS3231Error<I2C::Error>> {
        let datetime = RtcDateTime::from_unixtime(unixtime).map_err(DS3231Error::DateTime)?;
        self.set_datetime(&datetime).await
    }

    /// Reads the device time and hands it to the host clock.
    ///
    /// # Errors
    ///
    /// Fails on bus or decoding errors, or with [`DS3231Error::SystemClock`]
    /// when the host rejects the time.
    pub async fn set_system_time(
        &mut self,
        clock: &mut impl SystemClock,
    ) -> Result<RtcDateTime, DS3231Error<I2C::Error>> {
        let datetime = self.datetime().await?;
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
    pub async fn temperature_quarters(&mut self) -> Result<i16, DS3231Error<I2C::Error>> {
        let mut data = [0; 2];
        self.i2c
            .write_read(self.address, &[RegAddr::MSBTemp as u8], &mut data)
            .await?;
        Ok(temperature::decode_quarters(data[0], data[1]))
    }

    /// Reads the die temperature in degrees Celsius.
    ///
    /// # Errors
    ///
    /// Returns an error when the bus transaction fails.
    #[cfg(feature = "temperature_f32")]
    pub async fn temperature_celsius(&mut self) -> Result<f32, DS3231Error<I2C::Error>> {
        Ok(temperature::quarters_to_celsius(
            self.temperature_quarters().await?,
        ))
    }

    /// Reads the die temperature in degrees Fahrenheit.
    ///
    /// # Errors
    ///
    /// Returns an error when the bus transaction fails.
    #[cfg(feature = "temperature_f32")]
    pub async fn temperature_fahrenheit(&mut self) -> Result<f32, DS3231Error<I2C::Error>> {
        Ok(temperature::celsius_to_fahrenheit(
            self.temperature_celsius().await?,
        ))
    }

    /// Programs an alarm and enables its interrupt on INT/SQW, returning the
    /// mode actually programmed.
    ///
    /// # Errors
    ///
    /// Returns an error when a bus transaction fails.
    pub async fn set_alarm(
        &mut self,
        mode: AlarmMode,
        at: &RtcDateTime,
    ) -> Result<AlarmMode, DS3231Error<I2C::Error>> {
        let registers = AlarmRegisters::encode(mode, at);
        debug!("alarm mode {} at register {}", mode.bits(), registers.start() as u8);
        self.write_alarm(&registers).await?;
        Ok(mode.effective())
    }

    async fn write_alarm(
        &mut self,
        registers: &AlarmRegisters,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let (frame, len) = registers.frame();
        self.i2c.write(self.address, &frame[..len]).await?;

        let mut control = self.control().await?;
        registers.enable(&mut control);
        self.set_control(control).await
    }

    /// Disarms both alarms by pinning them to the time block as stored,
    /// valid calendar time or not.
    ///
    /// # Errors
    ///
    /// Returns the first bus error.
    pub async fn disable_alarms(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        let block = self.read_time_block().await?;
        self.write_alarm(&AlarmRegisters::Alarm2(DS3231Alarm2::pinned(&block)))
            .await?;
        self.write_alarm(&AlarmRegisters::Alarm1(DS3231Alarm1::pinned(&block)))
            .await?;
        self.check_alarms().await?;
        Ok(())
    }

    /// Returns which alarms fired and clears their flags.
    ///
    /// # Errors
    ///
    /// Returns an error when a bus transaction fails.
    pub async fn check_alarms(&mut self) -> Result<AlarmFlags, DS3231Error<I2C::Error>> {
        let mut status = self.status().await?;
        let flags = AlarmFlags::from(status);
        if flags.any() {
            debug!("alarm flags {}", flags.bits());
            status.set_alarm_flags(0);
            self.set_status(status).await?;
        }
        Ok(flags)
    }

    /// Returns the oscillator stop flag, clearing it when `clear` is set.
    ///
    /// # Errors
    ///
    /// Returns an error when a bus transaction fails.
    pub async fn check_stop_flag(&mut self, clear: bool) -> Result<bool, DS3231Error<I2C::Error>> {
        let mut status = self.status().await?;
        let stopped = status.oscillator_stop_flag();
        if stopped && clear {
            status.set_oscillator_stop_flag(false);
            self.set_status(status).await?;
        }
        Ok(stopped)
    }

    /// Reads the raw Alarm 1 block (0x07-0x0A).
    ///
    /// # Errors
    ///
    /// Returns an error when the bus transaction fails.
    pub async fn alarm1_registers(&mut self) -> Result<[u8; 4], DS3231Error<I2C::Error>> {
        let mut data = [0; 4];
        self.i2c
            .write_read(self.address, &[RegAddr::Alarm1Seconds as u8], &mut data)
            .await?;
        Ok(data)
    }

    /// Reads the raw Alarm 2 block (0x0B-0x0D).
    ///
    /// # Errors
    ///
    /// Returns an error when the bus transaction fails.
    pub async fn alarm2_registers(&mut self) -> Result<[u8; 3], DS3231Error<I2C::Error>> {
        let mut data = [0; 3];
        self.i2c
            .write_read(self.address, &[RegAddr::Alarm2Minutes as u8], &mut data)
            .await?;
        Ok(data)
    }

    /// Reads Alarm 1 as a typed view.
    ///
    /// # Errors
    ///
    /// Returns an error when the bus transaction fails.
    pub async fn alarm1(&mut self) -> Result<DS3231Alarm1, DS3231Error<I2C::Error>> {
        Ok(DS3231Alarm1::from(self.alarm1_registers().await?))
    }

    /// Reads Alarm 2 as a typed view.
    ///
    /// # Errors
    ///
    /// Returns an error when the bus transaction fails.
    pub async fn alarm2(&mut self) -> Result<DS3231Alarm2, DS3231Error<I2C::Error>> {
        Ok(DS3231Alarm2::from(self.alarm2_registers().await?))
    }
}

// Register access implementations
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> DS3231<I2C> {
            $(
                paste! {
                    #[doc = concat!("Reads the ", stringify!($name), " register.")]
                    ///
                    /// # Errors
                    ///
                    /// Returns an error when the bus transaction fails.
                    pub async fn $name(&mut self) -> Result<$typ, DS3231Error<I2C::Error>> {
                        let mut data = [0];
                        self.i2c
                            .write_read(self.address, &[$regaddr as u8], &mut data)
                            .await?;
                        Ok(<$typ>::from(data[0]))
                    }

                    #[doc = concat!("Writes the ", stringify!($name), " register.")]
                    ///
                    /// # Errors
                    ///
                    /// Returns an error when the bus transaction fails.
                    pub async fn [<set_ $name>](&mut self, value: $typ) -> Result<(), DS3231Error<I2C::Error>> {
                        self.i2c.write(
                            self.address,
                            &[$regaddr as u8, value.into()],
                        ).await?;
                        Ok(())
                    }
                }
            )+
        }
    }
}

impl_register_access!(
    (control, RegAddr::Control, Control),
    (status, RegAddr::ControlStatus, Status)
);
