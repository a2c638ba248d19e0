//! Driver for the Nuvoton NAU7802 24-bit load cell ADC.
//!
//! The driver talks to the chip through any [`embedded_hal::i2c::I2c`]
//! implementation. All configuration lives in the chip's registers; nothing is
//! cached on the host side, so every getter performs a bus read.
//!
//! ```
//! use embedded_hal_mock::eh1::i2c::{Mock, Transaction};
//!
//! let i2c = Mock::new(&[Transaction::write_read(0x2A, vec![0x1F], vec![0x0F])]);
//! let mut adc = nau7802::Nau7802::new(i2c);
//!
//! assert_eq!(adc.revision_code().unwrap(), 0x0F);
//! adc.destroy().done();
//! ```
#![cfg_attr(not(test), no_std)]

use byteorder::ByteOrder as _;
use embedded_hal::{delay::DelayNs, i2c::I2c};

#[macro_use]
mod fmt;

mod config;
mod constants;

#[cfg(test)]
mod sim;

pub use config::Config;
pub use constants::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The bus transaction failed or was not acknowledged.
    I2cError,
    /// Nothing acknowledged the device address during `begin`.
    DeviceNotFound,
    /// The power-up ready bit never rose.
    PowerUpTimeout,
    /// The calibration start bit never cleared.
    CalibrationTimeout,
    /// The chip reported a calibration error.
    CalibrationFailed,
    /// A value outside the set the chip accepts.
    InvalidArgument,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Error::I2cError => "I2C transaction failed",
            Error::DeviceNotFound => "NAU7802 did not acknowledge its address",
            Error::PowerUpTimeout => "NAU7802 did not report power-up ready",
            Error::CalibrationTimeout => "AFE calibration did not complete",
            Error::CalibrationFailed => "NAU7802 reported an AFE calibration error",
            Error::InvalidArgument => "value outside the accepted range",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for Error {}

pub struct Nau7802<D: I2c> {
    i2c_dev: D,
}

impl<D: I2c> Nau7802<D> {
    pub const DEVICE_ADDRESS: u8 = 0x2A;

    /// Polls of PUR, 1 ms apart, before power-up is declared failed.
    pub const POWER_UP_ATTEMPTS: usize = 100;

    /// Polls of CALS, 1 ms apart. Covers an internal calibration at 10 SPS.
    pub const CALIBRATION_ATTEMPTS: usize = 1000;

    /// Wraps the bus without touching the chip. Pass `&mut bus` to keep
    /// ownership of a shared bus.
    pub fn new(i2c_dev: D) -> Self {
        Self { i2c_dev }
    }

    pub fn destroy(self) -> D {
        let Self { i2c_dev } = self;
        i2c_dev
    }

    #[inline]
    pub fn begin<W: DelayNs>(&mut self, wait: &mut W) -> Result<()> {
        self.begin_with_config(Config::default(), wait)
    }

    /// Probes, resets and powers up the chip, then applies `config`.
    pub fn begin_with_config<W: DelayNs>(&mut self, config: Config, wait: &mut W) -> Result<()> {
        // the first probe after power-on is sometimes missed
        if !self.is_connected() && !self.is_connected() {
            warn!("nau7802: no ack at address {}", Self::DEVICE_ADDRESS);
            return Err(Error::DeviceNotFound);
        }

        self.reset(wait)?;
        self.power_up(wait)?;
        self.set_ldo(config.ldo)?;
        self.set_gain(config.gain)?;
        self.set_sample_rate(config.sample_rate)?;
        self.misc_init()?;

        if config.calibrate {
            self.calibrate(wait)?;
        }

        debug!("nau7802: initialized");
        Ok(())
    }

    /// True if the chip acknowledges its address.
    pub fn is_connected(&mut self) -> bool {
        self.i2c_dev.write(Self::DEVICE_ADDRESS, &[]).is_ok()
    }

    pub fn data_available(&mut self) -> Result<bool> {
        self.get_bit(Register::PuCtrl, PuCtrlBits::CR)
    }

    /// Checks for new data, returns nb::Error::WouldBlock if unavailable
    pub fn read(&mut self) -> nb::Result<i32, Error> {
        let data_available = self.data_available().map_err(nb::Error::Other)?;

        if !data_available {
            return Err(nb::Error::WouldBlock);
        }

        self.read_unchecked().map_err(nb::Error::Other)
    }

    /// Assumes that `data_available` has been called and returned true,
    /// otherwise returns whatever conversion is currently latched.
    pub fn read_unchecked(&mut self) -> Result<i32> {
        let mut buf = [0u8; 3]; // will hold an i24
        self.read_registers(Register::AdcoB2, &mut buf)?;

        let adc_result = byteorder::BigEndian::read_i24(&buf);
        trace!("nau7802: raw reading {}", adc_result);
        Ok(adc_result)
    }

    pub fn begin_afe_calibration(&mut self) -> Result<()> {
        self.set_bit(Register::Ctrl2, Ctrl2Bits::Cals)
    }

    pub fn poll_afe_calibration_status(&mut self) -> Result<AfeCalibrationStatus> {
        if self.get_bit(Register::Ctrl2, Ctrl2Bits::Cals)? {
            return Ok(AfeCalibrationStatus::InProgress);
        }

        if self.get_bit(Register::Ctrl2, Ctrl2Bits::CalError)? {
            return Ok(AfeCalibrationStatus::Failure);
        }

        Ok(AfeCalibrationStatus::Success)
    }

    /// Runs the calibration selected by CALMOD and blocks until the chip
    /// reports the outcome or `CALIBRATION_ATTEMPTS` polls have elapsed.
    pub fn calibrate<W: DelayNs>(&mut self, wait: &mut W) -> Result<()> {
        self.begin_afe_calibration()?;

        for _ in 0..Self::CALIBRATION_ATTEMPTS {
            match self.poll_afe_calibration_status()? {
                AfeCalibrationStatus::InProgress => wait.delay_ms(1),
                AfeCalibrationStatus::Failure => {
                    warn!("nau7802: calibration error flag set");
                    return Err(Error::CalibrationFailed);
                }
                AfeCalibrationStatus::Success => {
                    debug!("nau7802: calibration complete");
                    return Ok(());
                }
            }
        }

        warn!("nau7802: calibration timed out");
        Err(Error::CalibrationTimeout)
    }

    pub fn calibrate_with_mode<W: DelayNs>(
        &mut self,
        mode: CalibrationMode,
        wait: &mut W,
    ) -> Result<()> {
        self.set_calibration_mode(mode)?;
        self.calibrate(wait)
    }

    pub fn set_calibration_mode(&mut self, mode: CalibrationMode) -> Result<()> {
        self.update_field(Register::Ctrl2, Ctrl2Bits::CalMod, 2, mode as _)
    }

    pub fn calibration_mode(&mut self) -> Result<CalibrationMode> {
        let code = self.get_field(Register::Ctrl2, Ctrl2Bits::CalMod, 2)?;
        CalibrationMode::try_from(code)
    }

    /// Signed 24-bit offset correction stored by the last offset calibration.
    pub fn offset_calibration(&mut self, channel: Channel) -> Result<i32> {
        let start = match channel {
            Channel::Ch1 => Register::Ocal1B2,
            Channel::Ch2 => Register::Ocal2B2,
        };

        let mut buf = [0u8; 3];
        self.read_registers(start, &mut buf)?;
        Ok(byteorder::BigEndian::read_i24(&buf))
    }

    /// 32-bit gain correction stored by the last gain calibration.
    pub fn gain_calibration(&mut self, channel: Channel) -> Result<u32> {
        let start = match channel {
            Channel::Ch1 => Register::Gcal1B3,
            Channel::Ch2 => Register::Gcal2B3,
        };

        let mut buf = [0u8; 4];
        self.read_registers(start, &mut buf)?;
        Ok(byteorder::BigEndian::read_u32(&buf))
    }

    pub fn set_sample_rate(&mut self, sps: SamplesPerSecond) -> Result<()> {
        self.update_field(Register::Ctrl2, Ctrl2Bits::Crs, 3, sps as _)
    }

    pub fn sample_rate(&mut self) -> Result<SamplesPerSecond> {
        let code = self.get_field(Register::Ctrl2, Ctrl2Bits::Crs, 3)?;
        SamplesPerSecond::try_from(code)
    }

    pub fn set_gain(&mut self, gain: Gain) -> Result<()> {
        self.update_field(Register::Ctrl1, Ctrl1Bits::Gain, 3, gain as _)
    }

    pub fn gain(&mut self) -> Result<Gain> {
        let code = self.get_field(Register::Ctrl1, Ctrl1Bits::Gain, 3)?;
        Gain::try_from(code)
    }

    /// Sets the LDO voltage and switches AVDD to the internal LDO.
    pub fn set_ldo(&mut self, ldo: Ldo) -> Result<()> {
        self.update_field(Register::Ctrl1, Ctrl1Bits::Vldo, 3, ldo as _)?;

        self.set_bit(Register::PuCtrl, PuCtrlBits::AVDDS)
    }

    pub fn ldo(&mut self) -> Result<Ldo> {
        let code = self.get_field(Register::Ctrl1, Ctrl1Bits::Vldo, 3)?;
        Ldo::try_from(code)
    }

    pub fn set_channel(&mut self, channel: Channel) -> Result<()> {
        match channel {
            Channel::Ch1 => self.clear_bit(Register::Ctrl2, Ctrl2Bits::Chs),
            Channel::Ch2 => self.set_bit(Register::Ctrl2, Ctrl2Bits::Chs),
        }
    }

    pub fn channel(&mut self) -> Result<Channel> {
        match self.get_bit(Register::Ctrl2, Ctrl2Bits::Chs)? {
            false => Ok(Channel::Ch1),
            true => Ok(Channel::Ch2),
        }
    }

    /// DRDY pin is high while a conversion is ready. Power-on default.
    pub fn set_int_polarity_high(&mut self) -> Result<()> {
        self.clear_bit(Register::Ctrl1, Ctrl1Bits::Crp)
    }

    /// DRDY pin is low while a conversion is ready.
    pub fn set_int_polarity_low(&mut self) -> Result<()> {
        self.set_bit(Register::Ctrl1, Ctrl1Bits::Crp)
    }

    pub fn int_polarity(&mut self) -> Result<IntPolarity> {
        match self.get_bit(Register::Ctrl1, Ctrl1Bits::Crp)? {
            false => Ok(IntPolarity::ActiveHigh),
            true => Ok(IntPolarity::ActiveLow),
        }
    }

    /// Powers up the digital and analog sections and waits for PUR.
    pub fn power_up<W: DelayNs>(&mut self, wait: &mut W) -> Result<()> {
        self.set_bit(Register::PuCtrl, PuCtrlBits::PUD)?;
        self.set_bit(Register::PuCtrl, PuCtrlBits::PUA)?;

        for _ in 0..Self::POWER_UP_ATTEMPTS {
            if self.get_bit(Register::PuCtrl, PuCtrlBits::PUR)? {
                return Ok(());
            }
            wait.delay_ms(1);
        }

        warn!("nau7802: power-up ready bit never set");
        Err(Error::PowerUpTimeout)
    }

    /// Drops the chip into its low-power standby mode.
    pub fn power_down(&mut self) -> Result<()> {
        self.clear_bit(Register::PuCtrl, PuCtrlBits::PUD)?;
        self.clear_bit(Register::PuCtrl, PuCtrlBits::PUA)
    }

    /// Pulses RR, returning every register to its power-on default.
    pub fn reset<W: DelayNs>(&mut self, wait: &mut W) -> Result<()> {
        self.start_reset()?;
        wait.delay_ms(1);
        self.finish_reset()
    }

    pub fn start_reset(&mut self) -> Result<()> {
        self.set_bit(Register::PuCtrl, PuCtrlBits::RR)
    }

    pub fn finish_reset(&mut self) -> Result<()> {
        self.clear_bit(Register::PuCtrl, PuCtrlBits::RR)
    }

    /// Always 0x0F on production parts.
    pub fn revision_code(&mut self) -> Result<u8> {
        Ok(self.get_register(Register::DeviceRev)? & 0x0F)
    }

    pub fn misc_init(&mut self) -> Result<()> {
        const TURN_OFF_CLK_CHPL: u8 = 0x30;

        // Turn off CLK_CHP. From 9.1 power on sequencing
        self.set_register(Register::Adc, TURN_OFF_CLK_CHPL)?;

        // Enable 330pF decoupling cap on chan 2. From 9.14 application circuit note
        self.set_bit(Register::PgaPwr, PgaPwrBits::CapEn)
    }

    /// Replaces the `width`-bit field starting at `start_bit`, leaving the
    /// rest of the register untouched.
    fn update_field<B: RegisterBits>(
        &mut self,
        reg: Register,
        start_bit: B,
        width: u8,
        new_val: u8,
    ) -> Result<()> {
        let start_idx = start_bit.get();
        let field = ((1u8 << width) - 1) << start_idx;

        if new_val >> width != 0 {
            warn!("nau7802: code {} does not fit its field", new_val);
            return Err(Error::InvalidArgument);
        }

        let mut val = self.get_register(reg)?;
        val &= !field;
        val |= new_val << start_idx;

        self.set_register(reg, val)
    }

    fn get_field<B: RegisterBits>(&mut self, reg: Register, start_bit: B, width: u8) -> Result<u8> {
        let val = self.get_register(reg)?;
        Ok((val >> start_bit.get()) & ((1u8 << width) - 1))
    }

    pub fn set_bit<B: RegisterBits>(&mut self, addr: Register, bit_idx: B) -> Result<()> {
        let mask = bit_mask(bit_idx)?;
        let mut val = self.get_register(addr)?;
        val |= mask;
        self.set_register(addr, val)
    }

    pub fn clear_bit<B: RegisterBits>(&mut self, addr: Register, bit_idx: B) -> Result<()> {
        let mask = bit_mask(bit_idx)?;
        let mut val = self.get_register(addr)?;
        val &= !mask;
        self.set_register(addr, val)
    }

    pub fn get_bit<B: RegisterBits>(&mut self, addr: Register, bit_idx: B) -> Result<bool> {
        let mask = bit_mask(bit_idx)?;
        let val = self.get_register(addr)?;
        Ok(val & mask != 0)
    }

    pub fn set_register(&mut self, reg: Register, val: u8) -> Result<()> {
        let transaction = [reg as _, val];

        self.i2c_dev
            .write(Self::DEVICE_ADDRESS, &transaction)
            .map_err(|_| Error::I2cError)
    }

    pub fn get_register(&mut self, reg: Register) -> Result<u8> {
        let mut val = [0u8];
        self.read_registers(reg, &mut val)?;
        Ok(val[0])
    }

    /// Burst read relying on the chip's register address auto-increment.
    fn read_registers(&mut self, start: Register, buf: &mut [u8]) -> Result<()> {
        self.i2c_dev
            .write_read(Self::DEVICE_ADDRESS, &[start as u8], buf)
            .map_err(|_| Error::I2cError)
    }
}

fn bit_mask<B: RegisterBits>(bit_idx: B) -> Result<u8> {
    match bit_idx.get() {
        idx @ 0..=7 => Ok(1 << idx),
        _ => Err(Error::InvalidArgument),
    }
}
