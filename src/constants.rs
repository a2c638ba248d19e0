use crate::Error;

/// NAU7802 register map. Addresses 0x18..=0x1A and 0x1D..=0x1E are reserved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    PuCtrl = 0x00,
    Ctrl1,
    Ctrl2,
    Ocal1B2,
    Ocal1B1,
    Ocal1B0,
    Gcal1B3,
    Gcal1B2,
    Gcal1B1,
    Gcal1B0,
    Ocal2B2,
    Ocal2B1,
    Ocal2B0,
    Gcal2B3,
    Gcal2B2,
    Gcal2B1,
    Gcal2B0,
    I2CControl,
    AdcoB2,
    AdcoB1,
    AdcoB0,
    Adc = 0x15, //Shared ADC and OTP 32:24
    OtpB1,      //OTP 23:16 or 7:0?
    OtpB0,      //OTP 15:8
    Pga = 0x1B,
    PgaPwr = 0x1C,
    DeviceRev = 0x1F,
}

impl TryFrom<u8> for Register {
    type Error = Error;

    fn try_from(addr: u8) -> Result<Self, Error> {
        use Register::*;

        const MAP: [Register; 0x18] = [
            PuCtrl, Ctrl1, Ctrl2, Ocal1B2, Ocal1B1, Ocal1B0, Gcal1B3, Gcal1B2, Gcal1B1, Gcal1B0,
            Ocal2B2, Ocal2B1, Ocal2B0, Gcal2B3, Gcal2B2, Gcal2B1, Gcal2B0, I2CControl, AdcoB2,
            AdcoB1, AdcoB0, Adc, OtpB1, OtpB0,
        ];

        match addr {
            0x00..=0x17 => Ok(MAP[addr as usize]),
            0x1B => Ok(Pga),
            0x1C => Ok(PgaPwr),
            0x1F => Ok(DeviceRev),
            _ => Err(Error::InvalidArgument),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PuCtrlBits {
    RR = 0,
    PUD,
    PUA,
    PUR,
    CS,
    CR,
    OSCS,
    AVDDS,
}

/// CTRL1 layout. `Gain` and `Vldo` name the low bit of their 3-bit fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Ctrl1Bits {
    Gain = 0,
    Vldo = 3,
    DrdySel = 6,
    Crp = 7,
}

/// CTRL2 layout. `CalMod` is a 2-bit field, `Crs` a 3-bit field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Ctrl2Bits {
    CalMod = 0,
    Cals = 2,
    CalError = 3,
    Crs = 4,
    Chs = 7,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PgaBits {
    ChpDis = 0,
    Inv = 3,
    BypassEn,
    OutEn,
    LdoMode,
    RdOtpSel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PgaPwrBits {
    Curr = 0,
    AdcCurr = 2,
    MstrBiasCurr = 4,
    CapEn = 7,
}

/// A bit position inside one of the 8-bit registers.
pub trait RegisterBits {
    fn get(&self) -> u8;
}

macro_rules! impl_register_bits {
    ($($type:ident),*) => {
        $(
            impl RegisterBits for $type {
                fn get(&self) -> u8 {
                    *self as _
                }
            }
        )*
    }
}

impl_register_bits!(PuCtrlBits, Ctrl1Bits, Ctrl2Bits, PgaBits, PgaPwrBits);

/// Raw bit index; anything above 7 is rejected when the mask is built.
impl RegisterBits for u8 {
    fn get(&self) -> u8 {
        *self
    }
}

/// Generates `TryFrom<u8>` for a closed set of register codes.
macro_rules! impl_try_from_code {
    ($type:ident { $($variant:ident),* $(,)? }) => {
        impl TryFrom<u8> for $type {
            type Error = Error;

            fn try_from(code: u8) -> Result<Self, Error> {
                $(
                    if code == $type::$variant as u8 {
                        return Ok($type::$variant);
                    }
                )*
                Err(Error::InvalidArgument)
            }
        }
    };
}

/// Internal LDO output voltage (CTRL1 VLDO).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Ldo {
    L2v4 = 0b111,
    L2v7 = 0b110,
    L3v0 = 0b101,
    L3v3 = 0b100,
    L3v6 = 0b011,
    L3v9 = 0b010,
    L4v2 = 0b001,
    L4v5 = 0b000,
}

impl_try_from_code!(Ldo { L2v4, L2v7, L3v0, L3v3, L3v6, L3v9, L4v2, L4v5 });

/// PGA gain (CTRL1 GAINS).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Gain {
    G128 = 0b111,
    G64 = 0b110,
    G32 = 0b101,
    G16 = 0b100,
    G8 = 0b011,
    G4 = 0b010,
    G2 = 0b001,
    G1 = 0b000,
}

impl_try_from_code!(Gain { G128, G64, G32, G16, G8, G4, G2, G1 });

/// Conversion rate (CTRL2 CRS). Codes 0b100..=0b110 are not defined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SamplesPerSecond {
    SPS320 = 0b111,
    SPS80 = 0b011,
    SPS40 = 0b010,
    SPS20 = 0b001,
    SPS10 = 0b000,
}

impl_try_from_code!(SamplesPerSecond { SPS320, SPS80, SPS40, SPS20, SPS10 });

/// Analog input channel (CTRL2 CHS).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Channel {
    Ch1 = 0,
    Ch2 = 1,
}

impl_try_from_code!(Channel { Ch1, Ch2 });

/// Calibration selected by CTRL2 CALMOD. 0b01 is reserved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CalibrationMode {
    Internal = 0b00,
    Offset = 0b10,
    Gain = 0b11,
}

impl_try_from_code!(CalibrationMode { Internal, Offset, Gain });

/// Active level of the DRDY pin (CTRL1 CRP).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum IntPolarity {
    ActiveHigh = 0,
    ActiveLow = 1,
}

impl_try_from_code!(IntPolarity { ActiveHigh, ActiveLow });

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AfeCalibrationStatus {
    InProgress,
    Failure,
    Success,
}
