use crate::{Gain, Ldo, SamplesPerSecond};

/// Settings applied by [`Nau7802::begin_with_config`](crate::Nau7802::begin_with_config).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub ldo: Ldo,
    pub gain: Gain,
    pub sample_rate: SamplesPerSecond,
    /// Run a blocking AFE calibration as the last step of `begin`.
    pub calibrate: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ldo: Ldo::L3v3,
            gain: Gain::G128,
            sample_rate: SamplesPerSecond::SPS80,
            calibrate: true,
        }
    }
}

impl Config {
    pub fn with_ldo(mut self, ldo: Ldo) -> Self {
        self.ldo = ldo;
        self
    }

    pub fn with_gain(mut self, gain: Gain) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: SamplesPerSecond) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_calibration(mut self, calibrate: bool) -> Self {
        self.calibrate = calibrate;
        self
    }
}
