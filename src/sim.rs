//! Register-file model of the NAU7802 used by the unit tests.

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

const PUD: u8 = 1 << 1;
const PUA: u8 = 1 << 2;
const PUR: u8 = 1 << 3;
const RR: u8 = 1 << 0;
const CALS: u8 = 1 << 2;
const CAL_ERR: u8 = 1 << 3;

pub struct SimulatedNau7802 {
    pub regs: [u8; 32],
    pub present: bool,
    /// PUR follows PUD and PUA when set, otherwise it never rises.
    pub power_up_ready: bool,
    /// Number of CTRL2 reads after CALS is set before it clears; `None` hangs.
    pub calibration_polls: Option<usize>,
    pub calibration_error: bool,
    pub bytes_written: usize,
    calibrating: bool,
    remaining_polls: usize,
    pointer: u8,
}

impl SimulatedNau7802 {
    pub fn new() -> Self {
        let mut sim = Self {
            regs: [0; 32],
            present: true,
            power_up_ready: true,
            calibration_polls: Some(3),
            calibration_error: false,
            bytes_written: 0,
            calibrating: false,
            remaining_polls: 0,
            pointer: 0,
        };
        sim.power_on_defaults();
        sim
    }

    pub fn absent() -> Self {
        Self {
            present: false,
            ..Self::new()
        }
    }

    fn power_on_defaults(&mut self) {
        self.regs = [0; 32];
        self.regs[0x1F] = 0x0F;
        self.calibrating = false;
    }

    fn store(&mut self, addr: u8, val: u8) {
        self.bytes_written += 1;

        match addr {
            0x00 => {
                if val & RR != 0 {
                    self.power_on_defaults();
                }
                let mut val = val & !PUR;
                if self.power_up_ready && val & PUD != 0 && val & PUA != 0 {
                    val |= PUR;
                }
                self.regs[0x00] = val;
            }
            0x02 => {
                let mut val = (val & !CAL_ERR) | (self.regs[0x02] & CAL_ERR);
                if val & CALS != 0 && !self.calibrating {
                    self.calibrating = true;
                    self.remaining_polls = self.calibration_polls.unwrap_or(0);
                    val &= !CAL_ERR;
                }
                self.regs[0x02] = val;
            }
            addr => self.regs[addr as usize & 0x1F] = val,
        }
    }

    fn load(&mut self, addr: u8) -> u8 {
        if addr == 0x02 && self.calibrating && self.calibration_polls.is_some() {
            if self.remaining_polls == 0 {
                self.calibrating = false;
                self.regs[0x02] &= !CALS;
                if self.calibration_error {
                    self.regs[0x02] |= CAL_ERR;
                }
            } else {
                self.remaining_polls -= 1;
            }
        }

        self.regs[addr as usize & 0x1F]
    }
}

impl ErrorType for SimulatedNau7802 {
    type Error = ErrorKind;
}

impl I2c for SimulatedNau7802 {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if !self.present || address != 0x2A {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    let Some((&reg, data)) = bytes.split_first() else {
                        continue;
                    };
                    self.pointer = reg;
                    for &byte in data {
                        self.store(self.pointer, byte);
                        self.pointer = self.pointer.wrapping_add(1);
                    }
                }
                Operation::Read(buf) => {
                    for byte in buf.iter_mut() {
                        *byte = self.load(self.pointer);
                        self.pointer = self.pointer.wrapping_add(1);
                    }
                }
            }
        }

        Ok(())
    }
}
