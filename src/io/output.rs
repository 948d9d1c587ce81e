#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::Audio;

/// Rail voltages for one output pair, determined by an external calibration
/// routine and consumed here only as scale/offset constants.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct Calibration {
    /// Maximum voltage the inverting (negative-rail) side can span.
    pub neg_max: f32,
    /// Maximum voltage the non-inverting (positive-rail) side can span.
    pub pos_max: f32,
}

// Divider networks behind the output pairs: 1k/1k for V/oct, 4k7/7k5 for
// CV, both driven from the 3.33 V supply.
const VIN: f32 = 3.33;

impl Calibration {
    pub fn voct() -> Self {
        let ratio = 1000.0 / 1000.0;
        Self {
            neg_max: VIN * ratio,
            pos_max: VIN * (ratio + 1.0),
        }
    }

    pub fn cv() -> Self {
        let ratio = 7500.0 / 4700.0;
        Self {
            neg_max: VIN * ratio,
            pos_max: VIN * (ratio + 1.0),
        }
    }
}

/// One calibrated PWM output pair: a scale pin and an offset pin whose duty
/// cycles combine into the panel voltage.
///
/// The two write modes mirror the two uses on the panel: `set_cv` places a
/// unipolar volts-scaled value (V/oct pitch CV, gates), `set_audio` centers
/// a bipolar signal across the rails.
#[derive(Debug, Clone)]
pub struct AnalogOut {
    res: u16,
    neg_max: Audio,
    inv_neg_max: Audio,
    inv_pos_max: Audio,
    half_pos_over_neg: Audio,
    duty: [u16; 2],
    last: Audio,
}

// FP_MUL of a duty-cycle count by a Q14 coefficient.
#[inline]
fn scale(res: u16, x: Audio) -> u16 {
    (((res as i32) * x.to_bits()) >> 14).clamp(0, res as i32) as u16
}

impl AnalogOut {
    pub fn new(resolution: u16, calibration: Calibration) -> Self {
        let neg_max = Audio::from_f32(calibration.neg_max);
        let pos_max = Audio::from_f32(calibration.pos_max);
        Self {
            res: resolution.max(1),
            neg_max,
            inv_neg_max: Audio::ONE / neg_max,
            inv_pos_max: Audio::ONE / pos_max,
            half_pos_over_neg: (pos_max >> 1) * (Audio::ONE / neg_max),
            duty: [0; 2],
            last: Audio::ZERO,
        }
    }

    /// Bipolar audio write: offset pin carries the signal centered at half
    /// scale, scale pin holds the midpoint bias.
    pub fn set_audio(&mut self, v: Audio) {
        let half = self.res >> 1;
        self.duty[0] = scale(self.res, self.half_pos_over_neg);
        self.duty[1] = (half as i32 + ((half as i32 * v.to_bits()) >> 14))
            .clamp(0, self.res as i32) as u16;
        self.last = v;
    }

    /// Unipolar volts write (Q14, 1.0 == 1 V). Values past the negative
    /// rail fold down by whole units, which keeps a V/oct pitch on-scale
    /// one octave down rather than slamming the rail.
    pub fn set_cv(&mut self, v: Audio) {
        let mut v = v;
        while v > self.neg_max {
            v -= Audio::ONE;
        }
        self.duty[0] = self.res - scale(self.res, v * self.inv_neg_max);
        self.duty[1] = scale(self.res, self.inv_pos_max * self.neg_max);
        self.last = v;
    }

    /// Current duty-cycle pair (scale pin, offset pin).
    pub fn duty(&self) -> [u16; 2] {
        self.duty
    }

    /// Last value written, for meters and tests.
    pub fn last(&self) -> Audio {
        self.last
    }
}
