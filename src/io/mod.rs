//! Hardware-context types: analog input slots, gate edge latches,
//! calibrated outputs, the encoder gesture machine, and the cross-context
//! sample mailbox.
//!
//! `HwIo` is an explicit handle constructed once and threaded into the
//! engine and each module invocation; there is no process-wide hardware
//! singleton.

pub mod encoder;
pub mod mailbox;
pub mod output;
pub mod sampler;
pub mod surface;

use crate::dsp::{Audio, GateTrigger};
use crate::NUM_CHANNELS;

use self::output::{AnalogOut, Calibration};

/// Per-channel IO state shared by every module: latest smoothed analog
/// readings, gate edge latches, and the two calibrated output pairs.
pub struct HwIo {
    pub analog_in: [Audio; NUM_CHANNELS],
    gate_level: [bool; NUM_CHANNELS],
    pub gate_in: [GateTrigger; NUM_CHANNELS],
    pub voct_out: [AnalogOut; NUM_CHANNELS],
    pub cv_out: [AnalogOut; NUM_CHANNELS],
}

impl HwIo {
    pub fn new(pwm_steps: u16, voct: Calibration, cv: Calibration) -> Self {
        Self {
            analog_in: [Audio::ZERO; NUM_CHANNELS],
            gate_level: [false; NUM_CHANNELS],
            gate_in: std::array::from_fn(|_| GateTrigger::new()),
            voct_out: std::array::from_fn(|_| AnalogOut::new(pwm_steps, voct)),
            cv_out: std::array::from_fn(|_| AnalogOut::new(pwm_steps, cv)),
        }
    }

    /// Latch the raw gate line level; edges are detected at the next
    /// control update.
    pub fn set_gate(&mut self, channel: usize, level: bool) {
        if let Some(slot) = self.gate_level.get_mut(channel) {
            *slot = level;
        }
    }

    pub fn gate_level(&self, channel: usize) -> bool {
        self.gate_level.get(channel).copied().unwrap_or(false)
    }

    /// One control update: fold current line levels into the edge latches.
    pub fn update_gates(&mut self) {
        for (trigger, level) in self.gate_in.iter_mut().zip(self.gate_level) {
            trigger.update(level);
        }
    }
}

/// One channel's slice of the hardware context, handed to a module's
/// `process` for the duration of a tick.
pub struct ChannelIo<'a> {
    pub analog_in: Audio,
    pub gate: &'a mut GateTrigger,
    pub voct: &'a mut AnalogOut,
    pub cv: &'a mut AnalogOut,
}
