use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;

use crate::io::sampler::AnalogSource;
use crate::NUM_CHANNELS;

/// 12-bit conversion ceiling, matching the sampling front end.
const ADC_MAX: u16 = 0x0FFF;

/// Shared front-panel state for the simulator: per-channel CV levels and
/// gate lines, written by the UI thread and read by the sampling thread.
///
/// Cloning is cheap and shares the same storage.
#[derive(Clone, Default)]
pub struct SharedInputs {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    cv: [AtomicU16; NUM_CHANNELS],
    gates: [AtomicBool; NUM_CHANNELS],
}

impl SharedInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_cv(&self, channel: usize, raw: u16) {
        if let Some(slot) = self.inner.cv.get(channel) {
            slot.store(raw.min(ADC_MAX), Ordering::Relaxed);
        }
    }

    pub fn cv(&self, channel: usize) -> u16 {
        self.inner
            .cv
            .get(channel)
            .map_or(0, |slot| slot.load(Ordering::Relaxed))
    }

    /// Nudge a channel's CV by signed detents of 1/64 full scale.
    pub fn nudge_cv(&self, channel: usize, detents: i32) {
        let step = (ADC_MAX as i32) / 64;
        let next = (self.cv(channel) as i32 + detents * step).clamp(0, ADC_MAX as i32);
        self.set_cv(channel, next as u16);
    }

    pub fn set_gate(&self, channel: usize, level: bool) {
        if let Some(slot) = self.inner.gates.get(channel) {
            slot.store(level, Ordering::Relaxed);
        }
    }

    pub fn gate(&self, channel: usize) -> bool {
        self.inner
            .gates
            .get(channel)
            .is_some_and(|slot| slot.load(Ordering::Relaxed))
    }

    pub fn toggle_gate(&self, channel: usize) {
        self.set_gate(channel, !self.gate(channel));
    }
}

impl AnalogSource for SharedInputs {
    fn read(&mut self, channel: usize) -> u16 {
        self.cv(channel)
    }
}
