//! The tick engine: owns the hardware context and the three channel
//! modules, and is driven from two sides. The audio context calls `tick`
//! once per sample; the UI context calls `update_ui` once per refresh.
//! Callers serialize the two through whatever lock wraps the engine, which
//! is also what makes a module hot-swap safe: the swap happens under the
//! same exclusion as `tick`, and the retired instance drops on the UI side.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::info;

use crate::dsp::tables;
use crate::io::encoder::ControlFrame;
use crate::io::mailbox::SampleRx;
use crate::io::output::Calibration;
use crate::io::surface::Surface;
use crate::io::{ChannelIo, HwIo};
use crate::modules::{Module, ModuleKind, UiFrame};
use crate::{NUM_CHANNELS, SAMPLE_RATE, UI_REFRESH_HZ};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub sample_rate: u32,
    pub ui_refresh_hz: u32,
    /// Capacity of the sampling-to-audio hand-off ring.
    pub mailbox_capacity: usize,
    /// Duty-cycle resolution of the output pairs.
    pub pwm_steps: u16,
    pub voct: Calibration,
    pub cv: Calibration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            ui_refresh_hz: UI_REFRESH_HZ,
            mailbox_capacity: 16,
            pwm_steps: 1024,
            voct: Calibration::voct(),
            cv: Calibration::cv(),
        }
    }
}

pub struct Engine {
    config: EngineConfig,
    hw: HwIo,
    slots: [Box<dyn Module>; NUM_CHANNELS],
    kinds: [ModuleKind; NUM_CHANNELS],
    rx: SampleRx,
}

impl Engine {
    pub fn new(config: EngineConfig, rx: SampleRx) -> Self {
        // Pay the table-fill cost here, not on the first tick.
        tables::warm();
        let kinds = [ModuleKind::Follower; NUM_CHANNELS];
        Self {
            hw: HwIo::new(config.pwm_steps, config.voct, config.cv),
            slots: std::array::from_fn(|i| kinds[i].build(config.sample_rate)),
            kinds,
            config,
            rx,
        }
    }

    /// One audio tick: fold in pending analog readings, latch gate edges,
    /// then run each channel's module against its slice of the hardware.
    pub fn tick(&mut self) {
        let Engine { hw, slots, rx, .. } = self;
        rx.drain_into(&mut hw.analog_in);
        hw.update_gates();
        for (channel, module) in slots.iter_mut().enumerate() {
            let mut io = ChannelIo {
                analog_in: hw.analog_in[channel],
                gate: &mut hw.gate_in[channel],
                voct: &mut hw.voct_out[channel],
                cv: &mut hw.cv_out[channel],
            };
            module.process(&mut io);
        }
    }

    /// One UI refresh: a long press cycles the channel to the next module
    /// kind; otherwise the channel's module edits and draws.
    pub fn update_ui(&mut self, frames: &[ControlFrame; NUM_CHANNELS], surface: &mut dyn Surface) {
        for (channel, frame) in frames.iter().enumerate() {
            if frame.long_press {
                self.load_module(channel, self.kinds[channel].next());
                continue;
            }
            surface.begin_channel(channel);
            let mut ui = UiFrame {
                surface: &mut *surface,
                controls: *frame,
            };
            self.slots[channel].update_display(&mut ui);
        }
    }

    /// Replace a channel's module with a fresh instance of `kind`. The
    /// outgoing instance drops here, on the caller's context.
    pub fn load_module(&mut self, channel: usize, kind: ModuleKind) {
        info!(channel, ?kind, "channel module swapped");
        self.kinds[channel] = kind;
        self.slots[channel] = kind.build(self.config.sample_rate);
    }

    pub fn set_gate(&mut self, channel: usize, level: bool) {
        self.hw.set_gate(channel, level);
    }

    pub fn module(&self, channel: usize) -> &dyn Module {
        &*self.slots[channel]
    }

    pub fn kind(&self, channel: usize) -> ModuleKind {
        self.kinds[channel]
    }

    pub fn hw(&self) -> &HwIo {
        &self.hw
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::Audio;
    use crate::io::mailbox::{sample_channel, Sample, SampleTx};
    use crate::io::surface::NullSurface;

    fn engine() -> (Engine, SampleTx) {
        let config = EngineConfig::default();
        let (tx, rx) = sample_channel(config.mailbox_capacity);
        (Engine::new(config, rx), tx)
    }

    #[test]
    fn tick_folds_mailbox_readings_into_the_channels() {
        let (mut engine, mut tx) = engine();
        tx.offer(Sample {
            channel: 2,
            value: Audio::from_f32(0.5),
        });
        engine.tick();
        assert_eq!(engine.hw().analog_in[2], Audio::from_f32(0.5));
        assert_eq!(engine.hw().analog_in[0], Audio::ZERO);
    }

    #[test]
    fn gate_drives_the_default_follower() {
        let (mut engine, _tx) = engine();
        engine.set_gate(0, true);
        // Stay inside the attack ramp so the output is mid-rise.
        for _ in 0..30 {
            engine.tick();
        }
        assert!(engine.hw().cv_out[0].last() > Audio::ZERO);
        // The other channels saw no gate and stay quiet.
        assert_eq!(engine.hw().cv_out[1].last(), Audio::ZERO);
    }

    #[test]
    fn long_press_cycles_the_channel_module() {
        let (mut engine, _tx) = engine();
        assert_eq!(engine.kind(1), ModuleKind::Follower);

        let mut frames = [ControlFrame::default(); NUM_CHANNELS];
        frames[1].long_press = true;
        let mut surface = NullSurface;
        engine.update_ui(&frames, &mut surface);

        assert_eq!(engine.kind(1), ModuleKind::StepSeq);
        assert_eq!(engine.module(1).name(), "stepseq");
        assert_eq!(engine.kind(0), ModuleKind::Follower);
    }

    #[test]
    fn swap_hands_the_channel_a_fresh_instance() {
        let (mut engine, _tx) = engine();
        engine.set_gate(2, true);
        for _ in 0..30 {
            engine.tick();
        }
        let before = engine.hw().cv_out[2].last();
        assert!(before > Audio::ZERO);

        engine.load_module(2, ModuleKind::Follower);
        engine.set_gate(2, false);
        engine.tick();
        // Fresh envelope, no residue from the retired instance.
        assert_eq!(engine.hw().cv_out[2].last(), Audio::ZERO);
    }
}
