use crate::dsp::{AdEnv, Audio};
use crate::io::ChannelIo;
use crate::params::{ParamEditor, Parameter};

use super::{Module, UiFrame};

const ATTACK: usize = 0;
const DECAY: usize = 1;
const HOLD: usize = 2;

/// Gate-driven attack/decay envelope generator.
///
/// The gate input starts the envelope on its rising edge and (when holding)
/// releases it on the falling edge. The envelope goes out both ways: as a
/// pitch-style CV on the V/oct pair and as a plain control signal on the
/// CV/audio pair.
pub struct Follower {
    env: AdEnv,
    params: [Parameter; 3],
    editor: ParamEditor,
}

impl Follower {
    pub fn new(sample_rate: u32) -> Self {
        let mut follower = Self {
            env: AdEnv::new(sample_rate),
            params: [
                Parameter::new("attack", 70, 0, 100, 1),
                Parameter::new("decay", 50, 0, 100, 1),
                Parameter::new("hold", 0, 0, 1, 1),
            ],
            editor: ParamEditor::new(),
        };
        follower.apply_params();
        follower
    }

    fn apply_params(&mut self) {
        self.env.set_attack(Self::norm(self.params[ATTACK].value()));
        self.env.set_decay(Self::norm(self.params[DECAY].value()));
        self.env.set_hold(self.params[HOLD].value() != 0);
    }

    fn norm(percent: i32) -> Audio {
        Audio::from_bits((percent * Audio::ONE.to_bits()) / 100)
    }
}

impl Module for Follower {
    fn name(&self) -> &'static str {
        "follower"
    }

    fn process(&mut self, io: &mut ChannelIo<'_>) {
        if io.gate.rising_edge() {
            self.env.start();
        }
        if io.gate.falling_edge() {
            self.env.stop();
        }
        let out = self.env.process();
        io.voct.set_cv(out);
        io.cv.set_audio(out);
    }

    fn update_display(&mut self, ui: &mut UiFrame<'_>) {
        self.editor
            .update(&mut self.params, ui.controls.delta, ui.controls.enc_pressed);
        let mut dirty = false;
        for param in &mut self.params {
            dirty |= param.has_changed();
        }
        if dirty {
            self.apply_params();
        }

        ui.surface.draw_str(0, 0, self.name());
        for (i, param) in self.params.iter().enumerate() {
            let marker = if self.editor.selected() == i { '>' } else { ' ' };
            let line = format!("{marker}{}: {}", param.name(), param.value());
            ui.surface.draw_str(0, 1 + i as u16, &line);
        }
    }

    fn params(&self) -> &[Parameter] {
        &self.params
    }
}
