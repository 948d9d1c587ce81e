use crate::dsp::oscillator::Tri;
use crate::dsp::tables;
use crate::dsp::{Audio, SchmidtTrigger};
use crate::io::ChannelIo;
use crate::params::{ParamEditor, Parameter};

use super::{Module, UiFrame};

pub const MAX_STEPS: usize = 32;

/// Tone blip length on a gated step: 50 ms at the nominal tick rate.
const TONE_TICKS: u32 = 2_000;

const LENGTH: usize = 0;
const STEP: usize = 1;
const VALUE: usize = 2;

/// Semitone range of a step value: two octaves up from the V/oct zero.
const MAX_SEMITONES: i32 = 24;

/// Clocked step sequencer: up to 32 (value, gate) steps.
///
/// The read index advances on a rising gate edge or when the analog input
/// crosses the hysteresis threshold, whichever arrives. The current step's
/// value goes out as a semitone pitch CV on the V/oct pair; a gated step
/// also sounds a short triangle blip at the step's pitch on the CV pair.
pub struct StepSeq {
    values: [i32; MAX_STEPS],
    gates: [bool; MAX_STEPS],
    read_index: usize,
    schmidt: SchmidtTrigger,
    tone: Tri,
    tone_left: u32,
    params: [Parameter; 3],
    editor: ParamEditor,
}

impl StepSeq {
    pub fn new(sample_rate: u32) -> Self {
        let mut gates = [false; MAX_STEPS];
        // Gate every other step so a fresh channel makes itself heard.
        for (i, gate) in gates.iter_mut().enumerate() {
            *gate = i % 2 == 0;
        }
        Self {
            values: [0; MAX_STEPS],
            gates,
            read_index: 0,
            schmidt: SchmidtTrigger::new(Audio::from_f32(0.2), Audio::from_f32(0.6)),
            tone: Tri::new(sample_rate, Audio::ZERO),
            tone_left: 0,
            params: [
                Parameter::new("len", 8, 1, MAX_STEPS as i32, 1),
                Parameter::new("step", 0, 0, MAX_STEPS as i32 - 1, 1),
                Parameter::new("note", 0, 0, MAX_SEMITONES, 1),
            ],
            editor: ParamEditor::new(),
        }
    }

    fn len(&self) -> usize {
        self.params[LENGTH].value().max(1) as usize
    }

    fn semitone_cv(value: i32) -> Audio {
        Audio::from_bits((value * Audio::ONE.to_bits()) / 12)
    }

    pub fn read_index(&self) -> usize {
        self.read_index
    }
}

impl Module for StepSeq {
    fn name(&self) -> &'static str {
        "stepseq"
    }

    fn process(&mut self, io: &mut ChannelIo<'_>) {
        let clocked = io.gate.rising_edge() | self.schmidt.process(io.analog_in);
        if clocked {
            self.read_index = (self.read_index + 1) % self.len();
            if self.gates[self.read_index] {
                let cv = Self::semitone_cv(self.values[self.read_index]);
                self.tone.set_freq(tables::voct_to_freq(cv));
                self.tone_left = TONE_TICKS;
            }
        }

        io.voct.set_cv(Self::semitone_cv(self.values[self.read_index]));
        if self.tone_left > 0 {
            self.tone_left -= 1;
            io.cv.set_audio(self.tone.process());
        } else {
            io.cv.set_audio(Audio::ZERO);
        }
    }

    fn update_display(&mut self, ui: &mut UiFrame<'_>) {
        self.editor
            .update(&mut self.params, ui.controls.delta, ui.controls.enc_pressed);

        let edit_step = self.params[STEP].value() as usize % MAX_STEPS;
        if self.params[STEP].has_changed() {
            // Selection moved: load the step's stored note, and swallow the
            // change flag the load just raised.
            self.params[VALUE].set(self.values[edit_step]);
            self.params[VALUE].has_changed();
        }
        if self.params[VALUE].has_changed() {
            self.values[edit_step] = self.params[VALUE].value();
        }
        if self.params[LENGTH].has_changed() {
            self.read_index %= self.len();
        }
        if ui.controls.top_pressed {
            self.gates[edit_step] = !self.gates[edit_step];
        }

        ui.surface.draw_str(0, 0, self.name());
        let header = format!(
            "len {:2}  step {:2}{}",
            self.len(),
            edit_step,
            if self.gates[edit_step] { "*" } else { "" }
        );
        ui.surface.draw_str(0, 1, &header);
        let freq = tables::voct_to_freq(Self::semitone_cv(self.values[edit_step]));
        let note = format!("note {:2} ({:.0} Hz)", self.values[edit_step], freq.to_f32());
        ui.surface.draw_str(0, 2, &note);
        let playing = format!("at {:2}", self.read_index);
        ui.surface.draw_str(0, 3, &playing);
    }

    fn params(&self) -> &[Parameter] {
        &self.params
    }
}
