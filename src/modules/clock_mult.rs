use crate::dsp::{Audio, ClockRateDetector, Phasor};
use crate::io::ChannelIo;
use crate::params::{ParamEditor, Parameter};

use super::{Module, UiFrame};

const MULT: usize = 0;

/// Output pulse width, clamped below to keep pulses distinct at high rates.
const PULSE_TICKS: u32 = 80;

/// Gate level for the pulse outputs.
const PULSE_LEVEL: Audio = Audio::from_int(3);

/// Clock multiplier: measures the incoming gate's tick interval and runs a
/// phasor at `mult` times that rate.
///
/// Each incoming edge retimes the phasor from the freshest interval and
/// snaps its phase to zero, so the multiplied train stays locked to the
/// source clock instead of drifting on stale tempo. The V/oct pair mirrors
/// the incoming gate; the CV pair carries the multiplied pulses.
pub struct ClockMult {
    detector: ClockRateDetector,
    phasor: Phasor,
    pulse_left: u32,
    sample_rate: u32,
    params: [Parameter; 1],
    editor: ParamEditor,
}

impl ClockMult {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            detector: ClockRateDetector::new(sample_rate),
            phasor: Phasor::new(sample_rate),
            pulse_left: 0,
            sample_rate,
            params: [Parameter::new("mult", 4, 1, 16, 1)],
            editor: ParamEditor::new(),
        }
    }

    fn period(&self) -> u32 {
        let mult = self.params[MULT].value().max(1) as u32;
        (self.detector.interval() / mult).max(1)
    }

    fn fire(&mut self) {
        self.pulse_left = PULSE_TICKS.min(self.period() / 2).max(1);
    }
}

impl Module for ClockMult {
    fn name(&self) -> &'static str {
        "clockmult"
    }

    fn process(&mut self, io: &mut ChannelIo<'_>) {
        let edge = io.gate.rising_edge();
        self.detector.process(edge);

        if edge {
            self.phasor.set_period_ticks(self.period());
            self.phasor.reset();
            self.phasor.process();
            self.fire();
        } else {
            let before = self.phasor.phase();
            self.phasor.process();
            if self.phasor.phase() < before {
                self.fire();
            }
        }

        io.voct
            .set_cv(if io.gate.state() { PULSE_LEVEL } else { Audio::ZERO });
        if self.pulse_left > 0 {
            self.pulse_left -= 1;
            io.cv.set_cv(PULSE_LEVEL);
        } else {
            io.cv.set_cv(Audio::ZERO);
        }
    }

    fn update_display(&mut self, ui: &mut UiFrame<'_>) {
        self.editor
            .update(&mut self.params, ui.controls.delta, ui.controls.enc_pressed);

        ui.surface.draw_str(0, 0, self.name());
        let line = format!("mult x{}", self.params[MULT].value());
        ui.surface.draw_str(0, 1, &line);
        let in_ms = self.detector.interval() as f32 * 1_000.0 / self.sample_rate as f32;
        let tempo = format!("in {in_ms:.1} ms");
        ui.surface.draw_str(0, 2, &tempo);
    }

    fn params(&self) -> &[Parameter] {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::GateTrigger;
    use crate::io::output::{AnalogOut, Calibration};

    const SR: u32 = 40_000;

    struct Bench {
        gate: GateTrigger,
        voct: AnalogOut,
        cv: AnalogOut,
    }

    impl Bench {
        fn new() -> Self {
            Self {
                gate: GateTrigger::new(),
                voct: AnalogOut::new(1024, Calibration::voct()),
                cv: AnalogOut::new(1024, Calibration::cv()),
            }
        }

        fn tick(&mut self, module: &mut ClockMult, gate_level: bool) -> Audio {
            self.gate.update(gate_level);
            let mut io = ChannelIo {
                analog_in: Audio::ZERO,
                gate: &mut self.gate,
                voct: &mut self.voct,
                cv: &mut self.cv,
            };
            module.process(&mut io);
            self.cv.last()
        }
    }

    /// Drives `interval`-spaced clock edges and records the ticks where the
    /// multiplied output rises.
    fn pulse_starts(module: &mut ClockMult, interval: u32, edges: u32) -> Vec<u32> {
        let mut bench = Bench::new();
        let mut starts = Vec::new();
        let mut prev = Audio::ZERO;
        let total = interval * edges;
        for tick in 0..total {
            let level = tick % interval < interval / 2;
            let out = bench.tick(module, level);
            if out > Audio::ZERO && prev == Audio::ZERO {
                starts.push(tick);
            }
            prev = out;
        }
        starts
    }

    #[test]
    fn multiplies_a_steady_clock_by_four() {
        let mut module = ClockMult::new(SR);
        let starts = pulse_starts(&mut module, 1_000, 4);

        // The stretch after the second edge runs at the measured rate.
        let settled: Vec<u32> = starts.iter().copied().filter(|&t| t >= 1_000).collect();
        assert!(settled.len() >= 8, "{settled:?}");
        for pair in settled.windows(2) {
            let gap = pair[1] - pair[0];
            assert!((gap as i64 - 250).abs() <= 1, "gap {gap} in {settled:?}");
        }
    }

    #[test]
    fn each_edge_resnaps_phase_to_zero() {
        let mut module = ClockMult::new(SR);
        let starts = pulse_starts(&mut module, 1_000, 4);
        // A multiplied pulse lands exactly on every incoming edge.
        for edge in [0, 1_000, 2_000, 3_000] {
            assert!(starts.contains(&edge), "no pulse at edge {edge}: {starts:?}");
        }
    }

    #[test]
    fn tempo_change_takes_effect_on_the_next_edge() {
        let mut module = ClockMult::new(SR);
        let mut bench = Bench::new();

        // Two edges 800 apart establish the interval.
        bench.tick(&mut module, true);
        bench.tick(&mut module, false);
        for _ in 0..798 {
            bench.tick(&mut module, false);
        }
        bench.tick(&mut module, true);
        assert_eq!(module.detector.interval(), 800);
        assert_eq!(module.period(), 200);
    }

    #[test]
    fn voct_pair_mirrors_the_incoming_gate() {
        let mut module = ClockMult::new(SR);
        let mut bench = Bench::new();
        bench.tick(&mut module, true);
        assert!(bench.voct.last() > Audio::ZERO);
        bench.tick(&mut module, false);
        assert_eq!(bench.voct.last(), Audio::ZERO);
    }
}
