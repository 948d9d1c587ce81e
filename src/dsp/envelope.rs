use super::fixed::{Audio, Phase};

/*
Attack/decay envelope
=====================

A three-state machine over a Q24 phase:

    Waiting --start()--> Rising --(phase == 1, !hold)--> Falling
       ^                    |                               |
       |                    | stop() while holding          |
       |                    +-------------------------------+
       +--------------- (phase == 0) -----------------------+

`process()` returns the CURRENT phase as Q14 audio and then advances it, so
a 100-tick attack reads 0, 1/100, 2/100, ... The phase clamps at the 0/1
boundary before the state transition, which keeps the output inside [0, 1]
for any speed setting.

Speed controls come in two flavors. The normalized setters take a 0..1
control value and run it through the cubic response x' = 1 - (1-x)^3 before
interpolating the per-tick delta between a one-second sweep and an almost
instantaneous one; the cubic gives the encoder perceptually even travel.
The tick setters take an exact duration for callers that already know it.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Waiting,
    Rising,
    Falling,
}

#[derive(Debug, Clone)]
pub struct AdEnv {
    phase: Phase,
    attack_delta: Phase,
    decay_delta: Phase,
    state: EnvelopeState,
    hold: bool,
    slow_delta: Phase, // one-second sweep
    fast_delta: Phase, // one-millisecond sweep
}

impl AdEnv {
    pub fn new(sample_rate: u32) -> Self {
        let sample_rate = sample_rate.max(1);
        let slow_delta = Phase::from_bits(((1i64 << 24) / sample_rate as i64).max(1) as i32);
        let fast_delta = Phase::from_bits(((1i64 << 24) / (sample_rate as i64 / 1000).max(1)) as i32);
        Self {
            phase: Phase::ZERO,
            attack_delta: slow_delta,
            decay_delta: slow_delta,
            state: EnvelopeState::Waiting,
            hold: false,
            slow_delta,
            fast_delta,
        }
    }

    pub fn start(&mut self) {
        self.state = EnvelopeState::Rising;
    }

    /// Only meaningful while holding at the top of the attack.
    pub fn stop(&mut self) {
        if self.state == EnvelopeState::Rising && self.hold {
            self.state = EnvelopeState::Falling;
        }
    }

    pub fn set_hold(&mut self, hold: bool) {
        self.hold = hold;
    }

    /// Normalized 0..1 speed; 1 is the fastest attack.
    pub fn set_attack(&mut self, control: Audio) {
        self.attack_delta = self.curved_delta(control);
    }

    /// Normalized 0..1 speed; 1 is the fastest decay.
    pub fn set_decay(&mut self, control: Audio) {
        self.decay_delta = self.curved_delta(control);
    }

    /// Exact attack duration in ticks (minimum 1).
    pub fn set_attack_ticks(&mut self, ticks: u32) {
        self.attack_delta = Phase::from_bits(((1i64 << 24) / ticks.max(1) as i64) as i32);
    }

    /// Exact decay duration in ticks (minimum 1).
    pub fn set_decay_ticks(&mut self, ticks: u32) {
        self.decay_delta = Phase::from_bits(((1i64 << 24) / ticks.max(1) as i64) as i32);
    }

    // x' = 1 - (1-x)^3, then lerp between the slow and fast deltas.
    fn curved_delta(&self, control: Audio) -> Phase {
        let x = control.clamp(Audio::ZERO, Audio::ONE);
        let inv = Audio::ONE - x;
        let curved = Audio::ONE - inv * inv * inv;
        let span = self.fast_delta - self.slow_delta;
        let scale: Phase = curved.rescale();
        self.slow_delta + Phase::from_bits(((span.to_bits() as i64 * scale.to_bits() as i64) >> 24) as i32)
    }

    /// Current phase as Q14 audio, then advance by the active delta.
    pub fn process(&mut self) -> Audio {
        let out: Audio = self.phase.rescale();
        match self.state {
            EnvelopeState::Rising => {
                self.phase += self.attack_delta;
                if self.phase >= Phase::ONE {
                    self.phase = Phase::ONE;
                    if !self.hold {
                        self.state = EnvelopeState::Falling;
                    }
                }
            }
            EnvelopeState::Falling => {
                self.phase -= self.decay_delta;
                if self.phase <= Phase::ZERO {
                    self.phase = Phase::ZERO;
                    self.state = EnvelopeState::Waiting;
                }
            }
            EnvelopeState::Waiting => {}
        }
        out
    }

    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Waiting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 40_000;

    #[test]
    fn output_stays_in_unit_range_and_is_monotonic_per_state() {
        let mut env = AdEnv::new(SR);
        env.set_attack(Audio::from_f32(0.9));
        env.set_decay(Audio::from_f32(0.3));
        env.start();
        let mut last = Audio::ZERO;
        let mut last_state = env.state();
        for _ in 0..SR {
            let state = env.state();
            let out = env.process();
            assert!(out >= Audio::ZERO && out <= Audio::ONE, "{out:?}");
            if state == last_state {
                match state {
                    EnvelopeState::Rising => assert!(out >= last),
                    EnvelopeState::Falling => assert!(out <= last),
                    EnvelopeState::Waiting => assert_eq!(out, Audio::ZERO),
                }
            }
            last = out;
            last_state = state;
        }
        assert_eq!(env.state(), EnvelopeState::Waiting);
    }

    #[test]
    fn hundred_tick_rise_fifty_tick_fall() {
        let mut env = AdEnv::new(SR);
        env.set_attack_ticks(100);
        env.set_decay_ticks(50);
        env.start();
        for tick in 0..100u32 {
            let out = env.process().to_f32();
            let expected = tick as f32 / 100.0;
            assert!((out - expected).abs() < 0.02, "tick {tick}: {out} vs {expected}");
        }
        for tick in 100..152u32 {
            let out = env.process().to_f32();
            let expected = (1.0 - (tick - 100) as f32 / 50.0).max(0.0);
            assert!((out - expected).abs() < 0.03, "tick {tick}: {out} vs {expected}");
        }
        for _ in 152..200 {
            assert_eq!(env.process(), Audio::ZERO);
        }
        assert_eq!(env.state(), EnvelopeState::Waiting);
    }

    #[test]
    fn hold_pins_the_peak_until_stop() {
        let mut env = AdEnv::new(SR);
        env.set_hold(true);
        env.set_attack_ticks(10);
        env.set_decay_ticks(10);
        env.start();
        for _ in 0..50 {
            env.process();
        }
        assert_eq!(env.state(), EnvelopeState::Rising);
        assert!((env.process().to_f32() - 1.0).abs() < 0.01);
        env.stop();
        assert_eq!(env.state(), EnvelopeState::Falling);
        for _ in 0..20 {
            env.process();
        }
        assert_eq!(env.state(), EnvelopeState::Waiting);
    }

    #[test]
    fn stop_without_hold_is_a_no_op() {
        let mut env = AdEnv::new(SR);
        env.set_attack_ticks(100);
        env.start();
        env.process();
        env.stop();
        assert_eq!(env.state(), EnvelopeState::Rising);
    }

    #[test]
    fn faster_control_means_larger_delta() {
        let mut slow = AdEnv::new(SR);
        let mut fast = AdEnv::new(SR);
        slow.set_attack(Audio::from_f32(0.1));
        fast.set_attack(Audio::from_f32(0.9));
        slow.start();
        fast.start();
        for _ in 0..100 {
            slow.process();
            fast.process();
        }
        assert!(fast.process() > slow.process());
    }
}
