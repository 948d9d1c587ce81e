use super::fixed::Audio;
use super::tables;

/*
Phase accumulator oscillators
=============================

A `Phasor` is a u32 counter that advances by `delta` every tick. The full
u32 range represents one cycle, so the counter overflowing IS the modulo-1
wrap: no branch, no division. Frequency maps to a delta through

    delta = (u32::MAX / sample_rate) * freq_hz

so a 1 Hz phasor takes exactly one second of ticks to wrap. Every waveform
here is a cheap remap of the raw phase; none of them touch a float or the
heap on the tick path.
*/

#[derive(Debug, Clone)]
pub struct Phasor {
    phase: u32,
    delta: u32,
    sample_delta: u32, // delta per Hz at the configured tick rate
}

impl Phasor {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            phase: 0,
            delta: 0,
            sample_delta: u32::MAX / sample_rate.max(1),
        }
    }

    pub fn with_freq(sample_rate: u32, freq: Audio) -> Self {
        let mut p = Self::new(sample_rate);
        p.set_freq(freq);
        p
    }

    /// Frequency in Hz (Q14). Negative frequencies are treated as zero.
    pub fn set_freq(&mut self, freq: Audio) {
        let bits = freq.to_bits().max(0) as u64;
        self.delta = ((self.sample_delta as u64 * bits) >> 14) as u32;
    }

    /// Retime so one cycle spans exactly `ticks` samples.
    pub fn set_period_ticks(&mut self, ticks: u32) {
        self.delta = u32::MAX / ticks.max(1);
    }

    /// Force phase back to the start of the cycle (retrigger).
    pub fn reset(&mut self) {
        self.phase = 0;
    }

    /// Returns the current phase, then advances. Wraparound of the u32 is
    /// the modulo-1 arithmetic.
    #[inline]
    pub fn process(&mut self) -> u32 {
        let p = self.phase;
        self.phase = self.phase.wrapping_add(self.delta);
        p
    }

    pub fn phase(&self) -> u32 {
        self.phase
    }

    pub fn delta(&self) -> u32 {
        self.delta
    }
}

/// Bipolar ramp: phase remapped to [-1, 1) in Q14.
#[derive(Debug, Clone)]
pub struct Saw {
    phasor: Phasor,
}

impl Saw {
    pub fn new(sample_rate: u32, freq: Audio) -> Self {
        Self {
            phasor: Phasor::with_freq(sample_rate, freq),
        }
    }

    pub fn set_freq(&mut self, freq: Audio) {
        self.phasor.set_freq(freq);
    }

    #[inline]
    pub fn process(&mut self) -> Audio {
        let phase = self.phasor.process();
        Audio::from_bits(((phase >> 17) as i32) - (1 << 14))
    }
}

/// High for the first half of the cycle, low for the second.
#[derive(Debug, Clone)]
pub struct Pulse {
    phasor: Phasor,
}

impl Pulse {
    pub fn new(sample_rate: u32, freq: Audio) -> Self {
        Self {
            phasor: Phasor::with_freq(sample_rate, freq),
        }
    }

    pub fn set_freq(&mut self, freq: Audio) {
        self.phasor.set_freq(freq);
    }

    #[inline]
    pub fn process(&mut self) -> Audio {
        if self.phasor.process() < 0x8000_0000 {
            Audio::ONE
        } else {
            -Audio::ONE
        }
    }
}

/// Phase folded into a triangle, one peak per cycle.
#[derive(Debug, Clone)]
pub struct Tri {
    phasor: Phasor,
}

impl Tri {
    pub fn new(sample_rate: u32, freq: Audio) -> Self {
        Self {
            phasor: Phasor::with_freq(sample_rate, freq),
        }
    }

    pub fn set_freq(&mut self, freq: Audio) {
        self.phasor.set_freq(freq);
    }

    #[inline]
    pub fn process(&mut self) -> Audio {
        let phase = self.phasor.process() >> 16; // 0..65536
        let folded = if phase < 0x8000 {
            phase as i32
        } else {
            0xFFFF - phase as i32
        };
        Audio::from_bits(folded - (1 << 14))
    }
}

/// Table sine with linear interpolation.
#[derive(Debug, Clone)]
pub struct Sine {
    phasor: Phasor,
}

impl Sine {
    pub fn new(sample_rate: u32, freq: Audio) -> Self {
        Self {
            phasor: Phasor::with_freq(sample_rate, freq),
        }
    }

    pub fn set_freq(&mut self, freq: Audio) {
        self.phasor.set_freq(freq);
    }

    #[inline]
    pub fn process(&mut self) -> Audio {
        tables::sin_phase(self.phasor.process())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 40_000;

    #[test]
    fn phasor_returns_to_start_after_one_period() {
        let mut p = Phasor::new(SR);
        let period = 480u32;
        p.set_period_ticks(period);
        let start = p.phase();
        for _ in 0..period {
            p.process();
        }
        let distance = p.phase().wrapping_sub(start);
        // Within one delta of the starting phase (integer division slack).
        assert!(
            distance <= p.delta() || distance >= 0u32.wrapping_sub(p.delta()),
            "phase drifted by {distance}"
        );
    }

    #[test]
    fn phasor_freq_scales_delta() {
        let mut p = Phasor::new(SR);
        p.set_freq(Audio::from_int(100));
        let d100 = p.delta();
        p.set_freq(Audio::from_int(200));
        let d200 = p.delta();
        assert!((d200 as i64 - 2 * d100 as i64).abs() <= 1);
    }

    #[test]
    fn saw_spans_bipolar_range() {
        let mut saw = Saw::new(SR, Audio::from_int(100));
        let mut min = Audio::ONE;
        let mut max = -Audio::ONE;
        for _ in 0..SR / 100 {
            let v = saw.process();
            min = min.min(v);
            max = max.max(v);
        }
        assert!(min.to_f32() < -0.95, "{min:?}");
        assert!(max.to_f32() > 0.95, "{max:?}");
    }

    #[test]
    fn pulse_is_high_for_first_half_cycle() {
        let period = 400; // 100 Hz at 40 kHz
        let mut pulse = Pulse::new(SR, Audio::from_int(100));
        let highs = (0..period)
            .filter(|_| pulse.process() == Audio::ONE)
            .count();
        assert!((highs as i64 - period as i64 / 2).abs() <= 1, "{highs}");
    }

    #[test]
    fn tri_peaks_mid_cycle() {
        let period = 400;
        let mut tri = Tri::new(SR, Audio::from_int(100));
        let samples: Vec<Audio> = (0..period).map(|_| tri.process()).collect();
        let peak_at = samples
            .iter()
            .enumerate()
            .max_by_key(|(_, v)| v.to_bits())
            .map(|(i, _)| i)
            .unwrap();
        assert!((peak_at as i64 - period as i64 / 2).abs() <= 4, "{peak_at}");
        assert!(samples[0].to_f32() < -0.95);
    }
}
