use once_cell::sync::Lazy;

use super::fixed::Audio;

/// Entries in the full-cycle sine table.
pub const SIN_LEN: usize = 1024;

/// Entries in the one-octave exponential table.
pub const EXP2_LEN: usize = 256;

/// V/oct reference: 0 V maps to C4.
const C4_HZ: f32 = 261.63;

// Q14 sine over one full cycle. Peak value 16384 fits an i16.
static SIN_LUT: Lazy<[i16; SIN_LEN]> = Lazy::new(|| {
    let mut table = [0i16; SIN_LEN];
    for (i, entry) in table.iter_mut().enumerate() {
        let x = i as f32 / SIN_LEN as f32 * std::f32::consts::TAU;
        *entry = (x.sin() * (1 << 14) as f32) as i16;
    }
    table
});

// Q14 values of 2^(i/256) - 1 over one octave, so entries stay in 0..=16384.
static EXP2_LUT: Lazy<[i16; EXP2_LEN]> = Lazy::new(|| {
    let mut table = [0i16; EXP2_LEN];
    for (i, entry) in table.iter_mut().enumerate() {
        let x = i as f32 / EXP2_LEN as f32;
        *entry = ((x.exp2() - 1.0) * (1 << 14) as f32) as i16;
    }
    table
});

/// Force both tables to build. Called once before any DSP runs so the first
/// audio tick never pays the construction cost.
pub fn warm() {
    Lazy::force(&SIN_LUT);
    Lazy::force(&EXP2_LUT);
}

/// Sine of a wrapping phase accumulator value, linearly interpolated between
/// table entries. Top 10 bits index the table, the next 14 interpolate.
#[inline]
pub fn sin_phase(phase: u32) -> Audio {
    let idx = (phase >> 22) as usize;
    let next = (idx + 1) & (SIN_LEN - 1);
    let frac = ((phase >> 8) & 0x3FFF) as i32;
    let a = SIN_LUT[idx] as i32;
    let b = SIN_LUT[next] as i32;
    Audio::from_bits(a + (((b - a) * frac) >> 14))
}

/// 2^x for a Q14 argument in octaves. The table covers the fractional
/// octave; whole octaves are an integer shift:
/// `2^(whole + frac) = (1 + table[frac]) << whole`.
pub fn exp2(x: Audio) -> Audio {
    let bits = x.to_bits();
    let whole = bits >> 14;
    let frac = (bits & 0x3FFF) as usize;
    let idx = frac >> 6;
    let lerp = (frac & 0x3F) as i32;
    let a = EXP2_LUT[idx] as i32;
    let b = if idx + 1 < EXP2_LEN {
        EXP2_LUT[idx + 1] as i32
    } else {
        1 << 14
    };
    let one_plus = (1 << 14) + a + (((b - a) * lerp) >> 6);
    let scaled = if whole >= 0 {
        (one_plus as i64) << whole.min(16)
    } else {
        one_plus as i64 >> (-whole).min(31)
    };
    Audio::from_bits(scaled as i32)
}

/// Map a volts-per-octave control value to a frequency in Hz (Q14).
pub fn voct_to_freq(voct: Audio) -> Audio {
    exp2(voct) * Audio::from_f32(C4_HZ)
}
