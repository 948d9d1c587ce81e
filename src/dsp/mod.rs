//! Fixed-point DSP primitives for the per-channel modules.
//!
//! Everything here is allocation-free and wrap-safe: phase accumulators wrap
//! their integer range instead of branching, arithmetic wraps two's
//! complement, and nothing on the tick path touches a float or the heap.
//! Modules compose these directly; the engine only ever calls them through
//! a module's `process`.

/// Attack/decay envelope over a fixed-point phase.
pub mod envelope;
/// Q-format fixed-point numerics.
pub mod fixed;
/// Linear-feedback shift register.
pub mod lfsr;
/// Phase accumulator and the waveforms built on it.
pub mod oscillator;
/// Sine and base-2 exponential lookup tables.
pub mod tables;
/// Edge latches, hysteresis, clock-rate measurement.
pub mod trigger;

pub use envelope::{AdEnv, EnvelopeState};
pub use fixed::{Audio, Fixed, Phase};
pub use oscillator::Phasor;
pub use trigger::{ClockRateDetector, GateTrigger, SchmidtTrigger};
