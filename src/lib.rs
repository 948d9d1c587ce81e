pub mod dsp;
pub mod engine;
pub mod io;
pub mod modules;
pub mod params;
pub mod runtime; // Host-side threads standing in for the dual-core split

/// Channel count of the panel: three encoders, three gate jacks, three CV
/// inputs, three calibrated output pairs.
pub const NUM_CHANNELS: usize = 3;

/// Nominal audio/control tick rate: one tick every 25 us.
pub const SAMPLE_RATE: u32 = 40_000;

/// UI refresh and encoder poll rate.
pub const UI_REFRESH_HZ: u32 = 25;

/// Encoder-button hold duration, in UI refresh cycles, that cycles a channel
/// to the next module kind. One second at the nominal refresh rate.
pub const LONG_PRESS_CYCLES: u32 = 25;
