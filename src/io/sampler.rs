use crate::dsp::Audio;
use crate::io::mailbox::{Sample, SampleTx};
use crate::NUM_CHANNELS;

/// Digitizations folded into the moving average per channel visit.
const OVERSAMPLE: usize = 3;

/// Source of raw 12-bit conversions, one per analog input channel.
///
/// The runtime hands the sampler whatever backs the channels: on hardware
/// this would be the ADC mux, in the simulator it is a set of shared knobs.
pub trait AnalogSource: Send {
    fn read(&mut self, channel: usize) -> u16;
}

/// The sampling context: round-robin over the input channels, a few
/// digitizations per visit folded into a fast exponential moving average,
/// then a non-blocking hand-off of the smoothed value.
///
/// `step` never blocks on the audio side; a full ring means the value is
/// dropped and the consumer keeps its previous reading.
pub struct Sampler<S> {
    source: S,
    accumulators: [u32; NUM_CHANNELS],
    active: usize,
    tx: SampleTx,
}

impl<S: AnalogSource> Sampler<S> {
    pub fn new(source: S, tx: SampleTx) -> Self {
        Self {
            source,
            accumulators: [0; NUM_CHANNELS],
            active: 0,
            tx,
        }
    }

    /// One channel visit: oversample, smooth, offer, advance.
    pub fn step(&mut self) {
        for _ in 0..OVERSAMPLE {
            // 12-bit reading shifted up to Q14, EMA with alpha 1/4.
            let raw = (self.source.read(self.active) as u32) << 2;
            self.accumulators[self.active] = (raw + self.accumulators[self.active] * 3) >> 2;
        }
        let value = Audio::from_bits(self.accumulators[self.active] as i32);
        let _ = self.tx.offer(Sample {
            channel: self.active as u8,
            value,
        });
        self.active = (self.active + 1) % NUM_CHANNELS;
    }
}
