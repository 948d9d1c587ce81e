use rtrb::{Consumer, Producer, RingBuffer};

use crate::dsp::Audio;

/*
Cross-context sample hand-off
=============================

The sampling context and the audio context share exactly one thing: a
bounded single-producer/single-consumer ring of (channel, value) messages.
Delivery is at-most-latest by design. When the ring is full the producer
drops the push and moves on; the consumer keeps the previous value for
that channel until the next successful hand-off, and the sampling EMA has
already smeared any single reading across its neighbors. Do not "fix" this
into a lossless queue; the smoothing budget assumes losses are fine.
*/

/// One smoothed analog reading tagged with its channel.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub channel: u8,
    pub value: Audio,
}

/// Producer half, owned by the sampling context.
pub struct SampleTx {
    producer: Producer<Sample>,
}

/// Consumer half, owned by the audio context.
pub struct SampleRx {
    consumer: Consumer<Sample>,
}

/// Build the bounded hand-off ring.
pub fn sample_channel(capacity: usize) -> (SampleTx, SampleRx) {
    let (producer, consumer) = RingBuffer::new(capacity.max(1));
    (SampleTx { producer }, SampleRx { consumer })
}

impl SampleTx {
    /// Non-blocking push; returns false when the ring was full and the
    /// sample was dropped.
    pub fn offer(&mut self, sample: Sample) -> bool {
        self.producer.push(sample).is_ok()
    }
}

impl SampleRx {
    /// Drain everything pending into the per-channel latest-value slots.
    /// Later messages for the same channel overwrite earlier ones.
    pub fn drain_into(&mut self, slots: &mut [Audio]) {
        while let Ok(sample) = self.consumer.pop() {
            if let Some(slot) = slots.get_mut(sample.channel as usize) {
                *slot = sample.value;
            }
        }
    }
}
