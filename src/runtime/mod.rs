//! Host runtime for running the engine off an audio callback.
//!
//! `Rig` is the builder: pick module kinds per channel, hand it an analog
//! source, and `start` wires up the sampling thread, the hand-off ring, and
//! a cpal output stream whose callback drives `Engine::tick` once per
//! output frame. The returned `RigHandle` keeps everything alive and gives
//! the UI side its `Arc<Mutex<Engine>>`.

pub mod inputs;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{info, warn};

use crate::engine::{Engine, EngineConfig};
use crate::io::mailbox::sample_channel;
use crate::io::sampler::{AnalogSource, Sampler};
use crate::modules::ModuleKind;
use crate::NUM_CHANNELS;

/// Builder for a running engine.
pub struct Rig {
    config: EngineConfig,
    kinds: [ModuleKind; NUM_CHANNELS],
}

impl Rig {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            kinds: [ModuleKind::Follower; NUM_CHANNELS],
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Choose the module a channel boots with.
    pub fn module(mut self, channel: usize, kind: ModuleKind) -> Self {
        if let Some(slot) = self.kinds.get_mut(channel) {
            *slot = kind;
        }
        self
    }

    /// Bring the rig up: sampling thread feeding the hand-off ring, audio
    /// stream ticking the engine.
    pub fn start<S: AnalogSource + 'static>(self, source: S) -> EyreResult<RigHandle> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let stream_config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        // The engine ticks at whatever rate the device runs; the nominal
        // rate in the config is only the fallback.
        let mut config = self.config;
        config.sample_rate = stream_config.sample_rate().0;
        let channels = stream_config.channels() as usize;
        info!(
            sample_rate = config.sample_rate,
            channels, "audio device opened"
        );

        let (tx, rx) = sample_channel(config.mailbox_capacity);
        let mut engine = Engine::new(config, rx);
        for (channel, kind) in self.kinds.into_iter().enumerate() {
            if kind != engine.kind(channel) {
                engine.load_module(channel, kind);
            }
        }
        let engine = Arc::new(Mutex::new(engine));

        let running = Arc::new(AtomicBool::new(true));
        let sampler_running = running.clone();
        let sampler = thread::spawn(move || {
            let mut sampler = Sampler::new(source, tx);
            while sampler_running.load(Ordering::Relaxed) {
                for _ in 0..NUM_CHANNELS {
                    sampler.step();
                }
                thread::sleep(Duration::from_micros(500));
            }
        });

        let state = engine.clone();
        let stream = device
            .build_output_stream(
                &stream_config.into(),
                move |data: &mut [f32], _| {
                    let mut engine = state.lock().unwrap();
                    for frame in data.chunks_mut(channels) {
                        engine.tick();
                        // Monitor mix: the three CV-pair outputs, attenuated.
                        let hw = engine.hw();
                        let mut mix = 0.0f32;
                        for channel in 0..NUM_CHANNELS {
                            mix += hw.cv_out[channel].last().to_f32();
                        }
                        let sample = mix / NUM_CHANNELS as f32;
                        for out in frame.iter_mut() {
                            *out = sample;
                        }
                    }
                },
                |err| warn!(%err, "audio stream error"),
                None,
            )
            .wrap_err("failed to build output stream")?;
        stream.play().wrap_err("failed to start output stream")?;

        Ok(RigHandle {
            engine,
            running,
            sampler: Some(sampler),
            _stream: stream,
        })
    }
}

impl Default for Rig {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps the stream and sampling thread alive; dropping it tears both down.
pub struct RigHandle {
    engine: Arc<Mutex<Engine>>,
    running: Arc<AtomicBool>,
    sampler: Option<JoinHandle<()>>,
    _stream: cpal::Stream,
}

impl RigHandle {
    /// The shared engine. Lock it for UI updates; the audio callback takes
    /// the same lock per buffer.
    pub fn engine(&self) -> &Arc<Mutex<Engine>> {
        &self.engine
    }
}

impl Drop for RigHandle {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.sampler.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_places_kinds_per_channel() {
        let rig = Rig::new()
            .module(0, ModuleKind::ClockMult)
            .module(2, ModuleKind::StepSeq)
            .module(9, ModuleKind::StepSeq); // out of range, ignored
        assert_eq!(rig.kinds[0], ModuleKind::ClockMult);
        assert_eq!(rig.kinds[1], ModuleKind::Follower);
        assert_eq!(rig.kinds[2], ModuleKind::StepSeq);
    }
}
