//! Simulator application: keyboard events stand in for the panel encoders
//! and jacks, a text surface stands in for the per-channel displays.

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;

use triptych::dsp::Audio;
use triptych::io::encoder::{ControlFrame, Encoder, EncoderPin, DEBOUNCE_US};
use triptych::io::surface::Surface;
use triptych::modules::ModuleKind;
use triptych::runtime::inputs::SharedInputs;
use triptych::runtime::{Rig, RigHandle};
use triptych::{NUM_CHANNELS, UI_REFRESH_HZ};

use crate::ui::{self, Snapshot};

/// How long a simulated button tap reads as held: long enough to survive
/// the debounce window and be latched by the next poll.
const TAP_US: u64 = 2 * DEBOUNCE_US;

pub struct App {
    rig: RigHandle,
    inputs: SharedInputs,
    encoders: [Encoder; NUM_CHANNELS],
    /// Simulated button-down deadlines for momentary taps.
    top_down_until: [u64; NUM_CHANNELS],
    enc_down_until: [u64; NUM_CHANNELS],
    /// Sticky encoder-button hold, toggled from the keyboard to reach the
    /// long-press gesture.
    enc_hold: [bool; NUM_CHANNELS],
    selected: usize,
    started: Instant,
    surface: TextSurface,
    should_quit: bool,
}

impl App {
    pub fn new() -> EyreResult<Self> {
        let inputs = SharedInputs::new();
        let rig = Rig::new()
            .module(1, ModuleKind::StepSeq)
            .module(2, ModuleKind::ClockMult)
            .start(inputs.clone())?;
        Ok(Self {
            rig,
            inputs,
            encoders: std::array::from_fn(|_| Encoder::new()),
            top_down_until: [0; NUM_CHANNELS],
            enc_down_until: [0; NUM_CHANNELS],
            enc_hold: [false; NUM_CHANNELS],
            selected: 0,
            started: Instant::now(),
            surface: TextSurface::new(),
            should_quit: false,
        })
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        let refresh = Duration::from_millis(1_000 / UI_REFRESH_HZ as u64);
        while !self.should_quit {
            let deadline = Instant::now() + refresh;
            while Instant::now() < deadline {
                let timeout = deadline.saturating_duration_since(Instant::now());
                if event::poll(timeout)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind == KeyEventKind::Press {
                            self.handle_key(key.code);
                        }
                    }
                }
            }

            let now = self.now_us();
            let mut frames = [ControlFrame::default(); NUM_CHANNELS];
            for (i, encoder) in self.encoders.iter_mut().enumerate() {
                let top = now < self.top_down_until[i];
                let enc = self.enc_hold[i] || now < self.enc_down_until[i];
                encoder.poll(now, top, enc);
                frames[i] = encoder.frame();
            }

            let snapshot = {
                let engine = self.rig.engine();
                let mut engine = engine.lock().unwrap();
                for channel in 0..NUM_CHANNELS {
                    engine.set_gate(channel, self.inputs.gate(channel));
                }
                self.surface.clear();
                engine.update_ui(&frames, &mut self.surface);

                Snapshot {
                    panels: self.surface.take_panels(),
                    names: std::array::from_fn(|i| engine.module(i).name()),
                    levels: std::array::from_fn(|i| engine.hw().cv_out[i].last().to_f32()),
                    gates: std::array::from_fn(|i| self.inputs.gate(i)),
                    cv_in: std::array::from_fn(|i| self.inputs.cv(i)),
                    selected: self.selected,
                    sample_rate: engine.config().sample_rate,
                }
            };
            terminal.draw(|frame| ui::render(frame, &snapshot))?;
        }
        Ok(())
    }

    fn now_us(&self) -> u64 {
        self.started.elapsed().as_micros() as u64
    }

    fn handle_key(&mut self, key: KeyCode) {
        let now = self.now_us();
        let ch = self.selected;
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('1') => self.selected = 0,
            KeyCode::Char('2') => self.selected = 1,
            KeyCode::Char('3') => self.selected = 2,
            // A rotation detent is the two lines edging in order.
            KeyCode::Right | KeyCode::Up => {
                self.encoders[ch].edge(EncoderPin::Top, now);
                self.encoders[ch].edge(EncoderPin::Enc, now + 1_000);
            }
            KeyCode::Left | KeyCode::Down => {
                self.encoders[ch].edge(EncoderPin::Enc, now);
                self.encoders[ch].edge(EncoderPin::Top, now + 1_000);
            }
            KeyCode::Char('e') => {
                self.encoders[ch].edge(EncoderPin::Enc, now);
                self.enc_down_until[ch] = now + TAP_US;
            }
            KeyCode::Char('t') => {
                self.encoders[ch].edge(EncoderPin::Top, now);
                self.top_down_until[ch] = now + TAP_US;
            }
            // Sticky hold; keep it down for a second to swap the module.
            KeyCode::Char('E') => self.enc_hold[ch] = !self.enc_hold[ch],
            KeyCode::Char('g') => self.inputs.toggle_gate(ch),
            KeyCode::Char('[') => self.inputs.nudge_cv(ch, -1),
            KeyCode::Char(']') => self.inputs.nudge_cv(ch, 1),
            _ => {}
        }
    }
}

/// Per-channel character grid the modules draw into; the renderer lifts the
/// finished lines into the channel panels.
pub struct TextSurface {
    panels: [Vec<String>; NUM_CHANNELS],
    current: usize,
}

impl TextSurface {
    pub fn new() -> Self {
        Self {
            panels: std::array::from_fn(|_| Vec::new()),
            current: 0,
        }
    }

    pub fn clear(&mut self) {
        for panel in &mut self.panels {
            panel.clear();
        }
    }

    pub fn take_panels(&mut self) -> [Vec<String>; NUM_CHANNELS] {
        std::array::from_fn(|i| std::mem::take(&mut self.panels[i]))
    }
}

impl Surface for TextSurface {
    fn begin_channel(&mut self, channel: usize) {
        self.current = channel.min(NUM_CHANNELS - 1);
    }

    fn draw_str(&mut self, x: u16, y: u16, text: &str) {
        let lines = &mut self.panels[self.current];
        while lines.len() <= y as usize {
            lines.push(String::new());
        }
        let mut chars: Vec<char> = lines[y as usize].chars().collect();
        while chars.len() < x as usize {
            chars.push(' ');
        }
        for (i, c) in text.chars().enumerate() {
            let pos = x as usize + i;
            if pos < chars.len() {
                chars[pos] = c;
            } else {
                chars.push(c);
            }
        }
        lines[y as usize] = chars.into_iter().collect();
    }

    fn draw_meter(&mut self, x: u16, y: u16, width: u16, level: Audio) {
        let filled = (level.to_f32().clamp(0.0, 1.0) * width as f32).round() as usize;
        let bar: String = (0..width as usize)
            .map(|i| if i < filled { '#' } else { '.' })
            .collect();
        self.draw_str(x, y, &bar);
    }
}
