use crate::LONG_PRESS_CYCLES;

/*
Encoder gesture machine
=======================

Each panel encoder is two switches that edge independently: the top button
line and the encoder button line. A rotation detent presents as one line
edging shortly before the other, so direction is recovered by remembering
which line led. Edges feed `edge()` from interrupt context (a key handler
in the simulator); levels and latches are folded in once per UI refresh by
`poll()`.

The debounce window does double duty: within a gesture it is the pairing
timeout (a second edge later than the window starts a fresh gesture instead
of combining), and after a gesture it is the minimum re-trigger delay.
*/

/// Which physical line edged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderPin {
    Top,
    Enc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuadState {
    Idle,
    TopLeading,
    EncLeading,
}

/// Minimum edge spacing; also the gesture pairing window.
pub const DEBOUNCE_US: u64 = 1_000_000 / 25;

#[derive(Debug)]
pub struct Encoder {
    quad: QuadState,
    value: i32,
    next_can_trigger: u64,
    window_us: u64,
    top_held: bool,
    enc_held: bool,
    top_pressed: bool,
    enc_pressed: bool,
    top_held_for: u32,
    enc_held_for: u32,
}

/// One UI cycle's consumed snapshot of a channel's controls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlFrame {
    pub delta: i32,
    pub top_pressed: bool,
    pub enc_pressed: bool,
    pub top_held: bool,
    pub enc_held: bool,
    /// One-shot: the encoder button has been held for the long-press
    /// threshold of UI cycles.
    pub long_press: bool,
}

impl Encoder {
    pub fn new() -> Self {
        Self {
            quad: QuadState::Idle,
            value: 0,
            next_can_trigger: 0,
            window_us: DEBOUNCE_US,
            top_held: false,
            enc_held: false,
            top_pressed: false,
            enc_pressed: false,
            top_held_for: 0,
            enc_held_for: 0,
        }
    }

    /// Feed one falling edge from interrupt context.
    pub fn edge(&mut self, pin: EncoderPin, now_us: u64) {
        if self.quad != QuadState::Idle && now_us > self.next_can_trigger {
            // Pairing window expired; this edge starts a fresh gesture.
            self.quad = QuadState::Idle;
        }
        match (self.quad, pin) {
            (QuadState::Idle, _) => {
                if now_us >= self.next_can_trigger {
                    self.quad = match pin {
                        EncoderPin::Top => QuadState::TopLeading,
                        EncoderPin::Enc => QuadState::EncLeading,
                    };
                    self.next_can_trigger = now_us + self.window_us;
                }
            }
            (QuadState::TopLeading, EncoderPin::Enc) => {
                self.value += 1;
                self.quad = QuadState::Idle;
                self.next_can_trigger = now_us + self.window_us;
            }
            (QuadState::EncLeading, EncoderPin::Top) => {
                self.value -= 1;
                self.quad = QuadState::Idle;
                self.next_can_trigger = now_us + self.window_us;
            }
            // Repeated edge on the leading line: contact bounce.
            _ => {}
        }
    }

    /// Fold in button levels once per UI refresh. A gesture that opened but
    /// never paired is a plain button press, latched here.
    pub fn poll(&mut self, now_us: u64, top_level: bool, enc_level: bool) {
        if now_us <= self.next_can_trigger {
            return;
        }
        if self.quad != QuadState::Idle {
            self.top_pressed |= !self.top_held && top_level;
            self.enc_pressed |= !self.enc_held && enc_level;
        }
        self.top_held_for = if self.top_held && top_level {
            self.top_held_for + 1
        } else {
            0
        };
        self.enc_held_for = if self.enc_held && enc_level {
            self.enc_held_for + 1
        } else {
            0
        };
        self.top_held = top_level;
        self.enc_held = enc_level;
        self.quad = QuadState::Idle;
    }

    /// Accumulated rotation since the last read; read-and-clear.
    pub fn take_delta(&mut self) -> i32 {
        std::mem::take(&mut self.value)
    }

    /// Consume everything a UI cycle needs in one snapshot. The long-press
    /// counter resets when it fires, so a continued hold re-fires only
    /// after another full threshold.
    pub fn frame(&mut self) -> ControlFrame {
        let long_press = self.enc_held_for >= LONG_PRESS_CYCLES;
        if long_press {
            self.enc_held_for = 0;
        }
        ControlFrame {
            delta: self.take_delta(),
            top_pressed: std::mem::take(&mut self.top_pressed),
            enc_pressed: std::mem::take(&mut self.enc_pressed),
            top_held: self.top_held,
            enc_held: self.enc_held,
            long_press,
        }
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: u64 = 1_000; // comfortably inside the pairing window

    #[test]
    fn top_leading_pair_increments() {
        let mut enc = Encoder::new();
        enc.edge(EncoderPin::Top, 10_000);
        enc.edge(EncoderPin::Enc, 10_000 + STEP);
        assert_eq!(enc.take_delta(), 1);
        assert_eq!(enc.take_delta(), 0, "delta is read-and-clear");
    }

    #[test]
    fn enc_leading_pair_decrements() {
        let mut enc = Encoder::new();
        enc.edge(EncoderPin::Enc, 10_000);
        enc.edge(EncoderPin::Top, 10_000 + STEP);
        assert_eq!(enc.take_delta(), -1);
    }

    #[test]
    fn detents_accumulate_between_reads() {
        let mut enc = Encoder::new();
        let mut now = 10_000;
        for _ in 0..3 {
            enc.edge(EncoderPin::Top, now);
            enc.edge(EncoderPin::Enc, now + STEP);
            now += 2 * DEBOUNCE_US;
        }
        assert_eq!(enc.take_delta(), 3);
    }

    #[test]
    fn stale_second_edge_starts_a_fresh_gesture() {
        let mut enc = Encoder::new();
        enc.edge(EncoderPin::Top, 10_000);
        // Way past the pairing window: no rotation, new gesture leads.
        enc.edge(EncoderPin::Enc, 10_000 + 10 * DEBOUNCE_US);
        assert_eq!(enc.take_delta(), 0);
        // The late edge led a new gesture, so a Top edge now pairs as CCW.
        enc.edge(EncoderPin::Top, 10_000 + 10 * DEBOUNCE_US + STEP);
        assert_eq!(enc.take_delta(), -1);
    }

    #[test]
    fn bounce_on_the_leading_line_is_ignored() {
        let mut enc = Encoder::new();
        enc.edge(EncoderPin::Top, 10_000);
        enc.edge(EncoderPin::Top, 10_000 + 100);
        enc.edge(EncoderPin::Enc, 10_000 + STEP);
        assert_eq!(enc.take_delta(), 1);
    }

    #[test]
    fn unpaired_gesture_with_held_button_latches_a_press() {
        let mut enc = Encoder::new();
        enc.edge(EncoderPin::Enc, 10_000);
        // Poll after the window with the button still down.
        enc.poll(10_000 + 2 * DEBOUNCE_US, false, true);
        let frame = enc.frame();
        assert!(frame.enc_pressed);
        assert!(frame.enc_held);
        assert!(!enc.frame().enc_pressed, "press latch is consumed");
    }

    #[test]
    fn long_press_fires_once_per_threshold() {
        let mut enc = Encoder::new();
        let mut now = 10_000;
        enc.edge(EncoderPin::Enc, now);
        // Hold the encoder button across many polls.
        for _ in 0..=LONG_PRESS_CYCLES {
            now += 2 * DEBOUNCE_US;
            enc.poll(now, false, true);
        }
        let frame = enc.frame();
        assert!(frame.long_press);
        assert!(!enc.frame().long_press, "counter resets at the threshold");
    }

    #[test]
    fn releasing_resets_the_held_counter() {
        let mut enc = Encoder::new();
        let mut now = 10_000;
        enc.edge(EncoderPin::Enc, now);
        for _ in 0..10 {
            now += 2 * DEBOUNCE_US;
            enc.poll(now, false, true);
        }
        now += 2 * DEBOUNCE_US;
        enc.poll(now, false, false);
        for _ in 0..10 {
            now += 2 * DEBOUNCE_US;
            enc.poll(now, false, true);
        }
        assert!(!enc.frame().long_press);
    }
}
