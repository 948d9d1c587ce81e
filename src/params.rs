//! Named, bounded, wrap-around integer parameters and the two-mode encoder
//! protocol that edits them.
//!
//! Out-of-range writes wrap to the opposite bound instead of clamping, so a
//! continuously turned encoder feels continuous: one detent past the maximum
//! lands on the minimum. `has_changed` gives modules a cheap way to run
//! derived recomputation only when a value actually moved.

/// A bounded integer parameter with change tracking.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: &'static str,
    value: i32,
    min: i32,
    max: i32,
    increment: i32,
    last_seen: i32,
}

impl Parameter {
    /// `min..=max` must be a non-empty range; the initial value wraps into it.
    pub fn new(name: &'static str, initial: i32, min: i32, max: i32, increment: i32) -> Self {
        debug_assert!(min <= max);
        let mut p = Self {
            name,
            value: initial,
            min,
            max,
            increment: increment.max(1),
            last_seen: initial,
        };
        p.value = p.wrap(initial);
        p.last_seen = p.value;
        p
    }

    fn wrap(&self, raw: i32) -> i32 {
        let span = (self.max - self.min) as i64 + 1;
        let offset = (raw as i64 - self.min as i64).rem_euclid(span);
        (self.min as i64 + offset) as i32
    }

    /// Apply a signed number of encoder detents.
    pub fn adjust(&mut self, detents: i32) {
        self.value = self.wrap(self.value.wrapping_add(detents.wrapping_mul(self.increment)));
    }

    /// Direct write; wraps like `adjust`.
    pub fn set(&mut self, raw: i32) {
        self.value = self.wrap(raw);
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// True once per observed change; consuming resets the comparison value.
    pub fn has_changed(&mut self) -> bool {
        let changed = self.value != self.last_seen;
        self.last_seen = self.value;
        changed
    }
}

/// Encoder editing mode: clicking the encoder button toggles between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Rotation changes which parameter is selected.
    #[default]
    Select,
    /// Rotation adjusts the selected parameter.
    Modify,
}

/// Two-mode encoder protocol over a parameter list.
#[derive(Debug, Clone, Default)]
pub struct ParamEditor {
    mode: EditMode,
    selected: usize,
}

impl ParamEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one UI cycle's worth of encoder input.
    pub fn update(&mut self, params: &mut [Parameter], delta: i32, clicked: bool) {
        if params.is_empty() {
            return;
        }
        if clicked {
            self.mode = match self.mode {
                EditMode::Select => EditMode::Modify,
                EditMode::Modify => EditMode::Select,
            };
        }
        if delta == 0 {
            return;
        }
        match self.mode {
            EditMode::Select => {
                let len = params.len() as i32;
                self.selected = (self.selected as i32 + delta).rem_euclid(len) as usize;
            }
            EditMode::Modify => params[self.selected].adjust(delta),
        }
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn selected(&self) -> usize {
        self.selected
    }
}
