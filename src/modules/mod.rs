//! The per-channel module framework.
//!
//! A module owns one channel's outputs and whatever DSP primitives it
//! composes. `process` runs once per audio tick inside the realtime context
//! and must not block or allocate; `update_display` runs once per UI
//! refresh with no deadline and owns the channel's parameter editing and
//! drawing. Channels hot-swap between kinds through `ModuleKind::build`;
//! the engine guarantees a swap never overlaps `process` and drops the old
//! instance outside the audio context.

pub mod clock_mult;
pub mod follower;
pub mod step_seq;

pub use clock_mult::ClockMult;
pub use follower::Follower;
pub use step_seq::StepSeq;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::io::encoder::ControlFrame;
use crate::io::surface::Surface;
use crate::io::ChannelIo;
use crate::params::Parameter;

/// One UI refresh cycle's context for a module: the display surface plus
/// the channel's consumed encoder snapshot.
pub struct UiFrame<'a> {
    pub surface: &'a mut dyn Surface,
    pub controls: ControlFrame,
}

pub trait Module: Send {
    fn name(&self) -> &'static str;

    /// One audio tick. Non-blocking, allocation-free, inside the tick
    /// budget.
    fn process(&mut self, io: &mut ChannelIo<'_>);

    /// One UI refresh: parameter editing and drawing. Not realtime-bound.
    fn update_display(&mut self, ui: &mut UiFrame<'_>);

    /// The module's editable parameters, if any.
    fn params(&self) -> &[Parameter] {
        &[]
    }
}

/// Type tag for the module catalog; long-pressing a channel's encoder
/// button cycles through these in order.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    Follower,
    StepSeq,
    ClockMult,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 3] = [
        ModuleKind::Follower,
        ModuleKind::StepSeq,
        ModuleKind::ClockMult,
    ];

    pub fn next(self) -> Self {
        match self {
            ModuleKind::Follower => ModuleKind::StepSeq,
            ModuleKind::StepSeq => ModuleKind::ClockMult,
            ModuleKind::ClockMult => ModuleKind::Follower,
        }
    }

    /// Construct a fresh instance for a channel. The previous owner of the
    /// channel's outputs is discarded by the caller.
    pub fn build(self, sample_rate: u32) -> Box<dyn Module> {
        match self {
            ModuleKind::Follower => Box::new(Follower::new(sample_rate)),
            ModuleKind::StepSeq => Box::new(StepSeq::new(sample_rate)),
            ModuleKind::ClockMult => Box::new(ClockMult::new(sample_rate)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_cycle_visits_the_whole_catalog() {
        let mut kind = ModuleKind::Follower;
        let mut seen = vec![kind];
        for _ in 0..ModuleKind::ALL.len() - 1 {
            kind = kind.next();
            seen.push(kind);
        }
        assert_eq!(seen, ModuleKind::ALL.to_vec());
        assert_eq!(kind.next(), ModuleKind::Follower);
    }

    #[test]
    fn build_constructs_the_matching_module() {
        for kind in ModuleKind::ALL {
            let module = kind.build(40_000);
            assert!(!module.name().is_empty());
        }
    }
}
