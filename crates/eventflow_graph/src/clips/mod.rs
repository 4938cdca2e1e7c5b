// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in clips and the serializable clip description.

pub mod delay;
pub mod log;
pub mod parameter_set;
pub mod random_trigger;
pub mod timer;

pub use delay::DelayClip;
pub use log::LogClip;
pub use parameter_set::{Assignment, ParameterSetClip, Phase};
pub use random_trigger::RandomTriggerClip;
pub use timer::{TimerClip, TimerSection};

use crate::clip::{ClipRegistry, EventClip};
use serde::{Deserialize, Serialize};

/// Clip bound to a node in a graph description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClipDescription {
    /// Host clip looked up in a [`ClipRegistry`]
    Named(String),
    /// Logs every hook
    Log,
    /// Raises `trigger` once `delay` seconds have passed since entering
    Delay {
        /// Seconds to wait
        delay: f32,
        /// Trigger to raise
        trigger: String,
    },
    /// Writes parameters on enter, tick or exit
    ParameterSet {
        /// Parameter writes
        assignments: Vec<Assignment>,
    },
    /// Measures how long bool parameters have been true
    Timer {
        /// Measured gates
        sections: Vec<TimerSection>,
    },
    /// Picks one of two triggers on enter and raises it every tick
    RandomTrigger {
        /// Chance in percent of picking `next`
        rate: u32,
        /// Trigger picked with probability `rate`
        next: String,
        /// Trigger picked otherwise
        back: String,
        /// Fixed RNG seed
        #[serde(default)]
        seed: Option<u64>,
    },
}

impl ClipDescription {
    /// Build the clip. Returns `None` for a named clip missing from `registry`.
    pub fn build(&self, registry: &ClipRegistry) -> Option<Box<dyn EventClip>> {
        let clip: Box<dyn EventClip> = match self {
            Self::Named(name) => return registry.create(name),
            Self::Log => Box::new(LogClip),
            Self::Delay { delay, trigger } => Box::new(DelayClip::new(*delay, trigger.clone())),
            Self::ParameterSet { assignments } => {
                Box::new(ParameterSetClip::new(assignments.clone()))
            }
            Self::Timer { sections } => Box::new(TimerClip::new(sections.clone())),
            Self::RandomTrigger {
                rate,
                next,
                back,
                seed,
            } => Box::new(RandomTriggerClip::new(*rate, next.clone(), back.clone(), *seed)),
        };
        Some(clip)
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use crate::clip::{ClipContext, FrameInfo};
    use crate::parameter::ParameterStore;

    /// Context at `time` seconds for a clip under test
    pub fn ctx_at(params: &mut ParameterStore, time: f32) -> ClipContext<'_> {
        ClipContext::new(params, FrameInfo { frame: 0, time }, "Test", "Node")
    }
}
