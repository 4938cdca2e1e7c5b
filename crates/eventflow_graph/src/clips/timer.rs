// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clip that measures how long bool parameters stay true.

use crate::clip::{ClipContext, ClipError, EventClip};
use serde::{Deserialize, Serialize};

/// A measured gate: while `gate` is true, `elapsed` counts up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSection {
    /// Bool parameter gating the timer
    pub gate: String,
    /// Float parameter receiving the elapsed seconds
    pub elapsed: String,
}

impl TimerSection {
    /// Create a new section
    pub fn new(gate: impl Into<String>, elapsed: impl Into<String>) -> Self {
        Self {
            gate: gate.into(),
            elapsed: elapsed.into(),
        }
    }
}

/// Writes, for each section, the seconds its gate has been continuously true
#[derive(Debug, Clone)]
pub struct TimerClip {
    sections: Vec<TimerSection>,
    started_at: Vec<f32>,
    now: f32,
}

impl TimerClip {
    /// Create a new timer clip
    pub fn new(sections: Vec<TimerSection>) -> Self {
        let started_at = vec![0.0; sections.len()];
        Self {
            sections,
            started_at,
            now: 0.0,
        }
    }
}

impl EventClip for TimerClip {
    fn on_tick(&mut self, ctx: &mut ClipContext<'_>) -> Result<(), ClipError> {
        self.now = ctx.time();
        for (section, started_at) in self.sections.iter().zip(self.started_at.iter_mut()) {
            if !ctx.get_bool(&section.gate) {
                *started_at = self.now;
            }
            ctx.set_float(&section.elapsed, self.now - *started_at);
        }
        Ok(())
    }

    fn message(&self) -> Option<String> {
        let text = self
            .sections
            .iter()
            .zip(&self.started_at)
            .map(|(section, started_at)| format!("{}: {:.2}\n", section.gate, self.now - started_at))
            .collect::<String>();
        Some(text)
    }
}
