// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clip that raises a trigger after a delay.

use crate::clip::{ClipContext, ClipError, EventClip};

/// Raises a trigger once the node has been current for `delay` seconds
#[derive(Debug, Clone)]
pub struct DelayClip {
    delay: f32,
    trigger: String,
    entered_at: f32,
    now: f32,
}

impl DelayClip {
    /// Create a new delay clip
    pub fn new(delay: f32, trigger: impl Into<String>) -> Self {
        Self {
            delay,
            trigger: trigger.into(),
            entered_at: 0.0,
            now: 0.0,
        }
    }

    /// Seconds left before the trigger is raised
    pub fn remaining(&self) -> f32 {
        (self.delay - (self.now - self.entered_at)).max(0.0)
    }
}

impl EventClip for DelayClip {
    fn on_enter(&mut self, ctx: &mut ClipContext<'_>) -> Result<(), ClipError> {
        self.entered_at = ctx.time();
        self.now = ctx.time();
        Ok(())
    }

    fn on_tick(&mut self, ctx: &mut ClipContext<'_>) -> Result<(), ClipError> {
        self.now = ctx.time();
        if self.now > self.entered_at + self.delay {
            ctx.set_trigger(&self.trigger);
        }
        Ok(())
    }

    fn message(&self) -> Option<String> {
        Some(format!("{:.2}s", self.remaining()))
    }
}
