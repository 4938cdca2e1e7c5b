// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clip that picks one of two triggers at random.

use crate::clip::{ClipContext, ClipError, EventClip};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Rolls on enter, then raises the chosen trigger on every tick
#[derive(Debug, Clone)]
pub struct RandomTriggerClip {
    rate: u32,
    next: String,
    back: String,
    rng: ChaCha8Rng,
    pick_next: bool,
}

impl RandomTriggerClip {
    /// Create a new clip. `rate` is the percent chance of picking `next`.
    pub fn new(
        rate: u32,
        next: impl Into<String>,
        back: impl Into<String>,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };
        Self {
            rate,
            next: next.into(),
            back: back.into(),
            rng,
            pick_next: false,
        }
    }

    /// Trigger chosen by the last roll
    pub fn chosen(&self) -> &str {
        if self.pick_next {
            &self.next
        } else {
            &self.back
        }
    }
}

impl EventClip for RandomTriggerClip {
    fn on_enter(&mut self, _ctx: &mut ClipContext<'_>) -> Result<(), ClipError> {
        self.pick_next = self.rng.random_range(0..100) < self.rate;
        Ok(())
    }

    fn on_tick(&mut self, ctx: &mut ClipContext<'_>) -> Result<(), ClipError> {
        let trigger = if self.pick_next { &self.next } else { &self.back };
        ctx.set_trigger(trigger);
        Ok(())
    }

    fn message(&self) -> Option<String> {
        Some(self.chosen().to_string())
    }
}
