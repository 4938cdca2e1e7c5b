// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clip that writes parameters from its hooks.

use crate::clip::{ClipContext, ClipError, EventClip, Hook};
use crate::parameter::ParameterValue;
use serde::{Deserialize, Serialize};

/// Hook an assignment runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// On enter
    Enter,
    /// On every tick
    Tick,
    /// On exit
    Exit,
}

impl Phase {
    fn matches(self, hook: Hook) -> bool {
        matches!(
            (self, hook),
            (Self::Enter, Hook::Enter) | (Self::Tick, Hook::Tick) | (Self::Exit, Hook::Exit)
        )
    }
}

/// One parameter write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// When to write
    pub phase: Phase,
    /// Parameter name
    pub parameter: String,
    /// Value to write. `Trigger(true)` raises the trigger, `Trigger(false)` clears it.
    pub value: ParameterValue,
}

impl Assignment {
    /// Create a new assignment
    pub fn new(phase: Phase, parameter: impl Into<String>, value: ParameterValue) -> Self {
        Self {
            phase,
            parameter: parameter.into(),
            value,
        }
    }
}

/// Writes parameters on enter, tick or exit
#[derive(Debug, Clone)]
pub struct ParameterSetClip {
    assignments: Vec<Assignment>,
}

impl ParameterSetClip {
    /// Create a new clip
    pub fn new(assignments: Vec<Assignment>) -> Self {
        Self { assignments }
    }

    fn apply(&self, hook: Hook, ctx: &mut ClipContext<'_>) {
        for assignment in self.assignments.iter().filter(|a| a.phase.matches(hook)) {
            let name = assignment.parameter.as_str();
            match assignment.value {
                ParameterValue::Int(v) => ctx.set_int(name, v),
                ParameterValue::Float(v) => ctx.set_float(name, v),
                ParameterValue::Bool(v) => ctx.set_bool(name, v),
                ParameterValue::Trigger(true) => ctx.set_trigger(name),
                ParameterValue::Trigger(false) => ctx.params_mut().reset_trigger(name),
            }
        }
    }
}

impl EventClip for ParameterSetClip {
    fn on_enter(&mut self, ctx: &mut ClipContext<'_>) -> Result<(), ClipError> {
        self.apply(Hook::Enter, ctx);
        Ok(())
    }

    fn on_tick(&mut self, ctx: &mut ClipContext<'_>) -> Result<(), ClipError> {
        self.apply(Hook::Tick, ctx);
        Ok(())
    }

    fn on_exit(&mut self, ctx: &mut ClipContext<'_>) -> Result<(), ClipError> {
        self.apply(Hook::Exit, ctx);
        Ok(())
    }
}
