// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clip that logs its hooks.

use crate::clip::{ClipContext, ClipError, EventClip};

/// Logs every hook at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogClip;

impl EventClip for LogClip {
    fn on_enter(&mut self, ctx: &mut ClipContext<'_>) -> Result<(), ClipError> {
        tracing::info!(layer = ctx.layer(), node = ctx.node(), frame = ctx.frame(), "enter");
        Ok(())
    }

    fn on_tick(&mut self, ctx: &mut ClipContext<'_>) -> Result<(), ClipError> {
        tracing::info!(layer = ctx.layer(), node = ctx.node(), frame = ctx.frame(), "tick");
        Ok(())
    }

    fn on_exit(&mut self, ctx: &mut ClipContext<'_>) -> Result<(), ClipError> {
        tracing::info!(layer = ctx.layer(), node = ctx.node(), frame = ctx.frame(), "exit");
        Ok(())
    }
}
