// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tick simulation for the `run` command.

use anyhow::{anyhow, bail, Context, Result};
use eventflow_graph::{Controller, ControllerSnapshot, ParameterKind, ParameterValue, TickReport};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// How tick output is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One human-readable block per tick
    Text,
    /// One JSON object per tick
    Json,
}

/// Settings of a simulation run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Ticks to run
    pub ticks: u64,
    /// Seconds per tick; `None` uses the controller's fixed step
    pub step: Option<f32>,
    /// Output format
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct TickLine<'a> {
    report: &'a TickReport,
    snapshot: &'a ControllerSnapshot,
}

/// A controller plus the triggers scheduled for specific ticks
pub struct Simulation {
    controller: Controller,
    schedule: BTreeMap<u64, Vec<String>>,
}

impl Simulation {
    /// Create a simulation from `NAME@TICK` trigger arguments
    pub fn new(controller: Controller, triggers: &[String]) -> Result<Self> {
        let mut schedule: BTreeMap<u64, Vec<String>> = BTreeMap::new();
        for argument in triggers {
            let (name, tick) = argument
                .rsplit_once('@')
                .ok_or_else(|| anyhow!("expected NAME@TICK, got '{argument}'"))?;
            let tick: u64 = tick
                .parse()
                .with_context(|| format!("invalid tick in '{argument}'"))?;
            if !controller.params().contains(name, ParameterKind::Trigger) {
                bail!("'{name}' is not a declared trigger");
            }
            schedule.entry(tick).or_default().push(name.to_string());
        }
        Ok(Self {
            controller,
            schedule,
        })
    }

    /// The simulated controller
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Start the controller and run `options.ticks` ticks, printing each one
    pub fn run(&mut self, options: &RunOptions, out: &mut impl Write) -> Result<()> {
        let report = self.controller.start()?;
        self.print(&report, options.format, out)?;

        for _ in 0..options.ticks {
            let frame = self.controller.frame();
            if let Some(names) = self.schedule.get(&frame) {
                for name in names {
                    self.controller.set_trigger(name);
                }
            }

            let report = match options.step {
                Some(step) => self.controller.tick_with_delta(step)?,
                None => self.controller.tick()?,
            };
            self.print(&report, options.format, out)?;
        }
        Ok(())
    }

    fn print(&self, report: &TickReport, format: OutputFormat, out: &mut impl Write) -> Result<()> {
        let snapshot = self.controller.snapshot();
        match format {
            OutputFormat::Json => {
                let line = TickLine {
                    report,
                    snapshot: &snapshot,
                };
                writeln!(out, "{}", serde_json::to_string(&line)?)?;
            }
            OutputFormat::Text => write_text(report, &snapshot, out)?,
        }
        Ok(())
    }
}

fn write_text(report: &TickReport, snapshot: &ControllerSnapshot, out: &mut impl Write) -> Result<()> {
    writeln!(out, "[frame {} t={:.3}]", report.frame, snapshot.time)?;
    for layer in &snapshot.layers {
        let current = layer.current.as_deref().unwrap_or("-");
        match &layer.pending {
            Some(pending) => writeln!(out, "  {}: {} -> {} ({})", layer.name, current, pending, layer.state)?,
            None => writeln!(out, "  {}: {} ({})", layer.name, current, layer.state)?,
        }
        if let Some(message) = layer.message.as_deref().map(str::trim_end).filter(|m| !m.is_empty()) {
            writeln!(out, "    {message}")?;
        }
    }
    if !report.consumed.is_empty() {
        let consumed: Vec<&str> = report.consumed.iter().map(String::as_str).collect();
        writeln!(out, "  consumed: {}", consumed.join(", "))?;
    }
    for failure in &report.failures {
        writeln!(out, "  failed: {failure}")?;
    }
    Ok(())
}

/// Apply `NAME=VALUE` assignments, parsing each value by the parameter's kind
pub fn apply_assignments(controller: &mut Controller, assignments: &[String]) -> Result<()> {
    for assignment in assignments {
        let (name, raw) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("expected NAME=VALUE, got '{assignment}'"))?;
        let value = parse_value(controller, name, raw)?;
        controller.params_mut().set(name, value);
    }
    Ok(())
}

fn parse_value(controller: &Controller, name: &str, raw: &str) -> Result<ParameterValue> {
    let kinds: Vec<ParameterKind> = [
        ParameterKind::Int,
        ParameterKind::Float,
        ParameterKind::Bool,
        ParameterKind::Trigger,
    ]
    .into_iter()
    .filter(|kind| controller.params().contains(name, *kind))
    .collect();

    let kind = match kinds.as_slice() {
        [] => bail!("unknown parameter '{name}'"),
        [kind] => *kind,
        _ => bail!("parameter '{name}' is declared with several kinds"),
    };

    let value = match kind {
        ParameterKind::Int => ParameterValue::Int(
            raw.parse()
                .with_context(|| format!("'{raw}' is not an integer"))?,
        ),
        ParameterKind::Float => ParameterValue::Float(
            raw.parse()
                .with_context(|| format!("'{raw}' is not a number"))?,
        ),
        ParameterKind::Bool => ParameterValue::Bool(
            raw.parse()
                .with_context(|| format!("'{raw}' is not true or false"))?,
        ),
        ParameterKind::Trigger => ParameterValue::Trigger(
            raw.parse()
                .with_context(|| format!("'{raw}' is not true or false"))?,
        ),
    };
    Ok(value)
}
