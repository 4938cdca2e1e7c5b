// SPDX-License-Identifier: MIT OR Apache-2.0
//! The controller: owns every layer and the shared parameter store.
//!
//! A tick steps each layer in order. Triggers consumed by firing transitions
//! are collected during the tick and reset only after every layer has been
//! stepped, so all layers see the same trigger values within a tick.

use crate::clip::{FrameInfo, Hook};
use crate::config::ControllerConfig;
use crate::layer::{Layer, LayerState, StepScope};
use crate::parameter::{ParameterStore, ParameterValue};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A transition detected or activated during a tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Layer name
    pub layer: String,
    /// Source node, `None` only for an activation without a previous node
    pub from: Option<String>,
    /// Destination node
    pub to: String,
}

/// A clip hook that returned an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookFailure {
    /// Layer name
    pub layer: String,
    /// Node name
    pub node: String,
    /// Failing hook
    pub hook: Hook,
    /// Error message
    pub message: String,
}

impl fmt::Display for HookFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Clip {} hook of node '{}' in layer '{}' failed: {}",
            self.hook, self.node, self.layer, self.message
        )
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number, starting at 0
    pub frame: u64,
    /// Transitions detected this tick (activated on the next one)
    pub detected: Vec<TransitionRecord>,
    /// Transitions completed this tick
    pub activated: Vec<TransitionRecord>,
    /// Triggers reset at the end of the tick
    pub consumed: IndexSet<String>,
    /// Hook failures isolated this tick
    pub failures: Vec<HookFailure>,
}

/// Error returned by the controller
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// A hook failed under [`HookFailurePolicy::Abort`](crate::config::HookFailurePolicy::Abort)
    #[error("{0}")]
    Hook(HookFailure),
}

/// State of one layer for inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSnapshot {
    /// Layer name
    pub name: String,
    /// Execution state name
    pub state: String,
    /// Current node
    pub current: Option<String>,
    /// Node pending activation
    pub pending: Option<String>,
    /// Status line of the current node's clip
    pub message: Option<String>,
}

/// State of a controller for inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    /// Controller label
    pub label: String,
    /// Ticks completed
    pub frame: u64,
    /// Elapsed seconds
    pub time: f32,
    /// Layers in order
    pub layers: Vec<LayerSnapshot>,
    /// Every parameter with its current value
    pub parameters: Vec<(String, ParameterValue)>,
}

/// Drives a set of layers over a shared parameter store
#[derive(Debug)]
pub struct Controller {
    label: String,
    layers: Vec<Layer>,
    params: ParameterStore,
    config: ControllerConfig,
    started: bool,
    frame: u64,
    time: f32,
}

impl Controller {
    /// Create a controller from already built layers
    pub fn new(
        label: impl Into<String>,
        params: ParameterStore,
        layers: Vec<Layer>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            label: label.into(),
            layers,
            params,
            config,
            started: false,
            frame: 0,
            time: 0.0,
        }
    }

    /// Controller label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Runtime settings
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Layers in step order
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Find a layer by name
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name() == name)
    }

    /// The parameter store
    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    /// The parameter store, mutably
    pub fn params_mut(&mut self) -> &mut ParameterStore {
        &mut self.params
    }

    /// Whether [`start`](Self::start) has run
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Ticks completed
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Elapsed seconds
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Enter the entry node of every layer. Runs once; later calls are ignored.
    pub fn start(&mut self) -> Result<TickReport, ControllerError> {
        let mut report = TickReport {
            frame: self.frame,
            ..TickReport::default()
        };
        if self.started {
            tracing::warn!("Controller '{}' already started", self.label);
            return Ok(report);
        }
        self.started = true;
        tracing::info!("Starting controller '{}' with {} layers", self.label, self.layers.len());

        let mut scope = StepScope {
            params: &mut self.params,
            frame: FrameInfo {
                frame: self.frame,
                time: self.time,
            },
            policy: self.config.hook_failure_policy,
            report: &mut report,
        };
        for layer in &mut self.layers {
            layer.activate(&mut scope).map_err(ControllerError::Hook)?;
        }
        Ok(report)
    }

    /// Advance every layer by one tick of `fixed_step` seconds
    pub fn tick(&mut self) -> Result<TickReport, ControllerError> {
        self.tick_with_delta(self.config.fixed_step)
    }

    /// Advance every layer by one tick of `delta` seconds
    pub fn tick_with_delta(&mut self, delta: f32) -> Result<TickReport, ControllerError> {
        if !self.started {
            tracing::debug!("Controller '{}' ticked before start", self.label);
        }
        self.time += delta;
        let mut report = TickReport {
            frame: self.frame,
            ..TickReport::default()
        };

        let mut scope = StepScope {
            params: &mut self.params,
            frame: FrameInfo {
                frame: self.frame,
                time: self.time,
            },
            policy: self.config.hook_failure_policy,
            report: &mut report,
        };
        let mut outcome = Ok(());
        for layer in &mut self.layers {
            if let Err(failure) = layer.step(&mut scope) {
                outcome = Err(ControllerError::Hook(failure));
                break;
            }
        }

        // Consumed triggers are reset only once every layer has been stepped
        for trigger in &report.consumed {
            self.params.reset_trigger(trigger);
        }
        self.frame += 1;

        outcome.map(|()| report)
    }

    /// Inspect the current state
    pub fn snapshot(&self) -> ControllerSnapshot {
        let layers = self
            .layers
            .iter()
            .map(|layer| LayerSnapshot {
                name: layer.name().to_string(),
                state: layer.state().display_name().to_string(),
                current: layer.current_node().map(|n| n.name.clone()),
                pending: layer
                    .pending()
                    .and_then(|index| layer.node(index))
                    .map(|n| n.name.clone()),
                message: layer.current_node().and_then(|n| n.message()),
            })
            .collect();

        ControllerSnapshot {
            label: self.label.clone(),
            frame: self.frame,
            time: self.time,
            layers,
            parameters: self
                .params
                .iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    /// Current state of a layer by name
    pub fn layer_state(&self, name: &str) -> Option<LayerState> {
        self.layer(name).map(Layer::state)
    }

    /// Name of the current node of a layer
    pub fn current_node_name(&self, layer: &str) -> Option<&str> {
        self.layer(layer)
            .and_then(Layer::current_node)
            .map(|n| n.name.as_str())
    }

    /// Get an integer parameter, 0 if missing
    pub fn get_int(&self, name: &str) -> i32 {
        self.params.get_int(name)
    }

    /// Get a float parameter, 0.0 if missing
    pub fn get_float(&self, name: &str) -> f32 {
        self.params.get_float(name)
    }

    /// Get a bool parameter, false if missing
    pub fn get_bool(&self, name: &str) -> bool {
        self.params.get_bool(name)
    }

    /// Get the live flag of a trigger, false if missing
    pub fn get_trigger(&self, name: &str) -> bool {
        self.params.get_trigger(name)
    }

    /// Set an integer parameter
    pub fn set_int(&mut self, name: &str, value: i32) {
        self.params.set_int(name, value);
    }

    /// Set a float parameter
    pub fn set_float(&mut self, name: &str, value: f32) {
        self.params.set_float(name, value);
    }

    /// Set a bool parameter
    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.params.set_bool(name, value);
    }

    /// Raise a trigger
    pub fn set_trigger(&mut self, name: &str) {
        self.params.set_trigger(name);
    }

    /// Clear a trigger
    pub fn reset_trigger(&mut self, name: &str) {
        self.params.reset_trigger(name);
    }
}
