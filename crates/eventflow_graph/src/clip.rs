// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clip behaviors bound to event nodes.
//!
//! A clip supplies the enter/tick/exit hooks of a node. Hooks receive a
//! [`ClipContext`] through which they read and write the controller's
//! parameters while the tick is running.

use crate::parameter::ParameterStore;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle hook of a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hook {
    /// Node became current
    Enter,
    /// Node is current during a tick
    Tick,
    /// Node stops being current
    Exit,
}

impl Hook {
    /// Display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Tick => "tick",
            Self::Exit => "exit",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Error raised by a clip hook
#[derive(Debug, thiserror::Error)]
pub enum ClipError {
    /// A parameter the clip needs is not declared
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// Custom error
    #[error("{0}")]
    Custom(String),

    /// Error from host code
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Behavior bound to an event node
pub trait EventClip: Send {
    /// Called when the node becomes current
    fn on_enter(&mut self, _ctx: &mut ClipContext<'_>) -> Result<(), ClipError> {
        Ok(())
    }

    /// Called on every tick the node is current and not transitioning
    fn on_tick(&mut self, _ctx: &mut ClipContext<'_>) -> Result<(), ClipError> {
        Ok(())
    }

    /// Called when the node stops being current
    fn on_exit(&mut self, _ctx: &mut ClipContext<'_>) -> Result<(), ClipError> {
        Ok(())
    }

    /// Short status line for inspectors
    fn message(&self) -> Option<String> {
        None
    }
}

/// Clock values of the tick a hook runs in
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInfo {
    /// Ticks completed before this one
    pub frame: u64,
    /// Elapsed controller time in seconds
    pub time: f32,
}

/// Access to the controller from inside a hook
pub struct ClipContext<'a> {
    params: &'a mut ParameterStore,
    frame: FrameInfo,
    layer: &'a str,
    node: &'a str,
}

impl<'a> ClipContext<'a> {
    /// Create a new context
    pub fn new(
        params: &'a mut ParameterStore,
        frame: FrameInfo,
        layer: &'a str,
        node: &'a str,
    ) -> Self {
        Self {
            params,
            frame,
            layer,
            node,
        }
    }

    /// Elapsed controller time in seconds
    pub fn time(&self) -> f32 {
        self.frame.time
    }

    /// Tick counter
    pub fn frame(&self) -> u64 {
        self.frame.frame
    }

    /// Name of the layer running the hook
    pub fn layer(&self) -> &str {
        self.layer
    }

    /// Name of the node running the hook
    pub fn node(&self) -> &str {
        self.node
    }

    /// The parameter store
    pub fn params(&self) -> &ParameterStore {
        &*self.params
    }

    /// The parameter store, mutably
    pub fn params_mut(&mut self) -> &mut ParameterStore {
        &mut *self.params
    }

    /// Get an integer parameter
    pub fn get_int(&self, name: &str) -> i32 {
        self.params.get_int(name)
    }

    /// Get a float parameter
    pub fn get_float(&self, name: &str) -> f32 {
        self.params.get_float(name)
    }

    /// Get a bool parameter
    pub fn get_bool(&self, name: &str) -> bool {
        self.params.get_bool(name)
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
}

type ClipFactory = Box<dyn Fn() -> Box<dyn EventClip> + Send + Sync>;

/// Named clip factories resolved when a description is compiled
#[derive(Default)]
pub struct ClipRegistry {
    factories: IndexMap<String, ClipFactory>,
}

impl ClipRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`, replacing any previous one
    pub fn register<F, C>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: EventClip + 'static,
    {
        self.factories
            .insert(name.into(), Box::new(move || Box::new(factory()) as Box<dyn EventClip>));
    }

    /// Check if a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Create a clip by name
    pub fn create(&self, name: &str) -> Option<Box<dyn EventClip>> {
        self.factories.get(name).map(|factory| factory())
    }

    /// Registered names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl fmt::Debug for ClipRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipRegistry")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
