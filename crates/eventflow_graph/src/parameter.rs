// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed parameters shared by every layer of a controller.
//!
//! Parameters live in one bucket per kind, so an `Int` and a `Float` may
//! share a name. Looking up a name that is not in the expected bucket is
//! never fatal: reads return the zero value and writes are ignored, both
//! with a warning.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterKind {
    /// Integer value
    Int,
    /// Floating point value
    Float,
    /// Boolean value
    Bool,
    /// Boolean that is consumed by the transition that fires on it
    Trigger,
}

impl ParameterKind {
    /// Display name used in diagnostics
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Int => "Int",
            Self::Float => "Float",
            Self::Bool => "Bool",
            Self::Trigger => "Trigger",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Value held by a parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    /// Integer
    Int(i32),
    /// Float
    Float(f32),
    /// Boolean
    Bool(bool),
    /// Trigger flag
    Trigger(bool),
}

impl ParameterValue {
    /// Get the kind of this value
    pub fn kind(&self) -> ParameterKind {
        match self {
            Self::Int(_) => ParameterKind::Int,
            Self::Float(_) => ParameterKind::Float,
            Self::Bool(_) => ParameterKind::Bool,
            Self::Trigger(_) => ParameterKind::Trigger,
        }
    }

    /// The zero value for a kind
    pub fn default_for(kind: ParameterKind) -> Self {
        match kind {
            ParameterKind::Int => Self::Int(0),
            ParameterKind::Float => Self::Float(0.0),
            ParameterKind::Bool => Self::Bool(false),
            ParameterKind::Trigger => Self::Trigger(false),
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) | Self::Trigger(v) => write!(f, "{v}"),
        }
    }
}

/// Declaration of a parameter with its initial value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescription {
    /// Parameter name
    pub name: String,
    /// Initial value (also determines the kind)
    pub value: ParameterValue,
}

impl ParameterDescription {
    /// Create a new declaration
    pub fn new(name: impl Into<String>, value: ParameterValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Declare an integer parameter
    pub fn int(name: impl Into<String>, value: i32) -> Self {
        Self::new(name, ParameterValue::Int(value))
    }

    /// Declare a float parameter
    pub fn float(name: impl Into<String>, value: f32) -> Self {
        Self::new(name, ParameterValue::Float(value))
    }

    /// Declare a bool parameter
    pub fn bool(name: impl Into<String>, value: bool) -> Self {
        Self::new(name, ParameterValue::Bool(value))
    }

    /// Declare a trigger, initially unset
    pub fn trigger(name: impl Into<String>) -> Self {
        Self::new(name, ParameterValue::Trigger(false))
    }
}

/// Named, typed parameter store
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    ints: IndexMap<String, i32>,
    floats: IndexMap<String, f32>,
    bools: IndexMap<String, bool>,
    triggers: IndexMap<String, bool>,
    /// Declaration order across all buckets
    order: Vec<(String, ParameterKind)>,
}

impl ParameterStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from declarations.
    ///
    /// The first declaration of a `(name, kind)` pair wins; later duplicates
    /// are ignored with a warning.
    pub fn from_descriptions<'a>(
        descriptions: impl IntoIterator<Item = &'a ParameterDescription>,
    ) -> Self {
        let mut store = Self::new();
        for description in descriptions {
            if !store.declare(&description.name, description.value) {
                tracing::warn!(
                    "Duplicate {} parameter '{}' ignored",
                    description.value.kind(),
                    description.name
                );
            }
        }
        store
    }

    /// Declare a parameter. Returns false if it already exists in its bucket.
    pub fn declare(&mut self, name: impl Into<String>, value: ParameterValue) -> bool {
        let name = name.into();
        if self.contains(&name, value.kind()) {
            return false;
        }
        self.order.push((name.clone(), value.kind()));
        match value {
            ParameterValue::Int(v) => {
                self.ints.insert(name, v);
            }
            ParameterValue::Float(v) => {
                self.floats.insert(name, v);
            }
            ParameterValue::Bool(v) => {
                self.bools.insert(name, v);
            }
            ParameterValue::Trigger(v) => {
                self.triggers.insert(name, v);
            }
        }
        true
    }

    /// Check if a parameter exists in the bucket for `kind`
    pub fn contains(&self, name: &str, kind: ParameterKind) -> bool {
        match kind {
            ParameterKind::Int => self.ints.contains_key(name),
            ParameterKind::Float => self.floats.contains_key(name),
            ParameterKind::Bool => self.bools.contains_key(name),
            ParameterKind::Trigger => self.triggers.contains_key(name),
        }
    }

    /// Get a value without logging, `None` if absent
    pub fn get(&self, name: &str, kind: ParameterKind) -> Option<ParameterValue> {
        match kind {
            ParameterKind::Int => self.ints.get(name).copied().map(ParameterValue::Int),
            ParameterKind::Float => self.floats.get(name).copied().map(ParameterValue::Float),
            ParameterKind::Bool => self.bools.get(name).copied().map(ParameterValue::Bool),
            ParameterKind::Trigger => self.triggers.get(name).copied().map(ParameterValue::Trigger),
        }
    }

    /// Set a value in the bucket matching its kind. Returns false if absent.
    pub fn set(&mut self, name: &str, value: ParameterValue) -> bool {
        let slot = match value {
            ParameterValue::Int(v) => self.ints.get_mut(name).map(|s| *s = v),
            ParameterValue::Float(v) => self.floats.get_mut(name).map(|s| *s = v),
            ParameterValue::Bool(v) => self.bools.get_mut(name).map(|s| *s = v),
            ParameterValue::Trigger(v) => self.triggers.get_mut(name).map(|s| *s = v),
        };
        slot.is_some()
    }

    /// Get an integer, 0 if missing
    pub fn get_int(&self, name: &str) -> i32 {
        match self.ints.get(name) {
            Some(v) => *v,
            None => {
                missing(name, ParameterKind::Int);
                0
            }
        }
    }

    /// Get a float, 0.0 if missing
    pub fn get_float(&self, name: &str) -> f32 {
        match self.floats.get(name) {
            Some(v) => *v,
            None => {
                missing(name, ParameterKind::Float);
                0.0
            }
        }
    }

    /// Get a bool, false if missing
    pub fn get_bool(&self, name: &str) -> bool {
        match self.bools.get(name) {
            Some(v) => *v,
            None => {
                missing(name, ParameterKind::Bool);
                false
            }
        }
    }

    /// Get the live flag of a trigger, false if missing
    pub fn get_trigger(&self, name: &str) -> bool {
        match self.triggers.get(name) {
            Some(v) => *v,
            None => {
                missing(name, ParameterKind::Trigger);
                false
            }
        }
    }

    /// Set an integer
    pub fn set_int(&mut self, name: &str, value: i32) {
        match self.ints.get_mut(name) {
            Some(slot) => *slot = value,
            None => missing(name, ParameterKind::Int),
        }
    }

    /// Set a float
    pub fn set_float(&mut self, name: &str, value: f32) {
        match self.floats.get_mut(name) {
            Some(slot) => *slot = value,
            None => missing(name, ParameterKind::Float),
        }
    }

    /// Set a bool
    pub fn set_bool(&mut self, name: &str, value: bool) {
        match self.bools.get_mut(name) {
            Some(slot) => *slot = value,
            None => missing(name, ParameterKind::Bool),
        }
    }

    /// Raise a trigger
    pub fn set_trigger(&mut self, name: &str) {
        self.write_trigger(name, true);
    }

    /// Clear a trigger
    pub fn reset_trigger(&mut self, name: &str) {
        self.write_trigger(name, false);
    }

    fn write_trigger(&mut self, name: &str, value: bool) {
        match self.triggers.get_mut(name) {
            Some(slot) => *slot = value,
            None => missing(name, ParameterKind::Trigger),
        }
    }

    /// Number of parameters across all buckets
    pub fn len(&self) -> usize {
        self.ints.len() + self.floats.len() + self.bools.len() + self.triggers.len()
    }

    /// Check if the store holds no parameters
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate all parameters in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, ParameterValue)> {
        self.order
            .iter()
            .filter_map(|(name, kind)| self.get(name, *kind).map(|value| (name.as_str(), value)))
    }
}

fn missing(name: &str, kind: ParameterKind) {
    tracing::warn!("{name}({kind}) was accessed, but it does not exist");
}
