// SPDX-License-Identifier: MIT OR Apache-2.0
//! Single-parameter predicates used to guard transitions.

use crate::parameter::{ParameterKind, ParameterStore, ParameterValue};
use serde::{Deserialize, Serialize};

/// Comparison used by numeric conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    /// `value > judge`
    Greater,
    /// `value < judge`
    Less,
    /// `value == judge`
    Equals,
    /// `value != judge`
    NotEquals,
}

impl CompareOp {
    /// Apply the comparison. Float equality is exact.
    #[allow(clippy::float_cmp)]
    pub fn apply<T: PartialOrd>(&self, value: T, judge: T) -> bool {
        match self {
            Self::Greater => value > judge,
            Self::Less => value < judge,
            Self::Equals => value == judge,
            Self::NotEquals => value != judge,
        }
    }
}

/// Typed predicate of a condition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Compare an integer parameter
    Int(CompareOp, i32),
    /// Compare a float parameter
    Float(CompareOp, f32),
    /// Bool parameter equals the judge
    Bool(bool),
    /// Trigger flag equals the judge
    Trigger(bool),
}

impl Predicate {
    /// Kind of parameter this predicate reads
    pub fn kind(&self) -> ParameterKind {
        match self {
            Self::Int(..) => ParameterKind::Int,
            Self::Float(..) => ParameterKind::Float,
            Self::Bool(_) => ParameterKind::Bool,
            Self::Trigger(_) => ParameterKind::Trigger,
        }
    }
}

/// A condition on one parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Parameter name
    pub parameter: String,
    /// Predicate applied to the parameter value
    pub predicate: Predicate,
}

impl Condition {
    /// Create a new condition
    pub fn new(parameter: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            parameter: parameter.into(),
            predicate,
        }
    }

    /// Integer comparison
    pub fn int(parameter: impl Into<String>, op: CompareOp, judge: i32) -> Self {
        Self::new(parameter, Predicate::Int(op, judge))
    }

    /// Float comparison
    pub fn float(parameter: impl Into<String>, op: CompareOp, judge: f32) -> Self {
        Self::new(parameter, Predicate::Float(op, judge))
    }

    /// Bool equality
    pub fn bool(parameter: impl Into<String>, judge: bool) -> Self {
        Self::new(parameter, Predicate::Bool(judge))
    }

    /// Trigger is raised
    pub fn trigger(parameter: impl Into<String>) -> Self {
        Self::new(parameter, Predicate::Trigger(true))
    }

    /// Kind of parameter this condition reads
    pub fn kind(&self) -> ParameterKind {
        self.predicate.kind()
    }

    /// Evaluate against the store.
    ///
    /// A parameter missing from the expected bucket makes the condition false.
    pub fn evaluate(&self, store: &ParameterStore) -> bool {
        let Some(value) = store.get(&self.parameter, self.kind()) else {
            tracing::debug!(
                "Condition on missing {} parameter '{}' evaluates false",
                self.kind(),
                self.parameter
            );
            return false;
        };
        match (self.predicate, value) {
            (Predicate::Int(op, judge), ParameterValue::Int(v)) => op.apply(v, judge),
            (Predicate::Float(op, judge), ParameterValue::Float(v)) => op.apply(v, judge),
            (Predicate::Bool(judge), ParameterValue::Bool(v))
            | (Predicate::Trigger(judge), ParameterValue::Trigger(v)) => v == judge,
            _ => false,
        }
    }
}
