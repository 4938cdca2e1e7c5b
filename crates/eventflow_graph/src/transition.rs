// SPDX-License-Identifier: MIT OR Apache-2.0
//! Guarded edges between event nodes.

use crate::condition::Condition;
use crate::node::NodeIndex;
use crate::parameter::{ParameterKind, ParameterStore};
use serde::{Deserialize, Serialize};

/// A transition out of an event node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Conditions that must all hold
    pub conditions: Vec<Condition>,
    /// Destination node in the owning layer, `None` if unwired
    pub target: Option<NodeIndex>,
}

impl Transition {
    /// Create a new transition
    pub fn new(target: Option<NodeIndex>, conditions: Vec<Condition>) -> Self {
        Self { conditions, target }
    }

    /// Unconditional transition to `target`
    pub fn always(target: NodeIndex) -> Self {
        Self::new(Some(target), Vec::new())
    }

    /// Add a condition
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Check if every condition holds. An empty list always holds.
    pub fn is_satisfied(&self, store: &ParameterStore) -> bool {
        self.conditions.iter().all(|c| c.evaluate(store))
    }

    /// Names of the triggers this transition consumes when it fires
    pub fn triggers(&self) -> impl Iterator<Item = &str> {
        self.conditions
            .iter()
            .filter(|c| c.kind() == ParameterKind::Trigger)
            .map(|c| c.parameter.as_str())
    }

    /// Check if this transition has no destination and can never fire
    pub fn is_inert(&self) -> bool {
        self.target.is_none()
    }

    /// Destination if the transition fires against `store`
    pub fn fire(&self, store: &ParameterStore) -> Option<NodeIndex> {
        let target = self.target?;
        self.is_satisfied(store).then_some(target)
    }
}
