// SPDX-License-Identifier: MIT OR Apache-2.0
//! A layer: one independent state machine over event nodes.
//!
//! Nodes are stored in an arena and transitions refer to them by
//! [`NodeIndex`], so self loops and cycles need no special handling.

use crate::clip::{FrameInfo, Hook};
use crate::config::HookFailurePolicy;
use crate::controller::{HookFailure, TickReport, TransitionRecord};
use crate::node::{EventNode, NodeIndex};
use crate::parameter::ParameterStore;
use serde::{Deserialize, Serialize};

/// Execution state of a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayerState {
    /// No current node; no hooks fire
    #[default]
    Idle,
    /// A transition was detected; the swap happens on the next step
    Transitioning {
        /// Node that becomes current on the next step
        pending: NodeIndex,
    },
    /// The current node runs its tick hook and scans its transitions
    Running,
}

impl LayerState {
    /// Display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Transitioning { .. } => "Transitioning",
            Self::Running => "Running",
        }
    }
}

/// Per-tick state threaded through every layer step
pub(crate) struct StepScope<'a> {
    pub params: &'a mut ParameterStore,
    pub frame: FrameInfo,
    pub policy: HookFailurePolicy,
    pub report: &'a mut TickReport,
}

/// One state machine of a controller
#[derive(Debug)]
pub struct Layer {
    name: String,
    nodes: Vec<EventNode>,
    entry: Option<NodeIndex>,
    current: Option<NodeIndex>,
    state: LayerState,
}

impl Layer {
    /// Create a layer from its nodes, validating the graph
    pub fn new(name: impl Into<String>, nodes: Vec<EventNode>) -> Result<Self, GraphError> {
        let name = name.into();
        let mut entry: Option<NodeIndex> = None;

        for (index, node) in nodes.iter().enumerate() {
            if node.entry {
                if let Some(first) = entry {
                    return Err(GraphError::MultipleEntries {
                        layer: name,
                        first: nodes[first.0].name.clone(),
                        second: node.name.clone(),
                    });
                }
                entry = Some(NodeIndex(index));
            }

            for (transition_index, transition) in node.transitions.iter().enumerate() {
                if let Some(target) = transition.target {
                    if target.0 >= nodes.len() {
                        return Err(GraphError::TargetOutOfRange {
                            layer: name,
                            node: node.name.clone(),
                            transition: transition_index,
                            target: target.0,
                            node_count: nodes.len(),
                        });
                    }
                }
            }
        }

        Ok(Self {
            name,
            nodes,
            entry,
            current: None,
            state: LayerState::Idle,
        })
    }

    /// Layer name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All nodes
    pub fn nodes(&self) -> &[EventNode] {
        &self.nodes
    }

    /// Get a node by index
    pub fn node(&self, index: NodeIndex) -> Option<&EventNode> {
        self.nodes.get(index.0)
    }

    /// Find a node by name
    pub fn node_by_name(&self, name: &str) -> Option<NodeIndex> {
        self.nodes.iter().position(|n| n.name == name).map(NodeIndex)
    }

    /// Entry node
    pub fn entry(&self) -> Option<NodeIndex> {
        self.entry
    }

    /// Current node index
    pub fn current(&self) -> Option<NodeIndex> {
        self.current
    }

    /// Current node
    pub fn current_node(&self) -> Option<&EventNode> {
        self.current.and_then(|index| self.node(index))
    }

    /// Node that becomes current on the next step
    pub fn pending(&self) -> Option<NodeIndex> {
        match self.state {
            LayerState::Transitioning { pending } => Some(pending),
            _ => None,
        }
    }

    /// Execution state
    pub fn state(&self) -> LayerState {
        self.state
    }

    /// Enter the entry node. A layer without one stays idle.
    pub(crate) fn activate(&mut self, scope: &mut StepScope<'_>) -> Result<(), HookFailure> {
        let Some(entry) = self.entry else {
            tracing::debug!(layer = %self.name, "Layer has no entry node, staying idle");
            self.state = LayerState::Idle;
            return Ok(());
        };

        self.current = Some(entry);
        self.state = LayerState::Running;
        tracing::debug!(layer = %self.name, node = %self.nodes[entry.0].name, "Layer activated");
        self.run_hook(entry, Hook::Enter, scope)
    }

    /// Advance the state machine by one tick
    pub(crate) fn step(&mut self, scope: &mut StepScope<'_>) -> Result<(), HookFailure> {
        match self.state {
            LayerState::Idle => Ok(()),
            LayerState::Transitioning { pending } => self.complete_transition(pending, scope),
            LayerState::Running => self.run_current(scope),
        }
    }

    fn complete_transition(
        &mut self,
        pending: NodeIndex,
        scope: &mut StepScope<'_>,
    ) -> Result<(), HookFailure> {
        let previous = self.current;
        if let Some(previous) = previous {
            self.run_hook(previous, Hook::Exit, scope)?;
        }

        self.current = Some(pending);
        self.state = LayerState::Running;

        let record = TransitionRecord {
            layer: self.name.clone(),
            from: previous.map(|index| self.nodes[index.0].name.clone()),
            to: self.nodes[pending.0].name.clone(),
        };
        tracing::debug!(layer = %record.layer, from = ?record.from, to = %record.to, "Transition activated");
        scope.report.activated.push(record);

        self.run_hook(pending, Hook::Enter, scope)
    }

    fn run_current(&mut self, scope: &mut StepScope<'_>) -> Result<(), HookFailure> {
        let Some(current) = self.current else {
            self.state = LayerState::Idle;
            return Ok(());
        };

        self.run_hook(current, Hook::Tick, scope)?;

        let node = &self.nodes[current.0];
        let fired = node
            .transitions
            .iter()
            .find_map(|t| t.fire(scope.params).map(|target| (t, target)));

        if let Some((transition, target)) = fired {
            for trigger in transition.triggers() {
                scope.report.consumed.insert(trigger.to_string());
            }
            let record = TransitionRecord {
                layer: self.name.clone(),
                from: Some(node.name.clone()),
                to: self.nodes[target.0].name.clone(),
            };
            tracing::debug!(layer = %record.layer, from = ?record.from, to = %record.to, "Transition detected");
            scope.report.detected.push(record);
            self.state = LayerState::Transitioning { pending: target };
        }

        Ok(())
    }

    fn run_hook(
        &mut self,
        index: NodeIndex,
        hook: Hook,
        scope: &mut StepScope<'_>,
    ) -> Result<(), HookFailure> {
        let node = &mut self.nodes[index.0];
        let Err(error) = node.run_hook(hook, scope.params, scope.frame, &self.name) else {
            return Ok(());
        };

        tracing::error!(layer = %self.name, node = %node.name, %hook, "Clip hook failed: {error}");
        let failure = HookFailure {
            layer: self.name.clone(),
            node: node.name.clone(),
            hook,
            message: error.to_string(),
        };
        match scope.policy {
            HookFailurePolicy::Isolate => {
                scope.report.failures.push(failure);
                Ok(())
            }
            HookFailurePolicy::Abort => Err(failure),
        }
    }
}

/// Error when a layer graph is malformed
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// More than one node is marked as entry
    #[error("Layer '{layer}' has more than one entry node: '{first}' and '{second}'")]
    MultipleEntries {
        /// Layer name
        layer: String,
        /// First entry node
        first: String,
        /// Second entry node
        second: String,
    },

    /// A transition points past the end of the node list
    #[error(
        "Transition {transition} of node '{node}' in layer '{layer}' targets node {target}, \
         but the layer has {node_count} nodes"
    )]
    TargetOutOfRange {
        /// Layer name
        layer: String,
        /// Source node
        node: String,
        /// Transition position in the node's list
        transition: usize,
        /// Requested target index
        target: usize,
        /// Number of nodes in the layer
        node_count: usize,
    },

    /// A named clip is not in the registry
    #[error("Node '{node}' in layer '{layer}' uses unknown clip '{clip}' (registered: {registered})")]
    UnknownClip {
        /// Layer name
        layer: String,
        /// Node name
        node: String,
        /// Clip name
        clip: String,
        /// Names available in the registry
        registered: String,
    },
}
