// SPDX-License-Identifier: MIT OR Apache-2.0
//! Serializable graph descriptions and their compilation into controllers.
//!
//! A description is what authoring tools produce: parameters with initial
//! values and, per layer, a node list whose transitions point at other nodes
//! by index. [`Controller::compile`] validates it and builds the live graph;
//! [`Controller::describe`] derives it back.

use crate::clip::ClipRegistry;
use crate::clips::ClipDescription;
use crate::config::ControllerConfig;
use crate::controller::Controller;
use crate::layer::{GraphError, Layer};
use crate::node::EventNode;
use crate::parameter::{ParameterDescription, ParameterStore};
use crate::transition::Transition;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Description of one event node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    /// Node name
    pub name: String,
    /// Whether the layer starts on this node
    #[serde(default)]
    pub entry: bool,
    /// Clip bound to the node
    #[serde(default)]
    pub clip: Option<ClipDescription>,
    /// Outgoing transitions in evaluation order
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

impl NodeDescription {
    /// Create a node description with no clip and no transitions
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry: false,
            clip: None,
            transitions: Vec::new(),
        }
    }

    /// Mark as entry
    pub fn as_entry(mut self) -> Self {
        self.entry = true;
        self
    }

    /// Bind a clip
    pub fn with_clip(mut self, clip: ClipDescription) -> Self {
        self.clip = Some(clip);
        self
    }

    /// Add a transition
    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }
}

/// Description of one layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDescription {
    /// Layer name
    pub name: String,
    /// Nodes; transitions refer to them by position
    #[serde(default)]
    pub nodes: Vec<NodeDescription>,
}

impl LayerDescription {
    /// Create a layer description
    pub fn new(name: impl Into<String>, nodes: Vec<NodeDescription>) -> Self {
        Self {
            name: name.into(),
            nodes,
        }
    }
}

/// Description of a whole controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerDescription {
    /// Controller label
    #[serde(default = "default_label")]
    pub label: String,
    /// Runtime settings
    #[serde(default)]
    pub config: ControllerConfig,
    /// Parameter declarations
    #[serde(default)]
    pub parameters: Vec<ParameterDescription>,
    /// Layers in step order
    #[serde(default)]
    pub layers: Vec<LayerDescription>,
}

fn default_label() -> String {
    "(none)".to_string()
}

impl Default for ControllerDescription {
    fn default() -> Self {
        Self {
            label: default_label(),
            config: ControllerConfig::default(),
            parameters: Vec::new(),
            layers: Vec::new(),
        }
    }
}

impl ControllerDescription {
    /// Create an empty description
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Parse from RON text
    pub fn from_ron(source: &str) -> Result<Self, DescriptionError> {
        Ok(ron::from_str(source)?)
    }

    /// Serialize to pretty RON text
    pub fn to_ron(&self) -> Result<String, DescriptionError> {
        let config = ron::ser::PrettyConfig::default()
            .depth_limit(8)
            .indentor("    ".to_string());
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load from a RON file
    pub fn load(path: &Path) -> Result<Self, DescriptionError> {
        let content = std::fs::read_to_string(path).map_err(|source| DescriptionError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron(&content)
    }

    /// Save to a RON file
    pub fn save(&self, path: &Path) -> Result<(), DescriptionError> {
        let content = self.to_ron()?;
        std::fs::write(path, content).map_err(|source| DescriptionError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Total number of nodes over all layers
    pub fn node_count(&self) -> usize {
        self.layers.iter().map(|l| l.nodes.len()).sum()
    }
}

impl Controller {
    /// Build a controller from a description.
    ///
    /// Fails on malformed graphs: an out-of-range transition target, more than
    /// one entry node in a layer, or a named clip missing from `registry`.
    /// Conditions naming undeclared parameters are accepted with a warning and
    /// evaluate to false at runtime.
    pub fn compile(
        description: &ControllerDescription,
        registry: &ClipRegistry,
    ) -> Result<Self, GraphError> {
        let params = ParameterStore::from_descriptions(&description.parameters);

        let mut layers = Vec::with_capacity(description.layers.len());
        for layer in &description.layers {
            let mut nodes = Vec::with_capacity(layer.nodes.len());
            for node in &layer.nodes {
                let mut event_node = EventNode::new(node.name.clone());
                event_node.entry = node.entry;
                event_node.transitions = node.transitions.clone();

                if let Some(clip) = &node.clip {
                    let built = clip.build(registry).ok_or_else(|| GraphError::UnknownClip {
                        layer: layer.name.clone(),
                        node: node.name.clone(),
                        clip: match clip {
                            ClipDescription::Named(name) => name.clone(),
                            other => format!("{other:?}"),
                        },
                        registered: registered_names(registry),
                    })?;
                    event_node = event_node.with_boxed_clip(built, Some(clip.clone()));
                }

                for condition in node.transitions.iter().flat_map(|t| &t.conditions) {
                    if !params.contains(&condition.parameter, condition.kind()) {
                        tracing::warn!(
                            "Node '{}' in layer '{}' tests undeclared {} parameter '{}'",
                            node.name,
                            layer.name,
                            condition.kind(),
                            condition.parameter
                        );
                    }
                }
                nodes.push(event_node);
            }
            layers.push(Layer::new(layer.name.clone(), nodes)?);
        }

        Ok(Self::new(
            description.label.clone(),
            params,
            layers,
            description.config.clone(),
        ))
    }

    /// Derive the description of this controller.
    ///
    /// Parameters carry their current values, so describing a controller that
    /// has not ticked yet yields the description it was compiled from.
    pub fn describe(&self) -> ControllerDescription {
        let layers = self
            .layers()
            .iter()
            .map(|layer| LayerDescription {
                name: layer.name().to_string(),
                nodes: layer
                    .nodes()
                    .iter()
                    .map(|node| NodeDescription {
                        name: node.name.clone(),
                        entry: node.entry,
                        clip: node.clip_source().cloned(),
                        transitions: node.transitions.clone(),
                    })
                    .collect(),
            })
            .collect();

        ControllerDescription {
            label: self.label().to_string(),
            config: self.config().clone(),
            parameters: self
                .params()
                .iter()
                .map(|(name, value)| ParameterDescription::new(name, value))
                .collect(),
            layers,
        }
    }
}

fn registered_names(registry: &ClipRegistry) -> String {
    let names: Vec<&str> = registry.names().collect();
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

/// Error when loading or saving a description
#[derive(Debug, thiserror::Error)]
pub enum DescriptionError {
    /// File could not be read or written
    #[error("Failed to access {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// RON text could not be parsed
    #[error("Invalid description: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Description could not be serialized
    #[error("Failed to serialize description: {0}")]
    Serialize(#[from] ron::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{CompareOp, Condition};
    use crate::node::NodeIndex;

    const DOOR: &str = r#"(
        label: "door",
        config: (fixed_step: 0.5),
        parameters: [
            (name: "score", value: Int(0)),
            (name: "Go", value: Trigger(false)),
        ],
        layers: [
            (
                name: "Base",
                nodes: [
                    (
                        name: "Closed",
                        entry: true,
                        clip: Some(Log),
                        transitions: [
                            (
                                conditions: [(parameter: "score", predicate: Int(Greater, 10))],
                                target: Some(1),
                            ),
                        ],
                    ),
                    (name: "Open", transitions: [(conditions: [], target: None)]),
                ],
            ),
        ],
    )"#;

    #[test]
    fn test_parse_ron() {
        let description = ControllerDescription::from_ron(DOOR).unwrap();
        assert_eq!(description.label, "door");
        assert_eq!(description.config.fixed_step, 0.5);
        assert_eq!(description.node_count(), 2);
        let closed = &description.layers[0].nodes[0];
        assert_eq!(closed.clip, Some(ClipDescription::Log));
        assert_eq!(
            closed.transitions[0],
            Transition::always(NodeIndex(1))
                .with_condition(Condition::int("score", CompareOp::Greater, 10))
        );
    }

    #[test]
    fn test_compile_rejects_unknown_clip() {
        let description = ControllerDescription {
            layers: vec![LayerDescription::new(
                "Base",
                vec![NodeDescription::new("A").with_clip(ClipDescription::Named("door".into()))],
            )],
            ..ControllerDescription::default()
        };
        let err = Controller::compile(&description, &ClipRegistry::new()).unwrap_err();
        assert!(matches!(err, GraphError::UnknownClip { ref clip, ref registered, .. }
            if clip == "door" && registered == "none"));

        let mut registry = ClipRegistry::new();
        registry.register("bell", || crate::clips::LogClip);
        registry.register("chime", || crate::clips::LogClip);
        let err = Controller::compile(&description, &registry).unwrap_err();
        assert!(err.to_string().ends_with("unknown clip 'door' (registered: bell, chime)"));
    }

    #[test]
    fn test_compile_rejects_bad_target() {
        let description = ControllerDescription {
            layers: vec![LayerDescription::new(
                "Base",
                vec![NodeDescription::new("A").with_transition(Transition::always(NodeIndex(5)))],
            )],
            ..ControllerDescription::default()
        };
        assert!(Controller::compile(&description, &ClipRegistry::new()).is_err());
    }

    #[test]
    fn test_describe_keeps_parameter_order() {
        let description = ControllerDescription {
            parameters: vec![
                ParameterDescription::trigger("Go"),
                ParameterDescription::int("score", 4),
                ParameterDescription::bool("open", true),
                ParameterDescription::float("score", 0.25),
            ],
            layers: vec![LayerDescription::new(
                "Base",
                vec![NodeDescription::new("A")
                    .as_entry()
                    .with_transition(Transition::always(NodeIndex(0)).with_condition(Condition::trigger("Go")))],
            )],
            ..ControllerDescription::default()
        };
        let controller = Controller::compile(&description, &ClipRegistry::new()).unwrap();
        assert_eq!(controller.describe(), description);
    }

    #[test]
    fn test_ron_text_round_trip() {
        let description = ControllerDescription::from_ron(DOOR).unwrap();
        let text = description.to_ron().unwrap();
        assert_eq!(ControllerDescription::from_ron(&text).unwrap(), description);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("door.ron");
        let description = ControllerDescription::from_ron(DOOR).unwrap();
        description.save(&path).unwrap();
        assert_eq!(ControllerDescription::load(&path).unwrap(), description);

        let missing = ControllerDescription::load(&dir.path().join("missing.ron"));
        assert!(matches!(missing, Err(DescriptionError::Io { .. })));
    }
}
