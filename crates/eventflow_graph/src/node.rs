// SPDX-License-Identifier: MIT OR Apache-2.0
//! Event nodes: the states of a layer.

use crate::clip::{ClipContext, ClipError, EventClip, FrameInfo, Hook};
use crate::clips::ClipDescription;
use crate::parameter::ParameterStore;
use crate::transition::Transition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node within its layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeIndex(pub usize);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A state of a layer, optionally bound to a clip
pub struct EventNode {
    /// Node name
    pub name: String,
    /// Whether the layer starts on this node
    pub entry: bool,
    /// Outgoing transitions, evaluated in order
    pub transitions: Vec<Transition>,
    clip: Option<Box<dyn EventClip>>,
    clip_source: Option<ClipDescription>,
}

impl EventNode {
    /// Create a node with no clip
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry: false,
            transitions: Vec::new(),
            clip: None,
            clip_source: None,
        }
    }

    /// Mark as the entry node
    pub fn as_entry(mut self) -> Self {
        self.entry = true;
        self
    }

    /// Bind a clip
    pub fn with_clip(mut self, clip: impl EventClip + 'static) -> Self {
        self.clip = Some(Box::new(clip));
        self
    }

    /// Bind an already boxed clip along with the description it was built from
    pub fn with_boxed_clip(
        mut self,
        clip: Box<dyn EventClip>,
        source: Option<ClipDescription>,
    ) -> Self {
        self.clip = Some(clip);
        self.clip_source = source;
        self
    }

    /// Add an outgoing transition
    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// The bound clip
    pub fn clip(&self) -> Option<&dyn EventClip> {
        self.clip.as_deref()
    }

    /// Description the clip was compiled from, if any
    pub fn clip_source(&self) -> Option<&ClipDescription> {
        self.clip_source.as_ref()
    }

    /// Status line of the clip
    pub fn message(&self) -> Option<String> {
        self.clip.as_ref().and_then(|clip| clip.message())
    }

    /// Run one hook of the clip. A node without a clip does nothing.
    pub fn run_hook(
        &mut self,
        hook: Hook,
        params: &mut ParameterStore,
        frame: FrameInfo,
        layer: &str,
    ) -> Result<(), ClipError> {
        let Some(clip) = self.clip.as_mut() else {
            return Ok(());
        };
        let mut ctx = ClipContext::new(params, frame, layer, &self.name);
        match hook {
            Hook::Enter => clip.on_enter(&mut ctx),
            Hook::Tick => clip.on_tick(&mut ctx),
            Hook::Exit => clip.on_exit(&mut ctx),
        }
    }
}

impl fmt::Debug for EventNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventNode")
            .field("name", &self.name)
            .field("entry", &self.entry)
            .field("transitions", &self.transitions)
            .field("has_clip", &self.clip.is_some())
            .field("clip_source", &self.clip_source)
            .finish()
    }
}
