// SPDX-License-Identifier: MIT OR Apache-2.0
//! Layered event-node state machines for `EventFlow`.
//!
//! A [`Controller`] owns a set of independent [`Layer`]s and one shared
//! [`ParameterStore`]. Each layer is a state machine over [`EventNode`]s;
//! nodes run [`EventClip`] hooks and leave through guarded [`Transition`]s.
//!
//! ## Ticks
//!
//! - A running layer calls its current node's tick hook, then takes the
//!   first satisfied transition in declaration order.
//! - The exit/enter swap happens at the start of the following tick, so a
//!   node always dwells at least one tick.
//! - Triggers consumed by firing transitions are reset after every layer
//!   has been stepped.
//!
//! Graphs are authored as a [`ControllerDescription`] (RON) and compiled
//! with [`Controller::compile`].

pub mod parameter;
pub mod condition;
pub mod transition;
pub mod clip;
pub mod clips;
pub mod node;
pub mod layer;
pub mod config;
pub mod controller;
pub mod description;
pub mod shared;

pub use parameter::{ParameterDescription, ParameterKind, ParameterStore, ParameterValue};
pub use condition::{CompareOp, Condition, Predicate};
pub use transition::Transition;
pub use clip::{ClipContext, ClipError, ClipRegistry, EventClip, Hook};
pub use clips::ClipDescription;
pub use node::{EventNode, NodeIndex};
pub use layer::{GraphError, Layer, LayerState};
pub use config::{ControllerConfig, HookFailurePolicy};
pub use controller::{Controller, ControllerError, ControllerSnapshot, HookFailure, TickReport};
pub use description::{ControllerDescription, DescriptionError, LayerDescription, NodeDescription};
pub use shared::SharedController;
