// SPDX-License-Identifier: MIT OR Apache-2.0
//! Thread-safe handle to a controller.
//!
//! Every operation takes the same lock, so a whole tick (layer steps and the
//! trigger reset that follows them) is one exclusive section and other
//! threads never observe a partially reset set of triggers.

use crate::controller::{Controller, ControllerError, ControllerSnapshot, TickReport};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Shared, lockable controller
#[derive(Debug, Clone)]
pub struct SharedController {
    inner: Arc<Mutex<Controller>>,
}

impl SharedController {
    /// Wrap a controller
    pub fn new(controller: Controller) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    /// Lock the controller for several operations at once
    pub fn lock(&self) -> MutexGuard<'_, Controller> {
        self.inner.lock()
    }

    /// Run [`Controller::start`] under the lock
    pub fn start(&self) -> Result<TickReport, ControllerError> {
        self.inner.lock().start()
    }

    /// Run [`Controller::tick`] under the lock
    pub fn tick(&self) -> Result<TickReport, ControllerError> {
        self.inner.lock().tick()
    }

    /// Inspect the controller
    pub fn snapshot(&self) -> ControllerSnapshot {
        self.inner.lock().snapshot()
    }

    /// Get an integer parameter
    pub fn get_int(&self, name: &str) -> i32 {
        self.inner.lock().get_int(name)
    }

    /// Get a float parameter
    pub fn get_float(&self, name: &str) -> f32 {
        self.inner.lock().get_float(name)
    }

    /// Get a bool parameter
    pub fn get_bool(&self, name: &str) -> bool {
        self.inner.lock().get_bool(name)
    }

    /// Set an integer parameter
    pub fn set_int(&self, name: &str, value: i32) {
        self.inner.lock().set_int(name, value);
    }

    /// Set a float parameter
    pub fn set_float(&self, name: &str, value: f32) {
        self.inner.lock().set_float(name, value);
    }

    /// Set a bool parameter
    pub fn set_bool(&self, name: &str, value: bool) {
        self.inner.lock().set_bool(name, value);
    }

    /// Raise a trigger
    pub fn set_trigger(&self, name: &str) {
        self.inner.lock().set_trigger(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::ClipRegistry;
    use crate::condition::Condition;
    use crate::description::{ControllerDescription, LayerDescription, NodeDescription};
    use crate::node::NodeIndex;
    use crate::parameter::ParameterDescription;
    use crate::transition::Transition;
    use std::thread;

    #[test]
    fn test_trigger_from_another_thread() {
        let description = ControllerDescription {
            parameters: vec![ParameterDescription::trigger("Go")],
            layers: vec![LayerDescription::new(
                "Base",
                vec![
                    NodeDescription::new("A")
                        .as_entry()
                        .with_transition(Transition::always(NodeIndex(1)).with_condition(Condition::trigger("Go"))),
                    NodeDescription::new("B"),
                ],
            )],
            ..ControllerDescription::default()
        };
        let shared =
            SharedController::new(Controller::compile(&description, &ClipRegistry::new()).unwrap());
        shared.start().unwrap();

        let remote = shared.clone();
        thread::spawn(move || remote.set_trigger("Go")).join().unwrap();

        let report = shared.tick().unwrap();
        assert!(report.consumed.contains("Go"));
        shared.tick().unwrap();
        assert_eq!(shared.lock().current_node_name("Base"), Some("B"));
        assert!(!shared.lock().get_trigger("Go"));
    }
}
