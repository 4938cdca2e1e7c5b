// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end behavior of the tick loop.

use eventflow_graph::clips::{Assignment, Phase};
use eventflow_graph::{
    ClipContext, ClipDescription, ClipError, ClipRegistry, CompareOp, Condition, Controller,
    ControllerDescription, EventClip, LayerDescription, LayerState, NodeDescription, NodeIndex,
    ParameterDescription, ParameterValue, Transition,
};
use parking_lot::Mutex;
use std::sync::Arc;

type Journal = Arc<Mutex<Vec<String>>>;

/// Records every hook as "node:hook@frame"
struct Recorder {
    journal: Journal,
    name: &'static str,
}

impl Recorder {
    fn log(&self, hook: &str, ctx: &ClipContext<'_>) {
        self.journal
            .lock()
            .push(format!("{}:{}@{}", self.name, hook, ctx.frame()));
    }
}

impl EventClip for Recorder {
    fn on_enter(&mut self, ctx: &mut ClipContext<'_>) -> Result<(), ClipError> {
        self.log("enter", ctx);
        Ok(())
    }

    fn on_tick(&mut self, ctx: &mut ClipContext<'_>) -> Result<(), ClipError> {
        self.log("tick", ctx);
        Ok(())
    }

    fn on_exit(&mut self, ctx: &mut ClipContext<'_>) -> Result<(), ClipError> {
        self.log("exit", ctx);
        Ok(())
    }
}

/// Records the live value of the `Go` trigger on every tick
struct GoWatcher(Arc<Mutex<Vec<bool>>>);

impl EventClip for GoWatcher {
    fn on_tick(&mut self, ctx: &mut ClipContext<'_>) -> Result<(), ClipError> {
        self.0.lock().push(ctx.params().get_trigger("Go"));
        Ok(())
    }
}

fn registry(journal: &Journal) -> ClipRegistry {
    let mut registry = ClipRegistry::new();
    for name in ["A", "B", "C"] {
        let journal = journal.clone();
        registry.register(name, move || Recorder {
            journal: journal.clone(),
            name,
        });
    }
    registry
}

fn named(name: &str) -> ClipDescription {
    ClipDescription::Named(name.to_string())
}

fn score_description() -> ControllerDescription {
    ControllerDescription {
        label: "score".into(),
        parameters: vec![ParameterDescription::int("score", 0)],
        layers: vec![LayerDescription::new(
            "Base",
            vec![
                NodeDescription::new("A")
                    .as_entry()
                    .with_clip(named("A"))
                    .with_transition(
                        Transition::always(NodeIndex(1))
                            .with_condition(Condition::int("score", CompareOp::Greater, 10)),
                    ),
                NodeDescription::new("B").with_clip(named("B")),
            ],
        )],
        ..ControllerDescription::default()
    }
}

#[test]
fn score_threshold_scenario() {
    let journal = Journal::default();
    let mut controller = Controller::compile(&score_description(), &registry(&journal)).unwrap();
    controller.start().unwrap();

    controller.tick().unwrap();
    assert_eq!(controller.current_node_name("Base"), Some("A"));

    controller.set_int("score", 20);
    let report = controller.tick().unwrap();
    assert_eq!(report.detected.len(), 1);
    assert_eq!(controller.current_node_name("Base"), Some("A"));
    assert_eq!(
        controller.layer_state("Base"),
        Some(LayerState::Transitioning { pending: NodeIndex(1) })
    );

    let report = controller.tick().unwrap();
    assert_eq!(report.activated.len(), 1);
    assert_eq!(controller.current_node_name("Base"), Some("B"));
    assert_eq!(controller.layer_state("Base"), Some(LayerState::Running));

    assert_eq!(
        *journal.lock(),
        vec!["A:enter@0", "A:tick@0", "A:tick@1", "A:exit@2", "B:enter@2"]
    );
}

#[test]
fn activation_is_one_tick_after_detection() {
    let journal = Journal::default();
    let mut description = score_description();
    description.parameters = vec![ParameterDescription::int("score", 50)];
    description.layers[0].nodes[1] = NodeDescription::new("B")
        .with_clip(named("B"))
        .with_transition(Transition::always(NodeIndex(0)));

    let mut controller = Controller::compile(&description, &registry(&journal)).unwrap();
    controller.start().unwrap();
    for _ in 0..4 {
        controller.tick().unwrap();
    }

    // B is entered on tick 1 and only ticks (and scans) on tick 2
    assert_eq!(
        *journal.lock(),
        vec![
            "A:enter@0", "A:tick@0", "A:exit@1", "B:enter@1", "B:tick@2", "B:exit@3",
            "A:enter@3",
        ]
    );
}

#[test]
fn first_satisfied_transition_wins() {
    let description = ControllerDescription {
        parameters: vec![ParameterDescription::bool("ready", true)],
        layers: vec![LayerDescription::new(
            "Base",
            vec![
                NodeDescription::new("Start")
                    .as_entry()
                    .with_transition(Transition::new(None, Vec::new()))
                    .with_transition(
                        Transition::always(NodeIndex(1)).with_condition(Condition::bool("ready", true)),
                    )
                    .with_transition(Transition::always(NodeIndex(2))),
                NodeDescription::new("First"),
                NodeDescription::new("Second"),
            ],
        )],
        ..ControllerDescription::default()
    };

    for _ in 0..8 {
        let mut controller = Controller::compile(&description, &ClipRegistry::new()).unwrap();
        controller.start().unwrap();
        controller.tick().unwrap();
        controller.tick().unwrap();
        assert_eq!(controller.current_node_name("Base"), Some("First"));
    }
}

#[test]
fn triggers_are_shared_within_a_tick() {
    let watcher = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ClipRegistry::new();
    let shared_watcher = watcher.clone();
    registry.register("watcher", move || GoWatcher(shared_watcher.clone()));

    let gated = |clip: Option<ClipDescription>| {
        let mut wait = NodeDescription::new("Wait").as_entry().with_transition(
            Transition::always(NodeIndex(1)).with_condition(Condition::trigger("Go")),
        );
        wait.clip = clip;
        vec![wait, NodeDescription::new("Done")]
    };
    let description = ControllerDescription {
        parameters: vec![ParameterDescription::trigger("Go")],
        layers: vec![
            LayerDescription::new("First", gated(None)),
            LayerDescription::new("Second", gated(Some(named("watcher")))),
        ],
        ..ControllerDescription::default()
    };

    let mut controller = Controller::compile(&description, &registry).unwrap();
    controller.start().unwrap();
    controller.set_trigger("Go");

    let report = controller.tick().unwrap();
    assert_eq!(report.detected.len(), 2);
    assert_eq!(report.consumed.iter().collect::<Vec<_>>(), vec!["Go"]);
    assert_eq!(*watcher.lock(), vec![true]);
    assert!(!controller.get_trigger("Go"));

    controller.tick().unwrap();
    assert_eq!(controller.current_node_name("First"), Some("Done"));
    assert_eq!(controller.current_node_name("Second"), Some("Done"));
}

#[test]
fn trigger_set_by_clip_is_consumed_next_tick() {
    let description = ControllerDescription {
        parameters: vec![ParameterDescription::trigger("Go")],
        layers: vec![
            LayerDescription::new(
                "Listener",
                vec![
                    NodeDescription::new("Wait").as_entry().with_transition(
                        Transition::always(NodeIndex(1)).with_condition(Condition::trigger("Go")),
                    ),
                    NodeDescription::new("Heard"),
                ],
            ),
            LayerDescription::new(
                "Speaker",
                vec![NodeDescription::new("Shout")
                    .as_entry()
                    .with_clip(ClipDescription::ParameterSet {
                        assignments: vec![Assignment::new(
                            Phase::Tick,
                            "Go",
                            ParameterValue::Trigger(true),
                        )],
                    })],
            ),
        ],
        ..ControllerDescription::default()
    };

    let mut controller = Controller::compile(&description, &ClipRegistry::new()).unwrap();
    controller.start().unwrap();

    // The listener is stepped before the speaker raises the trigger
    let report = controller.tick().unwrap();
    assert!(report.detected.is_empty());
    assert!(controller.get_trigger("Go"));

    let report = controller.tick().unwrap();
    assert_eq!(report.detected.len(), 1);
    assert!(report.consumed.contains("Go"));
}

#[test]
fn missing_parameters_fail_closed() {
    let description = ControllerDescription {
        layers: vec![LayerDescription::new(
            "Base",
            vec![
                NodeDescription::new("A").as_entry().with_transition(
                    Transition::always(NodeIndex(1))
                        .with_condition(Condition::int("ghost", CompareOp::NotEquals, 1)),
                ),
                NodeDescription::new("B"),
            ],
        )],
        ..ControllerDescription::default()
    };
    let mut controller = Controller::compile(&description, &ClipRegistry::new()).unwrap();
    controller.start().unwrap();
    for _ in 0..3 {
        let report = controller.tick().unwrap();
        assert!(report.detected.is_empty());
    }
    assert_eq!(controller.current_node_name("Base"), Some("A"));
    assert_eq!(controller.get_int("ghost"), 0);
}

#[test]
fn layer_without_entry_stays_idle() {
    let journal = Journal::default();
    let description = ControllerDescription {
        layers: vec![
            LayerDescription::new(
                "NoEntry",
                vec![NodeDescription::new("A")
                    .with_clip(named("A"))
                    .with_transition(Transition::always(NodeIndex(0)))],
            ),
            LayerDescription::new("Empty", Vec::new()),
        ],
        ..ControllerDescription::default()
    };
    let mut controller = Controller::compile(&description, &registry(&journal)).unwrap();
    controller.start().unwrap();
    for _ in 0..5 {
        controller.tick().unwrap();
        assert_eq!(controller.layer_state("NoEntry"), Some(LayerState::Idle));
        assert_eq!(controller.layer_state("Empty"), Some(LayerState::Idle));
    }
    assert!(journal.lock().is_empty());
}

#[test]
fn self_loop_reenters_node() {
    let journal = Journal::default();
    let description = ControllerDescription {
        layers: vec![LayerDescription::new(
            "Loop",
            vec![NodeDescription::new("A")
                .as_entry()
                .with_clip(named("A"))
                .with_transition(Transition::always(NodeIndex(0)))],
        )],
        ..ControllerDescription::default()
    };
    let mut controller = Controller::compile(&description, &registry(&journal)).unwrap();
    controller.start().unwrap();
    controller.tick().unwrap();
    controller.tick().unwrap();
    assert_eq!(
        *journal.lock(),
        vec!["A:enter@0", "A:tick@0", "A:exit@1", "A:enter@1"]
    );
}

#[test]
fn delay_clip_drives_transition() {
    let description = ControllerDescription {
        parameters: vec![ParameterDescription::trigger("Next")],
        layers: vec![LayerDescription::new(
            "Base",
            vec![
                NodeDescription::new("Wait")
                    .as_entry()
                    .with_clip(ClipDescription::Delay {
                        delay: 1.0,
                        trigger: "Next".into(),
                    })
                    .with_transition(
                        Transition::always(NodeIndex(1)).with_condition(Condition::trigger("Next")),
                    ),
                NodeDescription::new("Go"),
            ],
        )],
        config: eventflow_graph::ControllerConfig::default().with_fixed_step(0.5),
        ..ControllerDescription::default()
    };
    let mut controller = Controller::compile(&description, &ClipRegistry::new()).unwrap();
    controller.start().unwrap();

    // Clock reads 0.5, 1.0, 1.5: the trigger is raised on the third tick
    controller.tick().unwrap();
    controller.tick().unwrap();
    assert!(!controller.get_trigger("Next"));
    let report = controller.tick().unwrap();
    assert_eq!(report.detected.len(), 1);
    controller.tick().unwrap();
    assert_eq!(controller.current_node_name("Base"), Some("Go"));
}

#[test]
fn describe_round_trips() {
    let mut description = score_description();
    description.parameters.push(ParameterDescription::trigger("Go"));
    description.layers.push(LayerDescription::new(
        "Second",
        vec![
            NodeDescription::new("Idle")
                .with_clip(ClipDescription::Timer {
                    sections: vec![eventflow_graph::clips::TimerSection::new("held", "held_for")],
                })
                .with_transition(Transition::new(None, vec![Condition::trigger("Go")])),
            NodeDescription::new("Busy")
                .as_entry()
                .with_transition(
                    Transition::always(NodeIndex(0))
                        .with_condition(Condition::float("speed", CompareOp::Less, 0.25))
                        .with_condition(Condition::trigger("Go")),
                )
                .with_transition(Transition::always(NodeIndex(1))),
        ],
    ));

    let journal = Journal::default();
    let controller = Controller::compile(&description, &registry(&journal)).unwrap();
    assert_eq!(controller.describe(), description);
}
