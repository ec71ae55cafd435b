//! Script table loading from JSON and validation invariants.

use std::time::Duration;

use ftour_script::builtin::municipal_tour;
use ftour_script::{ActionKind, PresentationAction, PresentationStep, ScriptError, ScriptTable};
use proptest::prelude::*;

const TWO_STEP_SCRIPT: &str = r##"[
  {
    "id": "home",
    "route": "/",
    "title": "Home",
    "icon": "home",
    "narration": "Welcome.",
    "duration": 5,
    "actions": [{ "type": "move", "position": { "x": 50, "y": 50 }, "delay": 0 }]
  },
  {
    "id": "services",
    "route": "/services",
    "title": "Services",
    "icon": "grid",
    "narration": "Our services.",
    "duration": 5,
    "actions": [{ "type": "highlight", "selector": "#target", "delay": 1000 }]
  }
]"##;

#[test]
fn loads_two_step_script() {
    let table = ScriptTable::from_json(TWO_STEP_SCRIPT).expect("valid script");
    assert_eq!(table.step_count(), 2);
    assert_eq!(table.total_duration(), Duration::from_secs(10));
    let highlight = &table.steps()[1].actions[0];
    assert_eq!(highlight.kind, ActionKind::Highlight);
    assert_eq!(highlight.delay, Duration::from_millis(1000));
}

#[test]
fn malformed_json_is_a_json_error() {
    let err = ScriptTable::from_json("[{").unwrap_err();
    assert!(matches!(err, ScriptError::Json(_)));
}

#[test]
fn unknown_action_type_is_rejected() {
    let json = r#"[{"id":"a","route":"/","title":"A","narration":"","duration":1,
                   "actions":[{"type":"teleport"}]}]"#;
    assert!(matches!(ScriptTable::from_json(json), Err(ScriptError::Json(_))));
}

#[test]
fn structural_errors_surface_after_decoding() {
    let json = r#"[{"id":"a","route":"/","title":"A","narration":"","duration":0}]"#;
    assert!(matches!(
        ScriptTable::from_json(json),
        Err(ScriptError::ZeroDuration { .. })
    ));
}

#[test]
fn builtin_tour_survives_json_round_trip() {
    let table = municipal_tour();
    let json = table.to_json().expect("encode");
    assert_eq!(ScriptTable::from_json(&json).expect("decode"), table);
}

fn step_strategy() -> impl Strategy<Value = (u64, Vec<(u8, u64)>)> {
    (
        1u64..120,
        prop::collection::vec((0u8..5, 0u64..20_000), 0..8),
    )
}

fn build(index: usize, secs: u64, actions: &[(u8, u64)]) -> PresentationStep {
    actions.iter().fold(
        PresentationStep::new(format!("step-{index}"), "/", "T").duration_secs(secs),
        |step, &(kind, delay)| {
            let action = match kind {
                0 => PresentationAction::scroll("#a"),
                1 => PresentationAction::click("#b"),
                2 => PresentationAction::highlight("#c"),
                3 => PresentationAction::point("#d"),
                _ => PresentationAction::move_to(10.0, 90.0),
            };
            step.action(action.delay_ms(delay))
        },
    )
}

proptest! {
    #[test]
    fn well_formed_scripts_always_validate(steps in prop::collection::vec(step_strategy(), 1..10)) {
        let built: Vec<_> = steps
            .iter()
            .enumerate()
            .map(|(i, (secs, actions))| build(i, *secs, actions))
            .collect();
        let expected: u64 = steps.iter().map(|(secs, _)| *secs).sum();
        let table = ScriptTable::new(built).expect("valid");
        prop_assert_eq!(table.total_duration(), Duration::from_secs(expected));
        for step in table.steps() {
            let order = step.actions_by_delay();
            prop_assert!(order.windows(2).all(|w| step.actions[w[0]].delay <= step.actions[w[1]].delay));
        }
    }
}
