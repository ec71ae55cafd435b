#![forbid(unsafe_code)]

//! The validated, ordered step table.

use std::collections::HashSet;
use std::time::Duration;

use crate::error::{ScriptError, ScriptResult};
use crate::step::{ActionKind, PresentationStep};

/// An immutable, validated tour script.
///
/// # Invariants
///
/// 1. At least one step.
/// 2. Step ids are unique.
/// 3. Every duration is strictly positive, so progress never divides by zero.
/// 4. `move` actions carry an in-range position; `scroll`, `point` and
///    `highlight` carry a selector.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptTable {
    steps: Vec<PresentationStep>,
}

impl ScriptTable {
    /// Validate `steps` and build the table.
    pub fn new(steps: Vec<PresentationStep>) -> ScriptResult<Self> {
        validate(&steps)?;
        ftour_core::debug!(steps = steps.len(), "script table loaded");
        Ok(Self { steps })
    }

    /// Decode a JSON array of steps and validate it.
    pub fn from_json(json: &str) -> ScriptResult<Self> {
        let steps: Vec<PresentationStep> = serde_json::from_str(json)?;
        Self::new(steps)
    }

    /// Encode the table back to pretty JSON.
    pub fn to_json(&self) -> ScriptResult<String> {
        Ok(serde_json::to_string_pretty(&self.steps)?)
    }

    pub fn steps(&self) -> &[PresentationStep] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<&PresentationStep> {
        self.steps.get(index)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Index of the last step.
    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Sum of every step's duration.
    pub fn total_duration(&self) -> Duration {
        self.steps
            .iter()
            .fold(Duration::ZERO, |acc, step| acc.saturating_add(step.duration))
    }

    /// Duration of steps before `index`; the tour-level elapsed offset.
    pub fn offset_of(&self, index: usize) -> Duration {
        self.steps
            .iter()
            .take(index)
            .fold(Duration::ZERO, |acc, step| acc.saturating_add(step.duration))
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.id == id)
    }

    /// Distinct routes in first-visit order.
    pub fn routes(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.steps
            .iter()
            .map(|step| step.route.as_str())
            .filter(|route| seen.insert(*route))
            .collect()
    }

    /// Check every route against the host's router.
    pub fn validate_routes(&self, resolves: impl Fn(&str) -> bool) -> ScriptResult<()> {
        match self.steps.iter().find(|step| !resolves(&step.route)) {
            Some(step) => Err(ScriptError::UnknownRoute {
                step: step.id.clone(),
                route: step.route.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn validate(steps: &[PresentationStep]) -> ScriptResult<()> {
    if steps.is_empty() {
        return Err(ScriptError::Empty);
    }
    let mut ids = HashSet::with_capacity(steps.len());
    for step in steps {
        if !ids.insert(step.id.as_str()) {
            return Err(ScriptError::DuplicateStepId(step.id.clone()));
        }
        if step.duration.is_zero() {
            return Err(ScriptError::ZeroDuration {
                step: step.id.clone(),
            });
        }
        for (index, action) in step.actions.iter().enumerate() {
            if action.kind.requires_selector() && action.selector.is_none() {
                return Err(ScriptError::MissingSelector {
                    step: step.id.clone(),
                    action: index,
                    kind: action.kind,
                });
            }
            if action.kind == ActionKind::Move {
                let Some(position) = action.position else {
                    return Err(ScriptError::MissingPosition {
                        step: step.id.clone(),
                        action: index,
                    });
                };
                if !position.in_range() {
                    return Err(ScriptError::PositionOutOfRange {
                        step: step.id.clone(),
                        action: index,
                        x: position.x,
                        y: position.y,
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::PresentationAction;

    fn step(id: &str, route: &str, secs: u64) -> PresentationStep {
        PresentationStep::new(id, route, id.to_uppercase()).duration_secs(secs)
    }

    #[test]
    fn empty_rejected() {
        assert!(matches!(ScriptTable::new(Vec::new()), Err(ScriptError::Empty)));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = ScriptTable::new(vec![step("a", "/", 1), step("a", "/x", 1)]).unwrap_err();
        assert!(matches!(err, ScriptError::DuplicateStepId(id) if id == "a"));
    }

    #[test]
    fn zero_duration_rejected() {
        let err = ScriptTable::new(vec![step("a", "/", 0)]).unwrap_err();
        assert!(matches!(err, ScriptError::ZeroDuration { .. }));
    }

    #[test]
    fn move_requires_in_range_position() {
        let mut missing = PresentationAction::move_to(0.0, 0.0);
        missing.position = None;
        let err = ScriptTable::new(vec![step("a", "/", 1).action(missing)]).unwrap_err();
        assert!(matches!(err, ScriptError::MissingPosition { action: 0, .. }));

        let err = ScriptTable::new(vec![
            step("a", "/", 1).action(PresentationAction::move_to(50.0, 120.0)),
        ])
        .unwrap_err();
        assert!(matches!(err, ScriptError::PositionOutOfRange { .. }));
    }

    #[test]
    fn highlight_requires_selector_but_click_does_not() {
        let mut highlight = PresentationAction::highlight("#x");
        highlight.selector = None;
        let err = ScriptTable::new(vec![step("a", "/", 1).action(highlight)]).unwrap_err();
        assert!(matches!(
            err,
            ScriptError::MissingSelector {
                kind: ActionKind::Highlight,
                ..
            }
        ));

        let mut click = PresentationAction::click("#x");
        click.selector = None;
        assert!(ScriptTable::new(vec![step("a", "/", 1).action(click)]).is_ok());
    }

    #[test]
    fn totals_and_offsets() {
        let table =
            ScriptTable::new(vec![step("a", "/", 5), step("b", "/x", 7), step("c", "/", 3)])
                .expect("valid");
        assert_eq!(table.step_count(), 3);
        assert_eq!(table.last_index(), 2);
        assert_eq!(table.total_duration(), Duration::from_secs(15));
        assert_eq!(table.offset_of(2), Duration::from_secs(12));
        assert_eq!(table.position_of("b"), Some(1));
        assert_eq!(table.routes(), vec!["/", "/x"]);
    }

    #[test]
    fn route_validation_names_failing_step() {
        let table = ScriptTable::new(vec![step("a", "/", 1), step("b", "/missing", 1)])
            .expect("valid");
        let err = table.validate_routes(|route| route == "/").unwrap_err();
        assert!(
            matches!(err, ScriptError::UnknownRoute { step, route } if step == "b" && route == "/missing")
        );
        assert!(table.validate_routes(|_| true).is_ok());
    }

    #[test]
    fn json_round_trip_preserves_table() {
        let table = ScriptTable::new(vec![
            step("a", "/", 4).action(PresentationAction::highlight("#hero").delay_ms(250)),
        ])
        .expect("valid");
        let json = table.to_json().expect("encode");
        assert_eq!(ScriptTable::from_json(&json).expect("decode"), table);
    }
}
