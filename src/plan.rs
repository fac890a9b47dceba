//! The outcome of a successful search.

use crate::{Action, ActionSequence, ActionTplId, WorldState};
use std::fmt;

/// One template application of a plan, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanStep {
    pub template: ActionTplId,
    /// Registered name of the template
    pub name: String,
    /// Goal the step was resolved against; variable references in the
    /// template's effects take their values from here.
    pub context: WorldState,
    /// `false` for pass-through steps that produced no action
    pub instantiated: bool,
}

/// A plan for one actor and goal.
///
/// An empty plan means the goal already holds. It is a successful outcome,
/// unlike `None` from [`Planner::build_plan`](crate::Planner::build_plan).
#[derive(Debug, Default)]
pub struct Plan {
    steps: Vec<PlanStep>,
    action: Option<Box<dyn Action>>,
    cost: f32,
}

impl Plan {
    /// Assembles a plan from steps and the actions they instantiated, both in
    /// execution order. Several actions are wrapped in an [`ActionSequence`].
    pub(crate) fn new(steps: Vec<PlanStep>, mut actions: Vec<Box<dyn Action>>, cost: f32) -> Self {
        let action = match actions.len() {
            0 => None,
            1 => actions.pop(),
            _ => Some(Box::new(ActionSequence::from(actions)) as Box<dyn Action>),
        };

        Self { steps, action, cost }
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Total cost of the chosen template chain
    pub fn cost(&self) -> f32 {
        self.cost
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The action to run: a single action, a sequence, or nothing when no step instantiated one.
    pub fn action(&self) -> Option<&dyn Action> {
        self.action.as_deref()
    }

    pub fn into_action(self) -> Option<Box<dyn Action>> {
        self.action
    }

    /// Registered names of the steps, in execution order
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.name.as_str()).collect()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "Plan(idle)");
        }
        write!(f, "Plan(cost {}): {}", self.cost, self.step_names().join(" -> "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Named(&'static str);

    impl Action for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    fn step(id: u32, name: &str, instantiated: bool) -> PlanStep {
        PlanStep {
            template: ActionTplId(id),
            name: name.to_string(),
            context: WorldState::new(),
            instantiated,
        }
    }

    #[test]
    fn test_idle_plan() {
        let plan = Plan::new(Vec::new(), Vec::new(), 0.0);
        assert!(plan.is_empty());
        assert_eq!(plan.cost(), 0.0);
        assert!(plan.action().is_none());
        assert_eq!(plan.to_string(), "Plan(idle)");
    }

    #[test]
    fn test_single_action_is_not_wrapped() {
        let plan = Plan::new(
            vec![step(0, "Wave", true)],
            vec![Box::new(Named("Wave"))],
            1.0,
        );
        assert_eq!(plan.action().map(|a| a.name()), Some("Wave"));
    }

    #[test]
    fn test_several_actions_form_a_sequence() {
        let plan = Plan::new(
            vec![step(0, "A", true), step(2, "Skip", false), step(1, "B", true)],
            vec![Box::new(Named("A")), Box::new(Named("B"))],
            3.0,
        );

        assert_eq!(plan.len(), 3);
        assert_eq!(plan.step_names(), ["A", "Skip", "B"]);
        assert_eq!(plan.to_string(), "Plan(cost 3): A -> Skip -> B");

        let action = plan.into_action().unwrap();
        assert_eq!(action.name(), "Sequence");
        assert_eq!(action.debug_string(), "Sequence[A, B]");
    }
}
