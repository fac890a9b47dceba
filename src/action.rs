//! # Runnable actions produced by the planner
//!
//! The planner never runs anything. It hands the actor's execution layer an
//! [`Action`]: either the single action of a one-step plan or an
//! [`ActionSequence`] whose children run in order.
//!
//! Concrete actions come from [`ActionTpl::create_instance`](crate::ActionTpl::create_instance),
//! which binds a template to the values resolved for one plan step.

use std::fmt;

/// A runnable action instance bound to concrete values.
///
/// Activation, per-frame update and success/failure reporting belong to the
/// execution layer; the planner only needs to name and describe actions.
pub trait Action: fmt::Debug {
    /// Short name of the action kind, e.g. `"Goto"`
    fn name(&self) -> &str;

    /// Human readable description including the bound values
    fn debug_string(&self) -> String {
        self.name().to_string()
    }
}

/// Composite action running its children one after another.
#[derive(Debug, Default)]
pub struct ActionSequence {
    children: Vec<Box<dyn Action>>,
}

impl ActionSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_child(&mut self, action: Box<dyn Action>) {
        self.children.push(action);
    }

    /// Children in execution order
    pub fn children(&self) -> &[Box<dyn Action>] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl From<Vec<Box<dyn Action>>> for ActionSequence {
    fn from(children: Vec<Box<dyn Action>>) -> Self {
        Self { children }
    }
}

impl Action for ActionSequence {
    fn name(&self) -> &str {
        "Sequence"
    }

    fn debug_string(&self) -> String {
        let children: Vec<_> = self.children.iter().map(|a| a.debug_string()).collect();
        format!("Sequence[{}]", children.join(", "))
    }
}

impl fmt::Display for dyn Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Wait(u32);

    impl Action for Wait {
        fn name(&self) -> &str {
            "Wait"
        }

        fn debug_string(&self) -> String {
            format!("Wait({})", self.0)
        }
    }

    #[test]
    fn test_sequence_keeps_order() {
        let mut seq = ActionSequence::new();
        assert!(seq.is_empty());
        seq.add_child(Box::new(Wait(1)));
        seq.add_child(Box::new(Wait(2)));

        assert_eq!(seq.len(), 2);
        let names: Vec<_> = seq.children().iter().map(|a| a.debug_string()).collect();
        assert_eq!(names, ["Wait(1)", "Wait(2)"]);
        assert_eq!(seq.debug_string(), "Sequence[Wait(1), Wait(2)]");
    }

    #[test]
    fn test_default_debug_string_is_name() {
        #[derive(Debug)]
        struct Idle;
        impl Action for Idle {
            fn name(&self) -> &str {
                "Idle"
            }
        }

        let action: Box<dyn Action> = Box::new(Idle);
        assert_eq!(action.debug_string(), "Idle");
        assert_eq!(action.to_string(), "Idle");
    }
}
