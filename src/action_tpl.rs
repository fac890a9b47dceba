//! # Action templates
//!
//! An action template is a registered, reusable description of one thing an
//! actor can do: which world state properties it changes ([`ActionTpl::effects`]),
//! what must hold before it ([`ActionTpl::preconditions`]), what it costs and
//! how it ranks against equally good alternatives.
//!
//! Templates are created by name through an [`ActionTplFactory`] from
//! already-parsed configuration params. The planner owns them for its whole
//! lifetime and refers to them by [`ActionTplId`].
//!
//! ## Writing a template kind
//!
//! ```
//! use goap_planner::{
//!     Action, ActionTpl, ActionTplFactory, Actor, Result, Value, WorldProp, WorldState,
//! };
//!
//! #[derive(Debug)]
//! struct Pray;
//!
//! impl Action for Pray {
//!     fn name(&self) -> &str {
//!         "Pray"
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct PrayTpl {
//!     effects: WorldState,
//! }
//!
//! impl ActionTpl for PrayTpl {
//!     fn effects(&self) -> &WorldState {
//!         &self.effects
//!     }
//!
//!     fn cost(&self) -> f32 {
//!         2.0
//!     }
//!
//!     fn create_instance(&self, _context: &WorldState) -> Option<Box<dyn Action>> {
//!         Some(Box::new(Pray))
//!     }
//! }
//!
//! fn create_pray(_name: &str, _params: &serde_json::Value) -> Result<Box<dyn ActionTpl>> {
//!     Ok(Box::new(PrayTpl {
//!         effects: WorldState::from_props([(WorldProp::Action, Value::id("Pray"))]),
//!     }))
//! }
//!
//! let mut factory = ActionTplFactory::with_builtin();
//! factory.register("Pray", create_pray);
//! assert!(factory.contains("Pray"));
//! ```

use crate::{Action, Actor, GoapError, Result, WorldState};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;

/// Handle of a registered template, stable for the planner's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionTplId(pub(crate) u32);

impl ActionTplId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ActionTplId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The capability interface the planner consumes.
///
/// Implementations are immutable once created; the search only reads them.
pub trait ActionTpl: fmt::Debug {
    /// Properties this template changes. Values may be [`Value::Var`](crate::Value::Var)
    /// references, resolved against the goal of the node being satisfied.
    fn effects(&self) -> &WorldState;

    /// Writes what must hold before this action into `out`, given the goal
    /// the surrounding node tries to satisfy. Returns whether anything was written.
    fn preconditions(&self, _actor: &dyn Actor, _out: &mut WorldState, _parent_goal: &WorldState) -> bool {
        false
    }

    /// Cheap admissibility filter used while generating neighbours.
    fn validate_context_preconditions(&self, _actor: &dyn Actor, _goal: &WorldState) -> bool {
        true
    }

    /// Non-negative cost added to the cost-so-far of a node using this template.
    fn cost(&self) -> f32 {
        1.0
    }

    /// Tie-break rank, higher is preferred.
    fn precedence(&self) -> i32 {
        0
    }

    /// Builds the runnable action for one plan step from the resolved goal.
    ///
    /// `None` marks a pass-through step that only exists to satisfy world
    /// state bookkeeping; it is skipped when the plan is assembled.
    fn create_instance(&self, context: &WorldState) -> Option<Box<dyn Action>>;
}

/// Constructor of one template kind: `(registered name, params) -> template`.
pub type ActionTplCtor = fn(&str, &serde_json::Value) -> Result<Box<dyn ActionTpl>>;

/// Creates templates by kind name.
///
/// The kind is the `kind` field of the params when present, otherwise the
/// registered name itself, so `"Goto"` registered without params is a goto
/// template and `"GotoCover"` with `{"kind": "Goto"}` is another one.
#[derive(Clone, Default)]
pub struct ActionTplFactory {
    ctors: HashMap<String, ActionTplCtor>,
}

impl ActionTplFactory {
    /// An empty factory knowing no kinds
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory knowing the built-in kinds: `Goto`, `PickItem`, `EquipItem`,
    /// `UseSmartObj` and `Static`.
    pub fn with_builtin() -> Self {
        let mut factory = Self::new();
        crate::builtin::register_builtin(&mut factory);
        factory
    }

    /// Registers a kind, replacing any previous constructor of that name.
    pub fn register(&mut self, kind: impl Into<String>, ctor: ActionTplCtor) {
        self.ctors.insert(kind.into(), ctor);
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.ctors.contains_key(kind)
    }

    /// Creates and validates the template registered as `name`.
    ///
    /// # Errors
    ///
    /// - [`GoapError::UnknownActionTplKind`] if the kind is not registered
    /// - [`GoapError::InvalidActionTplParams`] if the kind rejects the params
    /// - [`GoapError::InvalidActionCost`] if the template's cost is negative or not finite
    pub fn create(&self, name: &str, params: &serde_json::Value) -> Result<Box<dyn ActionTpl>> {
        let kind = params
            .get("kind")
            .and_then(serde_json::Value::as_str)
            .unwrap_or(name);
        let ctor = self
            .ctors
            .get(kind)
            .ok_or_else(|| GoapError::UnknownActionTplKind(kind.to_string()))?;

        let tpl = ctor(name, params)?;

        let cost = tpl.cost();
        if !cost.is_finite() || cost < 0.0 {
            return Err(GoapError::InvalidActionCost(name.to_string()));
        }

        Ok(tpl)
    }
}

impl fmt::Debug for ActionTplFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.ctors.keys().collect();
        kinds.sort();
        f.debug_struct("ActionTplFactory").field("kinds", &kinds).finish()
    }
}

/// Parses template params into a kind's settings struct.
///
/// Missing (`null`) params yield the settings' defaults.
pub fn parse_params<T>(name: &str, params: &serde_json::Value) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if params.is_null() {
        return Ok(T::default());
    }

    serde_json::from_value(params.clone()).map_err(|source| GoapError::InvalidActionTplParams {
        name: name.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug)]
    struct NoopTpl {
        effects: WorldState,
        cost: f32,
    }

    impl ActionTpl for NoopTpl {
        fn effects(&self) -> &WorldState {
            &self.effects
        }

        fn cost(&self) -> f32 {
            self.cost
        }

        fn create_instance(&self, _context: &WorldState) -> Option<Box<dyn Action>> {
            None
        }
    }

    fn create_noop(_name: &str, params: &serde_json::Value) -> Result<Box<dyn ActionTpl>> {
        let cost = params.get("cost").and_then(serde_json::Value::as_f64).unwrap_or(1.0);
        Ok(Box::new(NoopTpl {
            effects: WorldState::new(),
            cost: cost as f32,
        }))
    }

    #[test]
    fn test_create_by_name_and_by_kind() {
        let mut factory = ActionTplFactory::new();
        factory.register("Noop", create_noop);

        assert!(factory.create("Noop", &serde_json::Value::Null).is_ok());
        assert!(factory.create("Rest", &json!({ "kind": "Noop" })).is_ok());
    }

    #[test]
    fn test_unknown_kind() {
        let factory = ActionTplFactory::new();
        let result = factory.create("Fly", &serde_json::Value::Null);
        assert!(matches!(result, Err(GoapError::UnknownActionTplKind(kind)) if kind == "Fly"));

        let result = factory.create("Glide", &json!({ "kind": "Fly" }));
        assert!(matches!(result, Err(GoapError::UnknownActionTplKind(kind)) if kind == "Fly"));
    }

    #[test]
    fn test_negative_cost_is_rejected() {
        let mut factory = ActionTplFactory::new();
        factory.register("Noop", create_noop);

        let result = factory.create("Noop", &json!({ "cost": -1.0 }));
        assert!(matches!(result, Err(GoapError::InvalidActionCost(name)) if name == "Noop"));

        // zero is a valid cost
        assert!(factory.create("Noop", &json!({ "cost": 0.0 })).is_ok());
    }

    #[test]
    fn test_builtin_kinds_are_known() {
        let factory = ActionTplFactory::with_builtin();
        for kind in ["Goto", "PickItem", "EquipItem", "UseSmartObj", "Static"] {
            assert!(factory.contains(kind), "missing kind {}", kind);
        }
    }

    #[test]
    fn test_parse_params() {
        #[derive(Debug, Default, Deserialize)]
        #[serde(default)]
        struct Settings {
            speed: u32,
        }

        let settings: Settings = parse_params("Run", &serde_json::Value::Null).unwrap();
        assert_eq!(settings.speed, 0);

        let settings: Settings = parse_params("Run", &json!({ "speed": 3 })).unwrap();
        assert_eq!(settings.speed, 3);

        let result = parse_params::<Settings>("Run", &json!({ "speed": "fast" }));
        assert!(matches!(
            result,
            Err(GoapError::InvalidActionTplParams { name, .. }) if name == "Run"
        ));
    }
}
