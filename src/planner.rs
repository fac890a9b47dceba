//! # Planner
//!
//! The planner is the entry point of the crate. It is responsible for:
//! - Creating action templates by name and owning them for its lifetime
//! - Indexing templates by the world state properties their effects change
//! - Building plans for an actor and a goal with a backward best-first search
//!
//! ## Overview
//!
//! Planning runs backward: starting from the properties the goal wants, the
//! planner looks for templates whose effects produce them, then for templates
//! producing those templates' preconditions, until the actor's current state
//! covers what is left. The chain is then replayed forward to make sure it
//! actually works, and turned into runnable actions.
//!
//! Templates are registered first, then indexed with
//! [`Planner::end_action_tpls`]. Registration may continue later; each
//! `end_action_tpls` call indexes only what was added since the previous one.
//!
//! ## Basic Usage
//!
//! ```
//! use goap_planner::{ActionTplId, Actor, Planner, Value, WorldProp, WorldState};
//! use serde_json::json;
//!
//! struct Guard {
//!     state: WorldState,
//! }
//!
//! impl Actor for Guard {
//!     fn uid(&self) -> &str {
//!         "guard"
//!     }
//!
//!     fn fill_world_state(&self, state: &mut WorldState) {
//!         for (prop, value) in self.state.iter() {
//!             state.set(prop, value.clone());
//!         }
//!     }
//!
//!     fn is_action_available(&self, _tpl: ActionTplId) -> bool {
//!         true
//!     }
//! }
//!
//! // Step 1: register what actors can do
//! let mut planner = Planner::new();
//! planner
//!     .load_action_tpls(&json!({
//!         "Goto": null,
//!         "PickItem": null,
//!         "EquipItem": { "cost": 0.5 },
//!     }))
//!     .unwrap();
//!
//! // Step 2: describe the actor's reality
//! let guard = Guard {
//!     state: WorldState::from_props([
//!         (WorldProp::AtEntityPos, Value::id("Barracks")),
//!         (WorldProp::HasItem, Value::id("")),
//!         (WorldProp::ItemEquipped, Value::id("")),
//!     ]),
//! };
//!
//! // Step 3: say what the goal wants
//! let goal = WorldState::from_props([(WorldProp::ItemEquipped, Value::id("Spear"))]);
//!
//! // Step 4: plan
//! let plan = planner.build_plan(&guard, &goal).unwrap();
//! assert_eq!(plan.step_names(), ["Goto", "PickItem", "EquipItem"]);
//! assert_eq!(plan.cost(), 2.5);
//! assert_eq!(
//!     plan.action().unwrap().debug_string(),
//!     "Sequence[Goto(Spear), PickItem(Spear), EquipItem(Spear)]"
//! );
//! ```

use crate::registry::ActionTplRegistry;
use crate::search::SearchScratch;
use crate::{
    ActionTpl, ActionTplFactory, ActionTplId, Actor, GoapError, Goal, Plan, PlannerConfig, Result,
    WorldProp,
};

/// A backward-chaining GOAP planner.
///
/// A planner is single-threaded: building a plan takes `&mut self` and
/// reuses the planner's search buffers and node pool. Use one planner per
/// worker to plan in parallel.
#[derive(Debug)]
pub struct Planner {
    config: PlannerConfig,
    factory: ActionTplFactory,
    registry: ActionTplRegistry,
    scratch: SearchScratch,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}

impl Planner {
    /// Creates a planner with the built-in template kinds and default search bounds.
    pub fn new() -> Self {
        Self::with_config(PlannerConfig::default())
    }

    pub fn with_config(config: PlannerConfig) -> Self {
        Self {
            scratch: SearchScratch::new(config.max_nodes),
            config,
            factory: ActionTplFactory::with_builtin(),
            registry: ActionTplRegistry::new(),
        }
    }

    /// Replaces the template factory, e.g. with one knowing custom kinds.
    pub fn with_factory(mut self, factory: ActionTplFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Registers a template under `name`.
    ///
    /// The kind is `params["kind"]` if present, otherwise `name`. Registering
    /// a name twice keeps the first template and returns its handle.
    ///
    /// # Errors
    ///
    /// Fails if the factory does not know the kind, the kind rejects the
    /// params, or the template's cost is negative.
    pub fn register_action_tpl(&mut self, name: &str, params: &serde_json::Value) -> Result<ActionTplId> {
        if let Some(id) = self.registry.find(name) {
            log::debug!("Action template '{}' already registered", name);
            return Ok(id);
        }

        let tpl = self.factory.create(name, params)?;
        let id = self.registry.add(name, tpl);
        log::debug!("Registered action template '{}' as {}", name, id);
        Ok(id)
    }

    /// Indexes every template registered since the previous call and
    /// returns how many were indexed.
    pub fn end_action_tpls(&mut self) -> usize {
        let count = self.registry.end();
        log::debug!(
            "Indexed {} new action templates ({} total)",
            count,
            self.registry.len()
        );
        count
    }

    /// Registers every entry of a `name -> params` map, then indexes them.
    ///
    /// `null` params register a template with its kind's defaults.
    pub fn load_action_tpls(&mut self, descs: &serde_json::Value) -> Result<usize> {
        let descs = descs.as_object().ok_or_else(|| {
            GoapError::InvalidActionTplDesc(format!(
                "expected a map of template names to params, got {}",
                descs
            ))
        })?;

        for (name, params) in descs {
            self.register_action_tpl(name, params)?;
        }

        Ok(self.end_action_tpls())
    }

    pub fn find_action_tpl(&self, name: &str) -> Option<ActionTplId> {
        self.registry.find(name)
    }

    pub fn action_tpl(&self, id: ActionTplId) -> Option<&dyn ActionTpl> {
        self.registry.get(id)
    }

    pub fn action_tpl_name(&self, id: ActionTplId) -> Option<&str> {
        self.registry.name(id)
    }

    pub fn action_tpl_count(&self) -> usize {
        self.registry.len()
    }

    /// Indexed templates whose effects change `prop`, in registration order.
    pub fn effect_candidates(&self, prop: WorldProp) -> &[ActionTplId] {
        self.registry.candidates(prop)
    }

    /// Search nodes currently taken from the pool. Zero whenever no plan is being built.
    pub fn outstanding_nodes(&self) -> usize {
        self.scratch.outstanding()
    }

    /// Builds a plan for `actor` to reach `goal`.
    ///
    /// Returns `Ok(None)` if no chain of templates reaches the goal, and an
    /// empty plan if the actor already satisfies it.
    ///
    /// # Errors
    ///
    /// - [`GoapError::ActionTplsNotIndexed`] before the first `end_action_tpls`
    /// - [`GoapError::NodePoolExhausted`] or [`GoapError::SearchBudgetExceeded`]
    ///   when the search outgrows the configured bounds
    pub fn try_build_plan(&mut self, actor: &dyn Actor, goal: &dyn Goal) -> Result<Option<Plan>> {
        if !self.registry.is_indexed() {
            return Err(GoapError::ActionTplsNotIndexed);
        }

        let plan = self
            .scratch
            .search(&self.registry, &self.config, actor, goal)?;
        if plan.is_none() {
            log::debug!("Planner -> '{}' no valid plan", actor.uid());
        }
        Ok(plan)
    }

    /// Like [`try_build_plan`](Self::try_build_plan), logging failures and
    /// reporting them as no plan.
    pub fn build_plan(&mut self, actor: &dyn Actor, goal: &dyn Goal) -> Option<Plan> {
        match self.try_build_plan(actor, goal) {
            Ok(plan) => plan,
            Err(e) => {
                log::error!("Planner -> '{}' planning failed: {}", actor.uid(), e);
                None
            }
        }
    }
}
