//! Built-in action template kinds and the actions they instantiate.
//!
//! The location-bound kinds chain through variable references: picking an
//! item requires standing where the item is, equipping requires carrying it,
//! and `Goto` satisfies whatever position the goal asks for.

use crate::action_tpl::parse_params;
use crate::{
    Action, ActionTpl, ActionTplFactory, Actor, Result, Value, WorldProp, WorldState,
};
use serde::Deserialize;

pub(crate) fn register_builtin(factory: &mut ActionTplFactory) {
    factory.register("Goto", GotoTpl::create);
    factory.register("PickItem", PickItemTpl::create);
    factory.register("EquipItem", EquipItemTpl::create);
    factory.register("UseSmartObj", UseSmartObjTpl::create);
    factory.register("Static", StaticActionTpl::create);
}

/// Settings every kind reads
#[derive(Debug, Deserialize)]
#[serde(default)]
struct CommonParams {
    cost: f32,
    precedence: i32,
}

impl Default for CommonParams {
    fn default() -> Self {
        Self {
            cost: 1.0,
            precedence: 0,
        }
    }
}

fn target_of(state: &WorldState, prop: WorldProp) -> Option<&str> {
    state.get(prop).and_then(Value::as_target)
}

// Goto

#[derive(Debug)]
pub struct GotoTpl {
    effects: WorldState,
    params: CommonParams,
}

impl GotoTpl {
    fn create(name: &str, params: &serde_json::Value) -> Result<Box<dyn ActionTpl>> {
        Ok(Box::new(Self {
            effects: WorldState::from_props([(
                WorldProp::AtEntityPos,
                Value::Var(WorldProp::AtEntityPos),
            )]),
            params: parse_params(name, params)?,
        }))
    }
}

impl ActionTpl for GotoTpl {
    fn effects(&self) -> &WorldState {
        &self.effects
    }

    fn validate_context_preconditions(&self, _actor: &dyn Actor, goal: &WorldState) -> bool {
        target_of(goal, WorldProp::AtEntityPos).is_some()
    }

    fn cost(&self) -> f32 {
        self.params.cost
    }

    fn precedence(&self) -> i32 {
        self.params.precedence
    }

    fn create_instance(&self, context: &WorldState) -> Option<Box<dyn Action>> {
        let target = target_of(context, WorldProp::AtEntityPos)?;
        Some(Box::new(ActionGoto {
            target: target.to_string(),
        }))
    }
}

/// Moves the actor to an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionGoto {
    pub target: String,
}

impl Action for ActionGoto {
    fn name(&self) -> &str {
        "Goto"
    }

    fn debug_string(&self) -> String {
        format!("Goto({})", self.target)
    }
}

// PickItem

#[derive(Debug)]
pub struct PickItemTpl {
    effects: WorldState,
    params: CommonParams,
}

impl PickItemTpl {
    fn create(name: &str, params: &serde_json::Value) -> Result<Box<dyn ActionTpl>> {
        Ok(Box::new(Self {
            effects: WorldState::from_props([(WorldProp::HasItem, Value::Var(WorldProp::HasItem))]),
            params: parse_params(name, params)?,
        }))
    }
}

impl ActionTpl for PickItemTpl {
    fn effects(&self) -> &WorldState {
        &self.effects
    }

    fn preconditions(&self, _actor: &dyn Actor, out: &mut WorldState, _parent_goal: &WorldState) -> bool {
        // stand where the item lies
        out.set(WorldProp::AtEntityPos, Value::Var(WorldProp::HasItem));
        true
    }

    fn validate_context_preconditions(&self, _actor: &dyn Actor, goal: &WorldState) -> bool {
        target_of(goal, WorldProp::HasItem).is_some()
    }

    fn cost(&self) -> f32 {
        self.params.cost
    }

    fn precedence(&self) -> i32 {
        self.params.precedence
    }

    fn create_instance(&self, context: &WorldState) -> Option<Box<dyn Action>> {
        let item = target_of(context, WorldProp::HasItem)?;
        Some(Box::new(ActionPickItem {
            item: item.to_string(),
        }))
    }
}

/// Picks an item up into the actor's inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionPickItem {
    pub item: String,
}

impl Action for ActionPickItem {
    fn name(&self) -> &str {
        "PickItem"
    }

    fn debug_string(&self) -> String {
        format!("PickItem({})", self.item)
    }
}

// EquipItem

#[derive(Debug)]
pub struct EquipItemTpl {
    effects: WorldState,
    params: CommonParams,
}

impl EquipItemTpl {
    fn create(name: &str, params: &serde_json::Value) -> Result<Box<dyn ActionTpl>> {
        Ok(Box::new(Self {
            effects: WorldState::from_props([(
                WorldProp::ItemEquipped,
                Value::Var(WorldProp::ItemEquipped),
            )]),
            params: parse_params(name, params)?,
        }))
    }
}

impl ActionTpl for EquipItemTpl {
    fn effects(&self) -> &WorldState {
        &self.effects
    }

    fn preconditions(&self, _actor: &dyn Actor, out: &mut WorldState, _parent_goal: &WorldState) -> bool {
        out.set(WorldProp::HasItem, Value::Var(WorldProp::ItemEquipped));
        true
    }

    fn validate_context_preconditions(&self, _actor: &dyn Actor, goal: &WorldState) -> bool {
        target_of(goal, WorldProp::ItemEquipped).is_some()
    }

    fn cost(&self) -> f32 {
        self.params.cost
    }

    fn precedence(&self) -> i32 {
        self.params.precedence
    }

    fn create_instance(&self, context: &WorldState) -> Option<Box<dyn Action>> {
        let item = target_of(context, WorldProp::ItemEquipped)?;
        Some(Box::new(ActionEquipItem {
            item: item.to_string(),
        }))
    }
}

/// Equips an item the actor carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEquipItem {
    pub item: String,
}

impl Action for ActionEquipItem {
    fn name(&self) -> &str {
        "EquipItem"
    }

    fn debug_string(&self) -> String {
        format!("EquipItem({})", self.item)
    }
}

// UseSmartObj

#[derive(Debug, Deserialize)]
#[serde(default)]
struct UseSmartObjParams {
    cost: f32,
    precedence: i32,
    /// Smart object action to run, the object's default when absent
    action: Option<String>,
}

impl Default for UseSmartObjParams {
    fn default() -> Self {
        Self {
            cost: 1.0,
            precedence: 0,
            action: None,
        }
    }
}

#[derive(Debug)]
pub struct UseSmartObjTpl {
    effects: WorldState,
    params: UseSmartObjParams,
}

impl UseSmartObjTpl {
    fn create(name: &str, params: &serde_json::Value) -> Result<Box<dyn ActionTpl>> {
        Ok(Box::new(Self {
            effects: WorldState::from_props([(
                WorldProp::UsingSmartObj,
                Value::Var(WorldProp::UsingSmartObj),
            )]),
            params: parse_params(name, params)?,
        }))
    }
}

impl ActionTpl for UseSmartObjTpl {
    fn effects(&self) -> &WorldState {
        &self.effects
    }

    fn preconditions(&self, _actor: &dyn Actor, out: &mut WorldState, _parent_goal: &WorldState) -> bool {
        out.set(WorldProp::AtEntityPos, Value::Var(WorldProp::UsingSmartObj));
        true
    }

    fn validate_context_preconditions(&self, _actor: &dyn Actor, goal: &WorldState) -> bool {
        target_of(goal, WorldProp::UsingSmartObj).is_some()
    }

    fn cost(&self) -> f32 {
        self.params.cost
    }

    fn precedence(&self) -> i32 {
        self.params.precedence
    }

    fn create_instance(&self, context: &WorldState) -> Option<Box<dyn Action>> {
        let target = target_of(context, WorldProp::UsingSmartObj)?;
        Some(Box::new(ActionUseSmartObj {
            target: target.to_string(),
            action: self.params.action.clone(),
        }))
    }
}

/// Uses a smart object, optionally running one of its named actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionUseSmartObj {
    pub target: String,
    pub action: Option<String>,
}

impl Action for ActionUseSmartObj {
    fn name(&self) -> &str {
        "UseSmartObj"
    }

    fn debug_string(&self) -> String {
        match &self.action {
            Some(action) => format!("UseSmartObj({}: {})", self.target, action),
            None => format!("UseSmartObj({})", self.target),
        }
    }
}

// Static

#[derive(Debug, Deserialize)]
#[serde(default)]
struct StaticParams {
    cost: f32,
    precedence: i32,
    effects: WorldState,
    preconditions: WorldState,
    /// `false` turns the template into a pass-through step
    instantiate: bool,
}

impl Default for StaticParams {
    fn default() -> Self {
        Self {
            cost: 1.0,
            precedence: 0,
            effects: WorldState::new(),
            preconditions: WorldState::new(),
            instantiate: true,
        }
    }
}

/// A template described entirely by its params.
///
/// ```
/// use goap_planner::{ActionTpl, ActionTplFactory, Value, WorldProp};
/// use serde_json::json;
///
/// let factory = ActionTplFactory::with_builtin();
/// let tpl = factory
///     .create(
///         "Pray",
///         &json!({
///             "kind": "Static",
///             "cost": 2.0,
///             "effects": { "action": { "id": "Pray" } },
///             "preconditions": { "at_entity_pos": { "id": "Altar" } },
///         }),
///     )
///     .unwrap();
///
/// assert_eq!(tpl.cost(), 2.0);
/// assert_eq!(tpl.effects().get(WorldProp::Action), Some(&Value::id("Pray")));
/// ```
#[derive(Debug)]
pub struct StaticActionTpl {
    name: String,
    params: StaticParams,
}

impl StaticActionTpl {
    fn create(name: &str, params: &serde_json::Value) -> Result<Box<dyn ActionTpl>> {
        Ok(Box::new(Self {
            name: name.to_string(),
            params: parse_params(name, params)?,
        }))
    }
}

impl ActionTpl for StaticActionTpl {
    fn effects(&self) -> &WorldState {
        &self.params.effects
    }

    fn preconditions(&self, _actor: &dyn Actor, out: &mut WorldState, _parent_goal: &WorldState) -> bool {
        for (prop, value) in self.params.preconditions.iter() {
            out.set(prop, value.clone());
        }
        !self.params.preconditions.is_empty()
    }

    fn cost(&self) -> f32 {
        self.params.cost
    }

    fn precedence(&self) -> i32 {
        self.params.precedence
    }

    fn create_instance(&self, context: &WorldState) -> Option<Box<dyn Action>> {
        if !self.params.instantiate {
            return None;
        }

        let mut bindings = WorldState::new();
        for (prop, value) in self.params.effects.iter() {
            if let Some(resolved) = context.resolve(value) {
                bindings.set(prop, resolved.clone());
            }
        }

        Some(Box::new(StaticAction {
            name: self.name.clone(),
            bindings,
        }))
    }
}

/// Instance of a [`StaticActionTpl`], carrying the effect values it should produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAction {
    pub name: String,
    pub bindings: WorldState,
}

impl Action for StaticAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn debug_string(&self) -> String {
        format!("{}{}", self.name, self.bindings)
    }
}
