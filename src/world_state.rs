//! World state representation for backward-chaining GOAP.
//!
//! This module provides the [`WorldState`] structure, which is used for:
//! - The actor's snapshot of reality
//! - The properties a goal wants to be true
//! - Action effects and preconditions
//! - The per-node current/goal pair tracked by the search
//!
//! The property universe is the fixed [`WorldProp`] enumeration, so a world
//! state is a small array indexed by property rather than a map. Every
//! property is either unset or holds exactly one [`Value`].
//!
//! # Example
//!
//! ```
//! use goap_planner::{Value, WorldProp, WorldState};
//!
//! // What the actor currently has
//! let mut reality = WorldState::new();
//! reality.set(WorldProp::HasItem, Value::id(""));
//! reality.set(WorldProp::AtEntityPos, Value::id("Door"));
//!
//! // What the goal wants
//! let mut goal = WorldState::new();
//! goal.set(WorldProp::HasItem, Value::id("Key"));
//!
//! // Project reality onto the properties the goal cares about
//! let mut current = WorldState::new();
//! current.merge(&goal, &reality);
//! assert!(current.is_set(WorldProp::HasItem));
//! assert!(!current.is_set(WorldProp::AtEntityPos));
//! assert_eq!(current.diff_count(&goal), 1);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The fixed universe of world state properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldProp {
    /// The actor stands at the position of an entity
    AtEntityPos,
    /// The actor is using a smart object
    UsingSmartObj,
    /// The actor is performing a named action
    Action,
    /// The actor carries an item
    HasItem,
    /// The actor has an item equipped
    ItemEquipped,
}

impl WorldProp {
    pub const COUNT: usize = 5;

    pub const ALL: [WorldProp; WorldProp::COUNT] = [
        WorldProp::AtEntityPos,
        WorldProp::UsingSmartObj,
        WorldProp::Action,
        WorldProp::HasItem,
        WorldProp::ItemEquipped,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WorldProp::AtEntityPos => "at_entity_pos",
            WorldProp::UsingSmartObj => "using_smart_obj",
            WorldProp::Action => "action",
            WorldProp::HasItem => "has_item",
            WorldProp::ItemEquipped => "item_equipped",
        }
    }
}

impl fmt::Display for WorldProp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A world state property value.
///
/// Either a concrete datum or a [`Value::Var`] reference to another
/// property. A reference is resolved by looking the named property up in
/// some other world state, see [`WorldState::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Bool(bool),
    Int(i64),
    /// Identifier of an entity, item, smart object action etc.
    /// The empty identifier means "none".
    Id(String),
    /// Whatever value the referenced property holds in the resolving state
    Var(WorldProp),
}

impl Value {
    pub fn id(id: impl Into<String>) -> Self {
        Value::Id(id.into())
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Value::Var(_))
    }

    pub fn as_id(&self) -> Option<&str> {
        match self {
            Value::Id(id) => Some(id.as_str()),
            _ => None,
        }
    }

    /// A non-empty identifier, the usual way templates read their target
    pub fn as_target(&self) -> Option<&str> {
        self.as_id().filter(|id| !id.is_empty())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Id(value.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Id(id) if id.is_empty() => write!(f, "<none>"),
            Value::Id(id) => write!(f, "{}", id),
            Value::Var(prop) => write!(f, "${}", prop),
        }
    }
}

/// `WorldState` is a partial assignment of values to the [`WorldProp`] universe.
///
/// It is used both for what is currently true and for what must become true.
/// All operations are total over the universe and cost at most one pass over it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<WorldProp, Value>",
    into = "BTreeMap<WorldProp, Value>"
)]
pub struct WorldState {
    props: [Option<Value>; WorldProp::COUNT],
}

impl WorldState {
    /// Creates a new WorldState with every property unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a WorldState from `(property, value)` pairs.
    ///
    /// # Examples
    ///
    /// ```
    /// use goap_planner::{Value, WorldProp, WorldState};
    ///
    /// let effects = WorldState::from_props([
    ///     (WorldProp::HasItem, Value::Var(WorldProp::HasItem)),
    ///     (WorldProp::Action, Value::id("Pick")),
    /// ]);
    /// assert_eq!(effects.len(), 2);
    /// ```
    pub fn from_props<I, V>(props: I) -> Self
    where
        I: IntoIterator<Item = (WorldProp, V)>,
        V: Into<Value>,
    {
        let mut state = Self::new();
        for (prop, value) in props {
            state.set(prop, value);
        }
        state
    }

    #[inline]
    pub fn is_set(&self, prop: WorldProp) -> bool {
        self.props[prop.index()].is_some()
    }

    /// Gets the value of a property, `None` if it is unset.
    #[inline]
    pub fn get(&self, prop: WorldProp) -> Option<&Value> {
        self.props[prop.index()].as_ref()
    }

    pub fn set(&mut self, prop: WorldProp, value: impl Into<Value>) {
        self.props[prop.index()] = Some(value.into());
    }

    pub fn unset(&mut self, prop: WorldProp) {
        self.props[prop.index()] = None;
    }

    pub fn clear(&mut self) {
        self.props = Default::default();
    }

    /// Copies `prop` from `other`. Leaves it untouched if `other` lacks it.
    pub fn set_from(&mut self, prop: WorldProp, other: &WorldState) {
        if let Some(value) = other.get(prop) {
            self.props[prop.index()] = Some(value.clone());
        }
    }

    /// For every property set in `wanted` but unset here, takes the value from `fallback`.
    ///
    /// This projects a snapshot of reality onto exactly the properties a goal
    /// or an action cares about.
    ///
    /// # Examples
    ///
    /// ```
    /// use goap_planner::{Value, WorldProp, WorldState};
    ///
    /// let reality = WorldState::from_props([
    ///     (WorldProp::HasItem, Value::id("")),
    ///     (WorldProp::ItemEquipped, Value::id("Club")),
    /// ]);
    /// let goal = WorldState::from_props([(WorldProp::ItemEquipped, Value::id("Sword"))]);
    ///
    /// let mut current = WorldState::new();
    /// current.merge(&goal, &reality);
    ///
    /// assert_eq!(current.get(WorldProp::ItemEquipped), Some(&Value::id("Club")));
    /// assert!(!current.is_set(WorldProp::HasItem));
    /// ```
    pub fn merge(&mut self, wanted: &WorldState, fallback: &WorldState) {
        for prop in WorldProp::ALL {
            if wanted.is_set(prop) && !self.is_set(prop) {
                self.set_from(prop, fallback);
            }
        }
    }

    /// Counts the properties set in `reference` that are unset here or hold another value.
    ///
    /// This is the search heuristic: the number of goal properties still unsatisfied.
    ///
    /// # Examples
    ///
    /// ```
    /// use goap_planner::{Value, WorldProp, WorldState};
    ///
    /// let current = WorldState::from_props([
    ///     (WorldProp::HasItem, Value::id("Key")),
    ///     (WorldProp::AtEntityPos, Value::id("Hall")),
    /// ]);
    /// let goal = WorldState::from_props([
    ///     (WorldProp::HasItem, Value::id("Key")),   // same
    ///     (WorldProp::AtEntityPos, Value::id("Vault")), // different
    ///     (WorldProp::ItemEquipped, Value::id("Key")), // missing
    /// ]);
    /// assert_eq!(current.diff_count(&goal), 2);
    /// ```
    pub fn diff_count(&self, reference: &WorldState) -> usize {
        WorldProp::ALL
            .into_iter()
            .filter(|&prop| match reference.get(prop) {
                Some(wanted) => self.get(prop) != Some(wanted),
                None => false,
            })
            .count()
    }

    /// Checks that every property set in `other` holds the same value here.
    pub fn satisfies(&self, other: &WorldState) -> bool {
        self.diff_count(other) == 0
    }

    /// Resolves a value against this state.
    ///
    /// Concrete values resolve to themselves. A [`Value::Var`] resolves to
    /// whatever the referenced property holds here, exactly one hop deep:
    /// a reference to an unset property, or to a property that itself holds
    /// a reference, resolves to `None`.
    pub fn resolve<'a>(&'a self, value: &'a Value) -> Option<&'a Value> {
        match value {
            Value::Var(prop) => match self.get(*prop) {
                Some(Value::Var(next)) => {
                    log::warn!(
                        "World state reference ${} points to another reference ${}, treated as unresolved",
                        prop,
                        next
                    );
                    None
                }
                resolved => resolved,
            },
            concrete => Some(concrete),
        }
    }

    /// Iterates over the set properties in universe order.
    pub fn iter(&self) -> impl Iterator<Item = (WorldProp, &Value)> + '_ {
        WorldProp::ALL
            .into_iter()
            .filter_map(move |prop| self.get(prop).map(|value| (prop, value)))
    }

    /// Number of set properties.
    pub fn len(&self) -> usize {
        self.props.iter().filter(|value| value.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.props.iter().all(Option::is_none)
    }
}

impl From<BTreeMap<WorldProp, Value>> for WorldState {
    fn from(map: BTreeMap<WorldProp, Value>) -> Self {
        Self::from_props(map)
    }
}

impl From<WorldState> for BTreeMap<WorldProp, Value> {
    fn from(state: WorldState) -> Self {
        state
            .iter()
            .map(|(prop, value)| (prop, value.clone()))
            .collect()
    }
}

impl fmt::Display for WorldState {
    /// Displays the set properties as `{prop: value, ...}` in universe order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (prop, value) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", prop, value)?;
            first = false;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_unset() {
        let mut state = WorldState::new();
        assert!(state.is_empty());
        state.set(WorldProp::HasItem, Value::id("Key"));
        assert!(state.is_set(WorldProp::HasItem));
        assert_eq!(state.get(WorldProp::HasItem), Some(&Value::id("Key")));
        state.set(WorldProp::HasItem, Value::id("Rope"));
        assert_eq!(state.get(WorldProp::HasItem), Some(&Value::id("Rope")));
        assert_eq!(state.len(), 1);
        state.unset(WorldProp::HasItem);
        assert!(!state.is_set(WorldProp::HasItem));
        assert!(state.is_empty());
    }

    #[test]
    fn test_set_from_skips_unset_source() {
        let mut source = WorldState::new();
        source.set(WorldProp::Action, Value::id("Sit"));

        let mut target = WorldState::new();
        target.set(WorldProp::HasItem, true);
        target.set_from(WorldProp::Action, &source);
        target.set_from(WorldProp::HasItem, &source);

        assert_eq!(target.get(WorldProp::Action), Some(&Value::id("Sit")));
        assert_eq!(target.get(WorldProp::HasItem), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_merge_keeps_existing_values() {
        let mut reality = WorldState::new();
        reality.set(WorldProp::AtEntityPos, Value::id("Hall"));
        reality.set(WorldProp::HasItem, Value::id(""));

        let mut goal = WorldState::new();
        goal.set(WorldProp::AtEntityPos, Value::id("Vault"));
        goal.set(WorldProp::HasItem, Value::id("Gold"));
        goal.set(WorldProp::ItemEquipped, Value::id("Gold"));

        let mut current = WorldState::new();
        current.set(WorldProp::HasItem, Value::id("Gold"));
        current.merge(&goal, &reality);

        assert_eq!(current.get(WorldProp::AtEntityPos), Some(&Value::id("Hall")));
        assert_eq!(current.get(WorldProp::HasItem), Some(&Value::id("Gold")));
        // reality does not know it, so it stays unset
        assert!(!current.is_set(WorldProp::ItemEquipped));
        assert!(!current.is_set(WorldProp::Action));
    }

    #[test]
    fn test_diff_count() {
        let mut current = WorldState::new();
        current.set(WorldProp::AtEntityPos, Value::id("Hall"));
        current.set(WorldProp::Action, Value::id("Sit"));

        let mut goal = WorldState::new();
        goal.set(WorldProp::AtEntityPos, Value::id("Hall"));
        goal.set(WorldProp::HasItem, Value::id("Gold"));

        assert_eq!(current.diff_count(&goal), 1);
        // properties only set on the left side do not count
        assert_eq!(goal.diff_count(&current), 1);
        assert_eq!(current.diff_count(&WorldState::new()), 0);
        assert!(!current.satisfies(&goal));

        current.set(WorldProp::HasItem, Value::id("Gold"));
        assert!(current.satisfies(&goal));
    }

    #[test]
    fn test_resolve_one_hop() {
        let mut goal = WorldState::new();
        goal.set(WorldProp::HasItem, Value::id("Key"));
        goal.set(WorldProp::Action, Value::Var(WorldProp::HasItem));

        let concrete = Value::Bool(true);
        assert_eq!(goal.resolve(&concrete), Some(&Value::Bool(true)));
        assert_eq!(
            goal.resolve(&Value::Var(WorldProp::HasItem)),
            Some(&Value::id("Key"))
        );
        assert_eq!(goal.resolve(&Value::Var(WorldProp::ItemEquipped)), None);
        // chains longer than one hop are not followed
        assert_eq!(goal.resolve(&Value::Var(WorldProp::Action)), None);
    }

    #[test]
    fn test_iter_in_universe_order() {
        let state = WorldState::from_props([
            (WorldProp::ItemEquipped, Value::id("Sword")),
            (WorldProp::AtEntityPos, Value::id("Armory")),
        ]);
        let props: Vec<_> = state.iter().map(|(prop, _)| prop).collect();
        assert_eq!(props, [WorldProp::AtEntityPos, WorldProp::ItemEquipped]);
        assert_eq!(state.to_string(), "{at_entity_pos: Armory, item_equipped: Sword}");
    }

    #[test]
    fn test_deserialize_from_map() {
        let state: WorldState = serde_json::from_value(serde_json::json!({
            "has_item": { "var": "item_equipped" },
            "action": { "id": "Pray" },
            "using_smart_obj": { "bool": false },
        }))
        .unwrap();

        assert_eq!(
            state.get(WorldProp::HasItem),
            Some(&Value::Var(WorldProp::ItemEquipped))
        );
        assert_eq!(state.get(WorldProp::Action), Some(&Value::id("Pray")));
        assert_eq!(state.get(WorldProp::UsingSmartObj), Some(&Value::Bool(false)));
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::id("").to_string(), "<none>");
        assert_eq!(Value::Var(WorldProp::HasItem).to_string(), "$has_item");
        assert_eq!(Value::Int(3).to_string(), "3");
        assert_eq!(Value::id("Door").as_target(), Some("Door"));
        assert_eq!(Value::id("").as_target(), None);
    }
}
