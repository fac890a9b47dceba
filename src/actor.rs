//! Views of the collaborators the planner consults during `build_plan`.

use crate::{ActionTplId, WorldState};

/// The actor a plan is built for.
///
/// Implemented by the actor-brain layer; the planner only reads from it.
pub trait Actor {
    /// Identifier used in log output
    fn uid(&self) -> &str;

    /// Writes the actor's current view of reality into `state`.
    fn fill_world_state(&self, state: &mut WorldState);

    /// Whether this actor may use the template at all, independent of context.
    fn is_action_available(&self, tpl: ActionTplId) -> bool;
}

/// A goal the actor wants to reach.
pub trait Goal {
    /// Writes the desired properties into `state`.
    fn desired_props(&self, state: &mut WorldState);
}

/// A fixed world state works as a goal directly.
impl Goal for WorldState {
    fn desired_props(&self, state: &mut WorldState) {
        for (prop, value) in self.iter() {
            state.set(prop, value.clone());
        }
    }
}
