//! Backward best-first search over world state deltas.
//!
//! The search starts from the goal and regresses toward the actor's reality.
//! Each node pairs a goal state (what must hold) with a current state (what
//! the actor's reality plus the effects applied so far give for the same
//! properties). Expanding a node picks templates whose effects touch a
//! property that still differs; their preconditions become new goal
//! properties of the child.
//!
//! A node is accepted as soon as replaying its template chain forward from
//! the actor's state reaches the root goal.

use crate::pool::{NodeHandle, NodePool};
use crate::registry::ActionTplRegistry;
use crate::{
    Action, ActionTplId, Actor, GoapError, Goal, Plan, PlanStep, PlannerConfig, Result, WorldProp,
    WorldState,
};
use std::cmp::Reverse;

/// A node in the search tree.
#[derive(Debug, Default)]
pub(crate) struct PlanNode {
    /// Template applied to reach the parent's goal, `None` for the root
    action: Option<ActionTplId>,
    ws_curr: WorldState,
    ws_goal: WorldState,
    ws_preconditions: WorldState,
    has_preconditions: bool,
    /// Cost so far
    cost: f32,
    /// `cost` plus the number of goal properties still unsatisfied
    fitness: f32,
    parent: Option<NodeHandle>,
}

/// Buffers reused across searches of one planner.
#[derive(Debug)]
pub(crate) struct SearchScratch {
    pool: NodePool<PlanNode>,
    open: Vec<NodeHandle>,
    closed: Vec<NodeHandle>,
    neighbors: Vec<ActionTplId>,
    added: Vec<bool>,
}

impl SearchScratch {
    pub fn new(max_nodes: usize) -> Self {
        Self {
            pool: NodePool::new(max_nodes),
            open: Vec::new(),
            closed: Vec::new(),
            neighbors: Vec::new(),
            added: Vec::new(),
        }
    }

    pub fn outstanding(&self) -> usize {
        self.pool.outstanding()
    }

    /// Runs one search. Every node is back in the pool when this returns.
    pub fn search(
        &mut self,
        registry: &ActionTplRegistry,
        config: &PlannerConfig,
        actor: &dyn Actor,
        goal: &dyn Goal,
    ) -> Result<Option<Plan>> {
        let result = self.run(registry, config, actor, goal);
        self.release_all();
        result
    }

    fn run(
        &mut self,
        registry: &ActionTplRegistry,
        config: &PlannerConfig,
        actor: &dyn Actor,
        goal: &dyn Goal,
    ) -> Result<Option<Plan>> {
        let mut ws_actor = WorldState::new();
        actor.fill_world_state(&mut ws_actor);

        let root = self.pool.acquire()?;
        {
            let node = self.pool.get_mut(root);
            goal.desired_props(&mut node.ws_goal);
            node.ws_curr.merge(&node.ws_goal, &ws_actor);
            node.fitness = node.ws_curr.diff_count(&node.ws_goal) as f32;
        }
        self.open.push(root);

        let mut expansions = 0;
        while let Some(current) = self.pop_best() {
            self.closed.push(current);

            if self.is_plan_valid(registry, current, &ws_actor) {
                return Ok(Some(self.reconstruct_plan(registry, actor, current)));
            }

            if expansions >= config.max_iterations {
                return Err(GoapError::SearchBudgetExceeded(config.max_iterations));
            }
            expansions += 1;

            self.fill_neighbors(registry, actor, current);
            log::trace!(
                "Planner -> '{}' expanding node (fitness {}), {} neighbours",
                actor.uid(),
                self.pool.get(current).fitness,
                self.neighbors.len()
            );

            for i in 0..self.neighbors.len() {
                let tpl = self.neighbors[i];
                self.generate_successor(registry, actor, current, tpl, &ws_actor)?;
            }
        }

        Ok(None)
    }

    /// Removes the open node with the lowest fitness, the earliest one on ties.
    fn pop_best(&mut self) -> Option<NodeHandle> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &handle) in self.open.iter().enumerate() {
            let fitness = self.pool.get(handle).fitness;
            if best.map_or(true, |(_, lowest)| fitness < lowest) {
                best = Some((i, fitness));
            }
        }

        best.map(|(i, _)| self.open.remove(i))
    }

    /// Replays the template chain from `handle` up to the root, starting
    /// from the actor's state restricted to the node's current properties.
    ///
    /// Every step must change something and must not contradict what the
    /// state already holds for its preconditions; the final state must
    /// satisfy the root goal. The root itself is valid only if the actor
    /// already satisfies the goal.
    fn is_plan_valid(&self, registry: &ActionTplRegistry, handle: NodeHandle, ws_actor: &WorldState) -> bool {
        let mut node = self.pool.get(handle);
        let Some(mut parent_handle) = node.parent else {
            return node.ws_curr.satisfies(&node.ws_goal);
        };

        let mut state = WorldState::new();
        state.merge(&node.ws_curr, ws_actor);

        loop {
            let parent = self.pool.get(parent_handle);
            let Some(tpl) = node.action.and_then(|id| registry.get(id)) else {
                return false;
            };
            let parent_goal = &parent.ws_goal;

            let changes_something = tpl.effects().iter().any(|(prop, effect)| {
                parent_goal
                    .resolve(effect)
                    .map_or(true, |value| state.get(prop) != Some(value))
            });
            if !changes_something {
                return false;
            }

            if node.has_preconditions {
                let contradicts = node.ws_preconditions.iter().any(|(prop, pre)| {
                    matches!(
                        (state.get(prop), parent_goal.resolve(pre)),
                        (Some(have), Some(want)) if have != want
                    )
                });
                if contradicts {
                    return false;
                }
            }

            for (prop, effect) in tpl.effects().iter() {
                if let Some(value) = parent_goal.resolve(effect) {
                    state.set(prop, value.clone());
                }
            }

            match parent.parent {
                Some(next) => {
                    node = parent;
                    parent_handle = next;
                }
                None => return state.satisfies(parent_goal),
            }
        }
    }

    /// Collects the templates able to change a property the node still
    /// needs, deduplicated and sorted by precedence, highest first.
    fn fill_neighbors(&mut self, registry: &ActionTplRegistry, actor: &dyn Actor, handle: NodeHandle) {
        self.neighbors.clear();
        self.added.clear();
        self.added.resize(registry.len(), false);

        let node = self.pool.get(handle);
        'props: for prop in WorldProp::ALL {
            match (node.ws_curr.get(prop), node.ws_goal.get(prop)) {
                (Some(curr), Some(goal)) if curr != goal => {}
                _ => continue,
            }

            for &id in registry.candidates(prop) {
                if self.added[id.index()] {
                    continue;
                }
                let Some(tpl) = registry.get(id) else {
                    continue;
                };

                if actor.is_action_available(id)
                    && tpl.validate_context_preconditions(actor, &node.ws_goal)
                {
                    self.neighbors.push(id);
                    self.added[id.index()] = true;
                    if self.neighbors.len() >= registry.len() {
                        break 'props;
                    }
                }
            }
        }

        self.neighbors
            .sort_by_key(|&id| Reverse(registry.get(id).map_or(0, |tpl| tpl.precedence())));
    }

    fn generate_successor(
        &mut self,
        registry: &ActionTplRegistry,
        actor: &dyn Actor,
        parent: NodeHandle,
        tpl_id: ActionTplId,
        ws_actor: &WorldState,
    ) -> Result<()> {
        let Some(tpl) = registry.get(tpl_id) else {
            return Ok(());
        };

        let child = self.pool.acquire()?;

        let parent_node = self.pool.get(parent);
        let mut node = PlanNode {
            action: Some(tpl_id),
            ws_curr: parent_node.ws_curr.clone(),
            ws_goal: parent_node.ws_goal.clone(),
            parent: Some(parent),
            ..Default::default()
        };

        node.has_preconditions =
            tpl.preconditions(actor, &mut node.ws_preconditions, &parent_node.ws_goal);

        // Effects resolve against the goal they are meant to satisfy
        for (prop, effect) in tpl.effects().iter() {
            if let Some(value) = parent_node.ws_goal.resolve(effect) {
                node.ws_curr.set(prop, value.clone());
            }
        }

        // Preconditions become new goals, resolved against the child's own goal
        if node.has_preconditions {
            for (prop, pre) in node.ws_preconditions.iter() {
                let resolved = node.ws_goal.resolve(pre).cloned();
                if let Some(value) = resolved {
                    node.ws_goal.set(prop, value);
                }
            }
        }

        node.ws_curr.merge(&node.ws_goal, ws_actor);
        node.cost = parent_node.cost + tpl.cost();
        node.fitness = node.cost + node.ws_curr.diff_count(&node.ws_goal) as f32;

        *self.pool.get_mut(child) = node;
        self.open.push(child);
        Ok(())
    }

    /// Walks from the accepted node to the root. The accepted node is the
    /// deepest regression step, so it is the first to execute.
    fn reconstruct_plan(&self, registry: &ActionTplRegistry, actor: &dyn Actor, terminal: NodeHandle) -> Plan {
        log::debug!("Planner -> '{}' Begin plan", actor.uid());

        let mut steps = Vec::new();
        let mut actions: Vec<Box<dyn Action>> = Vec::new();

        let mut current = self.pool.get(terminal);
        while let (Some(tpl_id), Some(parent)) = (current.action, current.parent) {
            let parent = self.pool.get(parent);
            let context = &parent.ws_goal;
            let instance = registry.get(tpl_id).and_then(|tpl| tpl.create_instance(context));

            if let Some(action) = &instance {
                log::debug!(
                    "Planner -> '{}'     Action added: '{}'",
                    actor.uid(),
                    action.debug_string()
                );
            }

            steps.push(PlanStep {
                template: tpl_id,
                name: registry.name(tpl_id).unwrap_or_default().to_string(),
                context: context.clone(),
                instantiated: instance.is_some(),
            });
            actions.extend(instance);

            current = parent;
        }

        log::debug!("Planner -> '{}' End plan", actor.uid());

        Plan::new(steps, actions, self.pool.get(terminal).cost)
    }

    fn release_all(&mut self) {
        for handle in self.open.drain(..).chain(self.closed.drain(..)) {
            self.pool.release(handle);
        }
    }
}
