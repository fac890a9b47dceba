mod action;
mod action_tpl;
mod actor;
mod builtin;
mod config;
mod error;
mod plan;
mod planner;
mod pool;
mod registry;
mod search;
mod world_state;

pub use action::{Action, ActionSequence};
pub use action_tpl::{parse_params, ActionTpl, ActionTplCtor, ActionTplFactory, ActionTplId};
pub use actor::{Actor, Goal};
pub use builtin::{
    ActionEquipItem, ActionGoto, ActionPickItem, ActionUseSmartObj, EquipItemTpl, GotoTpl,
    PickItemTpl, StaticAction, StaticActionTpl, UseSmartObjTpl,
};
pub use config::PlannerConfig;
pub use error::{GoapError, Result};
pub use plan::{Plan, PlanStep};
pub use planner::Planner;
pub use world_state::{Value, WorldProp, WorldState};
