use crate::Result;
use serde::Deserialize;

/// Search bounds of a [`Planner`](crate::Planner).
///
/// A search that needs more nodes or expansions than allowed is abandoned
/// as runaway.
///
/// ```
/// use goap_planner::PlannerConfig;
///
/// let config: PlannerConfig = serde_json::from_str(r#"{ "max_iterations": 64 }"#).unwrap();
/// assert_eq!(config.max_iterations, 64);
/// assert_eq!(config.max_nodes, PlannerConfig::default().max_nodes);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Most search nodes alive at once
    pub max_nodes: usize,
    /// Most nodes expanded in a single plan
    pub max_iterations: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_nodes: 1024,
            max_iterations: 512,
        }
    }
}

impl PlannerConfig {
    /// Reads the bounds from an already parsed settings section.
    /// `null` yields the defaults.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value.clone())?)
    }
}
