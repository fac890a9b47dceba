use thiserror::Error;

/// Errors reported by the planner.
///
/// Configuration errors surface from template registration. "No plan" is
/// never an error: `Planner::build_plan` returns `None` for it.
#[derive(Error, Debug)]
pub enum GoapError {
    /// The registration names a template kind the factory does not know
    #[error("Unknown action template kind: {0}")]
    UnknownActionTplKind(String),

    /// The params of a template could not be parsed into its kind's settings
    #[error("Invalid params for action template '{name}': {source}")]
    InvalidActionTplParams {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// A template reported a negative or non-finite cost
    #[error("Action cost must be a non-negative number: {0}")]
    InvalidActionCost(String),

    /// A template description collection was not a name -> params map
    #[error("Invalid action template description: {0}")]
    InvalidActionTplDesc(String),

    /// `build_plan` was called before any `end_action_tpls`
    #[error("Action templates were never indexed, call end_action_tpls first")]
    ActionTplsNotIndexed,

    /// The node pool hit its configured size limit
    #[error("Plan node pool exhausted ({0} nodes)")]
    NodePoolExhausted(usize),

    /// The search ran past its configured expansion limit
    #[error("Search exceeded {0} expansions")]
    SearchBudgetExceeded(usize),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GoapError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_unknown_kind_display() {
        let err = GoapError::UnknownActionTplKind("Fly".to_string());
        assert_eq!(format!("{}", err), "Unknown action template kind: Fly");
    }

    #[test]
    fn test_invalid_action_cost_display() {
        let err = GoapError::InvalidActionCost("Goto".to_string());
        assert_eq!(
            format!("{}", err),
            "Action cost must be a non-negative number: Goto"
        );
    }

    #[test]
    fn test_budget_display() {
        assert_eq!(
            format!("{}", GoapError::NodePoolExhausted(8)),
            "Plan node pool exhausted (8 nodes)"
        );
        assert_eq!(
            format!("{}", GoapError::SearchBudgetExceeded(16)),
            "Search exceeded 16 expansions"
        );
    }

    #[test]
    fn test_invalid_params_has_source() {
        let source = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err = GoapError::InvalidActionTplParams {
            name: "Goto".to_string(),
            source,
        };
        assert!(err.source().is_some());
        assert!(format!("{}", err).starts_with("Invalid params for action template 'Goto'"));
    }

    #[test]
    fn test_error_trait() {
        let err = GoapError::ActionTplsNotIndexed;
        assert!(err.source().is_none());
    }
}
