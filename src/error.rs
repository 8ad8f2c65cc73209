use thiserror::Error;

/// Top-level error type for the Planis path kernel.
#[derive(Debug, Error)]
pub enum PlanisError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors related to geometric inputs and parameters.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is invalid: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors raised while building or walking a planar graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The subdivision could not be made consistent under the active tolerance.
    #[error("planar graph is not eulerian: {points} point(s) have unbalanced edge weights")]
    NonEulerianGraph { points: usize },

    #[error("intersection resolution did not converge after {passes} passes")]
    NotConverged { passes: usize },

    #[error("entity not found: {0}")]
    EntityNotFound(&'static str),
}

/// Errors related to path operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("operation needs at least two non-degenerate operands, found {found}")]
    InsufficientOperands { found: usize },

    #[error("operand {operand} flattens to fewer than two meaningful segments")]
    DegenerateOperand { operand: usize },

    #[error("fill rule FromStyle must be resolved by the caller before calling in")]
    UnresolvedFillRule,

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience type alias for results using [`PlanisError`].
pub type Result<T> = std::result::Result<T, PlanisError>;

impl PlanisError {
    /// Returns `true` for errors a caller should report as unsupported input
    /// rather than as a bug.
    #[must_use]
    pub fn is_unsupported_input(&self) -> bool {
        matches!(
            self,
            Self::Graph(GraphError::NonEulerianGraph { .. } | GraphError::NotConverged { .. })
                | Self::Operation(OperationError::DegenerateOperand { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_eulerian_is_unsupported_input() {
        let err: PlanisError = GraphError::NonEulerianGraph { points: 3 }.into();
        assert!(err.is_unsupported_input());
        assert!(err.to_string().contains("3 point(s)"));
    }

    #[test]
    fn invalid_input_is_not_unsupported_input() {
        let err: PlanisError = OperationError::InvalidInput("nope".into()).into();
        assert!(!err.is_unsupported_input());
    }
}
