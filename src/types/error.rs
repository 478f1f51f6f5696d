use thiserror::Error;

/// The error type for this crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A node was constructed with a malformed specification (missing
    /// density/equation/parameters, or an ill-shaped CPT).
    #[error("Invalid node `{0}`: {1}")]
    InvalidNode(String, String),
    /// An operation reserved for root nodes was called on a child node.
    #[error("Node `{0}` is not a root node")]
    NotRoot(String),
    /// An operation reserved for child nodes was called on a root node.
    #[error("Node `{0}` is not a child node")]
    NotChild(String),
    /// The requested variable is not in the factor's scope.
    #[error("Variable `{0}` is not in the factor scope")]
    NotInScope(String),
    /// An assignment map did not cover the factor's scope.
    #[error("Assignment is missing variable `{0}`")]
    MissingAssignment(String),
    /// An index exceeded the cardinality of a discrete variable.
    #[error("Index {0} is out of range for variable `{1}` of cardinality {2}")]
    OutOfRange(usize, String, usize),
    /// A functional and a tabular factor were combined.
    #[error("Cannot combine a functional factor with a tabular factor")]
    MixedRepresentation,
    /// Eliminating the requested variable would leave an empty scope.
    #[error("Eliminating variable `{0}` would collapse the factor to a scalar")]
    CollapseToScalar(String),
    /// The induced graph of a network is not a DAG.
    #[error("Network graph must be a DAG")]
    NotDAG,
    /// A child node references a parent that is not in the network.
    #[error("Parent `{0}` of node `{1}` is not in the network")]
    UnknownParent(String, String),
    /// Two or more nodes share the same variable name.
    #[error("Duplicate node `{0}`")]
    DuplicateNode(String),
    /// A query or evidence variable is not in the network.
    #[error("Variable `{0}` is not in the network")]
    UnknownVariable(String),
    /// A value lies outside the domain of its variable.
    #[error("Value {0} is outside the domain of variable `{1}`")]
    DomainViolation(f64, String),
    /// A system parameter required by a node was not supplied.
    #[error("System parameter `{0}` was not supplied")]
    UnknownParameter(String),
    /// Adaptive quadrature failed to converge within tolerance.
    #[error("Quadrature over variable `{0}` did not converge: absolute error {1:e}")]
    NumericalError(String, f64),
    /// A tabular factor's shape would exceed the configured cell cap.
    #[error("Tabular factor over {0:?} would have {1} cells, exceeding the cap of {2}")]
    TableTooLarge(Vec<String>, usize, usize),
    /// The residual factor's normaliser is zero, so the evidence is unsupported.
    #[error("Evidence yields a zero normaliser and is therefore unsupported")]
    UnsupportedEvidence,
    /// A query range's type does not match its variable's domain.
    #[error("Range for variable `{0}` does not match its domain")]
    RangeMismatch(String),
}

/// A specialized [`Result`] type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
