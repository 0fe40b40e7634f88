//! Invariant violations in the metadata model

/// A metadata entity that breaks one of the model's structural invariants
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("column '{0}' is auto-increment but allows NULL")]
    NullableAutoIncrement(String),

    #[error("default of column '{column}' ({value}) is not coercible to {runtime}")]
    DefaultTypeMismatch {
        column: String,
        value: String,
        runtime: &'static str,
    },

    #[error("{kind} has no columns")]
    EmptyColumns { kind: &'static str },

    #[error("{kind} lists column '{column}' more than once")]
    DuplicateColumn { kind: &'static str, column: String },

    #[error("foreign key has {local} local columns but {referenced} referenced columns")]
    ReferenceArity { local: usize, referenced: usize },

    #[error("{kind} references unknown column '{column}'")]
    UnknownColumn { kind: &'static str, column: String },

    #[error("table defines column '{0}' more than once")]
    DuplicateTableColumn(String),
}
