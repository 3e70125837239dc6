use thiserror::Error;

/// A point cloud whose attribute arrays disagree with its point count, or
/// whose positions cannot be placed in space.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("attribute `{attribute}` has {actual} entries, expected {expected}")]
    LengthMismatch {
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("point {index} has a non-finite position")]
    NonFinitePosition { index: usize },
}
