use crate::render::Anchor;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("no items to build the stack from")]
    NoItems,
    #[error("required surface anchor is missing: {0}")]
    MissingAnchor(Anchor),
    #[error("cycle count must be at least 1, got {0}")]
    InvalidCycles(usize),
}

#[derive(Debug, Error)]
pub enum StackError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
