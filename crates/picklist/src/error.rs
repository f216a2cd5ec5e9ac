//! Error types for the picklist crate.
//!
//! Only genuinely exceptional conditions are errors. Reaching the selection
//! limit or finding no matches are expected steady-state outcomes and are
//! signaled through events instead (see [`crate::widget::PickList`]).

use thiserror::Error;

/// Errors that can occur during picklist operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PickError {
    /// An option was created without a label.
    #[error("option label must not be empty")]
    EmptyLabel,

    /// An option with the same label already exists among active options.
    #[error("an option labelled {0:?} already exists")]
    DuplicateLabel(String),

    /// The option index does not exist.
    #[error("no option at index {0}")]
    OptionNotFound(usize),

    /// The group index does not exist.
    #[error("no group at index {0}")]
    GroupNotFound(usize),

    /// The configuration is malformed or combines unsupported modes.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The widget has been destroyed; no further operations are possible.
    #[error("widget has been destroyed")]
    Destroyed,
}

/// Result type for picklist operations.
pub type Result<T> = std::result::Result<T, PickError>;
