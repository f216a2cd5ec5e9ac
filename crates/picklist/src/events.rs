//! Event payload types for the synchronization protocol.
//!
//! Every state change the widget makes is announced through a named
//! [`Signal`](picklist_core::Signal) carrying one of these payloads. A view
//! re-renders solely from the payloads plus its own last-known state; facts
//! flow one direction, core to views. The payloads are snapshots — plain
//! data detached from the store — so a slot can hold onto them freely.
//!
//! The ordering guarantee: the store is mutated first, then the specific
//! signal fires, then the generic `changed` signal. A slot can rely on the
//! widget already reflecting the event it receives.

use crate::store::{GroupIndex, OptionIndex};

/// A detached copy of one option's state at emission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSnapshot {
    /// Position in the store at emission time.
    pub index: OptionIndex,
    /// Display text.
    pub text: String,
    /// Submission value.
    pub value: String,
    /// Whether the option was selected.
    pub selected: bool,
    /// The option's own disabled flag (a disabled group is reflected through
    /// `group`, not here).
    pub disabled: bool,
    /// Cannot be removed from a choice view.
    pub fixed: bool,
    /// Created at runtime and not yet persisted.
    pub transient: bool,
    /// Owning group, by group index.
    pub group: Option<GroupIndex>,
}

/// The full selection at emission time, in store order.
pub type SelectionSnapshot = Vec<OptionSnapshot>;

/// Payload of `option_selected`, `option_deselected` and `changed`: the
/// option the operation touched plus the resulting selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    /// The option the operation touched.
    pub option: OptionSnapshot,
    /// The selection after the operation.
    pub selection: SelectionSnapshot,
}
