//! Decoded user intents.
//!
//! Views do not mutate widget state. They decode raw input (keys, clicks,
//! pointer movement) into one of these intents and hand it to
//! [`PickList::dispatch`](crate::widget::PickList::dispatch); the core
//! translates it into operations and answers through signals. Low-level
//! event capture stays on the view side.

use crate::navigator::ListEntry;

/// A decoded user action, fed back from a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// An up/down arrow key. `forward` is the down direction.
    ArrowKey { forward: bool, ctrl: bool },
    /// The Enter key: activate the highlighted entry.
    EnterKey,
    /// The Escape key: close the dropdown.
    EscapeKey,
    /// Backspace, with whether the search field was empty at the time.
    BackspaceKey { search_empty: bool },
    /// The search field content changed.
    KeywordEdited(String),
    /// The pointer entered a result-list entry.
    PointerEnter(ListEntry),
    /// The pointer left a result-list entry.
    PointerLeave(ListEntry),
    /// The pointer moved within a result-list entry without crossing its
    /// boundary.
    PointerMove(ListEntry),
    /// A result-list entry was clicked.
    ClickEntry(ListEntry),
    /// The single-selection header was clicked.
    ClickHeader,
    /// A choice was clicked in the choice list.
    ClickChoice { index: usize, ctrl: bool },
    /// A choice's remove affordance was clicked.
    ClickChoiceRemove(usize),
    /// A click landed outside the widget container.
    ClickOutside,
    /// The container gained focus or was clicked.
    Activate,
    /// The container was explicitly deactivated.
    Deactivate,
}
