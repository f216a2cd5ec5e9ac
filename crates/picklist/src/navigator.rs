//! Cyclic highlight movement over a filtered candidate list.
//!
//! The navigator is a pure algorithm: callers hand it the ordered candidates
//! that are currently eligible for highlighting (already filtered by
//! visibility, enabled state and match criteria) together with the current
//! cursor, and receive back where the cursor moved. The widget owns the
//! cursor itself and applies the result.

use crate::config::OnListEnd;

/// An entry of the result list that can carry the highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListEntry {
    /// A group header, addressed by group index.
    Group(usize),
    /// An option, addressed by option index.
    Option(usize),
    /// The "create new item" affordance.
    Creator,
}

/// Result of one highlight movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Movement<T> {
    /// The entry that was highlighted before the move, if any.
    pub moved_from: Option<T>,
    /// The entry that is highlighted after the move; `None` under the
    /// `clear` end policy.
    pub moved_to: Option<T>,
}

impl<T: Copy + Eq> Movement<T> {
    /// Whether the move changed the highlight at all.
    pub fn changed(&self) -> bool {
        self.moved_from != self.moved_to
    }
}

/// Move the highlight one step through `candidates`.
///
/// With a current cursor, the nearest candidate strictly after (forward) or
/// before (backward) it takes over. Without one, moving forward lands on the
/// first candidate and moving backward falls straight through to the end
/// policy, anchored at the first candidate. When no neighbor exists the end
/// policy decides: `stop` clamps to the boundary in the direction of travel,
/// `rerun` wraps to the opposite end, `clear` drops the highlight.
///
/// A cursor that is not among the candidates (it may have been filtered out
/// or collapsed since) is treated as absent.
pub fn move_highlight<T: Copy + Eq>(
    candidates: &[T],
    current: Option<T>,
    forward: bool,
    on_end: OnListEnd,
) -> Movement<T> {
    // with nothing eligible the highlight cannot survive the move
    if candidates.is_empty() {
        return Movement {
            moved_from: current,
            moved_to: None,
        };
    }

    let position = current.and_then(|entry| candidates.iter().position(|&c| c == entry));

    let neighbor = match position {
        Some(pos) => {
            if forward {
                candidates.get(pos + 1).copied()
            } else {
                pos.checked_sub(1).map(|p| candidates[p])
            }
        }
        // nothing highlighted yet: forward takes the first candidate,
        // backward falls through to the end policy
        None => forward.then(|| candidates[0]),
    };

    let moved_to = match neighbor {
        Some(entry) => Some(entry),
        None => match on_end {
            OnListEnd::Stop => Some(if forward {
                candidates[candidates.len() - 1]
            } else {
                candidates[0]
            }),
            OnListEnd::Rerun => Some(if forward {
                candidates[0]
            } else {
                candidates[candidates.len() - 1]
            }),
            OnListEnd::Clear => None,
        },
    };

    Movement {
        moved_from: current.filter(|_| position.is_some()),
        moved_to,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ListEntry = ListEntry::Option(0);
    const B: ListEntry = ListEntry::Option(1);
    const C: ListEntry = ListEntry::Option(2);

    fn abc() -> Vec<ListEntry> {
        vec![A, B, C]
    }

    #[test]
    fn test_forward_steps_to_next() {
        let mv = move_highlight(&abc(), Some(A), true, OnListEnd::Stop);
        assert_eq!(mv.moved_from, Some(A));
        assert_eq!(mv.moved_to, Some(B));
        assert!(mv.changed());
    }

    #[test]
    fn test_backward_steps_to_previous() {
        let mv = move_highlight(&abc(), Some(C), false, OnListEnd::Stop);
        assert_eq!(mv.moved_to, Some(B));
    }

    #[test]
    fn test_forward_from_nothing_takes_first() {
        let mv = move_highlight(&abc(), None, true, OnListEnd::Rerun);
        assert_eq!(mv.moved_from, None);
        assert_eq!(mv.moved_to, Some(A));
    }

    #[test]
    fn test_backward_from_nothing_follows_policy() {
        // stop anchors at the first candidate
        let mv = move_highlight(&abc(), None, false, OnListEnd::Stop);
        assert_eq!(mv.moved_to, Some(A));

        // rerun wraps to the far end
        let mv = move_highlight(&abc(), None, false, OnListEnd::Rerun);
        assert_eq!(mv.moved_to, Some(C));

        // clear leaves nothing highlighted
        let mv = move_highlight(&abc(), None, false, OnListEnd::Clear);
        assert_eq!(mv.moved_to, None);
    }

    #[test]
    fn test_end_policy_rerun_wraps() {
        let mv = move_highlight(&abc(), Some(C), true, OnListEnd::Rerun);
        assert_eq!(mv.moved_to, Some(A));

        let mv = move_highlight(&abc(), Some(A), false, OnListEnd::Rerun);
        assert_eq!(mv.moved_to, Some(C));
    }

    #[test]
    fn test_end_policy_clear_drops_highlight() {
        let mv = move_highlight(&abc(), Some(C), true, OnListEnd::Clear);
        assert_eq!(mv.moved_from, Some(C));
        assert_eq!(mv.moved_to, None);
    }

    #[test]
    fn test_end_policy_stop_clamps() {
        let mv = move_highlight(&abc(), Some(C), true, OnListEnd::Stop);
        assert_eq!(mv.moved_to, Some(C));
        assert!(!mv.changed());
    }

    #[test]
    fn test_stale_cursor_treated_as_absent() {
        // the cursor entry vanished from the candidates (filtered out)
        let candidates = vec![A, C];
        let mv = move_highlight(&candidates, Some(B), true, OnListEnd::Stop);
        assert_eq!(mv.moved_from, None);
        assert_eq!(mv.moved_to, Some(A));
    }

    #[test]
    fn test_empty_candidates_drop_highlight() {
        let mv = move_highlight(&[], Some(A), true, OnListEnd::Rerun);
        assert_eq!(mv.moved_from, Some(A));
        assert_eq!(mv.moved_to, None);

        let mv = move_highlight(&[] as &[ListEntry], None, true, OnListEnd::Clear);
        assert_eq!(mv.moved_to, None);
    }

    #[test]
    fn test_mixed_entry_kinds() {
        let candidates = vec![ListEntry::Group(0), A, B, ListEntry::Creator];
        let mv = move_highlight(&candidates, Some(B), true, OnListEnd::Stop);
        assert_eq!(mv.moved_to, Some(ListEntry::Creator));

        let mv = move_highlight(&candidates, Some(A), false, OnListEnd::Stop);
        assert_eq!(mv.moved_to, Some(ListEntry::Group(0)));
    }
}
