//! The option store: the authoritative ordered collection of selectable
//! entries and their groups.
//!
//! Options are identified by their position. Structural changes (insertion,
//! removal) shift every subsequent index by one, and the store keeps group
//! child lists in lockstep with those shifts. Each persisted option carries a
//! baseline of its initial `selected`/`disabled` flags so a reset can restore
//! them; options created at runtime have no baseline until they are
//! explicitly persisted.
//!
//! Group completeness is always derived from the options, never cached.

use serde::{Deserialize, Serialize};

use crate::config::SelectMode;
use crate::error::{PickError, Result};
use crate::events::OptionSnapshot;

/// Index of an option within the store.
pub type OptionIndex = usize;

/// Index of a group within the store.
pub type GroupIndex = usize;

/// Initial description of an option, used to build a store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionSeed {
    /// Display text.
    pub text: String,
    /// Submission value. Defaults to the text when absent.
    pub value: Option<String>,
    /// Initially selected.
    pub selected: bool,
    /// Initially disabled.
    pub disabled: bool,
    /// Cannot be removed from a choice view.
    pub fixed: bool,
    /// Owning group, by group index.
    pub group: Option<GroupIndex>,
}

impl OptionSeed {
    /// Create a seed with the given display text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set the submission value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Mark as initially selected.
    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Mark as initially disabled.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Mark as not removable from a choice view.
    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    /// Put the option into a group.
    pub fn in_group(mut self, group: GroupIndex) -> Self {
        self.group = Some(group);
        self
    }
}

/// Initial description of a group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSeed {
    /// Display label.
    pub label: String,
    /// Disabled groups disable all of their children.
    pub disabled: bool,
}

impl GroupSeed {
    /// Create a seed with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            disabled: false,
        }
    }

    /// Mark the group as disabled.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// Backed-up initial flags of a persisted option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Baseline {
    selected: bool,
    disabled: bool,
}

/// A selectable entry owned by the store.
#[derive(Debug, Clone)]
pub struct OptionEntry {
    /// Display text.
    pub text: String,
    /// Submission value.
    pub value: String,
    /// Whether the option is currently selected.
    pub selected: bool,
    /// Whether the option itself is disabled. A disabled group also disables
    /// its children; see [`OptionStore::is_option_disabled`].
    pub disabled: bool,
    /// Cannot be removed from a choice view.
    pub fixed: bool,
    /// Owning group, by group index.
    pub group: Option<GroupIndex>,
    baseline: Option<Baseline>,
}

impl OptionEntry {
    /// Whether the option was created at runtime and not yet persisted.
    pub fn is_transient(&self) -> bool {
        self.baseline.is_none()
    }
}

/// A group of options.
#[derive(Debug, Clone)]
pub struct GroupEntry {
    /// Display label.
    pub label: String,
    /// Disabled groups disable all of their children.
    pub disabled: bool,
    /// Whether the group is collapsed.
    pub collapsed: bool,
    children: Vec<OptionIndex>,
}

impl GroupEntry {
    /// Indexes of the options belonging to this group, in store order.
    pub fn children(&self) -> &[OptionIndex] {
        &self.children
    }
}

/// The authoritative ordered collection of options and groups.
pub struct OptionStore {
    mode: SelectMode,
    options: Vec<OptionEntry>,
    groups: Vec<GroupEntry>,
    /// Whether index 0 is the empty-valued sentinel standing for "nothing
    /// selected" in single mode with deselection allowed.
    sentinel: bool,
}

impl OptionStore {
    /// Build a store from seeds.
    ///
    /// Fails with [`PickError::GroupNotFound`] if a seed references a group
    /// index that does not exist.
    pub fn new(
        mode: SelectMode,
        group_seeds: Vec<GroupSeed>,
        option_seeds: Vec<OptionSeed>,
    ) -> Result<Self> {
        let mut groups: Vec<GroupEntry> = group_seeds
            .into_iter()
            .map(|seed| GroupEntry {
                label: seed.label,
                disabled: seed.disabled,
                collapsed: false,
                children: Vec::new(),
            })
            .collect();

        let mut options = Vec::with_capacity(option_seeds.len());
        for seed in option_seeds {
            if let Some(g) = seed.group {
                let group = groups.get_mut(g).ok_or(PickError::GroupNotFound(g))?;
                group.children.push(options.len());
            }
            let value = seed.value.unwrap_or_else(|| seed.text.clone());
            options.push(OptionEntry {
                text: seed.text,
                value,
                selected: seed.selected,
                disabled: seed.disabled,
                fixed: seed.fixed,
                group: seed.group,
                baseline: None,
            });
        }

        Ok(Self {
            mode,
            options,
            groups,
            sentinel: false,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The widget mode this store was built for.
    pub fn mode(&self) -> SelectMode {
        self.mode
    }

    /// Number of options, the sentinel included.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Whether the store holds no options at all.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Number of groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// All options, in store order.
    pub fn options(&self) -> &[OptionEntry] {
        &self.options
    }

    /// All groups, in store order.
    pub fn groups(&self) -> &[GroupEntry] {
        &self.groups
    }

    /// The option at `index`, if it exists.
    pub fn get(&self, index: OptionIndex) -> Option<&OptionEntry> {
        self.options.get(index)
    }

    /// The option at `index`, or [`PickError::OptionNotFound`].
    pub fn option(&self, index: OptionIndex) -> Result<&OptionEntry> {
        self.options.get(index).ok_or(PickError::OptionNotFound(index))
    }

    /// The group at `index`, or [`PickError::GroupNotFound`].
    pub fn group(&self, index: GroupIndex) -> Result<&GroupEntry> {
        self.groups.get(index).ok_or(PickError::GroupNotFound(index))
    }

    /// Whether index 0 is the synthetic empty sentinel.
    pub fn has_sentinel(&self) -> bool {
        self.sentinel
    }

    /// Index of the first active (non-sentinel) option.
    pub fn first_active(&self) -> OptionIndex {
        usize::from(self.sentinel)
    }

    /// Indexes of the active options, in store order.
    pub fn active_indices(&self) -> impl Iterator<Item = OptionIndex> + '_ {
        self.first_active()..self.options.len()
    }

    /// Whether the option at `index` is active (exists and is not the
    /// sentinel).
    pub fn is_active(&self, index: OptionIndex) -> bool {
        index >= self.first_active() && index < self.options.len()
    }

    /// Effective disabled state: an option is disabled when it is disabled
    /// itself or its group is.
    pub fn is_option_disabled(&self, index: OptionIndex) -> bool {
        let Some(entry) = self.options.get(index) else {
            return false;
        };
        entry.disabled
            || entry
                .group
                .and_then(|g| self.groups.get(g))
                .is_some_and(|g| g.disabled)
    }

    /// Indexes of the selected active options, in store order.
    pub fn selected_active(&self) -> Vec<OptionIndex> {
        self.active_indices()
            .filter(|&i| self.options[i].selected)
            .collect()
    }

    /// Number of selected active options.
    pub fn selection_len(&self) -> usize {
        self.active_indices()
            .filter(|&i| self.options[i].selected)
            .count()
    }

    /// Whether an active option carries exactly this text (case-sensitive).
    pub fn active_has_text(&self, text: &str) -> bool {
        self.active_indices().any(|i| self.options[i].text == text)
    }

    /// Whether an active option carries this text, compared
    /// case-insensitively.
    pub fn active_has_text_ci(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.active_indices()
            .any(|i| self.options[i].text.to_lowercase() == lowered)
    }

    // =========================================================================
    // Sentinel
    // =========================================================================

    /// Make sure index 0 is an empty-valued option standing for "nothing
    /// selected".
    ///
    /// If the first option already has an empty value it is adopted as the
    /// sentinel; otherwise a synthetic one is inserted and every index
    /// shifts by one. Returns whether an option was inserted.
    pub fn ensure_sentinel(&mut self, placeholder: &str) -> bool {
        if self.sentinel {
            return false;
        }
        if let Some(first) = self.options.first()
            && first.value.is_empty()
        {
            self.sentinel = true;
            return false;
        }

        self.options.insert(
            0,
            OptionEntry {
                text: placeholder.to_string(),
                value: String::new(),
                selected: false,
                disabled: false,
                fixed: false,
                group: None,
                baseline: None,
            },
        );
        for group in &mut self.groups {
            for child in &mut group.children {
                *child += 1;
            }
        }
        self.sentinel = true;
        true
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Set the selected flag of an option.
    ///
    /// In single mode, selecting an option silently clears every other
    /// selected flag; the backing collection can hold at most one selection
    /// by construction.
    pub fn set_selected(&mut self, index: OptionIndex, selected: bool) {
        if selected && self.mode == SelectMode::Single {
            for (i, option) in self.options.iter_mut().enumerate() {
                if i != index {
                    option.selected = false;
                }
            }
        }
        if let Some(option) = self.options.get_mut(index) {
            option.selected = selected;
        }
    }

    /// Set the collapsed flag of a group.
    pub fn set_collapsed(&mut self, group: GroupIndex, collapsed: bool) {
        if let Some(entry) = self.groups.get_mut(group) {
            entry.collapsed = collapsed;
        }
    }

    /// Append a new ungrouped option. Persisted options receive a baseline of
    /// their creation-time flags; transient ones carry none.
    pub fn create(&mut self, text: String, value: String, persist: bool) -> OptionIndex {
        self.options.push(OptionEntry {
            text,
            value,
            selected: false,
            disabled: false,
            fixed: false,
            group: None,
            baseline: persist.then_some(Baseline {
                selected: false,
                disabled: false,
            }),
        });
        self.options.len() - 1
    }

    /// Remove the option at `index`.
    ///
    /// Every subsequent option shifts down by one, and group child lists are
    /// updated to match. If the owning group ends up empty — or empty of
    /// eligible children, when `exclude_disabled` is set — the group itself
    /// is removed, its remaining children are detached, and group indexes
    /// shift accordingly.
    ///
    /// Returns the removed entry together with the index of the removed
    /// group, if any.
    pub fn remove(
        &mut self,
        index: OptionIndex,
        exclude_disabled: bool,
    ) -> Result<(OptionEntry, Option<GroupIndex>)> {
        if index >= self.options.len() {
            return Err(PickError::OptionNotFound(index));
        }
        let entry = self.options.remove(index);
        if self.sentinel && index == 0 {
            self.sentinel = false;
        }

        for group in &mut self.groups {
            group.children.retain(|&child| child != index);
            for child in &mut group.children {
                if *child > index {
                    *child -= 1;
                }
            }
        }
        let mut removed_group = None;
        if let Some(g) = entry.group {
            let drained = self.groups[g].children.is_empty()
                || (exclude_disabled
                    && self.groups[g]
                        .children
                        .iter()
                        .all(|&child| self.is_option_disabled(child)));
            if drained {
                let orphans = std::mem::take(&mut self.groups[g].children);
                for child in orphans {
                    self.options[child].group = None;
                }
                self.groups.remove(g);
                for option in &mut self.options {
                    if let Some(og) = option.group
                        && og > g
                    {
                        option.group = Some(og - 1);
                    }
                }
                removed_group = Some(g);
            }
        }

        Ok((entry, removed_group))
    }

    // =========================================================================
    // Baselines
    // =========================================================================

    /// Record the current `selected`/`disabled` flags of every option as its
    /// baseline, marking them all persisted.
    pub fn capture_baselines(&mut self) {
        for option in &mut self.options {
            option.baseline = Some(Baseline {
                selected: option.selected,
                disabled: option.disabled,
            });
        }
    }

    /// Restore every persisted option's flags from its baseline. With `hard`
    /// set, flags return to their defaults (unselected, enabled) instead.
    pub fn restore_baselines(&mut self, hard: bool) {
        for option in &mut self.options {
            if let Some(baseline) = option.baseline {
                if hard {
                    option.selected = false;
                    option.disabled = false;
                } else {
                    option.selected = baseline.selected;
                    option.disabled = baseline.disabled;
                }
            }
        }
    }

    /// Give every transient option a baseline of its current flags,
    /// promoting it to persisted.
    pub fn persist_transients(&mut self) {
        for option in &mut self.options {
            if option.baseline.is_none() {
                option.baseline = Some(Baseline {
                    selected: option.selected,
                    disabled: option.disabled,
                });
            }
        }
    }

    /// Indexes of all transient options, in store order.
    pub fn transient_indices(&self) -> Vec<OptionIndex> {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, option)| option.is_transient())
            .map(|(i, _)| i)
            .collect()
    }

    // =========================================================================
    // Derived state
    // =========================================================================

    /// A group is complete when every one of its non-disabled children is
    /// selected. Computed on demand; never cached.
    pub fn is_group_complete(&self, group: GroupIndex) -> Result<bool> {
        let entry = self.group(group)?;
        Ok(entry
            .children
            .iter()
            .filter(|&&child| !self.is_option_disabled(child))
            .all(|&child| self.options[child].selected))
    }

    /// A snapshot of the option at `index`, if it exists.
    pub fn snapshot(&self, index: OptionIndex) -> Option<OptionSnapshot> {
        self.options.get(index).map(|entry| OptionSnapshot {
            index,
            text: entry.text.clone(),
            value: entry.value.clone(),
            selected: entry.selected,
            disabled: entry.disabled,
            fixed: entry.fixed,
            transient: entry.is_transient(),
            group: entry.group,
        })
    }

    /// Snapshots of the selected active options, in store order.
    pub fn selection_snapshot(&self) -> Vec<OptionSnapshot> {
        self.selected_active()
            .into_iter()
            .filter_map(|i| self.snapshot(i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(mode: SelectMode) -> OptionStore {
        OptionStore::new(
            mode,
            vec![GroupSeed::new("Fruit"), GroupSeed::new("Veg")],
            vec![
                OptionSeed::new("Apple").in_group(0),
                OptionSeed::new("Banana").in_group(0),
                OptionSeed::new("Carrot").in_group(1),
                OptionSeed::new("Plain"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_build_links_groups() {
        let store = store(SelectMode::Multi);
        assert_eq!(store.len(), 4);
        assert_eq!(store.groups()[0].children(), &[0, 1]);
        assert_eq!(store.groups()[1].children(), &[2]);
        assert_eq!(store.options()[3].group, None);
    }

    #[test]
    fn test_build_rejects_unknown_group() {
        let result = OptionStore::new(
            SelectMode::Multi,
            vec![],
            vec![OptionSeed::new("A").in_group(3)],
        );
        assert_eq!(result.err(), Some(PickError::GroupNotFound(3)));
    }

    #[test]
    fn test_single_mode_exclusivity() {
        let mut store = store(SelectMode::Single);
        store.set_selected(0, true);
        store.set_selected(2, true);
        assert!(!store.options()[0].selected);
        assert!(store.options()[2].selected);
        assert_eq!(store.selection_len(), 1);
    }

    #[test]
    fn test_multi_mode_keeps_all() {
        let mut store = store(SelectMode::Multi);
        store.set_selected(0, true);
        store.set_selected(2, true);
        assert_eq!(store.selected_active(), vec![0, 2]);
    }

    #[test]
    fn test_remove_reindexes_group_children() {
        let mut store = store(SelectMode::Multi);
        // removing Banana (1) shifts Carrot from 2 to 1 and Plain from 3 to 2
        let (removed, removed_group) = store.remove(1, true).unwrap();
        assert_eq!(removed.text, "Banana");
        assert_eq!(removed_group, None);
        assert_eq!(store.groups()[0].children(), &[0]);
        assert_eq!(store.groups()[1].children(), &[1]);
        assert_eq!(store.options()[1].text, "Carrot");
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut store = store(SelectMode::Multi);
        assert_eq!(
            store.remove(9, true).err(),
            Some(PickError::OptionNotFound(9))
        );
    }

    #[test]
    fn test_remove_last_child_removes_group() {
        let mut store = store(SelectMode::Multi);
        let (_, removed_group) = store.remove(2, true).unwrap();
        assert_eq!(removed_group, Some(1));
        assert_eq!(store.group_count(), 1);
        // Plain shifted from 3 to 2 and stays ungrouped
        assert_eq!(store.options()[2].text, "Plain");
        assert_eq!(store.options()[2].group, None);
    }

    #[test]
    fn test_remove_group_of_only_disabled_children() {
        let mut store = OptionStore::new(
            SelectMode::Multi,
            vec![GroupSeed::new("G"), GroupSeed::new("H")],
            vec![
                OptionSeed::new("A").in_group(0),
                OptionSeed::new("B").disabled().in_group(0),
                OptionSeed::new("C").in_group(1),
            ],
        )
        .unwrap();

        // under exclude_disabled, removing A drains group 0 of eligible
        // children; B is detached and group indexes shift
        let (_, removed_group) = store.remove(0, true).unwrap();
        assert_eq!(removed_group, Some(0));
        assert_eq!(store.group_count(), 1);
        assert_eq!(store.options()[0].group, None); // B detached
        assert_eq!(store.options()[1].group, Some(0)); // C re-pointed
        assert_eq!(store.groups()[0].children(), &[1]);
    }

    #[test]
    fn test_remove_keeps_disabled_group_without_policy() {
        let mut store = OptionStore::new(
            SelectMode::Multi,
            vec![GroupSeed::new("G")],
            vec![
                OptionSeed::new("A").in_group(0),
                OptionSeed::new("B").disabled().in_group(0),
            ],
        )
        .unwrap();

        let (_, removed_group) = store.remove(0, false).unwrap();
        assert_eq!(removed_group, None);
        assert_eq!(store.group_count(), 1);
        assert_eq!(store.groups()[0].children(), &[0]);
    }

    #[test]
    fn test_group_disabled_inherited() {
        let store = OptionStore::new(
            SelectMode::Multi,
            vec![GroupSeed::new("G").disabled()],
            vec![OptionSeed::new("A").in_group(0), OptionSeed::new("B")],
        )
        .unwrap();
        assert!(store.is_option_disabled(0));
        assert!(!store.is_option_disabled(1));
        assert!(!store.options()[0].disabled); // raw flag untouched
    }

    #[test]
    fn test_group_complete_ignores_disabled_children() {
        let mut store = OptionStore::new(
            SelectMode::Multi,
            vec![GroupSeed::new("G")],
            vec![
                OptionSeed::new("A").in_group(0),
                OptionSeed::new("B").disabled().in_group(0),
                OptionSeed::new("C").in_group(0),
            ],
        )
        .unwrap();

        assert!(!store.is_group_complete(0).unwrap());
        store.set_selected(0, true);
        assert!(!store.is_group_complete(0).unwrap());
        store.set_selected(2, true);
        assert!(store.is_group_complete(0).unwrap());
        store.set_selected(0, false);
        assert!(!store.is_group_complete(0).unwrap());
        assert!(store.is_group_complete(9).is_err());
    }

    #[test]
    fn test_sentinel_inserted_and_shifts_indexes() {
        let mut store = store(SelectMode::Single);
        assert!(store.ensure_sentinel("Select an option"));
        assert!(store.has_sentinel());
        assert_eq!(store.len(), 5);
        assert_eq!(store.first_active(), 1);
        assert_eq!(store.groups()[0].children(), &[1, 2]);
        assert_eq!(store.options()[0].value, "");
        assert_eq!(store.active_indices().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_sentinel_adopts_existing_empty_first_option() {
        let mut store = OptionStore::new(
            SelectMode::Single,
            vec![],
            vec![
                OptionSeed::new("None").with_value(""),
                OptionSeed::new("A"),
            ],
        )
        .unwrap();
        assert!(!store.ensure_sentinel("placeholder"));
        assert!(store.has_sentinel());
        assert_eq!(store.len(), 2);
        assert_eq!(store.first_active(), 1);
    }

    #[test]
    fn test_baseline_round_trip() {
        let mut store = store(SelectMode::Multi);
        store.set_selected(0, true);
        store.capture_baselines();

        store.set_selected(0, false);
        store.set_selected(3, true);
        store.restore_baselines(false);
        assert!(store.options()[0].selected);
        assert!(!store.options()[3].selected);

        store.restore_baselines(true);
        assert_eq!(store.selection_len(), 0);
    }

    #[test]
    fn test_transients_and_persist() {
        let mut store = store(SelectMode::Multi);
        store.capture_baselines();
        let i = store.create("New".into(), "New".into(), false);
        assert!(store.options()[i].is_transient());
        assert_eq!(store.transient_indices(), vec![i]);

        store.persist_transients();
        assert!(!store.options()[i].is_transient());
        assert!(store.transient_indices().is_empty());
    }

    #[test]
    fn test_text_lookup() {
        let store = store(SelectMode::Multi);
        assert!(store.active_has_text("Apple"));
        assert!(!store.active_has_text("apple"));
        assert!(store.active_has_text_ci("aPPle"));
        assert!(!store.active_has_text_ci("Pear"));
    }

    #[test]
    fn test_value_defaults_to_text() {
        let store = OptionStore::new(
            SelectMode::Single,
            vec![],
            vec![OptionSeed::new("A"), OptionSeed::new("B").with_value("b2")],
        )
        .unwrap();
        assert_eq!(store.options()[0].value, "A");
        assert_eq!(store.options()[1].value, "b2");
    }
}
