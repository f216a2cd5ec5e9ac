//! Configuration for the picklist widget.
//!
//! All option blocks have serde-friendly defaults, so a configuration can be
//! deserialized from a partial document:
//!
//! ```
//! use picklist::config::PickListConfig;
//!
//! let config: PickListConfig =
//!     serde_json::from_str(r#"{ "search": { "min_length": 2 } }"#).unwrap();
//! assert_eq!(config.search.min_length, 2);
//! assert!(config.search.enabled);
//! ```
//!
//! Unsupported combinations are rejected at construction time with
//! [`PickError::Configuration`], never discovered later.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PickError, Result};

/// Whether the widget holds at most one selection or many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectMode {
    /// At most one option is selected at a time.
    Single,
    /// Any number of options may be selected, up to an optional limit.
    Multi,
}

/// What highlight movement does when the cursor reaches an end of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnListEnd {
    /// Clamp to the boundary entry; a no-op if already there.
    #[default]
    Stop,
    /// Remove the highlight entirely.
    Clear,
    /// Wrap around to the opposite end of the list.
    Rerun,
}

impl FromStr for OnListEnd {
    type Err = PickError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "stop" => Ok(Self::Stop),
            "clear" => Ok(Self::Clear),
            "rerun" => Ok(Self::Rerun),
            other => Err(PickError::Configuration(format!(
                "unknown list-end policy {other:?} (expected \"stop\", \"clear\" or \"rerun\")"
            ))),
        }
    }
}

/// Remote search augmentation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSearchConfig {
    /// Whether to request additional options from a remote source.
    pub enabled: bool,
    /// If true, each keyword is fetched at most once per widget lifetime.
    ///
    /// The underlying request cache grows without bound; eviction is not
    /// provided.
    pub cache: bool,
    /// Endpoint handed to the transport. Required when `enabled` is true.
    pub url: Option<String>,
}

impl Default for RemoteSearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cache: true,
            url: None,
        }
    }
}

/// Keyword search settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Whether incremental search is available at all.
    pub enabled: bool,
    /// Debounce delay between a keystroke and the filter run, in milliseconds.
    pub delay_ms: u64,
    /// Minimum keyword length before filtering starts.
    pub min_length: usize,
    /// Match anywhere in the option text. When false the pattern is anchored
    /// to the start.
    pub by_substr: bool,
    /// With anchored matching, also try each whitespace-delimited word of the
    /// option text. Ignored when `by_substr` is true.
    pub split_words: bool,
    /// Remote augmentation settings.
    pub remote: RemoteSearchConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: 30,
            min_length: 1,
            by_substr: true,
            split_words: true,
            remote: RemoteSearchConfig::default(),
        }
    }
}

/// Single-mode settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SingleModeConfig {
    /// Whether the single selection can be cleared. When set, an
    /// empty-valued sentinel option occupies index 0 and stands for
    /// "nothing selected".
    pub allow_deselect: bool,
}

/// Multi-mode settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiModeConfig {
    /// Maximum number of selected options. `None` means unbounded.
    pub max_selected: Option<usize>,
    /// Refuse to open the dropdown while the limit is reached.
    pub block_dropdown_on_limit: bool,
    /// Backspace on an empty search field moves the highlight into the
    /// choice list.
    pub switch_to_choices_on_backspace: bool,
}

impl Default for MultiModeConfig {
    fn default() -> Self {
        Self {
            max_selected: None,
            block_dropdown_on_limit: false,
            switch_to_choices_on_backspace: true,
        }
    }
}

/// Runtime item creation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateItemsConfig {
    /// Whether a "create new item" affordance is offered during search.
    pub enabled: bool,
    /// Select options immediately after creating them.
    pub select_created: bool,
}

/// Group settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    /// Whether group headers can be collapsed and expanded.
    pub allow_collapse: bool,
    /// Start with every group collapsed.
    pub collapse_on_init: bool,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            allow_collapse: true,
            collapse_on_init: false,
        }
    }
}

/// Result-list policies applied when building the candidate list and
/// interpreting filter results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultListConfig {
    /// After a filter pass with matches and no highlight, highlight the
    /// first match.
    pub force_highlight: bool,
    /// Drop disabled options from the result list entirely instead of
    /// showing them inactive. A group whose remaining children are all
    /// disabled then counts as empty of eligible children on removal.
    pub exclude_disabled: bool,
    /// Selected options do not match during search.
    pub ignore_selected: bool,
    /// A visible create-item affordance counts as a search result, so no
    /// empty-result state is signaled while it shows.
    pub creator_matches: bool,
}

impl Default for ResultListConfig {
    fn default() -> Self {
        Self {
            force_highlight: true,
            exclude_disabled: true,
            ignore_selected: true,
            creator_matches: true,
        }
    }
}

/// Dropdown and container lifecycle settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropdownConfig {
    /// Close the dropdown after an option is selected.
    pub close_after_change: bool,
    /// Clear the keyword and filter when the dropdown closes, and restore
    /// the single-mode selection highlight on the next open.
    pub reset_after_close: bool,
    /// Open the dropdown as the final step of initialization.
    pub open_after_init: bool,
    /// Deactivate the container when a click lands outside of it.
    pub close_on_blur: bool,
}

impl Default for DropdownConfig {
    fn default() -> Self {
        Self {
            close_after_change: true,
            reset_after_close: true,
            open_after_init: false,
            close_on_blur: true,
        }
    }
}

/// Complete widget configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PickListConfig {
    /// Keyword search settings.
    pub search: SearchConfig,
    /// Single-mode settings.
    pub single: SingleModeConfig,
    /// Multi-mode settings.
    pub multi: MultiModeConfig,
    /// Runtime item creation settings.
    pub create_items: CreateItemsConfig,
    /// Group settings.
    pub groups: GroupConfig,
    /// Result-list policies.
    pub results: ResultListConfig,
    /// Dropdown and container lifecycle settings.
    pub dropdown: DropdownConfig,
}

impl PickListConfig {
    /// Validate the configuration against the widget mode.
    ///
    /// Malformed configurations are fatal at construction time.
    pub fn validate(&self, mode: SelectMode) -> Result<()> {
        if mode == SelectMode::Multi && self.single.allow_deselect {
            return Err(PickError::Configuration(
                "single-mode deselect cannot be combined with a multi-mode widget".into(),
            ));
        }
        if self.search.remote.enabled && self.search.remote.url.is_none() {
            return Err(PickError::Configuration(
                "remote search requires a url".into(),
            ));
        }
        if let Some(0) = self.multi.max_selected {
            return Err(PickError::Configuration(
                "max_selected must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
