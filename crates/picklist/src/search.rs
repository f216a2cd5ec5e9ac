//! Keyword search: local matching, remote augmentation and debouncing.
//!
//! Local matching resolves a keyword to the option indexes whose text
//! matches under the configured policy (substring, prefix-anchored, or
//! anchored per-word). Remote augmentation optionally extends the option set
//! before matching, through a caller-provided [`RemoteSource`] transport and
//! a [`FieldMapping`] that projects raw records onto option attributes.
//!
//! The widget drives both through its filter path; everything here is
//! freestanding and independently testable.

use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};

use regex::RegexBuilder;
use serde_json::Value;
use thiserror::Error;

use crate::config::SearchConfig;
use crate::store::{OptionEntry, OptionStore};

/// A remote search transport failed.
///
/// Transport failures never abort the surrounding filter run; local matching
/// proceeds over the options already known.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("remote search transport failed: {0}")]
pub struct TransportError(pub String);

/// Transport for remote search augmentation.
///
/// Given the configured endpoint and the keyword, return the raw records the
/// source knows for it. The call is synchronous from the core's perspective:
/// matching does not proceed until it returns.
pub trait RemoteSource: Send {
    /// Fetch raw records for a keyword.
    fn fetch(&mut self, url: &str, keyword: &str) -> Result<Vec<Value>, TransportError>;
}

impl<F> RemoteSource for F
where
    F: FnMut(&str, &str) -> Result<Vec<Value>, TransportError> + Send,
{
    fn fetch(&mut self, url: &str, keyword: &str) -> Result<Vec<Value>, TransportError> {
        self(url, keyword)
    }
}

/// How one option attribute is read out of a raw remote record.
pub enum FieldSource {
    /// Read the named field of the record.
    Field(String),
    /// Compute the attribute with a projector function.
    Projector(Box<dyn Fn(&Value) -> Option<String> + Send + Sync>),
}

/// Projection of raw remote records onto option attributes.
///
/// The default maps the `value` and `text` attributes to same-named record
/// fields.
pub struct FieldMapping {
    fields: Vec<(String, FieldSource)>,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self::new()
            .map_field("value", "value")
            .map_field("text", "text")
    }
}

impl FieldMapping {
    /// An empty mapping.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Map an option attribute to a record field by name.
    pub fn map_field(mut self, attribute: impl Into<String>, field: impl Into<String>) -> Self {
        self.set(attribute.into(), FieldSource::Field(field.into()));
        self
    }

    /// Map an option attribute through a projector function.
    pub fn project<F>(mut self, attribute: impl Into<String>, projector: F) -> Self
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        self.set(attribute.into(), FieldSource::Projector(Box::new(projector)));
        self
    }

    fn set(&mut self, attribute: String, source: FieldSource) {
        self.fields.retain(|(name, _)| *name != attribute);
        self.fields.push((attribute, source));
    }

    /// Apply the mapping to one raw record. Attributes whose source yields
    /// nothing are omitted.
    pub fn apply(&self, record: &Value) -> BTreeMap<String, String> {
        let mut mapped = BTreeMap::new();
        for (attribute, source) in &self.fields {
            let value = match source {
                FieldSource::Field(field) => record.get(field).map(json_to_string),
                FieldSource::Projector(projector) => projector(record),
            };
            if let Some(value) = value {
                mapped.insert(attribute.clone(), value);
            }
        }
        mapped
    }

    /// Project an existing option onto the same attribute set, for
    /// deduplication of fetched records against the current options.
    pub(crate) fn project_option(&self, entry: &OptionEntry) -> BTreeMap<String, String> {
        let mut mapped = BTreeMap::new();
        for (attribute, _) in &self.fields {
            let value = match attribute.as_str() {
                "text" => Some(entry.text.clone()),
                "value" => Some(entry.value.clone()),
                _ => None,
            };
            if let Some(value) = value {
                mapped.insert(attribute.clone(), value);
            }
        }
        mapped
    }
}

fn json_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Keywords that have already been sent to the remote source.
///
/// Append-only for the lifetime of the widget instance; entries are never
/// evicted. Unbounded growth is a documented property of the cache, not an
/// accident — make eviction a policy of the caller if one is needed.
#[derive(Debug, Default)]
pub struct RequestCache {
    keywords: HashSet<String>,
}

impl RequestCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a keyword has already been fetched.
    pub fn contains(&self, keyword: &str) -> bool {
        self.keywords.contains(keyword)
    }

    /// Record a successfully fetched keyword.
    pub fn record(&mut self, keyword: &str) {
        self.keywords.insert(keyword.to_string());
    }

    /// Number of recorded keywords.
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// Resolve a keyword to the active option indexes whose text matches, in
/// store order.
///
/// Keyword characters that are regex metacharacters are escaped before the
/// pattern is built; matching is case-insensitive. With `by_substr` the
/// pattern may match anywhere; otherwise it is anchored to the start, and
/// with `split_words` additionally tried against each whitespace-delimited
/// word of the option text.
pub fn match_indices(store: &OptionStore, config: &SearchConfig, keyword: &str) -> Vec<usize> {
    let mut pattern = regex::escape(keyword);
    if !config.by_substr {
        pattern.insert(0, '^');
    }

    let regex = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(regex) => regex,
        Err(err) => {
            tracing::warn!(
                target: "picklist::search",
                keyword,
                error = %err,
                "failed to build search pattern"
            );
            return Vec::new();
        }
    };

    store
        .active_indices()
        .filter(|&index| {
            let text = &store.options()[index].text;
            if config.by_substr || !config.split_words {
                regex.is_match(text)
            } else {
                text.split(' ').any(|word| regex.is_match(word))
            }
        })
        .collect()
}

/// A keyword filter waiting for its debounce delay to elapse.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingFilter {
    keyword: String,
    due: Instant,
}

/// Debounce gate between keystrokes and filter runs.
///
/// Each new keyword cancels a pending filter outright — the superseded
/// keyword is discarded, never run.
#[derive(Debug)]
pub struct FilterDebouncer {
    delay: Duration,
    pending: Option<PendingFilter>,
}

impl FilterDebouncer {
    /// Create a debouncer with the given delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Schedule a filter for `keyword`, cancelling any pending one.
    pub fn schedule(&mut self, keyword: impl Into<String>, now: Instant) {
        self.pending = Some(PendingFilter {
            keyword: keyword.into(),
            due: now + self.delay,
        });
    }

    /// Cancel the pending filter, if any.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Whether a filter is scheduled.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending keyword if its delay has elapsed.
    pub fn take_due(&mut self, now: Instant) -> Option<String> {
        if self.pending.as_ref().is_some_and(|p| p.due <= now) {
            self.pending.take().map(|p| p.keyword)
        } else {
            None
        }
    }

    /// Time remaining until the pending filter is due, if one is scheduled.
    /// Zero when already due.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| p.due.saturating_duration_since(now))
    }
}
