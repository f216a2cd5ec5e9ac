//! picklist - an enhanced selection-list core.
//!
//! picklist replaces a native single/multi-choice input with a richer
//! control: incremental search with optional remote-fetched options,
//! grouped collapsible entries, user-created entries, and a choice-list
//! rendering for multi-select. This crate is the headless core — the
//! selection/search state machine and its event-driven synchronization
//! protocol. Rendering, markup and low-level input capture belong to the
//! embedding view layer, which consumes the widget's signals and feeds
//! decoded [`Intent`]s back.
//!
//! # Components
//!
//! - [`store`]: the authoritative ordered option/group collection
//! - [`search`]: keyword matching, remote augmentation, debouncing
//! - [`navigator`]: cyclic highlight movement over filtered candidates
//! - [`widget`]: the [`PickList`] controller tying it all together
//! - [`events`] / [`intent`]: the synchronization protocol payloads
//!
//! # Example
//!
//! ```
//! use picklist::config::{PickListConfig, SelectMode};
//! use picklist::store::OptionSeed;
//! use picklist::{Intent, PickList};
//!
//! let mut list = PickList::new(
//!     SelectMode::Multi,
//!     vec![],
//!     vec![
//!         OptionSeed::new("Apple"),
//!         OptionSeed::new("Banana"),
//!         OptionSeed::new("Cherry"),
//!     ],
//!     PickListConfig::default(),
//! )?;
//!
//! list.option_selected.connect(|change| {
//!     println!("{} now selected", change.option.text);
//! });
//!
//! list.initialize()?;
//! list.dispatch(Intent::ArrowKey { forward: true, ctrl: false })?; // opens
//! list.filter("an", false)?; // matches and highlights Banana
//! list.dispatch(Intent::EnterKey)?; // selects it
//! assert_eq!(list.selected_values(), vec!["Banana".to_string()]);
//! # Ok::<(), picklist::PickError>(())
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod intent;
pub mod navigator;
pub mod search;
pub mod store;
pub mod widget;

pub use config::{OnListEnd, PickListConfig, SelectMode};
pub use error::{PickError, Result};
pub use events::{OptionSnapshot, SelectionChange, SelectionSnapshot};
pub use intent::Intent;
pub use navigator::{ListEntry, Movement};
pub use picklist_core::{ConnectionGuard, ConnectionId, Signal};
pub use search::{FieldMapping, FieldSource, RemoteSource, RequestCache, TransportError};
pub use store::{GroupSeed, OptionSeed, OptionStore};
pub use widget::{CreateRequest, PickList};
