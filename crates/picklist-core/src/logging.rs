//! Logging facilities for picklist.
//!
//! picklist instruments itself with the `tracing` crate. Logs show up once
//! the embedding application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt::init();
//! ```

/// Target names for log filtering.
///
/// Use these in `tracing` filter directives to narrow logs to a subsystem,
/// e.g. `RUST_LOG=picklist::search=debug`.
pub mod targets {
    /// Core systems target.
    pub const CORE: &str = "picklist_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "picklist_core::signal";
    /// Selection controller target.
    pub const WIDGET: &str = "picklist::widget";
    /// Search engine target.
    pub const SEARCH: &str = "picklist::search";
    /// Option store target.
    pub const STORE: &str = "picklist::store";
}
