//! Parsing history ledger
//!
//! Every successful parse is recorded as a [`HistoryItem`] in the `history`
//! record. The ledger keys items by (video id, page number, local calendar
//! day of the parse): parsing the same page twice on one day replaces the
//! earlier entry, a parse on another day adds a new one.
//!
//! ## Retention
//!
//! Items whose last parse is at least `historyRetentionPeriodHours` old are
//! dropped by [`HistoryLedger::purge_older_than`]. A retention of zero or
//! less disables both purging and history writes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bili2vrc::ledger::HistoryLedger;
//!
//! let ledger = HistoryLedger::new(storage);
//! ledger.upsert(item).await?;
//! let groups = ledger.grouped(now).await?;
//! ```

pub mod grouping;
pub mod history;
pub mod models;
pub mod pruning;

pub use grouping::{HistoryGroup, HistoryPeriod, group_by_period};
pub use history::{HistoryLedger, same_local_day};
pub use models::HistoryItem;
pub use pruning::{DEFAULT_RETENTION_HOURS, MS_PER_HOUR, PurgeStats};
