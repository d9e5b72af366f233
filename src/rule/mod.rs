//! Read/Write-Splitting Rules
//!
//! # Architecture
//!
//! ```text
//! ReadWriteSplittingRule          one per configuration generation
//!     │   groups (insertion ordered), load balancers by name
//!     ▼
//! DataSourceRule                  one per logical group
//!     │   write source, read sources, disabled set
//!     ▼
//! LoadBalanceAlgorithm            picks among enabled read sources
//! ```
//!
//! Writes always resolve to the group's write data source. Reads go to an
//! enabled replica chosen by the group's algorithm, or to the write data
//! source when every replica is disabled. Health events fan out to every
//! group, since one physical data source may back several logical groups.

mod data_source;
mod event;
mod readwrite_splitting;

pub use data_source::{DataSourceRule, OperationKind};
pub use event::RuleChangedEvent;
pub use readwrite_splitting::ReadWriteSplittingRule;
