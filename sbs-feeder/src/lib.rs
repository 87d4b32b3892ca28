//! sbs-feeder: async ingestion side of sbs-merge.
//!
//! One `FeedConnector` per station, all sending parsed messages into a single
//! bounded channel. Used by the `sbs-feeder` binary for inspecting feeds and
//! by `sbs-server` to drive the aggregation engine.

pub mod backoff;
pub mod connector;
pub mod logging;
pub mod stats;

pub use backoff::ReconnectPolicy;
pub use connector::{pump, FeedConnector, PumpEnd};
pub use stats::{StationStats, StatsSnapshot};

/// Capacity of the merge channel between connectors and the engine.
pub const MERGE_CHANNEL_CAPACITY: usize = 4096;
