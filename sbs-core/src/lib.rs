//! sbs-core: SBS-1 (BaseStation) report parsing and multi-station aggregation.
//!
//! No async, no networking — just the parser and the aircraft state machine.
//! This crate is the shared core used by both `sbs-feeder` (station
//! connections) and `sbs-server` (aggregation engine, dashboard, CLI).

pub mod aircraft;
pub mod config;
pub mod parse;
pub mod registry;
pub mod types;

// Re-export commonly used types at crate root
pub use aircraft::{Aircraft, Disposition, HistoryLimits};
pub use parse::{format_record, parse, parse_line};
pub use registry::Registry;
pub use types::*;
