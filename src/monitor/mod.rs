//! The detection-and-capture pipeline.

pub mod pipeline;

pub use pipeline::{Monitor, MonitorConfig, MonitorHandle, TickOutcome};
