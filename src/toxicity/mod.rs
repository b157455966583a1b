//! Toxicity detection: vocabulary scoring and incident reporting.

pub mod report;
pub mod scorer;
