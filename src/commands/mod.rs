//! Top-level command orchestration.
pub mod deploy;
