//! Vetra Engine - Veto flag evaluation pipeline
//!
//! The entry point consumed by reporting and orchestration layers:
//! raw segment pairs and an optional trigger table in, an ordered list
//! of `(metric, value, unit)` rows out. Segment retrieval, trigger file
//! parsing, and report rendering live outside this workspace.

pub mod evaluate;

pub use evaluate::*;
