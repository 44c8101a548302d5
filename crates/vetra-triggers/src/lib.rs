//! Vetra Triggers - Event collections for veto impact studies
//!
//! Triggers are the timestamped candidate events (signals or glitches)
//! used to measure what a veto removes from an analysis:
//! - `Trigger` - one event with a GPS time and opaque auxiliary fields
//! - `TriggerTable` - an ordered collection with coincidence counting
//!   and veto partitioning

pub mod table;
pub mod trigger;

pub use table::*;
pub use trigger::*;
