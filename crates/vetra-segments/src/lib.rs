//! Vetra Segments - GPS time intervals and interval-set algebra
//!
//! This crate defines the time primitives shared by the whole workspace:
//! - `GpsTime` timestamps
//! - `Segment` half-open intervals with validated bounds
//! - `SegmentList` ordered, disjoint, coalesced interval sets with
//!   union / intersection / difference / clipping and total duration

pub mod gps;
pub mod list;
pub mod segment;

pub use gps::*;
pub use list::*;
pub use segment::*;
