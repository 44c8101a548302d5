//! Vetra Metrics - Figures of merit for data-quality vetoes
//!
//! This crate turns (veto segments, analysis segments, optional trigger
//! table) into named, unit-bearing scalars:
//! - `Metric` - a pure compute function with a name, description, unit,
//!   and trigger requirement
//! - built-in metrics: deadtime, efficiency, efficiency/deadtime, use
//!   percentage, plus the loudest-event and field-filter factories and
//!   the Poisson safety check
//! - `Registry` - name-to-metric mapping with case-insensitive lookup
//!   and on-the-fly ratio composition of registered names

pub mod builtins;
pub mod error;
pub mod metric;
pub mod registry;

pub use builtins::*;
pub use error::*;
pub use metric::*;
pub use registry::*;
