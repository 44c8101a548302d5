//! Vetra Test - Generators and benchmarks for the evaluation engine
//!
//! Seeded random segment lists and trigger tables for exercising the
//! interval algebra and the metric pipeline at realistic sizes.

pub mod generator;

pub use generator::*;
