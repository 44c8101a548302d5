//! Seeded random data generators for tests and benchmarks

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use vetra_segments::SegmentList;
use vetra_triggers::{Trigger, TriggerTable};

/// Generator configuration
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Span of generated data in GPS seconds, starting at 0
    pub span: f64,
    /// Shortest generated segment
    pub min_segment: f64,
    /// Longest generated segment
    pub max_segment: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            span: 10_000.0,
            min_segment: 0.5,
            max_segment: 60.0,
        }
    }
}

/// Deterministic random segment and trigger generator.
///
/// The same seed always produces the same data, so benchmark runs and
/// regression tests are comparable.
pub struct DataGenerator {
    rng: StdRng,
    config: GeneratorConfig,
}

impl DataGenerator {
    pub fn with_seed(seed: u64) -> Self {
        Self::new(GeneratorConfig::default(), seed)
    }

    pub fn new(config: GeneratorConfig, seed: u64) -> Self {
        DataGenerator {
            rng: StdRng::seed_from_u64(seed),
            config,
        }
    }

    /// Raw `(start, end)` pairs, possibly overlapping and unsorted.
    pub fn raw_intervals(&mut self, count: usize) -> Vec<(f64, f64)> {
        (0..count)
            .map(|_| {
                let start = self.rng.gen_range(0.0..self.config.span);
                let len = self
                    .rng
                    .gen_range(self.config.min_segment..self.config.max_segment);
                (start, start + len)
            })
            .collect()
    }

    /// A coalesced segment list of roughly `count` raw segments.
    pub fn segment_list(&mut self, count: usize) -> SegmentList {
        let raw = self.raw_intervals(count);
        SegmentList::from_raw(raw).expect("generated intervals are valid")
    }

    /// A trigger table of `count` events with an `snr` field.
    pub fn trigger_table(&mut self, count: usize) -> TriggerTable {
        (0..count)
            .map(|_| {
                let time = self.rng.gen_range(0.0..self.config.span);
                let snr = self.rng.gen_range(5.0..100.0);
                Trigger::new(time).with_field("snr", snr)
            })
            .collect()
    }
}
