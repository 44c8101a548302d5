//! Single event triggers
//!
//! A trigger is a timestamped record of a candidate signal or glitch.
//! Beyond the GPS timestamp the core carries auxiliary numeric fields
//! (SNR, frequency, ...) without interpreting them; only metrics that
//! name a field ever read one.

use std::collections::BTreeMap;

use vetra_segments::GpsTime;

/// A timestamped event with opaque auxiliary fields.
#[derive(Clone, Debug, PartialEq)]
pub struct Trigger {
    time: GpsTime,
    fields: BTreeMap<String, f64>,
}

impl Trigger {
    pub fn new(time: impl Into<GpsTime>) -> Self {
        Trigger {
            time: time.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Attach an auxiliary field (builder style).
    pub fn with_field(mut self, name: impl Into<String>, value: f64) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    #[inline]
    pub fn time(&self) -> GpsTime {
        self.time
    }

    /// Look up an auxiliary field by name.
    pub fn field(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, f64)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
