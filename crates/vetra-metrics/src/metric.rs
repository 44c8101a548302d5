//! The `Metric` abstraction
//!
//! A `Metric` wraps a pure figure-of-merit function
//! `(veto, analysis, triggers) -> scalar` together with a display name,
//! a one-line description, and a unit. Metrics are plain values; any
//! closure or function with the right signature can be wrapped, there is
//! no trait to implement.

use std::fmt;
use std::sync::Arc;

use vetra_segments::SegmentList;
use vetra_triggers::TriggerTable;

use crate::{MetricError, MetricResult};

/// Unit tag carried by every metric result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Unit {
    /// A percentage in `[0, 100]`
    Percent,
    /// A quotient of two like quantities
    Ratio,
    #[default]
    Unitless,
}

impl Unit {
    /// Display suffix, empty for dimensionless units.
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Percent => "%",
            Unit::Ratio | Unit::Unitless => "",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A scalar with its unit, the output of one metric invocation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: Unit,
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit.symbol() {
            "" => write!(f, "{}", self.value),
            symbol => write!(f, "{} {}", self.value, symbol),
        }
    }
}

/// Signature shared by all metric compute functions.
pub type MetricFn =
    dyn Fn(&SegmentList, &SegmentList, Option<&TriggerTable>) -> MetricResult<f64> + Send + Sync;

/// A named, unit-bearing figure of merit.
///
/// Metrics are immutable values identified by name for registry
/// purposes; cloning shares the underlying compute function.
#[derive(Clone)]
pub struct Metric {
    name: String,
    description: String,
    unit: Unit,
    needs_triggers: bool,
    compute: Arc<MetricFn>,
}

impl Metric {
    pub fn new<F>(name: impl Into<String>, unit: Unit, compute: F) -> Self
    where
        F: Fn(&SegmentList, &SegmentList, Option<&TriggerTable>) -> MetricResult<f64>
            + Send
            + Sync
            + 'static,
    {
        Metric {
            name: name.into(),
            description: String::new(),
            unit,
            needs_triggers: false,
            compute: Arc::new(compute),
        }
    }

    /// Attach a one-line description (builder style).
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark this metric as requiring a trigger table.
    pub fn requires_triggers(mut self) -> Self {
        self.needs_triggers = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn needs_triggers(&self) -> bool {
        self.needs_triggers
    }

    /// Invoke the metric.
    ///
    /// Fails with `MissingTriggers` before touching the compute function
    /// when a trigger-requiring metric is called without a table.
    pub fn call(
        &self,
        veto: &SegmentList,
        analysis: &SegmentList,
        triggers: Option<&TriggerTable>,
    ) -> MetricResult<Quantity> {
        if self.needs_triggers && triggers.is_none() {
            return Err(MetricError::MissingTriggers {
                metric: self.name.clone(),
            });
        }
        let value = (self.compute)(veto, analysis, triggers)?;
        Ok(Quantity {
            value,
            unit: self.unit,
        })
    }
}

impl fmt::Debug for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metric")
            .field("name", &self.name)
            .field("unit", &self.unit)
            .field("needs_triggers", &self.needs_triggers)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
