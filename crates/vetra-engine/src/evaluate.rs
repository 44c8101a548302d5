//! Flag evaluation pipeline
//!
//! One call evaluates one veto flag: raw veto and analysis intervals
//! plus an optional trigger table go in, an ordered table of metric
//! results comes out. The pipeline is pure apart from registry reads
//! and is safe to run from many worker threads at once.

use std::fmt;

use vetra_metrics::{MetricResult, Registry, Unit};
use vetra_segments::SegmentList;
use vetra_triggers::TriggerTable;

/// Tunables for one evaluation call.
#[derive(Clone, Debug, Default)]
pub struct EvaluateConfig {
    /// Minimum duration (seconds) of post-veto analysis segments.
    ///
    /// Survivor gaps shorter than this are folded back into the veto
    /// before any metric runs: stretches too short to analyse are dead
    /// time in practice even if the flag was not active.
    pub min_duration: Option<f64>,
}

/// One metric result: the row of a report table.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub metric: String,
    pub value: f64,
    pub unit: Unit,
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit.symbol() {
            "" => write!(f, "{}: {}", self.metric, self.value),
            symbol => write!(f, "{}: {} {}", self.metric, self.value, symbol),
        }
    }
}

/// Evaluate a veto flag against a set of metrics.
///
/// Pipeline:
/// 1. coalesce the raw analysis and veto intervals (any `start >= end`
///    pair fails the whole call),
/// 2. clip the veto to the analysis extent - vetoes outside the
///    analysis window never contribute,
/// 3. fold short survivor gaps into the veto when
///    `config.min_duration` is set,
/// 4. resolve and invoke each metric in caller order.
///
/// Results preserve the order of `metric_names`. Every metric is
/// recomputed from the clean inputs; nothing is cached across entries.
/// The first failure aborts the call - a partial metric table would be
/// misleading in a report.
pub fn evaluate<S: AsRef<str>>(
    registry: &Registry,
    veto_raw: &[(f64, f64)],
    analysis_raw: &[(f64, f64)],
    triggers: Option<&TriggerTable>,
    metric_names: &[S],
    config: &EvaluateConfig,
) -> MetricResult<Vec<Evaluation>> {
    let analysis = SegmentList::from_raw(analysis_raw.iter().copied())?;
    let mut veto = SegmentList::from_raw(veto_raw.iter().copied())?;

    veto = match analysis.extent() {
        Some(bound) => veto.restrict_to(&bound),
        None => SegmentList::new(),
    };

    if let Some(min_duration) = config.min_duration {
        veto = fold_short_survivors(&veto, &analysis, min_duration);
    }

    let mut results = Vec::with_capacity(metric_names.len());
    for name in metric_names {
        let name = name.as_ref();
        let metric = registry.get(name)?;
        let quantity = metric.call(&veto, &analysis, triggers)?;
        tracing::debug!(
            metric = metric.name(),
            value = quantity.value,
            "evaluated metric"
        );
        results.push(Evaluation {
            metric: metric.name().to_owned(),
            value: quantity.value,
            unit: quantity.unit,
        });
    }
    Ok(results)
}

/// Evaluate against the process-wide registry.
pub fn evaluate_flag<S: AsRef<str>>(
    veto_raw: &[(f64, f64)],
    analysis_raw: &[(f64, f64)],
    triggers: Option<&TriggerTable>,
    metric_names: &[S],
    config: &EvaluateConfig,
) -> MetricResult<Vec<Evaluation>> {
    evaluate(
        vetra_metrics::global(),
        veto_raw,
        analysis_raw,
        triggers,
        metric_names,
        config,
    )
}

/// Fold analysis stretches that survive the veto but are shorter than
/// `min_duration` back into the veto.
fn fold_short_survivors(
    veto: &SegmentList,
    analysis: &SegmentList,
    min_duration: f64,
) -> SegmentList {
    let survivors = analysis.difference(veto).filter_duration(min_duration);
    analysis.difference(&survivors)
}
