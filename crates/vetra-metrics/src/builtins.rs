//! Standard veto figures of merit
//!
//! The compute functions here reproduce the conventional definitions:
//! deadtime is the fraction of analysis time a veto removes, efficiency
//! the fraction of triggers it removes, and the quotient of the two the
//! usual benefit/cost figure. All are percentages except the quotient.

use vetra_segments::SegmentList;
use vetra_triggers::{FieldOp, TriggerTable};

use crate::{Metric, MetricError, MetricResult, Unit};

/// Percentage of analysis time covered by the veto.
///
/// Returns 0 for an empty analysis window.
pub fn deadtime(
    veto: &SegmentList,
    analysis: &SegmentList,
    _triggers: Option<&TriggerTable>,
) -> MetricResult<f64> {
    let livetime = analysis.duration();
    if livetime == 0.0 {
        return Ok(0.0);
    }
    Ok(veto.intersect(analysis).duration() / livetime * 100.0)
}

/// Percentage of analysis-coincident triggers removed by the veto.
///
/// Returns 0 when no trigger falls in the analysis window.
pub fn efficiency(
    veto: &SegmentList,
    analysis: &SegmentList,
    triggers: Option<&TriggerTable>,
) -> MetricResult<f64> {
    let triggers = triggers.ok_or_else(|| MetricError::MissingTriggers {
        metric: "Efficiency".into(),
    })?;
    let before = triggers.count_in(analysis);
    if before == 0 {
        return Ok(0.0);
    }
    let vetoed = triggers.count_in(&veto.intersect(analysis));
    Ok(vetoed as f64 / before as f64 * 100.0)
}

/// Ratio of efficiency to deadtime, the benefit/cost of a veto.
///
/// A zero deadtime is a `DivisionByZero` error: the quotient is
/// undefined and the caller must see that explicitly rather than read a
/// fabricated number.
pub fn efficiency_over_deadtime(
    veto: &SegmentList,
    analysis: &SegmentList,
    triggers: Option<&TriggerTable>,
) -> MetricResult<f64> {
    let eff = efficiency(veto, analysis, triggers)?;
    let dt = deadtime(veto, analysis, triggers)?;
    if dt == 0.0 {
        return Err(MetricError::DivisionByZero {
            metric: "Efficiency/Deadtime".into(),
        });
    }
    Ok(eff / dt)
}

/// Percentage of veto segments that remove at least one trigger.
///
/// A veto with many unused segments is suspect even when its overall
/// efficiency looks good.
pub fn use_percentage(
    veto: &SegmentList,
    analysis: &SegmentList,
    triggers: Option<&TriggerTable>,
) -> MetricResult<f64> {
    let triggers = triggers.ok_or_else(|| MetricError::MissingTriggers {
        metric: "Use percentage".into(),
    })?;
    let active = veto.intersect(analysis);
    if active.is_empty() {
        return Ok(0.0);
    }
    let used = active
        .iter()
        .filter(|seg| triggers.iter().any(|t| seg.contains(t.time())))
        .count();
    Ok(used as f64 / active.len() as f64 * 100.0)
}

/// Build a metric reporting the percentage reduction in the loudest
/// surviving trigger, ranked by the named auxiliary field.
///
/// Returns 0 when there are no triggers to start with and 100 when
/// nothing survives the veto.
pub fn loudest_event_metric(field: &str) -> Metric {
    let field = field.to_owned();
    let name = format!("Loudest event by {field}");
    let rank_field = field.clone();
    Metric::new(name, Unit::Percent, move |veto, analysis, triggers| {
        let triggers = triggers.ok_or_else(|| MetricError::MissingTriggers {
            metric: format!("Loudest event by {rank_field}"),
        })?;
        let active = veto.intersect(analysis);
        let (_, surviving) = triggers.partition(&active);
        let before = match triggers.max_field(&rank_field) {
            Some(rank) => rank,
            None => return Ok(0.0),
        };
        match surviving.max_field(&rank_field) {
            Some(after) => Ok((before - after) / before * 100.0),
            None => Ok(100.0),
        }
    })
    .with_description(format!(
        "Percentage reduction in the loudest event ranked by {field}"
    ))
    .requires_triggers()
}

/// Build a variant of `base` restricted to the triggers whose named
/// field passes `op threshold`, e.g. efficiency over `snr >= 8`
/// triggers only.
///
/// The variant keeps the base unit and trigger requirement and names
/// itself `"<base> (<field> <op> <threshold>)"`.
pub fn field_filtered_metric(base: Metric, field: &str, op: FieldOp, threshold: f64) -> Metric {
    let name = format!("{} ({field} {op} {threshold})", base.name());
    let description = if base.description().is_empty() {
        format!("{} over triggers with {field} {op} {threshold}", base.name())
    } else {
        format!(
            "{}, over triggers with {field} {op} {threshold}",
            base.description()
        )
    };
    let unit = base.unit();
    let needs_triggers = base.needs_triggers();
    let field = field.to_owned();
    let metric = Metric::new(name, unit, move |veto, analysis, triggers| {
        let filtered = triggers.map(|t| t.filter_by_field(&field, op, threshold));
        Ok(base.call(veto, analysis, filtered.as_ref())?.value)
    })
    .with_description(description);
    if needs_triggers {
        metric.requires_triggers()
    } else {
        metric
    }
}

/// The built-in metrics installed into every fresh registry.
pub fn builtin_metrics() -> Vec<Metric> {
    vec![
        Metric::new("Deadtime", Unit::Percent, deadtime)
            .with_description("Percentage of analysis time removed by the veto"),
        Metric::new("Efficiency", Unit::Percent, efficiency)
            .with_description("Percentage of triggers removed by the veto")
            .requires_triggers(),
        Metric::new("Efficiency/Deadtime", Unit::Ratio, efficiency_over_deadtime)
            .with_description("Ratio of efficiency to deadtime")
            .requires_triggers(),
        Metric::new("Use percentage", Unit::Percent, use_percentage)
            .with_description("Percentage of veto segments that remove at least one trigger")
            .requires_triggers(),
    ]
}

/// Poisson-based safety check of a veto against signal injections.
///
/// Compares the number of injection segments coincident with the veto
/// to the count expected from random chance at this deadtime fraction.
/// The veto is unsafe (`false`) when the Poisson tail probability of
/// the observed coincidences drops below `threshold`: it eats injected
/// signals far more often than chance allows.
///
/// This is not a registry metric: it takes a third segment input, which
/// does not fit the `(veto, analysis, triggers)` contract.
pub fn safety(
    veto: &SegmentList,
    analysis: &SegmentList,
    injections: &SegmentList,
    threshold: f64,
) -> bool {
    let livetime = analysis.duration();
    if livetime == 0.0 || injections.is_empty() {
        return true;
    }
    let active = veto.intersect(analysis);
    let coincident = injections
        .iter()
        .filter(|inj| active.overlaps(inj))
        .count();
    let expected = injections.len() as f64 * active.duration() / livetime;
    poisson_tail(coincident as u64, expected) >= threshold
}

/// Default Poisson significance threshold for `safety`.
pub const SAFETY_THRESHOLD: f64 = 5e-3;

/// `P(X >= k)` for a Poisson variable with mean `lambda`.
///
/// The partial sums run in log space, so large means stay finite where
/// `exp(-lambda)` alone would underflow. The final subtraction floors
/// tiny tails near f64 epsilon rather than exactly zero, well below any
/// sensible significance threshold.
fn poisson_tail(k: u64, lambda: f64) -> f64 {
    if k == 0 {
        return 1.0;
    }
    if lambda == 0.0 {
        return 0.0;
    }
    let mut log_term = -lambda;
    let mut log_cdf = log_term;
    for i in 1..k {
        log_term += lambda.ln() - (i as f64).ln();
        log_cdf = log_sum_exp(log_cdf, log_term);
    }
    (1.0 - log_cdf.exp()).clamp(0.0, 1.0)
}

/// `ln(e^a + e^b)` without overflowing either exponential.
fn log_sum_exp(a: f64, b: f64) -> f64 {
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    hi + (lo - hi).exp().ln_1p()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(pairs: &[(f64, f64)]) -> SegmentList {
        SegmentList::from_raw(pairs.iter().copied()).unwrap()
    }

    fn table(times: &[f64]) -> TriggerTable {
        times.iter().map(|&t| vetra_triggers::Trigger::new(t)).collect()
    }

    #[test]
    fn test_deadtime_simple() {
        let analysis = segments(&[(0.0, 100.0)]);
        let veto = segments(&[(10.0, 20.0)]);
        assert_eq!(deadtime(&veto, &analysis, None).unwrap(), 10.0);
    }

    #[test]
    fn test_deadtime_overlapping_veto_coalesced() {
        let analysis = segments(&[(0.0, 100.0)]);
        let veto = segments(&[(10.0, 20.0), (15.0, 25.0)]);
        // overlapping raw segments never double-count
        assert_eq!(deadtime(&veto, &analysis, None).unwrap(), 15.0);
    }

    #[test]
    fn test_deadtime_empty_analysis() {
        let veto = segments(&[(10.0, 20.0)]);
        assert_eq!(deadtime(&veto, &SegmentList::new(), None).unwrap(), 0.0);
    }

    #[test]
    fn test_efficiency_simple() {
        let analysis = segments(&[(0.0, 100.0)]);
        let veto = segments(&[(10.0, 20.0)]);
        let triggers = table(&[5.0, 15.0, 50.0, 95.0]);
        assert_eq!(
            efficiency(&veto, &analysis, Some(&triggers)).unwrap(),
            25.0
        );
    }

    #[test]
    fn test_efficiency_no_triggers_in_analysis() {
        let analysis = segments(&[(0.0, 100.0)]);
        let veto = segments(&[(10.0, 20.0)]);
        let triggers = table(&[200.0, 300.0]);
        assert_eq!(efficiency(&veto, &analysis, Some(&triggers)).unwrap(), 0.0);
    }

    #[test]
    fn test_efficiency_over_deadtime() {
        let analysis = segments(&[(0.0, 100.0)]);
        let veto = segments(&[(10.0, 20.0)]);
        let triggers = table(&[5.0, 15.0, 50.0, 95.0]);
        let edr = efficiency_over_deadtime(&veto, &analysis, Some(&triggers)).unwrap();
        assert_eq!(edr, 2.5);
    }

    #[test]
    fn test_efficiency_over_deadtime_zero_deadtime() {
        let analysis = segments(&[(0.0, 100.0)]);
        let triggers = table(&[5.0]);
        let err =
            efficiency_over_deadtime(&SegmentList::new(), &analysis, Some(&triggers)).unwrap_err();
        assert_eq!(
            err,
            MetricError::DivisionByZero {
                metric: "Efficiency/Deadtime".into()
            }
        );
    }

    #[test]
    fn test_use_percentage() {
        let analysis = segments(&[(0.0, 100.0)]);
        let veto = segments(&[(10.0, 20.0), (40.0, 50.0), (70.0, 80.0), (90.0, 95.0)]);
        let triggers = table(&[15.0, 45.0]);
        assert_eq!(
            use_percentage(&veto, &analysis, Some(&triggers)).unwrap(),
            50.0
        );
    }

    #[test]
    fn test_use_percentage_empty_veto() {
        let analysis = segments(&[(0.0, 100.0)]);
        let triggers = table(&[15.0]);
        assert_eq!(
            use_percentage(&SegmentList::new(), &analysis, Some(&triggers)).unwrap(),
            0.0
        );
    }

    #[test]
    fn test_loudest_event_metric() {
        let analysis = segments(&[(0.0, 100.0)]);
        let veto = segments(&[(10.0, 20.0)]);
        let triggers: TriggerTable = vec![
            vetra_triggers::Trigger::new(15.0).with_field("snr", 20.0),
            vetra_triggers::Trigger::new(50.0).with_field("snr", 8.0),
        ]
        .into();
        let m = loudest_event_metric("snr");
        assert_eq!(m.name(), "Loudest event by snr");
        let q = m.call(&veto, &analysis, Some(&triggers)).unwrap();
        // loudest drops from 20 to 8
        assert_eq!(q.value, 60.0);
    }

    #[test]
    fn test_loudest_event_metric_edges() {
        let analysis = segments(&[(0.0, 100.0)]);
        let veto = segments(&[(0.0, 100.0)]);
        let m = loudest_event_metric("snr");

        let empty = TriggerTable::new();
        assert_eq!(m.call(&veto, &analysis, Some(&empty)).unwrap().value, 0.0);

        let all_vetoed: TriggerTable =
            vec![vetra_triggers::Trigger::new(50.0).with_field("snr", 9.0)].into();
        assert_eq!(
            m.call(&veto, &analysis, Some(&all_vetoed)).unwrap().value,
            100.0
        );
    }

    #[test]
    fn test_field_filtered_metric() {
        let analysis = segments(&[(0.0, 100.0)]);
        let veto = segments(&[(10.0, 20.0)]);
        let triggers: TriggerTable = vec![
            vetra_triggers::Trigger::new(15.0).with_field("snr", 20.0),
            vetra_triggers::Trigger::new(50.0).with_field("snr", 10.0),
            vetra_triggers::Trigger::new(60.0).with_field("snr", 3.0),
        ]
        .into();

        // plain efficiency sees all three triggers
        assert_eq!(
            efficiency(&veto, &analysis, Some(&triggers)).unwrap().round(),
            33.0
        );

        let base = Metric::new("Efficiency", Unit::Percent, efficiency).requires_triggers();
        let m = field_filtered_metric(base, "snr", FieldOp::Ge, 8.0);
        assert_eq!(m.name(), "Efficiency (snr >= 8)");
        assert_eq!(m.unit(), Unit::Percent);
        // only the two snr >= 8 triggers count, one of them vetoed
        assert_eq!(m.call(&veto, &analysis, Some(&triggers)).unwrap().value, 50.0);
    }

    #[test]
    fn test_field_filtered_metric_missing_triggers_names_variant() {
        let base = Metric::new("Efficiency", Unit::Percent, efficiency).requires_triggers();
        let m = field_filtered_metric(base, "snr", FieldOp::Gt, 5.0);
        let err = m
            .call(&SegmentList::new(), &segments(&[(0.0, 100.0)]), None)
            .unwrap_err();
        assert_eq!(
            err,
            MetricError::MissingTriggers {
                metric: "Efficiency (snr > 5)".into()
            }
        );
    }

    #[test]
    fn test_safety() {
        let analysis = segments(&[(0.0, 1000.0)]);
        // tiny deadtime, yet every injection is vetoed: clearly unsafe
        let veto = segments(&[(100.0, 101.0), (200.0, 201.0), (300.0, 301.0)]);
        let injections = segments(&[(100.2, 100.4), (200.2, 200.4), (300.2, 300.4)]);
        assert!(!safety(&veto, &analysis, &injections, SAFETY_THRESHOLD));

        // no coincidences at all: safe
        let clear = segments(&[(500.0, 500.2), (600.0, 600.2), (700.0, 700.2)]);
        assert!(safety(&veto, &analysis, &clear, SAFETY_THRESHOLD));

        // no injections: trivially safe
        assert!(safety(
            &veto,
            &analysis,
            &SegmentList::new(),
            SAFETY_THRESHOLD
        ));
    }

    #[test]
    fn test_poisson_tail() {
        assert_eq!(poisson_tail(0, 1.0), 1.0);
        // P(X >= 1) = 1 - e^-1
        assert!((poisson_tail(1, 1.0) - (1.0 - (-1.0f64).exp())).abs() < 1e-12);
        // large k at small mean is vanishingly likely
        assert!(poisson_tail(20, 0.1) < 1e-12);
    }

    #[test]
    fn test_poisson_tail_large_mean() {
        // exp(-800) underflows on its own; the log-space sums must not
        assert!(poisson_tail(2000, 800.0) < 1e-9);
        assert!(poisson_tail(1, 800.0) > 1.0 - 1e-9);
    }

    #[test]
    fn test_safety_large_injection_set() {
        let analysis = segments(&[(0.0, 10_000.0)]);
        let veto = segments(&[(0.0, 5_000.0)]);
        // a thousand injections, every one of them vetoed at 50% deadtime
        let raw: Vec<(f64, f64)> = (0..1000)
            .map(|i| {
                let start = i as f64 * 5.0 + 0.2;
                (start, start + 0.2)
            })
            .collect();
        let injections = segments(&raw);
        assert!(!safety(&veto, &analysis, &injections, SAFETY_THRESHOLD));
    }
}
