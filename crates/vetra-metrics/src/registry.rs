//! Metric registry and name resolution
//!
//! Metrics are looked up by name so that configuration layers can refer
//! to them as plain strings. Names are case-insensitive; lookups of
//! `a/b` where both sides are registered build an anonymous ratio
//! metric on the fly (one level of composition, no recursion).

use std::sync::OnceLock;

use parking_lot::RwLock;

use crate::builtins::builtin_metrics;
use crate::{Metric, MetricError, MetricResult, Unit};

/// Resolution of a metric name string, parsed once at lookup time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// A directly registered name
    Simple(String),
    /// A one-level quotient of two registered names
    Ratio(String, String),
}

impl Resolution {
    /// Parse a metric name.
    ///
    /// Returns `None` for names with more than one `/` or an empty
    /// side; those can never resolve.
    pub fn parse(name: &str) -> Option<Resolution> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let mut parts = name.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(simple), None, _) => Some(Resolution::Simple(simple.trim().to_owned())),
            (Some(num), Some(den), None) => {
                let (num, den) = (num.trim(), den.trim());
                if num.is_empty() || den.is_empty() {
                    None
                } else {
                    Some(Resolution::Ratio(num.to_owned(), den.to_owned()))
                }
            }
            _ => None,
        }
    }
}

struct Entry {
    /// Lowercased registration name
    key: String,
    metric: Metric,
    builtin: bool,
}

/// A mapping from name to `Metric`, safe for concurrent use.
///
/// Insertion order is retained for display purposes. Re-registering an
/// existing name replaces the metric silently; previously obtained
/// `Metric` handles are independent values and keep their behavior.
pub struct Registry {
    entries: RwLock<Vec<Entry>>,
}

impl Registry {
    /// An empty registry with no metrics at all.
    pub fn empty() -> Self {
        Registry {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// A registry populated with the built-in metrics.
    pub fn with_builtins() -> Self {
        let registry = Registry::empty();
        {
            let mut entries = registry.entries.write();
            for metric in builtin_metrics() {
                entries.push(Entry {
                    key: metric.name().to_lowercase(),
                    metric,
                    builtin: true,
                });
            }
        }
        registry
    }

    /// Register a metric under its own name.
    ///
    /// Returns the previously registered metric when a name is
    /// overwritten.
    pub fn register(&self, metric: Metric) -> Option<Metric> {
        let key = metric.name().to_lowercase();
        let mut entries = self.entries.write();
        if let Some(entry) = entries.iter_mut().find(|e| e.key == key) {
            if entry.builtin {
                tracing::warn!(name = metric.name(), "overwriting built-in metric");
            }
            let previous = std::mem::replace(
                entry,
                Entry {
                    key,
                    metric,
                    builtin: false,
                },
            );
            return Some(previous.metric);
        }
        entries.push(Entry {
            key,
            metric,
            builtin: false,
        });
        None
    }

    /// Wrap a bare compute function and register it.
    pub fn register_fn<F>(&self, name: impl Into<String>, unit: Unit, compute: F) -> Option<Metric>
    where
        F: Fn(
                &vetra_segments::SegmentList,
                &vetra_segments::SegmentList,
                Option<&vetra_triggers::TriggerTable>,
            ) -> MetricResult<f64>
            + Send
            + Sync
            + 'static,
    {
        self.register(Metric::new(name, unit, compute))
    }

    fn lookup(&self, name: &str) -> Option<Metric> {
        let key = name.trim().to_lowercase();
        self.entries
            .read()
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.metric.clone())
    }

    /// Resolve a name into a metric.
    ///
    /// Registered names (including registered compound names such as
    /// `efficiency/deadtime`) win outright; otherwise `a/b` resolves to
    /// an anonymous ratio of two registered simple names. Anything else
    /// is `UnknownMetric`. Ratio construction never mutates the
    /// registry.
    pub fn get(&self, name: &str) -> MetricResult<Metric> {
        if let Some(metric) = self.lookup(name) {
            return Ok(metric);
        }
        match Resolution::parse(name) {
            Some(Resolution::Ratio(num, den)) => {
                let numerator = self
                    .lookup(&num)
                    .ok_or_else(|| MetricError::UnknownMetric(num.clone()))?;
                let denominator = self
                    .lookup(&den)
                    .ok_or_else(|| MetricError::UnknownMetric(den.clone()))?;
                Ok(ratio_metric(numerator, denominator))
            }
            _ => Err(MetricError::UnknownMetric(name.trim().to_owned())),
        }
    }

    /// Display names of all registered metrics, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .read()
            .iter()
            .map(|e| e.metric.name().to_owned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::with_builtins()
    }
}

/// Build the anonymous quotient of two metrics.
fn ratio_metric(numerator: Metric, denominator: Metric) -> Metric {
    let name = format!("{}/{}", numerator.name(), denominator.name());
    let needs_triggers = numerator.needs_triggers() || denominator.needs_triggers();
    let error_name = name.clone();
    let (num, den) = (numerator, denominator);
    let metric = Metric::new(name, Unit::Ratio, move |veto, analysis, triggers| {
        let n = num.call(veto, analysis, triggers)?;
        let d = den.call(veto, analysis, triggers)?;
        if d.value == 0.0 {
            return Err(MetricError::DivisionByZero {
                metric: error_name.clone(),
            });
        }
        Ok(n.value / d.value)
    });
    if needs_triggers {
        metric.requires_triggers()
    } else {
        metric
    }
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// The process-wide registry, created with the built-ins on first use.
pub fn global() -> &'static Registry {
    GLOBAL.get_or_init(Registry::with_builtins)
}

/// Register a metric in the process-wide registry.
pub fn register_metric(metric: Metric) -> Option<Metric> {
    global().register(metric)
}

/// Resolve a name against the process-wide registry.
pub fn get_metric(name: &str) -> MetricResult<Metric> {
    global().get(name)
}

/// Display names registered in the process-wide registry.
pub fn get_all_metrics() -> Vec<String> {
    global().names()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vetra_segments::SegmentList;
    use vetra_triggers::{Trigger, TriggerTable};

    fn segments(pairs: &[(f64, f64)]) -> SegmentList {
        SegmentList::from_raw(pairs.iter().copied()).unwrap()
    }

    fn standard_inputs() -> (SegmentList, SegmentList, TriggerTable) {
        let veto = segments(&[(10.0, 20.0)]);
        let analysis = segments(&[(0.0, 100.0)]);
        let triggers = [5.0, 15.0, 50.0, 95.0]
            .iter()
            .map(|&t| Trigger::new(t))
            .collect();
        (veto, analysis, triggers)
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!(
            Resolution::parse("deadtime"),
            Some(Resolution::Simple("deadtime".into()))
        );
        assert_eq!(
            Resolution::parse("efficiency/deadtime"),
            Some(Resolution::Ratio("efficiency".into(), "deadtime".into()))
        );
        assert_eq!(
            Resolution::parse(" efficiency / deadtime "),
            Some(Resolution::Ratio("efficiency".into(), "deadtime".into()))
        );
        assert_eq!(Resolution::parse("a/b/c"), None);
        assert_eq!(Resolution::parse("/deadtime"), None);
        assert_eq!(Resolution::parse(""), None);
    }

    #[test]
    fn test_builtins_present() {
        let registry = Registry::with_builtins();
        assert_eq!(
            registry.names(),
            vec![
                "Deadtime",
                "Efficiency",
                "Efficiency/Deadtime",
                "Use percentage"
            ]
        );
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let registry = Registry::with_builtins();
        assert_eq!(registry.get("deadtime").unwrap().name(), "Deadtime");
        assert_eq!(registry.get("DEADTIME").unwrap().name(), "Deadtime");
    }

    #[test]
    fn test_unknown_metric() {
        let registry = Registry::with_builtins();
        assert_eq!(
            registry.get("sensemon range").unwrap_err(),
            MetricError::UnknownMetric("sensemon range".into())
        );
        assert_eq!(
            registry.get("a/b/c").unwrap_err(),
            MetricError::UnknownMetric("a/b/c".into())
        );
    }

    #[test]
    fn test_registered_compound_wins_over_parsing() {
        // "efficiency/deadtime" is itself registered; direct lookup
        // must return the built-in, not a synthesized ratio
        let registry = Registry::with_builtins();
        let m = registry.get("efficiency/deadtime").unwrap();
        assert_eq!(m.name(), "Efficiency/Deadtime");
    }

    #[test]
    fn test_dynamic_ratio() {
        let registry = Registry::with_builtins();
        registry.register_fn("livetime", Unit::Unitless, |_, analysis, _| {
            Ok(analysis.duration())
        });
        let m = registry.get("deadtime/livetime").unwrap();
        let (veto, analysis, _) = standard_inputs();
        let q = m.call(&veto, &analysis, None).unwrap();
        assert_eq!(q.value, 0.1);
        assert_eq!(q.unit, Unit::Ratio);
        // ratio construction does not grow the registry
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_ratio_consistency_with_builtin() {
        let registry = Registry::with_builtins();
        let (veto, analysis, triggers) = standard_inputs();
        let compound = registry
            .get("efficiency/deadtime")
            .unwrap()
            .call(&veto, &analysis, Some(&triggers))
            .unwrap();
        let eff = registry
            .get("efficiency")
            .unwrap()
            .call(&veto, &analysis, Some(&triggers))
            .unwrap();
        let dt = registry
            .get("deadtime")
            .unwrap()
            .call(&veto, &analysis, Some(&triggers))
            .unwrap();
        assert_eq!(compound.value, eff.value / dt.value);
    }

    #[test]
    fn test_ratio_unregistered_side() {
        let registry = Registry::with_builtins();
        assert_eq!(
            registry.get("efficiency/unknown").unwrap_err(),
            MetricError::UnknownMetric("unknown".into())
        );
    }

    #[test]
    fn test_register_overwrites_silently() {
        let registry = Registry::with_builtins();
        registry.register_fn("custom", Unit::Unitless, |_, _, _| Ok(1.0));
        let old_handle = registry.get("custom").unwrap();

        let replaced = registry.register_fn("custom", Unit::Unitless, |_, _, _| Ok(2.0));
        assert!(replaced.is_some());

        let empty = SegmentList::new();
        // old handles keep old behavior, new lookups see the new metric
        assert_eq!(old_handle.call(&empty, &empty, None).unwrap().value, 1.0);
        let new_handle = registry.get("custom").unwrap();
        assert_eq!(new_handle.call(&empty, &empty, None).unwrap().value, 2.0);
        // still a single entry under that name
        assert_eq!(
            registry.names().iter().filter(|n| *n == "custom").count(),
            1
        );
    }

    #[test]
    fn test_overwriting_builtin_changes_lookup() {
        let registry = Registry::with_builtins();
        registry.register_fn("Deadtime", Unit::Percent, |_, _, _| Ok(99.0));
        let (veto, analysis, _) = standard_inputs();
        let q = registry
            .get("deadtime")
            .unwrap()
            .call(&veto, &analysis, None)
            .unwrap();
        assert_eq!(q.value, 99.0);
    }

    #[test]
    fn test_concurrent_register_and_lookup() {
        use std::sync::Arc;

        let registry = Arc::new(Registry::with_builtins());
        let mut handles = Vec::new();
        for i in 0..4 {
            let registry = Arc::clone(&registry);
            handles.push(std::thread::spawn(move || {
                for j in 0..50 {
                    let value = (i * 50 + j) as f64;
                    registry.register_fn(format!("worker{i}"), Unit::Unitless, move |_, _, _| {
                        Ok(value)
                    });
                    assert!(registry.get("deadtime").is_ok());
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn test_global_registry() {
        // the process-wide registry carries the built-ins
        assert!(get_metric("deadtime").is_ok());
        assert!(get_all_metrics().contains(&"Deadtime".to_owned()));
    }
}
