//! Trigger tables and coincidence testing

use std::fmt;

use vetra_segments::SegmentList;

use crate::Trigger;

/// Comparison applied by [`TriggerTable::filter_by_field`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldOp {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    Ne,
}

impl FieldOp {
    fn test(self, value: f64, threshold: f64) -> bool {
        match self {
            FieldOp::Lt => value < threshold,
            FieldOp::Le => value <= threshold,
            FieldOp::Eq => value == threshold,
            FieldOp::Ge => value >= threshold,
            FieldOp::Gt => value > threshold,
            FieldOp::Ne => value != threshold,
        }
    }
}

impl fmt::Display for FieldOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldOp::Lt => "<",
            FieldOp::Le => "<=",
            FieldOp::Eq => "==",
            FieldOp::Ge => ">=",
            FieldOp::Gt => ">",
            FieldOp::Ne => "!=",
        })
    }
}

/// An ordered collection of triggers.
///
/// The table preserves input order; no mutual invariant is imposed on
/// the triggers beyond each carrying a well-defined timestamp.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriggerTable {
    triggers: Vec<Trigger>,
}

impl TriggerTable {
    pub fn new() -> Self {
        TriggerTable::default()
    }

    pub fn push(&mut self, trigger: Trigger) {
        self.triggers.push(trigger);
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trigger> {
        self.triggers.iter()
    }

    /// Number of triggers whose timestamp falls inside `segments`.
    ///
    /// Each membership test is a binary search over segment starts, so
    /// the whole count is O(m log n) for m triggers and n segments.
    pub fn count_in(&self, segments: &SegmentList) -> usize {
        self.triggers
            .iter()
            .filter(|t| segments.contains(t.time()))
            .count()
    }

    /// Split into `(vetoed, surviving)` tables around a veto segment list.
    ///
    /// Both halves preserve the input order.
    pub fn partition(&self, veto: &SegmentList) -> (TriggerTable, TriggerTable) {
        let (vetoed, surviving) = self
            .triggers
            .iter()
            .cloned()
            .partition(|t| veto.contains(t.time()));
        (
            TriggerTable { triggers: vetoed },
            TriggerTable { triggers: surviving },
        )
    }

    /// Keep only triggers whose named field passes `op threshold`.
    ///
    /// Triggers not carrying the field are dropped; order is preserved.
    pub fn filter_by_field(&self, name: &str, op: FieldOp, threshold: f64) -> TriggerTable {
        self.triggers
            .iter()
            .filter(|t| t.field(name).is_some_and(|v| op.test(v, threshold)))
            .cloned()
            .collect()
    }

    /// Largest value of a named auxiliary field, if any trigger carries it.
    pub fn max_field(&self, name: &str) -> Option<f64> {
        self.triggers
            .iter()
            .filter_map(|t| t.field(name))
            .reduce(f64::max)
    }
}

impl From<Vec<Trigger>> for TriggerTable {
    fn from(triggers: Vec<Trigger>) -> Self {
        TriggerTable { triggers }
    }
}

impl FromIterator<Trigger> for TriggerTable {
    fn from_iter<I: IntoIterator<Item = Trigger>>(iter: I) -> Self {
        TriggerTable {
            triggers: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TriggerTable {
    type Item = &'a Trigger;
    type IntoIter = std::slice::Iter<'a, Trigger>;

    fn into_iter(self) -> Self::IntoIter {
        self.triggers.iter()
    }
}
