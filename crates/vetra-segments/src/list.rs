//! Ordered, disjoint, coalesced segment lists
//!
//! `SegmentList` is the interval-set workhorse of the engine. Every list
//! is normalized on construction: segments sorted by start, mutually
//! disjoint, and maximally merged (touching segments collapse into one).
//! All algebra operations preserve that invariant and return new lists.

use crate::{GpsTime, Segment, SegmentError, SegmentResult};

/// An ordered set of disjoint, coalesced half-open GPS segments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SegmentList {
    segments: Vec<Segment>,
}

impl SegmentList {
    /// The empty segment list.
    pub fn new() -> Self {
        SegmentList::default()
    }

    /// Build a list from raw `(start, end)` pairs.
    ///
    /// The input may be unsorted and overlapping; it is validated and
    /// coalesced. Any pair with `start >= end` fails the whole call.
    pub fn from_raw<I>(pairs: I) -> SegmentResult<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let segments = pairs
            .into_iter()
            .map(Segment::try_from)
            .collect::<SegmentResult<Vec<_>>>()?;
        Ok(Self::from_segments(segments))
    }

    /// Build a list from already-validated segments, coalescing as needed.
    pub fn from_segments(mut segments: Vec<Segment>) -> Self {
        segments.sort_by(|a, b| a.start().as_secs_f64().total_cmp(&b.start().as_secs_f64()));
        let mut merged: Vec<Segment> = Vec::with_capacity(segments.len());
        for seg in segments {
            match merged.last_mut() {
                // Closed-merge tie-break: a segment starting exactly at the
                // running end is absorbed.
                Some(last) if seg.start() <= last.end() => {
                    if seg.end() > last.end() {
                        *last = Segment::new_unchecked(last.start(), seg.end());
                    }
                }
                _ => merged.push(seg),
            }
        }
        SegmentList { segments: merged }
    }

    /// Wrap segments already known to satisfy the list invariant.
    fn from_normalized(segments: Vec<Segment>) -> Self {
        debug_assert!(segments.windows(2).all(|w| w[0].end() < w[1].start()));
        SegmentList { segments }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn as_slice(&self) -> &[Segment] {
        &self.segments
    }

    /// Total duration in seconds; 0 for the empty list.
    pub fn duration(&self) -> f64 {
        self.segments.iter().map(Segment::duration).sum()
    }

    /// The single segment spanning the whole list, or `None` if empty.
    pub fn extent(&self) -> Option<Segment> {
        match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => {
                Some(Segment::new_unchecked(first.start(), last.end()))
            }
            _ => None,
        }
    }

    /// Half-open membership test, binary search over segment starts.
    pub fn contains(&self, t: GpsTime) -> bool {
        let idx = self
            .segments
            .partition_point(|seg| seg.start() <= t);
        idx > 0 && self.segments[idx - 1].contains(t)
    }

    /// Whether any segment of the list overlaps `other`.
    pub fn overlaps(&self, other: &Segment) -> bool {
        let idx = self
            .segments
            .partition_point(|seg| seg.end() <= other.start());
        idx < self.segments.len() && self.segments[idx].overlaps(other)
    }

    /// Set union with another list.
    pub fn union(&self, other: &SegmentList) -> SegmentList {
        let mut all = Vec::with_capacity(self.len() + other.len());
        all.extend_from_slice(&self.segments);
        all.extend_from_slice(&other.segments);
        SegmentList::from_segments(all)
    }

    /// Set intersection: linear sweep over both sorted lists.
    pub fn intersect(&self, other: &SegmentList) -> SegmentList {
        let (a, b) = (&self.segments, &other.segments);
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            let start = a[i].start().max(b[j].start());
            let end = a[i].end().min(b[j].end());
            if start < end {
                out.push(Segment::new_unchecked(start, end));
            }
            if a[i].end() <= b[j].end() {
                i += 1;
            } else {
                j += 1;
            }
        }
        SegmentList::from_normalized(out)
    }

    /// Clip the list to a single bounding segment.
    pub fn restrict_to(&self, bound: &Segment) -> SegmentList {
        let out = self
            .segments
            .iter()
            .filter_map(|seg| seg.clip(bound))
            .collect();
        SegmentList::from_normalized(out)
    }

    /// Set difference: the parts of `self` not covered by `other`.
    pub fn difference(&self, other: &SegmentList) -> SegmentList {
        let b = &other.segments;
        let mut out = Vec::new();
        let mut j = 0;
        for seg in &self.segments {
            let mut cursor = seg.start();
            while j < b.len() && b[j].end() <= cursor {
                j += 1;
            }
            let mut k = j;
            while k < b.len() && b[k].start() < seg.end() {
                if b[k].start() > cursor {
                    out.push(Segment::new_unchecked(cursor, b[k].start()));
                }
                cursor = cursor.max(b[k].end());
                k += 1;
                if cursor >= seg.end() {
                    break;
                }
            }
            if cursor < seg.end() {
                out.push(Segment::new_unchecked(cursor, seg.end()));
            }
        }
        SegmentList::from_segments(out)
    }

    /// Complement within a bounding segment: the gaps of `self` in `bound`.
    pub fn complement_within(&self, bound: &Segment) -> SegmentList {
        SegmentList::from_normalized(vec![*bound]).difference(self)
    }

    /// Keep only segments at least `min_duration` seconds long.
    pub fn filter_duration(&self, min_duration: f64) -> SegmentList {
        let out = self
            .segments
            .iter()
            .filter(|seg| seg.duration() >= min_duration)
            .copied()
            .collect();
        SegmentList::from_normalized(out)
    }
}

impl TryFrom<&[(f64, f64)]> for SegmentList {
    type Error = SegmentError;

    fn try_from(pairs: &[(f64, f64)]) -> SegmentResult<Self> {
        SegmentList::from_raw(pairs.iter().copied())
    }
}

impl FromIterator<Segment> for SegmentList {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        SegmentList::from_segments(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a SegmentList {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}
