//! Half-open GPS time segments

use thiserror::Error;

use crate::GpsTime;

/// Errors raised while constructing segments
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SegmentError {
    #[error("invalid segment: start {start} is not before end {end}")]
    InvalidSegment { start: f64, end: f64 },
}

/// Result type for segment operations
pub type SegmentResult<T> = Result<T, SegmentError>;

/// A half-open GPS time interval `[start, end)`.
///
/// The `start < end` invariant is enforced at construction; every
/// `Segment` in circulation has strictly positive duration.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Segment {
    start: GpsTime,
    end: GpsTime,
}

impl Segment {
    /// Create a segment, validating `start < end`.
    ///
    /// A non-finite bound fails the comparison and is rejected too.
    pub fn new(start: impl Into<GpsTime>, end: impl Into<GpsTime>) -> SegmentResult<Self> {
        let (start, end) = (start.into(), end.into());
        if !(start < end) {
            return Err(SegmentError::InvalidSegment {
                start: start.as_secs_f64(),
                end: end.as_secs_f64(),
            });
        }
        Ok(Segment { start, end })
    }

    /// Construct without validation. Callers must guarantee `start < end`.
    #[inline]
    pub(crate) fn new_unchecked(start: GpsTime, end: GpsTime) -> Self {
        debug_assert!(start < end);
        Segment { start, end }
    }

    #[inline]
    pub fn start(&self) -> GpsTime {
        self.start
    }

    #[inline]
    pub fn end(&self) -> GpsTime {
        self.end
    }

    /// Length of the segment in seconds.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Half-open membership: `start` is inside, `end` is outside.
    #[inline]
    pub fn contains(&self, t: GpsTime) -> bool {
        self.start <= t && t < self.end
    }

    /// Whether two segments share any time (touching does not count).
    #[inline]
    pub fn overlaps(&self, other: &Segment) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Intersection with another segment, if non-empty.
    pub fn clip(&self, other: &Segment) -> Option<Segment> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            Some(Segment { start, end })
        } else {
            None
        }
    }
}

impl TryFrom<(f64, f64)> for Segment {
    type Error = SegmentError;

    fn try_from(pair: (f64, f64)) -> SegmentResult<Self> {
        Segment::new(pair.0, pair.1)
    }
}
