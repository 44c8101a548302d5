//! GPS time primitive
//!
//! All segment and trigger timestamps in Vetra are GPS seconds: a
//! monotonic, real-valued timestamp convention with no leap-second
//! discontinuities. The engine never converts to calendar time.

use std::fmt;
use std::ops::{Add, Sub};

/// A GPS timestamp in seconds.
#[derive(Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct GpsTime(pub f64);

impl GpsTime {
    pub const ZERO: GpsTime = GpsTime(0.0);

    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        GpsTime(secs)
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0
    }

    /// The earlier of two timestamps.
    #[inline]
    pub fn min(self, other: GpsTime) -> GpsTime {
        if other.0 < self.0 {
            other
        } else {
            self
        }
    }

    /// The later of two timestamps.
    #[inline]
    pub fn max(self, other: GpsTime) -> GpsTime {
        if other.0 > self.0 {
            other
        } else {
            self
        }
    }
}

impl From<f64> for GpsTime {
    #[inline]
    fn from(secs: f64) -> Self {
        GpsTime(secs)
    }
}

impl Add<f64> for GpsTime {
    type Output = GpsTime;

    #[inline]
    fn add(self, rhs: f64) -> Self::Output {
        GpsTime(self.0 + rhs)
    }
}

impl Sub<f64> for GpsTime {
    type Output = GpsTime;

    #[inline]
    fn sub(self, rhs: f64) -> Self::Output {
        GpsTime(self.0 - rhs)
    }
}

impl Sub<GpsTime> for GpsTime {
    type Output = f64;

    #[inline]
    fn sub(self, rhs: GpsTime) -> Self::Output {
        self.0 - rhs.0
    }
}

impl fmt::Debug for GpsTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gps({})", self.0)
    }
}

impl fmt::Display for GpsTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
