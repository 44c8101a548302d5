//! Error types for metric evaluation

use thiserror::Error;

use vetra_segments::SegmentError;

/// Errors raised while resolving or computing metrics
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    // Input errors
    #[error(transparent)]
    InvalidSegment(#[from] SegmentError),

    // Resolution errors
    #[error("no metric registered with name {0:?}")]
    UnknownMetric(String),

    // Evaluation errors
    #[error("metric {metric:?} requires a trigger table")]
    MissingTriggers { metric: String },

    #[error("metric {metric:?} has a zero denominator")]
    DivisionByZero { metric: String },
}

/// Result type for metric operations
pub type MetricResult<T> = Result<T, MetricError>;
