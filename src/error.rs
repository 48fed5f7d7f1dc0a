use crate::SweepParameter;
use thiserror::Error;

/// Rejected input: a parameter value or sweep request outside its domain
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{name} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },

    #[error("{name} must be non-negative, got {value}")]
    NegativePenalty { name: &'static str, value: f64 },

    #[error("reduced penalty c={c} must not exceed branch penalty b={b}")]
    PenaltyNotReduced { c: f64, b: f64 },

    #[error("base CPI must be positive, got {value}")]
    NonPositiveBaseCpi { value: f64 },

    #[error("CPI must be positive to compute throughput, got {value}")]
    NonPositiveCpi { value: f64 },

    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("a sweep needs at least 2 samples, got {count}")]
    TooFewSamples { count: usize },

    #[error("a sweep allows at most {} samples, got {count}", crate::MAX_SAMPLES)]
    TooManySamples { count: usize },

    #[error("sweep range [{start}, {end}] is degenerate")]
    DegenerateRange { start: f64, end: f64 },

    #[error("sweep resolution must be positive, got {resolution}")]
    NonPositiveResolution { resolution: f64 },

    #[error("{parameter} does not apply to a model without branch prediction")]
    NotApplicable { parameter: SweepParameter },

    #[error("{parameter} is already swept and cannot also be a series axis")]
    DuplicateAxis { parameter: SweepParameter },

    #[error("at {parameter}={value}: {source}")]
    InvalidPoint {
        parameter: SweepParameter,
        value: f64,
        source: Box<ValidationError>,
    },
}

impl ValidationError {
    pub(crate) fn at(self, parameter: SweepParameter, value: f64) -> Self {
        ValidationError::InvalidPoint {
            parameter,
            value,
            source: Box::new(self),
        }
    }
}
