use crate::Real;
use thiserror::Error;

pub type TimingResult<T> = Result<T, TimingError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum DataKind {
    #[strum(to_string = "samples")]
    Samples,
    #[strum(to_string = "onsets")]
    Onsets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum InvalidSampleReason {
    #[strum(to_string = "non-finite time")]
    NonFiniteTime,
    #[strum(to_string = "non-finite voltage")]
    NonFiniteVoltage,
    #[strum(to_string = "time earlier than the previous sample")]
    DecreasingTime,
    #[strum(to_string = "non-finite onset time")]
    NonFiniteOnset,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimingError {
    #[error("Invalid sample at index {index}: {reason}")]
    InvalidSample {
        index: usize,
        reason: InvalidSampleReason,
    },
    #[error("Insufficient data: at least {required} {kind} required, {actual} given")]
    InsufficientData {
        kind: DataKind,
        required: usize,
        actual: usize,
    },
    #[error("No sample exceeds the low level {low} by more than {separation}, not a two-level signal")]
    InsufficientSeparation { low: Real, separation: Real },
    #[error("Invalid parameter {name} = {value}: {constraint}")]
    InvalidParameter {
        name: &'static str,
        value: Real,
        constraint: &'static str,
    },
}

impl TimingError {
    pub(crate) fn insufficient(kind: DataKind, actual: usize) -> Self {
        Self::InsufficientData {
            kind,
            required: 2,
            actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let error = TimingError::insufficient(DataKind::Onsets, 1);
        assert_eq!(
            error.to_string(),
            "Insufficient data: at least 2 onsets required, 1 given"
        );

        let error = TimingError::InvalidSample {
            index: 7,
            reason: InvalidSampleReason::NonFiniteVoltage,
        };
        assert_eq!(
            error.to_string(),
            "Invalid sample at index 7: non-finite voltage"
        );
    }
}
