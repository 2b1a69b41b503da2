//! Edge detection for two-level (TTL-like) analogue traces.
//!
//! The low level is the lowest mode of the voltage distribution and the high
//! level the highest mode of the samples lying more than `separation` volts
//! above it. The threshold sits `threshold_fraction` of the way from low to
//! high, which by default (two thirds) is biased towards the high level.
use crate::{
    Edge, Real, Sample,
    detectors::LevelCrossingDetector,
    error::{DataKind, InvalidSampleReason, TimingError, TimingResult},
    iterators::EventFilter,
    mode::{Tie, mode},
    onsets::OnsetSequence,
};
use itertools::Itertools;
use tracing::{debug, instrument};

/// Constants governing level estimation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelSettings {
    /// Minimum distance (volts) above the low level for a sample to count towards the high level.
    pub separation: Real,
    /// Position of the threshold between the low (0) and high (1) levels.
    pub threshold_fraction: Real,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            separation: 1.0,
            threshold_fraction: 2.0 / 3.0,
        }
    }
}

/// The logic levels estimated for one trace and the threshold derived from them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Levels {
    pub low: Real,
    pub high: Real,
    pub threshold: Real,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edges {
    pub rising: OnsetSequence,
    pub falling: OnsetSequence,
    pub levels: Levels,
}

impl Edges {
    pub fn threshold(&self) -> Real {
        self.levels.threshold
    }

    pub fn onsets(&self, edge: Edge) -> &OnsetSequence {
        match edge {
            Edge::Rising => &self.rising,
            Edge::Falling => &self.falling,
        }
    }
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct EdgeDetector {
    settings: LevelSettings,
}

impl EdgeDetector {
    pub fn new(settings: LevelSettings) -> TimingResult<Self> {
        if !(settings.separation.is_finite() && settings.separation >= 0.0) {
            return Err(TimingError::InvalidParameter {
                name: "separation",
                value: settings.separation,
                constraint: "must be finite and non-negative",
            });
        }
        if !(settings.threshold_fraction > 0.0 && settings.threshold_fraction < 1.0) {
            return Err(TimingError::InvalidParameter {
                name: "threshold_fraction",
                value: settings.threshold_fraction,
                constraint: "must lie strictly between 0 and 1",
            });
        }
        Ok(Self { settings })
    }

    /// Finds the rising and falling edge onsets of `samples`.
    #[instrument(skip_all, fields(num_samples = samples.len(), num_rising, num_falling))]
    pub fn detect(&self, samples: &[Sample]) -> TimingResult<Edges> {
        if samples.len() < 2 {
            return Err(TimingError::insufficient(DataKind::Samples, samples.len()));
        }
        validate(samples)?;

        let levels = self.estimate_levels(samples)?;
        debug!(low = levels.low, high = levels.high, threshold = levels.threshold);

        let (rising, falling): (Vec<Real>, Vec<Real>) = samples
            .iter()
            .map(|sample| (sample.time, sample.voltage))
            .events(LevelCrossingDetector::new(levels.threshold))
            .partition_map(|(onset, edge)| match edge {
                Edge::Rising => itertools::Either::Left(onset),
                Edge::Falling => itertools::Either::Right(onset),
            });

        let span = tracing::Span::current();
        span.record("num_rising", rising.len());
        span.record("num_falling", falling.len());

        Ok(Edges {
            rising: rising.into(),
            falling: falling.into(),
            levels,
        })
    }

    /// Estimates the low and high logic levels of `samples`, which must be finite.
    pub fn estimate_levels(&self, samples: &[Sample]) -> TimingResult<Levels> {
        let low = mode(samples.iter().map(|sample| sample.voltage), Tie::Lowest)
            .ok_or_else(|| TimingError::insufficient(DataKind::Samples, samples.len()))?;

        let floor = low + self.settings.separation;
        let high = mode(
            samples
                .iter()
                .map(|sample| sample.voltage)
                .filter(|&voltage| voltage > floor),
            Tie::Highest,
        )
        .ok_or(TimingError::InsufficientSeparation {
            low,
            separation: self.settings.separation,
        })?;

        Ok(Levels {
            low,
            high,
            threshold: low + (high - low) * self.settings.threshold_fraction,
        })
    }
}

fn validate(samples: &[Sample]) -> TimingResult<()> {
    let mut previous_time = Real::NEG_INFINITY;
    for (index, sample) in samples.iter().enumerate() {
        let reason = if !sample.time.is_finite() {
            Some(InvalidSampleReason::NonFiniteTime)
        } else if !sample.voltage.is_finite() {
            Some(InvalidSampleReason::NonFiniteVoltage)
        } else if sample.time < previous_time {
            Some(InvalidSampleReason::DecreasingTime)
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(TimingError::InvalidSample { index, reason });
        }
        previous_time = sample.time;
    }
    Ok(())
}
