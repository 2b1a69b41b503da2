//! Characterisation of approximately periodic event trains.
mod regularize;

pub use regularize::{ConditionedTimeline, GapFill};

use crate::{
    Real,
    error::{DataKind, InvalidSampleReason, TimingError, TimingResult},
    mode::{Tie, mode},
    onsets::OnsetSequence,
};
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use tracing::warn;

/// Events synthesized and dropped when a signal was derived from another.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct Provenance {
    pub added_times: Vec<Real>,
    pub removed_times: Vec<Real>,
}

/// Expected-versus-observed statistics of an onset sequence.
///
/// Periods within `(0.5, 1.5]` of the estimated period count as one nominal
/// cycle, shorter ones as spurious. `None` marks a statistic that is undefined
/// because no period fell in the nominal band. Counts are signed as
/// `miss_count` goes negative when the data is inconsistent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Characteristics {
    pub start_time: Real,
    pub end_time: Real,
    /// Largest of the most frequent periods.
    pub estimated_period: Real,
    pub mean_period: Option<Real>,
    pub target_count: Option<i64>,
    pub hit_count: i64,
    pub miss_count: Option<i64>,
    pub false_count: i64,
}

impl Characteristics {
    /// `onsets` must be sorted.
    fn measure(onsets: &[Real]) -> TimingResult<Self> {
        let &[start_time, .., end_time] = onsets else {
            return Err(TimingError::insufficient(DataKind::Onsets, onsets.len()));
        };

        let periods: Vec<Real> = onsets
            .iter()
            .tuple_windows()
            .map(|(previous, next)| next - previous)
            .collect();

        let estimated_period = mode(periods.iter().copied(), Tie::Highest)
            .ok_or_else(|| TimingError::insufficient(DataKind::Onsets, onsets.len()))?;
        let period_min = 0.5 * estimated_period;
        let period_max = 1.5 * estimated_period;

        let nominal: Vec<Real> = periods
            .iter()
            .copied()
            .filter(|&period| period_min < period && period <= period_max)
            .collect();
        let mean_period =
            (!nominal.is_empty()).then(|| nominal.iter().sum::<Real>() / nominal.len() as Real);

        let false_count = periods.iter().filter(|&&period| period <= period_min).count() as i64;
        let hit_count = onsets.len() as i64 - false_count;

        let target_count = mean_period
            .map(|mean| ((end_time - start_time) / mean).round_ties_even() as i64 + 1);
        let miss_count = target_count.map(|target| target - hit_count);

        if mean_period.is_none() {
            warn!(
                num_onsets = onsets.len(),
                estimated_period, "No period in the nominal band, mean period and counts are undefined"
            );
        }

        Ok(Self {
            start_time,
            end_time,
            estimated_period,
            mean_period,
            target_count,
            hit_count,
            miss_count,
            false_count,
        })
    }
}

/// An onset sequence together with its characteristics, which are computed
/// once on construction. Operations which alter the onsets produce a new
/// instance.
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodicSignal {
    onset_times: OnsetSequence,
    provenance: Provenance,
    characteristics: Characteristics,
}

impl PeriodicSignal {
    pub fn new<T: Into<Vec<Real>>>(onsets: T) -> TimingResult<Self> {
        Self::with_provenance(onsets, Provenance::default())
    }

    /// Creates a signal derived from another, recording the events added and removed on the way.
    pub fn with_provenance<T: Into<Vec<Real>>>(
        onsets: T,
        provenance: Provenance,
    ) -> TimingResult<Self> {
        let mut onsets: Vec<Real> = onsets.into();
        if let Some(index) = onsets.iter().position(|onset| !onset.is_finite()) {
            return Err(TimingError::InvalidSample {
                index,
                reason: InvalidSampleReason::NonFiniteOnset,
            });
        }
        onsets.sort_unstable_by(Real::total_cmp);

        let characteristics = Characteristics::measure(&onsets)?;
        Ok(Self {
            onset_times: onsets.into(),
            provenance,
            characteristics,
        })
    }

    pub fn onset_times(&self) -> &OnsetSequence {
        &self.onset_times
    }

    pub fn added_times(&self) -> &[Real] {
        &self.provenance.added_times
    }

    pub fn removed_times(&self) -> &[Real] {
        &self.provenance.removed_times
    }

    pub fn characteristics(&self) -> &Characteristics {
        &self.characteristics
    }

    pub fn estimated_period(&self) -> Real {
        self.characteristics.estimated_period
    }

    pub fn mean_period(&self) -> Option<Real> {
        self.characteristics.mean_period
    }

    pub fn start_time(&self) -> Real {
        self.characteristics.start_time
    }

    pub fn end_time(&self) -> Real {
        self.characteristics.end_time
    }

    pub fn target_count(&self) -> Option<i64> {
        self.characteristics.target_count
    }

    pub fn hit_count(&self) -> i64 {
        self.characteristics.hit_count
    }

    pub fn miss_count(&self) -> Option<i64> {
        self.characteristics.miss_count
    }

    pub fn false_count(&self) -> i64 {
        self.characteristics.false_count
    }
}

struct Undefined<T>(Option<T>);

impl<T: Display> Display for Undefined<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(value) => value.fmt(f),
            None => f.pad("-"),
        }
    }
}

impl Display for PeriodicSignal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let c = &self.characteristics;
        writeln!(f, "    start:       {:14.9}", c.start_time)?;
        writeln!(f, "    end:         {:14.9}", c.end_time)?;
        writeln!(f, "    est. period: {:14.9}", c.estimated_period)?;
        writeln!(f, "    mean period: {:>14.9}", Undefined(c.mean_period))?;
        writeln!(f, "    target:      {:>4}", Undefined(c.target_count))?;
        writeln!(f, "    hits:        {:>4}", c.hit_count)?;
        writeln!(f, "    misses:      {:>4}", Undefined(c.miss_count))?;
        write!(f, "    false:       {:>4}", c.false_count)
    }
}
