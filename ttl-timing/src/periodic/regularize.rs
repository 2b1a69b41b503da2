//! Timeline conditioning: a single ordered pass which drops onsets arriving
//! implausibly early and synthesizes the onsets missing from long gaps.
use super::{PeriodicSignal, Provenance};
use crate::{
    Real,
    error::{TimingError, TimingResult},
};
use tracing::{debug, instrument};

/// Diagnostic record of one gap in which events were synthesized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GapFill {
    /// The last accepted onset before the gap.
    pub anchor: Real,
    /// The onset which closed the gap.
    pub onset: Real,
    pub gap: Real,
    /// `gap / target_period`, rounded half to even.
    pub estimated_count: i64,
    /// `gap / estimated_count`. Synthesized events are spaced by the target
    /// period rather than by this value.
    pub sub_period: Real,
    pub synthesized: usize,
}

/// The outcome of conditioning an onset sequence.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct ConditionedTimeline {
    pub times: Vec<Real>,
    pub added: Vec<Real>,
    pub removed: Vec<Real>,
    pub gap_fills: Vec<GapFill>,
}

impl ConditionedTimeline {
    /// Fails if fewer than two onsets survived conditioning.
    pub fn into_signal(self) -> TimingResult<PeriodicSignal> {
        PeriodicSignal::with_provenance(
            self.times,
            Provenance {
                added_times: self.added,
                removed_times: self.removed,
            },
        )
    }
}

/// Bounds on the gap between consecutive accepted onsets.
#[derive(Clone, Copy, Debug)]
struct PeriodBand {
    target_period: Real,
    /// Gaps at or below this are spurious.
    lower: Real,
    /// Gaps above this contain missing events.
    upper: Real,
}

impl PeriodBand {
    fn new(target_period: Real, tolerance: Real) -> TimingResult<Self> {
        if !(target_period.is_finite() && target_period > 0.0) {
            return Err(TimingError::InvalidParameter {
                name: "target_period",
                value: target_period,
                constraint: "must be finite and positive",
            });
        }
        if !(0.0..1.0).contains(&tolerance) {
            return Err(TimingError::InvalidParameter {
                name: "tolerance",
                value: tolerance,
                constraint: "must lie in [0, 1)",
            });
        }
        Ok(Self {
            target_period,
            lower: (1.0 - tolerance) * target_period,
            upper: (1.0 + tolerance) * target_period,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Conditioning {
    DropAndSynthesize,
    DropOnly,
}

struct TimelineConditioner {
    band: PeriodBand,
    conditioning: Conditioning,
    last_accepted: Option<Real>,
    timeline: ConditionedTimeline,
}

impl TimelineConditioner {
    fn new(band: PeriodBand, conditioning: Conditioning, capacity: usize) -> Self {
        Self {
            band,
            conditioning,
            last_accepted: None,
            timeline: ConditionedTimeline {
                times: Vec::with_capacity(capacity),
                ..Default::default()
            },
        }
    }

    fn push(&mut self, onset: Real) {
        let Some(anchor) = self.last_accepted else {
            self.accept(onset);
            return;
        };

        let gap = onset - anchor;
        if gap <= self.band.lower {
            // The anchor is kept, so the next onset is measured from it too
            self.timeline.removed.push(onset);
            return;
        }
        if gap > self.band.upper && self.conditioning == Conditioning::DropAndSynthesize {
            self.fill_gap(anchor, onset, gap);
        }
        self.accept(onset);
    }

    fn fill_gap(&mut self, anchor: Real, onset: Real, gap: Real) {
        let target_period = self.band.target_period;
        let estimated_count = (gap / target_period).round_ties_even() as i64;

        let mut synthesized = 0;
        let mut gap_remaining = gap;
        let mut previous = anchor;
        while gap_remaining > self.band.upper {
            let next = previous + target_period;
            if next >= onset {
                break;
            }
            self.timeline.times.push(next);
            self.timeline.added.push(next);
            gap_remaining -= target_period;
            previous = next;
            synthesized += 1;
        }

        self.timeline.gap_fills.push(GapFill {
            anchor,
            onset,
            gap,
            estimated_count,
            sub_period: gap / estimated_count as Real,
            synthesized,
        });
    }

    fn accept(&mut self, onset: Real) {
        self.timeline.times.push(onset);
        self.last_accepted = Some(onset);
    }

    fn finish(self) -> ConditionedTimeline {
        self.timeline
    }
}

impl PeriodicSignal {
    fn condition(
        &self,
        target_period: Real,
        tolerance: Real,
        conditioning: Conditioning,
    ) -> TimingResult<ConditionedTimeline> {
        let band = PeriodBand::new(target_period, tolerance)?;
        let mut conditioner = TimelineConditioner::new(band, conditioning, self.onset_times.len());
        for &onset in &self.onset_times {
            conditioner.push(onset);
        }
        Ok(conditioner.finish())
    }

    /// Walks the onsets once, dropping any arriving within
    /// `(1 - tolerance) * target_period` of the last accepted onset, and
    /// synthesizing events at multiples of `target_period` across gaps longer
    /// than `(1 + tolerance) * target_period`.
    pub fn condition_timeline(
        &self,
        target_period: Real,
        tolerance: Real,
    ) -> TimingResult<ConditionedTimeline> {
        self.condition(target_period, tolerance, Conditioning::DropAndSynthesize)
    }

    /// Returns a new signal with spurious onsets dropped and missing onsets
    /// synthesized. The returned signal records what was added and removed.
    #[instrument(skip(self), fields(num_onsets = self.onset_times.len()))]
    pub fn regularize(&self, target_period: Real, tolerance: Real) -> TimingResult<Self> {
        let timeline = self.condition_timeline(target_period, tolerance)?;
        debug!(
            added = timeline.added.len(),
            removed = timeline.removed.len(),
            gaps = timeline.gap_fills.len(),
            "Regularized"
        );
        timeline.into_signal()
    }

    /// Returns a new signal with spurious onsets dropped, and no synthesis.
    #[instrument(skip(self), fields(num_onsets = self.onset_times.len()))]
    pub fn remove_extra_events(&self, target_period: Real, tolerance: Real) -> TimingResult<Self> {
        let timeline = self.condition(target_period, tolerance, Conditioning::DropOnly)?;
        debug!(removed = timeline.removed.len(), "Removed extra events");
        timeline.into_signal()
    }
}
