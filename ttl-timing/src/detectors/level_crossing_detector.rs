use super::Detector;
use crate::{Edge, Real};

pub(crate) type CrossingEvent = (Real, Edge);

/// Binarises each value against a fixed threshold (`value > threshold` is high)
/// and emits an edge whenever the logic level differs from the previous point's.
/// The onset is placed halfway between the bracketing points, so it carries
/// up to half a sample period of jitter.
#[derive(Default, Clone)]
pub(crate) struct LevelCrossingDetector {
    threshold: Real,
    previous: Option<(Real, bool)>,
}

impl LevelCrossingDetector {
    pub(crate) fn new(threshold: Real) -> Self {
        Self {
            threshold,
            previous: None,
        }
    }
}

impl Detector for LevelCrossingDetector {
    type EventPointType = CrossingEvent;

    fn signal(&mut self, time: Real, value: Real) -> Option<CrossingEvent> {
        let high = value > self.threshold;
        let event = self
            .previous
            .filter(|&(_, was_high)| was_high != high)
            .map(|(previous_time, _)| {
                let onset = time - (time - previous_time) / 2.0;
                (onset, if high { Edge::Rising } else { Edge::Falling })
            });
        self.previous = Some((time, high));
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iterators::EventFilter;

    #[test]
    fn zero_data() {
        let data: [Real; 0] = [];
        let mut iter = data
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i as Real, v))
            .events(LevelCrossingDetector::new(2.0));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn first_point_never_triggers() {
        let data = [5.0, 5.0, 0.0];
        let mut iter = data
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i as Real, v))
            .events(LevelCrossingDetector::new(2.0));
        assert_eq!(iter.next(), Some((1.5, Edge::Falling)));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_crossings() {
        let data = [0, 1, 3, 4, 2, 1, 3, 3, 0];
        let mut iter = data
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i as Real, v as Real))
            .events(LevelCrossingDetector::new(2.0));
        assert_eq!(iter.next(), Some((1.5, Edge::Rising)));
        assert_eq!(iter.next(), Some((3.5, Edge::Falling)));
        assert_eq!(iter.next(), Some((5.5, Edge::Rising)));
        assert_eq!(iter.next(), Some((7.5, Edge::Falling)));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn value_equal_to_threshold_is_low() {
        let data = [1.0, 2.0, 2.5, 2.0];
        let events: Vec<_> = data
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i as Real, v))
            .events(LevelCrossingDetector::new(2.0))
            .collect();
        assert_eq!(events, vec![(1.5, Edge::Rising), (2.5, Edge::Falling)]);
    }

    #[test]
    fn uneven_sampling() {
        let data = [(0.0, 0.0), (1.0, 0.0), (3.0, 5.0), (3.5, 0.0)];
        let events: Vec<_> = data
            .into_iter()
            .events(LevelCrossingDetector::new(2.0))
            .collect();
        assert_eq!(events, vec![(2.0, Edge::Rising), (3.25, Edge::Falling)]);
    }
}
