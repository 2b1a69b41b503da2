pub(crate) mod level_crossing_detector;

use crate::Real;

pub(crate) use level_crossing_detector::LevelCrossingDetector;

/// A streaming detector, fed one (time, value) point at a time.
pub(crate) trait Detector: Clone {
    type EventPointType;

    fn signal(&mut self, time: Real, value: Real) -> Option<Self::EventPointType>;
}
