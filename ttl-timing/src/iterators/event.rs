use crate::{Real, detectors::Detector};

#[derive(Clone)]
pub(crate) struct EventIter<I, D>
where
    I: Iterator<Item = (Real, Real)>,
    D: Detector,
{
    source: I,
    detector: D,
}

impl<I, D> Iterator for EventIter<I, D>
where
    I: Iterator<Item = (Real, Real)>,
    D: Detector,
{
    type Item = D::EventPointType;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (time, value) = self.source.next()?;
            if let Some(event) = self.detector.signal(time, value) {
                return Some(event);
            }
        }
    }
}

pub(crate) trait EventFilter<I, D>
where
    I: Iterator<Item = (Real, Real)>,
    D: Detector,
{
    fn events(self, detector: D) -> EventIter<I, D>;
}

impl<I, D> EventFilter<I, D> for I
where
    I: Iterator<Item = (Real, Real)>,
    D: Detector,
{
    fn events(self, detector: D) -> EventIter<I, D> {
        EventIter {
            source: self,
            detector,
        }
    }
}
