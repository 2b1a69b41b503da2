use crate::Real;
use itertools::Itertools;

/// Ordered event times for one edge polarity.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct OnsetSequence(Vec<Real>);

impl OnsetSequence {
    pub fn as_slice(&self) -> &[Real] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Real> {
        self.0.iter()
    }

    /// Successive differences `onset[k] - onset[k-1]`, one fewer than there are onsets.
    /// Diagnostic only.
    pub fn intervals(&self) -> impl Iterator<Item = Real> + '_ {
        self.0.iter().tuple_windows().map(|(previous, next)| next - previous)
    }
}

impl From<Vec<Real>> for OnsetSequence {
    fn from(onsets: Vec<Real>) -> Self {
        Self(onsets)
    }
}

impl From<OnsetSequence> for Vec<Real> {
    fn from(onsets: OnsetSequence) -> Self {
        onsets.0
    }
}

impl FromIterator<Real> for OnsetSequence {
    fn from_iter<T: IntoIterator<Item = Real>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a OnsetSequence {
    type Item = &'a Real;
    type IntoIter = std::slice::Iter<'a, Real>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
