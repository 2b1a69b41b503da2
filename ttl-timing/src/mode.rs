//! Statistical mode of a set of real values with an explicit tie-break.
//!
//! A frequency table is built over exact value equality and the extremal
//! value of the maximum-frequency bucket is chosen, so the result never
//! depends on the order in which values were supplied.
use crate::Real;
use itertools::Itertools;

/// Which candidate to select when several values share the highest frequency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tie {
    Lowest,
    Highest,
}

/// Returns every value with the maximal frequency, in ascending order.
/// NaN values are ignored, `-0.0` and `0.0` count as the same value.
pub fn modes<I: IntoIterator<Item = Real>>(values: I) -> Vec<Real> {
    let mut sorted: Vec<Real> = values
        .into_iter()
        .filter(|value| !value.is_nan())
        .map(|value| value + 0.0)
        .collect();
    sorted.sort_unstable_by(Real::total_cmp);

    let frequencies: Vec<(usize, Real)> = sorted.into_iter().dedup_with_count().collect();
    let max_count = frequencies
        .iter()
        .map(|(count, _)| *count)
        .max()
        .unwrap_or_default();

    frequencies
        .into_iter()
        .filter(|(count, _)| *count == max_count)
        .map(|(_, value)| value)
        .collect()
}

/// The mode of `values`, or `None` if there are no (non-NaN) values.
pub fn mode<I: IntoIterator<Item = Real>>(values: I, tie: Tie) -> Option<Real> {
    let candidates = modes(values);
    match tie {
        Tie::Lowest => candidates.first().copied(),
        Tie::Highest => candidates.last().copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty() {
        assert!(modes(Vec::<Real>::new()).is_empty());
        assert_eq!(mode(Vec::<Real>::new(), Tie::Lowest), None);
    }

    #[test]
    fn single_mode() {
        let data = [1.0, 2.0, 2.0, 3.0, 2.0, 1.0];
        assert_eq!(modes(data), vec![2.0]);
        assert_eq!(mode(data, Tie::Lowest), Some(2.0));
        assert_eq!(mode(data, Tie::Highest), Some(2.0));
    }

    #[test]
    fn bimodal_tie_break() {
        let data = [5.0, 0.0, 5.0, 0.0, 2.5];
        assert_eq!(modes(data), vec![0.0, 5.0]);
        assert_eq!(mode(data, Tie::Lowest), Some(0.0));
        assert_eq!(mode(data, Tie::Highest), Some(5.0));
    }

    #[test]
    fn all_unique_values_are_modes() {
        let data = [0.3, 0.1, 0.2];
        assert_eq!(modes(data), vec![0.1, 0.2, 0.3]);
        assert_eq!(mode(data, Tie::Highest), Some(0.3));
    }

    #[test]
    fn order_independent() {
        let forward = [1.0, 4.0, 4.0, 1.0, 3.0];
        let mut reverse = forward;
        reverse.reverse();
        assert_eq!(modes(forward), modes(reverse));
    }

    #[test]
    fn signed_zero_and_nan() {
        let data = [-0.0, 0.0, Real::NAN, Real::NAN, Real::NAN, 1.0];
        assert_eq!(modes(data), vec![0.0]);
    }
}
