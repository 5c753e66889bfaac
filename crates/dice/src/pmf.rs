use ndarray::{s, Array1};

use crate::error::BuildError;
use crate::outcomes::OutcomeRange;

//##########################################################
// Struct
//##########################################################

/// Probability mass function over a contiguous range of integer
/// outcomes. `values[i]` is P[X = outcomes.value_of(i)].
#[derive(Debug, Clone, PartialEq)]
pub struct Pmf {
    pub values: Array1<f64>,
    pub outcomes: OutcomeRange,
}

//##########################################################
// Impls
//##########################################################

impl Pmf {
    /// Normalize non-negative weights into a pmf whose first outcome
    /// is `first`.
    pub fn from_weights(
        first: u32,
        weights: impl IntoIterator<Item = f64>,
    ) -> Result<Self, BuildError> {
        let mut values: Array1<f64> = Array1::from_iter(weights);
        if values.is_empty() {
            return Err(BuildError::Empty);
        }

        let has_negative = values.iter().any(|x| *x < 0.0);
        if has_negative {
            return Err(BuildError::NegativeValue);
        }

        let sum: f64 = values.sum();
        if sum == 0.0 {
            return Err(BuildError::ZeroSum);
        }

        values.mapv_inplace(|x| x / sum);
        let outcomes = OutcomeRange::new(first, values.len());

        Ok(Self { values, outcomes })
    }

    /// Number of outcomes.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn outcomes(&self) -> OutcomeRange {
        self.outcomes
    }

    /// Get P[X = x] if `x` is a possible outcome; otherwise None.
    pub fn prob(&self, x: u32) -> Option<f64> {
        self.outcomes
            .index_of(x)
            .and_then(|i| self.values.get(i))
            .copied()
    }

    /// Enumerate all probabilities in outcome order.
    pub fn values(&self) -> impl Iterator<Item = &f64> + '_ {
        self.values.iter()
    }

    /// Enumerate all (outcome, probability) pairs.
    pub fn enumerate(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.outcomes.iter().zip(self.values.iter().copied())
    }

    /// Total mass. Exactly what is left after trimming.
    pub fn total(&self) -> f64 {
        self.values.sum()
    }

    /// Largest probability, 0 for an empty pmf.
    pub fn max(&self) -> f64 {
        self.values
            .iter()
            .fold(0.0, |acc, &x| if x > acc { x } else { acc })
    }

    /// Position of the largest probability. Ties go to the leftmost.
    pub fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &p) in self.values.iter().enumerate() {
            match best {
                Some((_, b)) if p <= b => {}
                _ => best = Some((i, p)),
            }
        }
        best.map(|(i, _)| i)
    }

    pub fn mean(&self) -> f64 {
        self.enumerate().map(|(x, p)| x as f64 * p).sum()
    }

    pub fn variance(&self) -> f64 {
        let mean = self.mean();
        self.enumerate()
            .map(|(x, p)| p * (x as f64 - mean).powi(2))
            .sum()
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Distribution of `X + Y` for independent `X ~ self`, `Y ~ rhs`:
    /// `r[k] = Σ_j a[j] · b[k − j]`.
    pub fn convolve(&self, rhs: &Pmf) -> Pmf {
        if self.is_empty() || rhs.is_empty() {
            return Pmf {
                values: Array1::zeros(0),
                outcomes: OutcomeRange::new(
                    self.outcomes.first() + rhs.outcomes.first(),
                    0,
                ),
            };
        }

        let size = self.len() + rhs.len() - 1;
        let mut values = Array1::zeros(size);
        for (i, a) in self.values.iter().enumerate() {
            for (j, b) in rhs.values.iter().enumerate() {
                values[i + j] += a * b;
            }
        }

        let first = self.outcomes.first() + rhs.outcomes.first();
        Pmf {
            values,
            outcomes: OutcomeRange::new(first, size),
        }
    }

    /// Keep positions `lo..=hi`, cutting outcomes and probabilities
    /// in lockstep.
    pub fn window(&self, lo: usize, hi: usize) -> Pmf {
        let outcomes = self.outcomes.window(lo, hi);
        if outcomes.is_empty() {
            return Pmf {
                values: Array1::zeros(0),
                outcomes,
            };
        }
        let values = self.values.slice(s![lo..lo + outcomes.len()]).to_owned();
        Pmf { values, outcomes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_weights_normalizes() {
        let pmf = Pmf::from_weights(1, vec![1.0, 1.0, 2.0]).unwrap();
        assert_eq!(pmf.len(), 3);
        assert!((pmf.total() - 1.0).abs() < 1e-12);
        assert_eq!(pmf.prob(3), Some(0.5));
        assert_eq!(pmf.prob(4), None);
    }

    #[test]
    fn test_from_weights_rejects_bad_input() {
        assert_eq!(
            Pmf::from_weights(1, Vec::<f64>::new()),
            Err(BuildError::Empty)
        );
        assert_eq!(
            Pmf::from_weights(1, vec![0.0, 0.0]),
            Err(BuildError::ZeroSum)
        );
        assert_eq!(
            Pmf::from_weights(1, vec![0.5, -0.5, 1.0]),
            Err(BuildError::NegativeValue)
        );
    }

    #[test]
    fn test_convolve_two_coins() {
        // Outcomes 0/1 with equal weight: the sum is 0, 1, 2 w.p. 1/4, 1/2, 1/4.
        let coin = Pmf::from_weights(0, vec![1.0, 1.0]).unwrap();
        let sum = coin.convolve(&coin);

        assert_eq!(sum.outcomes(), OutcomeRange::new(0, 3));
        let expected = [0.25, 0.5, 0.25];
        for (got, want) in sum.values().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-12);
        }
        assert!((sum.mean() - 1.0).abs() < 1e-12);
        assert!((sum.variance() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_window_cuts_in_lockstep() {
        let pmf =
            Pmf::from_weights(4, vec![1.0, 2.0, 3.0, 2.0, 1.0]).unwrap();
        let window = pmf.window(1, 3);
        assert_eq!(window.len(), 3);
        assert_eq!(window.outcomes().first(), 5);
        assert_eq!(window.prob(6), pmf.prob(6));
        assert!(window.total() < 1.0);
        assert_eq!(pmf.argmax(), Some(2));
    }
}
