use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BuildError, DiceError, DiceResult};
use crate::pmf::Pmf;

/// Every distribution sums to this many percentage points.
pub const TOTAL: u32 = 100;

// ------------------------------------------------------------------
// Face
// ------------------------------------------------------------------

/// One of the six faces of a die, numbered 1 to 6.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Face(u8);

impl Face {
    pub const ALL: [Face; 6] =
        [Face(1), Face(2), Face(3), Face(4), Face(5), Face(6)];

    pub fn new(number: u8) -> DiceResult<Self> {
        if (1..=6).contains(&number) {
            Ok(Self(number))
        } else {
            Err(DiceError::InvalidFace(number))
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Zero-based position in a six-value array.
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// The face after this one, wrapping from 6 back to 1.
    pub fn next(self) -> Face {
        Face(self.0 % 6 + 1)
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Face {
    type Error = DiceError;
    fn try_from(number: u8) -> DiceResult<Self> {
        Face::new(number)
    }
}

impl From<Face> for u8 {
    fn from(face: Face) -> u8 {
        face.0
    }
}

// ------------------------------------------------------------------
// Distribution
// ------------------------------------------------------------------

/// Integer percentage weights of the six faces, summing to 100.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "[u32; 6]", into = "[u32; 6]")]
pub struct Distribution([u32; 6]);

impl Distribution {
    pub fn new(values: [u32; 6]) -> DiceResult<Self> {
        let sum: u32 = values.iter().sum();
        if sum != TOTAL {
            return Err(DiceError::InvalidDistribution(sum));
        }
        Ok(Self(values))
    }

    /// For tables known to sum to 100.
    pub(crate) const fn new_unchecked(values: [u32; 6]) -> Self {
        Self(values)
    }

    pub fn get(&self, face: Face) -> u32 {
        self.0[face.index()]
    }

    pub fn values(&self) -> [u32; 6] {
        self.0
    }

    /// Unit form: each weight divided by 100.
    pub fn unit(&self) -> [f64; 6] {
        self.0.map(|v| v as f64 / TOTAL as f64)
    }

    /// Single-die pmf over outcomes 1..=6.
    pub fn to_pmf(&self) -> Result<Pmf, BuildError> {
        Pmf::from_weights(1, self.0.iter().map(|&v| v as f64))
    }
}

impl Default for Distribution {
    fn default() -> Self {
        crate::presets::FAIR
    }
}

impl TryFrom<[u32; 6]> for Distribution {
    type Error = DiceError;
    fn try_from(values: [u32; 6]) -> DiceResult<Self> {
        Distribution::new(values)
    }
}

impl From<Distribution> for [u32; 6] {
    fn from(distribution: Distribution) -> [u32; 6] {
        distribution.0
    }
}

/// Mean and standard deviation of a pmf over outcomes `1..=len`.
///
/// Weights that sum to roughly 100 are read as percentages and
/// converted to unit form first. The mean is shifted by
/// `dice_offset − 1`, which places a single-die mean in the range of
/// an `n`-dice sum without convolving.
pub fn mean_and_deviation(weights: &[f64], dice_offset: u32) -> (f64, f64) {
    let sum: f64 = weights.iter().sum();
    let unit: Vec<f64> = if (sum - TOTAL as f64).abs() < 10.0 {
        let mut unit: Vec<f64> = weights.iter().map(|w| w / sum).collect();
        if let Some((last, rest)) = unit.split_last_mut() {
            *last = 1.0 - rest.iter().sum::<f64>();
        }
        unit
    } else {
        weights.to_vec()
    };

    let mean: f64 = unit
        .iter()
        .enumerate()
        .map(|(i, p)| (i + 1) as f64 * p)
        .sum();
    let variance: f64 = unit
        .iter()
        .enumerate()
        .map(|(i, p)| p * ((i + 1) as f64 - mean).powi(2))
        .sum();

    let shift = dice_offset.saturating_sub(1) as f64;
    (mean + shift, variance.sqrt())
}

// ------------------------------------------------------------------
// Locks
// ------------------------------------------------------------------

/// Which faces are pinned, and at what value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockSet {
    locked: [bool; 6],
    pinned: [u32; 6],
}

impl LockSet {
    pub fn is_locked(&self, face: Face) -> bool {
        self.locked[face.index()]
    }

    /// Pinned value of a locked face.
    pub fn pinned(&self, face: Face) -> Option<u32> {
        self.is_locked(face).then(|| self.pinned[face.index()])
    }

    pub fn locked_sum(&self) -> u32 {
        self.pinned.iter().sum()
    }

    pub fn all_locked(&self) -> bool {
        self.locked.iter().all(|&l| l)
    }

    pub fn unlocked(&self) -> impl Iterator<Item = Face> + '_ {
        Face::ALL.into_iter().filter(|f| !self.is_locked(*f))
    }

    fn lock(&mut self, face: Face, value: u32) {
        self.locked[face.index()] = true;
        self.pinned[face.index()] = value;
    }

    fn unlock(&mut self, face: Face) {
        self.locked[face.index()] = false;
        self.pinned[face.index()] = 0;
    }
}

// ------------------------------------------------------------------
// Model
// ------------------------------------------------------------------

/// The editable distribution plus its locks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistributionModel {
    distribution: Distribution,
    locks: LockSet,
}

impl DistributionModel {
    pub fn new(distribution: Distribution) -> Self {
        Self {
            distribution,
            locks: LockSet::default(),
        }
    }

    pub fn distribution(&self) -> Distribution {
        self.distribution
    }

    pub fn locks(&self) -> &LockSet {
        &self.locks
    }

    pub fn is_locked(&self, face: Face) -> bool {
        self.locks.is_locked(face)
    }

    /// Move one face to `value` (clamped to 0..=100) and rebalance the
    /// unlocked faces so the total stays at 100.
    pub fn set_face(
        &mut self,
        face: Face,
        value: u32,
    ) -> DiceResult<Distribution> {
        if let Some(pinned) = self.locks.pinned(face) {
            return Err(DiceError::FaceLocked { face, pinned });
        }

        let values = rebalance(
            self.distribution.values(),
            &self.locks,
            face,
            value.min(TOTAL),
        );
        self.distribution = Distribution::new(values)?;
        Ok(self.distribution)
    }

    /// Flip the lock on `face`, returning whether it is now locked.
    pub fn toggle_lock(&mut self, face: Face) -> bool {
        if self.locks.is_locked(face) {
            self.locks.unlock(face);
            false
        } else {
            self.locks.lock(face, self.distribution.get(face));
            true
        }
    }

    /// Replace the whole distribution and drop every lock.
    pub fn apply_preset(&mut self, distribution: Distribution) {
        self.distribution = distribution;
        self.locks = LockSet::default();
    }

    /// Draw a random distribution that honors the locks.
    pub fn random_distribution<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> DiceResult<Distribution> {
        let locked_sum = self.locks.locked_sum();
        let unlocked: Vec<Face> = self.locks.unlocked().collect();

        if unlocked.is_empty() {
            return if locked_sum == TOTAL {
                Ok(self.distribution)
            } else {
                Err(DiceError::LockedSumMismatch(locked_sum))
            };
        }

        let sum_to = TOTAL.saturating_sub(locked_sum);
        let draws: Vec<f64> =
            unlocked.iter().map(|_| rng.random::<f64>()).collect();
        let total: f64 = draws.iter().sum();

        let mut values = [0u32; 6];
        for face in Face::ALL {
            if let Some(pinned) = self.locks.pinned(face) {
                values[face.index()] = pinned;
            }
        }

        let mut assigned = 0;
        for (k, (face, draw)) in unlocked.iter().zip(&draws).enumerate() {
            let share = if total > 0.0 {
                draw / total
            } else {
                1.0 / unlocked.len() as f64
            };
            let value = if k + 1 == unlocked.len() {
                sum_to - assigned
            } else {
                ((sum_to as f64 * share) as u32).min(sum_to - assigned)
            };
            assigned += value;
            values[face.index()] = value;
        }

        Distribution::new(values)
    }

    pub fn randomize<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> DiceResult<Distribution> {
        self.distribution = self.random_distribution(rng)?;
        Ok(self.distribution)
    }

    /// Mean and standard deviation of a single die.
    pub fn mean_and_deviation(&self) -> (f64, f64) {
        let weights = self.distribution.values().map(|v| v as f64);
        mean_and_deviation(&weights, 1)
    }
}

/// Set `active` to `new_value` and redistribute the rest.
///
/// Three cases, in this order:
/// 1. the total is off and other unlocked faces hold weight: scale them
///    by `(100 − new − locked) / unlocked`, truncate, then give the
///    rounding residual to the active face;
/// 2. the other unlocked faces are all zero and the total fell short:
///    the first unlocked face after `active` (cyclic) takes the
///    deficit, or the active face is pushed back up if there is none;
/// 3. the other unlocked faces are all zero and the total overshot:
///    the active face is pulled back down.
fn rebalance(
    current: [u32; 6],
    locks: &LockSet,
    active: Face,
    new_value: u32,
) -> [u32; 6] {
    let total_target = TOTAL as i64;
    let mut values = current.map(i64::from);
    let a = active.index();
    let new_value = i64::from(new_value);
    values[a] = new_value;

    let total: i64 = values.iter().sum();
    let locked_sum = i64::from(locks.locked_sum());
    let others: Vec<Face> = locks.unlocked().filter(|f| *f != active).collect();
    let unlocked_sum: i64 = others.iter().map(|f| values[f.index()]).sum();

    if total != total_target && unlocked_sum != 0 {
        let scaling_factor = ((total_target - new_value - locked_sum)
            as f64
            / unlocked_sum as f64)
            .max(0.0);
        for face in &others {
            let i = face.index();
            values[i] = (values[i] as f64 * scaling_factor) as i64;
        }
        let total: i64 = values.iter().sum();
        values[a] += total_target - total;
    } else if unlocked_sum == 0 && total < total_target {
        let mut face = active.next();
        let mut absorber = None;
        while face != active {
            if !locks.is_locked(face) {
                absorber = Some(face);
                break;
            }
            face = face.next();
        }
        match absorber {
            Some(face) => {
                values[face.index()] = total_target - new_value - locked_sum
            }
            None => values[a] += total_target - total,
        }
    } else if unlocked_sum == 0 && total > total_target {
        values[a] += total_target - total;
    }

    values.map(|v| v.max(0) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn face(n: u8) -> Face {
        Face::new(n).unwrap()
    }

    fn model(values: [u32; 6]) -> DistributionModel {
        DistributionModel::new(Distribution::new(values).unwrap())
    }

    #[test]
    fn test_face_numbering() {
        assert!(Face::new(0).is_err());
        assert!(Face::new(7).is_err());
        assert_eq!(face(6).next(), face(1));
        assert_eq!(face(3).index(), 2);
    }

    #[test]
    fn test_distribution_must_sum_to_100() {
        assert_eq!(
            Distribution::new([10, 10, 10, 10, 10, 10]),
            Err(DiceError::InvalidDistribution(60))
        );
        assert!(Distribution::new([16, 16, 16, 16, 16, 20]).is_ok());
    }

    #[test]
    fn test_scaling_preserves_relative_weights() {
        let mut m = model([0, 20, 20, 20, 20, 20]);
        let d = m.set_face(face(1), 50).unwrap();
        assert_eq!(d.values(), [50, 10, 10, 10, 10, 10]);
    }

    #[test]
    fn test_truncation_residual_goes_to_active_face() {
        let mut m = model([20, 20, 20, 20, 20, 0]);
        let d = m.set_face(face(1), 50).unwrap();
        // Others scale by 50/80 to 12.5 and truncate to 12.
        assert_eq!(d.values(), [52, 12, 12, 12, 12, 0]);
    }

    #[test]
    fn test_locked_face_is_untouched_by_edits_elsewhere() {
        let mut m = model([0, 20, 20, 20, 20, 20]);
        m.set_face(face(1), 50).unwrap();
        assert!(m.toggle_lock(face(1)));

        let d = m.set_face(face(2), 10).unwrap();
        assert_eq!(d.get(face(1)), 50);
        assert_eq!(d.values()[1..].iter().sum::<u32>(), 50);

        let d = m.set_face(face(2), 30).unwrap();
        assert_eq!(d.values(), [50, 30, 5, 5, 5, 5]);
    }

    #[test]
    fn test_setting_a_locked_face_is_rejected() {
        let mut m = model([40, 12, 12, 12, 12, 12]);
        m.toggle_lock(face(1));
        let err = m.set_face(face(1), 10).unwrap_err();
        assert_eq!(
            err,
            DiceError::FaceLocked {
                face: face(1),
                pinned: 40
            }
        );
        assert_eq!(m.distribution().get(face(1)), 40);
    }

    #[test]
    fn test_unlock_clears_pin_but_keeps_value() {
        let mut m = model([40, 12, 12, 12, 12, 12]);
        m.toggle_lock(face(1));
        assert_eq!(m.locks().locked_sum(), 40);
        assert!(!m.toggle_lock(face(1)));
        assert_eq!(m.locks().locked_sum(), 0);
        assert_eq!(m.locks().pinned(face(1)), None);
        assert_eq!(m.distribution().get(face(1)), 40);
    }

    #[test]
    fn test_shrinking_with_zeroed_others_fills_next_face() {
        let mut m = model([0, 0, 100, 0, 0, 0]);
        let d = m.set_face(face(3), 70).unwrap();
        assert_eq!(d.values(), [0, 0, 70, 30, 0, 0]);
    }

    #[test]
    fn test_cyclic_search_skips_locked_faces_and_wraps() {
        let mut m = model([0, 0, 0, 0, 0, 100]);
        let d = m.set_face(face(6), 60).unwrap();
        // Search starts after face 6 and wraps to face 1.
        assert_eq!(d.values(), [40, 0, 0, 0, 0, 60]);

        let mut m = model([0, 0, 0, 0, 10, 90]);
        m.toggle_lock(face(5));
        m.toggle_lock(face(1));
        let d = m.set_face(face(6), 80).unwrap();
        assert_eq!(d.values(), [0, 10, 0, 0, 10, 80]);
    }

    #[test]
    fn test_shrinking_with_nothing_else_unlocked_is_undone() {
        let mut m = model([20, 20, 20, 20, 0, 20]);
        for n in [1, 2, 3, 4, 5] {
            m.toggle_lock(face(n));
        }
        let d = m.set_face(face(6), 5).unwrap();
        assert_eq!(d.get(face(6)), 20);
        let d = m.set_face(face(6), 60).unwrap();
        assert_eq!(d.get(face(6)), 20);
    }

    #[test]
    fn test_growing_past_locked_mass_is_clamped() {
        let mut m = model([30, 10, 10, 10, 10, 30]);
        m.toggle_lock(face(1));
        let d = m.set_face(face(6), 100).unwrap();
        assert_eq!(d.values(), [30, 0, 0, 0, 0, 70]);
    }

    #[test]
    fn test_random_distribution_without_locks() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = DistributionModel::default();
        for _ in 0..100 {
            let d = m.random_distribution(&mut rng).unwrap();
            assert_eq!(d.values().iter().sum::<u32>(), 100);
            assert!(d.values().iter().all(|&v| v <= 100));
        }
    }

    #[test]
    fn test_random_distribution_keeps_locked_values() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut m = model([25, 15, 15, 15, 15, 15]);
        m.toggle_lock(face(1));
        m.toggle_lock(face(4));
        let d = m.randomize(&mut rng).unwrap();
        assert_eq!(d.get(face(1)), 25);
        assert_eq!(d.get(face(4)), 15);
        assert_eq!(d.values().iter().sum::<u32>(), 100);
    }

    #[test]
    fn test_random_distribution_all_locked() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut m = model([25, 15, 15, 15, 15, 15]);
        for f in Face::ALL {
            m.toggle_lock(f);
        }
        assert_eq!(
            m.random_distribution(&mut rng),
            Ok(m.distribution())
        );

        // Pins that no longer sum to 100 are a contradiction.
        let mut m = model([25, 15, 15, 15, 15, 15]);
        for f in Face::ALL {
            m.toggle_lock(f);
        }
        m.locks.pinned[0] = 10;
        assert_eq!(
            m.random_distribution(&mut rng),
            Err(DiceError::LockedSumMismatch(85))
        );
    }

    #[test]
    fn test_mean_and_deviation() {
        let (mean, dev) =
            mean_and_deviation(&[0.0, 0.0, 0.0, 0.0, 0.0, 100.0], 1);
        assert!((mean - 6.0).abs() < 1e-12);
        assert!(dev.abs() < 1e-6);

        let fair = [1.0 / 6.0; 6];
        let (mean, dev) = mean_and_deviation(&fair, 3);
        assert!((mean - 5.5).abs() < 1e-12);
        assert!((dev - (35.0f64 / 12.0).sqrt()).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_edits_keep_sum_and_locks(
            seed in any::<u64>(),
            ops in prop::collection::vec((1u8..=6, 0u32..=120, any::<bool>()), 1..40),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut m = DistributionModel::default();
            m.randomize(&mut rng).unwrap();

            for (n, value, toggle) in ops {
                let f = Face::new(n).unwrap();
                if toggle {
                    m.toggle_lock(f);
                    continue;
                }
                let before = m.distribution();
                match m.set_face(f, value) {
                    Ok(d) => {
                        prop_assert_eq!(d.values().iter().sum::<u32>(), 100);
                        for other in Face::ALL {
                            if m.is_locked(other) {
                                prop_assert_eq!(d.get(other), before.get(other));
                            }
                        }
                    }
                    Err(DiceError::FaceLocked { .. }) => {
                        prop_assert!(m.is_locked(f));
                        prop_assert_eq!(m.distribution(), before);
                    }
                    Err(e) => prop_assert!(false, "unexpected error {e}"),
                }
            }
        }
    }
}
