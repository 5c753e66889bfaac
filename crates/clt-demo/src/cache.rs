use crate::store::Store;
use crate::versioned::Memoized;

pub struct Cache {
    /// Mean and deviation of one die.
    pub die_stats: Memoized<Store, u64, (f64, f64)>,
    /// Single-die mean shifted into the range of the dice sum.
    pub shifted_stats: Memoized<Store, (u64, u64), (f64, f64)>,
}

impl Cache {
    pub fn new() -> Self {
        let die_stats = Memoized::new(
            |s: &Store| s.model.version(),
            |s: &Store| s.model.get().mean_and_deviation(),
        );

        let shifted_stats = Memoized::new(
            |s: &Store| (s.model.version(), s.dice.version()),
            |s: &Store| {
                let weights = s.distribution().values().map(f64::from);
                dice::mean_and_deviation(&weights, *s.dice.get())
            },
        );

        Self {
            die_stats,
            shifted_stats,
        }
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}
