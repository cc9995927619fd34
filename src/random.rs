use rand::Rng;

/// The uniform random source consumed by cells and the population.
///
/// Every `rand::Rng` is one, so a seeded `StdRng` gives reproducible runs.
pub trait RandomSource {
    /// A sample from `[lo, hi)`. Returns `lo` when the interval is empty.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64;

    /// A uniformly chosen index below `len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        let i = self.uniform(0.0, len as f64).floor() as usize;
        i.min(len.saturating_sub(1))
    }
}

impl<R: Rng> RandomSource for R {
    #[inline]
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if hi > lo {
            self.random_range(lo..hi)
        } else {
            lo
        }
    }
}
