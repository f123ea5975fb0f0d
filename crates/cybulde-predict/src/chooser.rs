//! Asset selection from a resolved pool.

use rand::seq::IndexedRandom;

/// Picks one asset reference from a pool.
///
/// Returns `None` only for an empty pool (or an out-of-range pick).
pub trait AssetChooser: Send + Sync {
    fn choose<'a>(&self, pool: &'a [String]) -> Option<&'a str>;
}

/// Uniform random choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomChooser;

impl AssetChooser for RandomChooser {
    fn choose<'a>(&self, pool: &'a [String]) -> Option<&'a str> {
        pool.choose(&mut rand::rng()).map(String::as_str)
    }
}

/// Any `Fn(pool_len) -> index` is a chooser, e.g. `|_| 0` in tests.
impl<F> AssetChooser for F
where
    F: Fn(usize) -> usize + Send + Sync,
{
    fn choose<'a>(&self, pool: &'a [String]) -> Option<&'a str> {
        if pool.is_empty() {
            return None;
        }
        pool.get(self(pool.len())).map(String::as_str)
    }
}
