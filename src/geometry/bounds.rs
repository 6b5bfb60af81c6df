//! Lower and upper bounds.

use anyhow::{Result, bail};
use rand::{Rng, distr::uniform::SampleUniform};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

/// Inclusive lower and upper bounds.
///
/// Bounds read from a configuration file bypass [`InclusiveBounds::new`], so
/// they should be checked with [`InclusiveBounds::validate`] before use.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InclusiveBounds<T> {
    lower: T,
    upper: T,
}

pub trait Bounds<T>
where
    T: Copy + PartialOrd,
{
    /// Returns the lower bound.
    fn lower(&self) -> T;

    /// Returns the upper bound.
    fn upper(&self) -> T;

    /// Whether the given value is contained within the bounds.
    fn contain(&self, value: T) -> bool;

    /// Returns the lower and upper bound in a tuple.
    fn bounds(&self) -> (T, T) {
        (self.lower(), self.upper())
    }
}

impl<T> InclusiveBounds<T>
where
    T: PartialOrd + fmt::Debug,
{
    /// Creates a new set of inclusive bounds.
    ///
    /// # Panics
    /// If the given upper bound is smaller than the lower bound.
    pub fn new(lower: T, upper: T) -> Self {
        assert!(
            upper >= lower,
            "Upper bound ({:?}) is smaller than lower bound ({:?})",
            &upper,
            &lower
        );
        Self { lower, upper }
    }

    /// Creates a new set of inclusive bounds.
    ///
    /// # Errors
    /// Returns an error if the upper bound is smaller than the lower bound, or
    /// if the bounds can not be compared (as for NaN).
    pub fn try_new(lower: T, upper: T) -> Result<Self> {
        let bounds = Self { lower, upper };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Checks that the upper bound is not smaller than the lower bound.
    ///
    /// # Errors
    /// Returns an error if the bounds are reversed or incomparable.
    pub fn validate(&self) -> Result<()> {
        if matches!(
            self.upper.partial_cmp(&self.lower),
            None | Some(Ordering::Less)
        ) {
            bail!(
                "Upper bound ({:?}) is smaller than lower bound ({:?})",
                &self.upper,
                &self.lower
            );
        }
        Ok(())
    }
}

impl<T> Bounds<T> for InclusiveBounds<T>
where
    T: Copy + PartialOrd,
{
    fn lower(&self) -> T {
        self.lower
    }

    fn upper(&self) -> T {
        self.upper
    }

    fn contain(&self, value: T) -> bool {
        value >= self.lower() && value <= self.upper()
    }
}

impl<T> InclusiveBounds<T>
where
    T: Copy + PartialOrd + SampleUniform,
{
    /// Draws a value uniformly from within the bounds, both ends included.
    ///
    /// # Panics
    /// If the bounds are reversed.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        rng.random_range(self.lower..=self.upper)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn constructing_valid_inclusive_bounds_succeeds() {
        InclusiveBounds::new(42.0, 42.0);
    }

    #[test]
    #[should_panic]
    fn constructing_invalid_inclusive_bounds() {
        InclusiveBounds::new(42.0, 41.9999);
    }

    #[test]
    fn trying_to_construct_reversed_bounds_fails() {
        assert!(InclusiveBounds::try_new(3, 2).is_err());
        assert!(InclusiveBounds::try_new(f64::NAN, 1.0).is_err());
        assert!(InclusiveBounds::try_new(2, 2).is_ok());
    }

    #[test]
    fn inclusive_bounds_contain_inside_values() {
        let bounds = InclusiveBounds::new(42.0, 43.0);
        assert!(bounds.contain(42.5));
        assert!(bounds.contain(42.0));
        assert!(bounds.contain(43.0));
    }

    #[test]
    fn sampled_values_lie_within_bounds() {
        use rand::{SeedableRng, rngs::StdRng};
        let mut rng = StdRng::seed_from_u64(7);
        let bounds = InclusiveBounds::new(-5.0, 5.0);
        assert!((0..100).all(|_| bounds.contain(bounds.sample(&mut rng))));
        assert_eq!(InclusiveBounds::new(4_usize, 4).sample(&mut rng), 4);
    }

    #[test]
    fn inclusive_bounds_dont_contain_outside_values() {
        let bounds = InclusiveBounds::new(42.0, 43.0);
        assert!(!bounds.contain(41.9999));
        assert!(!bounds.contain(43.0001));
    }
}
