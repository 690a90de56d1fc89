use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use std::cmp::{max, min};
use std::fmt;

/// A finite arithmetic progression `first, first + step, ..., last`.
///
/// The empty progression ("Null") is encoded with a zero step. A progression
/// with a single element always has step 1, so equal sets compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FiniteArithmeticSequence {
    first: BigInt,
    step: BigInt,
    count: BigInt,
}

fn div_ceil(numerator: &BigInt, denominator: &BigInt) -> BigInt {
    -(-numerator).div_floor(denominator)
}

impl FiniteArithmeticSequence {
    /// Creates a progression. A non-positive step or count yields Null.
    pub fn new(first: BigInt, step: BigInt, count: BigInt) -> Self {
        if !step.is_positive() || !count.is_positive() {
            return Self::null();
        }
        if count.is_one() {
            return Self::single(first);
        }
        Self { first, step, count }
    }

    pub fn null() -> Self {
        Self {
            first: BigInt::zero(),
            step: BigInt::zero(),
            count: BigInt::zero(),
        }
    }

    pub fn single(value: BigInt) -> Self {
        Self {
            first: value,
            step: BigInt::one(),
            count: BigInt::one(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.step.is_zero()
    }

    pub fn first(&self) -> &BigInt {
        &self.first
    }

    pub fn step(&self) -> &BigInt {
        &self.step
    }

    pub fn count(&self) -> &BigInt {
        &self.count
    }

    pub fn last(&self) -> BigInt {
        &self.first + &self.step * (&self.count - 1)
    }

    pub fn contains(&self, value: &BigInt) -> bool {
        if self.is_null() || *value < self.first || *value > self.last() {
            return false;
        }
        (value - &self.first).is_multiple_of(&self.step)
    }

    /// Adds `shift` to every element.
    pub fn shift_right(&self, shift: &BigInt) -> Self {
        if self.is_null() {
            return Self::null();
        }
        Self {
            first: &self.first + shift,
            step: self.step.clone(),
            count: self.count.clone(),
        }
    }

    /// Keeps only the elements inside the inclusive range `[lower, upper]`.
    pub fn fit_into(&self, lower: &BigInt, upper: &BigInt) -> Self {
        if self.is_null() || upper < lower {
            return Self::null();
        }

        let last = self.last();
        let first = if self.first >= *lower {
            self.first.clone()
        } else {
            &self.first + div_ceil(&(lower - &self.first), &self.step) * &self.step
        };
        let last = if last <= *upper {
            last
        } else {
            &last - div_ceil(&(&last - upper), &self.step) * &self.step
        };

        if first > last {
            return Self::null();
        }

        let count = (&last - &first) / &self.step + 1;
        Self::new(first, self.step.clone(), count)
    }

    /// Union of two progressions.
    ///
    /// Returns Null when the union is not a single progression: the steps
    /// differ (and neither side is a single element), the elements are out of
    /// phase, or there is a gap of more than one step between them.
    pub fn join_with(&self, other: &Self) -> Self {
        if self.is_null() {
            return other.clone();
        }
        if other.is_null() {
            return self.clone();
        }

        let (lower, upper) = if self.first <= other.first {
            (self, other)
        } else {
            (other, self)
        };

        if lower.count.is_one() && upper.count.is_one() {
            if lower.first == upper.first {
                return lower.clone();
            }
            return Self::new(
                lower.first.clone(),
                &upper.first - &lower.first,
                BigInt::from(2),
            );
        }

        let step = if lower.count.is_one() {
            &upper.step
        } else if upper.count.is_one() || lower.step == upper.step {
            &lower.step
        } else {
            return Self::null();
        };

        let distance = &upper.first - &lower.first;
        if !distance.is_multiple_of(step) || upper.first > lower.last() + step {
            return Self::null();
        }

        let last = max(lower.last(), upper.last());
        let count = (&last - &lower.first) / step + 1;
        Self::new(lower.first.clone(), step.clone(), count)
    }

    /// Intersection of two progressions, reconciling the steps with the
    /// extended Euclidean algorithm.
    pub fn intersect_with(&self, other: &Self) -> Self {
        if self.is_null() || other.is_null() {
            return Self::null();
        }

        let lower = max(self.first.clone(), other.first.clone());
        let upper = min(self.last(), other.last());
        if upper < lower {
            return Self::null();
        }

        // x = self.first (mod self.step), x = other.first (mod other.step)
        let egcd = self.step.extended_gcd(&other.step);
        let difference = &other.first - &self.first;
        if !difference.is_multiple_of(&egcd.gcd) {
            return Self::null();
        }

        let other_step_reduced = &other.step / &egcd.gcd;
        let multiplier = ((&difference / &egcd.gcd) * &egcd.x).mod_floor(&other_step_reduced);
        let solution = &self.first + &self.step * multiplier;
        let step = &self.step * &other_step_reduced;

        let first = &solution + div_ceil(&(&lower - &solution), &step) * &step;
        if first > upper {
            return Self::null();
        }

        let count = (&upper - &first) / &step + 1;
        Self::new(first, step, count)
    }

    /// Iterates over all elements. Intended for small progressions.
    pub fn iter(&self) -> impl Iterator<Item = BigInt> + '_ {
        let mut next = self.first.clone();
        let mut remaining = self.count.clone();
        std::iter::from_fn(move || {
            if !remaining.is_positive() {
                return None;
            }
            let value = next.clone();
            next += &self.step;
            remaining -= 1;
            Some(value)
        })
    }
}

impl Default for FiniteArithmeticSequence {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Display for FiniteArithmeticSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "{{}}")
        } else {
            write!(f, "{{{}, +{}, x{}}}", self.first, self.step, self.count)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(first: i64, step: i64, count: i64) -> FiniteArithmeticSequence {
        FiniteArithmeticSequence::new(first.into(), step.into(), count.into())
    }

    fn elements(sequence: &FiniteArithmeticSequence) -> Vec<i64> {
        sequence
            .iter()
            .map(|x| i64::try_from(&x).unwrap())
            .collect()
    }

    #[test]
    fn test_normalisation() {
        assert!(seq(3, 0, 5).is_null());
        assert!(seq(3, 2, 0).is_null());
        assert!(seq(3, -1, 2).is_null());
        assert_eq!(seq(7, 5, 1), seq(7, 1, 1));
        assert_eq!(seq(0, 2, 3).last(), BigInt::from(4));
    }

    #[test]
    fn test_contains() {
        let s = seq(1, 3, 4);
        assert!(s.contains(&BigInt::from(1)));
        assert!(s.contains(&BigInt::from(7)));
        assert!(s.contains(&BigInt::from(10)));
        assert!(!s.contains(&BigInt::from(13)));
        assert!(!s.contains(&BigInt::from(5)));
        assert!(!FiniteArithmeticSequence::null().contains(&BigInt::zero()));
    }

    #[test]
    fn test_shift_right() {
        assert_eq!(seq(1, 2, 3).shift_right(&BigInt::from(4)), seq(5, 2, 3));
        assert!(FiniteArithmeticSequence::null()
            .shift_right(&BigInt::from(4))
            .is_null());
    }

    #[test]
    fn test_fit_into() {
        let s = seq(0, 3, 10);
        assert_eq!(s.fit_into(&BigInt::from(1), &BigInt::from(10)), seq(3, 3, 3));
        assert_eq!(s.fit_into(&BigInt::from(-5), &BigInt::from(100)), s);
        assert_eq!(s.fit_into(&BigInt::from(4), &BigInt::from(6)), seq(6, 1, 1));
        assert!(s.fit_into(&BigInt::from(4), &BigInt::from(5)).is_null());
        assert!(s.fit_into(&BigInt::from(5), &BigInt::from(4)).is_null());
        assert!(s.fit_into(&BigInt::from(28), &BigInt::from(40)).is_null());
    }

    #[test]
    fn test_join_with_null() {
        let s = seq(2, 2, 2);
        assert_eq!(s.join_with(&FiniteArithmeticSequence::null()), s);
        assert_eq!(FiniteArithmeticSequence::null().join_with(&s), s);
    }

    #[test]
    fn test_join_singles() {
        assert_eq!(seq(4, 1, 1).join_with(&seq(1, 1, 1)), seq(1, 3, 2));
        assert_eq!(seq(4, 1, 1).join_with(&seq(4, 1, 1)), seq(4, 1, 1));
    }

    #[test]
    fn test_join_extends() {
        assert_eq!(seq(0, 2, 2).join_with(&seq(4, 2, 3)), seq(0, 2, 5));
        assert_eq!(seq(0, 2, 3).join_with(&seq(2, 2, 1)), seq(0, 2, 3));
        assert_eq!(seq(0, 2, 3).join_with(&seq(6, 1, 1)), seq(0, 2, 4));
        assert_eq!(seq(0, 1, 1).join_with(&seq(0, 2, 2)), seq(0, 2, 2));
        assert_eq!(seq(1, 1, 1).join_with(&seq(3, 2, 2)), seq(1, 2, 3));
    }

    #[test]
    fn test_join_not_expressible() {
        assert!(seq(0, 2, 3).join_with(&seq(1, 2, 3)).is_null());
        assert!(seq(0, 2, 3).join_with(&seq(0, 3, 3)).is_null());
        assert!(seq(0, 2, 2).join_with(&seq(8, 2, 2)).is_null());
        assert!(seq(0, 1, 1).join_with(&seq(5, 2, 2)).is_null());
    }

    #[test]
    fn test_intersect() {
        assert_eq!(seq(0, 2, 10).intersect_with(&seq(0, 3, 10)), seq(0, 6, 4));
        assert_eq!(seq(1, 2, 10).intersect_with(&seq(0, 3, 10)), seq(3, 6, 3));
        assert_eq!(seq(0, 4, 5).intersect_with(&seq(8, 1, 1)), seq(8, 1, 1));
        assert!(seq(0, 2, 10).intersect_with(&seq(1, 4, 10)).is_null());
        assert!(seq(0, 1, 5).intersect_with(&seq(10, 1, 5)).is_null());
        assert!(seq(0, 6, 2).intersect_with(&seq(1, 4, 3)).is_null());
    }

    #[test]
    fn test_intersect_matches_naive() {
        for (a, b) in [
            ((-3, 5, 7), (2, 3, 9)),
            ((0, 4, 6), (2, 6, 5)),
            ((10, 7, 3), (3, 7, 4)),
        ] {
            let first = seq(a.0, a.1, a.2);
            let second = seq(b.0, b.1, b.2);
            let expected: Vec<i64> = elements(&first)
                .into_iter()
                .filter(|x| second.contains(&BigInt::from(*x)))
                .collect();
            assert_eq!(elements(&first.intersect_with(&second)), expected);
        }
    }

    #[test]
    fn test_iter() {
        assert_eq!(elements(&seq(3, 4, 3)), vec![3, 7, 11]);
        assert!(elements(&FiniteArithmeticSequence::null()).is_empty());
    }
}
