use std::cmp::Ordering;
use std::fmt::{Debug, Display};

/// Absolute tolerance used by all geometric predicates, in sheet units (typically mm).
pub const EPSILON: f64 = 1e-7;

///Wrapper around the [`float_cmp::approx_eq!()`] macro for easy comparison of floats with a certain tolerance.
///Two FPAs are considered equal if they are within [`EPSILON`] of each other.
#[derive(Debug, Clone, Copy)]
pub struct FPA(pub f64);

impl<T> From<T> for FPA
where
    T: Into<f64>,
{
    fn from(n: T) -> Self {
        FPA(n.into())
    }
}

impl PartialEq<Self> for FPA {
    fn eq(&self, other: &Self) -> bool {
        float_cmp::approx_eq!(f64, self.0, other.0, epsilon = EPSILON, ulps = 4)
    }
}

impl PartialOrd<Self> for FPA {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.eq(other) {
            true => Some(Ordering::Equal),
            false => self.0.partial_cmp(&other.0),
        }
    }
}

impl Display for FPA {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_within_tolerance_are_equal() {
        assert_eq!(FPA(1.0), FPA(1.0 + EPSILON / 2.0));
        assert_ne!(FPA(1.0), FPA(1.0 + EPSILON * 10.0));
        assert!(FPA(1.0) < FPA(1.1));
        assert!(FPA(2.0) >= FPA(2.0 - EPSILON / 4.0));
    }
}
