use std::fmt::Display;

use ordered_float::NotNan;

use crate::geometry::Transformation;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Copy)]
/// [Proper rigid transformation](https://en.wikipedia.org/wiki/Rigid_transformation),
/// decomposed into a rotation followed by a translation.
pub struct DTransformation {
    /// The rotation in radians
    pub rotation: NotNan<f64>,
    /// The translation in the x and y-axis
    pub translation: (NotNan<f64>, NotNan<f64>),
}

impl DTransformation {
    pub fn new(rotation: f64, translation: (f64, f64)) -> Self {
        Self {
            rotation: NotNan::new(rotation).expect("rotation is NaN"),
            translation: (
                NotNan::new(translation.0).expect("translation.0 is NaN"),
                NotNan::new(translation.1).expect("translation.1 is NaN"),
            ),
        }
    }

    /// Rotation given in degrees, normalized to `[0, 360)`
    pub fn from_degrees(rotation: f64, translation: (f64, f64)) -> Self {
        Self::new(normalize_degrees(rotation).to_radians(), translation)
    }

    pub const fn empty() -> Self {
        const _0: NotNan<f64> = unsafe { NotNan::new_unchecked(0.0) };
        Self {
            rotation: _0,
            translation: (_0, _0),
        }
    }

    pub fn rotation(&self) -> f64 {
        self.rotation.into()
    }

    pub fn rotation_degrees(&self) -> f64 {
        normalize_degrees(self.rotation.to_degrees())
    }

    pub fn translation(&self) -> (f64, f64) {
        (self.translation.0.into(), self.translation.1.into())
    }

    pub fn compose(&self) -> Transformation {
        Transformation::from_dt(self)
    }
}

/// Maps any angle (degrees) onto `[0, 360)`
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    //rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if a >= 360.0 { 0.0 } else { a }
}

impl Display for DTransformation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "r: {:.3}°, t: ({:.3}, {:.3})",
            self.rotation_degrees(),
            self.translation.0.into_inner(),
            self.translation.1.into_inner()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0.0, 0.0)]
    #[test_case(360.0, 0.0)]
    #[test_case(450.0, 90.0)]
    #[test_case(-90.0, 270.0)]
    #[test_case(-1e-20, 0.0)]
    fn degrees_wrap(input: f64, expected: f64) {
        assert_eq!(normalize_degrees(input), expected);
    }

    #[test]
    fn full_turn_equals_no_turn() {
        let a = DTransformation::from_degrees(360.0, (1.0, 2.0));
        let b = DTransformation::from_degrees(0.0, (1.0, 2.0));
        assert_eq!(a, b);
    }
}
