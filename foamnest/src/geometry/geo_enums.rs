/// Position of a point relative to a closed shape
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeoPosition {
    Interior,
    /// Within tolerance of the boundary
    Boundary,
    Exterior,
}

impl GeoPosition {
    /// Closed-set membership: the boundary counts as inside.
    pub fn is_inside(&self) -> bool {
        !matches!(self, GeoPosition::Exterior)
    }
}

/// Rotations a part instance is allowed to take, in degrees.
#[derive(Clone, Debug, PartialEq)]
pub enum RotationSet {
    /// Only the orientation as given in the input
    Fixed,
    /// One of a discrete set of angles
    Discrete(Vec<f64>),
    /// Any angle in `[0, 360)`
    Continuous,
}

impl RotationSet {
    /// Angular step (degrees) at which [`RotationSet::Continuous`] is scanned for rotations that fit a sheet
    pub const CONTINUOUS_SCAN_STEP: f64 = 0.1;

    /// Finite list of angles covering this set, used for the feasibility pre-check.
    /// Continuous sets are sampled every [`RotationSet::CONTINUOUS_SCAN_STEP`] degrees.
    pub fn scan_angles(&self) -> Vec<f64> {
        match self {
            RotationSet::Fixed => vec![0.0],
            RotationSet::Discrete(angles) => angles.clone(),
            RotationSet::Continuous => {
                let n = (360.0 / Self::CONTINUOUS_SCAN_STEP).round() as usize;
                (0..n)
                    .map(|i| i as f64 * Self::CONTINUOUS_SCAN_STEP)
                    .collect()
            }
        }
    }
}

impl Default for RotationSet {
    fn default() -> Self {
        RotationSet::Discrete(vec![0.0, 90.0, 180.0, 270.0])
    }
}
