/// Candidate encoding: part instance order and rotations, plus the genetic operators
pub mod candidate;
/// Scalar scoring of layouts
pub mod fitness;
/// Bottom-left decoding of candidates into layouts
pub mod placement;
/// Genetic search driver
pub mod search;
