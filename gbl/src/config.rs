use anyhow::{Result, ensure};
use foamnest::io::svg::SvgDrawOptions;
use serde::{Deserialize, Serialize};

/// Configuration for the genetic bottom-left optimizer
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GblConfig {
    /// Seed for the PRNG. If undefined, the algorithm will run in non-deterministic mode using entropy
    pub prng_seed: Option<u64>,
    pub search: SearchConfig,
    #[serde(default)]
    pub placement: PlacementConfig,
    #[serde(default)]
    pub fitness: FitnessWeights,
    /// Maximum number of sheets a layout may open. Unlimited if undefined
    pub max_sheets: Option<usize>,
    /// Optional SVG drawing options
    #[serde(default)]
    pub svg_draw_options: SvgDrawOptions,
}

impl Default for GblConfig {
    fn default() -> Self {
        Self {
            prng_seed: Some(0),
            search: SearchConfig::default(),
            placement: PlacementConfig::default(),
            fitness: FitnessWeights::default(),
            max_sheets: Some(10),
            svg_draw_options: SvgDrawOptions::default(),
        }
    }
}

impl GblConfig {
    pub fn validate(&self) -> Result<()> {
        let s = &self.search;
        ensure!(s.population_size > 0, "population size must be positive");
        ensure!(
            s.n_elites < s.population_size,
            "number of elites ({}) must be smaller than the population size ({})",
            s.n_elites,
            s.population_size
        );
        ensure!(s.tournament_size > 0, "tournament size must be positive");
        ensure!(
            (0.0..=1.0).contains(&s.crossover_rate),
            "crossover rate must lie in [0, 1]: {}",
            s.crossover_rate
        );
        ensure!(
            (0.0..=1.0).contains(&s.mutation_rate),
            "mutation rate must lie in [0, 1]: {}",
            s.mutation_rate
        );
        let t = &s.termination;
        ensure!(
            t.max_generations.is_some() || t.stagnation_window.is_some() || t.time_limit_secs.is_some(),
            "at least one termination criterion is required"
        );
        ensure!(
            self.placement.nudge_degrees > 0.0 && self.placement.nudge_degrees < 1.0,
            "nfp nudge must lie in (0, 1) degrees: {}",
            self.placement.nudge_degrees
        );
        ensure!(
            self.placement.continuous_resolution >= 0.001,
            "continuous rotation resolution must be at least 0.001 degrees: {}",
            self.placement.continuous_resolution
        );
        ensure!(self.max_sheets != Some(0), "max_sheets must be positive");
        let w = &self.fitness;
        ensure!(
            w.sheet > 0.0 && w.waste >= 0.0 && w.compactness >= 0.0,
            "invalid fitness weights: {w:?}"
        );
        Ok(())
    }
}

/// Parameters of the genetic search over part orderings and rotations
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub population_size: usize,
    /// Best candidates that survive unchanged into the next generation
    pub n_elites: usize,
    /// Number of candidates competing in each tournament selection
    pub tournament_size: usize,
    /// Probability that a child is bred by crossover rather than copied from its first parent
    pub crossover_rate: f64,
    /// Per-gene probability of a swap mutation, and separately of a rotation mutation
    pub mutation_rate: f64,
    pub termination: Termination,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            n_elites: 2,
            tournament_size: 3,
            crossover_rate: 0.9,
            mutation_rate: 0.1,
            termination: Termination::default(),
        }
    }
}

/// The search stops as soon as any of the defined criteria is met
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Termination {
    pub max_generations: Option<usize>,
    /// Stop after this many consecutive generations without improvement
    pub stagnation_window: Option<usize>,
    /// Wall-clock budget, checked between generations
    pub time_limit_secs: Option<f64>,
}

impl Default for Termination {
    fn default() -> Self {
        Self {
            max_generations: Some(50),
            stagnation_window: Some(15),
            time_limit_secs: Some(60.0),
        }
    }
}

/// Direction in which parts gravitate
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gravity {
    /// Lowest position first, leftmost among equally low positions
    #[default]
    BottomLeft,
    /// Leftmost position first, lowest among equally left positions
    LeftBottom,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct PlacementConfig {
    pub gravity: Gravity,
    /// Number of retries with a nudged rotation when a no-fit polygon cannot be computed
    pub nfp_retries: usize,
    /// Rotation offset (degrees) added per retry
    pub nudge_degrees: f64,
    /// Resolution (degrees) to which sampled continuous rotations are rounded
    pub continuous_resolution: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            gravity: Gravity::BottomLeft,
            nfp_retries: 3,
            nudge_degrees: 0.01,
            continuous_resolution: 0.1,
        }
    }
}

/// Weights of the fitness terms, applied per used sheet
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct FitnessWeights {
    pub sheet: f64,
    /// Weight of the unused area within the parts' envelope, relative to the sheet area
    pub waste: f64,
    /// Weight of the envelope area, relative to the sheet area
    pub compactness: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            sheet: 1.0,
            waste: 0.1,
            compactness: 0.05,
        }
    }
}
