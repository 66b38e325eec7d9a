use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Result;
use foamnest::entities::{Infeasibility, Instance, Layout, SheetAllocator};
use foamnest::nfp::NfpCache;
use itertools::Itertools;
use log::{debug, info, warn};
use ordered_float::OrderedFloat;
use rand::Rng;
use rand::prelude::SmallRng;
use rayon::prelude::*;
use thousands::Separable;

use crate::config::GblConfig;
use crate::opt::candidate::Candidate;
use crate::opt::fitness::{failure_fitness, layout_fitness};
use crate::opt::placement::{NfpGenerator, PlacementSolver, decomposed_nfp};

/// Genetic search over part orderings and rotations, each candidate decoded by the bottom-left [`PlacementSolver`].
pub struct GeneticSearch<'a> {
    pub instance: &'a Instance,
    pub config: GblConfig,
    /// Shared by all evaluations of all generations
    pub cache: NfpCache,
    /// SmallRng is a fast, non-cryptographic PRNG <https://rust-random.github.io/book/guide-rngs.html>
    pub rng: SmallRng,
    cancel: Arc<AtomicBool>,
    nfp_generator: NfpGenerator,
}

/// Outcome of a search: the best layout found over all generations
#[derive(Clone, Debug)]
pub struct NestingResult {
    pub layout: Layout,
    pub fitness: f64,
    pub stats: SearchStats,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SearchStats {
    pub generations: usize,
    pub evaluations: usize,
    /// Evaluations in which the placement solver failed
    pub failed_evaluations: usize,
    pub elapsed: Duration,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

#[derive(Clone, Debug)]
struct Individual {
    candidate: Candidate,
    eval: Option<Evaluation>,
}

#[derive(Clone, Debug)]
struct Evaluation {
    fitness: f64,
    /// `None` if the placement solver failed
    layout: Option<Layout>,
}

impl Individual {
    fn new(candidate: Candidate) -> Self {
        Individual {
            candidate,
            eval: None,
        }
    }

    fn fitness(&self) -> f64 {
        self.eval.as_ref().map_or(f64::INFINITY, |e| e.fitness)
    }
}

impl<'a> GeneticSearch<'a> {
    pub fn new(instance: &'a Instance, config: GblConfig, rng: SmallRng) -> Self {
        Self {
            instance,
            config,
            cache: NfpCache::new(),
            rng,
            cancel: Arc::new(AtomicBool::new(false)),
            nfp_generator: decomposed_nfp,
        }
    }

    /// Replaces the cancellation flag. Setting it stops the search after the running generation.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Replaces the function computing no-fit polygons for every evaluation
    pub fn with_nfp_generator(mut self, nfp_generator: NfpGenerator) -> Self {
        self.nfp_generator = nfp_generator;
        self
    }

    fn solver(&self) -> PlacementSolver<'_> {
        PlacementSolver::new(
            self.instance,
            &self.cache,
            self.config.placement,
            self.config.max_sheets,
        )
        .with_nfp_generator(self.nfp_generator)
    }

    pub fn solve(&mut self) -> Result<NestingResult> {
        let start = Instant::now();
        let feasible = self.instance.feasible_instances();
        let mut stats = SearchStats::default();

        if feasible.is_empty() {
            //nothing to search, the layout only reports the infeasible instances
            let layout = self.solver().layout(&Candidate::default())?;
            info!(
                "[GA] no part fits the sheet, {} instance(s) left unplaced",
                layout.unplaced.len()
            );
            stats.elapsed = start.elapsed();
            return Ok(NestingResult {
                layout,
                fitness: 0.0,
                stats,
            });
        }

        let mut population = self.initial_population(&feasible);
        let mut best: Option<(f64, Layout)> = None;
        let mut stagnation = 0;

        loop {
            let (n_evals, n_failed) = self.evaluate(&mut population);
            stats.evaluations += n_evals;
            stats.failed_evaluations += n_failed;
            stats.generations += 1;

            //stable: equally fit individuals keep their relative order
            population.sort_by_key(|ind| OrderedFloat(ind.fitness()));

            let improved = match population[0].eval.as_ref() {
                Some(Evaluation {
                    fitness,
                    layout: Some(layout),
                }) if best.as_ref().is_none_or(|(best_fitness, _)| fitness < best_fitness) => {
                    best = Some((*fitness, layout.clone()));
                    true
                }
                _ => false,
            };
            stagnation = if improved { 0 } else { stagnation + 1 };

            info!(
                "[GA] gen {}: best {:.5}, gen best {:.5}, {} evaluations{}",
                stats.generations,
                best.as_ref().map_or(f64::INFINITY, |(f, _)| *f),
                population[0].fitness(),
                stats.evaluations.separate_with_commas(),
                if improved { " (improved)" } else { "" }
            );

            if let Some(reason) = self.termination_reason(stats.generations, stagnation, start) {
                info!("[GA] stopping after {} generations: {reason}", stats.generations);
                break;
            }

            population = self.next_generation(&population);
        }

        let (hits, misses) = self.cache.stats();
        stats.cache_hits = hits;
        stats.cache_misses = misses;
        stats.elapsed = start.elapsed();

        let (fitness, layout) = match best {
            Some(best) => best,
            None => {
                warn!(
                    "[GA] placement failed for all {} evaluated candidates, no part is placed",
                    stats.evaluations.separate_with_commas()
                );
                (failure_fitness(feasible.len()), self.unplaced_layout())
            }
        };

        info!(
            "[GA] optimization finished in {:.3}ms ({} evaluations, {} failed, nfp cache: {} hits, {} misses)",
            stats.elapsed.as_secs_f64() * 1000.0,
            stats.evaluations.separate_with_commas(),
            stats.failed_evaluations.separate_with_commas(),
            hits.separate_with_commas(),
            misses.separate_with_commas()
        );
        info!(
            "[GA] best layout: {} parts on {} sheet(s), {} unplaced, fitness {:.5}",
            layout.n_placed(),
            layout.n_sheets(),
            layout.unplaced.len(),
            fitness
        );
        for sl in layout.sheets.iter() {
            info!(
                "[GA] sheet {}: {} parts, density {:.3}%",
                sl.index,
                sl.placed.len(),
                sl.density(self.instance) * 100.0
            );
        }

        Ok(NestingResult {
            layout,
            fitness,
            stats,
        })
    }

    /// Heuristic seeds first (largest parts first, then complete orders together), random candidates for the rest
    fn initial_population(&mut self, feasible: &[usize]) -> Vec<Individual> {
        let pop_size = self.config.search.population_size;
        let resolution = self.config.placement.continuous_resolution;

        let seeds = [
            Candidate::by_area(self.instance, feasible),
            Candidate::by_order(self.instance, feasible),
        ];
        let mut population = seeds
            .into_iter()
            .take(pop_size)
            .map(Individual::new)
            .collect_vec();
        while population.len() < pop_size {
            let c = Candidate::random(self.instance, feasible, resolution, &mut self.rng);
            population.push(Individual::new(c));
        }
        debug!("[GA] initial population of {} candidates", population.len());
        population
    }

    /// Layout reporting every instance as unplaced, for when no candidate could be decoded
    fn unplaced_layout(&self) -> Layout {
        let mut alloc = SheetAllocator::new(self.instance, self.config.max_sheets);
        for (i, pi) in self.instance.part_instances.iter().enumerate() {
            let reason = match self.instance.is_feasible(pi.part_id) {
                true => Infeasibility::PlacementFailed,
                false => Infeasibility::ExceedsSheet,
            };
            alloc.mark_unplaced(i, reason);
        }
        alloc.finish()
    }

    /// Evaluates every individual without a fitness in parallel.
    /// Returns the number of evaluations and how many of those failed.
    fn evaluate(&self, population: &mut [Individual]) -> (usize, usize) {
        let instance = self.instance;
        let config = &self.config;
        let solver = self.solver();

        let results = population
            .par_iter_mut()
            .filter(|ind| ind.eval.is_none())
            .map(|ind| {
                let eval = match solver.layout(&ind.candidate) {
                    Ok(layout) => Evaluation {
                        fitness: layout_fitness(&layout, instance, &config.fitness),
                        layout: Some(layout),
                    },
                    Err(e) => {
                        warn!("[GA] candidate evaluation failed: {e:#}");
                        Evaluation {
                            fitness: failure_fitness(ind.candidate.genes.len()),
                            layout: None,
                        }
                    }
                };
                let failed = eval.layout.is_none();
                ind.eval = Some(eval);
                failed
            })
            .collect::<Vec<bool>>();

        let n_failed = results.iter().filter(|f| **f).count();
        (results.len(), n_failed)
    }

    /// Elites survive unchanged, the rest are bred from tournament winners
    fn next_generation(&mut self, population: &[Individual]) -> Vec<Individual> {
        let s_config = self.config.search;
        let resolution = self.config.placement.continuous_resolution;

        let mut next = population[..s_config.n_elites].to_vec();
        while next.len() < s_config.population_size {
            let p1 = self.tournament(population);
            let p2 = self.tournament(population);
            let mut child = match self.rng.random_bool(s_config.crossover_rate) {
                true => p1.crossover(p2, &mut self.rng),
                false => p1.clone(),
            };
            child.mutate(self.instance, s_config.mutation_rate, resolution, &mut self.rng);
            next.push(Individual::new(child));
        }
        next
    }

    /// Fittest of `tournament_size` randomly drawn individuals of a population sorted by fitness
    fn tournament<'p>(&mut self, population: &'p [Individual]) -> &'p Candidate {
        let winner = (0..self.config.search.tournament_size)
            .map(|_| self.rng.random_range(0..population.len()))
            .min()
            .unwrap_or(0);
        &population[winner].candidate
    }

    fn termination_reason(&self, generations: usize, stagnation: usize, start: Instant) -> Option<String> {
        let t = &self.config.search.termination;
        if self.cancel.load(Ordering::Relaxed) {
            return Some("cancelled".to_string());
        }
        if let Some(max) = t.max_generations {
            if generations >= max {
                return Some(format!("generation limit ({max}) reached"));
            }
        }
        if let Some(window) = t.stagnation_window {
            if stagnation >= window {
                return Some(format!("no improvement in {window} generations"));
            }
        }
        if let Some(limit) = t.time_limit_secs {
            if start.elapsed().as_secs_f64() >= limit {
                return Some(format!("time limit ({limit:.1}s) exceeded"));
            }
        }
        None
    }
}
