use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use foamnest::entities::Instance;
use foamnest::geometry::geo_enums::RotationSet;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

/// One part instance in a [`Candidate`], with the rotation (degrees) it should be placed at
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gene {
    /// Index into [`Instance::part_instances`]
    pub instance: usize,
    pub rotation: f64,
}

/// An ordering of part instances with a rotation per instance.
/// Owns no geometry: the placement solver turns it into a layout.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Candidate {
    pub genes: Vec<Gene>,
}

impl Candidate {
    /// Random permutation of `instances` with random allowed rotations
    pub fn random(instance: &Instance, instances: &[usize], resolution: f64, rng: &mut impl Rng) -> Self {
        let mut order = instances.to_vec();
        order.shuffle(rng);
        let genes = order
            .into_iter()
            .map(|i| Gene {
                instance: i,
                rotation: sample_rotation(instance, part_id(instance, i), resolution, rng),
            })
            .collect();
        Candidate { genes }
    }

    /// Largest parts first, each at its first feasible rotation
    pub fn by_area(instance: &Instance, instances: &[usize]) -> Self {
        let order = instances
            .iter()
            .copied()
            .sorted_by_key(|&i| Reverse(OrderedFloat(instance.part(part_id(instance, i)).area())))
            .collect_vec();
        Self::with_default_rotations(instance, order)
    }

    /// Parts of the same order kept together, orders with the largest total area first.
    /// Within an order, largest parts first. Parts without an order reference come last.
    pub fn by_order(instance: &Instance, instances: &[usize]) -> Self {
        let order_of = |i: usize| instance.part(part_id(instance, i)).order_ref.as_deref();
        let area_of = |i: usize| instance.part(part_id(instance, i)).area();

        let mut order_area: HashMap<Option<&str>, f64> = HashMap::new();
        for &i in instances {
            *order_area.entry(order_of(i)).or_default() += area_of(i);
        }

        let order = instances
            .iter()
            .copied()
            .sorted_by_key(|&i| {
                let o = order_of(i);
                (
                    o.is_none(),
                    Reverse(OrderedFloat(order_area[&o])),
                    o,
                    Reverse(OrderedFloat(area_of(i))),
                )
            })
            .collect_vec();
        Self::with_default_rotations(instance, order)
    }

    fn with_default_rotations(instance: &Instance, order: Vec<usize>) -> Self {
        let genes = order
            .into_iter()
            .map(|i| Gene {
                instance: i,
                rotation: instance.feasible_rotations[part_id(instance, i)]
                    .first()
                    .copied()
                    .unwrap_or(0.0),
            })
            .collect();
        Candidate { genes }
    }

    /// Order crossover (OX1): a random slice of `self` stays in place, the remaining positions
    /// are filled with the other genes in the order they appear in `other`.
    /// Every gene keeps the rotation of the parent it was taken from.
    pub fn crossover(&self, other: &Candidate, rng: &mut impl Rng) -> Candidate {
        debug_assert!(self.is_permutation_of(other));
        let n = self.genes.len();
        if n < 2 {
            return self.clone();
        }
        let (a, b) = {
            let (x, y) = (rng.random_range(0..n), rng.random_range(0..n));
            (x.min(y), x.max(y) + 1)
        };
        let slice = &self.genes[a..b];
        let taken = slice.iter().map(|g| g.instance).collect::<HashSet<_>>();
        let mut rest = other
            .genes
            .iter()
            .filter(|g| !taken.contains(&g.instance))
            .copied();

        let mut genes = Vec::with_capacity(n);
        genes.extend(rest.by_ref().take(a));
        genes.extend_from_slice(slice);
        genes.extend(rest);
        Candidate { genes }
    }

    /// Swaps every position with probability `rate` with a random other position,
    /// then resamples every rotation with probability `rate`
    pub fn mutate(&mut self, instance: &Instance, rate: f64, resolution: f64, rng: &mut impl Rng) {
        let n = self.genes.len();
        if n == 0 {
            return;
        }
        for i in 0..n {
            if rng.random_bool(rate) {
                let j = rng.random_range(0..n);
                self.genes.swap(i, j);
            }
        }
        for gene in self.genes.iter_mut() {
            if rng.random_bool(rate) {
                let p_id = part_id(instance, gene.instance);
                gene.rotation = sample_rotation(instance, p_id, resolution, rng);
            }
        }
    }

    /// True if both candidates contain exactly the same part instances
    pub fn is_permutation_of(&self, other: &Candidate) -> bool {
        let ids = |c: &Candidate| c.genes.iter().map(|g| g.instance).sorted().collect_vec();
        ids(self) == ids(other)
    }
}

fn part_id(instance: &Instance, i: usize) -> usize {
    instance.part_instances[i].part_id
}

/// Random rotation (degrees) allowed for the part.
/// Discrete sets are restricted to the rotations under which the part fits an empty sheet,
/// continuous rotations are rounded to `resolution`.
pub fn sample_rotation(instance: &Instance, part_id: usize, resolution: f64, rng: &mut impl Rng) -> f64 {
    match &instance.part(part_id).allowed_rotations {
        RotationSet::Fixed => 0.0,
        RotationSet::Discrete(_) => instance.feasible_rotations[part_id]
            .choose(rng)
            .copied()
            .unwrap_or(0.0),
        RotationSet::Continuous => {
            let steps = ((360.0 / resolution).floor() as usize).max(1);
            rng.random_range(0..steps) as f64 * resolution
        }
    }
}
