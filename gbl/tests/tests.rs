#[cfg(test)]
mod tests {
    use std::f64::consts::PI;
    use std::path::Path;

    use itertools::Itertools;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::prelude::SmallRng;
    use test_case::test_case;

    use foamnest::entities::{Infeasibility, Instance, Part, Sheet};
    use foamnest::geometry::geo_enums::RotationSet;
    use foamnest::geometry::primitives::{Point, Rect, SPolygon};
    use foamnest::io::export::export_solution;
    use foamnest::io::import::import_instance;
    use foamnest::io::svg::layout_to_svg;
    use foamnest::nfp::NfpCache;
    use foamnest::util::assertions;
    use gbl::config::{GblConfig, PlacementConfig, Termination};
    use gbl::io;
    use gbl::opt::candidate::Candidate;
    use gbl::opt::fitness::FAILURE_PENALTY;
    use gbl::opt::placement::PlacementSolver;
    use gbl::opt::search::{GeneticSearch, NestingResult};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Small, time-independent configuration so runs are reproducible
    fn test_config(max_sheets: Option<usize>) -> GblConfig {
        let mut config = GblConfig::default();
        config.prng_seed = Some(0);
        config.max_sheets = max_sheets;
        config.search.population_size = 8;
        config.search.n_elites = 2;
        config.search.termination = Termination {
            max_generations: Some(4),
            stagnation_window: None,
            time_limit_secs: None,
        };
        config
    }

    fn solve(instance: &Instance, config: GblConfig) -> NestingResult {
        let seed = config.prng_seed.unwrap_or(0);
        GeneticSearch::new(instance, config, SmallRng::seed_from_u64(seed))
            .solve()
            .unwrap()
    }

    fn rect_part(id: usize, w: f64, h: f64, qty: usize) -> Part {
        let outline = SPolygon::from(Rect::try_new(0.0, 0.0, w, h).unwrap());
        Part::try_new(id, format!("rect_{id}"), None, qty, outline, RotationSet::default(), 0.0).unwrap()
    }

    #[test_case("../assets/foam_orders.json"; "foam_orders")]
    #[test_case("../assets/foam_overflow.json"; "foam_overflow")]
    fn test_instance(instance_path: &str) {
        init_logger();
        let ext_instance = io::read_instance(Path::new(instance_path)).unwrap();
        let instance = import_instance(&ext_instance).unwrap();
        let config = test_config(None);

        let result = solve(&instance, config);
        let layout = &result.layout;

        assert!(assertions::layout_is_valid(&instance, layout));
        //without a sheet cap, only parts that never fit are left out
        assert_eq!(
            layout.n_placed() + layout.n_unplaced(Infeasibility::ExceedsSheet),
            instance.n_instances()
        );
        assert!(result.fitness < FAILURE_PENALTY);

        let solution = export_solution(layout, &instance, result.fitness, result.stats.elapsed);
        assert_eq!(solution.sheets.len(), layout.n_sheets());
        for sl in layout.sheets.iter() {
            let _svg = layout_to_svg(sl, &instance, config.svg_draw_options);
        }
    }

    #[test]
    fn overflow_opens_additional_sheets() {
        init_logger();
        let ext_instance = io::read_instance(Path::new("../assets/foam_overflow.json")).unwrap();
        let instance = import_instance(&ext_instance).unwrap();

        let result = solve(&instance, test_config(None));
        //four 45x45 blocks per 100x100 sheet
        assert_eq!(result.layout.n_sheets(), 3);
        assert_eq!(result.layout.n_placed(), 10);
        //the strip is reported as infeasible, not as overflow
        assert_eq!(result.layout.n_unplaced(Infeasibility::ExceedsSheet), 1);
        assert_eq!(result.layout.n_unplaced(Infeasibility::SheetLimitReached), 0);
    }

    #[test]
    fn sheet_cap_is_enforced() {
        init_logger();
        let ext_instance = io::read_instance(Path::new("../assets/foam_overflow.json")).unwrap();
        let instance = import_instance(&ext_instance).unwrap();

        let result = solve(&instance, test_config(Some(2)));
        assert_eq!(result.layout.n_sheets(), 2);
        assert_eq!(result.layout.n_placed(), 8);
        assert_eq!(result.layout.n_unplaced(Infeasibility::SheetLimitReached), 2);
        assert!(result.fitness >= FAILURE_PENALTY);
    }

    #[test]
    fn empty_part_list() {
        let sheet = Sheet::rectangle(None, 100.0, 100.0, 0.0, 0.0).unwrap();
        let instance = Instance::new(vec![], sheet).unwrap();

        let result = solve(&instance, test_config(None));
        assert_eq!(result.layout.n_sheets(), 0);
        assert_eq!(result.fitness, 0.0);
    }

    #[test]
    fn single_part_uses_one_sheet() {
        let sheet = Sheet::rectangle(None, 100.0, 100.0, 0.0, 0.0).unwrap();
        let instance = Instance::new(vec![rect_part(0, 30.0, 20.0, 1)], sheet).unwrap();

        let result = solve(&instance, test_config(None));
        assert_eq!(result.layout.n_sheets(), 1);
        assert_eq!(result.layout.n_placed(), 1);
    }

    #[test]
    fn compatible_rectangles_share_a_sheet() {
        let sheet = Sheet::rectangle(None, 100.0, 50.0, 0.0, 0.0).unwrap();
        let instance = Instance::new(vec![rect_part(0, 60.0, 50.0, 1), rect_part(1, 40.0, 50.0, 1)], sheet).unwrap();
        let cache = NfpCache::new();
        let solver = PlacementSolver::new(&instance, &cache, PlacementConfig::default(), None);

        let candidate = Candidate::by_area(&instance, &instance.feasible_instances());
        let layout = solver.layout(&candidate).unwrap();
        assert_eq!(layout.n_sheets(), 1);
        assert_eq!(layout.n_placed(), 2);
    }

    #[test]
    fn holes_reach_the_solution() {
        let ext_instance = io::read_instance(Path::new("../assets/foam_orders.json")).unwrap();
        let instance = import_instance(&ext_instance).unwrap();
        let result = solve(&instance, test_config(None));

        let solution = export_solution(&result.layout, &instance, result.fitness, result.stats.elapsed);
        let slots = solution
            .sheets
            .iter()
            .flat_map(|s| s.placements.iter())
            .filter(|p| p.name == "handle_slot")
            .collect_vec();
        assert!(!slots.is_empty());
        assert!(slots.iter().all(|p| p.holes.len() == 1));
    }

    #[test]
    fn stick_fitting_only_when_tilted_is_nested() {
        let sheet = Sheet::rectangle(None, 100.0, 40.0, 0.0, 0.0).unwrap();
        let outline = SPolygon::from(Rect::try_new(0.0, 0.0, 105.0, 1.0).unwrap());
        let stick = Part::try_new(0, "stick".into(), None, 1, outline, RotationSet::Continuous, 0.0).unwrap();
        let instance = Instance::new(vec![stick], sheet).unwrap();

        let result = solve(&instance, test_config(None));
        assert_eq!(result.layout.n_placed(), 1);
        assert_eq!(result.layout.n_unplaced(Infeasibility::ExceedsSheet), 0);
        assert!(assertions::layout_is_valid(&instance, &result.layout));
    }

    #[test]
    fn same_seed_same_layout() {
        let ext_instance = io::read_instance(Path::new("../assets/foam_orders.json")).unwrap();
        let instance = import_instance(&ext_instance).unwrap();
        let config = test_config(None);

        let a = solve(&instance, config);
        let b = solve(&instance, config);
        assert_eq!(a.fitness, b.fitness);
        assert_eq!(
            a.layout.placements().copied().collect_vec(),
            b.layout.placements().copied().collect_vec()
        );
    }

    /// Star-shaped (hence simple, generally non-convex) polygon around the origin
    fn star_polygon() -> impl Strategy<Value = SPolygon> {
        (3usize..7).prop_flat_map(|n| {
            prop::collection::vec(3.0f64..12.0, 2 * n).prop_map(move |radii| {
                let points = radii
                    .iter()
                    .enumerate()
                    .map(|(i, r)| {
                        let angle = PI * i as f64 / n as f64;
                        Point(r * angle.cos(), r * angle.sin())
                    })
                    .collect_vec();
                SPolygon::try_new(points).unwrap()
            })
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        /// Whatever the part shapes and the candidate, placements never overlap and stay on their sheet
        #[test]
        fn layouts_are_valid(
            shapes in prop::collection::vec((star_polygon(), 1usize..4), 1..4),
            seed in any::<u64>(),
        ) {
            let parts = shapes
                .into_iter()
                .enumerate()
                .map(|(id, (outline, qty))| {
                    Part::try_new(id, format!("star_{id}"), None, qty, outline, RotationSet::default(), 0.0).unwrap()
                })
                .collect_vec();
            let sheet = Sheet::rectangle(None, 60.0, 40.0, 1.0, 0.0).unwrap();
            let instance = Instance::new(parts, sheet).unwrap();
            let cache = NfpCache::new();
            let solver = PlacementSolver::new(&instance, &cache, PlacementConfig::default(), None);

            let mut rng = SmallRng::seed_from_u64(seed);
            let candidate = Candidate::random(&instance, &instance.feasible_instances(), 0.1, &mut rng);
            let layout = solver.layout(&candidate).unwrap();

            prop_assert!(assertions::layout_is_valid(&instance, &layout));
            prop_assert_eq!(layout.n_placed(), instance.n_instances());
        }
    }
}
