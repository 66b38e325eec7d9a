use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use foamnest::io::export::export_solution;
use foamnest::io::import::import_instance;
use foamnest::io::svg::layout_to_svg;
use gbl::config::GblConfig;
use gbl::io;
use gbl::io::cli::Cli;
use gbl::io::output::GblOutput;
use gbl::opt::search::GeneticSearch;
use log::{info, warn};
use rand::SeedableRng;
use rand::prelude::SmallRng;

fn main() -> Result<()> {
    let args = Cli::parse();
    io::init_logger(args.log_level)?;

    let config: GblConfig = match &args.config_file {
        None => {
            warn!("[MAIN] No config file provided, use --config-file to provide a custom config");
            GblConfig::default()
        }
        Some(config_file) => io::read_json(config_file).context("incorrect config file format")?,
    };
    config.validate().context("invalid config")?;
    info!("[MAIN] Successfully parsed GblConfig: {config:?}");

    let input_stem = args
        .input_file
        .file_stem()
        .and_then(|s| s.to_str())
        .context("input file has no valid name")?;

    if !args.solution_folder.exists() {
        fs::create_dir_all(&args.solution_folder).with_context(|| {
            format!("could not create solution folder: {:?}", args.solution_folder)
        })?;
    }

    let ext_instance = io::read_instance(&args.input_file)?;
    let instance = import_instance(&ext_instance)?;

    let rng = match config.prng_seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };
    let result = GeneticSearch::new(&instance, config, rng).solve()?;

    let output = GblOutput {
        solution: export_solution(&result.layout, &instance, result.fitness, result.stats.elapsed),
        instance: ext_instance,
        config,
    };
    let solution_path = args.solution_folder.join(format!("sol_{input_stem}.json"));
    io::write_json(&output, Path::new(&solution_path))?;

    for sl in result.layout.sheets.iter() {
        let svg_path = args
            .solution_folder
            .join(format!("sol_{input_stem}_{}.svg", sl.index));
        let svg = layout_to_svg(sl, &instance, config.svg_draw_options);
        io::write_svg(&svg, Path::new(&svg_path))?;
    }

    Ok(())
}
