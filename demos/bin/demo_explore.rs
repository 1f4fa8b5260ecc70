//! Design Exploration Demo
//!
//! Runs the explorer repeatedly over synthetic option sets whose scores rise
//! linearly with noise, and reports how often the pick lands in the top 5%
//! together with how the runtime grows with the option count.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use ketra_demos::{
    create_progress_bar, init_logging, linear_options, print_header, print_info, print_result,
    print_section, print_success, print_warning, top_fraction_threshold,
};
use ketra_engine::{Engine, EngineConfig};

#[derive(Parser, Debug)]
#[command(name = "demo-explore")]
#[command(about = "Run the stochastic design explorer on synthetic option sets")]
struct Args {
    /// Option counts to explore
    #[arg(short, long, value_delimiter = ',', default_value = "1000,10000")]
    sizes: Vec<usize>,

    /// Explorations per option set
    #[arg(short, long, default_value = "100")]
    trials: u32,

    /// Half-width of the uniform noise added to each score
    #[arg(long, default_value = "5.0")]
    noise: f64,

    /// Seed for option generation and the explorer
    #[arg(long, default_value = "2025")]
    seed: u64,

    /// YAML configuration file
    #[arg(short, long, env = "KETRA_CONFIG")]
    config: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = match args.config.as_deref() {
        Some(path) => EngineConfig::from_file(path).context("failed to read configuration")?,
        None => EngineConfig::default(),
    };
    config.explorer.seed = Some(args.seed);
    let engine = Engine::new(config)?;

    print_header("Stochastic Design Explorer Demo");

    print_section("Explorer");
    let explorer = engine.explorer().config();
    print_result("Sharpness", explorer.sharpness);
    print_result("Interference strength", explorer.interference_strength);
    print_result("Tunneling probability", explorer.tunneling_probability);
    print_result("Seed", args.seed);
    print_info("Classical heuristic: weighted sampling, neighbourhood boost, random escape");

    let mut timings: Vec<(usize, Duration)> = Vec::new();

    for &size in &args.sizes {
        if size == 0 {
            print_warning("Skipping empty option set");
            continue;
        }

        print_section(&format!("{size} Options"));
        let options = linear_options(size, args.noise, args.seed);
        let threshold = top_fraction_threshold(&options, 0.05).unwrap_or(f64::NEG_INFINITY);

        let pb = create_progress_bar(u64::from(args.trials), "exploring");
        let mut hits = 0u32;
        let mut tunneled = 0u32;
        let mut confidence = 0.0;
        let start = Instant::now();
        for _ in 0..args.trials {
            let result = engine.explore_designs(&options)?;
            if options.get(&result.best_option).is_some_and(|&s| s >= threshold) {
                hits += 1;
            }
            if result.tunneled {
                tunneled += 1;
            }
            confidence += result.confidence;
            pb.inc(1);
        }
        let elapsed = start.elapsed();
        pb.finish_and_clear();

        let trials = f64::from(args.trials.max(1));
        print_result("Top-5% hits", format!("{hits}/{}", args.trials));
        print_result("Tunneling passes", tunneled);
        print_result("Mean confidence", format!("{:.4}", confidence / trials));
        print_result(
            "Time per exploration",
            format!("{:.3?}", elapsed / args.trials.max(1)),
        );
        timings.push((size, elapsed));
    }

    if let [(small_n, small_t), .., (large_n, large_t)] = timings.as_slice() {
        print_section("Scaling");
        let ratio = large_t.as_secs_f64() / small_t.as_secs_f64().max(f64::EPSILON);
        print_result(
            "Runtime ratio",
            format!(
                "{ratio:.1}x for {:.0}x options",
                *large_n as f64 / *small_n as f64
            ),
        );
    }

    println!();
    print_success("Exploration demo complete!");
    Ok(())
}
