//! Ketra Demo Suite
//!
//! Console front-ends for the engine:
//!
//! - **demo-entangle**: prepares Bell and GHZ states gate by gate and shows
//!   the sampled histogram next to the exact distribution
//! - **demo-explore**: runs the design explorer over synthetic option sets
//!   and reports how often it lands in the top 5%
//!
//! This crate holds the shared presentation helpers.

use std::collections::BTreeMap;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

/// Install a `tracing` subscriber. `RUST_LOG` wins over the verbosity count.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Create a progress bar for demo operations.
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let bar_style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-");
    pb.set_style(bar_style);
    pb.set_message(message.to_string());
    pb
}

/// Print a demo header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", style("═".repeat(60)).cyan());
    println!("{}", style(format!("  {title}")).cyan().bold());
    println!("{}", style("═".repeat(60)).cyan());
    println!();
}

/// Print a demo section.
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("▶ {title}")).green().bold());
    println!("{}", style("─".repeat(40)).dim());
}

/// Print a result line.
pub fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{label}:")).dim(), value);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("ℹ").blue(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("⚠").yellow().bold(), message);
}

/// A horizontal bar of `width` cells filled in proportion to `fraction`.
pub fn histogram_bar(fraction: f64, width: usize) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "·".repeat(width - filled))
}

/// Print one histogram row: label, bar, percentage.
pub fn print_histogram_row(label: &str, fraction: f64) {
    println!(
        "  {} {} {:>6.2}%",
        style(label).bold(),
        style(histogram_bar(fraction, 30)).cyan(),
        fraction * 100.0
    );
}

/// Synthetic option set: scores rise linearly with the option index plus
/// uniform noise in `[-noise, noise]`.
pub fn linear_options(count: usize, noise: f64, seed: u64) -> BTreeMap<String, f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let jitter = if noise > 0.0 {
                rng.gen_range(-noise..=noise)
            } else {
                0.0
            };
            (format!("design-{i:06}"), i as f64 + jitter)
        })
        .collect()
}

/// Score at or above which an option is in the top `fraction` of `options`.
pub fn top_fraction_threshold(options: &BTreeMap<String, f64>, fraction: f64) -> Option<f64> {
    let mut scores: Vec<f64> = options.values().copied().collect();
    if scores.is_empty() {
        return None;
    }
    scores.sort_by(|a, b| b.total_cmp(a));
    let keep = ((scores.len() as f64 * fraction).ceil() as usize).clamp(1, scores.len());
    Some(scores[keep - 1])
}
