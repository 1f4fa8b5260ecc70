//! Integration tests for the demo helpers.

use ketra_demos::{histogram_bar, linear_options, top_fraction_threshold};
use ketra_engine::{Engine, EngineConfig};

/// Bars are always `width` cells wide.
#[test]
fn test_histogram_bar_width() {
    assert_eq!(histogram_bar(0.0, 10), "··········");
    assert_eq!(histogram_bar(1.0, 10), "██████████");
    assert_eq!(histogram_bar(0.5, 4), "██··");
    assert_eq!(histogram_bar(2.0, 3).chars().count(), 3);
}

/// Synthetic options are reproducible and keep the linear trend.
#[test]
fn test_linear_options() {
    let a = linear_options(200, 2.0, 9);
    let b = linear_options(200, 2.0, 9);
    assert_eq!(a, b);
    assert_eq!(a.len(), 200);
    assert!(a["design-000199"] > a["design-000000"]);

    let exact = linear_options(5, 0.0, 1);
    assert_eq!(exact["design-000003"], 3.0);
}

/// The top-5% threshold of 0..100 is 95.
#[test]
fn test_top_fraction_threshold() {
    let options = linear_options(100, 0.0, 0);
    assert_eq!(top_fraction_threshold(&options, 0.05), Some(95.0));
    assert_eq!(top_fraction_threshold(&options, 0.0), Some(99.0));
    assert_eq!(top_fraction_threshold(&Default::default(), 0.05), None);
}

/// The demo pipeline: a seeded explorer over 1000 noisy linear options.
#[test]
fn test_explore_pipeline_hits_top_five_percent() {
    let mut config = EngineConfig::default();
    config.explorer.seed = Some(2025);
    let engine = Engine::new(config).unwrap();

    let options = linear_options(1000, 5.0, 2025);
    let threshold = top_fraction_threshold(&options, 0.05).unwrap();
    let hits = (0..50)
        .filter(|_| {
            let result = engine.explore_designs(&options).unwrap();
            options[&result.best_option] >= threshold
        })
        .count();
    assert!(hits >= 42, "hits = {hits}");
}
