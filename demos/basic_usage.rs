//! Basic usage example for the iffd library.
//!
//! This example screens the three inputs of the Ishigami test function,
//! a standard benchmark for sensitivity analysis:
//!
//! y = sin(x1) + 7 sin²(x2) + 0.1 x3⁴ sin(x1), with every x in [-π, π].
//!
//! x1 and x2 have strong main effects, x3 acts only through its interaction
//! with x1. Run with `RUST_LOG=iffd=debug` to see the library's events.

use std::f64::consts::PI;

use iffd::anova::{analyze, AnalysisReport, BootstrapConfig};
use iffd::design::verify_design;
use iffd::{par_bootstrap, IffdBuilder};
use ndarray::ArrayView1;
use tracing_subscriber::EnvFilter;

fn ishigami(x: ArrayView1<'_, f64>) -> f64 {
    x[0].sin() + 7.0 * x[1].sin().powi(2) + 0.1 * x[2].powi(4) * x[0].sin()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("IFFD Library - Basic Usage Example\n");

    // 100 replicates of a folded order-20 Hadamard design, 15 baseline
    // replicates per parameter
    let design = IffdBuilder::new()
        .parameter(-PI, PI)
        .parameter(-PI, PI)
        .parameter(-PI, PI)
        .replicates(100)
        .order(20)
        .zero_replicates(15)
        .seed(2024)
        .build()
        .expect("Failed to generate design");

    println!("Design:");
    println!("  Samples: {}", design.nsample());
    println!("  Parameters: {}", design.nparam());
    println!("  Rows per replicate block: {}", design.block_rows());

    let report = verify_design(&design);
    if report.is_valid {
        println!("✓ Design verified");
    } else {
        println!("✗ Design failed verification");
        for issue in &report.issues {
            println!("  Issue: {issue}");
        }
    }
    println!();

    // Evaluate the model once per sample row
    let responses: Vec<f64> = design
        .samples()
        .rows()
        .into_iter()
        .map(ishigami)
        .collect();

    let result = analyze(&responses, design.levels()).expect("Analysis failed");
    let ci = par_bootstrap(&responses, design.levels(), &BootstrapConfig::default())
        .expect("Bootstrap failed");

    println!(
        "{}",
        AnalysisReport::new(&result)
            .with_ci(&ci)
            .with_names(["x1", "x2", "x3"])
    );

    println!("Ranking:");
    for (rank, entry) in result.ranked().iter().enumerate() {
        println!("  {}. {} (F = {:.2})", rank + 1, entry.effect, entry.f_value());
    }
}
