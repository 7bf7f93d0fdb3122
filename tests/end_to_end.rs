//! Full design -> response -> analysis runs.

use iffd::anova::{analyze, bootstrap, AnalysisReport, BootstrapConfig, Degeneracy, Effect};
use iffd::design::{verify_design, Level};
use iffd::{Design, IffdBuilder};

fn design_with_baselines(seed: u64, zero_replicates: usize) -> Design {
    IffdBuilder::new()
        .parameter(0.0, 1.0)
        .parameter(0.0, 1.0)
        .replicates(100)
        .order(20)
        .zero_replicates(zero_replicates)
        .seed(seed)
        .build()
        .unwrap()
}

fn reference_design(seed: u64) -> Design {
    design_with_baselines(seed, 15)
}

/// Enough baselines that both parameters share some, so all nine joint
/// cells are populated.
fn dense_design(seed: u64) -> Design {
    design_with_baselines(seed, 40)
}

fn responses(design: &Design, model: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    design
        .samples()
        .rows()
        .into_iter()
        .map(|x| model(x[0], x[1]))
        .collect()
}

#[test]
fn test_product_response_scenario() {
    let design = reference_design(2024);
    assert_eq!(design.nsample(), 4000);
    assert!(verify_design(&design).is_valid);

    let y = responses(&design, |a, b| a * b);
    let result = analyze(&y, design.levels()).unwrap();

    let f = result.f_values();
    assert_eq!(f.len(), 3);
    // The two baseline sets may not overlap, leaving the central joint cell
    // empty; that is the only degeneracy allowed here
    for (entry, value) in result.effects.iter().zip(&f) {
        match entry.degeneracy {
            None => assert!(value.is_finite() && *value >= 0.0, "{f:?}"),
            Some(reason) => {
                assert_eq!(reason, Degeneracy::EmptyCell);
                assert!(!entry.effect.is_main());
            }
        }
    }

    let config = BootstrapConfig {
        resamples: 100,
        seed: 7,
        ..Default::default()
    };
    let ci = bootstrap(&y, design.levels(), &config).unwrap();
    assert_eq!(ci.len(), 3);
    for (k, entry) in result.effects.iter().enumerate() {
        if !entry.is_degenerate() {
            assert!(ci.half_widths[k].is_finite() && ci.half_widths[k] >= 0.0);
            assert_eq!(ci.valid_resamples[k], 100);
        }
    }

    let report = AnalysisReport::new(&result).with_ci(&ci).to_string();
    assert!(report.contains("Parameter 0:"));
    assert!(report.contains("Parameters 0 & 1:"));
}

#[test]
fn test_centred_product_is_an_interaction() {
    let design = dense_design(5);
    let y = responses(&design, |a, b| (a - 0.5) * (b - 0.5));
    let result = analyze(&y, design.levels()).unwrap();

    let inter = result.entry(Effect::Interaction(0, 1)).f_value();
    let main0 = result.entry(Effect::Main(0)).f_value();
    let main1 = result.entry(Effect::Main(1)).f_value();
    assert!(inter > 5.0 * main0, "interaction {inter} vs main {main0}");
    assert!(inter > 5.0 * main1, "interaction {inter} vs main {main1}");
    assert!(result.r2_total > result.r2_main);
}

#[test]
fn test_main_effects_rank_by_influence() {
    let design = IffdBuilder::new()
        .bounds(vec![iffd::ParameterBound::new(0.0, 1.0); 4])
        .replicates(60)
        .order(12)
        .zero_replicates(6)
        .seed(11)
        .build()
        .unwrap();

    let y: Vec<f64> = design
        .samples()
        .rows()
        .into_iter()
        .map(|x| 8.0 * x[2] + 4.0 * x[0] + 0.1 * x[3])
        .collect();
    let result = analyze(&y, design.levels()).unwrap();
    assert_eq!(result.f_values().len(), 4 + 6);

    // The design is not orthogonal, so interactions pick up some leakage;
    // compare main effects only
    let ranked: Vec<Effect> = result
        .ranked()
        .iter()
        .map(|e| e.effect)
        .filter(|e| e.is_main())
        .collect();
    assert_eq!(ranked[0], Effect::Main(2));
    assert_eq!(ranked[1], Effect::Main(0));
}

#[test]
fn test_constant_response_is_flagged_not_fatal() {
    let design = reference_design(1);
    let y = vec![3.25; design.nsample()];

    let result = analyze(&y, design.levels()).unwrap();
    assert_eq!(result.degenerate_count(), 3);
    assert!(result.f_values().iter().all(|f| f.is_nan()));

    let report = AnalysisReport::new(&result).to_string();
    assert!(report.contains("F undefined (zero total variance)"));
}

#[test]
fn test_design_is_reproducible() {
    let a = reference_design(77);
    let b = reference_design(77);
    assert_eq!(a.samples(), b.samples());
    assert_eq!(a.levels(), b.levels());
    assert_eq!(a.groups(), b.groups());
}

#[test]
fn test_baseline_blocks_per_parameter() {
    let design = reference_design(3);
    let block = design.block_rows();

    for param in 0..design.nparam() {
        let baselines = (0..100)
            .filter(|rep| {
                (0..block).all(|k| design.levels()[[rep * block + k, param]] == Level::Mid)
            })
            .count();
        assert_eq!(baselines, 15);
    }
}

#[test]
fn test_filtered_design_still_analyses() {
    let design = dense_design(8);
    let feasible = design.retain_rows(|x| x[0] + x[1] <= 1.6);
    assert!(feasible.nsample() < design.nsample());

    let y = responses(&feasible, |a, b| a + b * b);
    let result = analyze(&y, feasible.levels()).unwrap();
    assert_eq!(result.samples, feasible.nsample());
    assert!(result.f_values().iter().all(|f| f.is_finite()));
}

#[test]
fn test_no_baselines_leaves_central_level_empty() {
    let design = design_with_baselines(4, 0);
    assert!(design.levels().iter().all(|&l| l != Level::Mid));

    let y = responses(&design, |a, b| a * b);
    let result = analyze(&y, design.levels()).unwrap();
    for param in 0..2 {
        let entry = result.entry(Effect::Main(param));
        assert_eq!(entry.empty_cells, 1);
        assert_eq!(entry.degeneracy, Some(Degeneracy::EmptyCell));
    }
    let inter = result.entry(Effect::Interaction(0, 1));
    assert_eq!(inter.empty_cells, 5);
    assert!(inter.f_ratio.is_none());

    let report = AnalysisReport::new(&result).to_string();
    assert!(report.contains("Parameter 0: F undefined (empty level or joint cell) [1 empty cells]"));
}

#[test]
fn test_all_baselines_leaves_only_central_level() {
    let design = design_with_baselines(4, 100);
    assert!(design.levels().iter().all(|&l| l == Level::Mid));
    assert!(verify_design(&design).is_valid);

    let y = responses(&design, |a, b| a + b);
    let result = analyze(&y, design.levels()).unwrap();
    assert_eq!(result.degenerate_count(), 3);
    assert_eq!(result.entry(Effect::Main(0)).empty_cells, 2);
    assert_eq!(result.entry(Effect::Interaction(0, 1)).empty_cells, 8);
    assert!(result.f_values().iter().all(|f| f.is_nan()));
}
