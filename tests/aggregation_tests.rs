// End-to-end comparison tests through the public API
//
// These drive `regression::compute` the way the binary does: before/after
// collections of raw sample sets, settings from TOML or presets.

use benchdiff::config::BenchDiffConfig;
use benchdiff::regression::{
    aggregate, compute, extra_keys, ChangeDescription, DiffSettings, RawSampleSet,
    StatisticalTestResult, TestType,
};
use benchdiff::test_case_id::TestCaseId;

const BEFORE: [f64; 10] = [9.0, 8.0, 7.0, 6.0, 4.0, 4.0, 1.0, 2.0, 3.0, 2.0];
const AFTER: [f64; 9] = [2.0, 2.0, 4.0, 4.0, 5.0, 5.0, 6.0, 7.0, 6.0];
const NAME: &str = "MyClass.MySampleTest(N: 2, X: 4)";

fn noisy(base: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| base + ((i * 7) % 11) as f64 * 0.05).collect()
}

#[test]
fn test_welch_t_test_no_change() {
    let before = vec![RawSampleSet::new(NAME, BEFORE.to_vec())];
    let after = vec![RawSampleSet::new(NAME, AFTER.to_vec())];
    let settings = DiffSettings::default().with_alpha(0.01);

    let results = compute(&before, &after, &settings).unwrap();
    assert_eq!(results.len(), 1);

    let result = &results[0];
    assert_eq!(result.test_case_id, TestCaseId::parse(NAME));
    assert_eq!(result.p_value(), Some(0.9667));
    assert_eq!(result.statistic(), Some(0.042));
    assert_eq!(result.change_description(), Some(ChangeDescription::NoChange));

    let stats = result.test_result.statistics().unwrap();
    assert_eq!(stats.mean_before, 4.6);
    assert_eq!(stats.mean_after, 4.556);
    assert_eq!(stats.sample_size_before, 10);
    assert_eq!(stats.sample_size_after, 9);
    assert!(stats.extra.contains_key(extra_keys::DEGREES_OF_FREEDOM));

    // No value lies outside the Tukey fences on either side
    assert!(!result.outliers_before.as_ref().unwrap().has_outliers());
    assert!(!result.outliers_after.as_ref().unwrap().has_outliers());
}

#[test]
fn test_batches_split_across_sets_match_single_set() {
    let split_before = vec![
        RawSampleSet::new(NAME, BEFORE[..5].to_vec()),
        RawSampleSet::new(NAME, BEFORE[5..].to_vec()),
    ];
    let whole_before = vec![RawSampleSet::new(NAME, BEFORE.to_vec())];
    let after = vec![RawSampleSet::new(NAME, AFTER.to_vec())];
    let settings = DiffSettings::default();

    let split = compute(&split_before, &after, &settings).unwrap();
    let whole = compute(&whole_before, &after, &settings).unwrap();
    assert_eq!(split[0].p_value(), whole[0].p_value());
    assert_eq!(split[0].raw_before(), &BEFORE[..]);
}

#[test]
fn test_aggregate_reports_iterations_and_warmups() {
    let sets = vec![
        RawSampleSet::new(NAME, vec![1.0, 2.0]).with_warmup(1),
        RawSampleSet::new("Other.Test", vec![9.0]),
        RawSampleSet::new(NAME, vec![3.0]).with_warmup(2),
    ];
    let id = TestCaseId::parse(NAME);
    let compiled = aggregate(&id, &sets).unwrap();
    assert_eq!(compiled.aggregated_raw_values, vec![1.0, 2.0, 3.0]);
    assert_eq!(compiled.iteration_count, 3);
    assert_eq!(compiled.warmup_count, 3);

    assert!(aggregate(&TestCaseId::parse("Missing.Test"), &sets).is_none());
}

#[test]
fn test_ordering_is_stable_across_runs() {
    let names = [
        "Suite.Sort(Size: 1000, Kind: random)",
        "Suite.Sort(Size: 10, Kind: random)",
        "Suite.Sort(Size: 100, Kind: sorted)",
        "Suite.Hash(Size: 10)",
        "suite.alloc",
    ];
    let before: Vec<RawSampleSet> = names
        .iter()
        .map(|n| RawSampleSet::new(*n, noisy(5.0, 12)))
        .collect();
    let after: Vec<RawSampleSet> = names
        .iter()
        .rev()
        .map(|n| RawSampleSet::new(*n, noisy(5.0, 12)))
        .collect();
    let settings = DiffSettings {
        max_degree_of_parallelism: 3,
        ..DiffSettings::default()
    };

    let expected = vec![
        "suite.alloc",
        "Suite.Hash(Size: 10)",
        "Suite.Sort(Size: 10, Kind: random)",
        "Suite.Sort(Size: 100, Kind: sorted)",
        "Suite.Sort(Size: 1000, Kind: random)",
    ];
    for _ in 0..5 {
        let results = compute(&before, &after, &settings).unwrap();
        let order: Vec<String> = results
            .iter()
            .map(|r| r.test_case_id.display_name())
            .collect();
        assert_eq!(order, expected);
    }
}

#[test]
fn test_disable_ordering_keeps_every_result() {
    let before: Vec<RawSampleSet> = (0..10)
        .map(|i| RawSampleSet::new(format!("T(N: {i})"), noisy(2.0, 8)))
        .collect();
    let after = before.clone();
    let settings = DiffSettings {
        disable_ordering: true,
        ..DiffSettings::default()
    };

    let mut names: Vec<String> = compute(&before, &after, &settings)
        .unwrap()
        .iter()
        .map(|r| r.test_case_id.display_name())
        .collect();
    names.sort();
    assert_eq!(names.len(), 10);
    names.dedup();
    assert_eq!(names.len(), 10);
}

#[test]
fn test_seeded_rank_sum_is_reproducible() {
    // 40 values in total forces the bootstrap path
    let before = vec![RawSampleSet::new("Suite.Io", noisy(10.0, 20))];
    let after = vec![RawSampleSet::new("Suite.Io", noisy(10.2, 20))];
    let settings = DiffSettings {
        seed: Some(1234),
        ..DiffSettings::default().with_test_type(TestType::RankSum)
    };

    let first = compute(&before, &after, &settings).unwrap();
    let second = compute(&before, &after, &settings).unwrap();
    assert_eq!(first[0].p_value(), second[0].p_value());
    assert_eq!(first[0].statistic(), second[0].statistic());

    let stats = first[0].test_result.statistics().unwrap();
    assert_eq!(
        stats.extra.get(extra_keys::ITERATIONS).and_then(|v| v.as_u64()),
        Some(25)
    );
}

#[test]
fn test_settings_from_toml_drive_comparison() {
    let config = BenchDiffConfig::from_toml_str(
        r#"
        [diff]
        alpha = 0.05
        test_type = "ks"
        use_outlier_detection = false
        "#,
    )
    .unwrap();

    let before = vec![RawSampleSet::new("Suite.Parse", noisy(10.0, 15))];
    let after = vec![RawSampleSet::new("Suite.Parse", noisy(20.0, 15))];
    let results = compute(&before, &after, &config.diff).unwrap();

    assert_eq!(results[0].change_description(), Some(ChangeDescription::Regressed));
    assert!(results[0].outliers_before.is_none());
}

#[test]
fn test_paired_test_with_unequal_lengths_is_equalized() {
    let before = vec![RawSampleSet::new("Suite.Pair", noisy(3.0, 14))];
    let after = vec![RawSampleSet::new("Suite.Pair", noisy(3.0, 9))];
    let settings = DiffSettings {
        seed: Some(5),
        ..DiffSettings::default().with_test_type(TestType::SignedRank)
    };

    let results = compute(&before, &after, &settings).unwrap();
    assert!(matches!(
        results[0].test_result,
        StatisticalTestResult::Success(_)
    ));
    let stats = results[0].test_result.statistics().unwrap();
    assert_eq!(stats.sample_size_before, 14);
    assert_eq!(stats.sample_size_after, 9);
    assert!(stats.extra.contains_key(extra_keys::EXACT));
}

#[test]
fn test_value_case_differences_merge_into_one_case() {
    let before = vec![
        RawSampleSet::new("Suite.Bench(Mode: Fast)", noisy(4.0, 6)),
        RawSampleSet::new("Suite.Bench(Mode: fast)", noisy(4.0, 6)),
    ];
    let after = vec![
        RawSampleSet::new("Suite.Bench(Mode: FAST)", noisy(4.0, 6)),
        RawSampleSet::new("suite.bench(mode: fast)", noisy(4.0, 6)),
    ];

    let results = compute(&before, &after, &DiffSettings::default()).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].raw_before().len(), 12);
}
