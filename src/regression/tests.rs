// End-to-end tests for the comparison pipeline
//
// Scenarios are modeled on real benchmark suites: parameterized test
// cases, repeated batches, noisy timings with occasional spikes.

use super::*;
use crate::test_case_id::TestCaseId;

fn set(name: &str, values: &[f64]) -> RawSampleSet {
    RawSampleSet::new(name, values.to_vec())
}

fn stable(base: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| base + (i % 5) as f64 * 0.1).collect()
}

fn seeded() -> DiffSettings {
    DiffSettings {
        seed: Some(1),
        ..DiffSettings::default()
    }
}

/// Scenario: identical distributions before and after
/// Expected: no change reported
#[test]
fn test_unchanged_test_case() {
    let before = vec![set("Suite.Parse(Size: 10)", &stable(10.0, 20))];
    let after = vec![set("Suite.Parse(Size: 10)", &stable(10.0, 20))];

    let results = compute(&before, &after, &seeded()).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].change_description(), Some(ChangeDescription::NoChange));
}

/// Scenario: a code change doubles the runtime of one case
/// Expected: only that case is flagged as regressed
#[test]
fn test_single_regression_among_stable_cases() {
    let before = vec![
        set("Suite.Parse(Size: 10)", &stable(10.0, 20)),
        set("Suite.Parse(Size: 100)", &stable(100.0, 20)),
    ];
    let after = vec![
        set("Suite.Parse(Size: 10)", &stable(10.0, 20)),
        set("Suite.Parse(Size: 100)", &stable(200.0, 20)),
    ];

    let results = compute(&before, &after, &seeded()).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].test_case_id, TestCaseId::parse("Suite.Parse(Size: 10)"));
    assert_eq!(results[0].change_description(), Some(ChangeDescription::NoChange));
    assert_eq!(results[1].change_description(), Some(ChangeDescription::Regressed));
}

/// Scenario: the after run is faster for every test type
/// Expected: each test reports an improvement
#[test]
fn test_improvement_detected_by_every_test_type() {
    let before = vec![set("Suite.Hash", &stable(50.0, 30))];
    let after = vec![set("Suite.Hash", &stable(25.0, 30))];

    for test_type in [
        TestType::TTest,
        TestType::RankSum,
        TestType::SignedRank,
        TestType::KolmogorovSmirnov,
    ] {
        let settings = seeded().with_test_type(test_type).with_alpha(0.01);
        let results = compute(&before, &after, &settings).unwrap();
        assert_eq!(
            results[0].change_description(),
            Some(ChangeDescription::Improved),
            "{test_type}"
        );
    }
}

/// Scenario: test case only present in the after run
/// Expected: skipped, nothing to compare against
#[test]
fn test_new_test_case_is_skipped() {
    let before = vec![set("Suite.Old", &stable(1.0, 10))];
    let after = vec![
        set("Suite.Old", &stable(1.0, 10)),
        set("Suite.New", &stable(1.0, 10)),
    ];

    let results = compute(&before, &after, &seeded()).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].test_case_id.name(), "Suite.Old");
}

/// Scenario: fewer than three values on one side
/// Expected: skipped rather than failed
#[test]
fn test_too_few_samples_skipped() {
    let before = vec![set("Suite.Tiny", &[1.0, 2.0])];
    let after = vec![set("Suite.Tiny", &[1.0, 2.0, 3.0])];
    assert!(compute(&before, &after, &seeded()).unwrap().is_empty());
}

/// Scenario: batches of the same case spread over several sets
/// Expected: batches are concatenated before testing
#[test]
fn test_batches_are_aggregated() {
    let before = vec![
        set("Suite.Io(N: 1)", &[5.0, 5.1]),
        set("suite.io(N: 1)", &[5.2, 5.0]),
    ];
    let after = vec![set("Suite.Io(N: 1)", &[5.0, 5.1, 5.2])];

    let results = compute(&before, &after, &seeded()).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].raw_before().len(), 4);
    assert_eq!(results[0].raw_after().len(), 3);
}

/// Scenario: constant samples make the t statistic undefined
/// Expected: no crash, a result is still produced for the case
#[test]
fn test_degenerate_samples_do_not_abort_batch() {
    let before = vec![
        set("Suite.Const", &[1.0, 1.0, 1.0, 1.0]),
        set("Suite.Ok", &stable(3.0, 10)),
    ];
    let after = vec![
        set("Suite.Const", &[1.0, 1.0, 1.0, 1.0]),
        set("Suite.Ok", &stable(3.0, 10)),
    ];

    let results = compute(&before, &after, &seeded()).unwrap();
    assert_eq!(results.len(), 2);
}

/// Scenario: parameterized cases finishing in arbitrary order
/// Expected: results sorted numerically by variable value
#[test]
fn test_results_are_ordered_by_identity() {
    let names = ["T(N: 100)", "T(N: 2)", "T(N: 10)", "A.First"];
    let before: Vec<RawSampleSet> = names.iter().map(|n| set(n, &stable(1.0, 10))).collect();
    let after = before.clone();

    let results = compute(&before, &after, &seeded()).unwrap();
    let order: Vec<String> = results.iter().map(|r| r.test_case_id.display_name()).collect();
    assert_eq!(order, vec!["A.First", "T(N: 2)", "T(N: 10)", "T(N: 100)"]);
}

/// Scenario: more test cases than the ordering guard
/// Expected: every case is still reported
#[test]
fn test_large_batches_skip_ordering() {
    let before: Vec<RawSampleSet> = (0..ORDERING_LIMIT + 5)
        .map(|i| set(&format!("T(N: {i})"), &stable(1.0, 5)))
        .collect();
    let after = before.clone();
    let settings = DiffSettings {
        max_degree_of_parallelism: 8,
        ..seeded()
    };

    let results = compute(&before, &after, &settings).unwrap();
    assert_eq!(results.len(), ORDERING_LIMIT + 5);
}

/// Scenario: invalid configuration
/// Expected: rejected before any work is scheduled
#[test]
fn test_invalid_settings_rejected() {
    let settings = seeded().with_alpha(2.0);
    assert!(compute(&[], &[], &settings).is_err());
}

/// Scenario: outlier spikes in the after run only
/// Expected: spikes are reported and the case is not flagged
#[test]
fn test_spikes_are_reported_as_outliers() {
    let mut noisy = stable(10.0, 20);
    noisy.push(400.0);
    let before = vec![set("Suite.Spiky", &stable(10.0, 20))];
    let after = vec![set("Suite.Spiky", &noisy)];

    let results = compute(&before, &after, &seeded()).unwrap();
    let outliers = results[0].outliers_after.as_ref().unwrap();
    assert_eq!(outliers.upper_outliers, vec![400.0]);
    assert_eq!(results[0].change_description(), Some(ChangeDescription::NoChange));
}
