//! Full runs where every tool succeeds

use crate::helpers::*;
use clade_exclusive::core::{ExclusivityThresholds, ExecutionStatus, GenomeTree};
use clade_exclusive::execution::SchedulingStrategy;

#[tokio::test]
async fn test_root_with_two_children() {
    let fixture = Fixture::new(&["R", "G1", "G2"]);
    let tree = GenomeTree::from_newick("(G1,G2)R;").unwrap();
    let runner = FakeToolRunner::new();

    let report = run_with_fake(
        &fixture,
        &tree,
        ExclusivityThresholds::new(0, None),
        runner.clone(),
        SchedulingStrategy::Parallel,
    )
    .await;

    assert!(report.is_success(), "failures: {:?}", report.failures());
    assert_eq!(report.status, ExecutionStatus::Completed);

    let region_calls = runner.calls_to(FIND_REGIONS);
    assert_eq!(region_calls.len(), 1);
    let args = &region_calls[0].invocation.args;
    assert_eq!(
        &args[..4],
        &["--maxOutgroupGenomes", "0", "--minIngroupGenomes", "3"]
    );
    assert_eq!(args[4], "primates.hal");
    assert_eq!(args[5], "R");
    assert_eq!(args[6], "R,G1,G2");
    assert_eq!(
        region_calls[0].invocation.stdout.as_deref(),
        Some(fixture.clade_dir("R").join("R.bed").as_path())
    );

    let mut targets: Vec<String> = runner
        .calls_to(LIFTOVER)
        .into_iter()
        .map(|c| c.invocation.args[3].clone())
        .collect();
    targets.sort();
    assert_eq!(targets, vec!["G1", "G2"]);
    assert_eq!(runner.calls_to(BED_TO_BIG_BED).len(), 3);

    assert_eq!(fixture.files_in("R"), vec!["G1.bb", "G2.bb", "R.bb"]);
    assert!(!fixture.clade_dir("G1").exists());
    assert!(!fixture.clade_dir("G2").exists());

    // 1 clade task, 2 liftovers, 1 cleanup
    assert_eq!(report.records.len(), 4);
    assert_completed(&report, &cleanup_kind("R"));
}

#[tokio::test]
async fn test_every_clade_gets_one_track_per_member() {
    let genomes = ["R", "X", "Y", "A", "B", "C", "D", "E"];
    let fixture = Fixture::new(&genomes);
    let tree = GenomeTree::from_newick("((A,B)X,(C,D,E)Y)R;").unwrap();
    let runner = FakeToolRunner::new();

    let report = run_with_fake(
        &fixture,
        &tree,
        ExclusivityThresholds::default(),
        runner.clone(),
        SchedulingStrategy::LimitedParallel(2),
    )
    .await;

    assert!(report.is_success(), "failures: {:?}", report.failures());

    for (root, size) in [("R", 8), ("X", 3), ("Y", 4)] {
        assert_eq!(fixture.files_with_ext(root, "bb").len(), size, "clade {}", root);
        assert!(fixture.files_with_ext(root, "bed").is_empty(), "clade {}", root);
    }
    for leaf in ["A", "B", "C", "D", "E"] {
        assert!(!fixture.clade_dir(leaf).exists());
    }

    // Liftovers only go to strict descendants, so 7 + 2 + 3
    assert_eq!(runner.calls_to(LIFTOVER).len(), 12);
}

#[tokio::test]
async fn test_thresholds_are_clamped_to_clade_size() {
    let fixture = Fixture::new(&["R", "G1", "G2"]);
    let tree = GenomeTree::from_newick("(G1,G2)R;").unwrap();
    let runner = FakeToolRunner::new();

    let report = run_with_fake(
        &fixture,
        &tree,
        ExclusivityThresholds::new(10, Some(2)),
        runner.clone(),
        SchedulingStrategy::Parallel,
    )
    .await;

    assert!(report.is_success());
    let args = &runner.calls_to(FIND_REGIONS)[0].invocation.args;
    assert_eq!(args[1], "2");
    assert_eq!(args[3], "2");
}

#[tokio::test]
async fn test_liftover_indexes_with_target_chrom_sizes() {
    let fixture = Fixture::new(&["R", "G1"]);
    let tree = GenomeTree::from_newick("(G1)R;").unwrap();
    let runner = FakeToolRunner::new();

    let report = run_with_fake(
        &fixture,
        &tree,
        ExclusivityThresholds::default(),
        runner.clone(),
        SchedulingStrategy::Sequential,
    )
    .await;
    assert!(report.is_success());

    let hub = fixture.tmp.path().join("hub");
    let conversions = runner.calls_to(BED_TO_BIG_BED);
    let target_call = conversions
        .iter()
        .find(|c| c.invocation.args[2].ends_with("G1.bb"))
        .expect("conversion for G1");
    assert_eq!(
        target_call.invocation.args[1],
        hub.join("G1").join("chrom.sizes").to_string_lossy()
    );
}
