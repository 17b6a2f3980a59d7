//! Single-genome clades, reruns and shared directories

use crate::helpers::*;
use clade_exclusive::core::{ExclusivityThresholds, GenomeTree, PipelineError, TaskKind};
use clade_exclusive::execution::{ExecutionEngine, SchedulingStrategy};

#[tokio::test]
async fn test_star_of_singletons_submits_nothing() {
    let fixture = Fixture::new(&["A", "B", "C"]);
    let enumerator = clades(&[&["A"], &["B"], &["C"]]);
    let runner = FakeToolRunner::new();

    let report = run_with_fake(
        &fixture,
        &enumerator,
        ExclusivityThresholds::default(),
        runner.clone(),
        SchedulingStrategy::Parallel,
    )
    .await;

    assert!(report.is_success());
    assert!(report.records.is_empty());
    assert!(runner.calls().is_empty());
    for genome in ["A", "B", "C"] {
        assert!(!fixture.clade_dir(genome).exists());
    }
}

#[tokio::test]
async fn test_single_leaf_tree_submits_nothing() {
    let fixture = Fixture::new(&["A"]);
    let tree = GenomeTree::from_newick("A;").unwrap();
    let runner = FakeToolRunner::new();

    let report = run_with_fake(
        &fixture,
        &tree,
        ExclusivityThresholds::default(),
        runner.clone(),
        SchedulingStrategy::Parallel,
    )
    .await;

    assert!(report.records.is_empty());
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_rerun_over_existing_outputs() {
    let fixture = Fixture::new(&["R", "G1", "G2"]);
    let tree = GenomeTree::from_newick("(G1,G2)R;").unwrap();

    for _ in 0..2 {
        let report = run_with_fake(
            &fixture,
            &tree,
            ExclusivityThresholds::default(),
            FakeToolRunner::new(),
            SchedulingStrategy::Parallel,
        )
        .await;
        assert!(report.is_success(), "failures: {:?}", report.failures());
        assert_eq!(fixture.files_in("R"), vec!["G1.bb", "G2.bb", "R.bb"]);
    }
}

#[tokio::test]
async fn test_clades_sharing_a_representative_share_a_directory() {
    let fixture = Fixture::new(&["R", "G1", "G2"]);
    // Two enumerated clades rooted at the same genome race on mkdir
    let enumerator = clades(&[&["R", "G1"], &["R", "G2"]]);

    let report = run_with_fake(
        &fixture,
        &enumerator,
        ExclusivityThresholds::default(),
        FakeToolRunner::new(),
        SchedulingStrategy::Sequential,
    )
    .await;

    let clade_tasks: Vec<_> = report
        .records
        .iter()
        .filter(|r| r.kind == TaskKind::CladeExclusive { clade_root: "R".to_string() })
        .collect();
    assert_eq!(clade_tasks.len(), 2);
    assert!(clade_tasks.iter().all(|r| r.state.is_success()));
    assert!(fixture.files_in("R").contains(&"R.bb".to_string()));
}

#[tokio::test]
async fn test_unwritable_output_root_is_reported_before_running() {
    let fixture = Fixture::new(&["R", "G1"]);
    std::fs::create_dir_all(fixture.output_root.parent().unwrap()).unwrap();
    std::fs::write(&fixture.output_root, "not a directory").unwrap();

    let tree = GenomeTree::from_newick("(G1)R;").unwrap();
    let runner = FakeToolRunner::new();
    let engine = ExecutionEngine::new(runner.clone(), SchedulingStrategy::Parallel);

    let result = fixture
        .driver(ExclusivityThresholds::default())
        .run(&tree, &engine)
        .await;

    assert!(matches!(result, Err(PipelineError::DirectoryCreation { .. })));
    assert!(runner.calls().is_empty());
}

#[test]
fn test_duplicate_genome_names_are_rejected() {
    assert!(GenomeTree::from_newick("(A,A)R;").is_err());
    assert!(clade_exclusive::core::Clade::new(["R", "A", "R"]).is_err());
}
