//! Whole runs through the real subprocess runner, with shell scripts
//! standing in for the alignment tools

use crate::helpers::*;
use clade_exclusive::core::{ExclusivityThresholds, GenomeTree};
use clade_exclusive::execution::{ExecutionEngine, SchedulingStrategy};
use clade_exclusive::tools::{SubprocessRunner, ToolPaths};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Prints one region tagged with the representative genome
const FIND_REGIONS_SCRIPT: &str = r#"#!/bin/sh
printf 'chr1\t10\t20\t%s\n' "$6"
"#;

/// Copies the source regions, failing on a missing or empty input
const LIFTOVER_SCRIPT: &str = r#"#!/bin/sh
test -s "$3" || exit 3
sed "s/^chr1/$4.chr1/" "$3" > "$5"
"#;

/// Copies the regions into the track, failing on empty inputs
const BED_TO_BIG_BED_SCRIPT: &str = r#"#!/bin/sh
test -s "$1" || exit 4
test -s "$2" || exit 5
cp "$1" "$3"
"#;

fn install_script(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

fn stand_in_tools(dir: &Path) -> ToolPaths {
    std::fs::create_dir_all(dir).unwrap();
    ToolPaths {
        find_regions: install_script(dir, "find-regions.sh", FIND_REGIONS_SCRIPT),
        liftover: install_script(dir, "liftover.sh", LIFTOVER_SCRIPT),
        bed_to_big_bed: install_script(dir, "bed-to-big-bed.sh", BED_TO_BIG_BED_SCRIPT),
    }
}

#[tokio::test]
async fn test_region_output_flows_into_every_track() {
    let fixture = Fixture::new(&["R", "G1", "G2"]);
    let tools = stand_in_tools(&fixture.tmp.path().join("bin"));
    let tree = GenomeTree::from_newick("(G1,G2)R;").unwrap();
    let engine = ExecutionEngine::new(SubprocessRunner::new(60), SchedulingStrategy::Parallel);

    let report = fixture
        .driver_with_tools(ExclusivityThresholds::default(), tools)
        .run(&tree, &engine)
        .await
        .unwrap();

    assert!(report.is_success(), "failures: {:?}", report.failures());
    assert_eq!(fixture.files_in("R"), vec!["G1.bb", "G2.bb", "R.bb"]);

    let dir = fixture.clade_dir("R");
    assert_eq!(
        std::fs::read_to_string(dir.join("R.bb")).unwrap(),
        "chr1\t10\t20\tR\n"
    );
    for target in ["G1", "G2"] {
        let track = std::fs::read_to_string(dir.join(format!("{}.bb", target))).unwrap();
        assert_eq!(track, format!("{}.chr1\t10\t20\tR\n", target));
    }
}

#[tokio::test]
async fn test_failing_stand_in_keeps_region_file() {
    let fixture = Fixture::new(&["R", "G1"]);
    let mut tools = stand_in_tools(&fixture.tmp.path().join("bin"));
    tools.liftover = "false".to_string();
    let tree = GenomeTree::from_newick("(G1)R;").unwrap();
    let engine = ExecutionEngine::new(SubprocessRunner::new(60), SchedulingStrategy::Parallel);

    let report = fixture
        .driver_with_tools(ExclusivityThresholds::default(), tools)
        .run(&tree, &engine)
        .await
        .unwrap();

    assert_eq!(report.failures().len(), 1);
    assert_skipped(&report, &cleanup_kind("R"));
    let regions = std::fs::read_to_string(fixture.clade_dir("R").join("R.bed")).unwrap();
    assert_eq!(regions, "chr1\t10\t20\tR\n");
}
