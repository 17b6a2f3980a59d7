//! Test utilities: a fake tool runner and an on-disk fixture

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clade_exclusive::core::{
    Clade, DirectoryLayout, ExclusivityThresholds, ExecutionReport, TaskKind, TaskState,
};
use clade_exclusive::execution::{ExecutionEngine, SchedulingStrategy};
use clade_exclusive::pipeline::PipelineDriver;
use clade_exclusive::tools::{ToolError, ToolInvocation, ToolPaths, ToolRunner};
use clade_exclusive::CladeEnumerator;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

pub const FIND_REGIONS: &str = "findRegionsExclusivelyInGroup";
pub const LIFTOVER: &str = "halLiftover";
pub const BED_TO_BIG_BED: &str = "bedToBigBed";

/// One call the fake runner accepted or rejected
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub invocation: ToolInvocation,
    pub succeeded: bool,
    /// Order in which calls finished
    pub seq: u64,
    pub finished_at: DateTime<Utc>,
}

type FailurePredicate = Arc<dyn Fn(&ToolInvocation) -> bool + Send + Sync>;

/// Tool runner that writes the declared outputs instead of running binaries.
///
/// Like the real liftover tool, it refuses to lift over a region file that
/// does not exist, so a premature cleanup shows up as a failure.
#[derive(Clone, Default)]
pub struct FakeToolRunner {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    clock: Arc<AtomicU64>,
    fail_when: Option<FailurePredicate>,
    delays: Vec<(String, Duration)>,
}

impl FakeToolRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every invocation matching `predicate` with a non-zero exit
    pub fn failing_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ToolInvocation) -> bool + Send + Sync + 'static,
    {
        self.fail_when = Some(Arc::new(predicate));
        self
    }

    /// Sleep before completing calls to `program`
    pub fn with_delay(mut self, program: &str, delay: Duration) -> Self {
        self.delays.push((program.to_string(), delay));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Successful calls to `program`
    pub fn calls_to(&self, program: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.succeeded && c.invocation.program == program)
            .collect()
    }

    fn record(&self, invocation: &ToolInvocation, succeeded: bool) {
        let seq = self.clock.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(RecordedCall {
            invocation: invocation.clone(),
            succeeded,
            seq,
            finished_at: Utc::now(),
        });
    }
}

#[async_trait]
impl ToolRunner for FakeToolRunner {
    async fn run(&self, invocation: &ToolInvocation) -> Result<(), ToolError> {
        for (program, delay) in &self.delays {
            if &invocation.program == program {
                tokio::time::sleep(*delay).await;
            }
        }

        if self.fail_when.as_ref().is_some_and(|f| f(invocation)) {
            self.record(invocation, false);
            return Err(ToolError::NonZeroExit {
                code: 1,
                stderr: "forced failure".to_string(),
            });
        }

        if invocation.program == LIFTOVER {
            let source_regions = Path::new(&invocation.args[2]);
            if !source_regions.exists() {
                self.record(invocation, false);
                return Err(ToolError::NonZeroExit {
                    code: 1,
                    stderr: format!("cannot open {}", source_regions.display()),
                });
            }
        }

        for output in &invocation.outputs {
            std::fs::write(output, format!("chr1\t0\t100\t{}\n", invocation.program))?;
        }

        self.record(invocation, true);
        Ok(())
    }
}

/// Region-tool call for the clade represented by `root`
pub fn is_region_call_for(invocation: &ToolInvocation, root: &str) -> bool {
    invocation.program == FIND_REGIONS && invocation.args.get(5).map(String::as_str) == Some(root)
}

/// Liftover call targeting `target`
pub fn is_liftover_to(invocation: &ToolInvocation, target: &str) -> bool {
    invocation.program == LIFTOVER && invocation.args.get(3).map(String::as_str) == Some(target)
}

/// Temporary hub directory with chromosome size tables
pub struct Fixture {
    pub tmp: TempDir,
    pub output_root: PathBuf,
}

impl Fixture {
    /// Create the fixture and a `chrom.sizes` for each genome
    pub fn new(genomes: &[&str]) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let output_root = tmp.path().join("hub").join("liftoverbeds");
        let fixture = Self { tmp, output_root };
        for genome in genomes {
            fixture.add_chrom_sizes(genome);
        }
        fixture
    }

    pub fn add_chrom_sizes(&self, genome: &str) {
        let dir = self.tmp.path().join("hub").join(genome);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("chrom.sizes"), "chr1\t1000\n").unwrap();
    }

    pub fn layout(&self) -> DirectoryLayout {
        DirectoryLayout::new(&self.output_root)
    }

    pub fn driver(&self, thresholds: ExclusivityThresholds) -> PipelineDriver {
        self.driver_with_tools(thresholds, ToolPaths::default())
    }

    pub fn driver_with_tools(
        &self,
        thresholds: ExclusivityThresholds,
        tools: ToolPaths,
    ) -> PipelineDriver {
        PipelineDriver::new(PathBuf::from("primates.hal"), self.layout(), thresholds, tools)
    }

    pub fn clade_dir(&self, root: &str) -> PathBuf {
        self.layout().clade_dir(root)
    }

    /// Sorted file names in a clade directory
    pub fn files_in(&self, root: &str) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.clade_dir(root))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn files_with_ext(&self, root: &str, ext: &str) -> Vec<String> {
        self.files_in(root)
            .into_iter()
            .filter(|name| name.ends_with(&format!(".{}", ext)))
            .collect()
    }
}

/// Run the driver over `enumerator` with a fake runner
pub async fn run_with_fake<E: CladeEnumerator>(
    fixture: &Fixture,
    enumerator: &E,
    thresholds: ExclusivityThresholds,
    runner: FakeToolRunner,
    strategy: SchedulingStrategy,
) -> ExecutionReport {
    let engine = ExecutionEngine::new(runner, strategy);
    fixture
        .driver(thresholds)
        .run(enumerator, &engine)
        .await
        .expect("driver should start")
}

pub fn clades(lists: &[&[&str]]) -> Vec<Clade> {
    lists.iter().map(|names| Clade::new(names.iter().copied()).unwrap()).collect()
}

pub fn cleanup_kind(root: &str) -> TaskKind {
    TaskKind::Cleanup {
        clade_root: root.to_string(),
    }
}

pub fn liftover_kind(root: &str, target: &str) -> TaskKind {
    TaskKind::Liftover {
        clade_root: root.to_string(),
        target: target.to_string(),
    }
}

pub fn assert_skipped(report: &ExecutionReport, kind: &TaskKind) {
    let record = report
        .record(kind)
        .unwrap_or_else(|| panic!("no record for {}", kind));
    assert!(
        matches!(record.state, TaskState::Skipped { .. }),
        "{} should have been skipped, got {:?}",
        kind,
        record.state
    );
}

pub fn assert_completed(report: &ExecutionReport, kind: &TaskKind) {
    let record = report
        .record(kind)
        .unwrap_or_else(|| panic!("no record for {}", kind));
    assert!(
        record.state.is_success(),
        "{} should have completed, got {:?}",
        kind,
        record.state
    );
}
