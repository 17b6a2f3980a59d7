use anyhow::{Context, Result};
use clade_exclusive::cli::commands::{PlanCommand, RunCommand, ValidateCommand};
use clade_exclusive::cli::output::*;
use clade_exclusive::cli::{Cli, Command};
use clade_exclusive::core::config::PipelineConfig;
use clade_exclusive::core::CladeEnumerator;
use clade_exclusive::execution::{ExecutionEngine, ExecutionEvent};
use clade_exclusive::pipeline::PipelineDriver;
use clade_exclusive::tools::SubprocessRunner;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd).await?,
        Command::Validate(cmd) => validate_pipeline(cmd)?,
        Command::Plan(cmd) => show_plan(cmd)?,
    }

    Ok(())
}

async fn run_pipeline(cmd: &RunCommand) -> Result<()> {
    let mut config = PipelineConfig::from_file(&cmd.file)
        .context("Failed to load pipeline config")?;
    cmd.overrides.apply(&mut config);
    config.validate().context("Invalid configuration after overrides")?;

    println!("{} Loaded pipeline: {}", INFO, style(&config.name).bold());

    if !config.clade_exclusive.enabled {
        println!(
            "{} Clade-exclusive regions are disabled (enable with {} or clade_exclusive.enabled)",
            WARN,
            style("--clade-exclusive-regions").cyan()
        );
        return Ok(());
    }

    let tree = config.load_tree()?;
    let driver = PipelineDriver::from_config(&config);

    let runner = SubprocessRunner::new(config.tools.timeout_secs);
    let mut engine = ExecutionEngine::new(runner, config.strategy());

    // Set up event handler for console output
    let progress = create_progress_bar(0);
    let bar = progress.clone();
    engine.add_event_handler(move |event| {
        match &event {
            ExecutionEvent::TaskStarted { .. } => bar.inc_length(1),
            ExecutionEvent::TaskCompleted { .. } | ExecutionEvent::TaskFailed { .. } => bar.inc(1),
            _ => {}
        }
        bar.println(format_execution_event(&event));
    });

    let report = driver
        .run(&tree, &engine)
        .await
        .context("Pipeline could not start")?;
    progress.finish_and_clear();

    if let Some(path) = &cmd.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("{} Report written to {}", INFO, style(path.display()).dim());
    }

    println!(
        "\n{} Status: {} ({} task(s), {} failed, {} not run)",
        INFO,
        format_status(report.status),
        report.records.len(),
        report.failures().len(),
        report.skipped().len()
    );

    if report.is_success() {
        println!(
            "{} {} completed {}",
            CHECK,
            style(&config.name).bold(),
            style("successfully").green()
        );
    } else {
        println!(
            "{} {} {}",
            CROSS,
            style(&config.name).bold(),
            style("failed").red()
        );
        for record in &report.records {
            if let Some(problem) = format_task_problem(record) {
                println!("  {}", problem);
            }
        }
        error!(
            "{} task(s) failed, {} not run",
            report.failures().len(),
            report.skipped().len()
        );
        std::process::exit(1);
    }

    Ok(())
}

fn validate_pipeline(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating pipeline...", INFO);

    let result = PipelineConfig::from_file(&cmd.file).and_then(|config| {
        let tree = config.load_tree()?;
        Ok((config, tree))
    });

    match result {
        Ok((config, tree)) => {
            println!("{} Pipeline configuration is valid!", CHECK);
            println!("  Name: {}", style(&config.name).bold());
            println!("  Alignment: {}", style(config.alignment.display()).cyan());
            println!("  Genomes: {}", style(tree.genomes().len()).cyan());
            println!(
                "  Clade-exclusive: {}",
                if config.clade_exclusive.enabled {
                    style("enabled").green()
                } else {
                    style("disabled").dim()
                }
            );

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    }
}

fn show_plan(cmd: &PlanCommand) -> Result<()> {
    let mut config = PipelineConfig::from_file(&cmd.file)
        .context("Failed to load pipeline config")?;
    cmd.overrides.apply(&mut config);
    config.validate()?;

    let tree = config.load_tree()?;
    let clades = tree.clades()?;
    let driver = PipelineDriver::from_config(&config);
    let thresholds = config.clade_exclusive.thresholds();
    let tasks = driver.plan(clades.clone());

    if cmd.json {
        let entries: Vec<_> = clades
            .iter()
            .map(|clade| {
                let task = tasks.iter().find(|t| t.clade().root() == clade.root());
                let effective = thresholds.normalize(clade.len());
                serde_json::json!({
                    "root": clade.root(),
                    "members": clade.members(),
                    "skipped": task.is_none(),
                    "max_outgroup_genomes": effective.max_outgroup,
                    "min_ingroup_genomes": effective.min_ingroup,
                    "command": task.map(|t| t.region_invocation().command_line()),
                })
            })
            .collect();
        let data = serde_json::json!({ "name": config.name, "clades": entries });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!(
        "{} {} clade(s), {} to run",
        INFO,
        style(clades.len()).cyan(),
        style(tasks.len()).cyan()
    );
    for clade in &clades {
        match tasks.iter().find(|t| t.clade().root() == clade.root()) {
            Some(task) => {
                let effective = thresholds.normalize(clade.len());
                println!(
                    "  {} {} (maxOut {}, minIn {})",
                    ROCKET,
                    style(clade).bold(),
                    effective.max_outgroup,
                    effective.min_ingroup
                );
                println!("      {}", style(task.region_invocation()).dim());
            }
            None => println!(
                "  {} {} {}",
                INFO,
                style(clade.root()).dim(),
                style("(single genome, skipped)").dim()
            ),
        }
    }

    Ok(())
}
