//! Command handlers.

use crate::commands::{EnvironmentsArgs, ResolveArgs, RunArgs, ValidateArgs};
use crate::config::CliConfig;
use console::style;
use sift_core::assignment::AssignmentStatus;
use sift_core::events::{Event, RunSkipReason};
use sift_core::ids::RunId;
use sift_core::verdict::{OverallStatus, RunVerdict};
use sift_impact::{DependencyGraph, FULL_RUN_SENTINEL, ImpactResolver, TargetManifest};
use sift_runner::{Executor, ExecutorConfig, ProcessConfig, ShellProcess};
use sift_scheduler::{
    EnvironmentManifest, EnvironmentRegistry, ExclusionLock, ResultAggregator, Scheduler,
    SchedulerConfig,
};
use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub async fn run(config: &CliConfig, args: RunArgs) -> anyhow::Result<i32> {
    let manifest_path = args.manifest.clone().unwrap_or_else(|| config.manifest.clone());
    let env_path = args
        .environments
        .clone()
        .unwrap_or_else(|| config.environments.clone());

    let manifest = TargetManifest::load(&manifest_path)?;
    let graph = DependencyGraph::from_manifest(&manifest)?;
    let changed = gather_changed(args.changed, args.stdin, args.full)?;
    let targets = ImpactResolver::new(&graph).resolve(&changed, args.scope.into());

    let env_manifest = EnvironmentManifest::load(&env_path)?;
    let registry = Arc::new(EnvironmentRegistry::from_manifest(&env_manifest)?);

    let process = ShellProcess::new(ProcessConfig {
        shell: config.shell.clone(),
        command_template: config.command_template.clone(),
    });
    let executor = Arc::new(Executor::new(
        Arc::new(process),
        ExecutorConfig {
            timeout: Duration::from_secs(args.timeout_secs.unwrap_or(config.timeout_secs)),
        },
    ));

    let scheduler_config = SchedulerConfig {
        env_wait_timeout: Duration::from_secs(args.env_wait_secs.unwrap_or(config.env_wait_secs)),
        ..Default::default()
    };
    let scheduler = Scheduler::new(
        registry,
        Arc::new(ExclusionLock::new()),
        executor,
        scheduler_config,
    );

    let (events_tx, mut events_rx) = mpsc::channel(256);
    let quiet = args.json;
    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            if !quiet {
                print_event(&event);
            }
        }
    });

    let run_id = RunId::new();
    let outcome = scheduler.run(run_id, targets, args.skip, &events_tx).await;
    drop(events_tx);
    printer.await?;

    let verdict = ResultAggregator::new().finalize(run_id, &outcome.assignments, outcome.aborted);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        print_report(&verdict);
    }

    Ok(verdict.exit_code())
}

pub fn resolve(config: &CliConfig, args: ResolveArgs) -> anyhow::Result<i32> {
    let manifest_path = args.manifest.clone().unwrap_or_else(|| config.manifest.clone());
    let manifest = TargetManifest::load(&manifest_path)?;
    let graph = DependencyGraph::from_manifest(&manifest)?;
    let changed = gather_changed(args.changed, args.stdin, args.full)?;
    let targets = ImpactResolver::new(&graph).resolve(&changed, args.scope.into());

    if targets.is_empty() {
        println!("{}", style("no impacted targets").dim());
        return Ok(0);
    }
    for target in &targets {
        println!("{:<8} {}", target.scope.to_string(), target.id);
    }
    Ok(0)
}

pub fn validate(config: &CliConfig, args: ValidateArgs) -> anyhow::Result<i32> {
    let manifest_path = args.manifest.clone().unwrap_or_else(|| config.manifest.clone());
    let env_path = args
        .environments
        .clone()
        .unwrap_or_else(|| config.environments.clone());

    let manifest = TargetManifest::load(&manifest_path)?;
    println!(
        "{} {}: {} targets, {} edges",
        style("✓").green().bold(),
        manifest_path.display(),
        manifest.targets.len(),
        manifest.edges.len()
    );

    let env_manifest = EnvironmentManifest::load(&env_path)?;
    println!(
        "{} {}: {} environments",
        style("✓").green().bold(),
        env_path.display(),
        env_manifest.environments.len()
    );

    Ok(0)
}

pub fn environments(config: &CliConfig, args: EnvironmentsArgs) -> anyhow::Result<i32> {
    let env_path = args
        .environments
        .clone()
        .unwrap_or_else(|| config.environments.clone());
    let manifest = EnvironmentManifest::load(&env_path)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&manifest.environments)?);
        return Ok(0);
    }

    for env in &manifest.environments {
        let software: Vec<&str> = env.software_profile.iter().map(String::as_str).collect();
        println!(
            "{:<20} {:<8} {:<8} key={} software=[{}]",
            env.id.to_string(),
            env.hardware_class,
            env.accelerator_type,
            env.exclusivity_key,
            software.join(", ")
        );
    }
    Ok(0)
}

fn gather_changed(
    mut changed: Vec<String>,
    use_stdin: bool,
    full: bool,
) -> anyhow::Result<Vec<String>> {
    if use_stdin {
        for line in std::io::stdin().lock().lines() {
            let line = line?;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                changed.push(trimmed.to_string());
            }
        }
    }
    if full && !changed.iter().any(|p| p == FULL_RUN_SENTINEL) {
        changed.push(FULL_RUN_SENTINEL.to_string());
    }
    Ok(changed)
}

fn status_label(status: AssignmentStatus) -> &'static str {
    match status {
        AssignmentStatus::Pending => "pending",
        AssignmentStatus::Running => "running",
        AssignmentStatus::Passed => "passed",
        AssignmentStatus::Failed => "failed",
        AssignmentStatus::TimedOut => "timed out",
        AssignmentStatus::Skipped => "skipped",
    }
}

fn print_event(event: &Event) {
    match event {
        Event::RunStarted(p) => {
            println!(
                "{} Run {} ({} targets)",
                style("▶").cyan().bold(),
                p.run_id,
                p.target_count
            );
        }
        Event::RunSkipped(p) => {
            let reason = match p.reason {
                RunSkipReason::SkipDirective => "skip directive",
                RunSkipReason::NoTargets => "no impacted targets",
            };
            println!("{} Run skipped: {reason}", style("∅").yellow().bold());
        }
        Event::RunCompleted(p) => {
            println!(
                "\n{} {} passed, {} failed, {} skipped",
                style("■").cyan().bold(),
                p.passed,
                p.failed,
                p.skipped
            );
        }
        Event::StageStarted(p) => {
            println!(
                "\n{} stage {} ({} targets)",
                style("──").dim(),
                style(p.stage).bold(),
                p.target_count
            );
        }
        Event::StageCompleted(p) => {
            println!(
                "{} stage {}: {} passed, {} failed, {} skipped",
                style("──").dim(),
                p.stage,
                p.passed,
                p.failed,
                p.skipped
            );
        }
        Event::AssignmentStarted(p) => {
            println!("  {} {} on {}", style("…").dim(), p.target, p.environment);
        }
        Event::AssignmentCompleted(p) => {
            let mark = match p.status {
                AssignmentStatus::Passed => style("✓").green().bold(),
                AssignmentStatus::Skipped => style("∅").yellow().bold(),
                _ => style("✗").red().bold(),
            };
            let duration = p
                .duration_ms
                .map(|ms| format!(" ({ms} ms)"))
                .unwrap_or_default();
            let environment = p
                .environment
                .as_ref()
                .map(|e| format!(" on {e}"))
                .unwrap_or_default();
            println!(
                "  {mark} {} {}{environment}{duration}",
                p.target,
                status_label(p.status)
            );
        }
    }
}

fn print_report(verdict: &RunVerdict) {
    let status = match verdict.overall_status {
        OverallStatus::AllPassed => style("all passed").green().bold(),
        OverallStatus::AllSkipped => style("all skipped").yellow().bold(),
        OverallStatus::PartialFailure => style("partial failure").red().bold(),
        OverallStatus::Aborted => style("aborted").red().bold(),
    };
    println!("\nVerdict: {status}");

    for result in &verdict.per_target_results {
        let environment = result
            .environment
            .as_ref()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "-".to_string());
        let duration = result
            .duration_ms
            .map(|ms| format!("{ms} ms"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<44} {:<10} {:<20} {}",
            result.target.to_string(),
            status_label(result.status),
            environment,
            duration
        );
    }

    if !verdict.failing_targets.is_empty() {
        println!("\nFailing targets:");
        for target in &verdict.failing_targets {
            println!("  {}", style(target).red());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_changed_appends_sentinel_once() {
        let changed = gather_changed(vec!["a.py".to_string()], false, true).unwrap();
        assert_eq!(changed, vec!["a.py".to_string(), "*".to_string()]);

        let changed = gather_changed(vec!["*".to_string()], false, true).unwrap();
        assert_eq!(changed, vec!["*".to_string()]);
    }

    #[test]
    fn test_gather_changed_passthrough() {
        let changed = gather_changed(vec!["a.py".to_string()], false, false).unwrap();
        assert_eq!(changed, vec!["a.py".to_string()]);
    }
}
