//! CLI entry point for depsentry.
//!
//! This module is intentionally thin: it handles argument parsing, file IO,
//! and exit codes. Evaluation lives in `depsentry-engine` and policy
//! administration in `depsentry-registry`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use depsentry_engine::events::TracingSink;
use depsentry_engine::{EnforcementOptions, EnforcementOrchestrator, FoldMode};
use depsentry_registry::validate_policy;
use depsentry_types::{
    Dependency, EvaluationContext, Policy, ReportEnvelope, SCHEMA_REPORT_V1, ToolMeta, Verdict,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::OffsetDateTime;

#[derive(Parser, Debug)]
#[command(
    name = "depsentry",
    version,
    about = "Dependency compliance policy enforcement"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a dependency inventory against policies and write a report.
    Enforce {
        /// Path to the policy set (JSON array of policies).
        #[arg(long)]
        policies: PathBuf,

        /// Path to the dependency inventory JSON.
        #[arg(long)]
        dependencies: PathBuf,

        /// Tenant whose policies apply.
        #[arg(long, default_value = "default")]
        tenant: String,

        /// Evaluate dependencies on a thread pool.
        #[arg(long)]
        parallel: bool,

        /// Combine AND/OR condition chains as OR-ed AND-groups instead of
        /// the default left-to-right fold.
        #[arg(long)]
        grouped_conditions: bool,

        /// Batch deadline in milliseconds; dependencies not started in time
        /// are reported as skipped.
        #[arg(long)]
        deadline_ms: Option<u64>,

        /// Where to write the JSON report envelope.
        #[arg(long, default_value = "artifacts/depsentry/report.json")]
        report_out: PathBuf,
    },

    /// Structurally validate a policy set and print per-policy verdicts.
    Validate {
        /// Path to the policy set (JSON array of policies).
        #[arg(long)]
        policies: PathBuf,
    },
}

/// Inventory file shape: the dependency list plus optional scan context.
#[derive(Debug, Deserialize)]
struct Inventory {
    dependencies: Vec<Dependency>,
    #[serde(default)]
    context: EvaluationContext,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Enforce {
            policies,
            dependencies,
            tenant,
            parallel,
            grouped_conditions,
            deadline_ms,
            report_out,
        } => cmd_enforce(
            &policies,
            &dependencies,
            &tenant,
            parallel,
            grouped_conditions,
            deadline_ms,
            &report_out,
        ),
        Commands::Validate { policies } => cmd_validate(&policies),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_enforce(
    policies_path: &Path,
    dependencies_path: &Path,
    tenant: &str,
    parallel: bool,
    grouped_conditions: bool,
    deadline_ms: Option<u64>,
    report_out: &Path,
) -> anyhow::Result<()> {
    let policies = load_policies(policies_path)?;
    for policy in &policies {
        validate_policy(policy)
            .with_context(|| format!("policy '{}' failed validation", policy.id))?;
    }

    let inventory: Inventory = read_json(dependencies_path).context("load dependency inventory")?;

    let options = EnforcementOptions {
        parallel,
        fold_mode: if grouped_conditions {
            FoldMode::Grouped
        } else {
            FoldMode::Sequential
        },
        deadline: deadline_ms.map(Duration::from_millis),
    };
    let sink = TracingSink;
    let orchestrator = EnforcementOrchestrator::with_options(&sink, options);
    let result = orchestrator.evaluate_policies(
        &inventory.dependencies,
        &policies,
        tenant,
        &inventory.context,
    );

    let verdict = Verdict::from_result(&result);
    let envelope = ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "depsentry".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at: result.started_at,
        finished_at: OffsetDateTime::now_utc(),
        verdict,
        data: result,
    };
    write_report_file(report_out, &envelope).context("write report json")?;

    let totals = &envelope.data.totals;
    let summary = &envelope.data.summary;
    println!(
        "depsentry: {} dependencies evaluated, {} skipped, {} violation(s), {} warning(s), {} blocked",
        totals.evaluated_dependencies,
        totals.skipped_dependencies,
        summary.violations_detected,
        summary.warnings_detected,
        summary.blocked_dependencies,
    );

    if verdict == Verdict::Fail {
        std::process::exit(2);
    }
    Ok(())
}

fn cmd_validate(policies_path: &Path) -> anyhow::Result<()> {
    let policies = load_policies(policies_path)?;

    let mut invalid = 0usize;
    for policy in &policies {
        match validate_policy(policy) {
            Ok(()) => println!("{}: ok", policy.id),
            Err(err) => {
                invalid += 1;
                println!("{}: invalid: {err}", policy.id);
            }
        }
    }
    println!(
        "depsentry: {} policies checked, {invalid} invalid",
        policies.len()
    );

    if invalid > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn load_policies(path: &Path) -> anyhow::Result<Vec<Policy>> {
    read_json(path).context("load policy set")
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read file: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse json: {}", path.display()))
}

fn write_report_file(path: &Path, envelope: &ReportEnvelope) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory: {}", parent.display()))?;
    }
    let mut data = serde_json::to_vec_pretty(envelope).context("serialize report")?;
    data.push(b'\n');
    std::fs::write(path, data).with_context(|| format!("write report: {}", path.display()))?;
    Ok(())
}
