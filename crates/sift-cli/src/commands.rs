//! CLI command definitions.

use clap::{Args, Subcommand, ValueEnum};
use sift_core::target::ScopeFilter;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the targets impacted by a change set and run them.
    Run(RunArgs),
    /// Print the targets a change set resolves to, without running anything.
    Resolve(ResolveArgs),
    /// Validate the target and environment manifests.
    Validate(ValidateArgs),
    /// List registered environments.
    Environments(EnvironmentsArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Changed source path; repeatable. `*` requests a full run.
    #[arg(long = "changed", value_name = "PATH")]
    pub changed: Vec<String>,

    /// Read changed paths from stdin, one per line.
    #[arg(long)]
    pub stdin: bool,

    /// Scope filter for resolved targets.
    #[arg(long, value_enum, default_value_t)]
    pub scope: ScopeArg,

    /// Externally-derived skip directive: short-circuit the run.
    #[arg(long)]
    pub skip: bool,

    /// Request a non-incremental full run for the scope.
    #[arg(long)]
    pub full: bool,

    /// Target manifest path (overrides config).
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Environment manifest path (overrides config).
    #[arg(long)]
    pub environments: Option<PathBuf>,

    /// Per-assignment execution timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// How long a queued target may wait for an environment, in seconds.
    #[arg(long)]
    pub env_wait_secs: Option<u64>,

    /// Emit the final report as JSON instead of the summary.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Changed source path; repeatable. `*` requests a full run.
    #[arg(long = "changed", value_name = "PATH")]
    pub changed: Vec<String>,

    /// Read changed paths from stdin, one per line.
    #[arg(long)]
    pub stdin: bool,

    /// Scope filter for resolved targets.
    #[arg(long, value_enum, default_value_t)]
    pub scope: ScopeArg,

    /// Resolve the full target universe for the scope.
    #[arg(long)]
    pub full: bool,

    /// Target manifest path (overrides config).
    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Target manifest path (overrides config).
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Environment manifest path (overrides config).
    #[arg(long)]
    pub environments: Option<PathBuf>,
}

#[derive(Args)]
pub struct EnvironmentsArgs {
    /// Environment manifest path (overrides config).
    #[arg(long)]
    pub environments: Option<PathBuf>,

    /// Emit the environment list as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ScopeArg {
    #[default]
    All,
    ExcludeModels,
    ModelsOnly,
}

impl std::fmt::Display for ScopeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScopeArg::All => "all",
            ScopeArg::ExcludeModels => "exclude-models",
            ScopeArg::ModelsOnly => "models-only",
        };
        write!(f, "{name}")
    }
}

impl From<ScopeArg> for ScopeFilter {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::All => ScopeFilter::All,
            ScopeArg::ExcludeModels => ScopeFilter::ExcludeModels,
            ScopeArg::ModelsOnly => ScopeFilter::ModelsOnly,
        }
    }
}
