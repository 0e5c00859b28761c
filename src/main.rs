// src/main.rs

//! `egraph-canon` command-line entry point.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::{error, info, warn};

use egraph_canon::choices::{self, ChoiceMap, DuplicatePolicy};
use egraph_canon::config::Config;
use egraph_canon::document::{CanonicalDocument, GraphView, RootSource};
use egraph_canon::{artifact, pipeline, project, SolutionParser};

#[derive(Parser)]
#[command(name = "egraph-canon", about = "Canonicalize and reconstruct e-graph extraction artifacts")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Convert a raw e-graph dump into its integer-typed canonical form
    Canonicalize { input: PathBuf, output: PathBuf },
    /// Turn a solver assignment file into a choice document
    Choices {
        /// Solver assignment (.sol) file
        #[arg(long)]
        solution: PathBuf,
        /// Canonical e-graph the selections are validated against
        #[arg(long)]
        graph: PathBuf,
        #[arg(long, short)]
        output: PathBuf,
        /// Fail if the solver selects two nodes for one eclass
        #[arg(long)]
        reject_duplicates: bool,
    },
    /// Keep only the chosen nodes of an e-graph
    Project {
        #[arg(long)]
        choices: PathBuf,
        /// E-graph whose node table is pruned
        #[arg(long)]
        graph: PathBuf,
        #[arg(long, short)]
        output: PathBuf,
        /// Copy root_eclasses from this document into the output
        #[arg(long)]
        roots_from: Option<PathBuf>,
    },
    /// Collapse node ids and children of a pruned table to their eclass
    Truncate { input: PathBuf, output: PathBuf },
    /// Overwrite root_eclasses of TARGET with those of another document
    InjectRoots {
        #[arg(long)]
        from: PathBuf,
        target: PathBuf,
    },
    /// Check that a choice document describes a closed extraction
    Check {
        #[arg(long)]
        choices: PathBuf,
        /// Canonical e-graph
        #[arg(long)]
        graph: PathBuf,
    },
    /// Run every configured stage over whole directories
    Run {
        /// Pipeline config (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Directory relative paths are resolved against (default: the config file's directory)
        #[arg(long)]
        root: Option<PathBuf>,
        /// Worker threads (overrides the config)
        #[arg(long, short)]
        jobs: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default filter is "info" (or "debug" with -v) if RUST_LOG is not set.
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_micros()
        .init();

    match cli.command {
        Cmd::Canonicalize { input, output } => {
            pipeline::canonicalize_file(&input, &output)
                .with_context(|| format!("Failed to canonicalize {}", input.display()))?;
        }
        Cmd::Choices {
            solution,
            graph,
            output,
            reject_duplicates,
        } => {
            let policy = if reject_duplicates {
                DuplicatePolicy::Reject
            } else {
                DuplicatePolicy::LastWins
            };
            let canonical: CanonicalDocument = artifact::read_json(&graph)?;
            let parser = SolutionParser::default().with_policy(policy);
            let report = pipeline::choices_file(&solution, &canonical.nodes, &parser, &output)
                .with_context(|| format!("Failed to read solution {}", solution.display()))?;
            info!(
                "{} lines accepted, {} skipped, {} overwritten selections",
                report.accepted,
                report.skipped_total(),
                report.overwrites.len()
            );
        }
        Cmd::Project {
            choices: choices_path,
            graph,
            output,
            roots_from,
        } => {
            let source: GraphView<serde_json::Value> = artifact::read_json(&graph)?;
            pipeline::project_file(&choices_path, &source, &output)
                .with_context(|| format!("Failed to project {}", choices_path.display()))?;
            if let Some(roots_from) = roots_from {
                inject_roots_from(&roots_from, &output)?;
            }
        }
        Cmd::Truncate { input, output } => {
            pipeline::truncate_file(&input, &output, None)
                .with_context(|| format!("Failed to truncate {}", input.display()))?;
        }
        Cmd::InjectRoots { from, target } => inject_roots_from(&from, &target)?,
        Cmd::Check {
            choices: choices_path,
            graph,
        } => {
            let choice_map: ChoiceMap = artifact::read_json(&choices_path)?;
            let canonical: CanonicalDocument = artifact::read_json(&graph)?;
            let report = choices::check(&choice_map, &canonical).with_context(|| {
                format!("{} does not match {}", choices_path.display(), graph.display())
            })?;
            for root in &report.unchosen_roots {
                error!("Root eclass {} has no choice", root);
            }
            for (node, child) in &report.dangling_children {
                error!("Chosen node {} depends on eclass {}, which has no choice", node, child);
            }
            if !report.is_clean() {
                bail!("{} is not a closed extraction", choices_path.display());
            }
            info!("{}: {} choices, all consistent", choices_path.display(), choice_map.len());
        }
        Cmd::Run { config, root, jobs } => run(config, root, jobs)?,
    }

    Ok(())
}

fn inject_roots_from(from: &Path, target: &Path) -> anyhow::Result<()> {
    let source: RootSource = artifact::read_json(from)?;
    if source.root_eclasses.is_empty() {
        warn!("{} has no root_eclasses", from.display());
    }
    project::inject_roots(target, &source.root_eclasses)
        .with_context(|| format!("Failed to inject roots into {}", target.display()))
}

fn run(config_path: Option<PathBuf>, root: Option<PathBuf>, jobs: Option<usize>) -> anyhow::Result<()> {
    let mut config = match &config_path {
        Some(path) => Config::load(path).context("Failed to load pipeline config")?,
        None => Config::default(),
    };
    if let Some(jobs) = jobs {
        config.batch.jobs = jobs;
    }

    let root = match (root, &config_path) {
        (Some(root), _) => root,
        (None, Some(path)) => path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
        (None, None) => bail!("either --config or --root is required"),
    };
    info!("Running pipeline rooted at {}", root.display());

    let report = pipeline::run(&config, &root).context("Pipeline run failed")?;
    // Individual failures were already logged by the batch runner.
    let failed = report.failures().count();
    if failed > 0 {
        bail!("{} documents failed", failed);
    }
    info!("Pipeline finished.");
    Ok(())
}
