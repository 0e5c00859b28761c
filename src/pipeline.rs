// src/pipeline.rs

//! Stage drivers: one function per stage operating on files, a parallel batch
//! runner, and [`run`], which chains every configured stage.
//!
//! Each input file maps to exactly one output file, so documents are processed
//! independently on a rayon pool. A document that fails is reported and the
//! rest of the batch carries on.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use rayon::prelude::*;
use serde_json::Value;

use crate::artifact;
use crate::canonicalize::canonicalize;
use crate::choices::ChoiceMap;
use crate::config::Config;
use crate::document::{CanonicalDocument, DottedNode, GraphView, NodeLookup, RawDocument};
use crate::error::{Error, Result};
use crate::project::{project, with_roots};
use crate::solution::{SolutionParser, SolutionReport};
use crate::truncate::truncate_view;

// --- Single-document stages ---

/// Raw e-graph at `input` → canonical document at `output`.
pub fn canonicalize_file(input: &Path, output: &Path) -> Result<CanonicalDocument> {
    let raw: RawDocument = artifact::read_json(input)?;
    let canonical = canonicalize(raw)?;
    artifact::write_json(output, &canonical)?;
    info!(
        "Canonicalized {} ({} nodes) to {}",
        input.display(),
        canonical.nodes.len(),
        output.display()
    );
    Ok(canonical)
}

/// Solver assignment at `solution` → choice document at `output`.
pub fn choices_file(
    solution: &Path,
    table: &impl NodeLookup,
    parser: &SolutionParser,
    output: &Path,
) -> Result<SolutionReport> {
    let text = artifact::read_text(solution)?;
    let report = parser.parse(&text, table)?;
    artifact::write_json(output, &report.choices)?;
    info!(
        "Converted {} choices from {} to {}",
        report.choices.len(),
        solution.display(),
        output.display()
    );
    Ok(report)
}

/// Choice document at `choices` + source node table → pruned table at
/// `output`. Returns the number of nodes kept.
pub fn project_file(choices: &Path, source: &GraphView<Value>, output: &Path) -> Result<usize> {
    let choice_map: ChoiceMap = artifact::read_json(choices)?;
    let projection = project(&choice_map, &source.nodes);
    if !projection.dropped.is_empty() {
        warn!(
            "{}: {} choices name nodes absent from the source graph",
            choices.display(),
            projection.dropped.len()
        );
    }
    let kept = projection.nodes.len();
    artifact::write_json(output, &GraphView::new(projection.nodes))?;
    info!(
        "Projected {} onto {} nodes at {}",
        choices.display(),
        kept,
        output.display()
    );
    Ok(kept)
}

/// Pruned table at `input` → eclass-level view at `output`, with `roots`
/// attached when given.
pub fn truncate_file(input: &Path, output: &Path, roots: Option<&[Value]>) -> Result<()> {
    let view: GraphView<DottedNode> = artifact::read_json(input)?;
    let mut collapsed = truncate_view(view);
    if let Some(roots) = roots {
        collapsed = with_roots(collapsed, roots);
    }
    artifact::write_json(output, &collapsed)?;
    info!(
        "Collapsed {} to {} eclasses at {}",
        input.display(),
        collapsed.nodes.len(),
        output.display()
    );
    Ok(())
}

// --- Batch runner ---

/// Outcome of one stage over a set of inputs.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Outputs written, in input order.
    pub written: Vec<PathBuf>,
    /// Inputs that failed, with the reason.
    pub failed: Vec<(PathBuf, Error)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs `stage(input, output)` for every input, writing into `out_dir` under
/// [`artifact::json_file_name`] (with `strip` as the extension to replace).
/// Inputs whose output name is already claimed by an earlier input fail with
/// [`Error::DuplicateOutput`] instead of racing.
pub fn run_batch<F>(
    inputs: &[PathBuf],
    out_dir: &Path,
    strip: Option<&str>,
    jobs: usize,
    stage: F,
) -> Result<BatchReport>
where
    F: Fn(&Path, &Path) -> Result<()> + Sync,
{
    artifact::create_dir_all(out_dir)?;

    let mut claimed = HashSet::new();
    let mut failed = Vec::new();
    let mut tasks = Vec::with_capacity(inputs.len());
    for input in inputs {
        let output = out_dir.join(artifact::json_file_name(input, strip));
        if claimed.insert(output.clone()) {
            tasks.push((input.clone(), output));
        } else {
            failed.push((input.clone(), Error::DuplicateOutput { path: output }));
        }
    }

    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
    let results: Vec<(PathBuf, PathBuf, Result<()>)> = pool.install(|| {
        tasks
            .into_par_iter()
            .map(|(input, output)| {
                let result = stage(&input, &output);
                (input, output, result)
            })
            .collect()
    });

    let mut report = BatchReport {
        written: Vec::with_capacity(results.len()),
        failed,
    };
    for (input, output, result) in results {
        match result {
            Ok(()) => report.written.push(output),
            Err(e) => report.failed.push((input, e)),
        }
    }
    for (input, e) in &report.failed {
        error!("Failed to process {}: {}", input.display(), e);
    }
    Ok(report)
}

// --- Full run ---

/// Per-stage reports of [`run`]. A stage that was not configured is `None`.
#[derive(Debug, Default)]
pub struct RunReport {
    pub canonicalized: Option<BatchReport>,
    pub chosen: Option<BatchReport>,
    pub projected: Option<BatchReport>,
    pub collapsed: Option<BatchReport>,
}

impl RunReport {
    fn stages(&self) -> impl Iterator<Item = &BatchReport> {
        [
            &self.canonicalized,
            &self.chosen,
            &self.projected,
            &self.collapsed,
        ]
        .into_iter()
        .flatten()
    }

    pub fn failures(&self) -> impl Iterator<Item = &(PathBuf, Error)> {
        self.stages().flat_map(|stage| stage.failed.iter())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Runs every stage `config` enables, with relative paths taken from `root`:
///
/// 1. canonicalize each raw dump, if `raw_dir` is set;
/// 2. turn each solver assignment into a choice document, validated against
///    the canonical form of `source_graph`, if `solution_dir` is set;
/// 3. project `source_graph` through every choice document, collapse the
///    pruned tables to eclass level and attach the source roots, if
///    `source_graph` is set.
pub fn run(config: &Config, root: &Path) -> Result<RunReport> {
    let paths = config.paths.resolved(root);
    let jobs = config.batch.jobs;
    let mut report = RunReport::default();

    if let Some(raw_dir) = &paths.raw_dir {
        let inputs = artifact::list_files(raw_dir, None)?;
        info!("Canonicalizing {} documents from {}", inputs.len(), raw_dir.display());
        report.canonicalized = Some(run_batch(&inputs, &paths.canonical_dir, None, jobs, |i, o| {
            canonicalize_file(i, o).map(drop)
        })?);
    }

    let Some(source_path) = &paths.source_graph else {
        if paths.solution_dir.is_some() {
            return Err(Error::Config {
                path: root.to_path_buf(),
                message: "solution_dir is set but source_graph is not".to_string(),
            });
        }
        return Ok(report);
    };
    let source: Value = artifact::read_json(source_path)?;

    if let Some(solution_dir) = &paths.solution_dir {
        let raw: RawDocument =
            serde_json::from_value(source.clone()).map_err(|e| Error::json(source_path, e))?;
        let table = canonicalize(raw)?.nodes;
        let parser = config.solution_parser();
        let extension = config.batch.solution_extension.as_str();
        let inputs = artifact::list_files(solution_dir, Some(extension))?;
        info!("Reading {} solutions from {}", inputs.len(), solution_dir.display());
        report.chosen = Some(run_batch(&inputs, &paths.choices_dir, Some(extension), jobs, |i, o| {
            choices_file(i, &table, &parser, o).map(drop)
        })?);
    }

    let view: GraphView<Value> =
        serde_json::from_value(source).map_err(|e| Error::json(source_path, e))?;
    let roots = view.root_eclasses.clone().unwrap_or_default();

    let choice_files = match &report.chosen {
        Some(chosen) => chosen.written.clone(),
        None => artifact::list_files(&paths.choices_dir, Some(artifact::JSON_EXTENSION))?,
    };
    let projected = run_batch(&choice_files, &paths.pruned_dir, None, jobs, |i, o| {
        project_file(i, &view, o).map(drop)
    })?;
    report.collapsed = Some(run_batch(&projected.written, &paths.collapsed_dir, None, jobs, |i, o| {
        truncate_file(i, o, Some(roots.as_slice()))
    })?);
    report.projected = Some(projected);

    Ok(report)
}
