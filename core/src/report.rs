//! Step records, the summary table, and the result/visualization sinks.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ReportError;
use crate::graph::Graph;
use crate::removal::RemovalPolicy;

/// One committed step's metrics. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: usize,
    pub nodes: usize,
    pub edges: usize,
    pub chromatic_number: usize,
    pub arboricity: usize,
    pub thickness: u32,
    pub is_planar: bool,
}

/// Files written by `Reporter::finalize`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportOutputs {
    pub table: Option<PathBuf>,
    pub json: Option<PathBuf>,
}

pub trait Reporter {
    fn record(&mut self, record: StepRecord);

    /// Visualization sink for a committed graph.
    fn render(&mut self, graph: &Graph, step: usize) -> Result<(), ReportError>;

    /// Print and persist everything recorded so far.
    fn finalize(&mut self, policy: RemovalPolicy, steps: usize) -> Result<ReportOutputs, ReportError>;

    fn records(&self) -> &[StepRecord];
}

const RULE_WIDTH: usize = 105;

/// Fixed-width summary table, centered columns.
pub fn format_table(records: &[StepRecord]) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "\nSummary of Generated Graphs:");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "{:^10}{:^10}{:^10}{:^15}{:^15}{:^10}{:^15}",
        "Step", "Nodes", "Edges", "Chromatic #", "Arboricity", "Thickness", "Is Planar"
    );
    let _ = writeln!(out, "{}", rule);
    for r in records {
        let _ = writeln!(
            out,
            "{:^10}{:^10}{:^10}{:^15}{:^15}{:^10}{:^15}",
            r.step, r.nodes, r.edges, r.chromatic_number, r.arboricity, r.thickness, r.is_planar
        );
    }
    let _ = writeln!(out, "{}", rule);
    out
}

/// Base name shared by the table and JSON outputs.
pub fn summary_stem(policy: RemovalPolicy, steps: usize) -> String {
    format!("graph_summary_{}_{}_steps", policy, steps)
}

/// Graphviz DOT rendering of `graph`, titled with the step and counts.
pub fn to_dot(graph: &Graph, step: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "graph step_{} {{", step);
    let _ = writeln!(
        out,
        "  label=\"Graph at Step {}\\nNodes: {}, Edges: {}\";",
        step,
        graph.vertex_count(),
        graph.edge_count()
    );
    let _ = writeln!(out, "  node [shape=circle, style=filled, fillcolor=lightblue];");
    let _ = writeln!(out, "  edge [color=gray];");
    for v in graph.vertices() {
        let _ = writeln!(out, "  {};", v);
    }
    for e in graph.edges() {
        let _ = writeln!(out, "  {} -- {};", e.a, e.b);
    }
    out.push_str("}\n");
    out
}

fn write_file(path: &Path, contents: &str) -> Result<(), ReportError> {
    fs::write(path, contents).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_dir(dir: &Path) -> Result<(), ReportError> {
    fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// Keeps records in memory; writes the table + JSON on finalize and,
/// when a render directory is set, one DOT file per rendered step.
#[derive(Debug, Clone)]
pub struct SummaryReporter {
    records: Vec<StepRecord>,
    results_dir: PathBuf,
    render_dir: Option<PathBuf>,
    echo: bool,
}

impl SummaryReporter {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            records: Vec::new(),
            results_dir: results_dir.into(),
            render_dir: None,
            echo: true,
        }
    }

    pub fn with_render_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.render_dir = Some(dir.into());
        self
    }

    /// Whether `finalize` prints the table to stdout.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }
}

impl Reporter for SummaryReporter {
    fn record(&mut self, record: StepRecord) {
        self.records.push(record);
    }

    fn render(&mut self, graph: &Graph, step: usize) -> Result<(), ReportError> {
        let Some(dir) = &self.render_dir else {
            return Ok(());
        };
        ensure_dir(dir)?;
        let path = dir.join(format!("graph_step_{}.dot", step));
        write_file(&path, &to_dot(graph, step))?;
        debug!(step, path = %path.display(), "rendered graph");
        Ok(())
    }

    fn finalize(&mut self, policy: RemovalPolicy, steps: usize) -> Result<ReportOutputs, ReportError> {
        let table = format_table(&self.records);
        if self.echo {
            println!("{}", table);
        }

        ensure_dir(&self.results_dir)?;
        let stem = summary_stem(policy, steps);
        let table_path = self.results_dir.join(format!("{}.txt", stem));
        write_file(&table_path, &table)?;

        let json_path = self.results_dir.join(format!("{}.json", stem));
        write_file(&json_path, &serde_json::to_string_pretty(&self.records)?)?;

        info!(
            records = self.records.len(),
            table = %table_path.display(),
            json = %json_path.display(),
            "summary saved"
        );
        Ok(ReportOutputs {
            table: Some(table_path),
            json: Some(json_path),
        })
    }

    fn records(&self) -> &[StepRecord] {
        &self.records
    }
}

/// Reporter that only keeps records in memory. Useful for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryReporter {
    records: Vec<StepRecord>,
    rendered: Vec<usize>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps passed to `render`, in order.
    pub fn rendered(&self) -> &[usize] {
        &self.rendered
    }
}

impl Reporter for MemoryReporter {
    fn record(&mut self, record: StepRecord) {
        self.records.push(record);
    }

    fn render(&mut self, _graph: &Graph, step: usize) -> Result<(), ReportError> {
        self.rendered.push(step);
        Ok(())
    }

    fn finalize(&mut self, _policy: RemovalPolicy, _steps: usize) -> Result<ReportOutputs, ReportError> {
        Ok(ReportOutputs::default())
    }

    fn records(&self) -> &[StepRecord] {
        &self.records
    }
}
