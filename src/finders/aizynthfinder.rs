//! aizynthfinder, run through its `aizynthcli` command line tool.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::RouteFinder;
use crate::external::ExternalCommand;
use crate::models::{RouteNode, RouteSet};

pub struct AizRouteFinder {
    command: ExternalCommand,
    configfile: PathBuf,
    nproc: usize,
}

/// `DataFrame.to_json(orient="table")` as written by aizynthcli.
#[derive(Debug, Deserialize)]
struct TableOutput {
    data: Vec<OutputRow>,
}

#[derive(Debug, Deserialize)]
struct OutputRow {
    target: String,
    #[serde(default)]
    trees: Vec<RouteNode>,
}

impl AizRouteFinder {
    pub fn new(
        executable: impl Into<String>,
        configfile: impl Into<PathBuf>,
        nproc: usize,
    ) -> Self {
        Self {
            command: ExternalCommand::new(executable),
            configfile: configfile.into(),
            nproc: nproc.max(1),
        }
    }

    fn cli_args(&self, smiles_file: &Path, output_file: &Path) -> Vec<String> {
        vec![
            "--config".to_string(),
            self.configfile.display().to_string(),
            "--smiles".to_string(),
            smiles_file.display().to_string(),
            "--output".to_string(),
            output_file.display().to_string(),
            "--nproc".to_string(),
            self.nproc.to_string(),
        ]
    }
}

impl RouteFinder for AizRouteFinder {
    fn name(&self) -> &str {
        "aizynthfinder"
    }

    fn find_routes(&self, targets: &[String]) -> Result<RouteSet> {
        let work = TempDir::new().context("Failed to create aizynthfinder work directory")?;
        let smiles_file = work.path().join("targets.smi");
        let output_file = work.path().join("output.json");

        let content: String = targets.iter().map(|t| format!("{t}\n")).collect();
        fs::write(&smiles_file, content)
            .with_context(|| format!("Failed to write {}", smiles_file.display()))?;

        tracing::info!(
            targets = targets.len(),
            nproc = self.nproc,
            config = %self.configfile.display(),
            "running aizynthfinder"
        );
        self.command
            .run(&self.cli_args(&smiles_file, &output_file))
            .context("aizynthfinder route search failed")?;

        let output = fs::read_to_string(&output_file).with_context(|| {
            format!("aizynthcli produced no output at {}", output_file.display())
        })?;
        parse_table_output(&output, targets)
    }
}

/// Turn aizynthcli table output into a route set ordered like `targets`.
///
/// aizynthcli writes one row per input line, so a target listed twice comes
/// back as two rows. Their trees are concatenated and the target appears once,
/// at its first position.
pub fn parse_table_output(content: &str, targets: &[String]) -> Result<RouteSet> {
    let table: TableOutput =
        serde_json::from_str(content).context("Failed to parse aizynthcli output")?;

    let mut found: HashMap<String, Vec<RouteNode>> = HashMap::new();
    for row in table.data {
        found.entry(row.target).or_default().extend(row.trees);
    }

    let mut seen = HashSet::new();
    let mut routes = RouteSet::new();
    for target in targets {
        if !seen.insert(target.as_str()) {
            continue;
        }
        let trees = found.remove(target.as_str()).unwrap_or_else(|| {
            tracing::warn!(target = %target, "aizynthfinder returned no row for target");
            Vec::new()
        });
        routes.push(target.clone(), trees);
    }
    Ok(routes)
}
