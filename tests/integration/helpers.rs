//! Shared fixtures: input files, route builders and a recording route finder.

use anyhow::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use retromix::commands::run::RunOptions;
use retromix::finders::RouteFinder;
use retromix::models::{MoleculeNode, ReactionMetadata, ReactionNode, RouteNode, RouteSet, ScoringType};
use std::cell::{Cell, RefCell};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Template library rows used across tests.
pub const LIBRARY: &[&str] = &[
    "[C:1]-[OH;D1]>>[C:1]-Cl",
    "[c:1]-[Br]>>[c:1]-B(O)O",
    "[N:1]-[C:2]=O>>[N:1].[C:2](=O)O",
    "[C:1]=[O]>>[C:1]-[OH]",
];

/// Writes `canonical_smarts` rows as a gzip TSV with a pandas-style index column.
pub fn write_library(dir: &Path, templates: &[&str]) -> PathBuf {
    let path = dir.join("templates.tsv.gz");
    let file = std::fs::File::create(&path).expect("Failed to create library");
    let mut gz = GzEncoder::new(file, Compression::default());
    writeln!(gz, "\tclassification\tcanonical_smarts").expect("Failed to write header");
    for (i, template) in templates.iter().enumerate() {
        writeln!(gz, "{i}\tunknown\t{template}").expect("Failed to write row");
    }
    gz.finish().expect("Failed to finish gzip");
    path
}

pub fn write_targets(dir: &Path, targets: &[&str]) -> PathBuf {
    let path = dir.join("actives.smi");
    let content: String = targets.iter().map(|t| format!("{t}\n")).collect();
    std::fs::write(&path, content).expect("Failed to write targets");
    path
}

/// Writes a config pointing at `library`, with extra YAML appended.
pub fn write_config(dir: &Path, library: &Path, extra: &str) -> PathBuf {
    let path = dir.join("config.yml");
    let content = format!(
        "aizynthfinder_config: {}\ntemplate_library: {}\n{extra}",
        dir.join("aiz.yml").display(),
        library.display()
    );
    std::fs::write(&path, content).expect("Failed to write config");
    path
}

pub fn options(dir: &Path, scoring_type: ScoringType) -> RunOptions {
    RunOptions {
        targets: dir.join("actives.smi"),
        config: dir.join("config.yml"),
        nproc: 1,
        output: dir.join("out"),
        scoring_type,
    }
}

/// A route applying each step in sequence: target <= step1 <= step2 ...
///
/// Each step is `(template, leaf_smiles, leaf_in_stock)`.
pub fn linear_route(target: &str, steps: &[(&str, &str, bool)]) -> RouteNode {
    let mut chain: Option<RouteNode> = None;
    for (i, (template, leaf, in_stock)) in steps.iter().enumerate().rev() {
        let metadata = ReactionMetadata {
            template: Some(template.to_string()),
            ..Default::default()
        };
        let mut rxn = ReactionNode::new(format!("{leaf}>>I{i}"), metadata);
        rxn.children.push(RouteNode::Mol(MoleculeNode::new(*leaf, *in_stock)));
        if let Some(below) = chain.take() {
            rxn.children.push(below);
        }
        let product = if i == 0 {
            target.to_string()
        } else {
            format!("I{i}")
        };
        let mut mol = MoleculeNode::new(product, false);
        mol.children.push(RouteNode::Reaction(rxn));
        chain = Some(RouteNode::Mol(mol));
    }
    chain.unwrap_or_else(|| RouteNode::Mol(MoleculeNode::new(target, true)))
}

/// Route finder returning fixed routes and remembering how often it ran.
pub struct RecordingFinder {
    name: &'static str,
    routes: RouteSet,
    pub calls: Cell<usize>,
    pub last_targets: RefCell<Vec<String>>,
}

impl RecordingFinder {
    pub fn new(name: &'static str, routes: RouteSet) -> Self {
        Self {
            name,
            routes,
            calls: Cell::new(0),
            last_targets: RefCell::new(Vec::new()),
        }
    }
}

impl RouteFinder for RecordingFinder {
    fn name(&self) -> &str {
        self.name
    }

    fn find_routes(&self, targets: &[String]) -> Result<RouteSet> {
        self.calls.set(self.calls.get() + 1);
        *self.last_targets.borrow_mut() = targets.to_vec();
        Ok(self.routes.clone())
    }
}

/// Route finder that must never run.
pub struct FailingFinder;

impl RouteFinder for FailingFinder {
    fn name(&self) -> &str {
        "unreachable"
    }

    fn find_routes(&self, _targets: &[String]) -> Result<RouteSet> {
        anyhow::bail!("route finder should not have been called")
    }
}
