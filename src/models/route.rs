//! Synthesis routes in the aizynthfinder route dictionary format.
//!
//! A route is a tree that alternates molecule and reaction nodes. The root is
//! the target molecule; leaves are starting materials. Fields the crate does
//! not interpret (scores, hashes, policy metadata) are kept in `extra` so that
//! a cached route round-trips without loss.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A node of a route tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RouteNode {
    Mol(MoleculeNode),
    Reaction(ReactionNode),
}

/// A molecule in a route.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MoleculeNode {
    pub smiles: String,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inchi_key: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RouteNode>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A reaction step in a route.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReactionNode {
    pub smiles: String,
    #[serde(default)]
    pub metadata: ReactionMetadata,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RouteNode>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reaction metadata as written by aizynthfinder.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReactionMetadata {
    /// Template SMARTS applied in this step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Row of the template in the template library
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_code: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MoleculeNode {
    pub fn new(smiles: impl Into<String>, in_stock: bool) -> Self {
        Self {
            smiles: smiles.into(),
            in_stock,
            ..Default::default()
        }
    }

    /// Key used for stock and price lookups: the inchi key when known, else the SMILES.
    pub fn lookup_key(&self) -> &str {
        self.inchi_key.as_deref().unwrap_or(&self.smiles)
    }
}

impl ReactionNode {
    pub fn new(smiles: impl Into<String>, metadata: ReactionMetadata) -> Self {
        Self {
            smiles: smiles.into(),
            metadata,
            ..Default::default()
        }
    }
}

impl RouteNode {
    pub fn children(&self) -> &[RouteNode] {
        match self {
            RouteNode::Mol(mol) => &mol.children,
            RouteNode::Reaction(rxn) => &rxn.children,
        }
    }

    /// All reaction nodes, in pre-order.
    pub fn reactions(&self) -> Vec<&ReactionNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let RouteNode::Reaction(rxn) = node {
                out.push(rxn);
            }
            stack.extend(node.children().iter().rev());
        }
        out
    }

    pub fn for_each_reaction_mut(&mut self, f: &mut impl FnMut(&mut ReactionNode)) {
        let children = match self {
            RouteNode::Mol(mol) => &mut mol.children,
            RouteNode::Reaction(rxn) => {
                f(rxn);
                &mut rxn.children
            }
        };
        for child in children {
            child.for_each_reaction_mut(f);
        }
    }

    /// Molecules without a reaction below them, i.e. the starting materials.
    pub fn leaves(&self) -> Vec<&MoleculeNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                RouteNode::Mol(mol) if mol.children.is_empty() => out.push(mol),
                _ => stack.extend(node.children().iter().rev()),
            }
        }
        out
    }

    /// Number of reaction steps on the longest branch.
    pub fn depth(&self) -> usize {
        let below = self
            .children()
            .iter()
            .map(RouteNode::depth)
            .max()
            .unwrap_or(0);
        match self {
            RouteNode::Reaction(_) => below + 1,
            RouteNode::Mol(_) => below,
        }
    }
}

/// Routes found for one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRoutes {
    pub target: String,
    #[serde(default)]
    pub trees: Vec<RouteNode>,
}

/// Routes for a list of targets, in target order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteSet {
    entries: Vec<TargetRoutes>,
}

impl RouteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append routes for a target. Routes for a target already present are merged into it.
    pub fn push(&mut self, target: impl Into<String>, trees: Vec<RouteNode>) {
        let target = target.into();
        match self.entries.iter_mut().find(|e| e.target == target) {
            Some(existing) => existing.trees.extend(trees),
            None => self.entries.push(TargetRoutes { target, trees }),
        }
    }

    pub fn get(&self, target: &str) -> Option<&[RouteNode]> {
        self.entries
            .iter()
            .find(|e| e.target == target)
            .map(|e| e.trees.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetRoutes> {
        self.entries.iter()
    }

    pub fn for_each_route_mut(&mut self, mut f: impl FnMut(&mut RouteNode)) {
        for entry in &mut self.entries {
            entry.trees.iter_mut().for_each(&mut f);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn route_count(&self) -> usize {
        self.entries.iter().map(|e| e.trees.len()).sum()
    }

    /// Targets with at least one route.
    pub fn solved_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.trees.is_empty()).count()
    }
}

impl FromIterator<TargetRoutes> for RouteSet {
    fn from_iter<I: IntoIterator<Item = TargetRoutes>>(iter: I) -> Self {
        let mut set = RouteSet::new();
        for entry in iter {
            set.push(entry.target, entry.trees);
        }
        set
    }
}
