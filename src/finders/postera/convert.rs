//! Postera routes to aizynthfinder route trees.
//!
//! A Postera route is a flat list of molecules and reactions. The tree is
//! rebuilt from the target downwards by following, for each molecule, the
//! reaction that produces it.

use std::collections::{HashMap, HashSet};

use super::client::{PosteraReaction, PosteraResult, PosteraRoute};
use crate::models::{MoleculeNode, ReactionMetadata, ReactionNode, RouteNode, RouteSet};

/// Convert every result into a route set ordered like `targets`.
///
/// Results are matched to targets by SMILES; targets without a result get no
/// routes. A target queried twice has the routes of both results, listed once.
pub fn to_route_set(targets: &[String], results: &[PosteraResult]) -> RouteSet {
    let mut by_smiles: HashMap<&str, Vec<&PosteraResult>> = HashMap::new();
    for result in results {
        by_smiles.entry(result.smiles.as_str()).or_default().push(result);
    }

    let mut seen = HashSet::new();
    let mut routes = RouteSet::new();
    for target in targets {
        if !seen.insert(target.as_str()) {
            continue;
        }
        let Some(matched) = by_smiles.get(target.as_str()) else {
            tracing::warn!(target = %target, "Postera returned no result for target");
            routes.push(target.clone(), Vec::new());
            continue;
        };

        let mut trees = Vec::new();
        for result in matched {
            if let Some(error) = &result.error {
                tracing::warn!(target = %target, error = %error, "Postera could not process target");
            }
            trees.extend(result.routes.iter().map(|route| to_tree(target, route)));
        }
        routes.push(target.clone(), trees);
    }
    routes
}

/// Build the aizynthfinder tree for one Postera route.
pub fn to_tree(target: &str, route: &PosteraRoute) -> RouteNode {
    let building_blocks: HashSet<&str> = route
        .molecules
        .iter()
        .filter(|m| m.is_building_block)
        .map(|m| m.smiles.as_str())
        .collect();

    let mut producers = HashMap::new();
    for reaction in &route.reactions {
        producers
            .entry(reaction.product_smiles.as_str())
            .or_insert(reaction);
    }

    let root = root_smiles(target, route, &producers);
    let builder = TreeBuilder {
        building_blocks,
        producers,
    };
    let mut visiting = HashSet::new();
    builder.molecule(root, &mut visiting)
}

/// The target itself when a reaction produces it, else the one product no other step consumes.
fn root_smiles<'a>(
    target: &'a str,
    route: &'a PosteraRoute,
    producers: &HashMap<&'a str, &'a PosteraReaction>,
) -> &'a str {
    if producers.contains_key(target) || route.reactions.is_empty() {
        return target;
    }

    let consumed: HashSet<&str> = route
        .reactions
        .iter()
        .flat_map(|r| r.reactant_smiles.iter().map(String::as_str))
        .collect();

    route
        .reactions
        .iter()
        .map(|r| r.product_smiles.as_str())
        .find(|p| !consumed.contains(p))
        .unwrap_or(target)
}

struct TreeBuilder<'a> {
    building_blocks: HashSet<&'a str>,
    producers: HashMap<&'a str, &'a PosteraReaction>,
}

impl<'a> TreeBuilder<'a> {
    fn molecule(&self, smiles: &'a str, visiting: &mut HashSet<&'a str>) -> RouteNode {
        let mut node = MoleculeNode::new(smiles, self.building_blocks.contains(smiles));

        // A molecule already on the current path would close a cycle; stop at it.
        if node.in_stock || !visiting.insert(smiles) {
            return RouteNode::Mol(node);
        }

        if let Some(&reaction) = self.producers.get(smiles) {
            let metadata = ReactionMetadata {
                classification: reaction.name.clone(),
                ..Default::default()
            };
            let reaction_smiles = format!(
                "{}>>{}",
                reaction.reactant_smiles.join("."),
                reaction.product_smiles
            );
            let mut step = ReactionNode::new(reaction_smiles, metadata);
            step.children = reaction
                .reactant_smiles
                .iter()
                .map(|reactant| self.molecule(reactant, visiting))
                .collect();
            node.children.push(RouteNode::Reaction(step));
        }

        visiting.remove(smiles);
        RouteNode::Mol(node)
    }
}
