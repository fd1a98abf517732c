//! How often, and in which routes, each template is used.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::scoring::RouteWeights;
use crate::fs::TemplateLibrary;
use crate::models::{ReactionNode, RouteSet};

/// The template a reaction applied, if it can be told.
///
/// An explicit SMARTS wins; otherwise `template_code` is looked up in the library.
pub fn reaction_template<'a>(
    rxn: &'a ReactionNode,
    library: &'a TemplateLibrary,
) -> Option<&'a str> {
    match rxn.metadata.template.as_deref().map(str::trim) {
        Some(template) if !template.is_empty() => Some(template),
        _ => rxn.metadata.template_code.and_then(|code| library.get(code)),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateStats {
    /// Sum of route weights over every occurrence
    pub weight: f64,
    /// Number of occurrences
    pub count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TemplateUsage {
    stats: HashMap<String, TemplateStats>,
}

impl TemplateUsage {
    /// Tally templates over a route set using precomputed route weights.
    pub fn tally(routes: &RouteSet, weights: &RouteWeights, library: &TemplateLibrary) -> Self {
        let mut usage = TemplateUsage::default();
        let mut unresolved = 0usize;

        for (entry, entry_weights) in routes.iter().zip(weights) {
            for (tree, weight) in entry.trees.iter().zip(entry_weights) {
                for rxn in tree.reactions() {
                    match reaction_template(rxn, library) {
                        Some(template) => usage.record(template, *weight),
                        None => unresolved += 1,
                    }
                }
            }
        }

        if unresolved > 0 {
            tracing::debug!(unresolved, "reactions without a resolvable template");
        }
        usage
    }

    fn record(&mut self, template: &str, weight: f64) {
        let stats = self.stats.entry(template.to_string()).or_default();
        stats.weight += weight;
        stats.count += 1;
    }

    pub fn get(&self, template: &str) -> Option<&TemplateStats> {
        self.stats.get(template)
    }

    pub fn contains(&self, template: &str) -> bool {
        self.stats.contains_key(template)
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Templates from most to least used: weight, then count, then SMARTS.
    pub fn ranked(&self) -> Vec<(&str, &TemplateStats)> {
        let mut ranked: Vec<_> = self
            .stats
            .iter()
            .map(|(template, stats)| (template.as_str(), stats))
            .collect();
        ranked.sort_by(|(ta, a), (tb, b)| compare(a, b).then_with(|| ta.cmp(tb)));
        ranked
    }
}

fn compare(a: &TemplateStats, b: &TemplateStats) -> Ordering {
    b.weight
        .total_cmp(&a.weight)
        .then_with(|| b.count.cmp(&a.count))
}
