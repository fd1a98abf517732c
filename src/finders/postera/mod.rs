//! Routes from the Postera Manifold retrosynthesis service.

pub mod client;
pub mod convert;

use anyhow::{Context, Result};
use std::collections::{BTreeSet, HashMap};

use super::RouteFinder;
use crate::external::ExternalCommand;
use crate::models::RouteSet;

pub use client::{PosteraClient, PosteraResult};

pub struct PosRouteFinder {
    client: PosteraClient,
    extractor: Option<ExternalCommand>,
}

impl PosRouteFinder {
    pub fn new(client: PosteraClient) -> Self {
        Self {
            client,
            extractor: None,
        }
    }

    /// Use an external tool to derive a template for each Postera reaction.
    pub fn with_extractor(mut self, extractor: ExternalCommand) -> Self {
        self.extractor = Some(extractor);
        self
    }
}

impl RouteFinder for PosRouteFinder {
    fn name(&self) -> &str {
        "postera"
    }

    fn find_routes(&self, targets: &[String]) -> Result<RouteSet> {
        let mut results = Vec::with_capacity(targets.len());
        let batches = targets.chunks(self.client.batch_size());
        let total = batches.len();

        for (i, batch) in batches.enumerate() {
            tracing::info!(batch = i + 1, of = total, size = batch.len(), "querying Postera");
            let found = self
                .client
                .retrosynthesis_batch(batch)
                .with_context(|| format!("Postera batch {} of {} failed", i + 1, total))?;
            results.extend(found);
        }

        let mut routes = convert::to_route_set(targets, &results);
        match &self.extractor {
            Some(extractor) => attach_templates(&mut routes, extractor)?,
            None => tracing::warn!(
                "no template_extractor configured; Postera reactions carry no templates"
            ),
        }
        Ok(routes)
    }
}

/// Fill `metadata.template` of every reaction from the extractor's answer for its SMILES.
///
/// Each distinct reaction is sent once. An empty answer means no template could be extracted.
pub fn attach_templates(routes: &mut RouteSet, extractor: &ExternalCommand) -> Result<()> {
    let reactions: BTreeSet<String> = routes
        .iter()
        .flat_map(|entry| entry.trees.iter())
        .flat_map(|tree| tree.reactions())
        .map(|rxn| rxn.smiles.clone())
        .collect();
    let reactions: Vec<String> = reactions.into_iter().collect();

    let templates = extractor
        .filter_lines(&reactions)
        .context("Template extraction failed")?;
    let lookup: HashMap<&str, &str> = reactions
        .iter()
        .map(String::as_str)
        .zip(templates.iter().map(String::as_str))
        .filter(|(_, template)| !template.is_empty())
        .collect();

    tracing::info!(
        reactions = reactions.len(),
        extracted = lookup.len(),
        "extracted templates for Postera reactions"
    );

    routes.for_each_route_mut(|tree| {
        tree.for_each_reaction_mut(&mut |rxn| {
            rxn.metadata.template = lookup.get(rxn.smiles.as_str()).map(|t| t.to_string());
        })
    });
    Ok(())
}
