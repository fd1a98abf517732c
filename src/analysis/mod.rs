//! Template usage analysis across the aizynthfinder and Postera route sets.
//!
//! The four classifications:
//!
//! - **popular**: the most used templates in aizynthfinder routes
//!   (top `popular_fraction` of the used templates by weighted usage)
//! - **unused**: templates Postera routes use that no aizynthfinder route
//!   uses, ranked by weighted usage in the Postera routes
//! - **overlooked**: unused templates that are in the template library, so
//!   aizynthfinder could have applied them
//! - **novel**: unused templates absent from the library

pub mod coprinet;
pub mod scoring;
pub mod usage;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::fs::{write_report, TemplateLibrary};
use crate::models::constants::{
    DEFAULT_POPULAR_FRACTION, NOVEL_TEMPLATES_FILE, OVERLOOKED_TEMPLATES_FILE,
    POPULAR_TEMPLATES_FILE, UNUSED_TEMPLATES_FILE,
};
use crate::models::RouteSet;

pub use coprinet::{CoprinetPredictor, PricePredictor};
pub use scoring::{scorer_for, RouteScorer};
pub use usage::{TemplateStats, TemplateUsage};

pub trait TemplateAnalyser {
    fn find_popular_templates(&self, aiz_routes: &RouteSet) -> Result<Vec<String>>;

    fn find_unused_templates(&self, aiz_routes: &RouteSet, pos_routes: &RouteSet)
        -> Result<Vec<String>>;

    /// Split unused templates into `(overlooked, novel)`, keeping their order.
    fn find_novel_overlooked_templates(&self, unused: &[String]) -> (Vec<String>, Vec<String>);
}

pub struct AizPosTemplateAnalyser {
    library: TemplateLibrary,
    scorer: Box<dyn RouteScorer>,
    popular_fraction: f64,
}

impl AizPosTemplateAnalyser {
    pub fn new(library: TemplateLibrary, scorer: Box<dyn RouteScorer>) -> Self {
        Self {
            library,
            scorer,
            popular_fraction: DEFAULT_POPULAR_FRACTION,
        }
    }

    pub fn with_popular_fraction(mut self, fraction: f64) -> Self {
        self.popular_fraction = fraction.clamp(f64::MIN_POSITIVE, 1.0);
        self
    }

    pub fn library(&self) -> &TemplateLibrary {
        &self.library
    }

    pub fn usage(&self, routes: &RouteSet) -> Result<TemplateUsage> {
        let weights = self.scorer.score_routes(routes)?;
        Ok(TemplateUsage::tally(routes, &weights, &self.library))
    }

    fn popular_count(&self, used: usize) -> usize {
        if used == 0 {
            return 0;
        }
        ((self.popular_fraction * used as f64).ceil() as usize).clamp(1, used)
    }
}

impl TemplateAnalyser for AizPosTemplateAnalyser {
    fn find_popular_templates(&self, aiz_routes: &RouteSet) -> Result<Vec<String>> {
        let usage = self
            .usage(aiz_routes)
            .context("Failed to score aizynthfinder routes")?;
        let keep = self.popular_count(usage.len());

        Ok(usage
            .ranked()
            .into_iter()
            .take(keep)
            .map(|(template, _)| template.to_string())
            .collect())
    }

    fn find_unused_templates(
        &self,
        aiz_routes: &RouteSet,
        pos_routes: &RouteSet,
    ) -> Result<Vec<String>> {
        let aiz = self
            .usage(aiz_routes)
            .context("Failed to score aizynthfinder routes")?;
        let pos = self
            .usage(pos_routes)
            .context("Failed to score Postera routes")?;

        Ok(pos
            .ranked()
            .into_iter()
            .filter(|(template, _)| !aiz.contains(template))
            .map(|(template, _)| template.to_string())
            .collect())
    }

    fn find_novel_overlooked_templates(&self, unused: &[String]) -> (Vec<String>, Vec<String>) {
        unused
            .iter()
            .cloned()
            .partition(|template| self.library.contains(template))
    }
}

/// The four template lists of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateReport {
    pub popular: Vec<String>,
    pub unused: Vec<String>,
    pub overlooked: Vec<String>,
    pub novel: Vec<String>,
}

impl TemplateReport {
    pub fn build(
        analyser: &dyn TemplateAnalyser,
        aiz_routes: &RouteSet,
        pos_routes: &RouteSet,
    ) -> Result<Self> {
        let popular = analyser.find_popular_templates(aiz_routes)?;
        let unused = analyser.find_unused_templates(aiz_routes, pos_routes)?;
        let (overlooked, novel) = analyser.find_novel_overlooked_templates(&unused);
        Ok(Self {
            popular,
            unused,
            overlooked,
            novel,
        })
    }

    /// Write the four JSON reports into `dir`.
    pub fn write(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        [
            (POPULAR_TEMPLATES_FILE, &self.popular),
            (UNUSED_TEMPLATES_FILE, &self.unused),
            (OVERLOOKED_TEMPLATES_FILE, &self.overlooked),
            (NOVEL_TEMPLATES_FILE, &self.novel),
        ]
        .into_iter()
        .map(|(name, templates)| write_report(dir, name, templates))
        .collect()
    }
}
