//! The template analysis pipeline.
//!
//! Steps run strictly in order: configuration, targets and stock; the two
//! route sets (each from its cache when present); the template library; the
//! analysis; the four reports.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use crate::analysis::{
    scorer_for, AizPosTemplateAnalyser, CoprinetPredictor, PricePredictor, TemplateReport,
};
use crate::config::{postera_api_key, Config};
use crate::external::ExternalCommand;
use crate::finders::postera::PosteraClient;
use crate::finders::{AizRouteFinder, PosRouteFinder, RouteFinder};
use crate::fs::{load_or_compute, read_targets, Stock, TemplateLibrary};
use crate::models::constants::{AIZ_ROUTES_CACHE, POS_ROUTES_CACHE};
use crate::models::{RouteSet, ScoringType};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub targets: PathBuf,
    pub config: PathBuf,
    pub nproc: usize,
    pub output: PathBuf,
    pub scoring_type: ScoringType,
}

/// Run the whole pipeline with the configured route finders.
pub fn execute(options: &RunOptions) -> Result<TemplateReport> {
    let config = Config::load(&options.config)?;
    let aiz = AizRouteFinder::new(
        config.aizynthcli.clone(),
        config.aizynthfinder_config.clone(),
        options.nproc,
    );
    let pos = DeferredPostera { config: &config };
    execute_with(options, &config, &aiz, &pos)
}

/// Run the pipeline with the given route finders.
pub fn execute_with(
    options: &RunOptions,
    config: &Config,
    aiz_finder: &dyn RouteFinder,
    pos_finder: &dyn RouteFinder,
) -> Result<TemplateReport> {
    config.validate_for(options.scoring_type)?;

    let targets = read_targets(&options.targets)?;
    let stock = if options.scoring_type.needs_stock() {
        let path = config.stock_path()?;
        Some(Stock::load(path)?)
    } else {
        None
    };
    tracing::info!(
        targets = targets.len(),
        stock = stock.as_ref().map(Stock::len),
        scoring = %options.scoring_type,
        "inputs loaded"
    );
    println!("{} Loaded actives & configuration & stock.", "✓".green());

    fs::create_dir_all(&options.output).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            options.output.display()
        )
    })?;

    let aiz_routes = fetch_routes(options, AIZ_ROUTES_CACHE, aiz_finder, &targets)?;
    let pos_routes = fetch_routes(options, POS_ROUTES_CACHE, pos_finder, &targets)?;

    let library = TemplateLibrary::load(&config.template_library)?;
    println!(
        "  {} {} templates in library",
        "→".blue(),
        library.len()
    );

    let scorer = scorer_for(options.scoring_type, stock, price_predictor(config)?)?;
    let analyser = AizPosTemplateAnalyser::new(library, scorer)
        .with_popular_fraction(config.analysis.popular_fraction);

    let report = TemplateReport::build(&analyser, &aiz_routes, &pos_routes)?;
    report.write(&options.output)?;

    println!(
        "  {} popular {}, unused {}, overlooked {}, novel {}",
        "→".blue(),
        report.popular.len(),
        report.unused.len(),
        report.overlooked.len(),
        report.novel.len()
    );
    println!("{} Analysis complete.", "✓".green().bold());
    Ok(report)
}

fn fetch_routes(
    options: &RunOptions,
    cache_name: &str,
    finder: &dyn RouteFinder,
    targets: &[String],
) -> Result<RouteSet> {
    let cache = options.output.join(cache_name);
    let cached = cache.is_file();

    let routes = load_or_compute(&cache, || {
        println!(
            "  {} Finding routes with {} for {} targets...",
            "→".blue(),
            finder.name(),
            targets.len()
        );
        finder
            .find_routes(targets)
            .with_context(|| format!("{} route search failed", finder.name()))
    })?;

    println!(
        "  {} {} routes: {} targets, {} solved, {} routes{}",
        "→".blue(),
        finder.name(),
        routes.len(),
        routes.solved_count(),
        routes.route_count(),
        if cached { " (cached)".dimmed().to_string() } else { String::new() }
    );
    Ok(routes)
}

fn price_predictor(config: &Config) -> Result<Option<Box<dyn PricePredictor>>> {
    match config.coprinet_command.as_deref() {
        Some(parts) if !parts.is_empty() => {
            let command = ExternalCommand::from_parts(parts)?;
            let predictor: Box<dyn PricePredictor> = Box::new(CoprinetPredictor::new(command));
            Ok(Some(predictor))
        }
        _ => Ok(None),
    }
}

/// Postera finder that reads the API key only when routes are actually requested.
struct DeferredPostera<'a> {
    config: &'a Config,
}

impl RouteFinder for DeferredPostera<'_> {
    fn name(&self) -> &str {
        "postera"
    }

    fn find_routes(&self, targets: &[String]) -> Result<RouteSet> {
        let api_key = postera_api_key()?;
        let client = PosteraClient::new(api_key, self.config.postera.clone())?;
        let mut finder = PosRouteFinder::new(client);
        if let Some(parts) = self.config.template_extractor.as_deref() {
            finder = finder.with_extractor(ExternalCommand::from_parts(parts)?);
        }
        finder.find_routes(targets)
    }
}
