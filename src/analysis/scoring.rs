//! Route weights.
//!
//! Every route gets a weight in (0, 1]. Template usage is the sum of the
//! weights of the routes a template appears in, so the scoring type decides
//! whether a template used in one cheap, short route outranks one used in
//! several long ones.

use anyhow::{bail, Result};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use super::coprinet::PricePredictor;
use crate::fs::Stock;
use crate::models::constants::scoring::{
    NOT_IN_STOCK_MULTIPLIER, STATE_DEPTH_OFFSET, STATE_DEPTH_WEIGHT, STATE_STOCK_WEIGHT,
};
use crate::models::{MoleculeNode, RouteNode, RouteSet, ScoringType};

/// Weights for a route set, `weights[i][j]` for tree `j` of target `i`.
pub type RouteWeights = Vec<Vec<f64>>;

pub trait RouteScorer {
    fn score_routes(&self, routes: &RouteSet) -> Result<RouteWeights>;
}

fn score_each(routes: &RouteSet, f: impl Fn(&RouteNode) -> f64) -> RouteWeights {
    routes
        .iter()
        .map(|entry| entry.trees.iter().map(&f).collect())
        .collect()
}

/// Every route counts once.
pub struct FrequencyScorer;

impl RouteScorer for FrequencyScorer {
    fn score_routes(&self, routes: &RouteSet) -> Result<RouteWeights> {
        Ok(score_each(routes, |_| 1.0))
    }
}

/// Stock fraction of the starting materials, with a small bonus for short routes.
pub struct StateScorer;

impl StateScorer {
    pub fn score(route: &RouteNode) -> f64 {
        let leaves = route.leaves();
        let in_stock = leaves.iter().filter(|m| m.in_stock).count();
        let fraction = if leaves.is_empty() {
            0.0
        } else {
            in_stock as f64 / leaves.len() as f64
        };
        let squashed_depth = 1.0 / (1.0 + (route.depth() as f64 - STATE_DEPTH_OFFSET).exp());
        STATE_STOCK_WEIGHT * fraction + STATE_DEPTH_WEIGHT * squashed_depth
    }
}

impl RouteScorer for StateScorer {
    fn score_routes(&self, routes: &RouteSet) -> Result<RouteWeights> {
        Ok(score_each(routes, Self::score))
    }
}

/// Route cost from leaf prices; leaves without a price cost `unpriced`.
pub fn route_cost(
    route: &RouteNode,
    price: impl Fn(&MoleculeNode) -> Option<f64>,
    unpriced: f64,
) -> f64 {
    route
        .leaves()
        .into_iter()
        .map(|leaf| price(leaf).unwrap_or(unpriced))
        .sum()
}

/// Cheaper routes weigh more.
pub fn cost_weight(cost: f64) -> f64 {
    1.0 / (1.0 + cost.max(0.0))
}

/// Leaf prices from the stock table.
pub struct CostScorer {
    stock: Stock,
    unpriced: f64,
}

impl CostScorer {
    pub fn new(stock: Stock) -> Self {
        let unpriced = NOT_IN_STOCK_MULTIPLIER * stock.max_price().unwrap_or(1.0).max(1.0);
        Self { stock, unpriced }
    }

    pub fn score(&self, route: &RouteNode) -> f64 {
        cost_weight(route_cost(
            route,
            |leaf| self.stock.price(leaf.lookup_key()),
            self.unpriced,
        ))
    }
}

impl RouteScorer for CostScorer {
    fn score_routes(&self, routes: &RouteSet) -> Result<RouteWeights> {
        Ok(score_each(routes, |route| self.score(route)))
    }
}

/// Distinct starting materials of a route set.
fn leaf_smiles(routes: &RouteSet) -> BTreeSet<String> {
    routes
        .iter()
        .flat_map(|entry| entry.trees.iter())
        .flat_map(|tree| tree.leaves())
        .map(|leaf| leaf.smiles.clone())
        .collect()
}

/// Leaf prices predicted by CoPriNet.
///
/// Predictions are memoised, so a molecule shared by both route sets is only
/// sent to the predictor once.
pub struct CoprinetScorer {
    predictor: Box<dyn PricePredictor>,
    predicted: RefCell<HashMap<String, Option<f64>>>,
}

impl CoprinetScorer {
    pub fn new(predictor: Box<dyn PricePredictor>) -> Self {
        Self {
            predictor,
            predicted: RefCell::new(HashMap::new()),
        }
    }

    fn predict_missing(&self, routes: &RouteSet) -> Result<()> {
        let missing: BTreeSet<String> = {
            let predicted = self.predicted.borrow();
            leaf_smiles(routes)
                .into_iter()
                .filter(|smiles| !predicted.contains_key(smiles))
                .collect()
        };
        if missing.is_empty() {
            return Ok(());
        }

        let missing: Vec<String> = missing.into_iter().collect();
        let prices = self.predictor.predict(&missing)?;
        if prices.len() != missing.len() {
            bail!(
                "price predictor returned {} prices for {} molecules",
                prices.len(),
                missing.len()
            );
        }

        self.predicted
            .borrow_mut()
            .extend(missing.into_iter().zip(prices));
        Ok(())
    }
}

impl RouteScorer for CoprinetScorer {
    fn score_routes(&self, routes: &RouteSet) -> Result<RouteWeights> {
        self.predict_missing(routes)?;

        let predicted = self.predicted.borrow();
        // Only this set's leaves, so one route set's weights never depend on another's.
        let max_price = leaf_smiles(routes)
            .iter()
            .filter_map(|smiles| predicted.get(smiles).copied().flatten())
            .reduce(f64::max)
            .unwrap_or(1.0)
            .max(1.0);
        let unpriced = NOT_IN_STOCK_MULTIPLIER * max_price;

        Ok(score_each(routes, |route| {
            cost_weight(route_cost(
                route,
                |leaf| predicted.get(&leaf.smiles).copied().flatten(),
                unpriced,
            ))
        }))
    }
}

/// Build the scorer for a scoring type.
///
/// `cost` needs the stock table and `coprinet` a price predictor.
pub fn scorer_for(
    scoring_type: ScoringType,
    stock: Option<Stock>,
    predictor: Option<Box<dyn PricePredictor>>,
) -> Result<Box<dyn RouteScorer>> {
    let scorer: Box<dyn RouteScorer> = match scoring_type {
        ScoringType::State => Box::new(StateScorer),
        ScoringType::Frequency => Box::new(FrequencyScorer),
        ScoringType::Cost => match stock {
            Some(stock) => Box::new(CostScorer::new(stock)),
            None => bail!("cost scoring requires a stock table"),
        },
        ScoringType::Coprinet => match predictor {
            Some(predictor) => Box::new(CoprinetScorer::new(predictor)),
            None => bail!("coprinet scoring requires a price predictor"),
        },
    };
    Ok(scorer)
}
