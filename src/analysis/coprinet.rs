//! Starting-material prices predicted by CoPriNet.

use anyhow::{Context, Result};

use crate::external::ExternalCommand;

/// Predicts a price for each molecule; `None` where no prediction could be made.
pub trait PricePredictor {
    fn predict(&self, smiles: &[String]) -> Result<Vec<Option<f64>>>;
}

/// CoPriNet behind a line-oriented command: SMILES in, one price per line out.
pub struct CoprinetPredictor {
    command: ExternalCommand,
}

impl CoprinetPredictor {
    pub fn new(command: ExternalCommand) -> Self {
        Self { command }
    }
}

impl PricePredictor for CoprinetPredictor {
    fn predict(&self, smiles: &[String]) -> Result<Vec<Option<f64>>> {
        tracing::debug!(molecules = smiles.len(), "predicting prices with CoPriNet");
        let lines = self
            .command
            .filter_lines(smiles)
            .context("CoPriNet price prediction failed")?;
        Ok(lines.iter().map(|line| parse_price(line)).collect())
    }
}

fn parse_price(line: &str) -> Option<f64> {
    line.parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
}
