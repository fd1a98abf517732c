//! Purchasable building blocks and their prices.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

use super::table::Table;
use crate::models::constants::{STOCK_KEY_COLUMN, STOCK_PRICE_COLUMN};

/// Map from molecule identifier (inchi key) to price.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stock {
    prices: HashMap<String, f64>,
}

impl Stock {
    /// Load from a delimited table with `inchi_key` and `price` columns.
    ///
    /// A key listed more than once keeps the price from its last row.
    pub fn load(path: &Path) -> Result<Self> {
        let table = Table::read(path)
            .with_context(|| format!("Failed to load stock: {}", path.display()))?;

        let key_idx = table.column_index(STOCK_KEY_COLUMN)?;
        let price_idx = table.column_index(STOCK_PRICE_COLUMN)?;

        let mut stock = Stock::default();
        for row in table.rows() {
            let key = table.cell(row, key_idx)?;
            let raw = table.cell(row, price_idx)?;
            let price: f64 = raw
                .parse()
                .map_err(|_| table.row_error(row, format!("invalid price '{raw}'")))?;
            if !price.is_finite() || price < 0.0 {
                return Err(table.row_error(row, format!("price must be finite and >= 0, got {raw}")).into());
            }
            stock.insert(key, price);
        }

        tracing::debug!(path = %path.display(), entries = stock.len(), "loaded stock");
        Ok(stock)
    }

    pub fn insert(&mut self, key: impl Into<String>, price: f64) {
        self.prices.insert(key.into(), price);
    }

    pub fn price(&self, key: &str) -> Option<f64> {
        self.prices.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.prices.contains_key(key)
    }

    /// Highest listed price, if any.
    pub fn max_price(&self) -> Option<f64> {
        self.prices.values().copied().reduce(f64::max)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl FromIterator<(String, f64)> for Stock {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Stock {
            prices: iter.into_iter().collect(),
        }
    }
}
