use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How routes are weighted when tallying template usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScoringType {
    /// aizynthfinder-style state score (stock fraction and route depth)
    #[default]
    State,
    /// Summed stock prices of the starting materials
    Cost,
    /// Starting material prices predicted by CoPriNet
    Coprinet,
    /// Every route counts once
    Frequency,
}

impl ScoringType {
    /// Whether this scoring type needs the stock table loaded.
    pub fn needs_stock(&self) -> bool {
        matches!(self, ScoringType::Cost)
    }
}

impl std::fmt::Display for ScoringType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringType::State => write!(f, "state"),
            ScoringType::Cost => write!(f, "cost"),
            ScoringType::Coprinet => write!(f, "coprinet"),
            ScoringType::Frequency => write!(f, "frequency"),
        }
    }
}

impl std::str::FromStr for ScoringType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "state" => Ok(ScoringType::State),
            "cost" => Ok(ScoringType::Cost),
            "coprinet" => Ok(ScoringType::Coprinet),
            "frequency" => Ok(ScoringType::Frequency),
            _ => anyhow::bail!(
                "Invalid scoring type: {s}. Use: state, cost, coprinet, frequency"
            ),
        }
    }
}
