use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};

/// Static generator parameters for one tradable symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolProfile {
    /// Ticker id, e.g. `BTC/USD`.
    pub id: String,
    pub display_name: String,
    /// Starting price for a fresh history.
    pub base_price: f64,
    /// Per-candle perturbation scale, as a fraction of price.
    pub base_volatility: f64,
}

impl SymbolProfile {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        base_price: f64,
        base_volatility: f64,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            base_price,
            base_volatility,
        }
    }

    /// Base asset of the id, e.g. `BTC` for `BTC/USD`.
    #[must_use]
    pub fn base_asset(&self) -> &str {
        self.id.split('/').next().unwrap_or(&self.id)
    }

    /// Rejects non-positive prices and negative or non-finite volatility.
    pub fn validate(&self) -> DomainResult<()> {
        if !(self.base_price.is_finite() && self.base_price > 0.0) {
            return Err(DomainError::invalid(
                "base_price",
                format!("must be a positive number, got {}", self.base_price),
            ));
        }
        if !(self.base_volatility.is_finite() && self.base_volatility >= 0.0) {
            return Err(DomainError::invalid(
                "base_volatility",
                format!("must be a non-negative number, got {}", self.base_volatility),
            ));
        }
        Ok(())
    }
}

/// The fixed set of symbols offered by the dashboard.
#[derive(Debug, Clone)]
pub struct SymbolCatalog {
    profiles: Vec<SymbolProfile>,
}

impl SymbolCatalog {
    pub fn new(profiles: Vec<SymbolProfile>) -> Self {
        Self { profiles }
    }

    #[must_use]
    pub fn profiles(&self) -> &[SymbolProfile] {
        &self.profiles
    }

    /// Looks a profile up by id.
    pub fn get(&self, id: &str) -> DomainResult<&SymbolProfile> {
        self.profiles
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| DomainError::UnknownSymbol(id.to_string()))
    }
}

impl Default for SymbolCatalog {
    fn default() -> Self {
        Self::new(vec![
            SymbolProfile::new("BTC/USD", "Bitcoin", 95_000.0, 0.005),
            SymbolProfile::new("ETH/USD", "Ethereum", 3_200.0, 0.006),
            SymbolProfile::new("NVDA", "NVIDIA", 1_450.0, 0.008),
            SymbolProfile::new("XAU/USD", "Gold", 2_950.0, 0.002),
        ])
    }
}
