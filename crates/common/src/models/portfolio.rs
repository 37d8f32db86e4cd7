use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// End-of-day holdings, one row per calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub date: NaiveDate,
    pub quote_balance: f64,
    pub base_balance: f64,
    pub base_avg_price: f64,
    pub total_value: f64,
    pub profit_loss: f64,
    pub profit_loss_percent: f64,
}

impl PortfolioSnapshot {
    /// Base holdings valued at their average purchase price.
    pub fn base_value(&self) -> f64 {
        self.base_balance * self.base_avg_price
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortfolioSource {
    Exchange,
    Journal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivePortfolio {
    pub source: PortfolioSource,
    pub base_asset: String,
    pub quote_asset: String,
    pub price: f64,
    pub base_balance: f64,
    pub quote_balance: f64,
    pub base_value: f64,
    pub total_value: f64,
    pub avg_cost: Option<f64>,
    pub return_pct: Option<f64>,
    pub as_of: DateTime<Utc>,
}

impl LivePortfolio {
    pub fn with_cost_basis(mut self, avg_cost: Option<f64>) -> Self {
        self.avg_cost = avg_cost.filter(|c| *c > 0.0);
        self.return_pct = match self.avg_cost {
            Some(cost) if self.price > 0.0 => Some((self.price / cost - 1.0) * 100.0),
            _ => None,
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portfolio(price: f64) -> LivePortfolio {
        LivePortfolio {
            source: PortfolioSource::Exchange,
            base_asset: "BTC".into(),
            quote_asset: "KRW".into(),
            price,
            base_balance: 0.5,
            quote_balance: 1_000.0,
            base_value: 0.5 * price,
            total_value: 1_000.0 + 0.5 * price,
            avg_cost: None,
            return_pct: None,
            as_of: Utc::now(),
        }
    }

    #[test]
    fn return_follows_cost_basis() {
        let p = portfolio(110.0).with_cost_basis(Some(100.0));
        assert_eq!(p.avg_cost, Some(100.0));
        assert!((p.return_pct.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn zero_cost_basis_has_no_return() {
        let p = portfolio(110.0).with_cost_basis(Some(0.0));
        assert_eq!(p.avg_cost, None);
        assert_eq!(p.return_pct, None);
    }
}
