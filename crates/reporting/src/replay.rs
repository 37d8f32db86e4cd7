use chrono::NaiveDate;
use common::models::{PerformanceAnalysis, Trade, TradeSide};
use tracing::debug;

const DUST: f64 = 1e-12;

/// Average-cost position built by replaying executed trades.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub quantity: f64,
    pub cost: f64,
}

impl Position {
    pub fn avg_cost(&self) -> Option<f64> {
        (self.quantity > DUST).then(|| self.cost / self.quantity)
    }

    /// Applies one trade and returns the realised profit for sells.
    pub fn apply(&mut self, trade: &Trade) -> Option<f64> {
        match trade.side {
            TradeSide::Buy => {
                self.quantity += trade.amount;
                self.cost += trade.total_value + trade.fee;
                None
            }
            TradeSide::Sell => {
                let avg = self.avg_cost().unwrap_or(0.0);
                let sold = trade.amount.min(self.quantity.max(0.0));
                let realised = trade.total_value - trade.fee - trade.amount * avg;

                self.cost -= sold * avg;
                self.quantity -= sold;
                if self.quantity <= DUST {
                    *self = Position::default();
                }
                Some(realised)
            }
        }
    }
}

fn replay<'a>(trades: impl IntoIterator<Item = &'a Trade>) -> Vec<&'a Trade> {
    let mut ordered: Vec<&Trade> = trades.into_iter().filter(|t| t.success).collect();
    ordered.sort_by_key(|t| (t.timestamp, t.id));
    ordered
}

/// Realised results of the executed trades in `trades`, replayed oldest first.
pub fn analyze_performance(trades: &[Trade], start: NaiveDate, end: NaiveDate) -> PerformanceAnalysis {
    let ordered = replay(trades);

    let mut position = Position::default();
    let mut wins = 0;
    let mut losses = 0;
    let mut total_profit_loss = 0.0;

    for trade in &ordered {
        if let Some(realised) = position.apply(trade) {
            total_profit_loss += realised;
            if realised > 0.0 {
                wins += 1;
            } else {
                losses += 1;
            }
        }
    }

    let total_trades = ordered.len();
    let win_rate = if total_trades > 0 {
        wins as f64 / total_trades as f64 * 100.0
    } else {
        0.0
    };

    debug!(
        "Replayed {} trades: {} wins, {} losses, P/L {:.2}",
        total_trades, wins, losses, total_profit_loss
    );

    PerformanceAnalysis {
        total_trades,
        successful_trades: wins,
        failed_trades: losses,
        total_profit_loss,
        win_rate,
        period_start: start,
        period_end: end,
    }
}

/// Average cost of whatever is still held after replaying every executed trade.
pub fn cost_basis(trades: &[Trade]) -> Option<f64> {
    let mut position = Position::default();
    for trade in replay(trades) {
        position.apply(trade);
    }
    position.avg_cost()
}
