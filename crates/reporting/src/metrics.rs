use std::collections::BTreeMap;

use common::models::{MonthlyPerformance, PerformanceMetrics, Trade, TradeSide};

/// Headline totals over every trade given. `None` when there are no trades.
pub fn calculate_performance_metrics(trades: &[Trade]) -> Option<PerformanceMetrics> {
    if trades.is_empty() {
        return None;
    }

    let (buys, sells): (Vec<&Trade>, Vec<&Trade>) =
        trades.iter().partition(|t| t.side == TradeSide::Buy);

    let total_buy_value: f64 = buys.iter().map(|t| t.total_value).sum();
    let total_sell_value: f64 = sells.iter().map(|t| t.total_value).sum();
    let total_fees: f64 = trades.iter().map(|t| t.fee).sum();

    let net_profit = total_sell_value - total_buy_value;
    let roi = if total_buy_value > 0.0 {
        net_profit / total_buy_value * 100.0
    } else {
        0.0
    };

    Some(PerformanceMetrics {
        total_trades: trades.len(),
        buy_count: buys.len(),
        sell_count: sells.len(),
        total_buy_value,
        total_sell_value,
        total_fees,
        net_profit,
        roi,
    })
}

/// Executed trades grouped by calendar month, oldest month first.
pub fn monthly_performance(trades: &[Trade]) -> Vec<MonthlyPerformance> {
    let mut months: BTreeMap<String, MonthlyPerformance> = BTreeMap::new();

    for trade in trades.iter().filter(|t| t.success) {
        let month = trade.timestamp.format("%Y-%m").to_string();
        let entry = months
            .entry(month.clone())
            .or_insert_with(|| MonthlyPerformance {
                month,
                trade_count: 0,
                total_value: 0.0,
                total_fees: 0.0,
            });
        entry.trade_count += 1;
        entry.total_value += trade.total_value;
        entry.total_fees += trade.fee;
    }

    months.into_values().collect()
}
