use charming::{
    Chart, HtmlRenderer,
    component::{Axis, Grid, Legend, Title},
    element::{AxisType, Tooltip, Trigger},
    series::{Bar, Line},
    theme::Theme,
};
use common::models::{MonthlyPerformance, PortfolioSnapshot};

use crate::error::ApiError;

const WIDTH: u64 = 1000;
const HEIGHT: u64 = 420;

/// Total value, quote balance and base position value per snapshot day, oldest first.
pub fn portfolio_chart(history: &[PortfolioSnapshot], base_asset: &str, quote_asset: &str) -> Chart {
    let mut ordered: Vec<&PortfolioSnapshot> = history.iter().collect();
    ordered.sort_by_key(|s| s.date);

    let dates = ordered
        .iter()
        .map(|s| s.date.format("%Y-%m-%d").to_string())
        .collect::<Vec<_>>();
    let totals = ordered.iter().map(|s| s.total_value).collect::<Vec<_>>();
    let quote = ordered.iter().map(|s| s.quote_balance).collect::<Vec<_>>();
    let base = ordered.iter().map(|s| s.base_value()).collect::<Vec<_>>();

    Chart::new()
        .title(Title::new().text("Portfolio value"))
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .legend(Legend::new().bottom(10).left("center"))
        .grid(Grid::new().left("10%").right("5%").bottom(60))
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .boundary_gap(false)
                .data(dates),
        )
        .y_axis(Axis::new().type_(AxisType::Value).scale(true))
        .series(Line::new().name("Total value").data(totals))
        .series(Line::new().name(format!("{quote_asset} balance")).data(quote))
        .series(Line::new().name(format!("{base_asset} value")).data(base))
}

/// Executed trades per month.
pub fn monthly_chart(months: &[MonthlyPerformance]) -> Chart {
    let labels = months.iter().map(|m| m.month.clone()).collect::<Vec<_>>();
    let counts = months.iter().map(|m| m.trade_count as i64).collect::<Vec<_>>();

    Chart::new()
        .title(Title::new().text("Monthly trades"))
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .grid(Grid::new().left("10%").right("5%").bottom(40))
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(Bar::new().name("Trades").data(counts))
}

pub fn render(title: &str, chart: &Chart) -> Result<String, ApiError> {
    let renderer = HtmlRenderer::new(title.to_string(), WIDTH, HEIGHT).theme(Theme::Dark);
    renderer
        .render(chart)
        .map_err(|e| ApiError::Render(format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn snapshot(day: u32, total: f64) -> PortfolioSnapshot {
        PortfolioSnapshot {
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            quote_balance: total / 2.0,
            base_balance: 0.01,
            base_avg_price: total * 50.0,
            total_value: total,
            profit_loss: 0.0,
            profit_loss_percent: 0.0,
        }
    }

    #[test]
    fn portfolio_chart_is_chronological() {
        let history = vec![snapshot(3, 300.0), snapshot(1, 100.0), snapshot(2, 200.0)];
        let json = portfolio_chart(&history, "BTC", "KRW").to_string();

        let first = json.find("2025-01-01").unwrap();
        let last = json.find("2025-01-03").unwrap();
        assert!(first < last);
        assert!(json.contains("KRW balance"));
        assert!(json.contains("BTC value"));
    }

    #[test]
    fn renders_monthly_chart_page() {
        let months = vec![MonthlyPerformance {
            month: "2025-01".into(),
            trade_count: 4,
            total_value: 1_000.0,
            total_fees: 1.0,
        }];
        let html = render("Monthly trades", &monthly_chart(&months)).unwrap();
        assert!(html.contains("echarts"));
        assert!(html.contains("2025-01"));
    }
}
