use askama::Template;
use chrono::{DateTime, Local, Utc};
use common::config::Settings;
use common::models::{
    AnalysisLog, ConnectionState, LivePortfolio, PerformanceAnalysis, PerformanceMetrics,
    PortfolioSource, Reflection, SystemStatus, Trade, TradeSide,
};
use reporting::format::{amount, minute, money, pct, signed_pct};

use crate::data::DashboardData;

pub struct BadgeView {
    pub label: &'static str,
    pub class: &'static str,
    pub detail: String,
}

impl From<&ConnectionState> for BadgeView {
    fn from(state: &ConnectionState) -> Self {
        let (class, detail) = match state {
            ConnectionState::Connected => ("ok", String::new()),
            ConnectionState::Disconnected(reason) => ("bad", reason.clone()),
            ConnectionState::NotConfigured | ConnectionState::Unknown => ("muted", String::new()),
        };
        Self {
            label: state.label(),
            class,
            detail,
        }
    }
}

pub struct StatusView {
    pub market_feed: BadgeView,
    pub account: BadgeView,
    pub last_checked: String,
}

pub struct PortfolioView {
    pub source: &'static str,
    pub base_asset: String,
    pub quote_asset: String,
    pub price: String,
    pub base_balance: String,
    pub base_value: String,
    pub quote_balance: String,
    pub total_value: String,
    pub avg_cost: String,
    pub return_pct: String,
    pub return_class: &'static str,
    pub as_of: String,
}

pub struct OverviewView {
    pub total_trades: usize,
    pub split: String,
    pub net_profit: String,
    pub roi: String,
    pub profit_class: &'static str,
    pub total_buy: String,
    pub total_fees: String,
}

pub struct TradeView {
    pub time: String,
    pub side: &'static str,
    pub price: String,
    pub amount: String,
    pub total: String,
    pub fee: String,
    pub success: bool,
    pub error: String,
}

pub struct LogView {
    pub time: String,
    pub decision: String,
    pub decision_class: &'static str,
    pub confidence: String,
    pub reason: String,
    pub price: String,
    pub analysis_type: String,
}

pub struct ReflectionView {
    pub date: String,
    pub period: String,
    pub trades: String,
    pub win_rate: String,
    pub profit_loss: String,
    pub content: String,
    pub lessons: String,
}

pub struct WindowView {
    pub period: String,
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub profit_loss: String,
    pub profit_class: &'static str,
    pub win_rate: String,
}

pub struct DecisionView {
    pub decision: String,
    pub count: i64,
}

pub struct SidebarView {
    pub last_update: String,
    pub latest_trade: Option<String>,
    pub total_trades: usize,
    pub successful_trades: usize,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub refresh_secs: u64,
    pub demo: bool,
    pub error: Option<String>,
    pub status: StatusView,
    pub portfolio: Option<PortfolioView>,
    pub loaded: bool,
    pub overview: Option<OverviewView>,
    pub trades: Vec<TradeView>,
    pub has_history: bool,
    pub has_monthly: bool,
    pub logs: Vec<LogView>,
    pub reflections: Vec<ReflectionView>,
    pub window: Option<WindowView>,
    pub decisions: Vec<DecisionView>,
    pub sidebar: SidebarView,
    pub base_asset: String,
}

impl DashboardPage {
    /// `data` is `Err` with the failure message when the journal could not be read;
    /// status and portfolio still render in that case.
    pub fn build(
        settings: &Settings,
        status: &SystemStatus,
        portfolio: Option<&LivePortfolio>,
        data: Result<&DashboardData, String>,
    ) -> Self {
        let symbol = settings.currency_symbol.as_str();
        let (data, error) = match data {
            Ok(data) => (Some(data), None),
            Err(e) => (None, Some(e)),
        };

        Self {
            refresh_secs: settings.page_refresh.as_secs(),
            demo: settings.demo_mode(),
            error,
            status: status_view(status),
            portfolio: portfolio.map(|p| portfolio_view(p, symbol)),
            loaded: data.is_some(),
            overview: data
                .and_then(|d| d.metrics.as_ref())
                .map(|m| overview_view(m, symbol)),
            trades: data
                .map(|d| d.trades.iter().map(|t| trade_view(t, symbol)).collect())
                .unwrap_or_default(),
            has_history: data.is_some_and(|d| !d.portfolio_history.is_empty()),
            has_monthly: data.is_some_and(|d| !d.monthly.is_empty()),
            logs: data
                .map(|d| d.recent_logs.iter().map(|l| log_view(l, symbol)).collect())
                .unwrap_or_default(),
            reflections: data
                .map(|d| d.reflections.iter().map(|r| reflection_view(r, symbol)).collect())
                .unwrap_or_default(),
            window: data.map(|d| window_view(&d.performance, symbol)),
            decisions: data
                .map(|d| {
                    d.stats
                        .ai_decisions
                        .iter()
                        .map(|(decision, count)| DecisionView {
                            decision: decision.clone(),
                            count: *count,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            sidebar: sidebar_view(data),
            base_asset: settings.exchange.base_asset.clone(),
        }
    }
}

fn local_time(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

fn status_view(status: &SystemStatus) -> StatusView {
    StatusView {
        market_feed: BadgeView::from(&status.market_feed),
        account: BadgeView::from(&status.account),
        last_checked: status
            .last_checked
            .as_ref()
            .map(local_time)
            .unwrap_or_else(|| "never".to_string()),
    }
}

fn portfolio_view(p: &LivePortfolio, symbol: &str) -> PortfolioView {
    PortfolioView {
        source: match p.source {
            PortfolioSource::Exchange => "live exchange balances",
            PortfolioSource::Journal => "latest journal snapshot",
        },
        base_asset: p.base_asset.clone(),
        quote_asset: p.quote_asset.clone(),
        price: money(p.price, symbol),
        base_balance: amount(p.base_balance),
        base_value: money(p.base_value, symbol),
        quote_balance: money(p.quote_balance, symbol),
        total_value: money(p.total_value, symbol),
        avg_cost: p
            .avg_cost
            .map(|c| money(c, symbol))
            .unwrap_or_else(|| "-".to_string()),
        return_pct: p.return_pct.map(signed_pct).unwrap_or_else(|| "-".to_string()),
        return_class: match p.return_pct {
            Some(r) if r < 0.0 => "bad",
            Some(_) => "ok",
            None => "muted",
        },
        as_of: local_time(&p.as_of),
    }
}

fn overview_view(m: &PerformanceMetrics, symbol: &str) -> OverviewView {
    OverviewView {
        total_trades: m.total_trades,
        split: format!("buy {} / sell {}", m.buy_count, m.sell_count),
        net_profit: money(m.net_profit, symbol),
        roi: signed_pct(m.roi),
        profit_class: if m.net_profit >= 0.0 { "ok" } else { "bad" },
        total_buy: money(m.total_buy_value, symbol),
        total_fees: money(m.total_fees, symbol),
    }
}

fn trade_view(t: &Trade, symbol: &str) -> TradeView {
    TradeView {
        time: minute(&t.timestamp),
        side: t.side.as_str(),
        price: money(t.price, symbol),
        amount: amount(t.amount),
        total: money(t.total_value, symbol),
        fee: money(t.fee, symbol),
        success: t.success,
        error: t.error_message.clone().unwrap_or_default(),
    }
}

fn log_view(l: &AnalysisLog, symbol: &str) -> LogView {
    let decision = l.decision.to_lowercase();
    LogView {
        time: minute(&l.timestamp),
        decision_class: match decision.parse::<TradeSide>() {
            Ok(TradeSide::Buy) => "buy",
            Ok(TradeSide::Sell) => "sell",
            Err(_) => "hold",
        },
        decision: if decision.is_empty() {
            "-".to_string()
        } else {
            decision.to_uppercase()
        },
        confidence: l.confidence.clone(),
        reason: l.reason.clone(),
        price: money(l.current_price, symbol),
        analysis_type: l.analysis_type.clone(),
    }
}

fn reflection_view(r: &Reflection, symbol: &str) -> ReflectionView {
    ReflectionView {
        date: minute(&r.reflection_date),
        period: format!("{} ~ {}", r.analysis_period_start, r.analysis_period_end),
        trades: format!(
            "{} ({} won / {} lost)",
            r.total_trades_analyzed, r.successful_trades, r.failed_trades
        ),
        win_rate: pct(r.win_rate),
        profit_loss: money(r.total_profit_loss, symbol),
        content: r.reflection_content.clone(),
        lessons: r.lessons_learned.clone(),
    }
}

fn window_view(p: &PerformanceAnalysis, symbol: &str) -> WindowView {
    WindowView {
        period: format!("{} ~ {}", p.period_start, p.period_end),
        total_trades: p.total_trades,
        wins: p.successful_trades,
        losses: p.failed_trades,
        profit_loss: money(p.total_profit_loss, symbol),
        profit_class: if p.total_profit_loss >= 0.0 { "ok" } else { "bad" },
        win_rate: pct(p.win_rate),
    }
}

fn sidebar_view(data: Option<&DashboardData>) -> SidebarView {
    let Some(data) = data else {
        return SidebarView {
            last_update: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            latest_trade: None,
            total_trades: 0,
            successful_trades: 0,
        };
    };

    SidebarView {
        last_update: data.loaded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        latest_trade: data.trades.first().map(|t| minute(&t.timestamp)),
        total_trades: data.trades.len(),
        successful_trades: data.successful_trades().count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use common::models::{PerformanceAnalysis, TradingStats};
    use common::time::parse_timestamp;

    fn settings() -> Settings {
        Settings::from_lookup(|_| None).unwrap()
    }

    fn trade(side: TradeSide, success: bool) -> Trade {
        Trade {
            id: 1,
            timestamp: parse_timestamp("2025-03-01T09:30:00").unwrap(),
            side,
            price: 95_000_000.0,
            amount: 0.0105,
            total_value: 997_500.0,
            fee: 498.75,
            order_id: None,
            success,
            error_message: (!success).then(|| "insufficient funds".to_string()),
        }
    }

    fn data(trades: Vec<Trade>) -> DashboardData {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        DashboardData {
            metrics: reporting::calculate_performance_metrics(&trades),
            monthly: reporting::monthly_performance(&trades),
            trades,
            portfolio_history: Vec::new(),
            recent_logs: Vec::new(),
            reflections: Vec::new(),
            stats: TradingStats::default(),
            performance: PerformanceAnalysis {
                total_trades: 0,
                successful_trades: 0,
                failed_trades: 0,
                total_profit_loss: 0.0,
                win_rate: 0.0,
                period_start: day,
                period_end: day,
            },
            loaded_at: parse_timestamp("2025-03-01T10:00:00").unwrap(),
        }
    }

    #[test]
    fn trade_rows_are_formatted() {
        let view = trade_view(&trade(TradeSide::Buy, true), "₩");
        assert_eq!(view.time, "2025-03-01 09:30");
        assert_eq!(view.price, "₩95,000,000");
        assert_eq!(view.amount, "0.010500");
        assert_eq!(view.fee, "₩499");
    }

    #[test]
    fn sidebar_counts_successes() {
        let d = data(vec![trade(TradeSide::Sell, false), trade(TradeSide::Buy, true)]);
        let sidebar = sidebar_view(Some(&d));
        assert_eq!(sidebar.total_trades, 2);
        assert_eq!(sidebar.successful_trades, 1);
        assert_eq!(sidebar.latest_trade.as_deref(), Some("2025-03-01 09:30"));
        assert_eq!(sidebar.last_update, "2025-03-01 10:00:00");
    }

    #[test]
    fn empty_journal_shows_warnings() {
        let d = data(Vec::new());
        let html = DashboardPage::build(&settings(), &SystemStatus::default(), None, Ok(&d))
            .render()
            .unwrap();
        assert!(html.contains("No trades recorded"));
        assert!(html.contains("No portfolio history"));
        assert!(html.contains("Demo mode"));
    }

    #[test]
    fn load_failure_shows_banner_and_status() {
        let html = DashboardPage::build(
            &settings(),
            &SystemStatus::default(),
            None,
            Err("database is locked".to_string()),
        )
        .render()
        .unwrap();
        assert!(html.contains("Failed to load data"));
        assert!(html.contains("database is locked"));
        assert!(html.contains("System status"));
        assert!(!html.contains("Trade history"));
    }

    #[test]
    fn trades_render_in_table() {
        let d = data(vec![trade(TradeSide::Buy, true)]);
        let html = DashboardPage::build(&settings(), &SystemStatus::default(), None, Ok(&d))
            .render()
            .unwrap();
        assert!(html.contains("Trade history"));
        assert!(html.contains("₩997,500"));
        assert!(html.contains("buy 1"));
        assert!(!html.contains("No trades recorded"));
    }
}
