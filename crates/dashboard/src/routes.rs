use std::sync::Arc;

use askama::Template;
use axum::{
    Json, Router,
    extract::{Query, State},
    response::{Html, Redirect},
    routing::{get, post},
};
use chrono::{Duration, NaiveDate};
use common::config::MAX_DAYS;
use common::models::{
    AnalysisLog, LivePortfolio, MarketContext, PerformanceAnalysis, PortfolioSnapshot, Reflection,
    SystemStatus, Trade, TradingStats,
};
use common::time;
use reporting::analyze_performance;
use serde::Deserialize;
use serde_json::{Value, json};
use storage::repositories::{
    AnalysisLogRepository, PortfolioRepository, ReflectionRepository, StatsRepository,
    TradeRepository,
};
use tracing::{error, info};

use crate::charts;
use crate::data::DashboardData;
use crate::error::ApiError;
use crate::state::AppState;
use crate::views::DashboardPage;

const MAX_LIMIT: i64 = 1_000;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/refresh", post(refresh))
        .route("/charts/portfolio", get(portfolio_chart))
        .route("/charts/monthly", get(monthly_chart))
        .route("/api/status", get(api_status))
        .route("/api/portfolio", get(api_portfolio))
        .route("/api/logs", get(api_logs))
        .route("/api/trades", get(api_trades))
        .route("/api/stats", get(api_stats))
        .route("/api/performance", get(api_performance))
        .route("/api/snapshots", get(api_snapshots))
        .route("/api/reflections", get(api_reflections))
        .route("/api/context", get(api_context))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TradesQuery {
    from: Option<String>,
    to: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DaysQuery {
    days: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContextQuery {
    at: Option<String>,
}

fn bounded(name: &str, raw: Option<&str>, default: i64, max: i64) -> Result<i64, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(default);
    };
    match raw.parse::<i64>() {
        Ok(n) if (1..=max).contains(&n) => Ok(n),
        _ => Err(ApiError::BadRequest(format!(
            "{name} must be an integer between 1 and {max}, got {raw:?}"
        ))),
    }
}

fn date_param(name: &str, raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("{name} must be a YYYY-MM-DD date, got {raw:?}")))
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let status = state.live.status().await;
    let portfolio = state.live.portfolio().await;

    let data = state.dashboard_data().await;
    let page = match &data {
        Ok(data) => {
            DashboardPage::build(&state.settings, &status, portfolio.as_ref(), Ok(data.as_ref()))
        }
        Err(e) => {
            error!("Failed to load dashboard data: {}", e);
            DashboardPage::build(&state.settings, &status, portfolio.as_ref(), Err(e.to_string()))
        }
    };

    Ok(Html(page.render()?))
}

async fn refresh(State(state): State<AppState>) -> Redirect {
    state.cache.invalidate().await;
    info!("Dashboard cache cleared on request");
    Redirect::to("/")
}

async fn cached(state: &AppState) -> Result<Arc<DashboardData>, ApiError> {
    Ok(state.dashboard_data().await?)
}

async fn portfolio_chart(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let data = cached(&state).await?;
    let exchange = &state.settings.exchange;
    let chart = charts::portfolio_chart(
        &data.portfolio_history,
        &exchange.base_asset,
        &exchange.quote_asset,
    );
    Ok(Html(charts::render("Portfolio value", &chart)?))
}

async fn monthly_chart(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let data = cached(&state).await?;
    let chart = charts::monthly_chart(&data.monthly);
    Ok(Html(charts::render("Monthly trades", &chart)?))
}

async fn api_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(state.live.status().await)
}

async fn api_portfolio(State(state): State<AppState>) -> Json<Option<LivePortfolio>> {
    Json(state.live.portfolio().await)
}

async fn api_logs(
    State(state): State<AppState>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Vec<AnalysisLog>>, ApiError> {
    let limit = bounded("limit", q.limit.as_deref(), state.settings.recent_logs, MAX_LIMIT)?;
    let logs = AnalysisLogRepository::get_recent(state.journal.pool(), limit).await?;
    Ok(Json(logs))
}

async fn api_trades(
    State(state): State<AppState>,
    Query(q): Query<TradesQuery>,
) -> Result<Json<Vec<Trade>>, ApiError> {
    let today = time::now().date();
    let from = match q.from.as_deref() {
        Some(raw) => date_param("from", raw)?,
        None => today - Duration::days(state.settings.trade_lookback_days),
    };
    let to = match q.to.as_deref() {
        Some(raw) => date_param("to", raw)?,
        None if q.from.is_some() => from,
        None => today,
    };
    if to < from {
        return Err(ApiError::BadRequest(format!(
            "to ({to}) is before from ({from})"
        )));
    }

    let trades = TradeRepository::get_trades_by_date(state.journal.pool(), from, Some(to)).await?;
    Ok(Json(trades))
}

async fn api_stats(State(state): State<AppState>) -> Result<Json<TradingStats>, ApiError> {
    Ok(Json(StatsRepository::get_trading_stats(state.journal.pool()).await?))
}

async fn api_performance(
    State(state): State<AppState>,
    Query(q): Query<DaysQuery>,
) -> Result<Json<PerformanceAnalysis>, ApiError> {
    let days = bounded("days", q.days.as_deref(), state.settings.performance_days, MAX_DAYS)?;
    let end = time::now();
    let start = end - Duration::days(days);

    let trades = TradeRepository::get_successful_between(state.journal.pool(), start, end).await?;
    Ok(Json(analyze_performance(&trades, start.date(), end.date())))
}

async fn api_snapshots(
    State(state): State<AppState>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Vec<PortfolioSnapshot>>, ApiError> {
    let limit = bounded("limit", q.limit.as_deref(), state.settings.portfolio_history, MAX_LIMIT)?;
    Ok(Json(PortfolioRepository::get_history(state.journal.pool(), limit).await?))
}

async fn api_reflections(
    State(state): State<AppState>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Vec<Reflection>>, ApiError> {
    let limit = bounded(
        "limit",
        q.limit.as_deref(),
        state.settings.recent_reflections,
        MAX_LIMIT,
    )?;
    Ok(Json(ReflectionRepository::get_recent(state.journal.pool(), limit).await?))
}

async fn api_context(
    State(state): State<AppState>,
    Query(q): Query<ContextQuery>,
) -> Result<Json<MarketContext>, ApiError> {
    let raw = q
        .at
        .ok_or_else(|| ApiError::BadRequest("missing `at` timestamp".to_string()))?;
    let at = time::parse_timestamp(&raw)
        .ok_or_else(|| ApiError::BadRequest(format!("unreadable timestamp {raw:?}")))?;

    AnalysisLogRepository::get_market_context(state.journal.pool(), at)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no analysis recorded at or before {raw}")))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
