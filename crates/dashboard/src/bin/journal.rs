use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use clap::{Arg, ArgMatches, Command};
use dotenvy::dotenv;
use std::path::PathBuf;

use common::config::{MAX_DAYS, Settings};
use common::logger;
use common::time;
use reporting::analyze_performance;
use reporting::format::{amount, minute, money, pct};
use storage::repositories::{StatsRepository, TradeRepository};
use storage::{Journal, migrate_from_json};

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| format!("expected YYYY-MM-DD, got {raw:?}"))
}

fn cli() -> Command {
    Command::new("journal")
        .about("Inspects and maintains the trading journal database")
        .subcommand_required(true)
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Journal database path (defaults to JOURNAL_DB_PATH)"),
        )
        .subcommand(
            Command::new("migrate")
                .about("Imports a JSON-lines analysis log into the journal")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Path to the legacy JSON-lines log"),
                ),
        )
        .subcommand(Command::new("stats").about("Prints trade counts, fees and AI decision counts"))
        .subcommand(
            Command::new("performance")
                .about("Replays executed trades over a recent window")
                .arg(
                    Arg::new("days")
                        .short('d')
                        .long("days")
                        .value_parser(clap::value_parser!(i64).range(1..=MAX_DAYS))
                        .help("Window length in days (defaults to DASHBOARD_PERFORMANCE_DAYS)"),
                ),
        )
        .subcommand(
            Command::new("trades")
                .about("Lists trades recorded between two dates")
                .arg(
                    Arg::new("from")
                        .short('f')
                        .long("from")
                        .required(true)
                        .value_parser(parse_date)
                        .help("First day, YYYY-MM-DD"),
                )
                .arg(
                    Arg::new("to")
                        .short('t')
                        .long("to")
                        .value_parser(parse_date)
                        .help("Last day, YYYY-MM-DD (defaults to --from)"),
                ),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    logger::setup_logger();

    let matches = cli().get_matches();
    let settings = Settings::from_env()?;
    let db_path = matches
        .get_one::<PathBuf>("db")
        .cloned()
        .unwrap_or_else(|| settings.db_path.clone());

    let journal = Journal::open(&db_path)
        .await
        .with_context(|| format!("opening journal at {}", db_path.display()))?;

    let result = match matches.subcommand() {
        Some(("migrate", sub)) => migrate(&journal, sub).await,
        Some(("stats", _)) => stats(&journal, &settings).await,
        Some(("performance", sub)) => performance(&journal, &settings, sub).await,
        Some(("trades", sub)) => trades(&journal, &settings, sub).await,
        _ => Err(anyhow::anyhow!("unknown command")),
    };

    journal.close().await;
    result
}

async fn migrate(journal: &Journal, sub: &ArgMatches) -> Result<()> {
    let file = sub
        .get_one::<PathBuf>("file")
        .context("file is a required argument")?;
    let report = migrate_from_json(journal.pool(), file).await?;
    println!(
        "Imported {} analysis entries ({} skipped) from {}",
        report.imported,
        report.skipped,
        file.display()
    );
    Ok(())
}

async fn stats(journal: &Journal, settings: &Settings) -> Result<()> {
    let stats = StatsRepository::get_trading_stats(journal.pool()).await?;
    println!("Executed trades: {}", stats.total_trades);
    println!("  buys:  {}", stats.buy_count);
    println!("  sells: {}", stats.sell_count);
    println!("Total fees: {}", money(stats.total_fee, &settings.currency_symbol));
    if !stats.ai_decisions.is_empty() {
        println!("AI decisions:");
        for (decision, count) in &stats.ai_decisions {
            println!("  {decision:<8} {count}");
        }
    }
    Ok(())
}

async fn performance(journal: &Journal, settings: &Settings, sub: &ArgMatches) -> Result<()> {
    let days = sub
        .get_one::<i64>("days")
        .copied()
        .unwrap_or(settings.performance_days);
    let end = time::now();
    let start = end - Duration::days(days);

    let trades = TradeRepository::get_successful_between(journal.pool(), start, end).await?;
    let report = analyze_performance(&trades, start.date(), end.date());

    println!("Period: {} ~ {}", report.period_start, report.period_end);
    println!(
        "Trades: {} ({} won / {} lost)",
        report.total_trades, report.successful_trades, report.failed_trades
    );
    println!(
        "Realised P/L: {}",
        money(report.total_profit_loss, &settings.currency_symbol)
    );
    println!("Win rate: {}", pct(report.win_rate));
    Ok(())
}

async fn trades(journal: &Journal, settings: &Settings, sub: &ArgMatches) -> Result<()> {
    let from = *sub
        .get_one::<NaiveDate>("from")
        .context("from is a required argument")?;
    let to = sub.get_one::<NaiveDate>("to").copied();
    if to.is_some_and(|to| to < from) {
        anyhow::bail!("--to must not be before --from");
    }

    let trades = TradeRepository::get_trades_by_date(journal.pool(), from, to).await?;
    if trades.is_empty() {
        println!("No trades recorded in that range.");
        return Ok(());
    }

    let symbol = &settings.currency_symbol;
    println!(
        "{:<16}  {:<4}  {:>16}  {:>12}  {:>16}  {:>10}  {}",
        "time", "side", "price", "amount", "total", "fee", "ok"
    );
    for t in &trades {
        println!(
            "{:<16}  {:<4}  {:>16}  {:>12}  {:>16}  {:>10}  {}",
            minute(&t.timestamp),
            t.side,
            money(t.price, symbol),
            amount(t.amount),
            money(t.total_value, symbol),
            money(t.fee, symbol),
            if t.success { "yes" } else { "no" }
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn trades_requires_from() {
        assert!(cli().try_get_matches_from(["journal", "trades"]).is_err());

        let matches = cli()
            .try_get_matches_from(["journal", "trades", "--from", "2025-01-01", "--to", "2025-01-31"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(
            sub.get_one::<NaiveDate>("to").copied(),
            NaiveDate::from_ymd_opt(2025, 1, 31)
        );
    }

    #[test]
    fn rejects_bad_dates_and_days() {
        assert!(cli().try_get_matches_from(["journal", "trades", "--from", "01/02/2025"]).is_err());
        assert!(cli().try_get_matches_from(["journal", "performance", "--days", "0"]).is_err());
        assert!(cli().try_get_matches_from(["journal", "performance", "--days", "3651"]).is_err());
        assert!(cli().try_get_matches_from(["journal", "performance", "--days", "30"]).is_ok());
    }
}
