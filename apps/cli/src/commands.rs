//! Subcommand handlers.

use std::sync::Arc;

use anyhow::Context;
use rust_decimal::Decimal;

use satoshi_core::calculators::{convert, estimate_profit, ConversionInput, DcaPlan};
use satoshi_core::clock::Clock;
use satoshi_core::events::DashboardSink;
use satoshi_core::halving::HalvingServiceTrait;
use satoshi_core::portfolio::{NewPortfolioEntry, PortfolioServiceTrait};
use satoshi_core::prices::{ConverterPriceServiceTrait, HeadlinePriceServiceTrait};
use satoshi_core::scheduler::{RefreshDriver, RefreshIntervals};
use satoshi_market_data::normalize_currency;

use crate::cli::{Cmd, PortfolioCmd};
use crate::display::{
    format_amount, format_fiat, format_halving_status, format_price_status, freshness_label,
    ConsoleDashboardSink, PLACEHOLDER,
};
use crate::main_lib::AppState;

pub async fn run(cmd: Cmd, state: Arc<AppState>) -> anyhow::Result<()> {
    match cmd {
        Cmd::Watch => watch(state).await,
        Cmd::Price { currency } => price(&state, currency).await,
        Cmd::Convert { btc, sats, fiat } => {
            let input = match (btc, sats) {
                (Some(btc), _) => ConversionInput::Btc(btc),
                (None, Some(sats)) => ConversionInput::Sats(sats),
                (None, None) => anyhow::bail!("either --btc or --sats is required"),
            };
            convert_amount(&state, input, fiat).await
        }
        Cmd::Profit {
            btc,
            avg_buy,
            target,
            fiat,
        } => {
            let fiat = fiat_or_headline(&state, fiat);
            let estimate = estimate_profit(btc, avg_buy, target)?;
            println!("Invested:  {}", format_fiat(estimate.invested, &fiat));
            println!("Projected: {}", format_fiat(estimate.projected, &fiat));
            println!(
                "{}:    {}",
                if estimate.is_loss() { "Loss" } else { "Profit" },
                format_fiat(estimate.profit, &fiat)
            );
            Ok(())
        }
        Cmd::Dca {
            amount,
            months,
            frequency,
            fiat,
        } => {
            let fiat = fiat_or_headline(&state, fiat);
            let plan = DcaPlan {
                amount,
                months,
                frequency,
            };
            let sim = state.dca.simulate(&plan, &fiat).await?;
            if sim.estimated {
                println!("Price history unavailable; estimate at the current price.");
            }
            println!(
                "Purchases:     {}",
                sim.buys
                    .map(|b| b.to_string())
                    .unwrap_or_else(|| PLACEHOLDER.to_string())
            );
            println!("Invested:      {}", format_fiat(sim.invested, &sim.currency));
            println!("BTC acquired:  {}", format_amount(sim.btc, 8));
            println!(
                "Average cost:  {}",
                sim.average_cost
                    .map(|c| format_fiat(c, &sim.currency))
                    .unwrap_or_else(|| PLACEHOLDER.to_string())
            );
            println!(
                "Current value: {}",
                format_fiat(sim.current_value, &sim.currency)
            );
            Ok(())
        }
        Cmd::Portfolio { cmd } => portfolio(&state, cmd).await,
        Cmd::Halving => {
            let status = state.halving.refresh().await;
            println!("{}", format_halving_status(&status, state.clock.now()));
            Ok(())
        }
    }
}

fn fiat_or_headline(state: &AppState, fiat: Option<String>) -> String {
    fiat.map(|f| normalize_currency(&f).into_owned())
        .unwrap_or_else(|| state.config.headline_currency.clone())
}

async fn watch(state: Arc<AppState>) -> anyhow::Result<()> {
    let headline = Arc::new(state.headline_service(&state.config.headline_currency));
    let sink: Arc<dyn DashboardSink> = Arc::new(ConsoleDashboardSink);
    let intervals = RefreshIntervals {
        price: state.config.price_interval,
        chain: state.config.chain_interval,
    };

    let mut driver = RefreshDriver::start(headline, state.halving.clone(), sink, intervals);
    tracing::info!(
        "Refreshing price every {:?} and chain data every {:?}; Ctrl-C to stop",
        intervals.price,
        intervals.chain
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    driver.stop();
    tracing::info!("Stopped");
    Ok(())
}

async fn price(state: &AppState, currency: Option<String>) -> anyhow::Result<()> {
    let currency = fiat_or_headline(state, currency);
    let service = state.headline_service(&currency);
    let status = service.refresh().await;
    println!("{}", format_price_status(&status));
    Ok(())
}

async fn convert_amount(
    state: &AppState,
    input: ConversionInput,
    fiat: Option<String>,
) -> anyhow::Result<()> {
    let fiat = fiat_or_headline(state, fiat);
    let price = state.converter.btc_price_for(&fiat).await?;
    let result = convert(input, &price.currency, price.rate)?;

    println!(
        "{} BTC = {} sats = {}",
        format_amount(result.btc, 8),
        result.sats,
        format_fiat(result.fiat, &result.currency)
    );
    println!(
        "Rate: {} per BTC ({})",
        format_fiat(result.rate, &result.currency),
        freshness_label(price.freshness)
    );
    Ok(())
}

async fn portfolio(state: &AppState, cmd: PortfolioCmd) -> anyhow::Result<()> {
    let service = &state.portfolio;
    match cmd {
        PortfolioCmd::List => {
            if let Err(e) = state.converter.refresh_all().await {
                tracing::warn!("Using cached rates for valuation: {}", e);
            }
            let rows = service.valuation(&state.context)?;
            if rows.is_empty() {
                println!("No portfolio entries.");
                return Ok(());
            }

            let mut total_pl: Option<Decimal> = None;
            for row in &rows {
                let opt = |v: Option<Decimal>| {
                    v.map(|v| format_fiat(v, &row.entry.fiat))
                        .unwrap_or_else(|| PLACEHOLDER.to_string())
                };
                println!(
                    "[{}] {} BTC @ {} | invested {} | now {} | P/L {}{}",
                    row.index,
                    format_amount(row.entry.btc, 8),
                    format_fiat(row.entry.buy, &row.entry.fiat),
                    format_fiat(row.invested, &row.entry.fiat),
                    opt(row.current),
                    opt(row.profit_loss),
                    if row.entry.exchange.is_empty() {
                        String::new()
                    } else {
                        format!(" | {}", row.entry.exchange)
                    }
                );
                if row.entry.fiat == state.config.headline_currency {
                    if let Some(pl) = row.profit_loss {
                        let sum = total_pl
                            .unwrap_or_default()
                            .checked_add(pl)
                            .context("Total P/L is out of range")?;
                        total_pl = Some(sum);
                    }
                }
            }
            if let Some(total) = total_pl {
                println!(
                    "Total P/L ({} entries): {}",
                    state.config.headline_currency.to_uppercase(),
                    format_fiat(total, &state.config.headline_currency)
                );
            }
            Ok(())
        }
        PortfolioCmd::Add {
            btc,
            buy,
            fiat,
            exchange,
        } => {
            let entry = service.add(NewPortfolioEntry {
                btc,
                buy,
                fiat: fiat_or_headline(state, fiat),
                exchange,
            })?;
            println!(
                "Added {} BTC @ {}",
                format_amount(entry.btc, 8),
                format_fiat(entry.buy, &entry.fiat)
            );
            Ok(())
        }
        PortfolioCmd::Remove { index } => {
            let removed = service.remove(index)?;
            println!(
                "Removed {} BTC @ {}",
                format_amount(removed.btc, 8),
                format_fiat(removed.buy, &removed.fiat)
            );
            Ok(())
        }
        PortfolioCmd::Clear => {
            service.clear()?;
            println!("Portfolio cleared.");
            Ok(())
        }
        PortfolioCmd::Export { output } => {
            let csv = service.export_csv()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, csv)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Exported to {}", path.display());
                }
                None => print!("{}", csv),
            }
            Ok(())
        }
    }
}
