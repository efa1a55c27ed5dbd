use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use satoshi_core::calculators::DcaFrequency;

#[derive(Parser)]
#[command(name = "satoshi")]
#[command(about = "Bitcoin price dashboard for the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Clone)]
pub enum Cmd {
    /// Refresh the headline price and halving data until Ctrl-C
    Watch,
    /// Resolve the BTC price once
    Price {
        /// Fiat currency (defaults to the headline currency)
        #[arg(long)]
        currency: Option<String>,
    },
    /// Convert between BTC, satoshis and fiat
    Convert {
        #[arg(long, conflicts_with = "sats", required_unless_present = "sats")]
        btc: Option<Decimal>,
        #[arg(long)]
        sats: Option<i64>,
        #[arg(long)]
        fiat: Option<String>,
    },
    /// Profit at a target price
    Profit {
        #[arg(long)]
        btc: Decimal,
        /// Average buy price per BTC
        #[arg(long)]
        avg_buy: Decimal,
        /// Target sell price per BTC
        #[arg(long)]
        target: Decimal,
        #[arg(long)]
        fiat: Option<String>,
    },
    /// Simulate recurring purchases over past months
    Dca {
        /// Fiat amount per purchase
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        months: u32,
        #[arg(long, default_value = "monthly")]
        frequency: DcaFrequency,
        #[arg(long)]
        fiat: Option<String>,
    },
    /// Manage tracked purchases
    Portfolio {
        #[command(subcommand)]
        cmd: PortfolioCmd,
    },
    /// Chain height and next halving estimate
    Halving,
}

#[derive(Subcommand, Clone)]
pub enum PortfolioCmd {
    /// Show entries with current value and profit/loss
    List,
    /// Record a purchase
    Add {
        #[arg(long)]
        btc: Decimal,
        /// Buy price per BTC
        #[arg(long)]
        buy: Decimal,
        #[arg(long)]
        fiat: Option<String>,
        #[arg(long)]
        exchange: Option<String>,
    },
    /// Remove the entry at INDEX (as shown by `list`)
    Remove { index: usize },
    /// Remove every entry
    Clear,
    /// Write entries as CSV
    Export {
        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_convert_requires_exactly_one_amount() {
        assert!(Cli::try_parse_from(["satoshi", "convert"]).is_err());
        assert!(Cli::try_parse_from(["satoshi", "convert", "--btc", "1", "--sats", "5"]).is_err());

        let cli = Cli::try_parse_from(["satoshi", "convert", "--sats", "2500", "--fiat", "eur"])
            .unwrap();
        match cli.cmd {
            Cmd::Convert { btc, sats, fiat } => {
                assert_eq!(btc, None);
                assert_eq!(sats, Some(2500));
                assert_eq!(fiat.as_deref(), Some("eur"));
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_dca_frequency_parsing() {
        let cli = Cli::try_parse_from([
            "satoshi", "dca", "--amount", "100", "--months", "6", "--frequency", "weekly",
        ])
        .unwrap();
        match cli.cmd {
            Cmd::Dca {
                amount,
                months,
                frequency,
                ..
            } => {
                assert_eq!(amount, dec!(100));
                assert_eq!(months, 6);
                assert_eq!(frequency, DcaFrequency::Weekly);
            }
            _ => panic!("expected dca"),
        }

        assert!(Cli::try_parse_from([
            "satoshi", "dca", "--amount", "100", "--months", "6", "--frequency", "daily",
        ])
        .is_err());
    }

    #[test]
    fn test_portfolio_subcommands() {
        let cli = Cli::try_parse_from(["satoshi", "portfolio", "remove", "2"]).unwrap();
        assert!(matches!(
            cli.cmd,
            Cmd::Portfolio {
                cmd: PortfolioCmd::Remove { index: 2 }
            }
        ));
    }
}
