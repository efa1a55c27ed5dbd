mod cli;
mod commands;
mod config;
mod display;
mod main_lib;

use clap::Parser;

use cli::Cli;
use config::Config;
use main_lib::{build_state, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let config = Config::from_env()?;
    let state = build_state(&config)?;
    commands::run(cli.cmd, state).await
}
