#![forbid(unsafe_code)]

use discord_fishinge::{config::Config, runner};
use dotenvy::dotenv;
use eyre::{Result, WrapErr};

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init_timed();
    dotenv().ok();

    run().await.wrap_err("failed to run bot")
}

async fn run() -> Result<()> {
    let config = Config::from_env()?;
    runner::start_bot(config).await?;

    Ok(())
}
