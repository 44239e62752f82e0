use clap::Parser;

use planet_service::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is not an error
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = cli::load_and_merge_config(&cli)?;
    let _log_handle = cli::init_logger_from_settings(&settings)?;

    cli::execute_command(&cli, settings).await
}
