//! querydesk - compose, run and keep track of queries through a remote query API.

use querydesk::api::ApiClient;
use querydesk::app::Workspace;
use querydesk::cli::{self, Cli, Command};
use querydesk::config::Settings;
use querydesk::error::Result;
use querydesk::logging;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Picks up VITE_API_URL from a local .env file.
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();

    let log_to_file = cli.log_to_file();
    if log_to_file {
        logging::init_file_logging();
    } else {
        logging::init_stderr_logging();
    }

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        if log_to_file {
            eprintln!("{}: {}", e.category(), e);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Command::Logs(cmd) = &cli.command {
        let output = cli::handle_logs(cmd, &logging::get_log_path())?;
        println!("{}", output.render());
        return Ok(());
    }

    let config_path = cli.config_path();
    info!("Loading settings from: {}", config_path.display());
    let settings = Settings::load_from_file(&config_path)?;

    let data_dir = settings.storage.resolve(cli.data_dir.as_deref())?;
    info!("Data directory: {}", data_dir.root().display());

    let api_config = settings.api.resolve(cli.api_url.as_deref())?;
    let api = ApiClient::new(api_config)?;

    let mut workspace = Workspace::open(Box::new(api), &data_dir);
    let output = cli::dispatch(cli.command, &mut workspace).await?;
    println!("{}", output.render());

    Ok(())
}
