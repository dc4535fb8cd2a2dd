use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use book_dashboard::config::Config;
use book_dashboard::dashboard::{Command, Dashboard, Outcome};
use book_dashboard::open_library_api::OpenLibraryClient;
use book_dashboard::session::Route;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "book_dashboard=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate()?;
    info!(base_url = %config.base_url, "starting book dashboard");

    let client = OpenLibraryClient::new(&config.base_url).context("building http client")?;
    let mut dashboard = Dashboard::new(client, &config);
    dashboard.navigate(Route::Root.path()).await?;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(dashboard.render().as_bytes()).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };

        let outcome = match line.parse::<Command>() {
            Ok(command) => dashboard.execute(command).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(Outcome::Show(text)) => {
                stdout.write_all(text.as_bytes()).await?;
                if !text.ends_with('\n') {
                    stdout.write_all(b"\n").await?;
                }
            }
            Ok(Outcome::Quit) => break,
            Err(e) => {
                warn!(error = %e, "command failed");
                stdout.write_all(format!("{}\n", e).as_bytes()).await?;
            }
        }
    }

    info!("bye");
    Ok(())
}
