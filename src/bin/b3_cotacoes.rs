use b3_cotacoes::config::{Config, DEFAULT_INPUT, DEFAULT_OUTPUT};
use b3_cotacoes::logging;
use b3_cotacoes::services::quote_service::QuoteService;

use anyhow::Context;
use clap::{App, Arg};
use log::{error, info, warn};
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = App::new("b3_cotacoes")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fetches B3 stock quotes for the symbols listed in a spreadsheet")
        .arg(
            Arg::with_name("input")
                .value_name("INPUT")
                .help("Excel file with a 'Símbolo' column")
                .index(1)
                .default_value(DEFAULT_INPUT),
        )
        .arg(
            Arg::with_name("output")
                .short('o')
                .long("output")
                .value_name("PATH")
                .help("Where to write the results")
                .takes_value(true)
                .default_value(DEFAULT_OUTPUT),
        )
        .arg(
            Arg::with_name("enriched")
                .long("enriched")
                .value_name("PATH")
                .help("Also write the full input table with the fetched quotes")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("headless")
                .long("headless")
                .help("Run the browser in headless mode")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("debug")
                .long("debug")
                .help("Enable debug logging")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("webdriver-url")
                .long("webdriver-url")
                .value_name("URL")
                .help("WebDriver endpoint (overrides WEBDRIVER_URL)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("max-tries")
                .long("max-tries")
                .value_name("N")
                .help("Attempts per symbol before skipping it")
                .takes_value(true)
                .default_value("2"),
        )
        .get_matches();

    let max_tries = matches
        .value_of("max-tries")
        .unwrap_or("2")
        .parse::<usize>()
        .context("--max-tries must be a whole number")?;

    let mut config = Config::from_env()?
        .with_debug_mode(matches.is_present("debug"))
        .with_headless(matches.is_present("headless"))
        .with_max_tries(max_tries)
        .with_output_path(matches.value_of("output").unwrap_or(DEFAULT_OUTPUT))
        .with_enriched_path(matches.value_of("enriched").map(PathBuf::from));
    if let Some(url) = matches.value_of("webdriver-url") {
        config = config.with_webdriver_url(url);
    }

    logging::init(&config).context("failed to set up logging")?;
    if max_tries == 0 {
        warn!("--max-tries 0 means no symbol will be queried");
    }

    let input = Path::new(matches.value_of("input").unwrap_or(DEFAULT_INPUT));
    if !input.exists() {
        let shown = std::env::current_dir()
            .map(|dir| dir.join(input))
            .unwrap_or_else(|_| input.to_path_buf());
        error!("Input file not found: {}", shown.display());
        info!("Create the 'data' folder and put 'B3Acoes.xlsx' in it, or pass the file path as an argument");
        return Ok(());
    }

    info!("Starting automation with file: {}", input.display());
    let service = QuoteService::new(config);
    match service.execute(input).await {
        Ok(report) => {
            for symbol in &report.skipped {
                warn!("No quote for {}", symbol);
            }
            info!(
                "Done! {} of {} symbols saved to: {}",
                report.results.len(),
                report.requested,
                report.output_path
            );
            Ok(())
        }
        Err(e) => {
            error!("Automation failed: {}", e);
            Err(anyhow::Error::new(e).context("automation failed"))
        }
    }
}
