// Huddle entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Parse the command line
// 3. Load config, copying defaults on first run
// 4. Build the trade desk (calculator, lookups, optional Claude features)
// 5. Run the command and print the report

use std::io::Read;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use huddle_app::config;
use huddle_app::desk::{TradeDesk, TradeReport};
use huddle_app::report::{render_quote, render_trade, DEFAULT_MAX_WARNINGS};
use huddle_core::{AssetQuote, TradeError};

#[derive(Parser, Debug)]
#[command(name = "huddle")]
#[command(about = "Trade value calculator for Madden franchise leagues")]
struct Cli {
    /// Print machine-readable JSON instead of a text report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// Value one player, e.g. `huddle player Mahomes 99 ovr 28yo xf qb`
    Player {
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },
    /// Value one draft pick, e.g. `huddle pick 2026 R1 P15`
    Pick {
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },
    /// Compare what each team sends
    Trade {
        /// Everything team 1 sends, comma separated
        side_a: String,
        /// Everything team 2 sends, comma separated
        side_b: String,
    },
    /// Evaluate a full proposal read from stdin
    Committee,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("huddle starting up");

    // 2. Parse the command line
    let cli = Cli::parse();

    // 3. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, season {}",
        config.league.name, config.league.current_season
    );

    // 4. Build the trade desk
    let desk = TradeDesk::from_config(&config).context("failed to build trade desk")?;
    info!(lookup = desk.calculator().lookup_name(), "trade desk ready");

    // 5. Run the command
    let json = cli.json;
    let outcome = match cli.command {
        Command::Player { description } => desk
            .quote_player(&description.join(" "))
            .await
            .map(|q| print_quote(&q, json)),
        Command::Pick { description } => desk
            .quote_pick(&description.join(" "))
            .map(|q| print_quote(&q, json)),
        Command::Trade { side_a, side_b } => desk
            .trade(&side_a, &side_b)
            .await
            .map(|r| print_trade(&r, json)),
        Command::Committee => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read proposal from stdin")?;
            desk.committee(&text).await.map(|r| print_trade(&r, json))
        }
    };

    match outcome {
        Ok(printed) => printed,
        Err(e) => {
            error!("trade evaluation failed: {e}");
            report_failure(&e);
            std::process::exit(1);
        }
    }
}

fn print_quote(quote: &AssetQuote, json: bool) -> anyhow::Result<()> {
    if json {
        let value = serde_json::json!({
            "asset": quote.asset,
            "warnings": quote.warnings,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", render_quote(quote, DEFAULT_MAX_WARNINGS));
    }
    Ok(())
}

fn print_trade(report: &TradeReport, json: bool) -> anyhow::Result<()> {
    if json {
        let value = serde_json::json!({
            "verdict": report.verdict,
            "narrative": report.narrative,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", render_trade(report, DEFAULT_MAX_WARNINGS));
    }
    Ok(())
}

fn report_failure(err: &TradeError) {
    eprintln!("error: {err}");
    if let TradeError::NoValidAssets { warnings } = err {
        for warning in warnings {
            eprintln!("  ! {warning}");
        }
    }
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("huddle.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("huddle=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
