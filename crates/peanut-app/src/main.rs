//! Peanut: a turn-based conversational assistant on the terminal.
//!
//! Reads one utterance per line from stdin and prints replies to stdout.
//! Logs go to stderr so they never interleave with the conversation.

mod cli;
mod session;

use clap::Parser;
use peanut_core::config::PeanutConfig;
use peanut_dialogue::DialogueEngine;
use tokio::io::BufReader;

use cli::CliArgs;
use session::Session;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before the global subscriber exists so its log level
    // can apply; load warnings go through a temporary stderr subscriber.
    let config_path = args.resolve_config_path();
    let bootstrap = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let mut config = tracing::subscriber::with_default(bootstrap, || {
        PeanutConfig::load_or_default(&config_path)
    });

    let filter = args.resolve_log_filter(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&filter)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Peanut v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_path.display(), "Configuration resolved");

    config.dialogue.response_seed = args.resolve_seed(config.dialogue.response_seed);

    if args.write_config {
        config.save(&config_path)?;
        tracing::info!(path = %config_path.display(), "Configuration written");
        return Ok(());
    }

    // Resolvers.
    let query = peanut_resolvers::build_query_resolver(&config.assistant, args.resolve_offline());
    let weather = peanut_resolvers::build_weather_resolver(&config.weather);
    tracing::info!(query = query.name(), weather = weather.name(), "Resolvers ready");

    let engine = DialogueEngine::new(&config.dialogue, query, weather);
    let mut session = Session::new(engine, BufReader::new(tokio::io::stdin()), tokio::io::stdout());

    let end = session.run().await?;
    tracing::info!(reason = ?end, "Peanut stopped");
    Ok(())
}
