//! 🚀 alarmtix-cli: the front door, the bouncer, the maitre d' of alarmtix.
//!
//! 📦 Thin wrapper: parse args, set up logging, load config, hand the event
//! to the library, and turn whatever comes back into an exit code. 🦆

use std::path::PathBuf;

use alarmtix::Outcome;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// 🚨 Turn one CloudWatch alarm notification into a Jira ticket.
#[derive(Debug, Parser)]
#[command(name = "alarmtix", version)]
struct Args {
    /// Path to the SNS alarm event JSON file
    event_path: PathBuf,

    /// Optional TOML config file, merged over ALARMTIX_* environment variables
    #[arg(short, long, env = "ALARMTIX_CONFIG_FILE")]
    config: Option<PathBuf>,
}

/// 🚀 main(): where it all begins.
///
/// 🔧 Steps:
/// 1. Init tracing (so we can see what goes wrong, and when)
/// 2. Parse args
/// 3. Load config
/// 4. Run the thing
/// 5. Exit with 0, -1 or -3. Nothing else, ever.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // 📡 Set up tracing: because println! debugging is a lifestyle choice
    // we're trying to move past, like flip phones and cargo shorts
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    info!("VERSION: {}", env!("CARGO_PKG_VERSION"));

    let app_config = match alarmtix::app_config::load_config(args.config.as_deref()) {
        Ok(app_config) => app_config,
        Err(err) => {
            // 🧅 peel the onion of sadness, one layer at a time
            error!("💀 error: {}", err);
            for cause in err.chain().skip(1) {
                error!("⚠️  cause: {}", cause);
            }
            std::process::exit(Outcome::ConfigError.exit_code());
        }
    };

    // 🚀 SEND IT. No take-backs.
    let outcome = alarmtix::run(&app_config, &args.event_path).await;

    if outcome != Outcome::Success {
        error!(
            "🗑️ Exiting with {:?} ({}) for event '{}'",
            outcome,
            outcome.exit_code(),
            args.event_path.display()
        );
    }
    std::process::exit(outcome.exit_code());
}
