use clap::{Parser, Subcommand};
use std::sync::Arc;

use computer_bot::domain::traits::ChatProtocol;
use computer_bot::infrastructure::adapters::ConsoleAdapter;
use computer_bot::{Bot, Catalog, Config};

#[derive(Parser)]
#[command(name = "computer-bot")]
#[command(about = "A chat bot host with pluggable modules", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Print a default config
    InitConfig,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            let code = run_bot(&cli.config);
            std::process::exit(code);
        }
        Commands::Version => {
            println!("computer-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "off" };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

fn run_bot(config_path: &str) -> i32 {
    let config = match Config::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            init_logging(true);
            tracing::error!("Failed to load {}: {}", config_path, e);
            return 1;
        }
    };
    init_logging(config.general.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            return 1;
        }
    };

    rt.block_on(async {
        let catalog = Catalog::builtin();
        let bot = match Bot::start(&config, &catalog, |credentials| {
            Ok(Arc::new(ConsoleAdapter::new(credentials)) as Arc<dyn ChatProtocol>)
        }) {
            Ok(bot) => bot,
            Err(e) => {
                tracing::error!("Startup aborted: {}", e);
                return 1;
            }
        };

        match bot.run().await {
            Ok(()) => 0,
            Err(e) => {
                tracing::error!("Bot stopped: {}", e);
                1
            }
        }
    })
}

fn init_config() {
    match Config::default().to_yaml() {
        Ok(yaml) => println!("{}", yaml),
        Err(e) => eprintln!("Failed to render config: {}", e),
    }
}
