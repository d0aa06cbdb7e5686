use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::update::UpdateArgs;

#[derive(Parser)]
#[command(name = "postcalc")]
#[command(
    about = "Gaussian posterior calculator (exact conjugate update)",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fold observations into a Gaussian prior and report the posterior
    Update(UpdateArgs),

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> overrides)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Update(args) => commands::update::run_update(args)?,

        Commands::ConfigHash { paths } => {
            let loaded = commands::load_config(&paths)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
