//! Watch the sessions folder; re-export sessions automatically when they change.

use clap::Parser;
use oralgen::watch::run_watcher;
use oralgen::Config;
use anyhow::Result;

#[derive(Parser, Debug)]
#[command(name = "watch")]
#[command(about = "Watch the sessions folder and re-export changed sessions")]
struct Args {
    /// Debounce delay in milliseconds before processing a file change
    #[arg(long, default_value = "500")]
    debounce_ms: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load()?;
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", &config.oralgen.log_level),
    )
    .init();

    log::info!("Starting OralGen session watcher");
    log::info!("Sessions folder: {}", config.sessions_folder().display());
    log::info!("Output folder: {}", config.output_folder().display());
    log::info!("Debounce: {} ms", args.debounce_ms);

    log::info!("Watching for changes (Ctrl+C to stop)");
    run_watcher(config, args.debounce_ms)?;
    Ok(())
}
