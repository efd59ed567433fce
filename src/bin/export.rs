use clap::Parser;
use oralgen::export::{discover_sessions, export_session, today, ExportFormat, OutputRegistry};
use oralgen::Config;
use std::path::PathBuf;
use std::time::Instant;
use anyhow::Result;

#[derive(Parser, Debug)]
#[command(name = "export")]
#[command(about = "Export transcribed interview sessions as GEDCOM or CSV")]
struct Args {
    /// Session files to export
    sessions: Vec<PathBuf>,

    /// Export every session in the configured sessions folder
    #[arg(short, long)]
    all: bool,

    /// Output format (defaults to the formats in config.toml)
    #[arg(short, long, value_enum)]
    format: Option<ExportFormat>,

    /// Output directory (defaults to output_folder in config.toml)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load()?;
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", &config.oralgen.log_level)
    ).init();
    log::info!("Configuration loaded successfully");

    let mut sessions = args.sessions.clone();
    if args.all {
        log::info!("Discovering sessions in {}", config.sessions_folder().display());
        sessions.extend(discover_sessions(config.sessions_folder())?);
    }

    if sessions.is_empty() {
        log::warn!("No sessions to export. Pass session files or use --all.");
        return Ok(());
    }

    let formats = match args.format {
        Some(format) => vec![format],
        None => config.export.formats.clone(),
    };
    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| config.output_folder().to_path_buf());
    let options = config.export.gedcom_options();
    let date = today();
    let mut registry = OutputRegistry::new();

    let start = Instant::now();
    let mut written = 0;
    let mut warnings = 0;
    let mut errors = 0;

    for (idx, session) in sessions.iter().enumerate() {
        log::info!("[{}/{}] Exporting: {}", idx + 1, sessions.len(), session.display());
        for format in &formats {
            match export_session(session, &output_dir, *format, &options, date, &mut registry) {
                Ok(report) => {
                    written += 1;
                    warnings += report.warnings.len();
                }
                Err(e) => {
                    errors += 1;
                    log::error!("✗ {}: {}", session.display(), e);
                }
            }
        }
    }

    log::info!("=== Export Complete ===");
    log::info!("Sessions: {}", sessions.len());
    log::info!("Files written: {} (errors: {})", written, errors);
    log::info!("Warnings: {}", warnings);
    log::info!("Time: {:?}", start.elapsed());

    if errors > 0 {
        log::warn!("Some sessions failed to export. Check logs above for details.");
    }

    Ok(())
}
