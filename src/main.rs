use oralgen::export::discover_sessions;
use oralgen::session::load_session;
use oralgen::{build_family_graph, Config};
use std::path::Path;
use anyhow::Result;

fn init_logger(default_filter: &str) {
    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", default_filter)
    ).init();
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("check");

    match command {
        "summary" => {
            init_logger("info");
            let path = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("usage: oralgen summary <session.json>"))?;
            print_summary(Path::new(path))?;
        }
        _ => {
            // Default: verify configuration and folders
            run_check()?;
        }
    }

    Ok(())
}

/// Load configuration and report what an export run would see
fn run_check() -> Result<()> {
    let config = Config::load()?;
    init_logger(&config.oralgen.log_level);

    log::info!("Starting OralGen v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Configuration loaded successfully (log level {})", config.oralgen.log_level);
    log::info!("Sessions folder: {}", config.sessions_folder().display());
    log::info!("Output folder: {}", config.output_folder().display());
    log::info!("GEDCOM source tag: {}", config.export.source);

    let sessions = discover_sessions(config.sessions_folder())?;
    if sessions.is_empty() {
        log::warn!("No session files found. Save a session into the sessions folder to export it.");
        return Ok(());
    }

    let mut unreadable = 0;
    for path in &sessions {
        match load_session(path) {
            Ok(data) => log::info!(
                "✓ {} ({} individuals)",
                path.display(),
                data.individuals.len()
            ),
            Err(e) => {
                unreadable += 1;
                log::error!("✗ {}: {}", path.display(), e);
            }
        }
    }

    log::info!("{} session(s) found, {} unreadable", sessions.len(), unreadable);
    Ok(())
}

/// Print resolved families and diagnostics for one session
fn print_summary(path: &Path) -> Result<()> {
    let data = load_session(path)?;
    let graph = build_family_graph(&data.individuals);

    println!("\n=== {} ===\n", path.display());
    if !data.metadata.interview_id.is_empty() {
        println!("Interview: {}", data.metadata.interview_id);
    }
    if !data.metadata.interviewee_name.is_empty() {
        println!("Interviewee: {}", data.metadata.interviewee_name);
    }
    println!("Individuals: {}", data.individuals.len());
    println!("Families: {}\n", graph.len());

    println!("{:-<72}", "");
    println!("{:<28} {:>10} {:>10} {:<20}", "Family", "Husband", "Wife", "Children");
    println!("{:-<72}", "");
    for unit in graph.units() {
        let husband = unit.husband.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string());
        let wife = unit.wife.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string());
        let children = unit
            .children
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",");
        println!("{:<28} {:>10} {:>10} {:<20}", unit.key.to_string(), husband, wife, children);
    }
    println!("{:-<72}", "");

    if graph.warnings().is_empty() {
        println!("\nNo warnings.");
    } else {
        println!("\nWarnings:");
        for warning in graph.warnings() {
            println!("  - {}", warning);
        }
    }
    println!();

    Ok(())
}
