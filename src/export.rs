//! Export pipeline: session file -> family graph -> GEDCOM / CSV file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::csv_export::write_csv;
use crate::error::{OralgenError, Result};
use crate::family::{build_family_graph, GraphWarning};
use crate::gedcom::{write_gedcom, GedcomOptions};
use crate::model::{InterviewMetadata, ProcessedData};
use crate::session::load_session;

/// Output document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Gedcom,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Gedcom => "ged",
            ExportFormat::Csv => "csv",
        }
    }
}

/// A rendered document plus what the graph build reported.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub content: String,
    pub family_count: usize,
    pub warnings: Vec<GraphWarning>,
}

/// Outcome of writing one export file.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub output_path: PathBuf,
    pub format: ExportFormat,
    pub individual_count: usize,
    pub family_count: usize,
    pub warnings: Vec<GraphWarning>,
    /// SHA-256 of the session file the export was made from.
    pub session_hash: String,
}

/// Today's date in local time, for the GEDCOM header.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Compute SHA256 hash of file contents
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let content = std::fs::read(path).map_err(OralgenError::Io)?;
    Ok(format!("{:x}", Sha256::digest(&content)))
}

fn sanitize_file_stem(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// File name for an export: `OralGen_<interviewId>.<ext>`.
///
/// A blank interview id falls back to the session file stem, then to
/// `Transcription`; characters that are unsafe in file names are replaced
/// with `_`.
pub fn output_file_name(metadata: &InterviewMetadata, session: &Path, format: ExportFormat) -> String {
    let id = metadata.interview_id.trim();
    let session_stem = session
        .file_stem()
        .map(|s| s.to_string_lossy().trim().to_string())
        .unwrap_or_default();
    let stem = if !id.is_empty() {
        sanitize_file_stem(id)
    } else if !session_stem.is_empty() {
        sanitize_file_stem(&session_stem)
    } else {
        "Transcription".to_string()
    };
    format!("OralGen_{}.{}", stem, format.extension())
}

/// Output paths handed out during one run, keyed to the session that owns
/// them. Two sessions never share a file; a session exported again gets its
/// own path back.
#[derive(Debug, Default)]
pub struct OutputRegistry {
    owners: HashMap<PathBuf, PathBuf>,
}

impl OutputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `candidate` for `session`. If another session already owns it,
    /// the first free `<stem>_<n>.<ext>` (n >= 2) is used instead.
    pub fn claim(&mut self, session: &Path, candidate: PathBuf) -> PathBuf {
        let stem = candidate
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = candidate
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let mut path = candidate.clone();
        let mut n = 1;
        loop {
            match self.owners.get(&path) {
                None => {
                    self.owners.insert(path.clone(), session.to_path_buf());
                    return path;
                }
                Some(owner) if owner == session => return path,
                Some(_) => {
                    n += 1;
                    path = candidate.with_file_name(format!("{}_{}{}", stem, n, extension));
                }
            }
        }
    }
}

/// Render one interview in the requested format.
///
/// The graph is built for GEDCOM only; CSV is a flat dump of the rows.
pub fn render(
    data: &ProcessedData,
    format: ExportFormat,
    options: &GedcomOptions,
    date: NaiveDate,
) -> Rendered {
    match format {
        ExportFormat::Gedcom => {
            let graph = build_family_graph(&data.individuals);
            Rendered {
                content: write_gedcom(&data.individuals, &graph, date, options),
                family_count: graph.len(),
                warnings: graph.warnings().to_vec(),
            }
        }
        ExportFormat::Csv => Rendered {
            content: write_csv(&data.individuals),
            family_count: 0,
            warnings: Vec::new(),
        },
    }
}

/// Load `input`, render it and write the result into `output_dir`. The output
/// path is claimed in `registry` so sessions sharing a name do not overwrite
/// each other within a run.
pub fn export_session(
    input: &Path,
    output_dir: &Path,
    format: ExportFormat,
    options: &GedcomOptions,
    date: NaiveDate,
    registry: &mut OutputRegistry,
) -> Result<ExportReport> {
    let session_hash = compute_file_hash(input)?;
    let data = load_session(input)?;
    let rendered = render(&data, format, options, date);

    for warning in &rendered.warnings {
        log::warn!("{}: {}", input.display(), warning);
    }

    std::fs::create_dir_all(output_dir).map_err(OralgenError::Io)?;
    let output_path = registry.claim(
        input,
        output_dir.join(output_file_name(&data.metadata, input, format)),
    );
    let mut content = rendered.content;
    content.push('\n');
    std::fs::write(&output_path, content).map_err(OralgenError::Io)?;

    log::info!(
        "Exported {} -> {} ({} individuals, {} families)",
        input.display(),
        output_path.display(),
        data.individuals.len(),
        rendered.family_count
    );

    Ok(ExportReport {
        output_path,
        format,
        individual_count: data.individuals.len(),
        family_count: rendered.family_count,
        warnings: rendered.warnings,
        session_hash,
    })
}

/// True if `path` looks like a saved session (`.json`, case-insensitive).
pub fn is_session_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Find all session files under `root`, sorted by path.
pub fn discover_sessions(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(OralgenError::InvalidInput(format!(
            "sessions folder is not a directory: {}",
            root.display()
        )));
    }

    let mut sessions: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_session_file(p))
        .collect();
    sessions.sort();
    Ok(sessions)
}
