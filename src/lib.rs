pub mod config;
pub mod error;
pub mod model;
pub mod relation;
pub mod family;
pub mod gedcom;
pub mod csv_export;
pub mod session;
pub mod export;
pub mod watch;

pub use config::Config;
pub use error::{OralgenError, Result};
pub use family::{build_family_graph, FamilyGraph, FamilyKey, FamilyUnit, GraphWarning};
pub use gedcom::{write_gedcom, GedcomOptions};
pub use model::{Individual, InterviewMetadata, ProcessedData, Rin, Sex};
pub use relation::{parse_relation, RelationFact};

/// Resolve families and serialize `individuals` as GEDCOM in one call.
pub fn export_gedcom(
    individuals: &[Individual],
    date: chrono::NaiveDate,
    options: &GedcomOptions,
) -> String {
    let graph = build_family_graph(individuals);
    write_gedcom(individuals, &graph, date, options)
}
