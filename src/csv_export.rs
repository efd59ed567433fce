//! Flat CSV export of the transcribed rows, one line per individual.

use crate::model::Individual;

pub const CSV_HEADER: &str =
    "RIN,Relation,Sex,Full Name,Birth Date,Birth Place,Death Date,Death Place";

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Render individuals in input order. No trailing newline.
pub fn write_csv(individuals: &[Individual]) -> String {
    let mut lines = Vec::with_capacity(individuals.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for ind in individuals {
        let fields = [
            ind.rin.to_string(),
            escape_csv(&ind.relation),
            escape_csv(ind.sex.as_str()),
            escape_csv(&ind.full_name),
            escape_csv(&ind.birth_date),
            escape_csv(&ind.birth_place),
            escape_csv(&ind.death_date),
            escape_csv(&ind.death_place),
        ];
        lines.push(fields.join(","));
    }
    lines.join("\n")
}
