//! GEDCOM 5.5.1 serializer for resolved interviews.
//!
//! Output is a pure function of the individuals, the family graph, the export
//! date and [`GedcomOptions`]: the same inputs always yield the same bytes.

use chrono::NaiveDate;

use crate::family::{FamilyGraph, FamilyKey};
use crate::model::{Individual, Rin};

pub const DEFAULT_SOURCE: &str = "OralGen";
pub const GEDCOM_VERSION: &str = "5.5.1";

/// Serializer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GedcomOptions {
    /// Value of the `1 SOUR` header line.
    pub source: String,
    /// Emit `DEAT` blocks for death date/place. Off by default; the plain
    /// record carries only name, sex, birth and family links.
    pub include_death: bool,
}

impl Default for GedcomOptions {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            include_death: false,
        }
    }
}

/// Format a header date as `DD MON YYYY`, e.g. `05 MAR 2024`.
pub fn format_gedcom_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string().to_uppercase()
}

/// Format a full name for a `NAME` line: the last token becomes the
/// `/surname/`, everything before it is kept as given names.
pub fn format_gedcom_name(full_name: &str) -> String {
    let trimmed = full_name.trim();
    let mut parts: Vec<&str> = trimmed.split_whitespace().collect();
    if parts.len() < 2 {
        return trimmed.to_string();
    }
    let surname = parts.pop().unwrap_or_default();
    format!("{} /{}/", parts.join(" "), surname)
}

fn individual_xref(rin: Rin) -> String {
    format!("@I{}@", rin)
}

fn family_xref(key: &FamilyKey) -> String {
    format!("@{}@", key)
}

/// Accumulates leveled GEDCOM lines.
struct LineWriter {
    lines: Vec<String>,
}

impl LineWriter {
    fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// `<level> <tag> <value>`, or `<level> <tag>` when the value is empty.
    /// Line breaks inside values would start a bogus record, so they are
    /// folded into spaces.
    fn line(&mut self, level: u8, tag: &str, value: &str) {
        if value.is_empty() {
            self.lines.push(format!("{} {}", level, tag));
        } else {
            let value = value.replace("\r\n", " ").replace(['\r', '\n'], " ");
            self.lines.push(format!("{} {} {}", level, tag, value));
        }
    }

    /// `0 <xref> <tag>` record opener.
    fn record(&mut self, xref: &str, tag: &str) {
        self.lines.push(format!("0 {} {}", xref, tag));
    }

    /// Event block (`BIRT`, `DEAT`) with optional `DATE`/`PLAC` sub-lines;
    /// omitted entirely when both are empty.
    fn event(&mut self, tag: &str, date: &str, place: &str) {
        if date.is_empty() && place.is_empty() {
            return;
        }
        self.line(1, tag, "");
        if !date.is_empty() {
            self.line(2, "DATE", date);
        }
        if !place.is_empty() {
            self.line(2, "PLAC", place);
        }
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

/// Serialize individuals (in the given order) and the families of `graph`
/// (in creation order) into a GEDCOM document. The result has no trailing
/// newline.
pub fn write_gedcom(
    individuals: &[Individual],
    graph: &FamilyGraph,
    date: NaiveDate,
    options: &GedcomOptions,
) -> String {
    let mut out = LineWriter::new();

    out.line(0, "HEAD", "");
    out.line(1, "SOUR", &options.source);
    out.line(1, "DATE", &format_gedcom_date(date));
    out.line(1, "CHAR", "UTF-8");
    out.line(1, "GEDC", "");
    out.line(2, "VERS", GEDCOM_VERSION);
    out.line(2, "FORM", "LINEAGE-LINKED");

    for ind in individuals {
        out.record(&individual_xref(ind.rin), "INDI");
        out.line(1, "NAME", &format_gedcom_name(&ind.full_name));
        let sex = ind.sex.as_str();
        if !sex.is_empty() {
            out.line(1, "SEX", sex);
        }
        out.event("BIRT", &ind.birth_date, &ind.birth_place);
        if options.include_death {
            out.event("DEAT", &ind.death_date, &ind.death_place);
        }
        for unit in graph.units() {
            if unit.is_spouse(ind.rin) {
                out.line(1, "FAMS", &family_xref(&unit.key));
            }
            if unit.has_child(ind.rin) {
                out.line(1, "FAMC", &family_xref(&unit.key));
            }
        }
    }

    for unit in graph.units() {
        out.record(&family_xref(&unit.key), "FAM");
        if let Some(husband) = unit.husband {
            out.line(1, "HUSB", &individual_xref(husband));
        }
        if let Some(wife) = unit.wife {
            out.line(1, "WIFE", &individual_xref(wife));
        }
        for child in &unit.children {
            out.line(1, "CHIL", &individual_xref(*child));
        }
    }

    out.line(0, "TRLR", "");
    out.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::build_family_graph;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    const HEADER: &str = "0 HEAD\n1 SOUR OralGen\n1 DATE 05 MAR 2024\n1 CHAR UTF-8\n1 GEDC\n2 VERS 5.5.1\n2 FORM LINEAGE-LINKED";

    fn smith_family() -> Vec<Individual> {
        vec![
            Individual::new(1, "John Smith").with_sex("M"),
            Individual::new(2, "Mary Smith").with_relation("C1").with_sex("F"),
            Individual::new(3, "Ann Smith").with_relation("F1,2"),
        ]
    }

    #[test]
    fn test_format_name() {
        assert_eq!(format_gedcom_name("John Smith"), "John /Smith/");
        assert_eq!(format_gedcom_name("  Mary  Ann   Smith "), "Mary Ann /Smith/");
        assert_eq!(format_gedcom_name("Cher"), "Cher");
        assert_eq!(format_gedcom_name("   "), "");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_gedcom_date(date()), "05 MAR 2024");
        assert_eq!(
            format_gedcom_date(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap()),
            "31 DEC 1999"
        );
    }

    #[test]
    fn test_empty_document() {
        let doc = write_gedcom(&[], &FamilyGraph::new(), date(), &GedcomOptions::default());
        assert_eq!(doc, format!("{}\n0 TRLR", HEADER));
    }

    #[test]
    fn test_smith_family_document() {
        let individuals = smith_family();
        let graph = build_family_graph(&individuals);
        let doc = write_gedcom(&individuals, &graph, date(), &GedcomOptions::default());

        let expected = format!(
            "{}\n\
             0 @I1@ INDI\n1 NAME John /Smith/\n1 SEX M\n1 FAMS @FAM_COUPLE_1_2@\n\
             0 @I2@ INDI\n1 NAME Mary /Smith/\n1 SEX F\n1 FAMS @FAM_COUPLE_1_2@\n\
             0 @I3@ INDI\n1 NAME Ann /Smith/\n1 FAMC @FAM_COUPLE_1_2@\n\
             0 @FAM_COUPLE_1_2@ FAM\n1 HUSB @I1@\n1 WIFE @I2@\n1 CHIL @I3@\n\
             0 TRLR",
            HEADER
        );
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_birth_and_death_blocks() {
        let individuals = vec![
            Individual::new(1, "A B").with_birth("1 JAN 1900", "").with_death("", "Lyon"),
            Individual::new(2, "C D").with_birth("", "Paris"),
        ];
        let options = GedcomOptions {
            include_death: true,
            ..Default::default()
        };
        let doc = write_gedcom(&individuals, &FamilyGraph::new(), date(), &options);
        assert!(doc.contains("1 BIRT\n2 DATE 1 JAN 1900\n1 DEAT\n2 PLAC Lyon\n0 @I2@ INDI"));
        assert!(doc.contains("1 BIRT\n2 PLAC Paris\n0 TRLR"));
    }

    #[test]
    fn test_death_blocks_off_by_default() {
        let individuals = vec![Individual::new(1, "A B").with_death("1950", "Rome")];
        let doc = write_gedcom(&individuals, &FamilyGraph::new(), date(), &GedcomOptions::default());
        assert!(!doc.contains("DEAT"));
        assert!(!doc.contains("Rome"));
        assert!(doc.contains("0 @I1@ INDI\n1 NAME A /B/\n0 TRLR"));
    }

    #[test]
    fn test_empty_name_line_kept() {
        let individuals = vec![Individual::new(4, "")];
        let doc = write_gedcom(&individuals, &FamilyGraph::new(), date(), &GedcomOptions::default());
        assert!(doc.contains("0 @I4@ INDI\n1 NAME\n0 TRLR"));
    }

    #[test]
    fn test_single_parent_family() {
        let individuals = vec![Individual::new(1, "Tom Jones").with_relation("F5")];
        let graph = build_family_graph(&individuals);
        let doc = write_gedcom(&individuals, &graph, date(), &GedcomOptions::default());
        assert!(doc.contains("1 FAMC @FAM_SINGLE_5@"));
        assert!(doc.contains("0 @FAM_SINGLE_5@ FAM\n1 CHIL @I1@\n0 TRLR"));
    }

    #[test]
    fn test_children_in_ascending_order() {
        let individuals = vec![
            Individual::new(9, "Z Child").with_relation("F1"),
            Individual::new(1, "Parent"),
            Individual::new(4, "Y Child").with_relation("F1"),
        ];
        let graph = build_family_graph(&individuals);
        let doc = write_gedcom(&individuals, &graph, date(), &GedcomOptions::default());
        assert!(doc.ends_with("0 @FAM_SINGLE_1@ FAM\n1 CHIL @I4@\n1 CHIL @I9@\n0 TRLR"));
        // individuals keep input order
        let first = doc.find("@I9@ INDI").unwrap();
        let second = doc.find("@I1@ INDI").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_multiple_spouse_families() {
        let individuals = vec![
            Individual::new(1, "Al Roe").with_sex("M"),
            Individual::new(2, "Bea Roe").with_relation("C1").with_sex("F"),
            Individual::new(3, "Cy Roe").with_relation("C1").with_sex("F"),
        ];
        let graph = build_family_graph(&individuals);
        let doc = write_gedcom(&individuals, &graph, date(), &GedcomOptions::default());
        assert!(doc.contains(
            "0 @I1@ INDI\n1 NAME Al /Roe/\n1 SEX M\n1 FAMS @FAM_COUPLE_1_2@\n1 FAMS @FAM_COUPLE_1_3@\n"
        ));
    }

    #[test]
    fn test_line_breaks_in_values_are_folded() {
        let individuals = vec![Individual::new(1, "A B").with_birth("", "Cork\nIreland")];
        let doc = write_gedcom(&individuals, &FamilyGraph::new(), date(), &GedcomOptions::default());
        assert!(doc.contains("2 PLAC Cork Ireland"));
    }

    #[test]
    fn test_custom_source_and_idempotence() {
        let individuals = smith_family();
        let graph = build_family_graph(&individuals);
        let options = GedcomOptions {
            source: "FieldKit".to_string(),
            include_death: true,
        };
        let first = write_gedcom(&individuals, &graph, date(), &options);
        let second = write_gedcom(&individuals, &graph, date(), &options);
        assert_eq!(first, second);
        assert!(first.contains("1 SOUR FieldKit\n"));
    }

    #[test]
    fn test_every_emitted_family_has_members() {
        let individuals = vec![
            Individual::new(1, "A").with_relation("C1"),
            Individual::new(2, "B").with_relation("C30"),
            Individual::new(3, "C").with_relation("P40"),
            Individual::new(4, "D").with_relation("nonsense"),
        ];
        let graph = build_family_graph(&individuals);
        let doc = write_gedcom(&individuals, &graph, date(), &GedcomOptions::default());
        let records: Vec<&str> = doc.split("\n0 ").filter(|r| r.ends_with(" FAM") || r.contains(" FAM\n")).collect();
        assert_eq!(records.len(), 2);
        for record in records {
            assert!(record.contains("\n1 "), "empty family record: {}", record);
        }
    }
}
