//! Interview data model as produced by the transcription UI.
//!
//! Field names follow the UI's camelCase JSON. Every field is optional on the
//! wire: OCR output is frequently incomplete, and a partially filled row must
//! still load.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Registration index number: the per-document identity of one person row.
pub type Rin = u32;

/// Recorded sex of an individual.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Sex {
    Male,
    Female,
    /// Any other non-empty value, kept verbatim (e.g. `Other`).
    Other(String),
    #[default]
    Unknown,
}

impl Sex {
    pub fn is_male(&self) -> bool {
        matches!(self, Sex::Male)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Sex::Unknown)
    }

    /// Value as written to the interchange document; empty when unknown.
    pub fn as_str(&self) -> &str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Other(value) => value,
            Sex::Unknown => "",
        }
    }
}

impl From<String> for Sex {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        match trimmed {
            "" => Sex::Unknown,
            "M" | "m" => Sex::Male,
            "F" | "f" => Sex::Female,
            other => Sex::Other(other.to_string()),
        }
    }
}

impl From<Option<String>> for Sex {
    fn from(value: Option<String>) -> Self {
        value.map(Sex::from).unwrap_or_default()
    }
}

impl From<&str> for Sex {
    fn from(value: &str) -> Self {
        Sex::from(value.to_string())
    }
}

impl From<Sex> for String {
    fn from(sex: Sex) -> Self {
        sex.as_str().to_string()
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One person row of the interview form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Individual {
    /// Internal row id assigned by the UI.
    pub id: String,
    #[serde(deserialize_with = "deserialize_rin")]
    pub rin: Rin,
    /// Relation code (`C<rin>`, `F<rin>[,<rin>]`, `P<rin>`).
    pub relation: String,
    pub sex: Sex,
    pub full_name: String,
    pub birth_date: String,
    pub birth_place: String,
    pub death_date: String,
    pub death_place: String,
    pub page: u32,
    pub row: u32,
    pub confidence: f64,
    /// Place inherited from the row above via a ditto mark.
    pub is_ditto: bool,
}

impl Individual {
    pub fn new(rin: Rin, full_name: impl Into<String>) -> Self {
        Self {
            rin,
            full_name: full_name.into(),
            ..Default::default()
        }
    }

    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = relation.into();
        self
    }

    pub fn with_sex(mut self, sex: impl Into<Sex>) -> Self {
        self.sex = sex.into();
        self
    }

    pub fn with_birth(mut self, date: impl Into<String>, place: impl Into<String>) -> Self {
        self.birth_date = date.into();
        self.birth_place = place.into();
        self
    }

    pub fn with_death(mut self, date: impl Into<String>, place: impl Into<String>) -> Self {
        self.death_date = date.into();
        self.death_place = place.into();
        self
    }
}

/// Header fields of the interview form. Not used for graph resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterviewMetadata {
    pub interview_id: String,
    pub interview_date: String,
    pub interview_place: String,
    pub interviewee_name: String,
    pub interviewee_rin: String,
    pub total_names: u32,
}

/// A full transcribed interview: metadata plus person rows in form order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessedData {
    pub metadata: InterviewMetadata,
    pub individuals: Vec<Individual>,
}

/// Accept a rin written as an integer, an integral float or a numeric string.
fn deserialize_rin<'de, D>(deserializer: D) -> std::result::Result<Rin, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = serde_json::Value::deserialize(deserializer)?;
    match &value {
        serde_json::Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return Rin::try_from(v).map_err(|_| D::Error::custom(format!("rin out of range: {}", v)));
            }
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= Rin::MAX as f64 => Ok(f as Rin),
                _ => Err(D::Error::custom(format!("invalid rin: {}", n))),
            }
        }
        serde_json::Value::String(s) => s
            .trim()
            .parse::<Rin>()
            .map_err(|_| D::Error::custom(format!("invalid rin: {:?}", s))),
        serde_json::Value::Null => Ok(0),
        other => Err(D::Error::custom(format!("invalid rin: {}", other))),
    }
}
