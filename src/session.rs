//! Loading interview sessions saved by the transcription UI.

use std::path::Path;

use serde_json::Value;

use crate::error::{OralgenError, Result};
use crate::model::ProcessedData;

/// Parse a session from JSON text, accepting either a bare interview or the
/// UI's auto-save envelope (`{ "savedData": ..., "savedAppState": ... }`).
///
/// A document with a `savedData` key is always read as an envelope, so a bad
/// row inside it is an error rather than an empty interview. A bare document
/// must carry an `individuals` key.
pub fn parse_session(content: &str, origin: &str) -> Result<ProcessedData> {
    let parse_error =
        |e: serde_json::Error| OralgenError::Parse(format!("session JSON error in {}: {}", origin, e));

    let document: Value = serde_json::from_str(content).map_err(parse_error)?;
    let data = match document {
        Value::Object(mut object) => {
            if let Some(saved) = object.remove("savedData") {
                saved
            } else if object.contains_key("individuals") {
                Value::Object(object)
            } else {
                return Err(OralgenError::Parse(format!(
                    "session JSON error in {}: neither savedData nor individuals present",
                    origin
                )));
            }
        }
        _ => {
            return Err(OralgenError::Parse(format!(
                "session JSON error in {}: expected an object",
                origin
            )))
        }
    };

    let data: ProcessedData = serde_json::from_value(data).map_err(parse_error)?;
    Ok(data)
}

/// Read and parse a session file.
pub fn load_session(path: &Path) -> Result<ProcessedData> {
    let content = std::fs::read_to_string(path).map_err(OralgenError::Io)?;
    let data = parse_session(&content, &path.display().to_string())?;
    log::debug!(
        "Loaded session {} ({} individuals)",
        path.display(),
        data.individuals.len()
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const BARE: &str = r#"{
        "metadata": {"interviewId": "OG-17", "intervieweeName": "Ruth"},
        "individuals": [
            {"rin": 1, "fullName": "John Smith", "sex": "M", "relation": ""},
            {"rin": 2, "fullName": "Mary Smith", "sex": "F", "relation": "C1"}
        ]
    }"#;

    #[test]
    fn test_parse_bare_session() {
        let data = parse_session(BARE, "test").unwrap();
        assert_eq!(data.metadata.interview_id, "OG-17");
        assert_eq!(data.individuals.len(), 2);
        assert_eq!(data.individuals[1].relation, "C1");
    }

    #[test]
    fn test_parse_saved_envelope() {
        let wrapped = format!(r#"{{"savedData": {}, "savedAppState": "REVIEW"}}"#, BARE);
        let data = parse_session(&wrapped, "test").unwrap();
        assert_eq!(data.metadata.interview_id, "OG-17");
        assert_eq!(data.individuals.len(), 2);
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_session("{\"individuals\": [", "broken.json").unwrap_err();
        assert!(matches!(err, OralgenError::Parse(_)));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_malformed_envelope_is_an_error() {
        let wrapped = r#"{"savedData": {"metadata": {"interviewId": "OG-9"},
            "individuals": [{"rin": "abc"}]}}"#;
        let err = parse_session(wrapped, "saved.json").unwrap_err();
        assert!(matches!(err, OralgenError::Parse(_)));
        assert!(err.to_string().contains("saved.json"));
    }

    #[test]
    fn test_unrelated_json_is_an_error() {
        for content in [r#"{"name": "settings", "theme": "dark"}"#, "{}", "[1, 2]", "\"text\""] {
            let err = parse_session(content, "other.json").unwrap_err();
            assert!(matches!(err, OralgenError::Parse(_)), "{}", content);
        }
    }

    #[test]
    fn test_bare_session_without_metadata() {
        let data = parse_session(r#"{"individuals": []}"#, "test").unwrap();
        assert_eq!(data.metadata.interview_id, "");
        assert!(data.individuals.is_empty());
    }

    #[test]
    fn test_load_session_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        fs::write(&path, BARE).unwrap();
        let data = load_session(&path).unwrap();
        assert_eq!(data.individuals[0].full_name, "John Smith");
    }

    #[test]
    fn test_load_session_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = load_session(&temp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, OralgenError::Io(_)));
    }
}
