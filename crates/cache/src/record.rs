//! The persisted cache record.

use serde::{Deserialize, Serialize};

/// A cached extraction result, exactly as stored on disk.
///
/// The JSON field names are the wire contract: records written by older
/// releases must keep parsing, so they never change. `langs` historically
/// named a language list but is generically whatever options signature the
/// producer ran under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Logical path of the source document at the time of writing. Kept
    /// for diagnostics only; lookups never consult it.
    pub path: String,
    /// The extracted text payload.
    pub text: String,
    /// Version of the producing extractor. Informational.
    #[serde(rename = "libVersion")]
    pub lib_version: String,
    /// Options signature the record was produced under. The empty string
    /// is a valid, distinct signature meaning "default options".
    pub langs: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let record = CacheRecord {
            path: "Notes/scan.pdf".to_string(),
            text: "Hello".to_string(),
            lib_version: "1.2.3".to_string(),
            langs: "eng".to_string(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"path":"Notes/scan.pdf","text":"Hello","libVersion":"1.2.3","langs":"eng"}"#);
    }

    #[test]
    fn test_parses_camel_case_version_field() {
        let json = r#"{"path":"a.pdf","text":"T","libVersion":"0.9.0","langs":""}"#;
        let record: CacheRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.lib_version, "0.9.0");
        assert_eq!(record.langs, "");
    }

    #[test]
    fn test_rejects_incomplete_records() {
        assert!(serde_json::from_str::<CacheRecord>(r#"{"path":"a.pdf"}"#).is_err());
        assert!(serde_json::from_str::<CacheRecord>("not json at all").is_err());
        assert!(serde_json::from_str::<CacheRecord>("").is_err());
    }
}
