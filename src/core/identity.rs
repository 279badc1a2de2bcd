//! Record identity system using type-prefixed ULIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// The four record collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordKind {
    /// Project - the root aggregate
    Project,
    /// Markdown note
    Note,
    /// Colored tag
    Tag,
    /// Todo item with a deadline
    Todo,
}

impl RecordKind {
    /// Get the string representation of the prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Project => "PROJ",
            RecordKind::Note => "NOTE",
            RecordKind::Tag => "TAG",
            RecordKind::Todo => "TODO",
        }
    }

    /// The database table backing this collection
    pub fn table(&self) -> &'static str {
        match self {
            RecordKind::Project => "projects",
            RecordKind::Note => "notes",
            RecordKind::Tag => "tags",
            RecordKind::Todo => "todos",
        }
    }

    /// Get all record kinds
    pub fn all() -> &'static [RecordKind] {
        &[
            RecordKind::Project,
            RecordKind::Note,
            RecordKind::Tag,
            RecordKind::Todo,
        ]
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PROJ" => Ok(RecordKind::Project),
            "NOTE" => Ok(RecordKind::Note),
            "TAG" => Ok(RecordKind::Tag),
            "TODO" => Ok(RecordKind::Todo),
            _ => Err(IdParseError::InvalidPrefix(s.to_string())),
        }
    }
}

/// A unique record identifier combining a collection prefix and ULID
///
/// Ids are generated once at record creation and stay stable for the
/// lifetime of the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId {
    kind: RecordKind,
    ulid: Ulid,
}

impl RecordId {
    /// Create a new RecordId for the given collection
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            ulid: Ulid::new(),
        }
    }

    /// Create a RecordId from a kind and existing ULID
    pub fn from_parts(kind: RecordKind, ulid: Ulid) -> Self {
        Self { kind, ulid }
    }

    /// Get the collection this id belongs to
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Get the ULID component
    pub fn ulid(&self) -> Ulid {
        self.ulid
    }

    /// Parse a RecordId from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.ulid)
    }
}

impl FromStr for RecordId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind_str, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        let kind = kind_str.parse()?;
        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { kind, ulid })
    }
}

impl Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing record ids
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid record prefix: '{0}' (valid: PROJ, NOTE, TAG, TODO)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in record id: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_generation() {
        let id = RecordId::new(RecordKind::Note);
        assert!(id.to_string().starts_with("NOTE-"));
        assert_eq!(id.to_string().len(), 31); // NOTE- (5) + ULID (26) = 31
    }

    #[test]
    fn test_record_id_parsing() {
        let original = RecordId::new(RecordKind::Tag);
        let parsed = RecordId::parse(&original.to_string()).unwrap();
        assert_eq!(parsed.kind(), RecordKind::Tag);
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_record_id_invalid_prefix() {
        let err = RecordId::parse("XXX-01HQ3K4N5M6P7R8S9T0UVWXYZ").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidPrefix(_)));
    }

    #[test]
    fn test_record_id_missing_delimiter() {
        let err = RecordId::parse("NOTE01HQ3K4N5M6P7R8S9T0UVWXYZ").unwrap_err();
        assert!(matches!(err, IdParseError::MissingDelimiter(_)));
    }

    #[test]
    fn test_record_id_invalid_ulid() {
        let err = RecordId::parse("NOTE-notaulid").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidUlid(_, _)));
    }

    #[test]
    fn test_record_id_serde_roundtrip() {
        let original = RecordId::new(RecordKind::Todo);
        let json = serde_json::to_string(&original).unwrap();
        let parsed: RecordId = serde_json::from_str(&json).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_all_kinds_parse() {
        for kind in RecordKind::all() {
            let id = RecordId::new(*kind);
            let parsed = RecordId::parse(&id.to_string()).unwrap();
            assert_eq!(parsed.kind(), *kind);
        }
    }
}
