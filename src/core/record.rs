//! Record traits - common interface between typed records and the store

use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::{RecordId, RecordKind};

/// Common trait for all persisted record types
///
/// A record serializes to a JSON body keyed by its id; the store never
/// inspects anything beyond `id` and `project_id`.
pub trait Record: Serialize + DeserializeOwned {
    /// The collection this record type belongs to
    const KIND: RecordKind;

    /// Get the record's unique id
    fn id(&self) -> &RecordId;

    /// Get the owning project's id, if this record type has one
    fn project_id(&self) -> Option<&RecordId> {
        None
    }
}

/// Marker for records owned by a project and indexed by `project_id`
///
/// Projects themselves are not `OwnedRecord`; notes, tags, and todos are.
pub trait OwnedRecord: Record {}
