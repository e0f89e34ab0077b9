//! What a tree records about one child

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;

/// Object id and mode of a single tree entry
#[derive(Debug, Clone, PartialEq, new)]
pub struct DatabaseEntry {
    pub oid: ObjectId,
    pub mode: EntryMode,
}

impl DatabaseEntry {
    /// Whether this entry points at a nested tree rather than a blob
    pub fn is_tree(&self) -> bool {
        self.mode.is_tree()
    }
}
