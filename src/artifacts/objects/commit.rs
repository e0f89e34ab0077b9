//! Commit objects, reduced to what revision lookup needs
//!
//! Only the pieces of a commit needed to walk history survive parsing: the
//! tree it snapshots and its parents. Author, committer, signatures and the
//! message are read past and dropped.
//!
//! The body is `tree <hex-id>` followed by zero or more `parent <hex-id>`
//! lines, further headers, a blank line, then the free-form message.

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::io::BufRead;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    tree_oid: ObjectId,
    /// Empty for an initial commit, multiple entries for a merge
    parents: Vec<ObjectId>,
}

impl Commit {
    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    /// First parent, if any
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut tree_oid = None;
        let mut parents = Vec::new();

        for line in reader.lines() {
            let line = line?;
            // a blank line separates the header from the message
            if line.is_empty() {
                break;
            }

            if let Some(oid) = line.strip_prefix("tree ") {
                tree_oid = Some(ObjectId::try_parse(oid.to_string())?);
            } else if let Some(oid) = line.strip_prefix("parent ") {
                parents.push(ObjectId::try_parse(oid.to_string())?);
            }
        }

        let tree_oid = tree_oid.context("Invalid commit object: missing tree line")?;

        Ok(Commit { tree_oid, parents })
    }
}
