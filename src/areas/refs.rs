//! Reading refs out of `.git`
//!
//! A ref file holds either a 40-character object id or a pointer line of
//! the form `ref: refs/heads/main`. Resolution follows pointers until an
//! id turns up. A pointer to a file that does not exist yet is how git
//! represents an unborn branch, and resolves to nothing.

use crate::artifacts::branch::branch_name::{BranchName, SymRefName};
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;
use std::path::Path;

/// Matches the pointer form of a ref file
const POINTER_PATTERN: &str = r"^ref: (.+)$";

pub const HEAD_REF_NAME: &str = "HEAD";

/// Read-only view of the refs stored under `.git`
#[derive(Debug, new)]
pub struct Refs {
    /// The `.git` directory itself
    path: Box<Path>,
}

/// What a single ref file says, before any pointer is followed
#[derive(Debug, Clone)]
enum RefContent {
    /// A pointer to another ref
    Pointer(SymRefName),
    /// An object id, the end of the chain
    Direct(ObjectId),
}

impl RefContent {
    fn parse(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)?;
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        let content = match regex::Regex::new(POINTER_PATTERN)?.captures(raw) {
            Some(pointer) => RefContent::Pointer(SymRefName::new(pointer[1].to_string())),
            None => RefContent::Direct(ObjectId::try_parse(raw.to_string())?),
        };

        Ok(Some(content))
    }
}

impl Refs {
    /// The commit HEAD points at, `None` while HEAD is unborn
    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        self.resolve(&self.head_path())
    }

    /// Look a branch up by name and follow it to a commit
    pub fn read_ref(&self, branch_name: BranchName) -> anyhow::Result<Option<ObjectId>> {
        let ref_path = self.find_path_to_branch(branch_name)?;
        self.resolve(&ref_path)
    }

    /// Follow a ref file to the object id at the end of its pointer chain
    fn resolve(&self, path: &Path) -> anyhow::Result<Option<ObjectId>> {
        match RefContent::parse(path)? {
            Some(RefContent::Pointer(target)) => {
                self.resolve(&self.path.join(target.as_ref_path()))
            }
            Some(RefContent::Direct(oid)) => Ok(Some(oid)),
            None => Ok(None),
        }
    }

    fn find_path_to_branch(&self, branch_name: BranchName) -> anyhow::Result<Box<Path>> {
        // a bare name can live in .git directly, under refs, or under refs/heads
        let bases = [self.path.clone(), self.refs_path(), self.heads_path()];
        bases
            .iter()
            .map(|base| base.join(branch_name.as_ref()).into_boxed_path())
            .find(|candidate| candidate.exists())
            .ok_or_else(|| anyhow::anyhow!("branch {} not found", branch_name))
    }

    fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }
}
