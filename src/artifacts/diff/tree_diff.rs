use crate::areas::database::Database;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::diff::path_filter::PathFilter;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// One changed file between the two compared sides
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Added(DatabaseEntry),
    Deleted(DatabaseEntry),
    Modified {
        old: DatabaseEntry,
        new: DatabaseEntry,
    },
}

impl Change {
    /// Classify a pair of sides; equal sides are no change at all
    pub fn from_entries(old: Option<DatabaseEntry>, new: Option<DatabaseEntry>) -> Option<Self> {
        match (old, new) {
            (None, Some(new)) => Some(Change::Added(new)),
            (Some(old), None) => Some(Change::Deleted(old)),
            (Some(old), Some(new)) if old != new => Some(Change::Modified { old, new }),
            _ => None,
        }
    }

    pub fn old_entry(&self) -> Option<&DatabaseEntry> {
        match self {
            Change::Deleted(entry) => Some(entry),
            Change::Modified { old, .. } => Some(old),
            Change::Added(_) => None,
        }
    }

    pub fn new_entry(&self) -> Option<&DatabaseEntry> {
        match self {
            Change::Added(entry) => Some(entry),
            Change::Modified { new, .. } => Some(new),
            Change::Deleted(_) => None,
        }
    }
}

/// Changed files keyed by repository-relative path, in path order
pub type ChangeSet = BTreeMap<PathBuf, Change>;

type TreeEntries = BTreeMap<String, DatabaseEntry>;

/// Walks two stored trees in lockstep and records where they disagree
#[derive(Debug)]
pub struct TreeDiff<'r> {
    database: &'r Database,
    change_set: ChangeSet,
}

impl<'r> TreeDiff<'r> {
    pub(crate) fn new(database: &'r Database) -> Self {
        TreeDiff {
            database,
            change_set: BTreeMap::new(),
        }
    }

    pub fn into_changes(self) -> ChangeSet {
        self.change_set
    }

    pub fn compare(
        &mut self,
        old: Option<&ObjectId>,
        new: Option<&ObjectId>,
        filter: &PathFilter,
    ) -> anyhow::Result<()> {
        if old == new {
            return Ok(());
        }

        let old_entries = self.tree_entries_of(old)?;
        let new_entries = self.tree_entries_of(new)?;
        self.compare_level(&old_entries, &new_entries, filter)
    }

    fn compare_level(
        &mut self,
        old: &TreeEntries,
        new: &TreeEntries,
        filter: &PathFilter,
    ) -> anyhow::Result<()> {
        let names: BTreeSet<&String> = old.keys().chain(new.keys()).collect();

        for name in names {
            if !filter.selects(name) {
                continue;
            }

            let old_entry = old.get(name);
            let new_entry = new.get(name);
            if old_entry == new_entry {
                continue;
            }

            // A directory on either side opens a nested comparison; a blob
            // facing a directory of the same name decomposes into a deletion
            // here and additions below (or the other way around).
            let old_subtree = old_entry.filter(|entry| entry.is_tree()).map(|e| &e.oid);
            let new_subtree = new_entry.filter(|entry| entry.is_tree()).map(|e| &e.oid);
            if old_subtree.is_some() || new_subtree.is_some() {
                let subfilter = filter.clone().into_subpath_filter(name);
                self.compare(old_subtree, new_subtree, &subfilter)?;
            }

            let old_blob = old_entry.filter(|entry| !entry.is_tree()).cloned();
            let new_blob = new_entry.filter(|entry| !entry.is_tree()).cloned();
            if let Some(change) = Change::from_entries(old_blob, new_blob) {
                self.change_set.insert(filter.path().join(name), change);
            }
        }

        Ok(())
    }

    fn tree_entries_of(&self, oid: Option<&ObjectId>) -> anyhow::Result<TreeEntries> {
        match oid {
            None => Ok(BTreeMap::new()),
            Some(oid) => Ok(self.tree_of(oid)?.into_entries().collect()),
        }
    }

    /// Load a tree, following a commit to the tree it snapshots
    fn tree_of(&self, oid: &ObjectId) -> anyhow::Result<Tree> {
        match self.database.parse_object(oid)? {
            ObjectBox::Tree(tree) => Ok(*tree),
            ObjectBox::Commit(commit) => self.tree_of(commit.tree_oid()),
            _ => Err(anyhow::anyhow!("object {} is not a tree", oid)),
        }
    }
}
