use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::diff::path_filter::PathFilter;
use crate::artifacts::diff::tree_diff::{Change, ChangeSet};
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One endpoint of a comparison
#[derive(Debug, Clone)]
pub enum DiffSource {
    /// A committed tree, named by a commit or tree id
    Tree(ObjectId),
    /// The staging area
    Index,
    /// The working tree
    Workspace,
}

impl DiffSource {
    /// Whether content for this source lives in the object database
    pub fn is_stored(&self) -> bool {
        !matches!(self, DiffSource::Workspace)
    }

    /// Human-readable name of the place content is looked up in
    pub fn area(&self) -> String {
        match self {
            DiffSource::Tree(oid) => format!("tree {}", oid.to_short_oid()),
            DiffSource::Index => "staging area".to_string(),
            DiffSource::Workspace => "working tree".to_string(),
        }
    }
}

pub type FlatEntryMap = BTreeMap<PathBuf, DatabaseEntry>;

/// Detects the paths that differ between two comparison sources.
///
/// Tree-to-tree comparisons walk both trees level by level; comparisons
/// touching the index or the working tree flatten each side to a path map
/// first. Workspace files reuse the staged object id when file metadata
/// proves the content unchanged, and are hashed otherwise.
#[derive(new)]
pub struct ChangeScanner<'r> {
    repository: &'r Repository,
}

impl<'r> ChangeScanner<'r> {
    pub async fn scan(
        &self,
        old: &DiffSource,
        new: &DiffSource,
        filter: &PathFilter,
    ) -> anyhow::Result<ChangeSet> {
        if let (DiffSource::Tree(old_oid), DiffSource::Tree(new_oid)) = (old, new) {
            let tree_diff =
                self.repository
                    .database()
                    .tree_diff(Some(old_oid), Some(new_oid), filter.clone())?;
            return Ok(tree_diff.into_changes());
        }

        let index = self.repository.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let old_entries = self.flatten(old, &index)?;
        let new_entries = self.flatten(new, &index)?;

        Ok(diff_entry_maps(&old_entries, &new_entries)
            .into_iter()
            .filter(|(path, _)| filter.matches(path))
            .collect())
    }

    fn flatten(&self, source: &DiffSource, index: &Index) -> anyhow::Result<FlatEntryMap> {
        match source {
            DiffSource::Tree(oid) => {
                let mut entries = BTreeMap::new();
                self.collect_tree_entries(oid, PathBuf::new(), &mut entries)?;
                Ok(entries)
            }
            DiffSource::Index => Ok(index
                .entries()
                .map(|entry| {
                    (
                        entry.name.clone(),
                        DatabaseEntry::new(entry.oid.clone(), entry.metadata.mode.clone()),
                    )
                })
                .collect()),
            DiffSource::Workspace => self.flatten_workspace(index),
        }
    }

    fn collect_tree_entries(
        &self,
        oid: &ObjectId,
        prefix: PathBuf,
        entries: &mut FlatEntryMap,
    ) -> anyhow::Result<()> {
        let object = self.repository.database().parse_object(oid)?;

        match object {
            ObjectBox::Commit(commit) => {
                self.collect_tree_entries(commit.tree_oid(), prefix, entries)
            }
            ObjectBox::Tree(tree) => {
                for (name, entry) in tree.into_entries() {
                    let path = prefix.join(&name);
                    if entry.is_tree() {
                        self.collect_tree_entries(&entry.oid, path, entries)?;
                    } else {
                        entries.insert(path, entry);
                    }
                }

                Ok(())
            }
            _ => Err(anyhow::anyhow!("object {} is not a tree", oid)),
        }
    }

    /// Flatten the files on disk, untracked ones included
    ///
    /// A tracked path missing from disk is left out, which turns it into a
    /// deletion against the other side.
    fn flatten_workspace(&self, index: &Index) -> anyhow::Result<FlatEntryMap> {
        let workspace = self.repository.workspace();
        let staged: BTreeMap<_, _> = index
            .entries()
            .map(|entry| (entry.name.as_path(), entry))
            .collect();

        let mut entries = BTreeMap::new();
        for path in workspace.list_files()? {
            let stat = workspace.stat_file(&path)?;
            // a clean stat means the staged oid still describes the content
            let oid = match staged.get(path.as_path()) {
                Some(entry) if entry.stat_match(&stat) && entry.times_match(&stat) => {
                    entry.oid.clone()
                }
                _ => workspace.hash_file(&path)?,
            };

            entries.insert(path, DatabaseEntry::new(oid, stat.mode));
        }

        Ok(entries)
    }
}

/// Compare two flattened path maps, yielding one change per differing path
pub fn diff_entry_maps(old: &FlatEntryMap, new: &FlatEntryMap) -> ChangeSet {
    let mut changes = BTreeMap::new();

    for (path, old_entry) in old {
        if let Some(change) =
            Change::from_entries(Some(old_entry.clone()), new.get(path).cloned())
        {
            changes.insert(path.clone(), change);
        }
    }

    for (path, new_entry) in new {
        if !old.contains_key(path) {
            changes.insert(path.clone(), Change::Added(new_entry.clone()));
        }
    }

    changes
}
