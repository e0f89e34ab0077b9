//! Tool input staging
//!
//! An external tool can only read real files, so every side of a comparison
//! is turned into something on disk before launch:
//!
//! - working-tree content is handed over in place
//! - database content is written to a temporary file that deletes itself
//!   when the comparison for that path is over
//! - a missing side points at the null device
//!
//! The merged slot always names the working-tree location of the path, even
//! for sides that never touch the working tree; tools use it as the label
//! and save target.

use crate::areas::repository::Repository;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::diff::source::DiffSource;
use crate::artifacts::difftool::error::DifftoolError;
use crate::artifacts::difftool::smudge::WorkingTreeConversion;
use derive_new::new;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Path advertised to tools for a side with no content
pub const NULL_PATH: &str = "/dev/null";

/// Which slot of the tool command a file fills
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    Local,
    Remote,
    Merged,
}

impl FileRole {
    pub fn env_name(&self) -> &'static str {
        match self {
            FileRole::Local => "LOCAL",
            FileRole::Remote => "REMOTE",
            FileRole::Merged => "MERGED",
        }
    }
}

/// Where a materialized file's bytes live
#[derive(Debug)]
pub enum Backing {
    /// No content; the tool is pointed at the null device
    Absent,
    /// The file as it sits in the working tree
    WorkingTree(PathBuf),
    /// Database content written to a self-deleting temporary file
    Temp(tempfile::TempPath),
}

/// One side of a comparison, ready to be named on a tool command line
#[derive(Debug)]
pub struct MaterializedFile {
    path: PathBuf,
    backing: Backing,
}

impl MaterializedFile {
    /// Repository-relative path of the entry this file stands in for
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The on-disk path to hand to the tool
    pub fn tool_path(&self) -> &Path {
        match &self.backing {
            Backing::Absent => Path::new(NULL_PATH),
            Backing::WorkingTree(path) => path,
            Backing::Temp(temp_path) => temp_path,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self.backing, Backing::Absent)
    }
}

/// Prepares comparison sides on disk
#[derive(new)]
pub struct Materializer<'r> {
    repository: &'r Repository,
    conversion: &'r WorkingTreeConversion,
}

impl<'r> Materializer<'r> {
    /// Materialize one side of a single changed path
    pub async fn materialize(
        &self,
        role: FileRole,
        path: &Path,
        entry: Option<&DatabaseEntry>,
        source: &DiffSource,
    ) -> anyhow::Result<MaterializedFile> {
        let Some(entry) = entry else {
            return Ok(MaterializedFile {
                path: path.to_path_buf(),
                backing: Backing::Absent,
            });
        };

        let backing = if source.is_stored() {
            self.stage_from_database(role, path, entry, source).await?
        } else {
            Backing::WorkingTree(self.repository.workspace().path().join(path))
        };

        Ok(MaterializedFile {
            path: path.to_path_buf(),
            backing,
        })
    }

    /// The merged slot: the working-tree location of the path
    pub fn materialize_merged(&self, path: &Path) -> MaterializedFile {
        MaterializedFile {
            path: path.to_path_buf(),
            backing: Backing::WorkingTree(self.repository.workspace().path().join(path)),
        }
    }

    async fn stage_from_database(
        &self,
        role: FileRole,
        path: &Path,
        entry: &DatabaseEntry,
        source: &DiffSource,
    ) -> anyhow::Result<Backing> {
        let blob = match self.repository.database().parse_object_as_blob(&entry.oid) {
            Ok(Some(blob)) => blob,
            _ => anyhow::bail!(DifftoolError::PathNotFound {
                path: path.to_path_buf(),
                area: source.area(),
            }),
        };

        let content = self.conversion.apply(path, blob.into_content()).await?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "file".to_string());

        let mut temp_file = tempfile::Builder::new()
            .prefix(&format!("{}_", role.env_name()))
            .suffix(&format!("_{file_name}"))
            .tempfile()?;
        temp_file.write_all(content.as_bytes())?;

        Ok(Backing::Temp(temp_file.into_temp_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_absent_side_points_at_null_device() {
        let file = MaterializedFile {
            path: PathBuf::from("gone.txt"),
            backing: Backing::Absent,
        };

        assert!(file.is_absent());
        assert_eq!(file.tool_path(), Path::new(NULL_PATH));
        assert_eq!(file.path(), Path::new("gone.txt"));
    }

    #[test]
    fn test_working_tree_side_keeps_its_location() {
        let file = MaterializedFile {
            path: PathBuf::from("a.txt"),
            backing: Backing::WorkingTree(PathBuf::from("/repo/a.txt")),
        };

        assert!(!file.is_absent());
        assert_eq!(file.tool_path(), Path::new("/repo/a.txt"));
    }

    #[test]
    fn test_temp_side_is_deleted_when_dropped() {
        let mut temp_file = tempfile::Builder::new()
            .prefix("LOCAL_")
            .suffix("_a.txt")
            .tempfile()
            .unwrap();
        temp_file.write_all(b"staged content").unwrap();

        let file = MaterializedFile {
            path: PathBuf::from("a.txt"),
            backing: Backing::Temp(temp_file.into_temp_path()),
        };

        let on_disk = file.tool_path().to_path_buf();
        assert!(on_disk.exists());
        let name = on_disk.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("LOCAL_"));
        assert!(name.ends_with("_a.txt"));

        drop(file);
        assert!(!on_disk.exists());
    }

    #[test]
    fn test_role_env_names() {
        assert_eq!(FileRole::Local.env_name(), "LOCAL");
        assert_eq!(FileRole::Remote.env_name(), "REMOTE");
        assert_eq!(FileRole::Merged.env_name(), "MERGED");
    }
}
