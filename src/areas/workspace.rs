use crate::artifacts::index::index_entry::FileStat;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use sha1::{Digest, Sha1};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// The files on disk, addressed relative to the repository root
///
/// The walk covers tracked and untracked files alike; telling them apart
/// is the caller's concern.
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The id the file's content would have as a stored blob
    ///
    /// Hashes the raw bytes in their on-disk framing, so working files can
    /// be matched against staged and committed blobs without storing them.
    /// Binary content hashes like any other.
    pub fn hash_file(&self, file_path: &Path) -> anyhow::Result<ObjectId> {
        let content = std::fs::read(self.path.join(file_path))?;

        let mut digest = Sha1::new();
        digest.update(format!("{} {}\0", ObjectType::Blob.as_str(), content.len()));
        digest.update(&content);

        ObjectId::try_parse(format!("{:x}", digest.finalize()))
    }

    /// Every file under the root, as paths relative to it
    ///
    /// The `.git` directory and everything inside it stay out of the walk,
    /// and unreadable directories are skipped rather than failing the scan.
    pub fn list_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(self.path.as_ref())
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.path().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(self.path.as_ref()) else {
                continue;
            };
            if !Self::crosses_git_dir(relative) {
                files.push(relative.to_path_buf());
            }
        }

        Ok(files)
    }

    /// Fresh stat fields for one working file
    pub fn stat_file(&self, file_path: &Path) -> anyhow::Result<FileStat> {
        let metadata = std::fs::metadata(self.path.join(file_path))?;

        (file_path, metadata).try_into()
    }

    fn crosses_git_dir(relative: &Path) -> bool {
        relative
            .components()
            .any(|component| component == Component::Normal(".git".as_ref()))
    }
}
