use crate::artifacts::diff::path_filter::PathFilter;
use crate::artifacts::diff::tree_diff::TreeDiff;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use anyhow::Context;
use bytes::Bytes;
use std::io::{BufRead, Cursor, Read};
use std::path::Path;

/// Read access to the loose-object store under `.git/objects`
// TODO: read packfiles as well; repositories gc'd by stock git keep most
// objects packed
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn tree_diff(
        &self,
        old_oid: Option<&ObjectId>,
        new_oid: Option<&ObjectId>,
        path_filter: PathFilter,
    ) -> anyhow::Result<TreeDiff<'_>> {
        let mut tree_diff = TreeDiff::new(self);
        tree_diff.compare(old_oid, new_oid, &path_filter)?;
        Ok(tree_diff)
    }

    pub fn parse_object(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        let (object_type, reader) = self.open_object(object_id)?;

        Ok(match object_type {
            ObjectType::Blob => ObjectBox::Blob(Box::new(Blob::deserialize(reader)?)),
            ObjectType::Tree => ObjectBox::Tree(Box::new(Tree::deserialize(reader)?)),
            ObjectType::Commit => ObjectBox::Commit(Box::new(Commit::deserialize(reader)?)),
        })
    }

    /// Load an object as a blob, `None` when it is some other kind
    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> anyhow::Result<Option<Blob>> {
        match self.open_object(object_id)? {
            (ObjectType::Blob, reader) => Ok(Some(Blob::deserialize(reader)?)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> anyhow::Result<Option<Commit>> {
        match self.open_object(object_id)? {
            (ObjectType::Commit, reader) => Ok(Some(Commit::deserialize(reader)?)),
            _ => Ok(None),
        }
    }

    /// The kind of an object, without parsing its body
    pub fn get_object_type(&self, object_id: &ObjectId) -> anyhow::Result<ObjectType> {
        let (object_type, _) = self.open_object(object_id)?;
        Ok(object_type)
    }

    /// Inflate an object file and position a reader past its header
    fn open_object(&self, object_id: &ObjectId) -> anyhow::Result<(ObjectType, impl BufRead)> {
        let object_path = self.path.join(object_id.to_path());
        let compressed = std::fs::read(&object_path)
            .with_context(|| format!("Unable to read object file {}", object_path.display()))?;

        let mut reader = Cursor::new(Self::inflate(compressed.into())?);
        let object_type = ObjectType::parse_object_type(&mut reader)?;

        Ok((object_type, reader))
    }

    fn inflate(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data.as_ref());
        let mut content = Vec::new();
        decoder
            .read_to_end(&mut content)
            .context("object data is not valid zlib")?;

        Ok(content.into())
    }

    /// Every stored object id starting with the given hex prefix
    ///
    /// Abbreviated revisions resolve through this; more than one match means
    /// the abbreviation is ambiguous.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let mut matches = Vec::new();

        // The first two hex digits name the fan-out directory, so a prefix
        // that long pins the search to a single directory
        if prefix.len() >= 2 {
            self.collect_matches(&prefix[..2], &prefix[2..], &mut matches)?;
        } else {
            for fan_out in 0..=255u8 {
                let dir_name = format!("{fan_out:02x}");
                if dir_name.starts_with(prefix) {
                    self.collect_matches(&dir_name, "", &mut matches)?;
                }
            }
        }

        Ok(matches)
    }

    fn collect_matches(
        &self,
        dir_name: &str,
        file_prefix: &str,
        matches: &mut Vec<ObjectId>,
    ) -> anyhow::Result<()> {
        let fan_out_dir = self.path.join(dir_name);
        if !fan_out_dir.is_dir() {
            return Ok(());
        }

        for entry in std::fs::read_dir(&fan_out_dir)? {
            let file_name = entry?.file_name();
            let file_name = file_name.to_string_lossy();

            if file_name.starts_with(file_prefix)
                && let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}"))
            {
                matches.push(oid);
            }
        }

        Ok(())
    }
}
