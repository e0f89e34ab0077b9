//! One tracked file as the index records it
//!
//! Besides the path and the staged blob id, every entry keeps the stat
//! fields the file had when it was staged. Matching them against a fresh
//! stat of the working file proves the blob id still describes the
//! content, with no need to hash the file again.

use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object_id::ObjectId;
use byteorder::{NetworkEndian, ReadBytesExt};
use derive_new::new;
use is_executable::IsExecutable;
use std::fs::Metadata;
use std::io::{self, BufRead, Cursor};
use std::os::unix::prelude::MetadataExt;
use std::path::{Path, PathBuf};

/// Longest path length the flags word can record
const MAX_PATH_SIZE: usize = 4095;

/// On-disk entries are null-padded to a multiple of this many bytes
pub const ENTRY_BLOCK: usize = 8;

/// The fixed fields plus the shortest possible padded name
pub const ENTRY_MIN_SIZE: usize = 64;

/// A tracked file, read from the index
#[derive(Debug, Clone, Default, new)]
pub struct IndexEntry {
    /// Path relative to the repository root
    pub name: PathBuf,
    /// Blob id the content had when it was staged
    pub oid: ObjectId,
    /// Stat cache captured at staging time
    pub metadata: FileStat,
}

impl IndexEntry {
    /// Whether a fresh stat still agrees with the cached size and mode
    pub fn stat_match(&self, fresh: &FileStat) -> bool {
        (self.metadata.size == 0 || self.metadata.size == fresh.size)
            && self.metadata.mode == fresh.mode
    }

    /// Whether a fresh stat still carries the cached timestamps
    pub fn times_match(&self, fresh: &FileStat) -> bool {
        self.metadata.ctime == fresh.ctime && self.metadata.mtime == fresh.mtime
    }
}

/// Seconds and nanoseconds of one stat timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timespec {
    pub secs: i64,
    pub nsecs: i64,
}

impl Timespec {
    fn read_from(reader: &mut impl io::Read) -> anyhow::Result<Self> {
        Ok(Self {
            secs: reader.read_u32::<NetworkEndian>()? as i64,
            nsecs: reader.read_u32::<NetworkEndian>()? as i64,
        })
    }
}

/// The slice of `struct stat` the index caches per entry
///
/// A file whose fresh stat equals the cached one has not changed since it
/// was staged, so the staged blob id can stand in for rehashing it. The
/// same struct doubles as the result of statting a working file.
#[derive(Debug, Clone, Default)]
pub struct FileStat {
    /// Inode change time
    pub ctime: Timespec,
    /// Content modification time
    pub mtime: Timespec,
    /// Device holding the inode
    pub dev: u64,
    pub ino: u64,
    /// File type and permission class
    pub mode: EntryMode,
    pub uid: u32,
    pub gid: u32,
    /// Content length in bytes
    pub size: u64,
    /// Flag bits and the name length, as the on-disk entry stores them
    pub flags: u32,
}

impl Unpackable for IndexEntry {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let bytes: Vec<u8> = reader.bytes().collect::<Result<_, _>>()?;
        anyhow::ensure!(
            bytes.len() >= ENTRY_MIN_SIZE,
            "Index entry of {} bytes is too short",
            bytes.len()
        );

        let mut fields = Cursor::new(bytes.as_slice());
        let ctime = Timespec::read_from(&mut fields)?;
        let mtime = Timespec::read_from(&mut fields)?;
        let dev = fields.read_u32::<NetworkEndian>()? as u64;
        let ino = fields.read_u32::<NetworkEndian>()? as u64;
        let mode = EntryMode::from(fields.read_u32::<NetworkEndian>()?);
        let uid = fields.read_u32::<NetworkEndian>()?;
        let gid = fields.read_u32::<NetworkEndian>()?;
        let size = fields.read_u32::<NetworkEndian>()? as u64;
        let oid = ObjectId::read_h40_from(&mut fields)?;
        let flags = fields.read_u16::<NetworkEndian>()? as u32;

        // The name follows the fixed fields, terminated by the padding nulls
        let mut raw_name = Vec::new();
        fields.read_until(0, &mut raw_name)?;
        if raw_name.pop() != Some(0) {
            return Err(anyhow::anyhow!("Index entry name is not null-terminated"));
        }
        let name = std::str::from_utf8(&raw_name)
            .map_err(|_| anyhow::anyhow!("Index entry name is not valid UTF-8"))?;

        Ok(IndexEntry {
            name: PathBuf::from(name),
            oid,
            metadata: FileStat {
                ctime,
                mtime,
                dev,
                ino,
                mode,
                uid,
                gid,
                size,
                flags,
            },
        })
    }
}

impl TryFrom<(&Path, Metadata)> for FileStat {
    type Error = anyhow::Error;

    fn try_from((file_path, metadata): (&Path, Metadata)) -> Result<Self, Self::Error> {
        let mode = match (metadata.is_dir(), file_path.is_executable()) {
            (true, _) => EntryMode::Directory,
            (false, true) => EntryMode::File(FileMode::Executable),
            (false, false) => EntryMode::File(FileMode::Regular),
        };
        let name_length = file_path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid file path"))?
            .len();

        Ok(Self {
            ctime: Timespec {
                secs: metadata.ctime(),
                nsecs: metadata.ctime_nsec(),
            },
            mtime: Timespec {
                secs: metadata.mtime(),
                nsecs: metadata.mtime_nsec(),
            },
            dev: metadata.dev(),
            ino: metadata.ino(),
            mode,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size(),
            flags: name_length.min(MAX_PATH_SIZE) as u32,
        })
    }
}
