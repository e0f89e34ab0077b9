//! The staging area, read from `.git/index`
//!
//! Entries arrive sorted by path and carry the stat cache described in
//! [`crate::artifacts::index::index_entry`]. Extension blocks after the
//! entries are skipped, but still feed the trailing checksum.

use crate::artifacts::index::checksum::{CHECKSUM_SIZE, Checksum};
use crate::artifacts::index::index_entry::{ENTRY_BLOCK, ENTRY_MIN_SIZE, IndexEntry};
use crate::artifacts::index::index_header::{HEADER_SIZE, IndexHeader};
use crate::artifacts::objects::object::Unpackable;
use byteorder::ByteOrder;
use std::collections::BTreeMap;
use std::ops::DerefMut;
use std::path::Path;

/// In-memory snapshot of the staged files
#[derive(Debug, Clone)]
pub struct Index {
    path: Box<Path>,
    entries: BTreeMap<Box<Path>, IndexEntry>,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reload the staged entries from disk
    ///
    /// A missing or empty index file is a repository with nothing staged,
    /// not an error. The file is held under a shared lock while it is read
    /// and its checksum has to verify before the snapshot is accepted.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.entries.clear();

        if !self.path().exists() {
            return Ok(());
        }

        let mut index_file = std::fs::OpenOptions::new().read(true).open(self.path())?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        let total_len = lock.deref_mut().metadata()?.len();
        if total_len == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(lock);
        let entry_count = Self::parse_header(&mut reader)?;
        self.parse_entries(entry_count, &mut reader)?;
        Self::consume_extensions(total_len, &mut reader)?;

        reader.verify()
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    fn parse_header(reader: &mut Checksum) -> anyhow::Result<u32> {
        let header = IndexHeader::deserialize(reader.read(HEADER_SIZE)?.as_ref())?;
        header.validate()?;

        Ok(header.entries_count)
    }

    fn parse_entries(&mut self, entry_count: u32, reader: &mut Checksum) -> anyhow::Result<()> {
        for _ in 0..entry_count {
            let mut entry_bytes = reader.read(ENTRY_MIN_SIZE)?.to_vec();
            // the 8-byte padding doubles as the name terminator, so blocks
            // keep coming until a null closes the entry
            while entry_bytes.last() != Some(&0) {
                entry_bytes.extend_from_slice(&reader.read(ENTRY_BLOCK)?);
            }

            let entry = IndexEntry::deserialize(entry_bytes.as_slice())?;
            self.entries
                .insert(entry.name.clone().into_boxed_path(), entry);
        }

        Ok(())
    }

    /// Read past the optional extension blocks
    ///
    /// The cache tree, resolve-undo state and friends sit between the
    /// entries and the trailing checksum. None of them matter here, but
    /// every byte has to flow through the reader for the checksum to add up.
    fn consume_extensions(total_len: u64, reader: &mut Checksum) -> anyhow::Result<()> {
        const EXTENSION_HEADER_SIZE: usize = 8; // 4-byte signature, 4-byte payload size

        while total_len - reader.bytes_read() > CHECKSUM_SIZE as u64 {
            let header = reader.read(EXTENSION_HEADER_SIZE)?;
            let payload_size = byteorder::NetworkEndian::read_u32(&header[4..8]) as usize;
            reader.read(payload_size)?;
        }

        Ok(())
    }
}
