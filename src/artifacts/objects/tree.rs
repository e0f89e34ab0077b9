//! One directory level of a committed snapshot
//!
//! Entries run back to back with no padding. Each is the octal mode,
//! a space, the entry name, a NUL, then the 20 raw bytes of the child
//! object id. Subdirectories appear as entries whose mode marks a
//! tree.

use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::collections::BTreeMap;
use std::io::BufRead;

/// Name-ordered entries of one tree object
#[derive(Debug, Clone, Default)]
pub struct Tree {
    entries: BTreeMap<String, DatabaseEntry>,
}

impl Tree {
    pub fn into_entries(self) -> impl Iterator<Item = (String, DatabaseEntry)> {
        self.entries.into_iter()
    }
}

impl Unpackable for Tree {
    // the object header has already been read
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = BTreeMap::new();

        while let Some(mode_field) = read_field(&mut reader, b' ')? {
            let mode = EntryMode::from_octal_str(std::str::from_utf8(&mode_field)?)?;

            let name_field =
                read_field(&mut reader, b'\0')?.context("tree entry ends before its name")?;
            let name = String::from_utf8(name_field)?;

            let oid = ObjectId::read_h40_from(&mut reader)
                .context("tree entry ends inside its object id")?;

            entries.insert(name, DatabaseEntry::new(oid, mode));
        }

        Ok(Tree { entries })
    }
}

/// Read through `delimiter`, returning `None` on a clean EOF and an
/// error when input runs out mid-field
fn read_field(reader: &mut impl BufRead, delimiter: u8) -> anyhow::Result<Option<Vec<u8>>> {
    let mut field = Vec::new();
    if reader.read_until(delimiter, &mut field)? == 0 {
        return Ok(None);
    }
    anyhow::ensure!(
        field.pop() == Some(delimiter),
        "tree entry is cut off before a {:?} delimiter",
        char::from(delimiter)
    );

    Ok(Some(field))
}
