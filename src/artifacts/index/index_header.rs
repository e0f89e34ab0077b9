//! The twelve bytes at the front of an index file

use crate::artifacts::objects::object::Unpackable;
use anyhow::anyhow;
use byteorder::{NetworkEndian, ReadBytesExt};
use std::io::BufRead;

/// Magic marker opening every index file
pub const SIGNATURE: &str = "DIRC";

/// The only index format version this reader understands
pub const VERSION: u32 = 2;

/// Signature, version and entry count, 4 bytes each
pub const HEADER_SIZE: usize = 12;

#[derive(Debug, Clone)]
pub struct IndexHeader {
    pub(crate) marker: String,
    pub(crate) version: u32,
    pub(crate) entries_count: u32,
}

impl IndexHeader {
    /// Reject headers written by another tool or format version
    pub(crate) fn validate(&self) -> anyhow::Result<()> {
        if self.marker != SIGNATURE {
            return Err(anyhow!("Not an index file: signature {:?}", self.marker));
        }
        if self.version != VERSION {
            return Err(anyhow!("Unsupported index version {}", self.version));
        }

        Ok(())
    }
}

impl Unpackable for IndexHeader {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut marker = [0u8; 4];
        reader
            .read_exact(&mut marker)
            .map_err(|_| anyhow!("Index header is truncated"))?;

        Ok(IndexHeader {
            marker: String::from_utf8_lossy(&marker).to_string(),
            version: reader.read_u32::<NetworkEndian>()?,
            entries_count: reader.read_u32::<NetworkEndian>()?,
        })
    }
}
