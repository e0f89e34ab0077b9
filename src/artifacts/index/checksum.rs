//! Digest-checked reading of the index file
//!
//! Every byte pulled out of the file feeds a running SHA-1, so the
//! trailing checksum can be compared once the rest has been consumed.

use anyhow::anyhow;
use bytes::Bytes;
use file_guard::FileGuard;
use sha1::{Digest, Sha1};
use std::io::Read;
use std::ops::DerefMut;

/// A SHA-1 digest closes every index file
pub const CHECKSUM_SIZE: usize = 20;

#[derive(Debug)]
pub struct Checksum<'f> {
    file: FileGuard<&'f mut std::fs::File>,
    digest: Sha1,
    bytes_read: u64,
}

impl<'f> Checksum<'f> {
    pub(crate) fn new(file: FileGuard<&'f mut std::fs::File>) -> Self {
        Checksum {
            file,
            digest: Sha1::new(),
            bytes_read: 0,
        }
    }

    /// Bytes consumed so far, the trailing checksum not included
    pub(crate) fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub(crate) fn read(&mut self, size: usize) -> anyhow::Result<Bytes> {
        let mut buffer = vec![0u8; size];
        self.file
            .deref_mut()
            .read_exact(&mut buffer)
            .map_err(|_| anyhow!("Unexpected end-of-file while reading index"))?;

        self.digest.update(&buffer);
        self.bytes_read += size as u64;

        Ok(Bytes::from(buffer))
    }

    /// Consume the stored checksum and compare it against the running digest
    pub(crate) fn verify(mut self) -> anyhow::Result<()> {
        let mut stored = [0u8; CHECKSUM_SIZE];
        self.file.deref_mut().read_exact(&mut stored)?;

        if stored != self.digest.finalize().as_slice() {
            return Err(anyhow!("Index checksum does not match its content"));
        }

        Ok(())
    }
}
