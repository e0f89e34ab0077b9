//! On-disk format of `.git/index`
//!
//! Version 2 layout: a 12-byte header, one null-padded entry per staged
//! file in path order, optional extension blocks, and a SHA-1 of
//! everything before the final 20 bytes.

pub mod checksum;
pub mod entry_mode;
pub mod index_entry;
pub mod index_header;
