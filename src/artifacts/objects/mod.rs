//! The object model read out of `.git/objects`
//!
//! Three object kinds matter for diffing: blobs hold file content,
//! trees map names to blobs and nested trees, and commits name the
//! root tree of a snapshot. Loose objects are zlib-compressed with a
//! `<type> <size>\0` header in front of the body.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Characters in the hex spelling of a SHA-1 digest
pub const OBJECT_ID_LENGTH: usize = 40;
