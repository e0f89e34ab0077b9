//! File content as the database stores it
//!
//! A blob is the bytes of one file and nothing else. Names and modes
//! live in whichever tree entries point at it, so identical files
//! share a single blob.

use crate::artifacts::objects::object::Unpackable;
use derive_new::new;
use std::io::BufRead;

#[derive(Debug, Clone, new)]
pub struct Blob {
    content: String,
}

impl Blob {
    /// Consume the blob, keeping only its content
    pub fn into_content(self) -> String {
        self.content
    }
}

impl Unpackable for Blob {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        // the header has already been read
        let mut content = String::new();
        reader.read_to_string(&mut content)?;

        Ok(Self::new(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn test_deserialize_keeps_content_verbatim() {
        let blob = Blob::deserialize(Cursor::new(b"line one\nline two\n".to_vec())).unwrap();

        assert_eq!(blob.into_content(), "line one\nline two\n");
    }
}
