//! Kind tags carried in loose object headers

use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
}

impl ObjectType {
    /// The tag as it is spelled inside an object header
    pub fn as_str(&self) -> &str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
        }
    }

    /// Consume a `<type> <size>\0` header, leaving the reader at the
    /// start of the object body
    pub fn parse_object_type(data_reader: &mut impl BufRead) -> anyhow::Result<ObjectType> {
        let mut header = Vec::new();
        data_reader.read_until(b'\0', &mut header)?;
        if header.pop() != Some(b'\0') {
            anyhow::bail!("Object header is not NUL-terminated");
        }

        let header = String::from_utf8(header)?;
        match header.split(' ').next().unwrap_or_default() {
            "blob" => Ok(Self::Blob),
            "tree" => Ok(Self::Tree),
            "commit" => Ok(Self::Commit),
            other => anyhow::bail!("Unknown object type {other:?}"),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(b"blob 12\0file content".as_slice(), ObjectType::Blob)]
    #[case(b"tree 0\0".as_slice(), ObjectType::Tree)]
    #[case(b"commit 200\0tree abc".as_slice(), ObjectType::Commit)]
    fn test_reads_the_tag_from_a_header(#[case] raw: &[u8], #[case] expected: ObjectType) {
        let mut reader = raw;

        assert_eq!(ObjectType::parse_object_type(&mut reader).unwrap(), expected);
    }

    #[test]
    fn test_leaves_the_reader_at_the_body() {
        let mut reader: &[u8] = b"blob 5\0hello";

        ObjectType::parse_object_type(&mut reader).unwrap();

        assert_eq!(reader, b"hello".as_slice());
    }

    #[rstest]
    #[case(b"tag 100\0".as_slice())]
    #[case(b"blob 12".as_slice())]
    #[case(b"".as_slice())]
    fn test_rejects_foreign_or_truncated_headers(#[case] raw: &[u8]) {
        let mut reader = raw;

        assert!(ObjectType::parse_object_type(&mut reader).is_err());
    }
}
