//! SHA-1 names for database objects
//!
//! Every stored object is addressed by the lowercase hex form of its
//! SHA-1 digest. Refs and command output carry the hex form; tree
//! entries and the index pack the raw 20 bytes instead.

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use std::io;
use std::path::PathBuf;

/// Hex-encoded SHA-1 digest naming one object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Validate a 40-character hex string as an object id
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        anyhow::ensure!(
            id.len() == OBJECT_ID_LENGTH,
            "Object id {:?} is not {} characters long",
            id,
            OBJECT_ID_LENGTH
        );
        anyhow::ensure!(
            id.bytes().all(|byte| byte.is_ascii_hexdigit()),
            "Object id {:?} contains non-hex characters",
            id
        );

        Ok(Self(id))
    }

    /// Decode the packed 20-byte form found inside trees and the index
    pub fn read_h40_from<R: io::Read + ?Sized>(reader: &mut R) -> anyhow::Result<Self> {
        let mut raw = [0u8; OBJECT_ID_LENGTH / 2];
        reader.read_exact(&mut raw)?;

        Self::try_parse(raw.iter().map(|byte| format!("{byte:02x}")).collect())
    }

    /// Location of the object under `.git/objects`, fanned out on the
    /// first two characters
    pub fn to_path(&self) -> PathBuf {
        let (fan_out, remainder) = self.0.split_at(2);

        PathBuf::from(fan_out).join(remainder)
    }

    /// Seven-character abbreviation, as shown to users
    pub fn to_short_oid(&self) -> String {
        self.0[..7].to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("too-short")]
    #[case("")]
    #[case("g1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4e5f6a1b2")] // 'g' is not hex
    fn test_rejects_malformed_ids(#[case] raw: &str) {
        assert!(ObjectId::try_parse(raw.to_string()).is_err());
    }

    #[test]
    fn test_storage_path_splits_after_two_characters() {
        let oid = ObjectId::try_parse(format!("ab{}", "c".repeat(38))).unwrap();

        assert_eq!(
            oid.to_path(),
            PathBuf::from("ab").join("c".repeat(38))
        );
    }

    #[test]
    fn test_short_form_keeps_seven_characters() {
        let oid = ObjectId::try_parse("0123456789abcdef0123456789abcdef01234567".to_string())
            .unwrap();

        assert_eq!(oid.to_short_oid(), "0123456");
    }

    #[test]
    fn test_reads_binary_form() {
        let bytes = [0xab; 20];

        let oid = ObjectId::read_h40_from(&mut bytes.as_slice()).unwrap();

        assert_eq!(oid.to_string(), "ab".repeat(20));
    }

    #[test]
    fn test_truncated_binary_form_is_rejected() {
        let bytes = [0xab; 19];

        assert!(ObjectId::read_h40_from(&mut bytes.as_slice()).is_err());
    }
}
