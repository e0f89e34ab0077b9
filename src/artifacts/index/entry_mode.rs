//! File modes for index and tree entries
//!
//! Git only distinguishes a handful of modes: regular files, executable
//! files, and directories (trees). The mode travels as an octal number in
//! tree objects and as a 32-bit field in index entries.

#[derive(Debug, Clone, Eq, Ord, Default, PartialEq, PartialOrd)]
pub enum FileMode {
    #[default]
    Regular,
    Executable,
}

#[derive(Debug, Clone, Eq, Ord, Default, PartialEq, PartialOrd)]
pub enum EntryMode {
    File(FileMode),
    #[default]
    Directory,
}

impl EntryMode {
    pub fn is_tree(&self) -> bool {
        matches!(self, EntryMode::Directory)
    }

    /// Parse a mode from its octal representation in a tree object
    pub fn from_octal_str(value: &str) -> anyhow::Result<Self> {
        let mode = u32::from_str_radix(value, 8)
            .map_err(|_| anyhow::anyhow!("Invalid entry mode: {value}"))?;

        match mode {
            // symlinks store their target path as blob content
            0o100644 | 0o120000 => Ok(EntryMode::File(FileMode::Regular)),
            0o100755 => Ok(EntryMode::File(FileMode::Executable)),
            0o40000 => Ok(EntryMode::Directory),
            _ => Err(anyhow::anyhow!("Invalid entry mode: {value}")),
        }
    }
}

impl From<u32> for EntryMode {
    fn from(mode: u32) -> Self {
        match mode {
            0o100755 => EntryMode::File(FileMode::Executable),
            0o40000 => EntryMode::Directory,
            // unrecognized modes are treated as regular files
            _ => EntryMode::File(FileMode::Regular),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("100644", EntryMode::File(FileMode::Regular))]
    #[case("100755", EntryMode::File(FileMode::Executable))]
    #[case("40000", EntryMode::Directory)]
    #[case("120000", EntryMode::File(FileMode::Regular))]
    fn test_parse_octal_mode(#[case] raw: &str, #[case] expected: EntryMode) {
        pretty_assertions::assert_eq!(EntryMode::from_octal_str(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("160000")]
    #[case("064")]
    #[case("not-a-mode")]
    fn test_parse_invalid_octal_mode(#[case] raw: &str) {
        assert!(EntryMode::from_octal_str(raw).is_err());
    }

    #[rstest]
    fn test_only_directories_are_trees() {
        assert!(EntryMode::Directory.is_tree());
        assert!(!EntryMode::File(FileMode::Regular).is_tree());
        assert!(!EntryMode::File(FileMode::Executable).is_tree());
    }
}
