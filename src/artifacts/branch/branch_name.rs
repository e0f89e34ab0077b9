//! Names for refs and branches
//!
//! `BranchName` enforces the rules stock git applies through
//! `check-ref-format`. `SymRefName` is a raw ref path as it appears in a
//! symref file, kept unvalidated since it comes from the repository itself.

use anyhow::Context;
use derive_new::new;

/// Patterns a ref name may not contain, per git-check-ref-format(1)
const FORBIDDEN_NAME_PATTERN: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";

/// A ref path read from a symref file, such as `refs/heads/main`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord, new)]
pub struct SymRefName(String);

impl SymRefName {
    pub fn as_ref_path(&self) -> &str {
        &self.0
    }
}

/// A validated branch name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: String) -> anyhow::Result<Self> {
        if name.is_empty() {
            anyhow::bail!("branch name cannot be empty");
        }

        let forbidden = regex::Regex::new(FORBIDDEN_NAME_PATTERN)
            .with_context(|| format!("invalid branch name regex: {FORBIDDEN_NAME_PATTERN}"))?;

        if forbidden.is_match(&name) {
            anyhow::bail!("invalid branch name: {}", name);
        }

        Ok(Self(name))
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
