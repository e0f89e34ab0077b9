//! Git configuration file access
//!
//! Reads the repository-local configuration at `.git/config`, an INI-style
//! file of `[section]` / `[section "subsection"]` headers followed by
//! `key = value` entries.
//!
//! ## Value Syntax
//!
//! - A key with no `=` is a boolean `true`
//! - Values may be double-quoted; `\"`, `\\`, `\n`, `\t` and `\b` escapes
//!   are recognized
//! - Unquoted `#` and `;` start a trailing comment
//!
//! Section and key names are case-insensitive and stored lowercased;
//! subsection names keep their case.

use crate::artifacts::difftool::error::DifftoolError;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Regex pattern for section headers, with an optional quoted subsection
const SECTION_REGEX: &str = r#"^\[([A-Za-z0-9-]+)(?:\s+"(.*)")?\]$"#;
/// Regex pattern for `key` and `key = value` entries
const ENTRY_REGEX: &str = r"^([A-Za-z][A-Za-z0-9-]*)\s*(=\s*(.*))?$";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, new)]
struct ConfigKey {
    section: String,
    subsection: Option<String>,
    name: String,
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.subsection {
            Some(subsection) => write!(f, "{}.{}.{}", self.section, subsection, self.name),
            None => write!(f, "{}.{}", self.section, self.name),
        }
    }
}

/// Repository-local Git configuration
///
/// A key present without a value is stored as `None`, which reads as `true`
/// through [`GitConfig::get_bool`].
#[derive(Debug, Default)]
pub struct GitConfig {
    entries: BTreeMap<ConfigKey, Option<String>>,
}

impl GitConfig {
    /// Load the configuration stored under the given `.git` directory
    ///
    /// A repository without a config file has an empty configuration.
    pub fn load(git_path: &Path) -> anyhow::Result<Self> {
        let config_path = git_path.join("config");
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::parse(&content)
    }

    pub(crate) fn parse(content: &str) -> anyhow::Result<Self> {
        let section_regex = regex::Regex::new(SECTION_REGEX)?;
        let entry_regex = regex::Regex::new(ENTRY_REGEX)?;

        let mut entries = BTreeMap::new();
        let mut current_section: Option<(String, Option<String>)> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(captures) = section_regex.captures(line) {
                current_section = Some((
                    captures[1].to_lowercase(),
                    captures.get(2).map(|subsection| subsection.as_str().to_string()),
                ));
            } else if let Some(captures) = entry_regex.captures(line) {
                let (section, subsection) = current_section.clone().ok_or_else(|| {
                    DifftoolError::Configuration(format!(
                        "config entry '{line}' appears before any section header"
                    ))
                })?;

                let value = match captures.get(3) {
                    Some(raw_value) => Some(Self::parse_value(raw_value.as_str())?),
                    None => None,
                };

                entries.insert(
                    ConfigKey::new(section, subsection, captures[1].to_lowercase()),
                    value,
                );
            } else {
                anyhow::bail!(DifftoolError::Configuration(format!(
                    "malformed config line: '{line}'"
                )));
            }
        }

        Ok(Self { entries })
    }

    /// Unquote a raw value, honoring escapes and trailing comments
    fn parse_value(raw_value: &str) -> anyhow::Result<String> {
        let mut value = String::new();
        let mut in_quotes = false;
        let mut characters = raw_value.chars();

        while let Some(character) = characters.next() {
            match character {
                '"' => in_quotes = !in_quotes,
                '\\' => match characters.next() {
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('b') => value.push('\u{8}'),
                    _ => {
                        anyhow::bail!(DifftoolError::Configuration(format!(
                            "bad escape in config value: '{raw_value}'"
                        )))
                    }
                },
                '#' | ';' if !in_quotes => break,
                _ => value.push(character),
            }
        }

        if in_quotes {
            anyhow::bail!(DifftoolError::Configuration(format!(
                "unterminated quote in config value: '{raw_value}'"
            )));
        }

        // a trailing comment leaves the unquoted value with dangling whitespace
        Ok(value.trim_end().to_string())
    }

    pub fn get_string(
        &self,
        section: &str,
        subsection: Option<&str>,
        name: &str,
    ) -> Option<&str> {
        self.entries
            .get(&ConfigKey::new(
                section.to_lowercase(),
                subsection.map(|subsection| subsection.to_string()),
                name.to_lowercase(),
            ))
            .map(|value| value.as_deref().unwrap_or_default())
    }

    /// Read a key as a Git boolean
    ///
    /// `yes`, `on`, `true`, `1` and a valueless key are true; `no`, `off`,
    /// `false`, `0` and the empty string are false.
    pub fn get_bool(
        &self,
        section: &str,
        subsection: Option<&str>,
        name: &str,
    ) -> anyhow::Result<Option<bool>> {
        let key = ConfigKey::new(
            section.to_lowercase(),
            subsection.map(|subsection| subsection.to_string()),
            name.to_lowercase(),
        );

        match self.entries.get(&key) {
            None => Ok(None),
            Some(None) => Ok(Some(true)),
            Some(Some(value)) => match value.to_lowercase().as_str() {
                "yes" | "on" | "true" | "1" => Ok(Some(true)),
                "no" | "off" | "false" | "0" | "" => Ok(Some(false)),
                _ => anyhow::bail!(DifftoolError::Configuration(format!(
                    "bad boolean config value '{value}' for '{key}'"
                ))),
            },
        }
    }

    /// Distinct subsection names appearing under a section, in sorted order
    pub fn subsections(&self, section: &str) -> Vec<&str> {
        let section = section.to_lowercase();

        self.entries
            .keys()
            .filter(|key| key.section == section)
            .filter_map(|key| key.subsection.as_deref())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE_CONFIG: &str = r#"
[core]
	repositoryformatversion = 0
	filemode = true
	autocrlf = input
[diff]
	tool = vimdiff
[difftool]
	prompt = false
[difftool "side-by-side"]
	cmd = sdiff "$LOCAL" "$REMOTE"
	trustExitCode = true
[difftool "quiet"]
	cmd = true
"#;

    #[test]
    fn test_reads_plain_values() {
        let config = GitConfig::parse(SAMPLE_CONFIG).unwrap();

        assert_eq!(config.get_string("diff", None, "tool"), Some("vimdiff"));
        assert_eq!(config.get_string("core", None, "autocrlf"), Some("input"));
        assert_eq!(config.get_string("diff", None, "guitool"), None);
    }

    #[test]
    fn test_reads_subsection_values_case_sensitively() {
        let config = GitConfig::parse(SAMPLE_CONFIG).unwrap();

        // the unescaped quotes in the fixture are quoting syntax, not content
        assert_eq!(
            config.get_string("difftool", Some("side-by-side"), "cmd"),
            Some("sdiff $LOCAL $REMOTE")
        );
        assert_eq!(config.get_string("difftool", Some("Side-By-Side"), "cmd"), None);
    }

    #[test]
    fn test_section_and_key_names_are_case_insensitive() {
        let config = GitConfig::parse(SAMPLE_CONFIG).unwrap();

        assert_eq!(config.get_string("DIFF", None, "Tool"), Some("vimdiff"));
        assert_eq!(
            config
                .get_bool("DiffTool", Some("side-by-side"), "TRUSTEXITCODE")
                .unwrap(),
            Some(true)
        );
    }

    #[test]
    fn test_git_boolean_literals() {
        let config = GitConfig::parse(
            "[a]\n\tyes = yes\n\ton = on\n\tone = 1\n\tno = no\n\toff = OFF\n\tzero = 0\n\tempty =\n\tbare\n",
        )
        .unwrap();

        for name in ["yes", "on", "one", "bare"] {
            assert_eq!(config.get_bool("a", None, name).unwrap(), Some(true));
        }
        for name in ["no", "off", "zero", "empty"] {
            assert_eq!(config.get_bool("a", None, name).unwrap(), Some(false));
        }
        assert_eq!(config.get_bool("a", None, "missing").unwrap(), None);
    }

    #[test]
    fn test_bad_boolean_value_is_an_error() {
        let config = GitConfig::parse("[a]\n\tkey = maybe\n").unwrap();

        let error = config.get_bool("a", None, "key").unwrap_err();
        assert_eq!(
            error.to_string(),
            "bad boolean config value 'maybe' for 'a.key'"
        );
    }

    #[test]
    fn test_escapes_and_trailing_comments() {
        let config = GitConfig::parse(
            "[filter \"tabs\"]\n\tsmudge = expand \\\"$f\\\" # widen\n\tclean = unexpand ; narrow\n",
        )
        .unwrap();

        assert_eq!(
            config.get_string("filter", Some("tabs"), "smudge"),
            Some(r#"expand "$f""#)
        );
        assert_eq!(config.get_string("filter", Some("tabs"), "clean"), Some("unexpand"));
    }

    #[test]
    fn test_quoted_value_keeps_comment_characters() {
        let config = GitConfig::parse("[a]\n\tkey = \"value # not a comment\"\n").unwrap();

        assert_eq!(config.get_string("a", None, "key"), Some("value # not a comment"));
    }

    #[test]
    fn test_subsections_are_sorted_and_distinct() {
        let config = GitConfig::parse(SAMPLE_CONFIG).unwrap();

        assert_eq!(config.subsections("difftool"), vec!["quiet", "side-by-side"]);
        assert_eq!(config.subsections("merge"), Vec::<&str>::new());
    }

    #[test]
    fn test_malformed_line_is_an_error() {
        assert!(GitConfig::parse("[a]\n\t!!!\n").is_err());
        assert!(GitConfig::parse("key = before-any-section\n").is_err());
    }

    #[test]
    fn test_comment_only_and_empty_lines_are_skipped() {
        let config = GitConfig::parse("# header\n; note\n\n[a]\n\tkey = value\n").unwrap();

        assert_eq!(config.get_string("a", None, "key"), Some("value"));
    }
}
