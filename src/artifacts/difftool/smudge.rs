//! Checkout-direction content conversion
//!
//! Content fed to a diff tool from the object database must look the way a
//! checkout would make it look: the path's smudge filter runs first, then
//! line endings are rewritten. Rules come from the root `.gitattributes`
//! file plus `core.autocrlf` and `core.eol`; filter commands come from
//! `filter.<name>.smudge`.
//!
//! Working-tree files are never converted, they already have their checkout
//! form.

use crate::areas::config::GitConfig;
use crate::artifacts::difftool::error::DifftoolError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const ATTRIBUTES_FILE: &str = ".gitattributes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextAttr {
    Set,
    Unset,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineEnding {
    Lf,
    Crlf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AutoCrlf {
    True,
    Input,
    False,
}

/// Line-ending rewrite applied when content leaves the object database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    None,
    ToLf,
    ToCrlf,
}

impl Conversion {
    pub fn apply(&self, content: &str) -> String {
        match self {
            Conversion::None => content.to_string(),
            Conversion::ToLf => content.replace("\r\n", "\n"),
            Conversion::ToCrlf => content.replace("\r\n", "\n").replace('\n', "\r\n"),
        }
    }
}

/// One parsed `.gitattributes` line
#[derive(Debug)]
struct AttributeRule {
    regex: regex::Regex,
    is_basename: bool,
    text: Option<TextAttr>,
    eol: Option<LineEnding>,
    filter: Option<String>,
}

impl AttributeRule {
    fn matches(&self, path: &Path) -> bool {
        let subject = if self.is_basename {
            path.file_name().map(|name| name.to_string_lossy().to_string())
        } else {
            Some(path.to_string_lossy().to_string())
        };

        subject.is_some_and(|subject| self.regex.is_match(&subject))
    }
}

/// Per-repository conversion rules for content leaving the database
#[derive(Debug)]
pub struct WorkingTreeConversion {
    rules: Vec<AttributeRule>,
    autocrlf: AutoCrlf,
    default_eol: Option<LineEnding>,
    smudge_commands: BTreeMap<String, String>,
    workspace_root: PathBuf,
}

impl WorkingTreeConversion {
    pub(crate) fn load(config: &GitConfig, workspace_root: &Path) -> anyhow::Result<Self> {
        let attributes_path = workspace_root.join(ATTRIBUTES_FILE);
        let rules = if attributes_path.exists() {
            Self::parse_rules(&std::fs::read_to_string(attributes_path)?)?
        } else {
            Vec::new()
        };

        let autocrlf = match config.get_string("core", None, "autocrlf") {
            None => AutoCrlf::False,
            Some(value) if value.eq_ignore_ascii_case("input") => AutoCrlf::Input,
            _ => match config.get_bool("core", None, "autocrlf")? {
                Some(true) => AutoCrlf::True,
                _ => AutoCrlf::False,
            },
        };

        let default_eol = match config.get_string("core", None, "eol") {
            None => None,
            Some(value) => match value.to_lowercase().as_str() {
                "lf" | "native" => Some(LineEnding::Lf),
                "crlf" => Some(LineEnding::Crlf),
                _ => {
                    anyhow::bail!(DifftoolError::Configuration(format!(
                        "bad config value '{value}' for 'core.eol'"
                    )))
                }
            },
        };

        let mut smudge_commands = BTreeMap::new();
        for name in config.subsections("filter") {
            if let Some(command) = config.get_string("filter", Some(name), "smudge")
                && !command.is_empty()
            {
                smudge_commands.insert(name.to_string(), command.to_string());
            }
        }

        Ok(WorkingTreeConversion {
            rules,
            autocrlf,
            default_eol,
            smudge_commands,
            workspace_root: workspace_root.to_path_buf(),
        })
    }

    fn parse_rules(content: &str) -> anyhow::Result<Vec<AttributeRule>> {
        let mut rules = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let Some(pattern) = tokens.next() else {
                continue;
            };

            let (regex, is_basename) = Self::pattern_to_regex(pattern)?;
            let mut rule = AttributeRule {
                regex,
                is_basename,
                text: None,
                eol: None,
                filter: None,
            };

            for token in tokens {
                match token {
                    "text" => rule.text = Some(TextAttr::Set),
                    "-text" => rule.text = Some(TextAttr::Unset),
                    "text=auto" => rule.text = Some(TextAttr::Auto),
                    "eol=lf" => rule.eol = Some(LineEnding::Lf),
                    "eol=crlf" => rule.eol = Some(LineEnding::Crlf),
                    token => {
                        if let Some(name) = token.strip_prefix("filter=") {
                            rule.filter = Some(name.to_string());
                        }
                        // other attributes have no effect on tool input
                    }
                }
            }

            rules.push(rule);
        }

        Ok(rules)
    }

    /// Translate a `.gitattributes` pattern into a regex
    ///
    /// A pattern without a slash matches file names anywhere in the tree;
    /// one with a slash matches the full path from the repository root.
    fn pattern_to_regex(pattern: &str) -> anyhow::Result<(regex::Regex, bool)> {
        let is_basename = !pattern.contains('/');
        let pattern = pattern.trim_start_matches('/');

        let mut expression = String::from("^");
        for character in pattern.chars() {
            match character {
                '*' => expression.push_str("[^/]*"),
                '?' => expression.push_str("[^/]"),
                character => expression.push_str(&regex::escape(&character.to_string())),
            }
        }
        expression.push('$');

        Ok((regex::Regex::new(&expression)?, is_basename))
    }

    /// Run the path's content through its smudge filter and line-ending
    /// rewrite, in that order
    pub async fn apply(&self, path: &Path, content: String) -> anyhow::Result<String> {
        let content = match self.smudge_command_for(path) {
            Some(command) => self.run_smudge(command, path, content).await?,
            None => content,
        };

        Ok(self.conversion_for(path).apply(&content))
    }

    fn conversion_for(&self, path: &Path) -> Conversion {
        let mut text: Option<TextAttr> = None;
        let mut eol: Option<LineEnding> = None;

        for rule in &self.rules {
            if rule.matches(path) {
                if let Some(rule_text) = rule.text {
                    text = Some(rule_text);
                }
                if let Some(rule_eol) = rule.eol {
                    eol = Some(rule_eol);
                }
            }
        }

        // -text turns every rewrite off, whatever else is configured
        if text == Some(TextAttr::Unset) {
            return Conversion::None;
        }

        match eol {
            Some(LineEnding::Crlf) => Conversion::ToCrlf,
            Some(LineEnding::Lf) => Conversion::ToLf,
            None => match self.autocrlf {
                AutoCrlf::True => Conversion::ToCrlf,
                AutoCrlf::Input => Conversion::None,
                AutoCrlf::False => match (text, self.default_eol) {
                    (Some(_), Some(LineEnding::Crlf)) => Conversion::ToCrlf,
                    (Some(_), Some(LineEnding::Lf)) => Conversion::ToLf,
                    _ => Conversion::None,
                },
            },
        }
    }

    fn smudge_command_for(&self, path: &Path) -> Option<&str> {
        let mut filter_name: Option<&str> = None;
        for rule in &self.rules {
            if rule.matches(path)
                && let Some(name) = &rule.filter
            {
                filter_name = Some(name);
            }
        }

        self.smudge_commands
            .get(filter_name?)
            .map(String::as_str)
    }

    async fn run_smudge(
        &self,
        command: &str,
        path: &Path,
        content: String,
    ) -> anyhow::Result<String> {
        let command = command.replace("%f", &path.to_string_lossy());

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .current_dir(&self.workspace_root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow::anyhow!("failed to open stdin of filter '{command}'"))?;
        stdin.write_all(content.as_bytes()).await?;
        drop(stdin);

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            anyhow::bail!("external filter '{command}' failed");
        }

        Ok(String::from_utf8(output.stdout)?)
    }
}
