//! Diff tool catalog
//!
//! Knows every tool the command can drive: a built-in set of well-known
//! viewers plus any tool configured under `difftool.<name>.cmd`. A
//! user-defined tool with the name of a built-in one replaces it.
//!
//! Built-in tools are probed for availability by resolving the first word
//! of their command line against `PATH`; user-defined command lines are
//! taken on faith.

use crate::areas::config::GitConfig;
use is_executable::IsExecutable;
use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Built-in tools: name to command line, with an optional windowed variant
pub const PREDEFINED_TOOLS: phf::Map<&'static str, (&'static str, Option<&'static str>)> = phf::phf_map! {
    "araxis" => (r#"compare -wait -2 "$LOCAL" "$REMOTE""#, None),
    "bc" => (r#"bcomp "$LOCAL" "$REMOTE""#, None),
    "codecompare" => (r#"CodeCompare "$LOCAL" "$REMOTE""#, None),
    "deltawalker" => (r#"DeltaWalker "$LOCAL" "$REMOTE""#, None),
    "diffmerge" => (r#"diffmerge --nosplash "$LOCAL" "$REMOTE""#, None),
    "diffuse" => (r#"diffuse "$LOCAL" "$REMOTE""#, None),
    "ecmerge" => (r#"ecmerge --default --mode=diff2 "$LOCAL" "$REMOTE""#, None),
    "emerge" => (r#"emacs -f emerge-files-command "$LOCAL" "$REMOTE""#, None),
    "examdiff" => (r#"ExamDiff "$LOCAL" "$REMOTE" -nh"#, None),
    "guiffy" => (r#"guiffy "$LOCAL" "$REMOTE""#, None),
    "gvimdiff" => (r#"gvim -f -d "$LOCAL" "$REMOTE""#, None),
    "kdiff3" => (r#"kdiff3 "$LOCAL" "$REMOTE""#, None),
    "kompare" => (r#"kompare "$LOCAL" "$REMOTE""#, None),
    "meld" => (r#"meld "$LOCAL" "$REMOTE""#, None),
    "opendiff" => (r#"opendiff "$LOCAL" "$REMOTE""#, None),
    "p4merge" => (r#"p4merge "$LOCAL" "$REMOTE""#, None),
    "tkdiff" => (r#"tkdiff "$LOCAL" "$REMOTE""#, None),
    "vimdiff" => (
        r#"vim -f -d "$LOCAL" "$REMOTE""#,
        Some(r#"gvim -f -d "$LOCAL" "$REMOTE""#),
    ),
    "winmerge" => (r#"WinMergeU -u -e "$LOCAL" "$REMOTE""#, None),
    "xxdiff" => (r#"xxdiff "$LOCAL" "$REMOTE""#, None),
};

/// A single runnable diff tool
#[derive(Debug)]
pub struct ToolDefinition {
    name: String,
    command: String,
    gui_command: Option<String>,
    is_predefined: bool,
    available: OnceCell<bool>,
}

impl ToolDefinition {
    fn predefined(name: &str, command: &str, gui_command: Option<&str>) -> Self {
        ToolDefinition {
            name: name.to_string(),
            command: command.to_string(),
            gui_command: gui_command.map(str::to_string),
            is_predefined: true,
            available: OnceCell::new(),
        }
    }

    pub fn user_defined(name: &str, command: &str) -> Self {
        ToolDefinition {
            name: name.to_string(),
            command: command.to_string(),
            gui_command: None,
            is_predefined: false,
            available: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The command line to run, preferring the windowed variant when asked
    pub fn command_line(&self, gui: bool) -> &str {
        if gui && let Some(gui_command) = &self.gui_command {
            gui_command
        } else {
            &self.command
        }
    }

    pub fn is_predefined(&self) -> bool {
        self.is_predefined
    }

    /// Whether the tool's program can be found, probed once per definition
    pub fn is_available(&self) -> bool {
        *self.available.get_or_init(|| {
            if !self.is_predefined {
                return true;
            }

            self.command
                .split_whitespace()
                .next()
                .and_then(|token| resolve_program(token, std::env::var_os("PATH").as_deref()))
                .is_some()
        })
    }
}

/// Locate a program the way a shell would
///
/// A token containing a path separator is checked as given; a bare name is
/// searched through the entries of the given `PATH` value.
pub fn resolve_program(token: &str, path_var: Option<&OsStr>) -> Option<PathBuf> {
    if token.contains('/') {
        let candidate = Path::new(token);
        return candidate.is_executable().then(|| candidate.to_path_buf());
    }

    std::env::split_paths(path_var?)
        .map(|dir| dir.join(token))
        .find(|candidate| candidate.is_executable())
}

/// Every tool known to the command, keyed by name
#[derive(Debug)]
pub struct ToolCatalog {
    tools: BTreeMap<String, ToolDefinition>,
}

impl ToolCatalog {
    pub(crate) fn load(config: &GitConfig) -> Self {
        let mut tools = BTreeMap::new();

        for (name, (command, gui_command)) in PREDEFINED_TOOLS.entries() {
            tools.insert(
                name.to_string(),
                ToolDefinition::predefined(name, command, *gui_command),
            );
        }

        for name in config.subsections("difftool") {
            if let Some(command) = config.get_string("difftool", Some(name), "cmd")
                && !command.is_empty()
            {
                tools.insert(name.to_string(), ToolDefinition::user_defined(name, command));
            }
        }

        ToolCatalog { tools }
    }

    /// The tool name configuration asks for, honoring the windowed override
    pub(crate) fn configured_default(config: &GitConfig, gui: bool) -> Option<String> {
        let gui_tool = if gui {
            config.get_string("diff", None, "guitool")
        } else {
            None
        };

        gui_tool
            .or_else(|| config.get_string("diff", None, "tool"))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }

    pub fn lookup(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// The first built-in tool that is actually installed, in name order
    pub fn first_available(&self) -> Option<&ToolDefinition> {
        self.tools
            .values()
            .find(|tool| tool.is_predefined() && tool.is_available())
    }

    pub fn available_predefined(&self) -> Vec<&ToolDefinition> {
        self.tools
            .values()
            .filter(|tool| tool.is_predefined() && tool.is_available())
            .collect()
    }

    pub fn unavailable_predefined(&self) -> Vec<&ToolDefinition> {
        self.tools
            .values()
            .filter(|tool| tool.is_predefined() && !tool.is_available())
            .collect()
    }

    pub fn user_defined(&self) -> Vec<&ToolDefinition> {
        self.tools
            .values()
            .filter(|tool| !tool.is_predefined())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::os::unix::fs::PermissionsExt;

    fn executable_in(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_resolve_program_searches_path_entries() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let expected = executable_in(second.path(), "fakediff");

        let path_var = std::env::join_paths([first.path(), second.path()]).unwrap();
        let resolved = resolve_program("fakediff", Some(path_var.as_os_str()));

        assert_eq!(resolved, Some(expected));
    }

    #[test]
    fn test_resolve_program_skips_non_executable_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("plainfile"), "data").unwrap();

        let path_var = std::env::join_paths([dir.path()]).unwrap();

        assert_eq!(resolve_program("plainfile", Some(path_var.as_os_str())), None);
        assert_eq!(resolve_program("missing", Some(path_var.as_os_str())), None);
        assert_eq!(resolve_program("missing", None), None);
    }

    #[test]
    fn test_resolve_program_with_separator_ignores_path() {
        let dir = tempfile::tempdir().unwrap();
        let tool = executable_in(dir.path(), "mytool");

        let resolved = resolve_program(tool.to_str().unwrap(), None);

        assert_eq!(resolved, Some(tool));
    }

    #[test]
    fn test_catalog_contains_predefined_tools_in_name_order() {
        let config = GitConfig::parse("").unwrap();
        let catalog = ToolCatalog::load(&config);

        let names: Vec<_> = catalog
            .tools
            .values()
            .filter(|tool| tool.is_predefined())
            .map(|tool| tool.name().to_string())
            .collect();

        assert_eq!(names.len(), PREDEFINED_TOOLS.len());
        assert_eq!(names.first().map(String::as_str), Some("araxis"));
        assert_eq!(names.last().map(String::as_str), Some("xxdiff"));
        assert!(names.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_user_defined_tool_joins_and_overrides_catalog() {
        let config = GitConfig::parse(
            "[difftool \"mine\"]\n\tcmd = mine \\\"$LOCAL\\\" \\\"$REMOTE\\\"\n[difftool \"meld\"]\n\tcmd = custom-meld\n",
        )
        .unwrap();
        let catalog = ToolCatalog::load(&config);

        let mine = catalog.lookup("mine").unwrap();
        assert!(!mine.is_predefined());
        assert!(mine.is_available());
        assert_eq!(mine.command_line(false), r#"mine "$LOCAL" "$REMOTE""#);

        let meld = catalog.lookup("meld").unwrap();
        assert!(!meld.is_predefined());
        assert_eq!(meld.command_line(false), "custom-meld");

        assert_eq!(catalog.user_defined().len(), 2);
    }

    #[test]
    fn test_configured_default_prefers_guitool_in_gui_mode() {
        let config =
            GitConfig::parse("[diff]\n\ttool = vimdiff\n\tguitool = meld\n").unwrap();

        assert_eq!(
            ToolCatalog::configured_default(&config, false),
            Some("vimdiff".to_string())
        );
        assert_eq!(
            ToolCatalog::configured_default(&config, true),
            Some("meld".to_string())
        );
    }

    #[test]
    fn test_configured_default_falls_back_to_tool_without_guitool() {
        let config = GitConfig::parse("[diff]\n\ttool = vimdiff\n").unwrap();

        assert_eq!(
            ToolCatalog::configured_default(&config, true),
            Some("vimdiff".to_string())
        );
        assert_eq!(
            ToolCatalog::configured_default(&GitConfig::parse("").unwrap(), false),
            None
        );
    }

    #[test]
    fn test_windowed_variant_only_used_when_present() {
        let config = GitConfig::parse("").unwrap();
        let catalog = ToolCatalog::load(&config);

        let vimdiff = catalog.lookup("vimdiff").unwrap();
        assert_eq!(vimdiff.command_line(false), r#"vim -f -d "$LOCAL" "$REMOTE""#);
        assert_eq!(vimdiff.command_line(true), r#"gvim -f -d "$LOCAL" "$REMOTE""#);

        let meld = catalog.lookup("meld").unwrap();
        assert_eq!(meld.command_line(true), meld.command_line(false));
    }
}
