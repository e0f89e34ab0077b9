use crate::areas::refs::HEAD_REF_NAME;
use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::diff::path_filter::PathFilter;
use crate::artifacts::diff::source::{ChangeScanner, DiffSource};
use crate::artifacts::difftool::TriState;
use crate::artifacts::difftool::catalog::{ToolCatalog, ToolDefinition};
use crate::artifacts::difftool::error::DifftoolError;
use crate::artifacts::difftool::invoker::{InvocationOutcome, ToolInvoker};
use crate::artifacts::difftool::materializer::{FileRole, Materializer};
use crate::artifacts::difftool::prompter::Prompter;
use crate::artifacts::difftool::smudge::WorkingTreeConversion;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;
use std::io::Write;
use std::path::PathBuf;

/// Command-line selections for a difftool run
#[derive(Debug, Default, new)]
pub struct DifftoolOptions {
    pub old_revision: Option<String>,
    pub new_revision: Option<String>,
    pub tool: Option<String>,
    pub cached: bool,
    pub prompt: TriState,
    pub gui: TriState,
    pub trust_exit_code: TriState,
    pub paths: Vec<PathBuf>,
}

impl Repository {
    /// Compare two repository states by launching an external tool once per
    /// changed file
    pub async fn difftool(&mut self, options: &DifftoolOptions) -> anyhow::Result<()> {
        let catalog = ToolCatalog::load(self.config());
        let gui = options.gui.resolve(false);
        let tool = self.select_tool(&catalog, options.tool.as_deref(), gui)?;
        let tool_name = tool.name().to_string();
        let command_line = tool.command_line(gui).to_string();

        let (old_source, new_source) = self.resolve_sources(options)?;
        let filter = PathFilter::from_args(options.paths.clone());
        let changes = ChangeScanner::new(self)
            .scan(&old_source, &new_source, &filter)
            .await?;
        if changes.is_empty() {
            return Ok(());
        }

        let show_prompt = match options.prompt {
            TriState::Unset => self
                .config()
                .get_bool("difftool", None, "prompt")?
                .unwrap_or(true),
            ref prompt => prompt.resolve(true),
        };
        let trust_exit_code = match options.trust_exit_code {
            TriState::Unset => self.configured_trust(&tool_name)?,
            ref trust => trust.resolve(false),
        };

        let conversion = WorkingTreeConversion::load(self.config(), self.workspace().path())?;
        let materializer = Materializer::new(self, &conversion);
        let invoker = ToolInvoker::new(self.path());
        let mut prompter = Prompter::new(std::io::stdin().lock());

        let total = changes.len();
        for (ordinal, (path, change)) in changes.iter().enumerate() {
            if show_prompt {
                let launch = {
                    let mut writer = self.writer();
                    prompter.confirm(&mut **writer, ordinal + 1, total, path, &tool_name)?
                };
                if !launch {
                    return Ok(());
                }
            }

            let local = materializer
                .materialize(FileRole::Local, path, change.old_entry(), &old_source)
                .await?;
            let remote = materializer
                .materialize(FileRole::Remote, path, change.new_entry(), &new_source)
                .await?;
            let merged = materializer.materialize_merged(path);

            let outcome = invoker
                .invoke(
                    &command_line,
                    local.tool_path(),
                    remote.tool_path(),
                    merged.tool_path(),
                    trust_exit_code,
                )
                .await;

            match outcome {
                Ok(outcome) => self.echo_tool_output(&outcome)?,
                Err(err) => {
                    if let Some(DifftoolError::ToolExecution { stdout, .. }) =
                        err.downcast_ref::<DifftoolError>()
                        && !stdout.is_empty()
                    {
                        write!(self.writer(), "{stdout}")?;
                    }

                    return Err(err.context(format!(
                        "external diff died, stopping at {}",
                        path.display()
                    )));
                }
            }
        }

        Ok(())
    }

    fn select_tool<'c>(
        &self,
        catalog: &'c ToolCatalog,
        requested: Option<&str>,
        gui: bool,
    ) -> anyhow::Result<&'c ToolDefinition> {
        if let Some(name) = requested {
            return Self::known_tool(catalog, name);
        }

        if let Some(name) = ToolCatalog::configured_default(self.config(), gui) {
            return Self::known_tool(catalog, &name);
        }

        let candidates = catalog
            .available_predefined()
            .iter()
            .map(|tool| tool.name())
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(
            self.writer(),
            "This message is displayed because 'diff.tool' is not configured."
        )?;
        writeln!(
            self.writer(),
            "See 'viff --tool-help' or 'viff help config' for more details."
        )?;
        writeln!(
            self.writer(),
            "'viff' will now attempt to use one of the following tools:\n{candidates}"
        )?;

        catalog.first_available().ok_or_else(|| {
            anyhow::anyhow!(DifftoolError::Configuration(
                "No known diff tool is available.".to_string()
            ))
        })
    }

    fn known_tool<'c>(catalog: &'c ToolCatalog, name: &str) -> anyhow::Result<&'c ToolDefinition> {
        catalog.lookup(name).ok_or_else(|| {
            anyhow::anyhow!(DifftoolError::Configuration(format!(
                "Unknown diff tool '{name}'"
            )))
        })
    }

    fn configured_trust(&self, tool_name: &str) -> anyhow::Result<bool> {
        if let Some(trust) = self
            .config()
            .get_bool("difftool", Some(tool_name), "trustExitCode")?
        {
            return Ok(trust);
        }

        Ok(self
            .config()
            .get_bool("difftool", None, "trustExitCode")?
            .unwrap_or(false))
    }

    fn resolve_sources(
        &self,
        options: &DifftoolOptions,
    ) -> anyhow::Result<(DiffSource, DiffSource)> {
        if options.cached {
            let old = match &options.old_revision {
                Some(revision) => self.resolve_tree(revision)?,
                None => self.head_tree()?,
            };

            // a second revision has no meaning against the staging area
            return Ok((DiffSource::Tree(old), DiffSource::Index));
        }

        match (&options.old_revision, &options.new_revision) {
            (None, None) => Ok((DiffSource::Index, DiffSource::Workspace)),
            (Some(old), None) => Ok((
                DiffSource::Tree(self.resolve_tree(old)?),
                DiffSource::Workspace,
            )),
            (Some(old), Some(new)) => Ok((
                DiffSource::Tree(self.resolve_tree(old)?),
                DiffSource::Tree(self.resolve_tree(new)?),
            )),
            (None, Some(_)) => unreachable!(),
        }
    }

    fn resolve_tree(&self, revision: &str) -> anyhow::Result<ObjectId> {
        let resolved = Revision::try_parse(revision)
            .and_then(|parsed| parsed.resolve(self))
            .with_context(|| {
                DifftoolError::ReferenceResolution(format!("{revision} is not a tree"))
            })?;

        resolved.ok_or_else(|| {
            anyhow::anyhow!(DifftoolError::ReferenceResolution(format!(
                "{revision} is not a tree"
            )))
        })
    }

    fn head_tree(&self) -> anyhow::Result<ObjectId> {
        self.refs().read_head()?.ok_or_else(|| {
            anyhow::anyhow!(DifftoolError::ReferenceResolution(format!(
                "{HEAD_REF_NAME} is not a tree"
            )))
        })
    }

    fn echo_tool_output(&self, outcome: &InvocationOutcome) -> anyhow::Result<()> {
        if !outcome.stdout.is_empty() {
            write!(self.writer(), "{}", outcome.stdout)?;
        }
        if !outcome.stderr.is_empty() {
            eprint!("{}", outcome.stderr);
        }

        Ok(())
    }
}
