use crate::areas::repository::Repository;
use crate::artifacts::difftool::catalog::ToolCatalog;
use std::io::Write;

impl Repository {
    /// List the known diff tools, partitioned by whether they can run here
    pub fn tool_help(&mut self) -> anyhow::Result<()> {
        let catalog = ToolCatalog::load(self.config());

        writeln!(
            self.writer(),
            "'viff --tool=<tool>' may be set to one of the following:"
        )?;
        for tool in catalog.available_predefined() {
            writeln!(self.writer(), "\t\t{}", tool.name())?;
        }

        let user_defined = catalog.user_defined();
        if !user_defined.is_empty() {
            writeln!(self.writer(), "\tuser-defined:")?;
            for tool in user_defined {
                writeln!(
                    self.writer(),
                    "\t\t{}.cmd {}",
                    tool.name(),
                    tool.command_line(false)
                )?;
            }
        }

        let unavailable = catalog.unavailable_predefined();
        if !unavailable.is_empty() {
            writeln!(
                self.writer(),
                "The following tools are valid, but not currently available:"
            )?;
            for tool in unavailable {
                writeln!(self.writer(), "\t\t{}", tool.name())?;
            }
        }

        writeln!(
            self.writer(),
            "Some of the tools listed above only work in a windowed"
        )?;
        writeln!(
            self.writer(),
            "environment. If run in a terminal-only session, they will fail."
        )?;

        Ok(())
    }
}
