use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use viff::areas::repository::Repository;
use viff::artifacts::difftool::TriState;
use viff::commands::difftool::DifftoolOptions;

#[derive(Parser)]
#[command(
    name = "viff",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "Drive an external diff tool over changed files",
    long_about = "This is a standalone implementation of git difftool, written in Rust. \
    It compares two repository states and launches an external comparison tool \
    for every file that differs between them.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(
        short = 't',
        long,
        value_name = "tool",
        help = "Use the diff tool specified by <tool>"
    )]
    tool: Option<String>,

    #[arg(long, help = "Print a list of diff tools that may be used with '--tool'")]
    tool_help: bool,

    #[arg(
        long,
        alias = "staged",
        help = "Compare a committed tree against the staging area"
    )]
    cached: bool,

    #[arg(
        short = 'g',
        long,
        conflicts_with = "no_gui",
        help = "Prefer the gui variant of the configured tool"
    )]
    gui: bool,
    #[arg(long, help = "Ignore the gui variant of the configured tool")]
    no_gui: bool,

    #[arg(
        long,
        conflicts_with = "no_prompt",
        help = "Ask before each invocation of the diff tool"
    )]
    prompt: bool,
    #[arg(short = 'y', long, help = "Launch the diff tool without asking")]
    no_prompt: bool,

    #[arg(
        long,
        conflicts_with = "no_trust_exit_code",
        help = "Abort when the invoked diff tool exits with a non-zero code"
    )]
    trust_exit_code: bool,
    #[arg(long, help = "Ignore the exit code of the invoked diff tool")]
    no_trust_exit_code: bool,

    #[arg(index = 1, value_name = "old", help = "The tree to take the old side from")]
    old_revision: Option<String>,
    #[arg(index = 2, value_name = "new", help = "The tree to take the new side from")]
    new_revision: Option<String>,

    #[arg(
        index = 3,
        last = true,
        value_name = "path",
        help = "Limit the comparison to the given paths"
    )]
    paths: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let pwd = std::env::current_dir()?;
    let mut repository = Repository::new(&pwd.to_string_lossy(), Box::new(std::io::stdout()))?;

    if cli.tool_help {
        return repository.tool_help();
    }

    let options = DifftoolOptions::new(
        cli.old_revision,
        cli.new_revision,
        cli.tool,
        cli.cached,
        TriState::from_flags(cli.prompt, cli.no_prompt),
        TriState::from_flags(cli.gui, cli.no_gui),
        TriState::from_flags(cli.trust_exit_code, cli.no_trust_exit_code),
        cli.paths,
    );

    repository.difftool(&options).await
}
