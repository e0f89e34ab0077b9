use crate::areas::config::GitConfig;
use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use std::cell::{RefCell, RefMut};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handle on one existing repository, tying its areas together
pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: Arc<Mutex<Index>>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
    config: GitConfig,
}

impl Repository {
    pub fn new(path: &str, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let work_dir = Path::new(path).canonicalize()?;
        let git_dir = work_dir.join(".git");
        anyhow::ensure!(
            git_dir.is_dir(),
            "not a git repository: {}",
            work_dir.display()
        );

        Ok(Repository {
            writer: RefCell::new(writer),
            index: Arc::new(Mutex::new(Index::new(
                git_dir.join("index").into_boxed_path(),
            ))),
            database: Database::new(git_dir.join("objects").into_boxed_path()),
            workspace: Workspace::new(work_dir.clone().into_boxed_path()),
            config: GitConfig::load(&git_dir)?,
            refs: Refs::new(git_dir.into_boxed_path()),
            path: work_dir.into_boxed_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub(crate) fn index(&self) -> Arc<Mutex<Index>> {
        self.index.clone()
    }

    pub(crate) fn database(&self) -> &Database {
        &self.database
    }

    pub(crate) fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub(crate) fn refs(&self) -> &Refs {
        &self.refs
    }

    pub(crate) fn config(&self) -> &GitConfig {
        &self.config
    }
}
