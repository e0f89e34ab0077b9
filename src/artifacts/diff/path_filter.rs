use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Narrows a scan to the paths named on the command line
///
/// A filter path selects itself and everything beneath it. While a tree walk
/// descends, the filter descends with it, so it also remembers the path of
/// the level it currently sits at.
#[derive(Debug, Clone)]
pub struct PathFilter {
    routes: RouteNode,
    root_path: PathBuf,
}

impl PathFilter {
    /// A filter that lets every path through
    pub fn empty() -> Self {
        Self {
            routes: RouteNode {
                selected: true,
                children: BTreeMap::new(),
            },
            root_path: PathBuf::new(),
        }
    }

    pub fn new(paths: Vec<PathBuf>) -> Self {
        let mut routes = RouteNode::default();
        for path in &paths {
            routes.admit(path);
        }

        Self {
            routes,
            root_path: PathBuf::new(),
        }
    }

    /// Build a filter from command-line path arguments, matching everything
    /// when no argument was given
    pub fn from_args(paths: Vec<PathBuf>) -> Self {
        if paths.is_empty() {
            Self::empty()
        } else {
            Self::new(paths)
        }
    }

    /// The path of the tree level this filter has descended to
    pub fn path(&self) -> &Path {
        &self.root_path
    }

    /// Whether a full repository-relative path falls under the filter
    pub fn matches(&self, path: &Path) -> bool {
        let mut node = &self.routes;
        for part in name_parts(path) {
            if node.selected {
                return true;
            }

            match node.children.get(&part) {
                Some(child) => node = child,
                None => return false,
            }
        }

        node.selected
    }

    /// Whether an entry of the current tree level takes part in the scan
    pub fn selects(&self, name: &str) -> bool {
        self.routes.selected || self.routes.children.contains_key(name)
    }

    /// Descend one tree level, narrowing the filter to what lies below `name`
    pub fn into_subpath_filter(self, name: &str) -> Self {
        let routes = if self.routes.selected {
            self.routes
        } else {
            self.routes.children.get(name).cloned().unwrap_or_default()
        };

        Self {
            routes,
            root_path: self.root_path.join(name),
        }
    }
}

fn name_parts(path: &Path) -> impl Iterator<Item = String> + '_ {
    path.components()
        .map(|part| part.as_os_str().to_string_lossy().to_string())
}

/// One level of the selected-path tree; a selected node covers its whole
/// subtree.
#[derive(Debug, Clone, Default)]
struct RouteNode {
    selected: bool,
    children: BTreeMap<String, RouteNode>,
}

impl RouteNode {
    fn admit(&mut self, path: &Path) {
        let mut node = self;
        for part in name_parts(path) {
            node = node.children.entry(part).or_default();
        }
        node.selected = true;
    }
}
