//! Change detection between repository states
//!
//! This module answers "which files differ" between any two comparison
//! sources:
//!
//! - `path_filter`: Narrowing to the paths named on the command line
//! - `source`: Abstraction over diff endpoints (tree, index, workspace)
//! - `tree_diff`: Tree-level diffing for detecting file changes
//!
//! Content-level comparison is left to the external tool being driven.

pub mod path_filter;
pub mod source;
pub mod tree_diff;
