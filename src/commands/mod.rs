//! Difftool command implementations
//!
//! Each command is an `impl Repository` block so it can reach every
//! repository area through one receiver and report through the repository
//! writer:
//!
//! - `difftool`: Compare two repository states file by file with an external tool
//! - `tool_help`: List the known tools and whether they can run here

pub mod difftool;
pub mod tool_help;
