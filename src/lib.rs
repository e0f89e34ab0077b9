//! A standalone `git difftool` engine: finds the files that differ between
//! two repository states and drives an external comparison tool over each
//! changed pair.

pub mod areas;
pub mod artifacts;
pub mod commands;
