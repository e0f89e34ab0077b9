//! Git data structures and algorithms
//!
//! This module contains the core Git types and algorithms:
//!
//! - `branch`: Branch names and revision parsing
//! - `database`: Database entry types
//! - `diff`: Tree and flat-source change detection
//! - `difftool`: External diff tool selection and invocation
//! - `index`: Index/staging area data structures
//! - `objects`: Git object types (blob, tree, commit)

pub mod branch;
pub mod database;
pub mod diff;
pub mod difftool;
pub mod index;
pub mod objects;
