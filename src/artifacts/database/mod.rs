//! Links between stored objects
//!
//! A tree addresses each child by object id plus mode. Diff planning
//! passes that pair around, so it gets its own type here.

pub mod database_entry;
