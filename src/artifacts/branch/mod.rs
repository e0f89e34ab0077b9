pub mod branch_name;
pub mod revision;
