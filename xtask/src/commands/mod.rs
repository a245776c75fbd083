//! Top-level xtask command families.

pub mod samples;
