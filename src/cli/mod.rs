//! CLI commands
//!
//! Command implementation for the `prmerge` binary.

mod merge;
mod style;

pub use merge::{MergeArgs, run_merge};
