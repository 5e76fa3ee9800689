//! prmerge - merge pipeline pull requests once they are ready
//!
//! One invocation takes a single open pull request through a fixed sequence
//! of readiness checks and, if they all pass, merges it and deletes its head
//! branch. Calls to the hosting API and merge submissions are throttled by
//! two caller-owned rate limiters shared across concurrent invocations.

pub mod auth;
pub mod config;
pub mod error;
pub mod merge;
pub mod platform;
pub mod throttle;
pub mod types;
