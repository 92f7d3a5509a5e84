//! # kvgraph
//!
//! Library half of the `kvgraph` binary: argument parsing, configuration and
//! command implementations, exposed so they can be tested without a process.

pub mod cli;
pub mod config;
