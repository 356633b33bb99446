//! Workflows of the command line client.

pub mod operations;
