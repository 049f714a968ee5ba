//! Library side of the `forseti` command line tool.

pub mod cli;
pub mod error;
pub mod labels;
