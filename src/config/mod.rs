//! Command-line configuration
//!
//! The averaging run is configured entirely from the command line; see
//! [`Cli`] for the accepted flags.

mod cli;

pub use cli::{parse_args, Cli};
