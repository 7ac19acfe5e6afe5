//! CLI utilities for mimesis.
//!
//! Context configuration, application paths and output formatting shared by
//! the command line tools.

pub mod config;
pub mod output;
pub mod paths;

pub use config::{Config, Context, load_config};
pub use output::{Output, OutputFormat, write_binary};
pub use paths::Paths;
