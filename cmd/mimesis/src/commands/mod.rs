//! CLI commands module.

mod config;
mod download;
mod enhance;
mod gallery;
mod generate;
mod history;
mod util;

pub use config::ConfigCommand;
pub use download::DownloadCommand;
pub use enhance::EnhanceCommand;
pub use gallery::GalleryCommand;
pub use generate::GenerateCommand;
pub use history::HistoryCommand;

pub(crate) use util::*;
