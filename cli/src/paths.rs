//! Directory layout of mimesis applications.
//!
//! ```text
//! ~/.mimesis/<app>/
//!   config.yaml
//!   data/images.redb     saved images
//!   data/store.json      client-side store snapshot
//!   downloads/
//! ```

use std::io;
use std::path::{Path, PathBuf};

/// Base directory name under the home directory.
pub const DEFAULT_BASE_DIR: &str = ".mimesis";

/// Configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Image database filename inside the data directory.
pub const DATABASE_FILE: &str = "images.redb";

/// Store snapshot filename inside the data directory.
pub const STORE_FILE: &str = "store.json";

/// Paths of one application.
#[derive(Debug, Clone)]
pub struct Paths {
    pub app_name: String,
    pub home_dir: PathBuf,
}

impl Paths {
    pub fn new(app_name: impl Into<String>) -> io::Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "could not find home directory")
        })?;
        Ok(Self::with_home(app_name, home_dir))
    }

    /// Paths rooted at an explicit home directory.
    pub fn with_home(app_name: impl Into<String>, home_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_name: app_name.into(),
            home_dir: home_dir.into(),
        }
    }

    /// `~/.mimesis`
    pub fn base_dir(&self) -> PathBuf {
        self.home_dir.join(DEFAULT_BASE_DIR)
    }

    /// `~/.mimesis/<app>`
    pub fn app_dir(&self) -> PathBuf {
        self.base_dir().join(&self.app_name)
    }

    pub fn config_file(&self) -> PathBuf {
        self.app_dir().join(DEFAULT_CONFIG_FILE)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.app_dir().join("data")
    }

    pub fn database_file(&self) -> PathBuf {
        self.data_dir().join(DATABASE_FILE)
    }

    pub fn store_file(&self) -> PathBuf {
        self.data_dir().join(STORE_FILE)
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.app_dir().join("downloads")
    }

    pub fn ensure_data_dir(&self) -> io::Result<()> {
        std::fs::create_dir_all(self.data_dir())
    }

    /// Expands a leading `~/` to the home directory.
    pub fn expand(&self, path: &str) -> PathBuf {
        match path.strip_prefix("~/") {
            Some(rest) => self.home_dir.join(rest),
            None if path == "~" => self.home_dir.clone(),
            None => Path::new(path).to_path_buf(),
        }
    }
}
