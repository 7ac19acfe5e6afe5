//! Context configuration for CLI tools.
//!
//! Configuration lives in `~/.mimesis/<app>/config.yaml` and holds named
//! contexts, one of which is current. A context selects the image and text
//! hosts, the image database and request tuning.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::paths::Paths;

/// Overrides the image host of the resolved context.
pub const ENV_IMAGE_HOST: &str = "MIMESIS_IMAGE_HOST";
/// Overrides the text host of the resolved context.
pub const ENV_TEXT_HOST: &str = "MIMESIS_TEXT_HOST";
/// Overrides the database path of the resolved context.
pub const ENV_DATABASE: &str = "MIMESIS_DATABASE";

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Application name (not serialized).
    #[serde(skip)]
    pub app_name: String,

    /// Name of the currently active context.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub current_context: String,

    /// Contexts by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub contexts: BTreeMap<String, Context>,

    /// Path to the config file (not serialized).
    #[serde(skip)]
    config_path: PathBuf,
}

/// One named set of connection settings.
///
/// Empty or zero fields mean "use the default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Base URL of the image host.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image_host: String,

    /// Base URL of the text host used for prompt enhancement.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text_host: String,

    /// Path of the image database.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub database: String,

    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub timeout: u64,

    /// Maximum existence-check retries per image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    /// Application-specific settings.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

impl Config {
    /// Config file path of `app_name` under the home directory.
    pub fn default_config_path(app_name: &str) -> Option<PathBuf> {
        Paths::new(app_name).ok().map(|paths| paths.config_file())
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Writes the configuration back to its file.
    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.config_path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// Adds or replaces a context. The first context added becomes current.
    pub fn add_context(&mut self, name: &str, mut ctx: Context) -> anyhow::Result<()> {
        if name.is_empty() {
            anyhow::bail!("context name is required");
        }
        ctx.name = name.to_string();
        self.contexts.insert(name.to_string(), ctx);
        if self.current_context.is_empty() {
            self.current_context = name.to_string();
        }
        self.save()
    }

    pub fn delete_context(&mut self, name: &str) -> anyhow::Result<()> {
        if self.contexts.remove(name).is_none() {
            anyhow::bail!("context '{}' not found", name);
        }
        if self.current_context == name {
            self.current_context.clear();
        }
        self.save()
    }

    pub fn use_context(&mut self, name: &str) -> anyhow::Result<()> {
        if !self.contexts.contains_key(name) {
            anyhow::bail!("context '{}' not found", name);
        }
        self.current_context = name.to_string();
        self.save()
    }

    pub fn get_context(&self, name: &str) -> Option<&Context> {
        self.contexts.get(name)
    }

    pub fn get_current_context(&self) -> Option<&Context> {
        if self.current_context.is_empty() {
            return None;
        }
        self.contexts.get(&self.current_context)
    }

    /// Resolves the named context, or the current one when `name` is empty.
    ///
    /// An explicitly named context must exist. Without a name and without a
    /// current context the defaults are used. Environment overrides are
    /// applied last.
    pub fn resolve_context(&self, name: Option<&str>) -> anyhow::Result<Context> {
        let mut ctx = match name {
            Some(n) if !n.is_empty() => self
                .get_context(n)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("context '{}' not found", n))?,
            _ => self.get_current_context().cloned().unwrap_or_default(),
        };
        ctx.apply_env();
        Ok(ctx)
    }

    /// Context names in sorted order.
    pub fn list_contexts(&self) -> Vec<&str> {
        self.contexts.keys().map(String::as_str).collect()
    }
}

impl Context {
    pub fn get_extra(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extra.insert(key.into(), value.into());
    }

    /// Applies the `MIMESIS_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides looked up by environment variable name. Empty values
    /// are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let fields = [
            (ENV_IMAGE_HOST, &mut self.image_host),
            (ENV_TEXT_HOST, &mut self.text_host),
            (ENV_DATABASE, &mut self.database),
        ];
        for (key, field) in fields {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *field = value.trim().to_string();
            }
        }
    }

    /// Database path, falling back to the app's data directory.
    pub fn database_path(&self, paths: &Paths) -> PathBuf {
        if self.database.is_empty() {
            paths.database_file()
        } else {
            paths.expand(&self.database)
        }
    }
}

/// Loads the configuration of `app_name`, creating an empty file on first
/// use. `custom_path` replaces the default location.
pub fn load_config(app_name: &str, custom_path: Option<&str>) -> anyhow::Result<Config> {
    let config_path = match custom_path {
        Some(p) => PathBuf::from(p),
        None => Config::default_config_path(app_name)
            .ok_or_else(|| anyhow::anyhow!("cannot determine config path"))?,
    };

    let mut cfg: Config = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&content)?
        }
    } else {
        Config::default()
    };
    cfg.app_name = app_name.to_string();
    cfg.config_path = config_path;

    if !cfg.config_path.exists() {
        cfg.save()?;
    }
    Ok(cfg)
}
