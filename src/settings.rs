//! Settings for the `paramdb` binary: which files to load, how, and where to
//! write the result.
//!
//! Read through `config` from defaults, an optional settings file and
//! `PARAMDB_*` environment variables, in increasing priority.
//!
//! ```toml
//! log_filter = "debug"
//! output = "merged.dat"
//!
//! [[sources]]
//! path = "detector.dat"
//! env_path = "DETECTOR_DIR"
//! prefix = "det"
//! overwrite = "override"
//! ```

use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use config::builder::DefaultState;
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::store::{LoadOptions, Overwrite, Store};

pub const DEFAULT_SETTINGS: &str = "paramdb";
const ENV_PREFIX: &str = "PARAMDB";

#[derive(Debug, Clone, Deserialize)]
pub struct SourceFile {
    pub path: String,
    #[serde(default)]
    pub env_path: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub overwrite: Overwrite,
}

impl SourceFile {
    pub fn options(&self) -> LoadOptions {
        LoadOptions {
            env_path: self.env_path.clone(),
            prefix: self.prefix.clone(),
            overwrite: self.overwrite,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub log_filter: String,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub output_env_path: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceFile>,
}

fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder().set_default("log_filter", "info")?)
}

impl Settings {
    /// Reads the settings file `name` (any extension `config` knows, and
    /// optional), then the environment.
    pub fn load(name: &str) -> Result<Self> {
        let settings = defaults()?
            .add_source(File::with_name(name).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let settings = defaults()?
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Loads every source into `store`, in order. Returns the number of
    /// entries and tables stored.
    pub fn load_sources(&self, store: &mut Store) -> Result<usize> {
        let mut total = 0;
        for source in &self.sources {
            let read = store.read_file(&source.path, &source.options())?;
            debug!(path = %source.path, read, "source loaded");
            total += read;
        }
        Ok(total)
    }
}
