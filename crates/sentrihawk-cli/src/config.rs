//! Layered configuration: built-in defaults, then an optional TOML file, then
//! `SENTRIHAWK_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use sentrihawk_core::{
  lifecycle::DenyList,
  session::{Role, Session},
};
use serde::Deserialize;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "sentrihawk.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// SQLite database file. A leading `~/` is expanded.
  pub store_path: PathBuf,
  pub role:       Role,
  /// Required for tenant dashboards and tenant-issued ghost passes.
  #[serde(default)]
  pub tenant_id:  Option<String>,
  /// Overrides the built-in deny list when set.
  #[serde(default)]
  pub deny_terms: Option<Vec<String>>,
}

impl AppConfig {
  pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
    let file = match path {
      Some(p) => config::File::from(p).required(true),
      None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let settings = config::Config::builder()
      .set_default("store_path", "sentrihawk.db")?
      .set_default("role", "guard")?
      .add_source(file)
      .add_source(
        config::Environment::with_prefix("SENTRIHAWK")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("deny_terms"),
      )
      .build()
      .context("failed to read configuration")?;

    settings
      .try_deserialize()
      .context("failed to deserialise AppConfig")
  }

  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }

  pub fn deny_list(&self) -> DenyList {
    match &self.deny_terms {
      Some(terms) => DenyList::new(terms),
      None => DenyList::default(),
    }
  }

  /// The session this invocation acts under. An explicit tenant on the
  /// command line wins over the configured one.
  pub fn session(&self, tenant_override: Option<&str>) -> Session {
    Session {
      role:      self.role,
      tenant_id: tenant_override
        .map(str::to_owned)
        .or_else(|| self.tenant_id.clone()),
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
