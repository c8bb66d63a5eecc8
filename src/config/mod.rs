// Adding the context method to errors:
use color_eyre::Result;
use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::convert::From;

#[derive(Debug, Deserialize)]
pub struct Config {
  pub db_path: String,
  pub bind_address: String,
  pub template_dir: String,
  // Signing key for the session cookie, 32 bytes minimum.
  pub session_key: String,
  pub site_title: String,
  pub site_description: String
}

// The subset of the config that's safe to keep around in the
// app state and hand to templates.
#[derive(Clone, Serialize)]
pub struct SiteInfo {
  pub title: String,
  pub description: String
}

impl From<Config> for SiteInfo {
  fn from(config: Config) -> Self {
    Self {
      title: config.site_title,
      description: config.site_description
    }
  }
}

impl Config {

  pub fn from_env() -> Result<Config> {
    let mut c = config::Config::new();
    // Defaults are fine for local development, production
    // overrides everything through the environment or .env.
    // Keys have to be lowercase here compared to the env vars.
    c.set_default("db_path", "./tkblog.db")?;
    c.set_default("bind_address", "127.0.0.1:8080")?;
    c.set_default("template_dir", "./templates")?;
    c.set_default("session_key", "tkblog-dev-session-key-0123456789abcdef")?;
    c.set_default("site_title", "tkblog")?;
    c.set_default("site_description", "A simple blog about anything and everything.")?;

    c.merge(config::Environment::default())?;
    c.try_into()
      .context("Loading configuration from env")
  }

}
