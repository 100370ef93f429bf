use std::{fmt, path::Path};

use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;
use smart_default::SmartDefault;
use url::Url;

const ENV_PREFIX: &str = "COPYBLOCK";

fn default_user_agent() -> String {
	format!("copyblock/{} (https://meta.wikimedia.org/wiki/User-Agent_policy)", env!("CARGO_PKG_VERSION"))
}

/// Settings that don't belong on the command line: credentials, endpoints, flood flag handling.
///
/// Read from `$XDG_CONFIG_HOME/copyblock/config.toml` (or `--config`), then overridden by
/// environment variables: `COPYBLOCK_USER_AGENT`, `COPYBLOCK_FLOOD__THRESHOLD`, `COPYBLOCK_CREDENTIALS__PASSWORD`.
/// One `_` after the prefix, `__` between section and key.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct AppConfig {
	#[default(default_user_agent())]
	pub user_agent: String,
	/// Needed for live runs only
	pub credentials: Option<Credentials>,
	pub source_api_url: Option<Url>,
	pub target_api_url: Option<Url>,
	pub flood: FloodConfig,
}

/// Bot password login (`Special:BotPasswords`).
#[derive(Clone, Deserialize)]
pub struct Credentials {
	pub username: String,
	pub password: String,
}

impl fmt::Debug for Credentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Credentials").field("username", &self.username).field("password", &"<redacted>").finish()
	}
}

/// Temporary `flood` group membership around large live batches, keeping mass blocks out of recent changes.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct FloodConfig {
	#[default = true]
	pub enabled: bool,
	#[default = "flood"]
	pub group: String,
	/// Batches larger than this get the flag
	#[default = 5]
	pub threshold: usize,
	#[default = "Mass blocks"]
	pub add_reason: String,
	#[default = "Done"]
	pub remove_reason: String,
}

impl AppConfig {
	/// Load from `path` (must exist) or from the XDG config file (may be missing), then the environment.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		Self::load_with_env(path, None)
	}

	/// [`load`](Self::load), reading overrides from `env` instead of the process environment when given.
	pub fn load_with_env(path: Option<&Path>, env: Option<config::Map<String, String>>) -> Result<Self> {
		let (file, required) = match path {
			Some(p) => (Some(p.to_path_buf()), true),
			None => (xdg::BaseDirectories::with_prefix("copyblock").find_config_file("config.toml"), false),
		};

		let mut builder = config::Config::builder();
		if let Some(file) = &file {
			tracing::debug!(path = %file.display(), "reading config file");
			builder = builder.add_source(config::File::from(file.as_path()).format(config::FileFormat::Toml).required(required));
		}
		builder = builder.add_source(
			config::Environment::with_prefix(ENV_PREFIX)
				.prefix_separator("_")
				.separator("__")
				.try_parsing(true)
				.source(env),
		);

		let settings = builder.build().wrap_err_with(|| format!("Failed to read configuration (file: {file:?})"))?;
		settings
			.try_deserialize()
			.wrap_err("The config is not correctly formatted and/or has fields of the wrong type")
	}
}
