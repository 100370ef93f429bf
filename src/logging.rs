//! Subscriber setup. Call [`init`] once, at startup, before anything logs.

use std::{fs::File, path::PathBuf, sync::Mutex};

use color_eyre::eyre::{Result, WrapErr};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// If set, every event is also written to this file as JSON lines.
pub const TRACE_FILE_ENV: &str = "COPYBLOCK_TRACE_FILE";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Verbosity {
	/// Milestones and each block action
	Info,
	/// Plus every skipped record and why
	Debug,
}

impl Verbosity {
	pub fn from_flag(verbose: bool) -> Self {
		if verbose { Self::Debug } else { Self::Info }
	}

	/// Filter directives: our crate at this level, dependencies at warn, plus whatever `.cargo/log_directives` held at build time.
	pub fn directives(&self) -> String {
		let level = match self {
			Self::Info => "info",
			Self::Debug => "debug",
		};
		let mut directives = format!("warn,copyblock={level}");
		if let Some(extra) = option_env!("LOG_DIRECTIVES") {
			directives.push(',');
			directives.push_str(extra);
		}
		directives
	}
}

/// `RUST_LOG` wins over `verbosity` when set.
pub fn init(verbosity: Verbosity) -> Result<()> {
	let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(verbosity.directives())).wrap_err("Invalid log filter directives")?;

	let trace_file = match std::env::var_os(TRACE_FILE_ENV).map(PathBuf::from) {
		Some(path) => Some(File::create(&path).wrap_err_with(|| format!("Failed to create trace file at {}", path.display()))?),
		None => None,
	};

	subscriber(filter, trace_file).try_init().wrap_err("Failed to install the tracing subscriber")?;
	Ok(())
}

/// Human-readable events on stderr, plus JSON lines into `trace_file` when given.
pub fn subscriber(filter: EnvFilter, trace_file: Option<File>) -> impl tracing::Subscriber + Send + Sync + 'static {
	let json_layer = trace_file.map(|file| fmt::layer().json().with_writer(Mutex::new(file)));
	tracing_subscriber::registry()
		.with(filter)
		.with(fmt::layer().with_target(false).with_writer(std::io::stderr))
		.with(json_layer)
}
