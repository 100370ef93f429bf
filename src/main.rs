use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use copyblock::{
	BlockMigrator, MigrationOptions,
	cli::Cli,
	config::AppConfig,
	executor::RunMode,
	logging::{self, Verbosity},
	mediawiki::{MediaWikiClient, WikiSite},
};
use url::Url;

fn main() -> Result<()> {
	color_eyre::install()?;
	let cli = Cli::parse();
	logging::init(Verbosity::from_flag(cli.verbose))?;

	let config = AppConfig::load(cli.config.as_deref())?;
	let mode = cli.mode();

	let mut source = connect(&cli.source_site(), config.source_api_url.as_ref(), &config.user_agent)?;
	let mut target = connect(&cli.target_site(), config.target_api_url.as_ref(), &config.user_agent)?;

	if mode == RunMode::Live {
		let creds = config
			.credentials
			.as_ref()
			.ok_or_else(|| eyre!("--really-run needs credentials. Add a [credentials] section with username and password to your config"))?;
		target.login(&creds.username, &creds.password).wrap_err("Failed to log in to the target wiki")?;
		source.login(&creds.username, &creds.password).wrap_err("Failed to log in to the source wiki")?;
	}

	let options = MigrationOptions {
		filter: cli.filter_config(),
		mode,
		limit: cli.limit,
		flood: config.flood.clone(),
	};
	tracing::info!(source = %cli.source_site(), target = %cli.target_site(), kind = %options.filter.kind, ?mode, "copying blocks");

	let summary = BlockMigrator::new(&source, &target, options).run()?;
	tracing::info!(
		local = summary.index_size,
		considered = summary.filter.considered,
		copied = summary.report.succeeded,
		failed = summary.report.failed,
		"finished"
	);
	Ok(())
}

fn connect(site: &WikiSite, api_url: Option<&Url>, user_agent: &str) -> Result<MediaWikiClient> {
	let url = match api_url {
		Some(url) => url.clone(),
		None => site.api_url().wrap_err_with(|| format!("Cannot build API URL for {site}"))?,
	};
	tracing::debug!(%site, %url, "connecting");
	Ok(MediaWikiClient::new(url, user_agent)?)
}
