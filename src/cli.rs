use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::{
	block::SubjectKind,
	executor::RunMode,
	filter::{FilterConfig, ReasonPattern},
	mediawiki::WikiSite,
};

/// Copy IP or range blocks from one wiki to another.
#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["dry_run", "really_run"])))]
pub struct Cli {
	/// Language that the blocks should be imported from
	#[arg(long, default_value = "en")]
	pub lang: String,
	/// Domain that the blocks should be imported from
	#[arg(long, default_value = "wikipedia")]
	pub site: String,
	/// Language of the wiki the blocks are copied to
	#[arg(long, default_value = "es")]
	pub target_lang: String,
	/// Domain of the wiki the blocks are copied to
	#[arg(long, default_value = "wikipedia")]
	pub target_site: String,

	/// Only log what would be blocked
	#[arg(long)]
	pub dry_run: bool,
	/// Actually execute the blocks
	#[arg(long)]
	pub really_run: bool,

	/// User whose blocks should be imported. Default: everyone's
	#[arg(long)]
	pub source_user: Option<String>,

	/// Copy rangeblocks instead of IP blocks
	#[arg(long, overrides_with = "ips")]
	pub ranges: bool,
	/// Copy single IP blocks (default)
	#[arg(long, overrides_with = "ranges")]
	pub ips: bool,

	/// Regex to select only blocks containing certain strings in the block summary
	#[arg(long, default_value = ReasonPattern::MATCH_ALL)]
	pub comment_pattern: String,

	/// Log every skipped block and why
	#[arg(short, long)]
	pub verbose: bool,

	/// Maximum number of blocks to make. 0 = no limit
	#[arg(long, default_value_t = 0)]
	pub limit: usize,

	/// Block reason to use. Default: the source block's reason
	#[arg(long)]
	pub block_reason: Option<String>,

	/// Make every copied block anon-only
	#[arg(long)]
	pub anon_only: bool,

	/// Config file. Default: $XDG_CONFIG_HOME/copyblock/config.toml
	#[arg(long)]
	pub config: Option<PathBuf>,
}

impl Cli {
	pub fn mode(&self) -> RunMode {
		if self.really_run { RunMode::Live } else { RunMode::DryRun }
	}

	pub fn kind(&self) -> SubjectKind {
		if self.ranges { SubjectKind::Range } else { SubjectKind::Ip }
	}

	pub fn source_site(&self) -> WikiSite {
		WikiSite::new(self.lang.clone(), self.site.clone())
	}

	pub fn target_site(&self) -> WikiSite {
		WikiSite::new(self.target_lang.clone(), self.target_site.clone())
	}

	/// Empty strings count as not given.
	pub fn filter_config(&self) -> FilterConfig {
		let non_empty = |s: &Option<String>| s.as_ref().filter(|s| !s.is_empty()).cloned();
		FilterConfig {
			issuer: non_empty(&self.source_user),
			kind: self.kind(),
			reason_pattern: ReasonPattern::new(&self.comment_pattern),
			reason_override: non_empty(&self.block_reason),
			force_anon_only: self.anon_only,
		}
	}
}
