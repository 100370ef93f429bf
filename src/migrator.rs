//! One migration run: index the target, filter the source, execute.
//!
//! The phases run strictly in order (`Idle → IndexBuilt → Filtered → Executing → Done`) and each
//! completes before the next starts. A run that fails midway is not resumable; start a new one.

use color_eyre::eyre::{Result, bail};
use jiff::Timestamp;

use crate::{
	api::{BlockQuery, UserRightsApi, WikiApi},
	block::TargetBlockRequest,
	config::FloodConfig,
	executor::{self, ExecutionReport, RunMode},
	filter::{self, FilterConfig, FilterOutcome},
	flood,
	index::LocalBlockIndex,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
	Idle,
	IndexBuilt,
	Filtered,
	Executing,
	Done,
}

#[derive(Clone, Debug)]
pub struct MigrationOptions {
	pub filter: FilterConfig,
	pub mode: RunMode,
	/// 0 = no limit
	pub limit: usize,
	pub flood: FloodConfig,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MigrationSummary {
	pub index_size: usize,
	pub filter: FilterOutcome,
	pub report: ExecutionReport,
}

pub struct BlockMigrator<'a, S: ?Sized, T: ?Sized> {
	source: &'a S,
	target: &'a T,
	options: MigrationOptions,
	now: Option<Timestamp>,
	phase: Phase,
	index: LocalBlockIndex,
	outcome: FilterOutcome,
}

impl<'a, S, T> BlockMigrator<'a, S, T>
where
	S: WikiApi + ?Sized,
	T: WikiApi + UserRightsApi + ?Sized,
{
	pub fn new(source: &'a S, target: &'a T, options: MigrationOptions) -> Self {
		Self {
			source,
			target,
			options,
			now: None,
			phase: Phase::Idle,
			index: LocalBlockIndex::default(),
			outcome: FilterOutcome::default(),
		}
	}

	/// Evaluate expiries against a fixed instant instead of the clock.
	pub fn at(mut self, now: Timestamp) -> Self {
		self.now = Some(now);
		self
	}

	pub fn phase(&self) -> Phase {
		self.phase
	}

	pub fn index(&self) -> &LocalBlockIndex {
		&self.index
	}

	/// Requests computed by [`filter`](Self::filter), in source order.
	pub fn targets(&self) -> &[TargetBlockRequest] {
		&self.outcome.targets
	}

	fn expect_phase(&self, expected: Phase) -> Result<()> {
		if self.phase != expected {
			bail!("migration is in phase {:?}, expected {expected:?}", self.phase);
		}
		Ok(())
	}

	fn enter(&mut self, to: Phase) {
		tracing::debug!("phase {:?} -> {to:?}", self.phase);
		self.phase = to;
	}

	/// Load the target's active blocks of the run's kind.
	pub fn build_index(&mut self) -> Result<&LocalBlockIndex> {
		self.expect_phase(Phase::Idle)?;
		tracing::info!("Preloading local blocks...");
		self.index = LocalBlockIndex::build(self.target, self.options.filter.kind)?;
		tracing::info!("Preloaded {} blocks", self.index.len());
		self.enter(Phase::IndexBuilt);
		Ok(&self.index)
	}

	/// Fetch the source's temporary blocks and decide which to copy.
	pub fn filter(&mut self) -> Result<&FilterOutcome> {
		self.expect_phase(Phase::IndexBuilt)?;
		tracing::info!("Computing target blocks...");
		let records = self.source.list_blocks(&BlockQuery::new(self.options.filter.kind, true))?;
		let now = self.now.unwrap_or_else(Timestamp::now);
		self.outcome = filter::compute_targets(&records, &self.options.filter, &self.index, now);
		tracing::info!(considered = self.outcome.considered, rejected = self.outcome.rejected(), "Adding {}...", self.outcome.targets.len());
		self.enter(Phase::Filtered);
		Ok(&self.outcome)
	}

	/// Submit the computed requests, flood-flagged when the batch is large.
	pub fn execute(&mut self) -> Result<ExecutionReport> {
		self.expect_phase(Phase::Filtered)?;
		self.enter(Phase::Executing);
		let MigrationOptions { mode, limit, flood: flood_settings, .. } = &self.options;
		let (mode, limit) = (*mode, *limit);
		let requests = &self.outcome.targets;
		let target = self.target;

		let batch = executor::batch_size(requests.len(), limit);
		let report = if flood::needed(flood_settings, mode, batch) {
			flood::with_flood_flag(target, flood_settings, || executor::execute(target, requests, mode, limit))?
		} else {
			executor::execute(target, requests, mode, limit)?
		};

		tracing::info!(attempted = report.attempted, succeeded = report.succeeded, failed = report.failed, "Done");
		self.enter(Phase::Done);
		Ok(report)
	}

	pub fn run(mut self) -> Result<MigrationSummary> {
		self.build_index()?;
		self.filter()?;
		let report = self.execute()?;
		Ok(MigrationSummary {
			index_size: self.index.len(),
			filter: self.outcome,
			report,
		})
	}
}
