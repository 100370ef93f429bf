//! Shared fixtures: a fixed clock and builders for source block records.

use copyblock::{
	BlockFlags, BlockMigrator, BlockRecord, MigrationOptions, MigrationSummary, SubjectKind,
	config::FloodConfig,
	executor::RunMode,
	filter::{FilterConfig, ReasonPattern},
	mock_wiki::MockWiki,
};
use jiff::{SignedDuration, Timestamp};

pub fn now() -> Timestamp {
	"2026-10-16T12:00:00Z".parse().unwrap()
}

/// Builder for a block record as the source wiki would list it.
pub struct Block(BlockRecord);

impl Block {
	pub fn on(subject: &str) -> Self {
		Self(BlockRecord {
			id: 1,
			subject: Some(subject.to_string()),
			issuer: "Admin1".into(),
			reason: "vandalism".into(),
			expiry: (now() + SignedDuration::from_hours(24)).to_string(),
			flags: BlockFlags::default(),
		})
	}

	pub fn autoblock() -> Self {
		let mut block = Self::on("");
		block.0.subject = None;
		block.0.reason = "Autoblocked because your IP address has been recently used by [[User:Example]]".into();
		block
	}

	pub fn id(mut self, id: u64) -> Self {
		self.0.id = id;
		self
	}

	pub fn by(mut self, issuer: &str) -> Self {
		self.0.issuer = issuer.to_string();
		self
	}

	pub fn reason(mut self, reason: &str) -> Self {
		self.0.reason = reason.to_string();
		self
	}

	pub fn expires_in(mut self, d: SignedDuration) -> Self {
		self.0.expiry = (now() + d).to_string();
		self
	}

	pub fn expiry(mut self, raw: &str) -> Self {
		self.0.expiry = raw.to_string();
		self
	}

	pub fn flags(mut self, flags: BlockFlags) -> Self {
		self.0.flags = flags;
		self
	}

	pub fn build(self) -> BlockRecord {
		self.0
	}
}

pub fn options(mode: RunMode, kind: SubjectKind) -> MigrationOptions {
	MigrationOptions {
		filter: FilterConfig {
			kind,
			reason_pattern: ReasonPattern::default(),
			..Default::default()
		},
		mode,
		limit: 0,
		flood: FloodConfig::default(),
	}
}

pub fn run(source: &MockWiki, target: &MockWiki, options: MigrationOptions) -> MigrationSummary {
	BlockMigrator::new(source, target, options).at(now()).run().unwrap()
}
