//! Decides which source blocks get replayed on the target.
//!
//! Each record goes through a fixed sequence of checks; the first one that fails drops the record
//! and names the reason. Survivors become [`TargetBlockRequest`]s in source order.

use std::collections::BTreeMap;

use derive_more::Display;
use jiff::Timestamp;
use regex::Regex;

use crate::{
	block::{BlockRecord, Expiry, SubjectKind, TargetBlockRequest},
	index::LocalBlockIndex,
};

/// Why a source record was not copied. Variants are in the order the checks run.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Rejection {
	#[display("other-issuer")]
	IssuerMismatch,
	#[display("autoblock")]
	Autoblock,
	#[display("bad-expiry")]
	BadExpiry,
	#[display("indefinite")]
	Indefinite,
	#[display("expired")]
	Expired,
	#[display("expiry-too-near")]
	ExpiryTooNear,
	#[display("invalid-pattern")]
	InvalidPattern,
	#[display("no-match")]
	PatternMismatch,
	#[display("not-range")]
	NotRange,
	#[display("not-ip")]
	NotIp,
	#[display("active-block")]
	AlreadyBlocked,
}

/// Regex the block reason must match (searched anywhere in the text, not anchored).
///
/// A pattern that does not compile is kept as `Invalid`: the run goes on, and every record fails
/// the reason check.
#[derive(Clone, Debug)]
pub enum ReasonPattern {
	Valid(Regex),
	Invalid(String),
}

impl ReasonPattern {
	pub const MATCH_ALL: &'static str = ".*";

	pub fn new(pattern: &str) -> Self {
		match Regex::new(pattern) {
			Ok(re) => Self::Valid(re),
			Err(e) => {
				tracing::error!(pattern, "invalid comment pattern, no block will match it: {e}");
				Self::Invalid(pattern.to_string())
			}
		}
	}

	pub fn is_valid(&self) -> bool {
		matches!(self, Self::Valid(_))
	}

	fn check(&self, reason: &str) -> Result<(), Rejection> {
		match self {
			Self::Valid(re) if re.is_match(reason) => Ok(()),
			Self::Valid(_) => Err(Rejection::PatternMismatch),
			Self::Invalid(_) => Err(Rejection::InvalidPattern),
		}
	}
}

impl Default for ReasonPattern {
	fn default() -> Self {
		Self::new(Self::MATCH_ALL)
	}
}

#[derive(Clone, Debug, Default)]
pub struct FilterConfig {
	/// Only copy blocks placed by this administrator
	pub issuer: Option<String>,
	pub kind: SubjectKind,
	pub reason_pattern: ReasonPattern,
	/// Use this reason instead of the source block's
	pub reason_override: Option<String>,
	/// Set anon-only on every copied block
	pub force_anon_only: bool,
}

/// Whole hours left until `expiry`, rounded down. `None` once it has passed.
pub fn remaining_hours(expiry: Timestamp, now: Timestamp) -> Option<u64> {
	if expiry <= now {
		return None;
	}
	let secs = expiry.duration_since(now).as_secs();
	Some((secs / 3600) as u64)
}

/// Run every check on one record.
pub fn evaluate(record: &BlockRecord, config: &FilterConfig, index: &LocalBlockIndex, now: Timestamp) -> Result<TargetBlockRequest, Rejection> {
	if let Some(issuer) = &config.issuer
		&& record.issuer != *issuer
	{
		return Err(Rejection::IssuerMismatch);
	}

	let subject = record.subject.as_deref().ok_or(Rejection::Autoblock)?;

	let expiry = match record.expiry.parse::<Expiry>() {
		Ok(Expiry::At(ts)) => ts,
		Ok(Expiry::Infinite) => return Err(Rejection::Indefinite),
		Err(_) => return Err(Rejection::BadExpiry),
	};
	let duration_hours = match remaining_hours(expiry, now) {
		None => return Err(Rejection::Expired),
		Some(0) => return Err(Rejection::ExpiryTooNear),
		Some(h) => h,
	};

	config.reason_pattern.check(&record.reason)?;

	if !config.kind.accepts(subject) {
		return Err(match config.kind {
			SubjectKind::Range => Rejection::NotRange,
			SubjectKind::Ip => Rejection::NotIp,
		});
	}

	if index.contains(subject) {
		return Err(Rejection::AlreadyBlocked);
	}

	Ok(TargetBlockRequest {
		subject: subject.to_string(),
		duration_hours,
		reason: config.reason_override.clone().unwrap_or_else(|| record.reason.clone()),
		anon_only: record.flags.anon_only || config.force_anon_only,
		no_account_creation: record.flags.no_account_creation,
	})
}

/// Result of a filter pass.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FilterOutcome {
	/// In source order
	pub targets: Vec<TargetBlockRequest>,
	pub rejections: BTreeMap<Rejection, usize>,
	pub considered: usize,
}

impl FilterOutcome {
	pub fn rejected(&self) -> usize {
		self.rejections.values().sum()
	}
}

pub fn compute_targets<'a>(records: impl IntoIterator<Item = &'a BlockRecord>, config: &FilterConfig, index: &LocalBlockIndex, now: Timestamp) -> FilterOutcome {
	let mut outcome = FilterOutcome::default();
	for record in records {
		outcome.considered += 1;
		match evaluate(record, config, index, now) {
			Ok(target) => outcome.targets.push(target),
			Err(rejection) => {
				let subject = record.subject.as_deref().unwrap_or("-");
				tracing::debug!(id = record.id, issuer = %record.issuer, "ignore ({rejection}) {subject}");
				*outcome.rejections.entry(rejection).or_default() += 1;
			}
		}
	}
	outcome
}
