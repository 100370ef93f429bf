//! Block data model shared by the index builder, the filter pipeline and the executor.
//!
//! `BlockRecord` is what a wiki reports about an existing block (read-only, straight from the
//! `list=blocks` API). `TargetBlockRequest` is what we decided to replay on the target wiki.

use std::{net::IpAddr, str::FromStr};

use derive_more::Display;
use ipnet::IpNet;
use jiff::{Timestamp, civil::DateTime, tz::TimeZone};
use serde::Deserialize;

/// One active block, as listed by a wiki.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct BlockRecord {
	#[serde(default)]
	pub id: u64,
	/// Blocked IP or range. Missing for autoblocks, whose target is hidden.
	#[serde(rename = "user", default)]
	pub subject: Option<String>,
	/// Administrator who placed the block
	#[serde(rename = "by", default)]
	pub issuer: String,
	#[serde(default)]
	pub reason: String,
	/// Raw expiry as reported (ISO-8601 or one of the "infinity" spellings). Parsed lazily by the filter.
	pub expiry: String,
	#[serde(flatten)]
	pub flags: BlockFlags,
}

/// Restriction flags of a block. Absent keys mean "not set".
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct BlockFlags {
	#[serde(rename = "anononly", default)]
	pub anon_only: bool,
	#[serde(rename = "nocreate", default)]
	pub no_account_creation: bool,
	#[serde(rename = "noemail", default)]
	pub no_email: bool,
	#[serde(rename = "allowusertalk", default)]
	pub allow_talk_page: bool,
}

/// Which kind of block subject a run copies.
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
pub enum SubjectKind {
	#[default]
	#[display("ip")]
	Ip,
	#[display("range")]
	Range,
}

impl SubjectKind {
	/// Value for the API's `bkshow` filter.
	pub fn bkshow(&self) -> &'static str {
		match self {
			SubjectKind::Ip => "ip",
			SubjectKind::Range => "range",
		}
	}

	/// Syntactic check of a subject against this kind.
	///
	/// Ranges must be canonical CIDR networks (`10.0.0.0/24`, not `10.0.0.5/24`), and a bare
	/// address is never a range.
	pub fn accepts(&self, subject: &str) -> bool {
		match self {
			SubjectKind::Ip => subject.parse::<IpAddr>().is_ok(),
			SubjectKind::Range => match subject.parse::<IpNet>() {
				Ok(net) => net.trunc() == net,
				Err(_) => false,
			},
		}
	}
}

/// Absolute expiry of a block.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Expiry {
	At(Timestamp),
	Infinite,
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized expiry `{0}`")]
pub struct ExpiryParseError(pub String);

impl FromStr for Expiry {
	type Err = ExpiryParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		if matches!(s.to_ascii_lowercase().as_str(), "infinity" | "infinite" | "indefinite" | "never") {
			return Ok(Expiry::Infinite);
		}
		if let Ok(ts) = s.parse::<Timestamp>() {
			return Ok(Expiry::At(ts));
		}
		// No offset given: read it as UTC
		s.parse::<DateTime>()
			.ok()
			.and_then(|dt| dt.to_zoned(TimeZone::UTC).ok())
			.map(|zoned| Expiry::At(zoned.timestamp()))
			.ok_or_else(|| ExpiryParseError(s.to_string()))
	}
}

/// A block to place on the target wiki.
///
/// Only `anon_only` and `no_account_creation` are ever carried over; e-mail and talk page
/// restrictions of the source block are dropped on purpose.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TargetBlockRequest {
	pub subject: String,
	/// Always > 0
	pub duration_hours: u64,
	pub reason: String,
	pub anon_only: bool,
	pub no_account_creation: bool,
}

impl TargetBlockRequest {
	/// Relative expiry in the form the block API takes, e.g. `5 hours`.
	pub fn expiry_param(&self) -> String {
		format!("{} hours", self.duration_hours)
	}
}
