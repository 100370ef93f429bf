use std::collections::BTreeMap;

use crate::{
	api::{BlockQuery, WikiApi},
	block::{BlockRecord, SubjectKind},
	error::WikiError,
};

/// Blocks already active on the target wiki, keyed by subject.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LocalBlockIndex {
	by_subject: BTreeMap<String, BlockRecord>,
}

impl LocalBlockIndex {
	/// Fetch every active block of `kind` on `target`.
	///
	/// Autoblocks have no visible subject; they are logged and left out.
	#[tracing::instrument(skip(target))]
	pub fn build<A: WikiApi + ?Sized>(target: &A, kind: SubjectKind) -> Result<Self, WikiError> {
		let records = target.list_blocks(&BlockQuery::new(kind, false))?;
		Ok(Self::from_records(records))
	}

	pub fn from_records(records: impl IntoIterator<Item = BlockRecord>) -> Self {
		let mut by_subject = BTreeMap::new();
		for record in records {
			match record.subject.clone() {
				Some(subject) => {
					by_subject.insert(subject, record);
				}
				None => tracing::debug!(id = record.id, "autoblock"),
			}
		}
		Self { by_subject }
	}

	pub fn contains(&self, subject: &str) -> bool {
		self.by_subject.contains_key(subject)
	}

	pub fn get(&self, subject: &str) -> Option<&BlockRecord> {
		self.by_subject.get(subject)
	}

	pub fn len(&self) -> usize {
		self.by_subject.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_subject.is_empty()
	}
}
