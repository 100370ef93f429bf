//! The narrow interface the migration core talks to.
//!
//! Everything the core needs from a wiki fits in three calls: list blocks of a kind, get a write
//! token, submit a block. Keeping it this small lets the whole pipeline run against
//! [`MockWiki`](crate::mock_wiki::MockWiki) with no network.

use derive_more::Display;
use serde_json::Value;

use crate::{
	block::{BlockRecord, SubjectKind, TargetBlockRequest},
	error::WikiError,
};

/// Server-side filter for a block listing.
#[derive(Clone, Copy, Debug, Eq, PartialEq, derive_new::new)]
pub struct BlockQuery {
	pub kind: SubjectKind,
	/// Only blocks with a finite expiry
	pub temporary_only: bool,
}

impl BlockQuery {
	/// Value for the API's `bkshow` parameter.
	pub fn bkshow(&self) -> String {
		if self.temporary_only {
			format!("{}|temp", self.kind.bkshow())
		} else {
			self.kind.bkshow().to_string()
		}
	}
}

/// Kinds of write credential.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum TokenKind {
	#[display("csrf")]
	Csrf,
	#[display("userrights")]
	UserRights,
}

/// Read/write access to one wiki's block list.
pub trait WikiApi {
	/// All blocks matching `query`, across every result page, in the order the wiki returns them.
	fn list_blocks(&self, query: &BlockQuery) -> Result<Vec<BlockRecord>, WikiError>;

	/// A fresh write token.
	fn write_token(&self, kind: TokenKind) -> Result<String, WikiError>;

	/// Submit one block. Returns the raw response, which may carry an `error` object.
	fn submit_block(&self, request: &TargetBlockRequest, token: &str) -> Result<Value, WikiError>;
}

/// Group membership changes for the account the client is logged in as.
pub trait UserRightsApi {
	/// Add and remove groups on our own account. Returns the raw response.
	fn change_own_groups(&self, add: &[&str], remove: &[&str], reason: &str, token: &str) -> Result<Value, WikiError>;
}

/// The `error` object of a response, if it reports one.
pub fn response_error(response: &Value) -> Option<&Value> {
	response.get("error")
}
