//! Mock wiki for testing purposes.
//!
//! Keeps a block list in memory and implements [`WikiApi`] and [`UserRightsApi`] against it, so the
//! whole migration can run without touching a real wiki. Every call is traced with target
//! `mock_wiki`.

use std::{
	collections::HashMap,
	sync::{
		Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use jiff::{SignedDuration, Timestamp};
use serde_json::{Value, json};

use crate::{
	api::{BlockQuery, TokenKind, UserRightsApi, WikiApi},
	block::{BlockFlags, BlockRecord, Expiry, TargetBlockRequest},
	error::WikiError,
};

/// One `userrights` call as the mock received it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroupChange {
	pub user: String,
	pub add: Vec<String>,
	pub remove: Vec<String>,
	pub reason: String,
}

pub struct MockWiki {
	user_login: String,
	next_block_id: AtomicUsize,
	blocks: Mutex<Vec<BlockRecord>>,
	submitted: Mutex<Vec<TargetBlockRequest>>,
	/// subject -> error code to answer with
	block_failures: Mutex<HashMap<String, String>>,
	group_failure: Mutex<Option<String>>,
	group_changes: Mutex<Vec<GroupChange>>,
	tokens_issued: AtomicUsize,
	list_calls: AtomicUsize,
	/// Submissions allowed before every further call fails like a dropped connection
	break_after: Mutex<Option<usize>>,
}

impl MockWiki {
	pub fn new(user_login: &str) -> Self {
		Self {
			user_login: user_login.to_string(),
			next_block_id: AtomicUsize::new(1000),
			blocks: Mutex::new(Vec::new()),
			submitted: Mutex::new(Vec::new()),
			block_failures: Mutex::new(HashMap::new()),
			group_failure: Mutex::new(None),
			group_changes: Mutex::new(Vec::new()),
			tokens_issued: AtomicUsize::new(0),
			list_calls: AtomicUsize::new(0),
			break_after: Mutex::new(None),
		}
	}

	pub fn with_blocks(self, records: impl IntoIterator<Item = BlockRecord>) -> Self {
		self.blocks.lock().unwrap().extend(records);
		self
	}

	pub fn add_block(&self, record: BlockRecord) {
		self.blocks.lock().unwrap().push(record);
	}

	/// Answer blocks of `subject` with an `error` payload carrying `code`.
	pub fn fail_block(&self, subject: &str, code: &str) {
		self.block_failures.lock().unwrap().insert(subject.to_string(), code.to_string());
	}

	/// Answer every `userrights` call with an `error` payload carrying `code`.
	pub fn fail_group_changes(&self, code: &str) {
		*self.group_failure.lock().unwrap() = Some(code.to_string());
	}

	/// Let `n` block submissions through, then fail every call after them.
	pub fn break_after(&self, n: usize) {
		*self.break_after.lock().unwrap() = Some(n);
	}

	pub fn submitted(&self) -> Vec<TargetBlockRequest> {
		self.submitted.lock().unwrap().clone()
	}

	pub fn group_changes(&self) -> Vec<GroupChange> {
		self.group_changes.lock().unwrap().clone()
	}

	pub fn tokens_issued(&self) -> usize {
		self.tokens_issued.load(Ordering::SeqCst)
	}

	pub fn list_calls(&self) -> usize {
		self.list_calls.load(Ordering::SeqCst)
	}

	fn check_connection(&self) -> Result<(), WikiError> {
		match *self.break_after.lock().unwrap() {
			Some(n) if self.submitted.lock().unwrap().len() >= n => Err(WikiError::Api {
				code: "http".into(),
				info: "connection reset by mock".into(),
			}),
			_ => Ok(()),
		}
	}

	fn check_token(token: &str, kind: TokenKind) -> Option<Value> {
		if token.starts_with(&format!("mock-{kind}-")) {
			None
		} else {
			Some(json!({"error": {"code": "badtoken", "info": "Invalid CSRF token."}}))
		}
	}
}

impl WikiApi for MockWiki {
	fn list_blocks(&self, query: &BlockQuery) -> Result<Vec<BlockRecord>, WikiError> {
		tracing::info!(target: "mock_wiki", bkshow = %query.bkshow(), "list_blocks");
		self.list_calls.fetch_add(1, Ordering::SeqCst);

		let blocks = self.blocks.lock().unwrap();
		let listed = blocks
			.iter()
			.filter(|record| match &record.subject {
				Some(subject) => query.kind.accepts(subject),
				None => true,
			})
			.filter(|record| !query.temporary_only || !matches!(record.expiry.parse::<Expiry>(), Ok(Expiry::Infinite)))
			.cloned()
			.collect();
		Ok(listed)
	}

	fn write_token(&self, kind: TokenKind) -> Result<String, WikiError> {
		tracing::info!(target: "mock_wiki", %kind, "write_token");
		self.check_connection()?;
		let n = self.tokens_issued.fetch_add(1, Ordering::SeqCst);
		Ok(format!("mock-{kind}-{n}+\\"))
	}

	fn submit_block(&self, request: &TargetBlockRequest, token: &str) -> Result<Value, WikiError> {
		tracing::info!(target: "mock_wiki", subject = %request.subject, expiry = %request.expiry_param(), "submit_block");
		self.check_connection()?;
		self.submitted.lock().unwrap().push(request.clone());

		if let Some(error) = Self::check_token(token, TokenKind::Csrf) {
			return Ok(error);
		}
		if let Some(code) = self.block_failures.lock().unwrap().get(&request.subject) {
			return Ok(json!({"error": {"code": code, "info": format!("mock refused to block {}", request.subject)}}));
		}

		let id = self.next_block_id.fetch_add(1, Ordering::SeqCst);
		let expiry = Timestamp::now() + SignedDuration::from_hours(request.duration_hours as i64);
		self.add_block(BlockRecord {
			id: id as u64,
			subject: Some(request.subject.clone()),
			issuer: self.user_login.clone(),
			reason: request.reason.clone(),
			expiry: expiry.to_string(),
			flags: BlockFlags {
				anon_only: request.anon_only,
				no_account_creation: request.no_account_creation,
				..Default::default()
			},
		});

		Ok(json!({"block": {
			"user": request.subject,
			"id": id,
			"expiry": expiry.to_string(),
			"reason": request.reason,
			"anononly": request.anon_only,
			"nocreate": request.no_account_creation,
		}}))
	}
}

impl UserRightsApi for MockWiki {
	fn change_own_groups(&self, add: &[&str], remove: &[&str], reason: &str, token: &str) -> Result<Value, WikiError> {
		tracing::info!(target: "mock_wiki", ?add, ?remove, reason, "change_own_groups");
		self.check_connection()?;
		if let Some(error) = Self::check_token(token, TokenKind::UserRights) {
			return Ok(error);
		}
		if let Some(code) = self.group_failure.lock().unwrap().as_deref() {
			return Ok(json!({"error": {"code": code, "info": "mock refused the group change"}}));
		}

		let change = GroupChange {
			user: self.user_login.clone(),
			add: add.iter().map(|s| s.to_string()).collect(),
			remove: remove.iter().map(|s| s.to_string()).collect(),
			reason: reason.to_string(),
		};
		self.group_changes.lock().unwrap().push(change.clone());
		Ok(json!({"userrights": {"user": change.user, "added": change.add, "removed": change.remove}}))
	}
}
