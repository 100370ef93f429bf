//! Replays the computed block requests on the target wiki, in order.

use crate::{
	api::{TokenKind, WikiApi, response_error},
	block::TargetBlockRequest,
	error::WikiError,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RunMode {
	/// Log every action, call nothing
	DryRun,
	Live,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExecutionReport {
	/// Requests processed, including failed ones and, on dry runs, the logged ones
	pub attempted: usize,
	pub succeeded: usize,
	/// Submissions whose response carried an error
	pub failed: usize,
	/// Stopped at the limit before reaching these
	pub left_unexecuted: usize,
	pub dry_run: bool,
}

/// How many of `total` requests a run with `limit` gets to (0 = no limit).
pub fn batch_size(total: usize, limit: usize) -> usize {
	match limit {
		0 => total,
		n => total.min(n),
	}
}

/// Process `requests` in order until done or `limit` (0 = unlimited) requests have been processed.
///
/// A response with an `error` object is logged and counted, and the batch goes on. Transport and
/// token failures are returned: whatever was already applied stays applied.
pub fn execute<A: WikiApi + ?Sized>(target: &A, requests: &[TargetBlockRequest], mode: RunMode, limit: usize) -> Result<ExecutionReport, WikiError> {
	let mut report = ExecutionReport {
		dry_run: mode == RunMode::DryRun,
		..Default::default()
	};

	for (i, request) in requests.iter().enumerate() {
		if limit > 0 && report.attempted >= limit {
			report.left_unexecuted = requests.len() - i;
			tracing::info!("limit of {limit} reached, {} left", report.left_unexecuted);
			break;
		}

		tracing::info!("{i} block {} {} {}", request.subject, request.expiry_param(), request.reason);
		report.attempted += 1;
		if mode == RunMode::DryRun {
			continue;
		}

		let token = target.write_token(TokenKind::Csrf)?;
		let response = target.submit_block(request, &token)?;
		tracing::info!("{response}");
		match response_error(&response) {
			Some(error) => {
				tracing::error!(subject = %request.subject, "block failed: {error}");
				report.failed += 1;
			}
			None => report.succeeded += 1,
		}
	}

	Ok(report)
}
