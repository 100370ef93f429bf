//! What a `--verbose` run tells the operator about the records it leaves alone.

use copyblock::{
	SubjectKind,
	executor::RunMode,
	filter::{self, ReasonPattern},
	index::LocalBlockIndex,
	mock_wiki::MockWiki,
};
use jiff::SignedDuration;

use crate::{
	common::{Block, now, options, run},
	tracing_utils::traced,
};

#[test]
fn each_skipped_record_logs_its_first_failing_check() {
	let records = [
		Block::on("10.0.0.1").id(1).by("Admin2").reason("spam").build(),
		Block::autoblock().id(2).build(),
		Block::on("10.0.0.3").id(3).expiry("sometime").build(),
		Block::on("10.0.0.4").id(4).expiry("infinity").build(),
		Block::on("10.0.0.5").id(5).expires_in(SignedDuration::from_hours(-1)).build(),
		Block::on("10.0.0.6").id(6).expires_in(SignedDuration::from_mins(30)).reason("spam").build(),
		Block::on("10.0.0.7").id(7).reason("spam").build(),
		Block::on("10.0.0.0/24").id(8).build(),
		Block::on("10.0.0.9").id(9).build(),
		Block::on("10.0.0.10").id(10).build(),
	];
	let index = LocalBlockIndex::from_records([Block::on("10.0.0.9").by("LocalAdmin").expiry("infinity").build()]);
	let mut opts = options(RunMode::DryRun, SubjectKind::Ip);
	opts.filter.issuer = Some("Admin1".into());
	opts.filter.reason_pattern = ReasonPattern::new("vandal");

	let (outcome, log) = traced(|| filter::compute_targets(&records, &opts.filter, &index, now()));

	assert_eq!(
		log.skipped(),
		[
			(Some(1), "ignore (other-issuer) 10.0.0.1"),
			(Some(2), "ignore (autoblock) -"),
			(Some(3), "ignore (bad-expiry) 10.0.0.3"),
			(Some(4), "ignore (indefinite) 10.0.0.4"),
			(Some(5), "ignore (expired) 10.0.0.5"),
			(Some(6), "ignore (expiry-too-near) 10.0.0.6"),
			(Some(7), "ignore (no-match) 10.0.0.7"),
			(Some(8), "ignore (not-ip) 10.0.0.0/24"),
			(Some(9), "ignore (active-block) 10.0.0.9"),
		]
	);
	assert_eq!(outcome.rejected(), 9);
	assert_eq!(outcome.targets.len(), 1);
}

#[test]
fn invalid_pattern_tags_every_record() {
	let source = MockWiki::new("Admin1").with_blocks((1..=3).map(|i| Block::on(&format!("10.0.0.{i}")).id(i).build()));
	let target = MockWiki::new("CopyBot");
	let mut opts = options(RunMode::DryRun, SubjectKind::Ip);
	opts.filter.reason_pattern = ReasonPattern::new("(unclosed");

	let (summary, log) = traced(|| run(&source, &target, opts));

	assert_eq!(summary.report.attempted, 0);
	assert_eq!(log.skipped().iter().filter(|(_, m)| m.starts_with("ignore (invalid-pattern) ")).count(), 3);
	assert!(log.messages("INFO", r"^\d+ block ").is_empty());
}
