use copyblock::{SubjectKind, executor::RunMode, mock_wiki::MockWiki};
use rstest::rstest;

use crate::{
	common::{Block, options, run},
	tracing_utils::traced,
};

#[rstest]
#[case(1)]
#[case(6)]
#[case(20)]
fn dry_run_writes_nothing(#[case] n: u64) {
	let source = MockWiki::new("Admin1").with_blocks((1..=n).map(|i| Block::on(&format!("192.0.2.{i}")).id(i).build()));
	let target = MockWiki::new("CopyBot");

	let summary = run(&source, &target, options(RunMode::DryRun, SubjectKind::Ip));

	assert!(summary.report.dry_run);
	assert_eq!(summary.report.attempted, n as usize);
	assert!(target.submitted().is_empty());
	assert!(target.group_changes().is_empty());
	assert_eq!(target.tokens_issued(), 0);
}

#[test]
fn dry_run_respects_limit() {
	let source = MockWiki::new("Admin1").with_blocks((1..=5).map(|i| Block::on(&format!("192.0.2.{i}")).id(i).build()));
	let target = MockWiki::new("CopyBot");
	let mut opts = options(RunMode::DryRun, SubjectKind::Ip);
	opts.limit = 2;

	let summary = run(&source, &target, opts);

	assert_eq!(summary.report.attempted, 2);
	assert_eq!(summary.report.left_unexecuted, 3);
}

#[rstest]
#[case(1)]
#[case(7)]
fn dry_run_logs_each_would_be_block(#[case] n: u64) {
	let source = MockWiki::new("Admin1").with_blocks((1..=n).map(|i| Block::on(&format!("192.0.2.{i}")).id(i).build()));
	let target = MockWiki::new("CopyBot");

	let (summary, log) = traced(|| run(&source, &target, options(RunMode::DryRun, SubjectKind::Ip)));

	let expected: Vec<String> = (0..n).map(|i| format!("{i} block 192.0.2.{} 24 hours vandalism", i + 1)).collect();
	assert_eq!(log.messages("INFO", r"^\d+ block "), expected);
	assert_eq!(summary.report.attempted, n as usize);
	assert!(target.submitted().is_empty());
}

#[test]
fn dry_run_logs_only_up_to_the_limit() {
	let source = MockWiki::new("Admin1").with_blocks((1..=5).map(|i| Block::on(&format!("192.0.2.{i}")).id(i).build()));
	let target = MockWiki::new("CopyBot");
	let mut opts = options(RunMode::DryRun, SubjectKind::Ip);
	opts.limit = 2;

	let (_, log) = traced(|| run(&source, &target, opts));

	assert_eq!(log.messages("INFO", r"^\d+ block ").len(), 2);
	assert_eq!(log.messages("INFO", "^limit of 2 reached, 3 left$").len(), 1);
}
