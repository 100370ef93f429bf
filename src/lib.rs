//! Copy IP and range blocks from one wiki's block list to another.
//!
//! A run builds an index of the target's active blocks, filters the source's temporary blocks
//! through [`filter`], then replays the survivors with [`executor`]. [`migrator::BlockMigrator`]
//! ties the three together; the wiki itself is behind the [`api::WikiApi`] trait.

pub mod api;
pub mod block;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod filter;
pub mod flood;
pub mod index;
pub mod logging;
pub mod mediawiki;
pub mod migrator;
pub mod mock_wiki;

pub use api::{UserRightsApi, WikiApi};
pub use block::{BlockFlags, BlockRecord, SubjectKind, TargetBlockRequest};
pub use error::WikiError;
pub use migrator::{BlockMigrator, MigrationOptions, MigrationSummary};
