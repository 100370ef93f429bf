//! Flood flag handling: large live batches run with the account temporarily in the flood group.

use crate::{
	api::{TokenKind, UserRightsApi, WikiApi, response_error},
	config::FloodConfig,
	error::WikiError,
	executor::RunMode,
};

/// Whether a batch of `batch` requests in `mode` should run flagged.
pub fn needed(settings: &FloodConfig, mode: RunMode, batch: usize) -> bool {
	settings.enabled && mode == RunMode::Live && batch > settings.threshold
}

/// Run `f` with the flood group added to our account, removing it afterwards whatever `f` returned.
///
/// An `error` payload from either group change is logged and ignored. Transport errors are not; if
/// `f` itself failed, its error wins over a failed removal.
pub fn with_flood_flag<A, T>(target: &A, settings: &FloodConfig, f: impl FnOnce() -> Result<T, WikiError>) -> Result<T, WikiError>
where
	A: WikiApi + UserRightsApi + ?Sized,
{
	tracing::info!("Adding {} flag...", settings.group);
	change_groups(target, &[settings.group.as_str()], &[], &settings.add_reason)?;

	let result = f();

	tracing::info!("Removing {} flag...", settings.group);
	let removed = change_groups(target, &[], &[settings.group.as_str()], &settings.remove_reason);
	match (result, removed) {
		(Ok(out), Ok(())) => Ok(out),
		(Ok(_), Err(e)) => Err(e),
		(Err(e), removed) => {
			if let Err(removal) = removed {
				tracing::error!("could not remove {} flag: {removal}", settings.group);
			}
			Err(e)
		}
	}
}

fn change_groups<A: WikiApi + UserRightsApi + ?Sized>(target: &A, add: &[&str], remove: &[&str], reason: &str) -> Result<(), WikiError> {
	let token = target.write_token(TokenKind::UserRights)?;
	let response = target.change_own_groups(add, remove, reason, &token)?;
	tracing::info!("{response}");
	if let Some(error) = response_error(&response) {
		tracing::error!("group change failed: {error}");
	}
	Ok(())
}
