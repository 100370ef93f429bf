/// Failures at the wiki API seam.
///
/// All of these are fatal for a run: the caller propagates them instead of skipping a record.
/// An error payload in a *block submission* response is not a `WikiError`; the executor reads it
/// from the returned JSON.
#[derive(Debug, thiserror::Error)]
pub enum WikiError {
	#[error("request to {url} failed")]
	Http {
		url: String,
		#[source]
		source: reqwest::Error,
	},

	#[error("failed to decode API response")]
	Decode(#[from] serde_json::Error),

	#[error("API returned `{code}`: {info}")]
	Api { code: String, info: String },

	#[error("login as `{username}` failed: {result}")]
	Login { username: String, result: String },

	#[error("API response is missing `{0}`")]
	MissingField(&'static str),

	#[error("not logged in; {0} requires credentials")]
	NotLoggedIn(&'static str),
}

impl WikiError {
	/// Extract the `error` object MediaWiki puts into failed responses.
	pub fn from_payload(error: &serde_json::Value) -> Self {
		let field = |name: &str| error.get(name).and_then(|v| v.as_str()).unwrap_or_default().to_string();
		Self::Api {
			code: field("code"),
			info: field("info"),
		}
	}
}
