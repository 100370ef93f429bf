//! [`WikiApi`] over the MediaWiki Action API (`api.php`), with blocking HTTP.

use std::collections::BTreeMap;

use derive_more::Display;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::{
	api::{BlockQuery, TokenKind, UserRightsApi, WikiApi, response_error},
	block::{BlockRecord, TargetBlockRequest},
	error::WikiError,
};

const BLOCK_PROPS: &str = "id|user|by|timestamp|expiry|reason|flags";

/// A wiki addressed the way Wikimedia projects are: language code + project family.
#[derive(Clone, Debug, Display, Eq, PartialEq, derive_new::new)]
#[display("{lang}.{family}")]
pub struct WikiSite {
	pub lang: String,
	pub family: String,
}

impl WikiSite {
	/// `https://{lang}.{family}.org/w/api.php`, or `{lang}.wikimedia.org` for single-wiki families like meta or commons.
	pub fn api_url(&self) -> Result<Url, url::ParseError> {
		let host = if self.lang == self.family {
			format!("{}.wikimedia.org", self.lang)
		} else {
			format!("{}.{}.org", self.lang, self.family)
		};
		Url::parse(&format!("https://{host}/w/api.php"))
	}
}

#[derive(Deserialize)]
struct BlocksPage {
	#[serde(default)]
	query: Option<BlocksQuery>,
	#[serde(rename = "continue", default)]
	continuation: Option<BTreeMap<String, Value>>,
}

#[derive(Deserialize)]
struct BlocksQuery {
	#[serde(default)]
	blocks: Vec<BlockRecord>,
}

type Params = Vec<(String, String)>;

fn params<const N: usize>(pairs: [(&str, &str); N]) -> Params {
	pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Blocking client for one wiki. Session cookies are kept across calls, so a successful
/// [`login`](Self::login) authenticates everything after it.
pub struct MediaWikiClient {
	http: Client,
	api_url: Url,
	username: Option<String>,
}

impl MediaWikiClient {
	pub fn new(api_url: Url, user_agent: &str) -> Result<Self, WikiError> {
		let http = Client::builder().user_agent(user_agent).cookie_store(true).build().map_err(|source| WikiError::Http {
			url: api_url.to_string(),
			source,
		})?;
		Ok(Self { http, api_url, username: None })
	}

	pub fn api_url(&self) -> &Url {
		&self.api_url
	}

	/// Name of the logged-in account, if any.
	pub fn username(&self) -> Option<&str> {
		self.username.as_deref()
	}

	/// Log in with a bot password (`User@BotName` + generated password).
	#[tracing::instrument(skip(self, password), fields(api = %self.api_url))]
	pub fn login(&mut self, username: &str, password: &str) -> Result<(), WikiError> {
		let login_token = self.token("login")?;
		let response = self.post(params([("action", "login"), ("lgname", username), ("lgpassword", password), ("lgtoken", login_token.as_str())]))?;

		let login = response.get("login").ok_or(WikiError::MissingField("login"))?;
		let result = login.get("result").and_then(Value::as_str).unwrap_or_default();
		if result != "Success" {
			let reason = login.get("reason").and_then(Value::as_str).unwrap_or(result);
			return Err(WikiError::Login {
				username: username.to_string(),
				result: reason.to_string(),
			});
		}

		let name = login.get("lgusername").and_then(Value::as_str).unwrap_or(username);
		tracing::info!(user = name, "logged in");
		self.username = Some(name.to_string());
		Ok(())
	}

	fn http_error(&self, source: reqwest::Error) -> WikiError {
		WikiError::Http {
			url: self.api_url.to_string(),
			source,
		}
	}

	fn standard_params() -> Params {
		params([("format", "json"), ("formatversion", "2")])
	}

	fn get(&self, mut query: Params) -> Result<Value, WikiError> {
		query.extend(Self::standard_params());
		let text = self
			.http
			.get(self.api_url.clone())
			.query(&query)
			.send()
			.and_then(|res| res.error_for_status())
			.and_then(|res| res.text())
			.map_err(|e| self.http_error(e))?;
		Ok(serde_json::from_str(&text)?)
	}

	fn post(&self, mut form: Params) -> Result<Value, WikiError> {
		form.extend(Self::standard_params());
		let text = self
			.http
			.post(self.api_url.clone())
			.form(&form)
			.send()
			.and_then(|res| res.error_for_status())
			.and_then(|res| res.text())
			.map_err(|e| self.http_error(e))?;
		Ok(serde_json::from_str(&text)?)
	}

	/// Fail on an `error` object. Only for reads; write responses go back to the caller untouched.
	fn checked(response: Value) -> Result<Value, WikiError> {
		match response_error(&response) {
			Some(error) => Err(WikiError::from_payload(error)),
			None => Ok(response),
		}
	}

	fn token(&self, kind: &str) -> Result<String, WikiError> {
		let response = Self::checked(self.get(params([("action", "query"), ("meta", "tokens"), ("type", kind)]))?)?;
		response
			.pointer(&format!("/query/tokens/{kind}token"))
			.and_then(Value::as_str)
			.map(str::to_string)
			.ok_or(WikiError::MissingField("query.tokens"))
	}
}

impl WikiApi for MediaWikiClient {
	#[tracing::instrument(skip(self), fields(api = %self.api_url))]
	fn list_blocks(&self, query: &BlockQuery) -> Result<Vec<BlockRecord>, WikiError> {
		let base = params([("action", "query"), ("list", "blocks"), ("bkprop", BLOCK_PROPS), ("bkshow", query.bkshow().as_str()), ("bklimit", "max")]);

		let mut records = Vec::new();
		let mut continuation: Params = Vec::new();
		loop {
			let mut page_params = base.clone();
			page_params.extend(continuation.drain(..));

			let page: BlocksPage = serde_json::from_value(Self::checked(self.get(page_params)?)?)?;
			let blocks = page.query.map(|q| q.blocks).unwrap_or_default();
			tracing::debug!(n = blocks.len(), "fetched page of blocks");
			records.extend(blocks);

			match page.continuation {
				Some(next) => {
					continuation = next
						.into_iter()
						.map(|(k, v)| {
							let v = match v {
								Value::String(s) => s,
								other => other.to_string(),
							};
							(k, v)
						})
						.collect();
				}
				None => break,
			}
		}
		Ok(records)
	}

	fn write_token(&self, kind: TokenKind) -> Result<String, WikiError> {
		self.token(&kind.to_string())
	}

	fn submit_block(&self, request: &TargetBlockRequest, token: &str) -> Result<Value, WikiError> {
		let mut form = params([
			("action", "block"),
			("user", request.subject.as_str()),
			("expiry", request.expiry_param().as_str()),
			("reason", request.reason.as_str()),
			("token", token),
		]);
		if request.anon_only {
			form.push(("anononly".into(), "1".into()));
		}
		if request.no_account_creation {
			form.push(("nocreate".into(), "1".into()));
		}
		self.post(form)
	}
}

impl UserRightsApi for MediaWikiClient {
	fn change_own_groups(&self, add: &[&str], remove: &[&str], reason: &str, token: &str) -> Result<Value, WikiError> {
		let user = self.username.as_deref().ok_or(WikiError::NotLoggedIn("changing user groups"))?;
		let mut form = params([("action", "userrights"), ("user", user), ("reason", reason), ("token", token)]);
		if !add.is_empty() {
			form.push(("add".into(), add.join("|")));
		}
		if !remove.is_empty() {
			form.push(("remove".into(), remove.join("|")));
		}
		self.post(form)
	}
}
