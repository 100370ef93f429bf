use std::io::Write as _;

use copyblock::config::AppConfig;

#[test]
fn reads_explicit_file() {
	let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
	write!(
		file,
		r#"
user_agent = "copyblock-test/1.0 (ops@example.org)"
target_api_url = "https://test.wikipedia.org/w/api.php"

[credentials]
username = "CopyBot@copyblock"
password = "s3cret"

[flood]
threshold = 20
add_reason = "Bloqueos masivos"
"#
	)
	.unwrap();

	let config = AppConfig::load(Some(file.path())).unwrap();

	assert_eq!(config.user_agent, "copyblock-test/1.0 (ops@example.org)");
	assert_eq!(config.target_api_url.unwrap().host_str(), Some("test.wikipedia.org"));
	assert!(config.source_api_url.is_none());
	assert_eq!(config.credentials.unwrap().username, "CopyBot@copyblock");
	assert_eq!(config.flood.threshold, 20);
	assert_eq!(config.flood.add_reason, "Bloqueos masivos");
	// untouched keys keep their defaults
	assert!(config.flood.enabled);
	assert_eq!(config.flood.group, "flood");
}

#[test]
fn missing_explicit_file_is_an_error() {
	let dir = tempfile::tempdir().unwrap();
	assert!(AppConfig::load(Some(&dir.path().join("nope.toml"))).is_err());
}

#[test]
fn malformed_file_is_an_error() {
	let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
	write!(file, "[flood]\nthreshold = \"many\"\n").unwrap();
	assert!(AppConfig::load(Some(file.path())).is_err());
}

fn env(vars: &[(&str, &str)]) -> Option<config::Map<String, String>> {
	Some(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
}

#[test]
fn environment_overrides_file() {
	let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
	write!(file, "user_agent = \"from-file\"\n\n[flood]\nthreshold = 8\ngroup = \"flood\"\n").unwrap();

	let config = AppConfig::load_with_env(
		Some(file.path()),
		env(&[
			("COPYBLOCK_FLOOD__THRESHOLD", "20"),
			("COPYBLOCK_USER_AGENT", "from-env"),
			("COPYBLOCK_CREDENTIALS__USERNAME", "CopyBot@copyblock"),
			("COPYBLOCK_CREDENTIALS__PASSWORD", "s3cret"),
		]),
	)
	.unwrap();

	assert_eq!(config.flood.threshold, 20);
	assert_eq!(config.user_agent, "from-env");
	assert_eq!(config.flood.group, "flood");
	let creds = config.credentials.unwrap();
	assert_eq!(creds.username, "CopyBot@copyblock");
	assert_eq!(creds.password, "s3cret");
}

#[test]
fn environment_needs_single_underscore_after_prefix() {
	let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();

	let config = AppConfig::load_with_env(Some(file.path()), env(&[("COPYBLOCK__FLOOD__THRESHOLD", "20"), ("OTHER_FLOOD__THRESHOLD", "30")])).unwrap();

	assert_eq!(config.flood.threshold, 5);
}
