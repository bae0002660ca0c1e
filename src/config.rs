//! Config for the LDAP client.
use std::time::Duration;

use ldap3::LdapConnSettings;
use serde::{Deserialize, Serialize};
use url::Url;

/// DN of the root of the slapd configuration backend
pub const CONFIG_BASE: &str = "cn=config";

/// LDAP configuration.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Config {
	/// The URL to connect to the server with. Supports ldap, ldaps, and ldapi
	/// schemes
	pub url: Url,
	/// Connection settings.
	#[serde(default)]
	pub connection: ConnectionConfig,
	/// The DN to bind as, usually the `olcRootDN` of the config database
	pub bind_dn: String,
	/// The password for the bind DN
	pub bind_password: String,
	/// DN of the entry holding the global settings
	#[serde(default = "default_config_base")]
	pub config_base: String,
}

/// Default for [`Config::config_base`]
fn default_config_base() -> String {
	CONFIG_BASE.to_owned()
}

/// Configuration for how to connect to the LDAP server
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConnectionConfig {
	/// Timeout to establish a connection in seconds.
	pub timeout: u64,

	/// LDAP operation timeout.
	pub operation_timeout: Duration,

	/// TLS config
	#[serde(default)]
	pub tls: TlsConfig,
}

impl Default for ConnectionConfig {
	fn default() -> Self {
		Self { timeout: 5, operation_timeout: Duration::from_secs(30), tls: TlsConfig::default() }
	}
}

/// TLS Configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TlsConfig {
	/// Use StartTLS extended operation for establishing a secure connection,
	/// rather than TLS on a dedicated port.
	#[serde(default)]
	pub starttls: bool,

	/// Disable verification of TLS certificates
	#[serde(default)]
	pub no_tls_verify: bool,
}

impl ConnectionConfig {
	/// Create a [`LdapConnSettings`] based on this [`ConnectionConfig`]
	#[must_use]
	pub(crate) fn to_settings(&self) -> LdapConnSettings {
		LdapConnSettings::new()
			.set_conn_timeout(Duration::from_secs(self.timeout))
			.set_starttls(self.tls.starttls)
			.set_no_tls_verify(self.tls.no_tls_verify)
	}
}
