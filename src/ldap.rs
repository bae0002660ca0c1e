//! Client for reading and writing slapd configuration over LDAP

use std::fmt::Display;

use ldap3::{LdapConnAsync, Mod, Scope, SearchEntry};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{
	config::Config,
	error::Error,
	global::{DatabaseConfig, GlobalConfig, DATABASE_ATTRIBUTES, GLOBAL_ATTRIBUTES},
};

/// Reads and modifies the configuration backend of an LDAP server.
#[derive(Debug, Clone)]
pub struct Client {
	/// The configuration of the LDAP client.
	config: Config,
}

/// A bound connection and the task driving it
struct Session {
	/// The operation handle
	ldap: ldap3::Ldap,
	/// The background task driving the connection
	conn: JoinHandle<()>,
}

impl Client {
	/// Create a new [`Client`] with the given configuration.
	#[must_use]
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// The configuration this client was created with
	#[must_use]
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Create a connection to an ldap server based on the settings and url
	/// specified in the configuration, and bind to it.
	async fn connect(&self) -> Result<Session, Error> {
		let settings = self.config.connection.to_settings();
		let (conn, mut ldap) =
			LdapConnAsync::from_url_with_settings(settings, &self.config.url).await?;
		let conn = tokio::spawn(async move {
			if let Err(err) = conn.drive().await {
				warn!("Ldap connection error {err}");
			}
		});

		ldap.with_timeout(self.config.connection.operation_timeout)
			.simple_bind(&self.config.bind_dn, &self.config.bind_password)
			.await?
			.success()?;
		Ok(Session { ldap, conn })
	}

	/// Read an entry below the configuration root, `dn` relative to it.
	/// An empty `dn` reads the root itself.
	pub async fn read_entry(&self, dn: &str, attributes: &[&str]) -> Result<SearchEntry, Error> {
		let dn = self.absolute(dn);
		let mut session = self.connect().await?;
		let (entries, _res) = session
			.ldap
			.with_timeout(self.config.connection.operation_timeout)
			.search(&dn, Scope::Base, "(objectClass=*)", attributes.to_vec())
			.await?
			.success()?;
		session.close().await?;

		let entry = entries.into_iter().next().ok_or_else(|| Error::Missing(dn.clone()))?;
		debug!("Read configuration entry {dn}");
		Ok(SearchEntry::construct(entry))
	}

	/// Read and parse the global settings
	pub async fn read_global(&self) -> Result<GlobalConfig, Error> {
		let entry = self.read_entry("", &GLOBAL_ATTRIBUTES).await?;
		GlobalConfig::from_search(&entry)
	}

	/// Read and parse the settings of a database, e.g. `olcDatabase={1}mdb`
	pub async fn read_database(&self, dn: &str) -> Result<DatabaseConfig, Error> {
		let entry = self.read_entry(dn, &DATABASE_ATTRIBUTES).await?;
		DatabaseConfig::from_search(&entry)
	}

	/// Replace every value of `attribute` in the entry `dn` (relative to the
	/// configuration root) with the canonical form of `values`. No values
	/// removes the attribute.
	pub async fn replace<T: Display + Sync>(
		&self,
		dn: &str,
		attribute: &str,
		values: &[T],
	) -> Result<(), Error> {
		let values = values.iter().map(ToString::to_string).collect();
		self.modify(dn, vec![Mod::Replace(attribute.to_owned(), values)]).await
	}

	/// Write the global settings back, replacing every attribute they cover
	pub async fn write_global(&self, global: &GlobalConfig) -> Result<(), Error> {
		self.modify("", global.modifications()).await
	}

	/// Write the settings of a database back
	pub async fn write_database(&self, dn: &str, database: &DatabaseConfig) -> Result<(), Error> {
		self.modify(dn, database.modifications()).await
	}

	/// Apply modifications to an entry relative to the configuration root
	async fn modify(&self, dn: &str, mods: Vec<Mod<String>>) -> Result<(), Error> {
		let dn = self.absolute(dn);
		if mods.is_empty() {
			debug!("Nothing to modify in {dn}");
			return Ok(());
		}
		let mut session = self.connect().await?;
		session
			.ldap
			.with_timeout(self.config.connection.operation_timeout)
			.modify(&dn, mods)
			.await?
			.success()?;
		debug!("Modified configuration entry {dn}");
		session.close().await
	}

	/// Make a DN relative to the configuration root absolute
	fn absolute(&self, dn: &str) -> String {
		if dn.is_empty() {
			self.config.config_base.clone()
		} else {
			format!("{dn},{}", self.config.config_base)
		}
	}
}

impl Session {
	/// Unbind and wait for the connection to wind down
	async fn close(mut self) -> Result<(), Error> {
		self.ldap.unbind().await?;
		if let Err(err) = self.conn.await {
			warn!("Failed to join background task: {err}");
		}
		Ok(())
	}
}

impl std::fmt::Debug for Session {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Session").finish_non_exhaustive()
	}
}
