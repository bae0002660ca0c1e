//! The settings held by the `cn=config` entry and by database entries below
//! it.
use std::collections::HashSet;

use ldap3::{Mod, SearchEntry};
use serde::{Deserialize, Serialize};

use crate::{
	entry::SearchEntryExt,
	error::Error,
	index::DbIndex,
	limits::Limits,
	log_level::LogLevel,
	sasl::SaslSecProps,
	server_id::ServerId,
	size_limit::SizeLimit,
	ssf::Security,
	syncrepl::SyncRepl,
	tcp_buffer::TcpBuffer,
	time_limit::TimeLimit,
	unix_permissions::UnixPermissions,
};

/// Attribute holding the size limit
pub const SIZE_LIMIT: &str = "olcSizeLimit";
/// Attribute holding the time limit
pub const TIME_LIMIT: &str = "olcTimeLimit";
/// Attribute holding the SASL security properties
pub const SASL_SEC_PROPS: &str = "olcSaslSecProps";
/// Attribute holding the TCP buffer sizes
pub const TCP_BUFFER: &str = "olcTCPBuffer";
/// Attribute holding the server IDs
pub const SERVER_ID: &str = "olcServerID";
/// Attribute holding the security strength factors
pub const SECURITY: &str = "olcSecurity";
/// Attribute holding per-requester limits of a database
pub const LIMITS: &str = "olcLimits";
/// Attribute holding the indices of a database
pub const DB_INDEX: &str = "olcDbIndex";
/// Attribute holding the log levels
pub const LOG_LEVEL: &str = "olcLogLevel";
/// Attribute holding the permissions of a database's files
pub const DB_MODE: &str = "olcDbMode";
/// Attribute holding the replication consumers of a database
pub const SYNCREPL: &str = "olcSyncrepl";

/// Every attribute read by [`GlobalConfig::from_search`]
pub const GLOBAL_ATTRIBUTES: [&str; 7] =
	[SIZE_LIMIT, TIME_LIMIT, SASL_SEC_PROPS, TCP_BUFFER, SERVER_ID, SECURITY, LOG_LEVEL];

/// Every attribute read by [`DatabaseConfig::from_search`]
pub const DATABASE_ATTRIBUTES: [&str; 6] =
	[SIZE_LIMIT, TIME_LIMIT, LIMITS, DB_INDEX, DB_MODE, SYNCREPL];

/// The parsed global settings of a slapd instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
	/// `olcSizeLimit`
	pub size_limit: Option<SizeLimit>,
	/// `olcTimeLimit`
	pub time_limit: Option<TimeLimit>,
	/// `olcSaslSecProps`
	pub sasl_sec_props: Option<SaslSecProps>,
	/// `olcTCPBuffer`
	#[serde(default)]
	pub tcp_buffers: Vec<TcpBuffer>,
	/// `olcServerID`
	#[serde(default)]
	pub server_ids: Vec<ServerId>,
	/// `olcSecurity`
	pub security: Option<Security>,
	/// `olcLogLevel`, every value combined
	pub log_level: Option<LogLevel>,
}

impl GlobalConfig {
	/// Parse the settings from a search result for the config entry. Absent
	/// attributes are left unset; a malformed value fails the whole entry.
	pub fn from_search(entry: &SearchEntry) -> Result<Self, Error> {
		Ok(Self {
			size_limit: entry.parse_first(SIZE_LIMIT).transpose()?,
			time_limit: entry.parse_first(TIME_LIMIT).transpose()?,
			sasl_sec_props: entry.parse_first(SASL_SEC_PROPS).transpose()?,
			tcp_buffers: entry.parse_all(TCP_BUFFER)?,
			server_ids: entry.parse_all(SERVER_ID)?,
			security: entry.parse_first(SECURITY).transpose()?,
			log_level: entry
				.parse_all::<LogLevel>(LOG_LEVEL)?
				.into_iter()
				.reduce(|levels, level| levels | level),
		})
	}

	/// Modifications replacing each attribute that holds a value here.
	/// Unset and empty values are left alone on the server; use
	/// [`Client::replace`](crate::ldap::Client::replace) with no values to
	/// remove an attribute.
	#[must_use]
	pub fn modifications(&self) -> Vec<Mod<String>> {
		let mut mods = Vec::new();
		replace(&mut mods, SIZE_LIMIT, self.size_limit.iter().filter(|limit| !limit.is_empty()));
		replace(&mut mods, TIME_LIMIT, self.time_limit.iter().filter(|limit| !limit.is_empty()));
		replace(
			&mut mods,
			SASL_SEC_PROPS,
			self.sasl_sec_props.iter().filter(|props| !props.is_empty()),
		);
		replace(&mut mods, TCP_BUFFER, &self.tcp_buffers);
		replace(&mut mods, SERVER_ID, &self.server_ids);
		replace(
			&mut mods,
			SECURITY,
			self.security.iter().filter(|security| !security.requirements().is_empty()),
		);
		replace(&mut mods, LOG_LEVEL, self.log_level.iter().flat_map(|level| level.values()));
		mods
	}
}

/// The settings of one database entry, e.g. `olcDatabase={1}mdb,cn=config`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
	/// `olcSizeLimit`
	pub size_limit: Option<SizeLimit>,
	/// `olcTimeLimit`
	pub time_limit: Option<TimeLimit>,
	/// `olcLimits`, in their configured order
	#[serde(default)]
	pub limits: Vec<Limits>,
	/// `olcDbIndex`
	#[serde(default)]
	pub indices: Vec<DbIndex>,
	/// `olcDbMode`
	pub mode: Option<UnixPermissions>,
	/// `olcSyncrepl`, in their configured order
	#[serde(default)]
	pub syncrepl: Vec<SyncRepl>,
}

impl DatabaseConfig {
	/// Parse the settings from a search result for a database entry
	pub fn from_search(entry: &SearchEntry) -> Result<Self, Error> {
		let mut limits: Vec<Limits> = entry.parse_all(LIMITS)?;
		limits.sort_by_key(|limits| limits.index);
		let mut syncrepl: Vec<SyncRepl> = entry.parse_all(SYNCREPL)?;
		syncrepl.sort_by_key(|stanza| stanza.index);

		Ok(Self {
			size_limit: entry.parse_first(SIZE_LIMIT).transpose()?,
			time_limit: entry.parse_first(TIME_LIMIT).transpose()?,
			limits,
			indices: entry.parse_all(DB_INDEX)?,
			mode: entry.parse_first(DB_MODE).transpose()?,
			syncrepl,
		})
	}

	/// Modifications replacing each attribute that holds a value here. The
	/// limits and syncrepl stanzas are renumbered in their current order.
	#[must_use]
	pub fn modifications(&self) -> Vec<Mod<String>> {
		let limits = self.limits.iter().zip(0..).map(|(limits, index)| Limits {
			index: Some(index),
			..limits.clone()
		});
		let syncrepl = self
			.syncrepl
			.iter()
			.zip(0..)
			.map(|(stanza, index)| SyncRepl { index: Some(index), ..stanza.clone() });

		let mut mods = Vec::new();
		replace(&mut mods, SIZE_LIMIT, self.size_limit.iter().filter(|limit| !limit.is_empty()));
		replace(&mut mods, TIME_LIMIT, self.time_limit.iter().filter(|limit| !limit.is_empty()));
		replace(&mut mods, LIMITS, limits);
		replace(&mut mods, DB_INDEX, &self.indices);
		replace(&mut mods, DB_MODE, &self.mode);
		replace(&mut mods, SYNCREPL, syncrepl);
		mods
	}
}

/// Push a replace modification with the canonical form of each value, if
/// there are any
fn replace<T: ToString>(
	mods: &mut Vec<Mod<String>>,
	attribute: &str,
	values: impl IntoIterator<Item = T>,
) {
	let values: HashSet<String> = values.into_iter().map(|value| value.to_string()).collect();
	if !values.is_empty() {
		mods.push(Mod::Replace(attribute.to_owned(), values));
	}
}

#[cfg(test)]
mod tests {
	#![allow(clippy::unwrap_used)]

	use std::collections::{HashMap, HashSet};

	use ldap3::{Mod, SearchEntry};

	use super::{
		DatabaseConfig, GlobalConfig, DB_INDEX, DB_MODE, LIMITS, LOG_LEVEL, SERVER_ID, SIZE_LIMIT,
		SYNCREPL, TIME_LIMIT,
	};
	use crate::{
		error::Error, limit::LimitValue, log_level::LogLevel, sasl::SaslFlag, time_limit::TimeLimit,
	};

	fn config_entry(attrs: &[(&str, &[&str])]) -> SearchEntry {
		SearchEntry {
			dn: String::from("cn=config"),
			attrs: attrs
				.iter()
				.map(|(name, values)| {
					((*name).to_owned(), values.iter().map(|v| (*v).to_owned()).collect())
				})
				.collect(),
			bin_attrs: HashMap::default(),
		}
	}

	fn replaced(mods: &[Mod<String>], name: &str) -> Option<HashSet<String>> {
		mods.iter().find_map(|m| match m {
			Mod::Replace(attr, values) if attr == name => Some(values.clone()),
			_ => None,
		})
	}

	#[test]
	fn global_from_search() -> Result<(), Box<dyn std::error::Error>> {
		let entry = config_entry(&[
			("olcSizeLimit", &["size.soft=100 size.hard=unlimited"]),
			("olcSaslSecProps", &["noplain,noanonymous,minssf=56"]),
			("olcServerID", &["1 ldap://a.example.com", "2 ldap://b.example.com"]),
			("olcSecurity", &["ssf=128"]),
			("olcLogLevel", &["stats", "Sync"]),
		]);
		let config = GlobalConfig::from_search(&entry)?;

		let size = config.size_limit.unwrap();
		assert_eq!(size.soft, Some(LimitValue::Value(100)));
		assert_eq!(size.hard, Some(LimitValue::Unlimited));
		assert_eq!(config.time_limit, None);
		assert!(config.sasl_sec_props.unwrap().has_flag(SaslFlag::NoPlain));
		assert_eq!(config.server_ids.len(), 2);
		assert!(config.tcp_buffers.is_empty());
		assert_eq!(config.log_level, Some(LogLevel::STATS | LogLevel::SYNC));
		Ok(())
	}

	#[test]
	fn malformed_value_fails() {
		let entry = config_entry(&[("olcTimeLimit", &["time=forever"])]);
		assert!(matches!(
			GlobalConfig::from_search(&entry),
			Err(Error::Parse { attribute, .. }) if attribute == TIME_LIMIT
		));
	}

	#[test]
	fn global_modifications() -> Result<(), Box<dyn std::error::Error>> {
		let config = GlobalConfig {
			size_limit: Some("size=unlimited".parse()?),
			time_limit: Some(TimeLimit::default()),
			server_ids: vec!["0x1 ldap://a.example.com".parse()?],
			log_level: Some("0x4100".parse()?),
			..GlobalConfig::default()
		};

		let mods = config.modifications();
		assert_eq!(mods.len(), 3);
		assert_eq!(
			replaced(&mods, LOG_LEVEL),
			Some(HashSet::from(["stats".to_owned(), "sync".to_owned()]))
		);
		assert_eq!(replaced(&mods, SIZE_LIMIT), Some(HashSet::from(["size=unlimited".to_owned()])));
		assert_eq!(replaced(&mods, TIME_LIMIT), None);
		assert_eq!(
			replaced(&mods, SERVER_ID),
			Some(HashSet::from(["1 ldap://a.example.com".to_owned()]))
		);
		Ok(())
	}

	#[test]
	fn database_limits_are_ordered() -> Result<(), Box<dyn std::error::Error>> {
		let entry = config_entry(&[
			("olcLimits", &["{1}anonymous time=10", "{0}users size=500"]),
			("olcDbIndex", &["objectClass eq", "cn,sn eq,sub"]),
			("olcDbMode", &["0600"]),
			(
				"olcSyncrepl",
				&[
					"{1}rid=002 provider=ldap://b.example.com searchbase=\"dc=example,dc=org\"",
					"{0}rid=001 provider=ldap://a.example.com searchbase=\"dc=example,dc=org\"",
				],
			),
		]);
		let mut config = DatabaseConfig::from_search(&entry)?;
		assert_eq!(config.limits[0].to_string(), "{0}users size=500");
		assert_eq!(config.limits[1].to_string(), "{1}anonymous time=10");
		assert_eq!(config.indices.len(), 2);
		assert_eq!(config.mode.map(|mode| mode.mode()), Some(0o600));
		assert_eq!(config.syncrepl[0].rid, Some(1));
		assert_eq!(config.syncrepl[1].rid, Some(2));

		config.limits.swap(0, 1);
		config.syncrepl.remove(0);
		let mods = config.modifications();
		assert_eq!(
			replaced(&mods, LIMITS),
			Some(HashSet::from(["{0}anonymous time=10".to_owned(), "{1}users size=500".to_owned()]))
		);
		assert_eq!(replaced(&mods, DB_INDEX).map(|values| values.len()), Some(2));
		assert_eq!(replaced(&mods, SIZE_LIMIT), None);
		assert_eq!(replaced(&mods, DB_MODE), Some(HashSet::from(["0600".to_owned()])));
		assert_eq!(
			replaced(&mods, SYNCREPL),
			Some(HashSet::from([
				"{0}rid=002 provider=ldap://b.example.com searchbase=\"dc=example,dc=org\"".to_owned()
			]))
		);
		Ok(())
	}
}
