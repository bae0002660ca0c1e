//! Parse, validate and serialize the values of an OpenLDAP slapd
//! configuration.
//!
//! slapd stores its settings as attributes of entries below `cn=config`, and
//! many of those attributes hold small strings with a grammar of their own:
//! `size.soft=100 size.hard=unlimited`, `noplain,noanonymous,minssf=56`,
//! `60 10 300 +`, `7+00:00 01:00`, whole `syncrepl` stanzas. Each grammar is
//! modelled as a type that implements [`FromStr`](std::str::FromStr) and
//! [`Display`](std::fmt::Display): parsing is atomic and reports a
//! [`ParseError`] with the offending character position, and displaying
//! produces the canonical form slapd accepts back. All value types
//! (de)serialize through that canonical form with serde.
//!
//! For a general primer on LDAP, the [introduction] in the `ldap3` crate which
//! is used here for interfacing with LDAP is an excellent resource. The
//! [`ldap`] module talks to a live server to read and replace these values.
//!
//! [introduction]: https://github.com/inejge/ldap3/blob/master/LDAP-primer.md
//!
//! # Getting started
//! ```
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use slapd_config::{LimitValue, SizeLimit};
//!
//! let mut limit: SizeLimit = "size.soft=100 size.hard=unlimited".parse()?;
//! assert_eq!(limit.soft, Some(LimitValue::Value(100)));
//! limit.soft = Some(LimitValue::Value(500));
//! assert_eq!(limit.to_string(), "size.soft=500 size.hard=unlimited");
//!
//! let err = "size.soft=-5".parse::<SizeLimit>().unwrap_err();
//! assert_eq!(err.position, Some(10));
//! # Ok(())
//! # }
//! ```
//!
//! Reading the global settings of a server:
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use url::Url;
//! use slapd_config::{Client, Config, ConnectionConfig};
//!
//! let client = Client::new(Config {
//!     url: Url::parse("ldap://localhost")?,
//!     connection: ConnectionConfig::default(),
//!     bind_dn: "cn=admin,cn=config".to_owned(),
//!     bind_password: "verysecret".to_owned(),
//!     config_base: "cn=config".to_owned(),
//! });
//! let mut global = client.read_global().await?;
//! global.time_limit = Some("time.soft=10 time.hard=soft".parse()?);
//! client.write_global(&global).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Limitations
//! * Only the value grammars listed in the module index are understood; other
//!   attributes are left to the caller as raw strings.
//! * Values are rewritten in their canonical form, so comments and unusual
//!   spacing in the original value are not preserved.

pub mod config;
pub mod edit;
pub mod entry;
pub mod error;
pub mod global;
pub mod index;
pub mod ldap;
pub mod limit;
pub mod limits;
pub mod log_level;
pub mod retry;
pub mod sasl;
pub mod server_id;
pub mod size_limit;
pub mod ssf;
pub mod syncrepl;
pub mod tcp_buffer;
mod text;
pub mod time_limit;
pub mod timespan;
pub mod unix_permissions;

pub use ldap3::{self, SearchEntry};

pub use crate::{
	config::{Config, ConnectionConfig, TlsConfig},
	edit::{LimitEditor, LimitIntent, SaslIntent, SaslSecPropsEditor, SaslValue},
	entry::SearchEntryExt,
	error::{Error, ErrorKind, ParseError},
	global::{DatabaseConfig, GlobalConfig},
	index::{DbIndex, IndexAttributes, IndexType},
	ldap::Client,
	limit::{LimitKind, LimitValue},
	limits::{DnStyle, DnType, Limits, Selector},
	log_level::LogLevel,
	retry::{Retry, RetryCount, RetryPair},
	sasl::{SaslFlag, SaslSecProps},
	server_id::ServerId,
	size_limit::SizeLimit,
	ssf::{Security, Ssf, SsfFeature, SsfStrength},
	syncrepl::{
		BindMethod, Interval, KeepAlive, SearchScope, StartTls, SyncData, SyncRepl, SyncType,
		TlsCrlCheck, TlsReqCert,
	},
	tcp_buffer::{TcpBuffer, TcpDirection},
	time_limit::TimeLimit,
	timespan::{AccessLogPurge, TimeSpan},
	unix_permissions::UnixPermissions,
};
