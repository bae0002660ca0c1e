//! The `olcSyncrepl` consumer stanza and the colon separated time values it
//! uses.
//!
//! ```text
//! stanza ::= ('{' INT '}')? option (WSP+ option)*
//! option ::= 'attrsonly' | key WSP* '=' WSP* value
//! value  ::= '"' ([^"] | '\"')* '"' | "'" ([^'] | "\'")* "'" | [^ WSP]+
//! ```
use std::{fmt, str::FromStr};

use url::Url;

use crate::{
	error::ParseError,
	limit::{LimitKind, LimitValue},
	retry::Retry,
	sasl::SaslSecProps,
	text::{ordering_prefix, parse_bounded, string_serde},
};

/// Split on `:` and remember where every field starts
fn fields(s: &str) -> Vec<(usize, &str)> {
	let mut start = 0;
	s.split(':')
		.map(|field| {
			let entry = (start, field);
			start += field.len() + 1;
			entry
		})
		.collect()
}

/// Parse one field no larger than `max`
fn field(entry: (usize, &str), what: &str, max: u64) -> Result<u32, ParseError> {
	let (pos, text) = entry;
	let value = parse_bounded(text, what, max).map_err(|err| err.shifted(pos))?;
	u32::try_from(value).map_err(|_| ParseError::out_of_range(format!("{what} too large")).at(pos))
}

/// The `interval` of a `refreshOnly` consumer, `dd:hh:mm:ss`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Interval {
	/// Days
	pub days: u32,
	/// Hours, 0 to 23
	pub hours: u32,
	/// Minutes, 0 to 59
	pub minutes: u32,
	/// Seconds, 0 to 59
	pub seconds: u32,
}

impl Interval {
	/// The interval as a duration
	#[must_use]
	pub fn to_duration(&self) -> time::Duration {
		time::Duration::seconds(
			i64::from(self.days) * 86_400
				+ i64::from(self.hours) * 3_600
				+ i64::from(self.minutes) * 60
				+ i64::from(self.seconds),
		)
	}
}

impl Interval {
	/// Accepts `dd:hh:mm:ss` and the shorter `hh:mm:ss`.
	pub(crate) fn scan(s: &str) -> Result<Self, ParseError> {
		let fields = fields(s);
		let (days, rest) = match fields.len() {
			4 => (field(fields[0], "days", 99_999)?, &fields[1..]),
			3 => (0, &fields[..]),
			_ => {
				return Err(ParseError::invalid(format!(
					"Interval '{s}' must have the form dd:hh:mm:ss"
				))
				.at(0))
			}
		};
		Ok(Self {
			days,
			hours: field(rest[0], "hours", 23)?,
			minutes: field(rest[1], "minutes", 59)?,
			seconds: field(rest[2], "seconds", 59)?,
		})
	}
}

impl FromStr for Interval {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::scan(s).map_err(|err| err.in_chars(s))
	}
}

impl fmt::Display for Interval {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:02}:{:02}:{:02}:{:02}", self.days, self.hours, self.minutes, self.seconds)
	}
}

string_serde!(Interval);

/// TCP keepalive settings, `idle:probes:interval`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KeepAlive {
	/// Seconds a connection must be idle before probes are sent
	pub idle: u32,
	/// Unanswered probes before the connection is dropped
	pub probes: u32,
	/// Seconds between probes
	pub interval: u32,
}

impl KeepAlive {
	/// Parse with errors positioned by byte offset
	pub(crate) fn scan(s: &str) -> Result<Self, ParseError> {
		let fields = fields(s);
		if fields.len() != 3 {
			return Err(ParseError::invalid(format!(
				"Keepalive '{s}' must have the form idle:probes:interval"
			))
			.at(0));
		}
		let max = u64::from(u32::MAX);
		Ok(Self {
			idle: field(fields[0], "idle", max)?,
			probes: field(fields[1], "probes", max)?,
			interval: field(fields[2], "interval", max)?,
		})
	}
}

impl FromStr for KeepAlive {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::scan(s).map_err(|err| err.in_chars(s))
	}
}

impl fmt::Display for KeepAlive {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}:{}", self.idle, self.probes, self.interval)
	}
}

string_serde!(KeepAlive);

/// Declares an enum of option keywords
macro_rules! keywords {
	(
		$(#[$meta:meta])*
		$name:ident { $($(#[$variant_meta:meta])* $variant:ident => $keyword:literal,)+ }
	) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		pub enum $name {
			$($(#[$variant_meta])* $variant,)+
		}

		impl $name {
			/// Keyword as written in the stanza
			#[must_use]
			pub fn name(self) -> &'static str {
				match self {
					$(Self::$variant => $keyword,)+
				}
			}

			/// Look a keyword up, ignoring case
			fn from_name(name: &str) -> Option<Self> {
				[$(Self::$variant,)+]
					.into_iter()
					.find(|value| name.eq_ignore_ascii_case(value.name()))
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(self.name())
			}
		}
	};
}

keywords! {
	/// `type`: how the consumer synchronizes
	SyncType {
		/// `refreshOnly`: poll the provider every `interval`
		RefreshOnly => "refreshOnly",
		/// `refreshAndPersist`: keep a persistent search open
		RefreshAndPersist => "refreshAndPersist",
	}
}

keywords! {
	/// `scope` of the replicated search
	SearchScope {
		/// `sub`
		Subtree => "sub",
		/// `one`
		OneLevel => "one",
		/// `base`
		Base => "base",
		/// `subord`
		Subordinate => "subord",
	}
}

keywords! {
	/// `bindmethod`
	BindMethod {
		/// `simple`
		Simple => "simple",
		/// `sasl`
		Sasl => "sasl",
	}
}

keywords! {
	/// `starttls`
	StartTls {
		/// `yes`: fall back to a plain connection if StartTLS fails
		Yes => "yes",
		/// `critical`: give up if StartTLS fails
		Critical => "critical",
	}
}

keywords! {
	/// `tls_reqcert`
	TlsReqCert {
		/// `never`
		Never => "never",
		/// `allow`
		Allow => "allow",
		/// `try`
		Try => "try",
		/// `demand`
		Demand => "demand",
	}
}

keywords! {
	/// `tls_crlcheck`
	TlsCrlCheck {
		/// `none`
		None => "none",
		/// `peer`
		Peer => "peer",
		/// `all`
		All => "all",
	}
}

keywords! {
	/// `syncdata`: the log the provider keeps for delta-syncrepl
	SyncData {
		/// `default`: plain syncrepl
		Default => "default",
		/// `accesslog`
		AccessLog => "accesslog",
		/// `changelog`
		ChangeLog => "changelog",
	}
}

/// The flag option, the only one without a value
const ATTRS_ONLY: &str = "attrsonly";

/// Largest replica ID
const MAX_RID: u32 = 999;

/// One `olcSyncrepl` value: a consumer of a provider's content.
///
/// Every option is optional here; slapd requires at least `rid`, `provider`
/// and `searchbase` before it accepts the stanza.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncRepl {
	/// The `{N}` ordering prefix of the value, if any
	pub index: Option<u32>,
	/// `rid`: replica ID, 0 to 999
	pub rid: Option<u32>,
	/// `provider`: `ldap`, `ldaps` or `ldapi` URL
	pub provider: Option<Url>,
	/// `searchbase`
	pub search_base: Option<String>,
	/// `filter`
	pub filter: Option<String>,
	/// `scope`
	pub scope: Option<SearchScope>,
	/// `attrs`
	pub attrs: Vec<String>,
	/// `attrsonly`
	pub attrs_only: bool,
	/// `sizelimit`
	pub size_limit: Option<LimitValue>,
	/// `timelimit`
	pub time_limit: Option<LimitValue>,
	/// `type`
	pub sync_type: Option<SyncType>,
	/// `interval`
	pub interval: Option<Interval>,
	/// `retry`
	pub retry: Option<Retry>,
	/// `schemachecking`
	pub schema_checking: Option<bool>,
	/// `network-timeout`, in seconds
	pub network_timeout: Option<u32>,
	/// `timeout`, in seconds
	pub timeout: Option<u32>,
	/// `bindmethod`
	pub bind_method: Option<BindMethod>,
	/// `binddn`
	pub bind_dn: Option<String>,
	/// `saslmech`
	pub sasl_mech: Option<String>,
	/// `authcid`
	pub authc_id: Option<String>,
	/// `authzid`
	pub authz_id: Option<String>,
	/// `credentials`
	pub credentials: Option<String>,
	/// `realm`
	pub realm: Option<String>,
	/// `secprops`
	pub sec_props: Option<SaslSecProps>,
	/// `keepalive`
	pub keep_alive: Option<KeepAlive>,
	/// `starttls`
	pub start_tls: Option<StartTls>,
	/// `tls_cert`
	pub tls_cert: Option<String>,
	/// `tls_key`
	pub tls_key: Option<String>,
	/// `tls_cacert`
	pub tls_cacert: Option<String>,
	/// `tls_cacertdir`
	pub tls_cacertdir: Option<String>,
	/// `tls_reqcert`
	pub tls_reqcert: Option<TlsReqCert>,
	/// `tls_ciphersuite`
	pub tls_ciphersuite: Option<String>,
	/// `tls_crlcheck`
	pub tls_crlcheck: Option<TlsCrlCheck>,
	/// `logbase`
	pub log_base: Option<String>,
	/// `logfilter`
	pub log_filter: Option<String>,
	/// `syncdata`
	pub sync_data: Option<SyncData>,
}

/// Cursor over a stanza
#[derive(Debug)]
struct Cursor<'a> {
	/// The whole stanza
	input: &'a str,
	/// Current offset
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Unconsumed input
	fn rest(&self) -> &'a str {
		&self.input[self.pos..]
	}

	/// An error at the current position
	fn error(&self, message: impl Into<String>) -> ParseError {
		ParseError::invalid(message).at(self.pos)
	}

	/// Skip whitespace, including line breaks. Returns whether input is left.
	fn skip_space(&mut self) -> bool {
		let rest = self.rest();
		let trimmed = rest.trim_start_matches(|c: char| c.is_ascii_whitespace());
		self.pos += rest.len() - trimmed.len();
		!trimmed.is_empty()
	}

	/// Consume `c` if it comes next
	fn eat(&mut self, c: char) -> bool {
		let found = self.rest().starts_with(c);
		if found {
			self.pos += c.len_utf8();
		}
		found
	}

	/// An option name, up to whitespace or `=`
	fn key(&mut self) -> &'a str {
		let rest = self.rest();
		let len = rest.find(|c: char| c == '=' || c.is_ascii_whitespace()).unwrap_or(rest.len());
		self.pos += len;
		&rest[..len]
	}

	/// A quoted or bare value together with the offset its text starts at
	fn value(&mut self) -> Result<(usize, String), ParseError> {
		let rest = self.rest();
		let quote = match rest.chars().next() {
			Some(quote @ ('"' | '\'')) => quote,
			Some(_) => {
				let len = rest.find(|c: char| c.is_ascii_whitespace()).unwrap_or(rest.len());
				let start = self.pos;
				self.pos += len;
				return Ok((start, rest[..len].to_owned()));
			}
			None => return Err(self.error("Missing option value")),
		};

		let start = self.pos + 1;
		let mut value = String::new();
		let mut chars = rest[1..].char_indices();
		while let Some((offset, c)) = chars.next() {
			if c == quote {
				self.pos = start + offset + 1;
				if self.rest().starts_with(|c: char| !c.is_ascii_whitespace()) {
					return Err(self.error("Expected whitespace after a quoted value"));
				}
				return Ok((start, value));
			}
			value.push(c);
			if c == '\\' {
				if let Some((_, next)) = chars.next() {
					if next == quote {
						value.pop();
					}
					value.push(next);
				}
			}
		}
		Err(ParseError::invalid("Unterminated quoted value").at(start - 1))
	}
}

/// Parse an integer option no larger than `max`
fn number(value: &str, what: &str, max: u32) -> Result<u32, ParseError> {
	let value = parse_bounded(value, what, u64::from(max))?;
	u32::try_from(value).map_err(|_| ParseError::out_of_range(format!("{what} too large")).at(0))
}

/// Parse a keyword option with the lookup of its enum
fn keyword<T>(value: &str, lookup: fn(&str) -> Option<T>, what: &str) -> Result<T, ParseError> {
	lookup(value).ok_or_else(|| ParseError::invalid(format!("Unknown {what} '{value}'")).at(0))
}

/// `on` or `off`
fn on_off(value: &str) -> Result<bool, ParseError> {
	if value.eq_ignore_ascii_case("on") {
		Ok(true)
	} else if value.eq_ignore_ascii_case("off") {
		Ok(false)
	} else {
		Err(ParseError::invalid(format!("Expected 'on' or 'off', found '{value}'")).at(0))
	}
}

/// An LDAP URL
fn provider(value: &str) -> Result<Url, ParseError> {
	let url = Url::parse(value)
		.map_err(|err| ParseError::invalid(format!("Invalid provider URL: {err}")).at(0))?;
	if matches!(url.scheme(), "ldap" | "ldaps" | "ldapi") {
		Ok(url)
	} else {
		let scheme = url.scheme();
		Err(ParseError::invalid(format!("Unsupported provider scheme '{scheme}'")).at(0))
	}
}

/// Comma separated attribute names
fn attrs(value: &str) -> Vec<String> {
	value.split(',').map(str::trim).filter(|attr| !attr.is_empty()).map(str::to_owned).collect()
}

impl SyncRepl {
	/// Set one option from its value. Returns whether `key` names an option;
	/// errors are positioned relative to the value.
	fn set(&mut self, key: &str, value: &str) -> Result<bool, ParseError> {
		let text = || Some(value.to_owned());
		match key.to_ascii_lowercase().as_str() {
			"rid" => self.rid = Some(number(value, "rid", MAX_RID)?),
			"provider" => self.provider = Some(provider(value)?),
			"searchbase" => self.search_base = text(),
			"filter" => self.filter = text(),
			"scope" => self.scope = Some(keyword(value, SearchScope::from_name, "scope")?),
			"attrs" => self.attrs = attrs(value),
			"sizelimit" => self.size_limit = Some(LimitValue::parse_for(LimitKind::Global, value)?),
			"timelimit" => self.time_limit = Some(LimitValue::parse_for(LimitKind::Global, value)?),
			"type" => self.sync_type = Some(keyword(value, SyncType::from_name, "type")?),
			"interval" => self.interval = Some(Interval::scan(value)?),
			"retry" => self.retry = Some(Retry::scan(value)?),
			"schemachecking" => self.schema_checking = Some(on_off(value)?),
			"network-timeout" => {
				self.network_timeout = Some(number(value, "network-timeout", u32::MAX)?);
			}
			"timeout" => self.timeout = Some(number(value, "timeout", u32::MAX)?),
			"bindmethod" => {
				self.bind_method = Some(keyword(value, BindMethod::from_name, "bind method")?);
			}
			"binddn" => self.bind_dn = text(),
			"saslmech" => self.sasl_mech = text(),
			"authcid" => self.authc_id = text(),
			"authzid" => self.authz_id = text(),
			"credentials" => self.credentials = text(),
			"realm" => self.realm = text(),
			"secprops" => self.sec_props = Some(SaslSecProps::scan(value)?),
			"keepalive" => self.keep_alive = Some(KeepAlive::scan(value)?),
			"starttls" => self.start_tls = Some(keyword(value, StartTls::from_name, "starttls")?),
			"tls_cert" => self.tls_cert = text(),
			"tls_key" => self.tls_key = text(),
			"tls_cacert" => self.tls_cacert = text(),
			"tls_cacertdir" => self.tls_cacertdir = text(),
			"tls_reqcert" => {
				self.tls_reqcert = Some(keyword(value, TlsReqCert::from_name, "tls_reqcert")?);
			}
			"tls_ciphersuite" => self.tls_ciphersuite = text(),
			"tls_crlcheck" => {
				self.tls_crlcheck = Some(keyword(value, TlsCrlCheck::from_name, "tls_crlcheck")?);
			}
			"logbase" => self.log_base = text(),
			"logfilter" => self.log_filter = text(),
			"syncdata" => self.sync_data = Some(keyword(value, SyncData::from_name, "syncdata")?),
			_ => return Ok(false),
		}
		Ok(true)
	}

	/// Parse with errors positioned by byte offset
	fn scan(s: &str) -> Result<Self, ParseError> {
		let (index, prefix) = ordering_prefix(s)?;
		let mut cursor = Cursor { input: s, pos: prefix };
		let mut stanza = Self { index, ..Self::default() };

		let mut options = 0;
		while cursor.skip_space() {
			let key_pos = cursor.pos;
			let key = cursor.key();
			if key.is_empty() {
				return Err(cursor.error("Expected an option name"));
			}
			options += 1;
			if key.eq_ignore_ascii_case(ATTRS_ONLY) {
				stanza.attrs_only = true;
				continue;
			}

			cursor.skip_space();
			if !cursor.eat('=') {
				return Err(cursor.error(format!("Expected '=' after '{key}'")));
			}
			cursor.skip_space();
			let (value_pos, value) = cursor.value()?;
			if !stanza.set(key, &value).map_err(|err| err.shifted(value_pos))? {
				return Err(
					ParseError::invalid(format!("Unknown syncrepl option '{key}'")).at(key_pos)
				);
			}
		}
		if options == 0 {
			return Err(ParseError::invalid("Empty syncrepl stanza").at(s.len()));
		}
		Ok(stanza)
	}
}

impl FromStr for SyncRepl {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::scan(s).map_err(|err| err.in_chars(s))
	}
}

/// A value in double quotes
fn quoted(value: &str) -> String {
	format!("\"{}\"", value.replace('"', "\\\""))
}

impl fmt::Display for SyncRepl {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		/// An option printed as is
		fn plain(key: &str, value: Option<impl fmt::Display>) -> Option<String> {
			value.map(|value| format!("{key}={value}"))
		}
		/// An option printed in quotes
		fn text(key: &str, value: Option<&String>) -> Option<String> {
			value.map(|value| format!("{key}={}", quoted(value)))
		}

		let attrs = (!self.attrs.is_empty()).then(|| self.attrs.join(","));
		let options = [
			plain("rid", self.rid.map(|rid| format!("{rid:03}"))),
			plain("provider", self.provider.as_ref()),
			text("searchbase", self.search_base.as_ref()),
			text("filter", self.filter.as_ref()),
			plain("scope", self.scope),
			text("attrs", attrs.as_ref()),
			self.attrs_only.then(|| ATTRS_ONLY.to_owned()),
			plain("sizelimit", self.size_limit),
			plain("timelimit", self.time_limit),
			plain("type", self.sync_type),
			plain("interval", self.interval),
			plain(
				"retry",
				self.retry
					.as_ref()
					.filter(|retry| !retry.is_empty())
					.map(|retry| quoted(&retry.to_string())),
			),
			plain("schemachecking", self.schema_checking.map(|on| if on { "on" } else { "off" })),
			plain("network-timeout", self.network_timeout),
			plain("timeout", self.timeout),
			plain("bindmethod", self.bind_method),
			text("binddn", self.bind_dn.as_ref()),
			text("saslmech", self.sasl_mech.as_ref()),
			text("authcid", self.authc_id.as_ref()),
			text("authzid", self.authz_id.as_ref()),
			text("credentials", self.credentials.as_ref()),
			text("realm", self.realm.as_ref()),
			plain("secprops", self.sec_props.as_ref().filter(|props| !props.is_empty())),
			plain("keepalive", self.keep_alive),
			plain("starttls", self.start_tls),
			text("tls_cert", self.tls_cert.as_ref()),
			text("tls_key", self.tls_key.as_ref()),
			text("tls_cacert", self.tls_cacert.as_ref()),
			text("tls_cacertdir", self.tls_cacertdir.as_ref()),
			plain("tls_reqcert", self.tls_reqcert),
			text("tls_ciphersuite", self.tls_ciphersuite.as_ref()),
			plain("tls_crlcheck", self.tls_crlcheck),
			text("logbase", self.log_base.as_ref()),
			text("logfilter", self.log_filter.as_ref()),
			plain("syncdata", self.sync_data),
		];

		if let Some(index) = self.index {
			write!(f, "{{{index}}}")?;
		}
		let options: Vec<String> = options.into_iter().flatten().collect();
		f.write_str(&options.join(" "))
	}
}

string_serde!(SyncRepl);
