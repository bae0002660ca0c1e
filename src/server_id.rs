//! Server IDs (`olcServerID`): `<id> [<URL>]`, used by multi-provider
//! replication.
use std::{fmt, str::FromStr};

use url::Url;

use crate::{
	error::ParseError,
	text::{parse_bounded, string_serde, tokens},
};

/// Largest server ID slapd accepts
pub const MAX_SERVER_ID: u16 = 4095;

/// A server ID, optionally bound to the URL of one of the server's listeners
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerId {
	/// The ID, 0 to 4095
	pub id: u16,
	/// Listener URL identifying this server
	pub url: Option<Url>,
}

impl ServerId {
	/// Create a server ID, checking its range
	pub fn new(id: u16, url: Option<Url>) -> Result<Self, ParseError> {
		if id > MAX_SERVER_ID {
			return Err(ParseError::out_of_range(format!(
				"Server ID must be between 0 and {MAX_SERVER_ID}"
			)));
		}
		Ok(Self { id, url })
	}
}

/// Parse the ID, in decimal or with a `0x` prefix in hexadecimal
fn parse_id(token: &str) -> Result<u16, ParseError> {
	let max = u64::from(MAX_SERVER_ID);
	let id = match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
		Some(hex) => {
			if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
				return Err(ParseError::invalid(format!("Invalid server ID '{token}'")).at(0));
			}
			let value = u64::from_str_radix(hex, 16)
				.map_err(|_| ParseError::invalid(format!("Invalid server ID '{token}'")).at(0))?;
			if value > max {
				return Err(ParseError::out_of_range(format!(
					"Server ID must be between 0 and {MAX_SERVER_ID}"
				))
				.at(0));
			}
			value
		}
		None => parse_bounded(token, "server ID", max)?,
	};
	u16::try_from(id).map_err(|_| ParseError::out_of_range("Server ID too large").at(0))
}

impl ServerId {
	/// Parse with errors positioned by byte offset
	fn scan(s: &str) -> Result<Self, ParseError> {
		let mut tokens = tokens(s);
		let (id_pos, id) =
			tokens.next().ok_or_else(|| ParseError::invalid("Missing server ID").at(0))?;
		let id = parse_id(id).map_err(|err| err.shifted(id_pos))?;
		let url = match tokens.next() {
			Some((pos, url)) => Some(Url::parse(url).map_err(|err| {
				ParseError::invalid(format!("Invalid server URL: {err}")).at(pos)
			})?),
			None => None,
		};
		if let Some((pos, _)) = tokens.next() {
			return Err(ParseError::invalid("Unexpected text after the server URL").at(pos));
		}
		Ok(Self { id, url })
	}
}

impl FromStr for ServerId {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::scan(s).map_err(|err| err.in_chars(s))
	}
}

impl fmt::Display for ServerId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.id)?;
		if let Some(url) = &self.url {
			write!(f, " {url}")?;
		}
		Ok(())
	}
}

string_serde!(ServerId);
