//! TCP buffer sizes (`olcTCPBuffer`): `[listener=<URL>] [{read|write}=]<size>`
use std::{fmt, str::FromStr};

use url::Url;

use crate::{
	error::ParseError,
	text::{parse_bounded, string_serde, strip_prefix_ci, tokens},
};

/// Largest buffer size, 2^32 - 1
pub const MAX_TCP_BUFFER_SIZE: u64 = 4_294_967_295;

/// Which buffer of the socket is sized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TcpDirection {
	/// The receive buffer
	Read,
	/// The send buffer
	Write,
}

impl TcpDirection {
	/// The keyword for this direction
	#[must_use]
	pub fn name(self) -> &'static str {
		match self {
			Self::Read => "read",
			Self::Write => "write",
		}
	}
}

/// A TCP buffer size, optionally restricted to one listener and one
/// direction. Without a direction both buffers are sized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TcpBuffer {
	/// The listener the size applies to; all listeners if not set
	pub listener: Option<Url>,
	/// The buffer that is sized; both if not set
	pub direction: Option<TcpDirection>,
	/// Buffer size in bytes
	pub size: u32,
}

impl TcpBuffer {
	/// Check a size and listener as typed by a user, without building a
	/// value.
	#[must_use]
	pub fn is_valid(size: &str, listener: &str) -> bool {
		let size_ok = parse_bounded(size.trim(), "size", MAX_TCP_BUFFER_SIZE).is_ok();
		let listener_ok = listener.trim().is_empty() || Url::parse(listener.trim()).is_ok();
		size_ok && listener_ok
	}
}

impl TcpBuffer {
	/// Parse with errors positioned by byte offset
	fn scan(s: &str) -> Result<Self, ParseError> {
		let mut tokens = tokens(s).peekable();
		let mut listener = None;
		if let Some((pos, token)) = tokens.peek().copied() {
			if let Some(url) = strip_prefix_ci(token, "listener=") {
				let url = Url::parse(url).map_err(|err| {
					ParseError::invalid(format!("Invalid listener URL: {err}")).at(pos + 9)
				})?;
				listener = Some(url);
				tokens.next();
			}
		}

		let (pos, token) =
			tokens.next().ok_or_else(|| ParseError::invalid("Missing buffer size").at(s.len()))?;
		if let Some((extra, _)) = tokens.next() {
			return Err(ParseError::invalid("Unexpected text after the buffer size").at(extra));
		}

		let (direction, size, size_pos) = if let Some(size) = strip_prefix_ci(token, "read=") {
			(Some(TcpDirection::Read), size, pos + 5)
		} else if let Some(size) = strip_prefix_ci(token, "write=") {
			(Some(TcpDirection::Write), size, pos + 6)
		} else {
			(None, token, pos)
		};
		let size = parse_bounded(size, "buffer size", MAX_TCP_BUFFER_SIZE)
			.map_err(|err| err.shifted(size_pos))?;
		let size = u32::try_from(size)
			.map_err(|_| ParseError::out_of_range("Buffer size too large").at(size_pos))?;
		Ok(Self { listener, direction, size })
	}
}

impl FromStr for TcpBuffer {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::scan(s).map_err(|err| err.in_chars(s))
	}
}

impl fmt::Display for TcpBuffer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let Some(listener) = &self.listener {
			write!(f, "listener={listener} ")?;
		}
		if let Some(direction) = self.direction {
			write!(f, "{}=", direction.name())?;
		}
		write!(f, "{}", self.size)
	}
}

string_serde!(TcpBuffer);
