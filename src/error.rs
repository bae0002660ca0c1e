//! Error codes

use std::fmt;

/// What went wrong while parsing a configuration value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// The string does not follow the grammar of the value.
	InvalidFormat,
	/// A numeric component was outside the bounds of its field.
	OutOfRange,
}

/// A configuration value could not be parsed.
///
/// Parsing is atomic: when this is returned no part of the input was
/// accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
	/// The category of the failure
	pub kind: ErrorKind,
	/// A human readable description of the failure
	pub message: String,
	/// Character offset in the input where the failure was detected, if known
	pub position: Option<usize>,
}

impl ParseError {
	/// A structurally malformed string.
	pub(crate) fn invalid(message: impl Into<String>) -> Self {
		Self { kind: ErrorKind::InvalidFormat, message: message.into(), position: None }
	}

	/// A numeric value outside its bounds.
	pub(crate) fn out_of_range(message: impl Into<String>) -> Self {
		Self { kind: ErrorKind::OutOfRange, message: message.into(), position: None }
	}

	/// Attach the offset at which the failure was detected
	#[must_use]
	pub(crate) fn at(mut self, position: usize) -> Self {
		self.position = Some(position);
		self
	}

	/// Shift the recorded position by `offset`, used when a sub-parser works
	/// on a slice of a larger input.
	#[must_use]
	pub(crate) fn shifted(mut self, offset: usize) -> Self {
		self.position = Some(self.position.unwrap_or(0) + offset);
		self
	}

	/// Turn a byte offset into `input` into a character offset. Parsers track
	/// byte offsets and convert once, where the input enters through
	/// `FromStr`.
	#[must_use]
	pub(crate) fn in_chars(mut self, input: &str) -> Self {
		if let Some(byte) = self.position {
			self.position =
				Some(input.char_indices().take_while(|&(offset, _)| offset < byte).count());
		}
		self
	}
}

impl fmt::Display for ParseError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.position {
			Some(position) => write!(f, "{} at position {position}", self.message),
			None => f.write_str(&self.message),
		}
	}
}

impl std::error::Error for ParseError {}

/// Errors that can occur when using this library
#[derive(thiserror::Error, Debug)]
pub enum Error {
	/// A required attribute in a configuration entry was missing.
	#[error("Missing attribute {0}")]
	Missing(String),
	/// The contents of an attribute did not conform to the expected syntax.
	#[error("Malformed value for {attribute}: {source}")]
	Parse {
		/// Name of the attribute holding the value
		attribute: String,
		/// The underlying parse failure
		#[source]
		source: ParseError,
	},
	/// An underlying protocol error or similar occurred, or the LDAP library
	/// was used incorrectly.
	#[error(transparent)]
	Ldap(#[from] ldap3::LdapError),
}
