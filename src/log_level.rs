//! `olcLogLevel`: the subsystems slapd writes debug output for.
//!
//! Levels are given by name, as decimal or as `0x` hexadecimal integers, and
//! are OR-ed together: `stats sync`, `256 0x4000`.
use std::{fmt, ops::BitOr, str::FromStr};

use crate::{
	error::ParseError,
	text::{string_serde, tokens},
};

/// A set of log levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LogLevel(u32);

impl LogLevel {
	/// `none`: no debug output
	pub const NONE: Self = Self(0);
	/// `trace`: function calls
	pub const TRACE: Self = Self(1);
	/// `packets`: packet handling
	pub const PACKETS: Self = Self(2);
	/// `args`: heavy trace debugging
	pub const ARGS: Self = Self(4);
	/// `conns`: connection management
	pub const CONNS: Self = Self(8);
	/// `BER`: packets sent and received
	pub const BER: Self = Self(16);
	/// `filter`: search filter processing
	pub const FILTER: Self = Self(32);
	/// `config`: configuration processing
	pub const CONFIG: Self = Self(64);
	/// `ACL`: access control list processing
	pub const ACL: Self = Self(128);
	/// `stats`: connections, operations and results
	pub const STATS: Self = Self(256);
	/// `stats2`: entries sent
	pub const STATS2: Self = Self(512);
	/// `shell`: communication with shell backends
	pub const SHELL: Self = Self(1024);
	/// `parse`: entry parsing
	pub const PARSE: Self = Self(2048);
	/// `sync`: syncrepl consumer processing
	pub const SYNC: Self = Self(16384);
	/// `any`: every level
	pub const ANY: Self = Self(u32::MAX);

	/// Named levels in the order they are printed
	const NAMES: [(&'static str, Self); 13] = [
		("acl", Self::ACL),
		("args", Self::ARGS),
		("ber", Self::BER),
		("config", Self::CONFIG),
		("conns", Self::CONNS),
		("filter", Self::FILTER),
		("packets", Self::PACKETS),
		("parse", Self::PARSE),
		("shell", Self::SHELL),
		("stats", Self::STATS),
		("stats2", Self::STATS2),
		("sync", Self::SYNC),
		("trace", Self::TRACE),
	];

	/// A set from its integer form
	#[must_use]
	pub fn from_bits(bits: u32) -> Self {
		Self(bits)
	}

	/// The integer form
	#[must_use]
	pub fn bits(self) -> u32 {
		self.0
	}

	/// Whether every level of `other` is in the set
	#[must_use]
	pub fn contains(self, other: Self) -> bool {
		self.0 & other.0 == other.0
	}

	/// Add the levels of `other`
	pub fn insert(&mut self, other: Self) {
		self.0 |= other.0;
	}

	/// Remove the levels of `other`
	pub fn remove(&mut self, other: Self) {
		self.0 &= !other.0;
	}

	/// One attribute value per level, the way slapd lists them
	#[must_use]
	pub fn values(self) -> Vec<String> {
		match self {
			Self::NONE => return vec!["none".to_owned()],
			Self::ANY => return vec!["any".to_owned()],
			_ => {}
		}
		let mut rest = self;
		let mut values = Vec::new();
		for (name, level) in Self::NAMES {
			if self.contains(level) {
				values.push(name.to_owned());
				rest.remove(level);
			}
		}
		if rest != Self::NONE {
			values.push(format!("{:#x}", rest.0));
		}
		values
	}

	/// Parse one name or integer
	fn level(token: &str) -> Result<Self, ParseError> {
		match token.to_ascii_lowercase().as_str() {
			"none" => return Ok(Self::NONE),
			"any" | "-1" => return Ok(Self::ANY),
			_ => {}
		}
		let named = Self::NAMES.iter().find(|(name, _)| token.eq_ignore_ascii_case(name));
		if let Some((_, level)) = named {
			return Ok(*level);
		}

		let (digits, radix, offset) = match token.get(..2) {
			Some(prefix) if prefix.eq_ignore_ascii_case("0x") => (&token[2..], 16, 2),
			_ => (token, 10, 0),
		};
		let is_digit = |c: char| c.is_digit(radix);
		if digits.is_empty() || !token.starts_with(|c: char| c.is_ascii_digit()) {
			return Err(ParseError::invalid(format!("Unknown log level '{token}'")).at(0));
		}
		if let Some(pos) = digits.find(|c: char| !is_digit(c)) {
			return Err(ParseError::invalid(format!("Invalid log level '{token}'")).at(offset + pos));
		}
		u32::from_str_radix(digits, radix)
			.map(Self)
			.map_err(|_| ParseError::out_of_range(format!("Log level '{token}' is too large")).at(0))
	}
}

impl BitOr for LogLevel {
	type Output = Self;

	fn bitor(self, rhs: Self) -> Self {
		Self(self.0 | rhs.0)
	}
}

impl FromStr for LogLevel {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		tokens(s)
			.try_fold(Self::NONE, |levels, (pos, token)| -> Result<Self, ParseError> {
				Ok(levels | Self::level(token).map_err(|err| err.shifted(pos))?)
			})
			.map_err(|err| err.in_chars(s))
	}
}

impl fmt::Display for LogLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.values().join(" "))
	}
}

string_serde!(LogLevel);
