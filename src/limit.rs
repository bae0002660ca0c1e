//! A single limit value which is either a number or one of the reserved
//! keywords `slapd` understands in its size and time limit clauses.
use std::{fmt, str::FromStr};

use crate::{
	error::ParseError,
	text::{string_serde, strip_prefix_ci},
};

/// Keyword for [`LimitValue::Unlimited`]
pub const UNLIMITED: &str = "unlimited";
/// Alternative input keyword for [`LimitValue::Unlimited`]
pub const NONE: &str = "none";
/// Keyword for [`LimitValue::Disabled`]
pub const DISABLED: &str = "disabled";
/// Keyword for [`LimitValue::Soft`]
pub const SOFT: &str = "soft";
/// Keyword for [`LimitValue::Hard`]
pub const HARD: &str = "hard";

/// A limit, either an integer or a sentinel.
///
/// Values compare by what they resolve to: `none`, `unlimited` and `-1` are
/// all [`LimitValue::Unlimited`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitValue {
	/// No limit at all
	Unlimited,
	/// The check is switched off
	Disabled,
	/// Use the soft limit
	Soft,
	/// Use the hard limit
	Hard,
	/// A concrete limit
	Value(u32),
}

impl LimitValue {
	/// Parse a raw limit. Keywords are matched ignoring case; `-1` is the
	/// numeric spelling of unlimited and anything lower is rejected.
	pub fn parse(raw: &str) -> Result<Self, ParseError> {
		let keyword = [
			(UNLIMITED, Self::Unlimited),
			(NONE, Self::Unlimited),
			(DISABLED, Self::Disabled),
			(SOFT, Self::Soft),
			(HARD, Self::Hard),
		]
		.into_iter()
		.find(|(keyword, _)| raw.eq_ignore_ascii_case(keyword));
		if let Some((_, value)) = keyword {
			return Ok(value);
		}

		let digits = raw.strip_prefix('-').unwrap_or(raw);
		if digits.is_empty() {
			return Err(ParseError::invalid("Missing limit value").at(0));
		}
		if let Some(pos) = digits.find(|c: char| !c.is_ascii_digit()) {
			let pos = pos + raw.len() - digits.len();
			return Err(ParseError::invalid(format!("Invalid limit value '{raw}'")).at(pos));
		}
		match raw.parse::<i64>() {
			Ok(-1) => Ok(Self::Unlimited),
			Ok(value) if value < -1 => {
				Err(ParseError::out_of_range("A limit must be -1 (unlimited) or positive").at(0))
			}
			Ok(value) => u32::try_from(value).map(Self::Value).map_err(|_| {
				ParseError::out_of_range(format!("A limit may not exceed {}", u32::MAX)).at(0)
			}),
			Err(_) => Err(ParseError::out_of_range(format!("Limit '{raw}' is too large")).at(0)),
		}
	}

	/// Parse a raw limit and check that `kind` accepts it.
	pub fn parse_for(kind: LimitKind, raw: &str) -> Result<Self, ParseError> {
		let value = Self::parse(raw)?;
		if kind.accepts(value) {
			Ok(value)
		} else {
			Err(ParseError::invalid(format!("'{raw}' is not allowed for the {kind} limit")).at(0))
		}
	}

	/// The integer, if this is a concrete limit
	#[must_use]
	pub fn value(self) -> Option<u32> {
		match self {
			Self::Value(value) => Some(value),
			_ => None,
		}
	}
}

impl FromStr for LimitValue {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s).map_err(|err| err.in_chars(s))
	}
}

impl From<u32> for LimitValue {
	fn from(value: u32) -> Self {
		Self::Value(value)
	}
}

impl fmt::Display for LimitValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Unlimited => f.write_str(UNLIMITED),
			Self::Disabled => f.write_str(DISABLED),
			Self::Soft => f.write_str(SOFT),
			Self::Hard => f.write_str(HARD),
			Self::Value(value) => write!(f, "{value}"),
		}
	}
}

string_serde!(LimitValue);

/// The slot a limit value is stored in, which decides which sentinels are
/// legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitKind {
	/// `size=` / `time=`
	Global,
	/// `.soft=`
	Soft,
	/// `.hard=`
	Hard,
	/// `size.unchecked=`
	Unchecked,
	/// `size.pr=`
	Pr,
	/// `size.prtotal=`
	PrTotal,
}

impl LimitKind {
	/// The text between the `size`/`time` keyword and the `=`
	#[must_use]
	pub fn selector(self) -> &'static str {
		match self {
			Self::Global => "",
			Self::Soft => ".soft",
			Self::Hard => ".hard",
			Self::Unchecked => ".unchecked",
			Self::Pr => ".pr",
			Self::PrTotal => ".prtotal",
		}
	}

	/// Whether a value may be stored in this slot
	#[must_use]
	pub fn accepts(self, value: LimitValue) -> bool {
		match value {
			LimitValue::Unlimited | LimitValue::Value(_) => true,
			LimitValue::Soft => self == Self::Hard,
			LimitValue::Disabled => matches!(self, Self::Unchecked | Self::Pr | Self::PrTotal),
			LimitValue::Hard => self == Self::PrTotal,
		}
	}
}

impl fmt::Display for LimitKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Global => "global",
			Self::Soft => "soft",
			Self::Hard => "hard",
			Self::Unchecked => "unchecked",
			Self::Pr => "pr",
			Self::PrTotal => "prtotal",
		})
	}
}

/// One `keyword[.sub]=value` clause split into its parts.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Clause<'a> {
	/// Everything between the keyword and the `=`, e.g. `.soft`
	pub(crate) selector: &'a str,
	/// The raw value after the `=`
	pub(crate) value: &'a str,
	/// Offset of the value within the clause
	pub(crate) value_offset: usize,
}

impl<'a> Clause<'a> {
	/// Split a clause that must start with `keyword`
	pub(crate) fn split(clause: &'a str, keyword: &str) -> Result<Self, ParseError> {
		let rest = strip_prefix_ci(clause, keyword).ok_or_else(|| {
			ParseError::invalid(format!("Expected a '{keyword}' limit, found '{clause}'")).at(0)
		})?;
		let eq = rest.find('=').ok_or_else(|| {
			ParseError::invalid(format!("Missing '=' in '{clause}'")).at(clause.len())
		})?;
		Ok(Self {
			selector: &rest[..eq],
			value: &rest[eq + 1..],
			value_offset: keyword.len() + eq + 1,
		})
	}

	/// Resolve the selector against the kinds a grammar supports
	pub(crate) fn kind(&self, supported: &[LimitKind]) -> Result<LimitKind, ParseError> {
		supported
			.iter()
			.copied()
			.find(|kind| self.selector.eq_ignore_ascii_case(kind.selector()))
			.ok_or_else(|| {
				ParseError::invalid(format!("Unknown limit selector '{}'", self.selector))
			})
	}

	/// Parse the value for `kind`, positioning errors within the clause
	pub(crate) fn value_for(&self, kind: LimitKind) -> Result<LimitValue, ParseError> {
		LimitValue::parse_for(kind, self.value).map_err(|err| err.shifted(self.value_offset))
	}
}
