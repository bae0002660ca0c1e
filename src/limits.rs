//! The `olcLimits` grammar, which applies size and time limits to a subset
//! of the directory's users:
//!
//! ```text
//! limits   ::= ('{' INT '}')? selector limit (' ' limit)*
//! selector ::= '*' | 'anonymous' | 'users' | dnspec '=' pattern | group '=' pattern
//! dnspec   ::= 'dn' ('.self' | '.this')? ('.' style)?
//! style    ::= 'exact' | 'base' | 'one' | 'onelevel' | 'sub' | 'subtree'
//!            | 'children' | 'regex' | 'anonymous'
//! group    ::= 'group' ('/' OBJECTCLASS ('/' ATTRIBUTETYPE)?)?
//! pattern  ::= '"' REGEX '"'
//! limit    ::= 'time' timeLimit | 'size' sizeLimit
//! ```
use std::{fmt, str::FromStr};

use crate::{
	error::ParseError,
	size_limit::{self, SizeLimit},
	text::{ordering_prefix, string_serde, strip_prefix_ci, tokens},
	time_limit::{self, TimeLimit},
};

/// Which part of a DN selector's pattern is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnType {
	/// `.self`: the DN of the bound user
	SelfDn,
	/// `.this`: the DN of the target entry
	This,
}

impl DnType {
	/// Name as it appears after `dn.`
	#[must_use]
	pub fn name(self) -> &'static str {
		match self {
			Self::SelfDn => "self",
			Self::This => "this",
		}
	}
}

/// How the pattern of a DN selector is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnStyle {
	/// `exact`
	Exact,
	/// `base`, a synonym of `exact`
	Base,
	/// `one` / `onelevel`
	OneLevel,
	/// `sub` / `subtree`
	Subtree,
	/// `children`
	Children,
	/// `regex`
	Regex,
	/// `anonymous`
	Anonymous,
}

impl DnStyle {
	/// Spellings accepted on input, longest first so that prefixes don't
	/// shadow longer names.
	const SPELLINGS: [(&'static str, Self); 9] = [
		("onelevel", Self::OneLevel),
		("subtree", Self::Subtree),
		("children", Self::Children),
		("anonymous", Self::Anonymous),
		("exact", Self::Exact),
		("regex", Self::Regex),
		("base", Self::Base),
		("one", Self::OneLevel),
		("sub", Self::Subtree),
	];

	/// Canonical name
	#[must_use]
	pub fn name(self) -> &'static str {
		match self {
			Self::Exact => "exact",
			Self::Base => "base",
			Self::OneLevel => "onelevel",
			Self::Subtree => "subtree",
			Self::Children => "children",
			Self::Regex => "regex",
			Self::Anonymous => "anonymous",
		}
	}
}

/// Who a set of limits applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
	/// `*`: everybody
	Any,
	/// `anonymous`: unauthenticated clients
	Anonymous,
	/// `users`: authenticated clients
	Users,
	/// `dn…="pattern"`
	Dn {
		/// `.self` or `.this`
		dn_type: Option<DnType>,
		/// How the pattern is matched
		style: Option<DnStyle>,
		/// The pattern, without the surrounding quotes
		pattern: String,
	},
	/// `group[/objectClass[/attributeType]]="pattern"`
	Group {
		/// Object class of the group entry
		object_class: Option<String>,
		/// Member attribute of the group entry
		attribute_type: Option<String>,
		/// The group DN pattern, without the surrounding quotes
		pattern: String,
	},
}

/// One `olcLimits` value.
///
/// Clauses are collected into a [`TimeLimit`] and a [`SizeLimit`], so two
/// values that list the same clauses in another order compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Limits {
	/// The `{N}` ordering prefix of the value, if any
	pub index: Option<u32>,
	/// Who the limits apply to
	pub selector: Selector,
	/// Time limits
	pub time: TimeLimit,
	/// Size limits
	pub size: SizeLimit,
}

/// Cursor over the input used while parsing the selector
#[derive(Debug)]
struct Cursor<'a> {
	/// The whole value
	input: &'a str,
	/// Current offset
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Unconsumed input
	fn rest(&self) -> &'a str {
		&self.input[self.pos..]
	}

	/// Consume `token` (ignoring ASCII case) if it comes next
	fn eat(&mut self, token: &str) -> bool {
		match self.rest().get(..token.len()) {
			Some(head) if head.eq_ignore_ascii_case(token) => {
				self.pos += token.len();
				true
			}
			_ => false,
		}
	}

	/// Consume a run of characters legal in an object class or attribute
	/// name
	fn name(&mut self) -> Option<&'a str> {
		let rest = self.rest();
		let len = rest
			.find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ';')))
			.unwrap_or(rest.len());
		self.pos += len;
		(len > 0).then(|| &rest[..len])
	}

	/// An error at the current position
	fn error(&self, message: impl Into<String>) -> ParseError {
		ParseError::invalid(message).at(self.pos)
	}

	/// Whether the selector keyword ends here
	fn at_boundary(&self) -> bool {
		self.rest().chars().next().map_or(true, |c| c.is_ascii_whitespace())
	}

	/// `'=' '"' pattern '"'`. `\"` inside the pattern does not terminate it.
	fn pattern(&mut self) -> Result<String, ParseError> {
		if !self.eat("=") {
			return Err(self.error("Expected '=' before the selector pattern"));
		}
		if !self.eat("\"") {
			return Err(self.error("Expected '\"' to start the selector pattern"));
		}
		let rest = self.rest();
		let mut escaped = false;
		for (offset, c) in rest.char_indices() {
			match c {
				'\\' => escaped = !escaped,
				'"' if !escaped => {
					self.pos += offset + 1;
					return Ok(rest[..offset].to_owned());
				}
				_ => escaped = false,
			}
		}
		Err(ParseError::invalid("Unterminated selector pattern").at(self.input.len()))
	}
}

impl Limits {
	/// Create limits for a selector with no clauses yet
	#[must_use]
	pub fn new(selector: Selector) -> Self {
		Self { index: None, selector, time: TimeLimit::default(), size: SizeLimit::default() }
	}

	/// Whether the limits are complete enough to be written back: at least
	/// one clause, each of them valid
	#[must_use]
	pub fn is_valid(&self) -> bool {
		!(self.time.is_empty() && self.size.is_empty())
			&& self.time.is_valid()
			&& self.size.is_valid()
	}

	/// Parse the selector
	fn parse_selector(cursor: &mut Cursor<'_>) -> Result<Selector, ParseError> {
		let start = cursor.pos;
		for (keyword, selector) in
			[("*", Selector::Any), ("anonymous", Selector::Anonymous), ("users", Selector::Users)]
		{
			if cursor.eat(keyword) {
				if cursor.at_boundary() {
					return Ok(selector);
				}
				cursor.pos = start;
			}
		}

		if cursor.eat("dn") {
			let dn_type = if cursor.eat(".self") {
				Some(DnType::SelfDn)
			} else if cursor.eat(".this") {
				Some(DnType::This)
			} else {
				None
			};
			let mut style = None;
			if cursor.eat(".") {
				style = DnStyle::SPELLINGS
					.iter()
					.find(|(name, _)| cursor.eat(name))
					.map(|(_, style)| *style);
				if style.is_none() {
					return Err(cursor.error("Unknown DN style"));
				}
			}
			let pattern = cursor.pattern()?;
			return Ok(Selector::Dn { dn_type, style, pattern });
		}

		if cursor.eat("group") {
			let mut object_class = None;
			let mut attribute_type = None;
			if cursor.eat("/") {
				object_class = Some(cursor.name().ok_or_else(|| cursor.error("Missing objectClass"))?);
				if cursor.eat("/") {
					attribute_type =
						Some(cursor.name().ok_or_else(|| cursor.error("Missing attributeType"))?);
				}
			}
			let pattern = cursor.pattern()?;
			return Ok(Selector::Group {
				object_class: object_class.map(str::to_owned),
				attribute_type: attribute_type.map(str::to_owned),
				pattern,
			});
		}

		Err(cursor.error("Unknown limits selector"))
	}
}

impl Limits {
	/// Parse with errors positioned by byte offset
	fn scan(s: &str) -> Result<Self, ParseError> {
		let (index, prefix) = ordering_prefix(s)?;
		let mut cursor = Cursor { input: s, pos: prefix };
		let selector = Self::parse_selector(&mut cursor)?;
		let mut limits = Self { index, ..Self::new(selector) };

		let offset = cursor.pos;
		let mut clauses = 0;
		for (pos, clause) in tokens(cursor.rest()) {
			let result = if strip_prefix_ci(clause, time_limit::KEYWORD).is_some() {
				limits.time.apply_clause(clause)
			} else if strip_prefix_ci(clause, size_limit::KEYWORD).is_some() {
				limits.size.apply_clause(clause)
			} else {
				Err(ParseError::invalid(format!("Expected a time or size limit, found '{clause}'")))
			};
			result.map_err(|err| err.shifted(offset + pos))?;
			clauses += 1;
		}
		if clauses == 0 {
			return Err(ParseError::invalid("At least one limit is required").at(s.len()));
		}
		Ok(limits)
	}
}

impl FromStr for Limits {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::scan(s).map_err(|err| err.in_chars(s))
	}
}

impl fmt::Display for Selector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Any => f.write_str("*"),
			Self::Anonymous => f.write_str("anonymous"),
			Self::Users => f.write_str("users"),
			Self::Dn { dn_type, style, pattern } => {
				f.write_str("dn")?;
				if let Some(dn_type) = dn_type {
					write!(f, ".{}", dn_type.name())?;
				}
				if let Some(style) = style {
					write!(f, ".{}", style.name())?;
				}
				write!(f, "=\"{pattern}\"")
			}
			Self::Group { object_class, attribute_type, pattern } => {
				f.write_str("group")?;
				if let Some(object_class) = object_class {
					write!(f, "/{object_class}")?;
					if let Some(attribute_type) = attribute_type {
						write!(f, "/{attribute_type}")?;
					}
				}
				write!(f, "=\"{pattern}\"")
			}
		}
	}
}

impl fmt::Display for Limits {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let Some(index) = self.index {
			write!(f, "{{{index}}}")?;
		}
		write!(f, "{}", self.selector)?;
		if !self.time.is_empty() {
			write!(f, " {}", self.time)?;
		}
		if !self.size.is_empty() {
			write!(f, " {}", self.size)?;
		}
		Ok(())
	}
}

string_serde!(Limits);
