//! Database indices (`olcDbIndex`): `attr[,attr...] [type[,type...]]` or
//! `default type[,type...]`.
use std::{fmt, str::FromStr};

use crate::{
	error::ParseError,
	text::{string_serde, tokens},
};

/// An index type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
	/// `pres`: presence
	Presence,
	/// `eq`: equality
	Equality,
	/// `approx`: approximate match
	Approx,
	/// `sub`: all substring kinds
	Substring,
	/// `subinitial`
	SubInitial,
	/// `subany`
	SubAny,
	/// `subfinal`
	SubFinal,
	/// `nosubtypes`
	NoSubtypes,
	/// `notags`
	NoTags,
	/// `nolang`
	NoLang,
}

impl IndexType {
	/// Every index type
	pub const ALL: [Self; 10] = [
		Self::Presence,
		Self::Equality,
		Self::Approx,
		Self::Substring,
		Self::SubInitial,
		Self::SubAny,
		Self::SubFinal,
		Self::NoSubtypes,
		Self::NoTags,
		Self::NoLang,
	];

	/// Keyword of the type
	#[must_use]
	pub fn name(self) -> &'static str {
		match self {
			Self::Presence => "pres",
			Self::Equality => "eq",
			Self::Approx => "approx",
			Self::Substring => "sub",
			Self::SubInitial => "subinitial",
			Self::SubAny => "subany",
			Self::SubFinal => "subfinal",
			Self::NoSubtypes => "nosubtypes",
			Self::NoTags => "notags",
			Self::NoLang => "nolang",
		}
	}
}

/// The attributes an index is defined on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexAttributes {
	/// `default`: the types used when an attribute lists none
	Default,
	/// A list of attribute names
	List(Vec<String>),
}

/// One `olcDbIndex` value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DbIndex {
	/// Indexed attributes
	pub attributes: IndexAttributes,
	/// Index types, empty to use the default
	pub types: Vec<IndexType>,
}

impl DbIndex {
	/// Parse with errors positioned by byte offset
	fn scan(s: &str) -> Result<Self, ParseError> {
		let mut tokens = tokens(s);
		let (attrs_pos, attrs) =
			tokens.next().ok_or_else(|| ParseError::invalid("Missing index attributes").at(0))?;

		let attributes = if attrs.eq_ignore_ascii_case("default") {
			IndexAttributes::Default
		} else {
			let mut names = Vec::new();
			let mut offset = attrs_pos;
			for name in attrs.split(',') {
				if name.is_empty() {
					return Err(ParseError::invalid("Empty attribute name").at(offset));
				}
				names.push(name.to_owned());
				offset += name.len() + 1;
			}
			IndexAttributes::List(names)
		};

		let mut types = Vec::new();
		if let Some((pos, list)) = tokens.next() {
			let mut offset = pos;
			for name in list.split(',') {
				let index_type = IndexType::ALL
					.into_iter()
					.find(|t| name.eq_ignore_ascii_case(t.name()))
					.ok_or_else(|| {
						ParseError::invalid(format!("Unknown index type '{name}'")).at(offset)
					})?;
				if !types.contains(&index_type) {
					types.push(index_type);
				}
				offset += name.len() + 1;
			}
		}
		if let Some((pos, _)) = tokens.next() {
			return Err(ParseError::invalid("Unexpected text after the index types").at(pos));
		}
		if attributes == IndexAttributes::Default && types.is_empty() {
			return Err(ParseError::invalid("The default index needs index types").at(s.len()));
		}
		Ok(Self { attributes, types })
	}
}

impl FromStr for DbIndex {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::scan(s).map_err(|err| err.in_chars(s))
	}
}

impl fmt::Display for DbIndex {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.attributes {
			IndexAttributes::Default => f.write_str("default")?,
			IndexAttributes::List(names) => f.write_str(&names.join(","))?,
		}
		if !self.types.is_empty() {
			let types: Vec<_> = self.types.iter().map(|t| t.name()).collect();
			write!(f, " {}", types.join(","))?;
		}
		Ok(())
	}
}

string_serde!(DbIndex);
