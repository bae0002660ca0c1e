//! Small lexical helpers shared by the value grammars.
use crate::error::ParseError;

/// Implements `Serialize` and `Deserialize` for a type through its canonical
/// string form (`Display` / `FromStr`).
macro_rules! string_serde {
	($ty:ty) => {
		impl serde::Serialize for $ty {
			fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
				serializer.collect_str(self)
			}
		}

		impl<'de> serde::Deserialize<'de> for $ty {
			fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
				let raw = String::deserialize(deserializer)?;
				raw.parse().map_err(serde::de::Error::custom)
			}
		}
	};
}
pub(crate) use string_serde;

/// Strip an ASCII prefix, ignoring case.
pub(crate) fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
	let head = s.get(..prefix.len())?;
	head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

/// Whitespace separated tokens together with their offset in `s`.
pub(crate) fn tokens(s: &str) -> impl Iterator<Item = (usize, &str)> {
	s.split(|c: char| c.is_ascii_whitespace())
		.filter(|token| !token.is_empty())
		.map(move |token| (token.as_ptr() as usize - s.as_ptr() as usize, token))
}

/// Parse the `{N}` ordering prefix slapd puts in front of the values of
/// ordered attributes. Returns the index and the length of the prefix.
pub(crate) fn ordering_prefix(s: &str) -> Result<(Option<u32>, usize), ParseError> {
	let Some(rest) = s.strip_prefix('{') else {
		return Ok((None, 0));
	};
	let end = rest.find('}').ok_or_else(|| ParseError::invalid("Unterminated '{' prefix").at(1))?;
	let digits = &rest[..end];
	if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
		return Err(ParseError::invalid("Invalid ordering prefix").at(1));
	}
	let index = digits
		.parse()
		.map_err(|_| ParseError::out_of_range("Ordering prefix too large").at(1))?;
	Ok((Some(index), end + 2))
}

/// Parse a non-negative decimal integer no larger than `max`.
///
/// `what` names the field in error messages. Errors are positioned relative to
/// the start of `s`.
pub(crate) fn parse_bounded(s: &str, what: &str, max: u64) -> Result<u64, ParseError> {
	if s.is_empty() {
		return Err(ParseError::invalid(format!("Missing value for {what}")).at(0));
	}
	if let Some(pos) = s.find(|c: char| !c.is_ascii_digit()) {
		return Err(ParseError::invalid(format!("Invalid character in {what}")).at(pos));
	}
	match s.parse::<u64>() {
		Ok(value) if value <= max => Ok(value),
		_ => Err(ParseError::out_of_range(format!("{what} must be between 0 and {max}")).at(0)),
	}
}
