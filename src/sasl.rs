//! SASL security properties (`olcSaslSecProps`), e.g.
//! `noplain,noanonymous,minssf=56`.
use std::{collections::BTreeSet, fmt, str::FromStr};

use crate::{
	error::ParseError,
	text::{parse_bounded, string_serde},
};

/// A property without a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SaslFlag {
	/// `none`: clears the default `noanonymous,noplain`
	None,
	/// `noplain`: disable mechanisms susceptible to simple passive attacks
	NoPlain,
	/// `noactive`: disable mechanisms susceptible to active attacks
	NoActive,
	/// `nodict`: disable mechanisms susceptible to passive dictionary attacks
	NoDict,
	/// `noanonymous`: disable mechanisms which support anonymous login
	NoAnonymous,
	/// `forwardsec`: require forward secrecy between sessions
	ForwardSec,
	/// `passcred`: require mechanisms which pass client credentials
	PassCred,
}

impl SaslFlag {
	/// Every flag in output order
	pub const ALL: [Self; 7] = [
		Self::None,
		Self::NoPlain,
		Self::NoActive,
		Self::NoDict,
		Self::NoAnonymous,
		Self::ForwardSec,
		Self::PassCred,
	];

	/// The keyword for this flag
	#[must_use]
	pub fn name(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::NoPlain => "noplain",
			Self::NoActive => "noactive",
			Self::NoDict => "nodict",
			Self::NoAnonymous => "noanonymous",
			Self::ForwardSec => "forwardsec",
			Self::PassCred => "passcred",
		}
	}

	/// Flags that can't be set together with this one
	#[must_use]
	pub fn conflicts(self) -> &'static [Self] {
		match self {
			Self::None => &[Self::NoPlain, Self::NoAnonymous],
			Self::NoPlain | Self::NoAnonymous => &[Self::None],
			_ => &[],
		}
	}
}

impl fmt::Display for SaslFlag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Upper bound of the valued properties
pub const MAX_VALUE: u64 = 4_294_967_295;

/// The SASL security properties
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SaslSecProps {
	/// Active flags
	flags: BTreeSet<SaslFlag>,
	/// `minssf=`
	pub min_ssf: Option<u32>,
	/// `maxssf=`
	pub max_ssf: Option<u32>,
	/// `maxbufsize=`
	pub max_buf_size: Option<u32>,
}

impl SaslSecProps {
	/// Set a flag. Flags it conflicts with are kept; the editing rules live
	/// in [`SaslSecPropsEditor`](crate::edit::SaslSecPropsEditor).
	pub fn insert_flag(&mut self, flag: SaslFlag) {
		self.flags.insert(flag);
	}

	/// Set a flag and clear the flags it conflicts with
	pub(crate) fn replace_conflicting(&mut self, flag: SaslFlag) {
		for conflict in flag.conflicts() {
			if self.flags.remove(conflict) {
				tracing::debug!("SASL property '{flag}' replaces '{conflict}'");
			}
		}
		self.flags.insert(flag);
	}

	/// Whether two conflicting flags are both set
	#[must_use]
	pub fn has_conflict(&self) -> bool {
		self.flags.iter().any(|flag| flag.conflicts().iter().any(|other| self.flags.contains(other)))
	}

	/// Clear a flag
	pub fn remove_flag(&mut self, flag: SaslFlag) {
		self.flags.remove(&flag);
	}

	/// Whether a flag is set
	#[must_use]
	pub fn has_flag(&self, flag: SaslFlag) -> bool {
		self.flags.contains(&flag)
	}

	/// The set flags, in output order
	pub fn flags(&self) -> impl Iterator<Item = SaslFlag> + '_ {
		self.flags.iter().copied()
	}

	/// Whether nothing is set
	#[must_use]
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}

	/// Apply one `flag` or `key=value` token
	fn apply(&mut self, token: &str) -> Result<(), ParseError> {
		if let Some((key, value)) = token.split_once('=') {
			let value_offset = key.len() + 1;
			let slot = match key.to_ascii_lowercase().as_str() {
				"minssf" => &mut self.min_ssf,
				"maxssf" => &mut self.max_ssf,
				"maxbufsize" => &mut self.max_buf_size,
				_ => {
					return Err(ParseError::invalid(format!("Unknown SASL property '{key}'")).at(0))
				}
			};
			let value = parse_bounded(value, key, MAX_VALUE)
				.map_err(|err| err.shifted(value_offset))?;
			*slot = u32::try_from(value).ok();
			return Ok(());
		}

		let flag = SaslFlag::ALL
			.into_iter()
			.find(|flag| token.eq_ignore_ascii_case(flag.name()))
			.ok_or_else(|| ParseError::invalid(format!("Unknown SASL flag '{token}'")).at(0))?;
		self.replace_conflicting(flag);
		Ok(())
	}
}

impl SaslSecProps {
	/// Parse with errors positioned by byte offset
	pub(crate) fn scan(s: &str) -> Result<Self, ParseError> {
		let mut props = Self::default();
		let separators = |c: char| c == ',' || c.is_ascii_whitespace();
		let mut start = 0;
		for token in s.split(separators) {
			if !token.is_empty() {
				props.apply(token).map_err(|err| err.shifted(start))?;
			}
			start += token.len() + 1;
		}
		Ok(props)
	}
}

impl FromStr for SaslSecProps {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::scan(s).map_err(|err| err.in_chars(s))
	}
}

impl fmt::Display for SaslSecProps {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let flags = self.flags.iter().map(ToString::to_string);
		let values = [
			("minssf", self.min_ssf),
			("maxssf", self.max_ssf),
			("maxbufsize", self.max_buf_size),
		]
		.into_iter()
		.filter_map(|(key, value)| value.map(|value| format!("{key}={value}")));
		let parts: Vec<String> = flags.chain(values).collect();
		f.write_str(&parts.join(","))
	}
}

string_serde!(SaslSecProps);

#[cfg(test)]
mod tests {
	#![allow(clippy::unwrap_used)]

	use super::{SaslFlag, SaslSecProps};
	use crate::ErrorKind;

	#[test]
	fn flags_and_values() -> Result<(), Box<dyn std::error::Error>> {
		let props: SaslSecProps = "noplain, NOANONYMOUS minssf=56,maxbufsize=65536".parse()?;
		assert!(props.has_flag(SaslFlag::NoPlain));
		assert!(props.has_flag(SaslFlag::NoAnonymous));
		assert!(!props.has_flag(SaslFlag::None));
		assert_eq!(props.min_ssf, Some(56));
		assert_eq!(props.max_ssf, None);
		assert_eq!(props.max_buf_size, Some(65536));
		assert_eq!(props.to_string(), "noplain,noanonymous,minssf=56,maxbufsize=65536");
		assert_eq!(props.to_string().parse::<SaslSecProps>()?, props);
		Ok(())
	}

	#[test]
	fn last_write_wins() -> Result<(), Box<dyn std::error::Error>> {
		let props: SaslSecProps = "noplain,noanonymous,none".parse()?;
		assert_eq!(props.flags().collect::<Vec<_>>(), [SaslFlag::None]);

		let props: SaslSecProps = "none,noplain".parse()?;
		assert_eq!(props.flags().collect::<Vec<_>>(), [SaslFlag::NoPlain]);

		let mut props = SaslSecProps::default();
		props.insert_flag(SaslFlag::NoAnonymous);
		props.insert_flag(SaslFlag::None);
		assert!(props.has_conflict());
		assert_eq!(props.to_string(), "none,noanonymous");
		props.remove_flag(SaslFlag::NoAnonymous);
		assert!(!props.has_conflict());
		Ok(())
	}

	#[test]
	fn rejected() {
		let err = "noplain,bogus".parse::<SaslSecProps>().unwrap_err();
		assert_eq!((err.kind, err.position), (ErrorKind::InvalidFormat, Some(8)));

		let err = "minssf=-1".parse::<SaslSecProps>().unwrap_err();
		assert_eq!((err.kind, err.position), (ErrorKind::InvalidFormat, Some(7)));

		let err = "maxssf=99999999999".parse::<SaslSecProps>().unwrap_err();
		assert_eq!(err.kind, ErrorKind::OutOfRange);

		assert!("minssf=".parse::<SaslSecProps>().is_err());
		assert!("strength=5".parse::<SaslSecProps>().is_err());
	}

	#[test]
	fn empty() -> Result<(), Box<dyn std::error::Error>> {
		let props: SaslSecProps = " , ".parse()?;
		assert!(props.is_empty());
		assert_eq!(props.to_string(), "");
		Ok(())
	}
}
