//! Security strength factors (`olcSecurity`), e.g. `ssf=128 update_tls=256`.
use std::{fmt, str::FromStr};

use crate::{
	error::ParseError,
	text::{parse_bounded, string_serde, tokens},
};

/// A feature a minimum strength can be required for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SsfFeature {
	/// `ssf`: overall strength
	Ssf,
	/// `transport`
	Transport,
	/// `tls`
	Tls,
	/// `sasl`
	Sasl,
	/// `simple_bind`
	SimpleBind,
	/// `update_ssf`
	UpdateSsf,
	/// `update_transport`
	UpdateTransport,
	/// `update_tls`
	UpdateTls,
	/// `update_sasl`
	UpdateSasl,
}

impl SsfFeature {
	/// Every feature
	pub const ALL: [Self; 9] = [
		Self::Ssf,
		Self::Transport,
		Self::Tls,
		Self::Sasl,
		Self::SimpleBind,
		Self::UpdateSsf,
		Self::UpdateTransport,
		Self::UpdateTls,
		Self::UpdateSasl,
	];

	/// Keyword of the feature
	#[must_use]
	pub fn name(self) -> &'static str {
		match self {
			Self::Ssf => "ssf",
			Self::Transport => "transport",
			Self::Tls => "tls",
			Self::Sasl => "sasl",
			Self::SimpleBind => "simple_bind",
			Self::UpdateSsf => "update_ssf",
			Self::UpdateTransport => "update_transport",
			Self::UpdateTls => "update_tls",
			Self::UpdateSasl => "update_sasl",
		}
	}

	/// Look a feature up by keyword, ignoring case
	#[must_use]
	pub fn from_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|feature| name.eq_ignore_ascii_case(feature.name()))
	}
}

/// Commonly used strengths, by key length of the cipher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SsfStrength {
	/// 0
	NoProtection,
	/// 1
	IntegrityCheck,
	/// 56
	Des,
	/// 112
	TripleDes,
	/// 128, e.g. RC4, Blowfish or AES-128
	Aes128,
	/// 256
	Aes256,
}

impl SsfStrength {
	/// Strength in bits
	#[must_use]
	pub fn bits(self) -> u32 {
		match self {
			Self::NoProtection => 0,
			Self::IntegrityCheck => 1,
			Self::Des => 56,
			Self::TripleDes => 112,
			Self::Aes128 => 128,
			Self::Aes256 => 256,
		}
	}

	/// The named strength for a number of bits, if there is one
	#[must_use]
	pub fn from_bits(bits: u32) -> Option<Self> {
		[
			Self::NoProtection,
			Self::IntegrityCheck,
			Self::Des,
			Self::TripleDes,
			Self::Aes128,
			Self::Aes256,
		]
		.into_iter()
		.find(|strength| strength.bits() == bits)
	}
}

/// One `feature=strength` requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ssf {
	/// What the requirement applies to
	pub feature: SsfFeature,
	/// Minimum strength in bits
	pub strength: u32,
}

impl Ssf {
	/// Parse with errors positioned by byte offset
	pub(crate) fn scan(s: &str) -> Result<Self, ParseError> {
		let (name, value) = s
			.split_once('=')
			.ok_or_else(|| ParseError::invalid(format!("Missing '=' in '{s}'")).at(s.len()))?;
		let feature = SsfFeature::from_name(name)
			.ok_or_else(|| ParseError::invalid(format!("Unknown SSF feature '{name}'")).at(0))?;
		let strength = parse_bounded(value, name, u64::from(u32::MAX))
			.map_err(|err| err.shifted(name.len() + 1))?;
		Ok(Self { feature, strength: u32::try_from(strength).unwrap_or(u32::MAX) })
	}
}

impl FromStr for Ssf {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::scan(s).map_err(|err| err.in_chars(s))
	}
}

impl fmt::Display for Ssf {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}={}", self.feature.name(), self.strength)
	}
}

string_serde!(Ssf);

/// A full `olcSecurity` value. Each feature appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Security(Vec<Ssf>);

impl Security {
	/// The requirements, in the order they were given
	#[must_use]
	pub fn requirements(&self) -> &[Ssf] {
		&self.0
	}

	/// The strength required for a feature
	#[must_use]
	pub fn get(&self, feature: SsfFeature) -> Option<u32> {
		self.0.iter().find(|ssf| ssf.feature == feature).map(|ssf| ssf.strength)
	}

	/// Set the strength of a feature, replacing a previous requirement
	pub fn set(&mut self, ssf: Ssf) {
		match self.0.iter_mut().find(|existing| existing.feature == ssf.feature) {
			Some(existing) => existing.strength = ssf.strength,
			None => self.0.push(ssf),
		}
	}

	/// Drop the requirement for a feature
	pub fn remove(&mut self, feature: SsfFeature) {
		self.0.retain(|ssf| ssf.feature != feature);
	}
}

impl Security {
	/// Parse with errors positioned by byte offset
	fn scan(s: &str) -> Result<Self, ParseError> {
		let mut security = Self::default();
		for (pos, token) in tokens(s) {
			let ssf = Ssf::scan(token).map_err(|err| err.shifted(pos))?;
			if security.get(ssf.feature).is_some() {
				return Err(ParseError::invalid(format!(
					"Feature '{}' is given more than once",
					ssf.feature.name()
				))
				.at(pos));
			}
			security.0.push(ssf);
		}
		Ok(security)
	}
}

impl FromStr for Security {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::scan(s).map_err(|err| err.in_chars(s))
	}
}

impl fmt::Display for Security {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut separator = "";
		for ssf in &self.0 {
			write!(f, "{separator}{ssf}")?;
			separator = " ";
		}
		Ok(())
	}
}

string_serde!(Security);
