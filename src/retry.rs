//! The `retry` option of a `syncrepl` stanza: pairs of
//! `<interval> <count>`, where a count of `+` retries forever.
use std::{fmt, str::FromStr};

use crate::{
	error::ParseError,
	text::{parse_bounded, string_serde, tokens},
};

/// How often to retry at a given interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetryCount {
	/// A fixed number of attempts
	Times(u32),
	/// `+`: retry until it works
	Forever,
}

impl fmt::Display for RetryCount {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Times(count) => write!(f, "{count}"),
			Self::Forever => f.write_str("+"),
		}
	}
}

/// One `<interval> <count>` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RetryPair {
	/// Seconds between two attempts
	pub interval: u32,
	/// Number of attempts
	pub count: RetryCount,
}

/// A retry schedule
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Retry(pub Vec<RetryPair>);

/// Largest interval or count accepted
const MAX: u64 = 4_294_967_295;

impl Retry {
	/// The pairs, in the order they are tried
	#[must_use]
	pub fn pairs(&self) -> &[RetryPair] {
		&self.0
	}

	/// Number of pairs
	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether there are no pairs
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Parse one integer token of the schedule
fn number(token: &str, pos: usize, what: &str) -> Result<u32, ParseError> {
	let value = parse_bounded(token, what, MAX).map_err(|err| err.shifted(pos))?;
	u32::try_from(value).map_err(|_| ParseError::out_of_range(format!("{what} too large")).at(pos))
}

impl Retry {
	/// Parse with errors positioned by byte offset
	pub(crate) fn scan(s: &str) -> Result<Self, ParseError> {
		let tokens: Vec<_> = tokens(s).collect();
		if tokens.is_empty() {
			return Err(ParseError::invalid("Empty retry specification").at(0));
		}
		if tokens.len() % 2 != 0 {
			return Err(ParseError::invalid("Retry intervals and counts must come in pairs")
				.at(s.trim_end().len()));
		}

		let pairs = tokens
			.chunks_exact(2)
			.map(|pair| -> Result<RetryPair, ParseError> {
				let (interval_pos, interval) = pair[0];
				let (count_pos, count) = pair[1];
				Ok(RetryPair {
					interval: number(interval, interval_pos, "retry interval")?,
					count: if count == "+" {
						RetryCount::Forever
					} else {
						RetryCount::Times(number(count, count_pos, "retry count")?)
					},
				})
			})
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Self(pairs))
	}
}

impl FromStr for Retry {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::scan(s).map_err(|err| err.in_chars(s))
	}
}

impl fmt::Display for Retry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut separator = "";
		for pair in &self.0 {
			write!(f, "{separator}{} {}", pair.interval, pair.count)?;
			separator = " ";
		}
		Ok(())
	}
}

string_serde!(Retry);
