//! Time spans as used by the accesslog overlay's `olcAccessLogPurge`.
//!
//! The grammar is `[days '+'] hours ':' minutes [':' seconds]`, for example
//! `07+00:00` (a week) or `1+02:03:04`.
use std::{fmt, str::FromStr};

use crate::{
	error::ParseError,
	text::{string_serde, tokens},
};

/// Largest number of days a span can hold
pub const MAX_DAYS: u32 = 99_999;
/// Largest number of hours a span can hold
pub const MAX_HOURS: u32 = 23;
/// Largest number of minutes a span can hold
pub const MAX_MINUTES: u32 = 59;
/// Largest number of seconds a span can hold
pub const MAX_SECONDS: u32 = 59;

/// A validated time span
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TimeSpan {
	/// Days, 0 to 99999
	days: u32,
	/// Hours, 0 to 23
	hours: u32,
	/// Minutes, 0 to 59
	minutes: u32,
	/// Seconds, 0 to 59
	seconds: u32,
}

/// The component the scanner is currently reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Component {
	/// Either days (if a `+` follows) or hours
	DaysOrHours,
	/// Hours, after a `+`
	Hours,
	/// Minutes, after the first `:`
	Minutes,
	/// Seconds, after the second `:`
	Seconds,
}

impl TimeSpan {
	/// Create a span, checking every component against its range.
	pub fn new(days: u32, hours: u32, minutes: u32, seconds: u32) -> Result<Self, ParseError> {
		check("days", days, MAX_DAYS)?;
		check("hours", hours, MAX_HOURS)?;
		check("minutes", minutes, MAX_MINUTES)?;
		check("seconds", seconds, MAX_SECONDS)?;
		Ok(Self { days, hours, minutes, seconds })
	}

	/// Parse a span with a single left to right scan.
	pub fn parse(s: &str) -> Result<Self, ParseError> {
		if s.len() < 3 {
			return Err(ParseError::invalid(format!("Time span '{s}' is too short")).at(0));
		}

		let mut span = Self::default();
		let mut component = Component::DaysOrHours;
		let mut buffer: Option<u32> = None;
		let mut start = 0;

		for (pos, c) in s.char_indices() {
			match c {
				'0'..='9' => {
					let digit = c.to_digit(10).unwrap_or_default();
					let value = buffer
						.unwrap_or(0)
						.checked_mul(10)
						.and_then(|value| value.checked_add(digit))
						.ok_or_else(|| {
							ParseError::out_of_range("Time span component too large").at(start)
						})?;
					buffer = Some(value);
				}
				'+' if component == Component::DaysOrHours => {
					span.days = commit(buffer.take(), "days", MAX_DAYS, start, pos)?;
					component = Component::Hours;
					start = pos + 1;
				}
				':' if matches!(component, Component::DaysOrHours | Component::Hours) => {
					span.hours = commit(buffer.take(), "hours", MAX_HOURS, start, pos)?;
					component = Component::Minutes;
					start = pos + 1;
				}
				':' if component == Component::Minutes => {
					span.minutes = commit(buffer.take(), "minutes", MAX_MINUTES, start, pos)?;
					component = Component::Seconds;
					start = pos + 1;
				}
				_ => {
					return Err(ParseError::invalid(format!(
						"Unexpected character '{c}' in time span"
					))
					.at(pos));
				}
			}
		}

		match component {
			Component::Minutes => {
				span.minutes = commit(buffer, "minutes", MAX_MINUTES, start, s.len())?;
			}
			Component::Seconds => {
				span.seconds = commit(buffer, "seconds", MAX_SECONDS, start, s.len())?;
			}
			Component::DaysOrHours | Component::Hours => {
				return Err(ParseError::invalid("Time span is missing ':'").at(s.len()));
			}
		}
		Ok(span)
	}

	/// Days
	#[must_use]
	pub fn days(&self) -> u32 {
		self.days
	}

	/// Hours
	#[must_use]
	pub fn hours(&self) -> u32 {
		self.hours
	}

	/// Minutes
	#[must_use]
	pub fn minutes(&self) -> u32 {
		self.minutes
	}

	/// Seconds
	#[must_use]
	pub fn seconds(&self) -> u32 {
		self.seconds
	}

	/// The total length of the span
	#[must_use]
	pub fn to_duration(&self) -> time::Duration {
		time::Duration::days(self.days.into())
			+ time::Duration::hours(self.hours.into())
			+ time::Duration::minutes(self.minutes.into())
			+ time::Duration::seconds(self.seconds.into())
	}
}

/// Range check a component which was set directly
fn check(what: &str, value: u32, max: u32) -> Result<(), ParseError> {
	if value > max {
		return Err(ParseError::out_of_range(format!("{what} must be between 0 and {max}")));
	}
	Ok(())
}

/// Take the digits read so far as the value of a component
fn commit(
	buffer: Option<u32>,
	what: &str,
	max: u32,
	start: usize,
	pos: usize,
) -> Result<u32, ParseError> {
	let value =
		buffer.ok_or_else(|| ParseError::invalid(format!("Missing {what} in time span")).at(pos))?;
	check(what, value, max).map_err(|err| err.at(start))?;
	Ok(value)
}

impl FromStr for TimeSpan {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s).map_err(|err| err.in_chars(s))
	}
}

impl fmt::Display for TimeSpan {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.days > 0 {
			write!(f, "{}+", self.days)?;
		}
		write!(f, "{:02}:{:02}", self.hours, self.minutes)?;
		if self.seconds > 0 {
			write!(f, ":{:02}", self.seconds)?;
		}
		Ok(())
	}
}

string_serde!(TimeSpan);

/// The `olcAccessLogPurge` value: how old entries must be before they are
/// purged, and how often to check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AccessLogPurge {
	/// Minimum age of purged entries
	pub age: TimeSpan,
	/// Time between two purge runs
	pub interval: TimeSpan,
}

impl AccessLogPurge {
	/// Parse with errors positioned by byte offset
	fn scan(s: &str) -> Result<Self, ParseError> {
		let mut spans = tokens(s);
		match (spans.next(), spans.next(), spans.next()) {
			(Some((age_pos, age)), Some((interval_pos, interval)), None) => Ok(Self {
				age: TimeSpan::parse(age).map_err(|err| err.shifted(age_pos))?,
				interval: TimeSpan::parse(interval).map_err(|err| err.shifted(interval_pos))?,
			}),
			_ => Err(ParseError::invalid("Expected an age and an interval time span")),
		}
	}
}

impl FromStr for AccessLogPurge {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::scan(s).map_err(|err| err.in_chars(s))
	}
}

impl fmt::Display for AccessLogPurge {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.age, self.interval)
	}
}

string_serde!(AccessLogPurge);

#[cfg(test)]
mod tests {
	#![allow(clippy::unwrap_used)]

	use super::{AccessLogPurge, TimeSpan};
	use crate::ErrorKind;

	#[test]
	fn full_span() -> Result<(), Box<dyn std::error::Error>> {
		let span: TimeSpan = "1+02:03:04".parse()?;
		assert_eq!((span.days(), span.hours(), span.minutes(), span.seconds()), (1, 2, 3, 4));
		assert_eq!(span.to_string(), "1+02:03:04");
		Ok(())
	}

	#[test]
	fn seconds_omitted_when_zero() -> Result<(), Box<dyn std::error::Error>> {
		let span: TimeSpan = "02:03".parse()?;
		assert_eq!(span.seconds(), 0);
		assert_eq!(span.days(), 0);
		assert_eq!(span.to_string(), "02:03");
		Ok(())
	}

	#[test]
	fn extremes() -> Result<(), Box<dyn std::error::Error>> {
		assert_eq!(TimeSpan::parse("0:0")?, TimeSpan::default());
		assert_eq!(TimeSpan::parse("0:0")?.to_string(), "00:00");
		let max = TimeSpan::parse("99999+23:59:59")?;
		assert_eq!(max, TimeSpan::new(99_999, 23, 59, 59)?);
		assert_eq!(max.to_string(), "99999+23:59:59");
		Ok(())
	}

	#[test]
	fn hours_out_of_range() {
		for input in ["24:00", "25:00"] {
			let err = TimeSpan::parse(input).unwrap_err();
			assert_eq!(err.kind, ErrorKind::OutOfRange, "{input}");
			assert_eq!(err.position, Some(0));
			assert!(err.message.contains("hours"));
		}
		assert!(TimeSpan::parse("23:00").is_ok());
	}

	#[test]
	fn boundaries() {
		assert!(TimeSpan::parse("00:59:59").is_ok());
		assert_eq!(TimeSpan::parse("00:60").unwrap_err().kind, ErrorKind::OutOfRange);
		assert_eq!(TimeSpan::parse("00:00:60").unwrap_err().position, Some(6));
		assert_eq!(TimeSpan::parse("100000+00:00").unwrap_err().kind, ErrorKind::OutOfRange);
		assert!(TimeSpan::new(0, 24, 0, 0).is_err());
		assert!(TimeSpan::new(100_000, 0, 0, 0).is_err());
		assert!(TimeSpan::new(0, 0, 60, 0).is_err());
	}

	#[test]
	fn malformed() {
		for input in [
			"", "1:", "12", "1:02:03x", "1:02:03:04", "1+2+03:00", "+1:00", "1:+00", "1::00", "-1:00",
		] {
			let err = TimeSpan::parse(input).unwrap_err();
			assert_eq!(err.kind, ErrorKind::InvalidFormat, "{input}");
			assert!(err.position.is_some(), "{input}");
		}
		assert_eq!(TimeSpan::parse("1:02:03x").unwrap_err().position, Some(7));
		assert_eq!(TimeSpan::parse("-1:00").unwrap_err().position, Some(0));
	}

	#[test]
	fn duration() -> Result<(), Box<dyn std::error::Error>> {
		let span = TimeSpan::parse("1+00:01:01")?;
		assert_eq!(span.to_duration().whole_seconds(), 86_400 + 61);
		Ok(())
	}

	#[test]
	fn purge_pairs() -> Result<(), Box<dyn std::error::Error>> {
		let purge: AccessLogPurge = "07+00:00 01+00:00".parse()?;
		assert_eq!(purge.age.days(), 7);
		assert_eq!(purge.interval.days(), 1);
		assert_eq!(purge.to_string(), "7+00:00 1+00:00");

		let err = "07+00:00 01+25:00".parse::<AccessLogPurge>().unwrap_err();
		assert_eq!(err.position, Some(12));
		assert!("07+00:00".parse::<AccessLogPurge>().is_err());
		assert!("1:00 2:00 3:00".parse::<AccessLogPurge>().is_err());
		Ok(())
	}
}
