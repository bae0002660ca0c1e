//! The `olcSizeLimit` grammar:
//!
//! ```text
//! size      ::= 'size' sizeLimit (' ' 'size' sizeLimit)*
//! sizeLimit ::= '.soft=' limit | '.hard=' hardLimit | '.pr=' prLimit
//!             | '.prtotal=' prTLimit | '.unchecked=' uLimit | '=' limit
//! limit     ::= 'unlimited' | 'none' | INT
//! hardLimit ::= 'soft' | limit
//! uLimit    ::= 'disabled' | limit
//! prLimit   ::= 'noEstimate' | 'disabled' | limit
//! prTLimit  ::= uLimit | 'hard'
//! ```
//!
//! A bare `limit` token is read as the global limit.
use std::{fmt, str::FromStr};

use crate::{
	error::ParseError,
	limit::{Clause, LimitKind, LimitValue},
	text::{string_serde, strip_prefix_ci, tokens},
};

/// Keyword every size limit clause starts with
pub const KEYWORD: &str = "size";
/// The `size.pr=` value that asks the server not to return an estimate
pub const NO_ESTIMATE: &str = "noEstimate";

/// Selectors recognised after the `size` keyword
const KINDS: [LimitKind; 6] = [
	LimitKind::Global,
	LimitKind::Soft,
	LimitKind::Hard,
	LimitKind::Unchecked,
	LimitKind::Pr,
	LimitKind::PrTotal,
];

/// A set of size limit clauses. Absent clauses are `None`.
///
/// The global limit and the soft/hard pair are kept independently; keeping
/// only one of them is up to the editor (see [`crate::edit`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SizeLimit {
	/// `size=`
	pub global: Option<LimitValue>,
	/// `size.soft=`
	pub soft: Option<LimitValue>,
	/// `size.hard=`
	pub hard: Option<LimitValue>,
	/// `size.unchecked=`
	pub unchecked: Option<LimitValue>,
	/// `size.pr=`
	pub pr: Option<LimitValue>,
	/// `size.prtotal=`
	pub pr_total: Option<LimitValue>,
	/// `size.pr=noEstimate`
	pub no_estimate: bool,
}

impl SizeLimit {
	/// Whether no clause is set
	#[must_use]
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}

	/// Whether every present value is legal in its slot
	#[must_use]
	pub fn is_valid(&self) -> bool {
		self.slots().iter().all(|(kind, value)| value.map_or(true, |value| kind.accepts(value)))
	}

	/// The slot for a limit kind
	pub fn slot_mut(&mut self, kind: LimitKind) -> &mut Option<LimitValue> {
		match kind {
			LimitKind::Global => &mut self.global,
			LimitKind::Soft => &mut self.soft,
			LimitKind::Hard => &mut self.hard,
			LimitKind::Unchecked => &mut self.unchecked,
			LimitKind::Pr => &mut self.pr,
			LimitKind::PrTotal => &mut self.pr_total,
		}
	}

	/// All slots in output order
	fn slots(&self) -> [(LimitKind, Option<LimitValue>); 6] {
		[
			(LimitKind::Global, self.global),
			(LimitKind::Soft, self.soft),
			(LimitKind::Hard, self.hard),
			(LimitKind::Unchecked, self.unchecked),
			(LimitKind::Pr, self.pr),
			(LimitKind::PrTotal, self.pr_total),
		]
	}

	/// Parse one `size…=value` clause into this set. A later clause for the
	/// same slot replaces the earlier one.
	pub(crate) fn apply_clause(&mut self, clause: &str) -> Result<(), ParseError> {
		let clause = Clause::split(clause, KEYWORD)?;
		let kind = clause.kind(&KINDS).map_err(|err| err.at(KEYWORD.len()))?;
		if kind == LimitKind::Pr && clause.value.eq_ignore_ascii_case(NO_ESTIMATE) {
			self.no_estimate = true;
			return Ok(());
		}
		*self.slot_mut(kind) = Some(clause.value_for(kind)?);
		Ok(())
	}
}

impl SizeLimit {
	/// Parse with errors positioned by byte offset
	fn scan(s: &str) -> Result<Self, ParseError> {
		let mut limit = Self::default();
		for (pos, clause) in tokens(s) {
			let result = if strip_prefix_ci(clause, KEYWORD).is_some() {
				limit.apply_clause(clause)
			} else {
				// A bare value is the global limit, as in `sizelimit 500`
				LimitValue::parse_for(LimitKind::Global, clause)
					.map(|value| limit.global = Some(value))
			};
			result.map_err(|err| {
				tracing::debug!("Rejected size limit clause '{clause}': {err}");
				err.shifted(pos)
			})?;
		}
		Ok(limit)
	}
}

impl FromStr for SizeLimit {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::scan(s).map_err(|err| err.in_chars(s))
	}
}

impl fmt::Display for SizeLimit {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut separator = "";
		for (kind, value) in self.slots() {
			if let Some(value) = value {
				write!(f, "{separator}{KEYWORD}{}={value}", kind.selector())?;
				separator = " ";
			}
		}
		if self.no_estimate {
			write!(f, "{separator}{KEYWORD}.pr={NO_ESTIMATE}")?;
		}
		Ok(())
	}
}

string_serde!(SizeLimit);

#[cfg(test)]
mod tests {
	#![allow(clippy::unwrap_used)]

	use super::SizeLimit;
	use crate::{limit::LimitValue, ErrorKind};

	#[test]
	fn soft_and_hard() -> Result<(), Box<dyn std::error::Error>> {
		let limit: SizeLimit = "size.soft=100 size.hard=unlimited".parse()?;
		assert_eq!(limit.soft, Some(LimitValue::Value(100)));
		assert_eq!(limit.hard, Some(LimitValue::Unlimited));
		assert_eq!(limit.global, None);
		assert_eq!(limit.to_string(), "size.soft=100 size.hard=unlimited");
		assert_eq!(limit.to_string().parse::<SizeLimit>()?, limit);
		Ok(())
	}

	#[test]
	fn keywords_are_case_insensitive() -> Result<(), Box<dyn std::error::Error>> {
		let limit: SizeLimit = "SIZE=NONE Size.Unchecked=Disabled size.PR=NoEstimate".parse()?;
		assert_eq!(limit.global, Some(LimitValue::Unlimited));
		assert_eq!(limit.unchecked, Some(LimitValue::Disabled));
		assert!(limit.no_estimate);
		assert_eq!(limit.pr, None);
		assert_eq!(
			limit.to_string(),
			"size=unlimited size.unchecked=disabled size.pr=noEstimate"
		);
		Ok(())
	}

	#[test]
	fn all_clauses() -> Result<(), Box<dyn std::error::Error>> {
		let input = "size=10 size.soft=20 size.hard=soft size.unchecked=30 size.pr=40 \
		             size.prtotal=hard size.pr=noestimate";
		let limit: SizeLimit = input.parse()?;
		assert_eq!(limit.hard, Some(LimitValue::Soft));
		assert_eq!(limit.pr, Some(LimitValue::Value(40)));
		assert_eq!(limit.pr_total, Some(LimitValue::Hard));
		assert!(limit.is_valid());
		assert_eq!(
			limit.to_string(),
			"size=10 size.soft=20 size.hard=soft size.unchecked=30 size.pr=40 \
			 size.prtotal=hard size.pr=noEstimate"
		);
		assert_eq!(limit.to_string().parse::<SizeLimit>()?, limit);
		Ok(())
	}

	#[test]
	fn bare_value_is_global() -> Result<(), Box<dyn std::error::Error>> {
		let limit: SizeLimit = "500".parse()?;
		assert_eq!(limit.global, Some(LimitValue::Value(500)));
		assert_eq!(limit.to_string(), "size=500");
		let limit: SizeLimit = "unlimited size.pr=noEstimate".parse()?;
		assert_eq!(limit.global, Some(LimitValue::Unlimited));
		assert!(limit.no_estimate);
		Ok(())
	}

	#[test]
	fn later_clause_wins() -> Result<(), Box<dyn std::error::Error>> {
		let limit: SizeLimit = "size.soft=5 size.soft=unlimited".parse()?;
		assert_eq!(limit.soft, Some(LimitValue::Unlimited));
		Ok(())
	}

	#[test]
	fn errors_are_positioned() {
		let err = "size.soft=100 size.hard=-5".parse::<SizeLimit>().unwrap_err();
		assert_eq!((err.kind, err.position), (ErrorKind::OutOfRange, Some(24)));

		let err = "size.soft=100 size.bogus=5".parse::<SizeLimit>().unwrap_err();
		assert_eq!((err.kind, err.position), (ErrorKind::InvalidFormat, Some(18)));

		let err = "time=5".parse::<SizeLimit>().unwrap_err();
		assert_eq!(err.position, Some(0));

		assert!("size.soft=soft".parse::<SizeLimit>().is_err());
		assert!("size=disabled".parse::<SizeLimit>().is_err());
		assert!("size.pr=hard".parse::<SizeLimit>().is_err());
	}

	#[test]
	fn empty_and_validity() -> Result<(), Box<dyn std::error::Error>> {
		let limit: SizeLimit = "".parse()?;
		assert!(limit.is_empty());
		assert_eq!(limit.to_string(), "");

		let limit = SizeLimit { soft: Some(LimitValue::Disabled), ..SizeLimit::default() };
		assert!(!limit.is_valid());
		Ok(())
	}
}
