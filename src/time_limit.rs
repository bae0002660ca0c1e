//! The `olcTimeLimit` grammar:
//!
//! ```text
//! time      ::= 'time' timeLimit (' ' 'time' timeLimit)*
//! timeLimit ::= '.soft=' limit | '.hard=' hardLimit | '=' limit
//! limit     ::= 'unlimited' | 'none' | INT
//! hardLimit ::= 'soft' | limit
//! ```
//!
//! A bare `limit` token is read as the global limit.
use std::{fmt, str::FromStr};

use crate::{
	error::ParseError,
	limit::{Clause, LimitKind, LimitValue},
	text::{string_serde, strip_prefix_ci, tokens},
};

/// Keyword every time limit clause starts with
pub const KEYWORD: &str = "time";

/// Selectors recognised after the `time` keyword
const KINDS: [LimitKind; 3] = [LimitKind::Global, LimitKind::Soft, LimitKind::Hard];

/// A set of time limit clauses, in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TimeLimit {
	/// `time=`
	pub global: Option<LimitValue>,
	/// `time.soft=`
	pub soft: Option<LimitValue>,
	/// `time.hard=`
	pub hard: Option<LimitValue>,
}

impl TimeLimit {
	/// Whether no clause is set
	#[must_use]
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}

	/// Whether every present value is legal in its slot
	#[must_use]
	pub fn is_valid(&self) -> bool {
		[(LimitKind::Global, self.global), (LimitKind::Soft, self.soft), (LimitKind::Hard, self.hard)]
			.iter()
			.all(|(kind, value)| value.map_or(true, |value| kind.accepts(value)))
	}

	/// The slot for a limit kind. Only the global, soft and hard kinds exist
	/// for time limits.
	pub fn slot_mut(&mut self, kind: LimitKind) -> Option<&mut Option<LimitValue>> {
		match kind {
			LimitKind::Global => Some(&mut self.global),
			LimitKind::Soft => Some(&mut self.soft),
			LimitKind::Hard => Some(&mut self.hard),
			LimitKind::Unchecked | LimitKind::Pr | LimitKind::PrTotal => None,
		}
	}

	/// Parse one `time…=value` clause into this set
	pub(crate) fn apply_clause(&mut self, clause: &str) -> Result<(), ParseError> {
		let clause = Clause::split(clause, KEYWORD)?;
		let kind = clause.kind(&KINDS).map_err(|err| err.at(KEYWORD.len()))?;
		let value = clause.value_for(kind)?;
		match kind {
			LimitKind::Global => self.global = Some(value),
			LimitKind::Soft => self.soft = Some(value),
			_ => self.hard = Some(value),
		}
		Ok(())
	}
}

impl TimeLimit {
	/// Parse with errors positioned by byte offset
	fn scan(s: &str) -> Result<Self, ParseError> {
		let mut limit = Self::default();
		for (pos, clause) in tokens(s) {
			let result = if strip_prefix_ci(clause, KEYWORD).is_some() {
				limit.apply_clause(clause)
			} else {
				// A bare value is the global limit, as in `timelimit 500`
				LimitValue::parse_for(LimitKind::Global, clause)
					.map(|value| limit.global = Some(value))
			};
			result.map_err(|err| {
				tracing::debug!("Rejected time limit clause '{clause}': {err}");
				err.shifted(pos)
			})?;
		}
		Ok(limit)
	}
}

impl FromStr for TimeLimit {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::scan(s).map_err(|err| err.in_chars(s))
	}
}

impl fmt::Display for TimeLimit {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let clauses = [
			(LimitKind::Global, self.global),
			(LimitKind::Soft, self.soft),
			(LimitKind::Hard, self.hard),
		];
		let mut separator = "";
		for (kind, value) in clauses {
			if let Some(value) = value {
				write!(f, "{separator}{KEYWORD}{}={value}", kind.selector())?;
				separator = " ";
			}
		}
		Ok(())
	}
}

string_serde!(TimeLimit);
