//! Edit sessions for values a user changes field by field.
//!
//! The value types in this crate accept any combination of clauses. The rules
//! an editor enforces on top of that (a global limit replaces the soft and
//! hard limits, `none` replaces `noplain` and `noanonymous`, ...) live here,
//! as explicit transitions: an [`LimitIntent`] or [`SaslIntent`] is validated,
//! applied to the model, and the resulting state can be read back. Rejected
//! input leaves the model untouched and blocks [`LimitEditor::confirm`] until
//! the field is corrected.
use std::{collections::HashMap, fmt, str::FromStr};

use crate::{
	error::ParseError,
	limit::{LimitKind, LimitValue},
	sasl::{SaslFlag, SaslSecProps, MAX_VALUE},
	size_limit::SizeLimit,
	text::parse_bounded,
	time_limit::TimeLimit,
};

/// A set of limit clauses an editor can work on
pub trait LimitSet: Default + fmt::Display {
	/// The slot for `kind`, if this grammar has one
	fn slot(&mut self, kind: LimitKind) -> Option<&mut Option<LimitValue>>;

	/// The `noEstimate` flag, if this grammar has one
	fn no_estimate(&mut self) -> Option<&mut bool> {
		None
	}

	/// Whether every present value is legal in its slot
	fn all_valid(&self) -> bool;
}

impl LimitSet for TimeLimit {
	fn slot(&mut self, kind: LimitKind) -> Option<&mut Option<LimitValue>> {
		self.slot_mut(kind)
	}

	fn all_valid(&self) -> bool {
		self.is_valid()
	}
}

impl LimitSet for SizeLimit {
	fn slot(&mut self, kind: LimitKind) -> Option<&mut Option<LimitValue>> {
		Some(self.slot_mut(kind))
	}

	fn no_estimate(&mut self) -> Option<&mut bool> {
		Some(&mut self.no_estimate)
	}

	fn all_valid(&self) -> bool {
		self.is_valid()
	}
}

/// Something the user did in a limit editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitIntent {
	/// Typed text into the field for a limit. Empty text unsets it.
	Text(LimitKind, String),
	/// Toggled the "unlimited" box of a limit
	Unlimited(LimitKind, bool),
	/// Toggled the "hard limit is the soft limit" box
	HardIsSoft(bool),
	/// Toggled `size.pr=noEstimate`
	NoEstimate(bool),
}

/// Editor state for a [`TimeLimit`] or [`SizeLimit`]
#[derive(Debug, Clone, Default)]
pub struct LimitEditor<L> {
	/// The value being edited
	limit: L,
	/// Fields whose last input was rejected
	rejected: HashMap<LimitKind, ParseError>,
}

impl<L: LimitSet> LimitEditor<L> {
	/// Start editing an existing value
	#[must_use]
	pub fn new(limit: L) -> Self {
		Self { limit, rejected: HashMap::new() }
	}

	/// The current value
	#[must_use]
	pub fn limit(&self) -> &L {
		&self.limit
	}

	/// The error for a field whose input was rejected
	#[must_use]
	pub fn rejected(&self, kind: LimitKind) -> Option<&ParseError> {
		self.rejected.get(&kind)
	}

	/// Whether the edit can be confirmed
	#[must_use]
	pub fn is_valid(&self) -> bool {
		self.rejected.is_empty() && self.limit.all_valid()
	}

	/// Apply one user action. Rejected input is returned as an error and
	/// recorded against the field.
	pub fn apply(&mut self, intent: LimitIntent) -> Result<(), ParseError> {
		match intent {
			LimitIntent::Text(kind, text) => {
				let text = text.trim();
				let value = if text.is_empty() {
					None
				} else {
					match LimitValue::parse_for(kind, text) {
						Ok(value) => Some(value),
						Err(err) => {
							tracing::debug!("Rejected {kind} limit '{text}': {err}");
							self.rejected.insert(kind, err.clone());
							return Err(err);
						}
					}
				};
				self.set(kind, value)
			}
			LimitIntent::Unlimited(kind, true) => self.set(kind, Some(LimitValue::Unlimited)),
			LimitIntent::Unlimited(kind, false) => self.uncheck(kind, LimitValue::Unlimited),
			LimitIntent::HardIsSoft(true) => self.set(LimitKind::Hard, Some(LimitValue::Soft)),
			LimitIntent::HardIsSoft(false) => self.uncheck(LimitKind::Hard, LimitValue::Soft),
			LimitIntent::NoEstimate(checked) => match self.limit.no_estimate() {
				Some(flag) => {
					*flag = checked;
					Ok(())
				}
				None => Err(ParseError::invalid("This limit has no noEstimate flag")),
			},
		}
	}

	/// Store a value in a slot and clear the slots it excludes
	fn set(&mut self, kind: LimitKind, value: Option<LimitValue>) -> Result<(), ParseError> {
		let slot = self
			.limit
			.slot(kind)
			.ok_or_else(|| ParseError::invalid(format!("This limit has no {kind} value")))?;
		*slot = value;
		self.rejected.remove(&kind);

		if value.is_some() {
			for excluded in excluded_by(kind) {
				if let Some(slot) = self.limit.slot(*excluded) {
					*slot = None;
				}
				self.rejected.remove(excluded);
			}
		}
		Ok(())
	}

	/// Clear a slot that holds `sentinel`. Any other value is left alone.
	fn uncheck(&mut self, kind: LimitKind, sentinel: LimitValue) -> Result<(), ParseError> {
		let slot = self
			.limit
			.slot(kind)
			.ok_or_else(|| ParseError::invalid(format!("This limit has no {kind} value")))?;
		if *slot == Some(sentinel) {
			*slot = None;
		}
		Ok(())
	}

	/// Finish the edit, producing the string to write back
	pub fn confirm(&self) -> Result<String, ParseError> {
		if let Some(err) = self.rejected.values().next() {
			return Err(err.clone());
		}
		if !self.limit.all_valid() {
			return Err(ParseError::invalid("A limit holds a value its field does not accept"));
		}
		Ok(self.limit.to_string())
	}
}

impl<L: LimitSet + FromStr<Err = ParseError>> FromStr for LimitEditor<L> {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self::new(s.parse()?))
	}
}

/// The transition table of the limit editors: which slots setting `kind`
/// clears
fn excluded_by(kind: LimitKind) -> &'static [LimitKind] {
	match kind {
		LimitKind::Global => &[LimitKind::Soft, LimitKind::Hard],
		LimitKind::Soft | LimitKind::Hard => &[LimitKind::Global],
		LimitKind::Unchecked | LimitKind::Pr | LimitKind::PrTotal => &[],
	}
}

/// The valued SASL properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaslValue {
	/// `minssf`
	MinSsf,
	/// `maxssf`
	MaxSsf,
	/// `maxbufsize`
	MaxBufSize,
}

/// Something the user did in the SASL security properties editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaslIntent {
	/// Checked or unchecked a flag
	Flag(SaslFlag, bool),
	/// Typed text into a value field. Empty text unsets it.
	Value(SaslValue, String),
}

/// Editor state for [`SaslSecProps`]
#[derive(Debug, Clone, Default)]
pub struct SaslSecPropsEditor {
	/// The value being edited
	props: SaslSecProps,
	/// Fields whose last input was rejected
	rejected: HashMap<SaslValue, ParseError>,
}

impl SaslSecPropsEditor {
	/// Start editing an existing value
	#[must_use]
	pub fn new(props: SaslSecProps) -> Self {
		Self { props, rejected: HashMap::new() }
	}

	/// The current value
	#[must_use]
	pub fn props(&self) -> &SaslSecProps {
		&self.props
	}

	/// The error for a field whose input was rejected
	#[must_use]
	pub fn rejected(&self, value: SaslValue) -> Option<&ParseError> {
		self.rejected.get(&value)
	}

	/// Whether the edit can be confirmed
	#[must_use]
	pub fn is_valid(&self) -> bool {
		self.rejected.is_empty()
	}

	/// Apply one user action. Checking `none` unchecks `noplain` and
	/// `noanonymous`; checking either of those unchecks `none`.
	pub fn apply(&mut self, intent: SaslIntent) -> Result<(), ParseError> {
		match intent {
			SaslIntent::Flag(flag, true) => self.props.replace_conflicting(flag),
			SaslIntent::Flag(flag, false) => self.props.remove_flag(flag),
			SaslIntent::Value(field, text) => {
				let text = text.trim();
				let value = if text.is_empty() {
					None
				} else {
					let parsed = parse_bounded(text, "SASL property", MAX_VALUE)
						.and_then(|value| {
							u32::try_from(value)
								.map_err(|_| ParseError::out_of_range("SASL property too large"))
						});
					match parsed {
						Ok(value) => Some(value),
						Err(err) => {
							tracing::debug!("Rejected {field:?} '{text}': {err}");
							self.rejected.insert(field, err.clone());
							return Err(err);
						}
					}
				};
				self.rejected.remove(&field);
				match field {
					SaslValue::MinSsf => self.props.min_ssf = value,
					SaslValue::MaxSsf => self.props.max_ssf = value,
					SaslValue::MaxBufSize => self.props.max_buf_size = value,
				}
			}
		}
		Ok(())
	}

	/// Finish the edit, producing the string to write back
	pub fn confirm(&self) -> Result<String, ParseError> {
		match self.rejected.values().next() {
			Some(err) => Err(err.clone()),
			None => Ok(self.props.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	#![allow(clippy::unwrap_used)]

	use super::{LimitEditor, LimitIntent, SaslIntent, SaslSecPropsEditor, SaslValue};
	use crate::{
		limit::{LimitKind, LimitValue},
		sasl::SaslFlag,
		size_limit::SizeLimit,
		time_limit::TimeLimit,
	};

	#[test]
	fn global_clears_soft_and_hard() -> Result<(), Box<dyn std::error::Error>> {
		let mut editor: LimitEditor<TimeLimit> = "time.soft=10 time.hard=20".parse()?;
		editor.apply(LimitIntent::Text(LimitKind::Global, "30".to_owned()))?;
		assert_eq!(editor.limit().global, Some(LimitValue::Value(30)));
		assert_eq!(editor.limit().soft, None);
		assert_eq!(editor.limit().hard, None);
		assert_eq!(editor.confirm()?, "time=30");

		editor.apply(LimitIntent::Text(LimitKind::Soft, "5".to_owned()))?;
		assert_eq!(editor.limit().global, None);
		assert_eq!(editor.confirm()?, "time.soft=5");
		Ok(())
	}

	#[test]
	fn unlimited_replaces_integer() -> Result<(), Box<dyn std::error::Error>> {
		let mut editor = LimitEditor::new(SizeLimit::default());
		editor.apply(LimitIntent::Text(LimitKind::Soft, "100".to_owned()))?;
		editor.apply(LimitIntent::Unlimited(LimitKind::Soft, true))?;
		assert_eq!(editor.limit().soft, Some(LimitValue::Unlimited));
		editor.apply(LimitIntent::Text(LimitKind::Soft, "200".to_owned()))?;
		assert_eq!(editor.limit().soft, Some(LimitValue::Value(200)));
		editor.apply(LimitIntent::Unlimited(LimitKind::Soft, false))?;
		assert_eq!(editor.limit().soft, Some(LimitValue::Value(200)));
		editor.apply(LimitIntent::Unlimited(LimitKind::Soft, true))?;
		editor.apply(LimitIntent::Unlimited(LimitKind::Soft, false))?;
		assert_eq!(editor.limit().soft, None);
		Ok(())
	}

	#[test]
	fn hard_is_soft() -> Result<(), Box<dyn std::error::Error>> {
		let mut editor = LimitEditor::new(TimeLimit::default());
		editor.apply(LimitIntent::Text(LimitKind::Global, "60".to_owned()))?;
		editor.apply(LimitIntent::Text(LimitKind::Soft, "30".to_owned()))?;
		editor.apply(LimitIntent::HardIsSoft(true))?;
		assert_eq!(editor.confirm()?, "time.soft=30 time.hard=soft");
		editor.apply(LimitIntent::HardIsSoft(false))?;
		assert_eq!(editor.confirm()?, "time.soft=30");

		editor.apply(LimitIntent::Text(LimitKind::Hard, "90".to_owned()))?;
		editor.apply(LimitIntent::HardIsSoft(false))?;
		assert_eq!(editor.limit().hard, Some(LimitValue::Value(90)));
		assert_eq!(editor.confirm()?, "time.soft=30 time.hard=90");
		Ok(())
	}

	#[test]
	fn rejected_text_blocks_confirm() -> Result<(), Box<dyn std::error::Error>> {
		let mut editor = LimitEditor::new(SizeLimit::default());
		editor.apply(LimitIntent::Text(LimitKind::Hard, "50".to_owned()))?;
		assert!(editor.apply(LimitIntent::Text(LimitKind::Hard, "-7".to_owned())).is_err());
		assert_eq!(editor.limit().hard, Some(LimitValue::Value(50)));
		assert!(editor.rejected(LimitKind::Hard).is_some());
		assert!(!editor.is_valid());
		assert!(editor.confirm().is_err());

		editor.apply(LimitIntent::Text(LimitKind::Hard, String::new()))?;
		assert!(editor.is_valid());
		assert_eq!(editor.confirm()?, "");
		Ok(())
	}

	#[test]
	fn global_drops_pending_soft_error() -> Result<(), Box<dyn std::error::Error>> {
		let mut editor = LimitEditor::new(SizeLimit::default());
		assert!(editor.apply(LimitIntent::Text(LimitKind::Soft, "abc".to_owned())).is_err());
		editor.apply(LimitIntent::Unlimited(LimitKind::Global, true))?;
		assert!(editor.is_valid());
		assert_eq!(editor.confirm()?, "size=unlimited");
		Ok(())
	}

	#[test]
	fn size_only_fields() -> Result<(), Box<dyn std::error::Error>> {
		let mut editor = LimitEditor::new(SizeLimit::default());
		editor.apply(LimitIntent::Text(LimitKind::Unchecked, "disabled".to_owned()))?;
		editor.apply(LimitIntent::NoEstimate(true))?;
		assert_eq!(editor.confirm()?, "size.unchecked=disabled size.pr=noEstimate");

		let mut editor = LimitEditor::new(TimeLimit::default());
		assert!(editor.apply(LimitIntent::NoEstimate(true)).is_err());
		assert!(editor.apply(LimitIntent::Text(LimitKind::Pr, "5".to_owned())).is_err());
		assert!(editor.is_valid());
		Ok(())
	}

	#[test]
	fn sasl_flag_transitions() -> Result<(), Box<dyn std::error::Error>> {
		let mut editor = SaslSecPropsEditor::new("noplain,noanonymous,nodict".parse()?);
		editor.apply(SaslIntent::Flag(SaslFlag::None, true))?;
		assert_eq!(editor.confirm()?, "none,nodict");

		editor.apply(SaslIntent::Flag(SaslFlag::NoAnonymous, true))?;
		assert!(!editor.props().has_flag(SaslFlag::None));
		editor.apply(SaslIntent::Flag(SaslFlag::NoDict, false))?;
		assert_eq!(editor.confirm()?, "noanonymous");
		Ok(())
	}

	#[test]
	fn sasl_values() -> Result<(), Box<dyn std::error::Error>> {
		let mut editor = SaslSecPropsEditor::default();
		editor.apply(SaslIntent::Value(SaslValue::MinSsf, "56".to_owned()))?;
		assert!(editor.apply(SaslIntent::Value(SaslValue::MaxSsf, "lots".to_owned())).is_err());
		assert!(editor.rejected(SaslValue::MaxSsf).is_some());
		assert!(editor.confirm().is_err());

		editor.apply(SaslIntent::Value(SaslValue::MaxSsf, "256".to_owned()))?;
		assert_eq!(editor.confirm()?, "minssf=56,maxssf=256");
		editor.apply(SaslIntent::Value(SaslValue::MinSsf, " ".to_owned()))?;
		assert_eq!(editor.confirm()?, "maxssf=256");
		Ok(())
	}
}
