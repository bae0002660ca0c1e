//! Unix file permissions, as used by `olcDbMode` for the files of a database.
//! Three spellings are accepted: octal with a leading zero (`0600`), decimal
//! (`384`) and the symbolic form `ls -l` prints (`-rw-------`).
use std::{fmt, str::FromStr};

use crate::{error::ParseError, text::string_serde};

/// Largest mode, every permission granted
const MAX_MODE: u16 = 0o777;

/// Read, write and execute permissions of a file's owner, group and others
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UnixPermissions(u16);

impl UnixPermissions {
	/// Permissions from a mode, `None` if it has bits above `0o777`
	#[must_use]
	pub fn from_mode(mode: u16) -> Option<Self> {
		(mode <= MAX_MODE).then_some(Self(mode))
	}

	/// The mode
	#[must_use]
	pub fn mode(self) -> u16 {
		self.0
	}

	/// Whether a bit of the mode is set
	fn has(self, bit: u16) -> bool {
		self.0 & bit != 0
	}

	/// The owner may read
	#[must_use]
	pub fn owner_read(self) -> bool {
		self.has(0o400)
	}

	/// The owner may write
	#[must_use]
	pub fn owner_write(self) -> bool {
		self.has(0o200)
	}

	/// The owner may execute
	#[must_use]
	pub fn owner_execute(self) -> bool {
		self.has(0o100)
	}

	/// The group may read
	#[must_use]
	pub fn group_read(self) -> bool {
		self.has(0o040)
	}

	/// The group may write
	#[must_use]
	pub fn group_write(self) -> bool {
		self.has(0o020)
	}

	/// The group may execute
	#[must_use]
	pub fn group_execute(self) -> bool {
		self.has(0o010)
	}

	/// Everybody else may read
	#[must_use]
	pub fn others_read(self) -> bool {
		self.has(0o004)
	}

	/// Everybody else may write
	#[must_use]
	pub fn others_write(self) -> bool {
		self.has(0o002)
	}

	/// Everybody else may execute
	#[must_use]
	pub fn others_execute(self) -> bool {
		self.has(0o001)
	}

	/// `-rwxrwxrwx`, a dash for every permission not granted
	fn symbolic(s: &str) -> Result<u16, ParseError> {
		let mut mode = 0;
		let mut slots = 0;
		for (slot, (pos, c)) in s.char_indices().skip(1).enumerate() {
			let letter = ['r', 'w', 'x'][slot % 3];
			if slot >= 9 {
				return Err(ParseError::invalid("Symbolic permissions are ten characters long")
					.at(pos));
			}
			if c == letter {
				mode |= 0o400 >> slot;
			} else if c != '-' {
				return Err(ParseError::invalid(format!("Expected '{letter}' or '-'")).at(pos));
			}
			slots += 1;
		}
		if slots < 9 {
			return Err(
				ParseError::invalid("Symbolic permissions are ten characters long").at(s.len())
			);
		}
		Ok(mode)
	}

	/// Octal or decimal digits
	fn numeric(digits: &str, radix: u32) -> Result<u16, ParseError> {
		if let Some(pos) = digits.find(|c: char| !c.is_digit(radix)) {
			let base = if radix == 8 { "octal" } else { "decimal" };
			return Err(ParseError::invalid(format!("Invalid {base} digit in mode")).at(pos));
		}
		match u16::from_str_radix(digits, radix) {
			Ok(mode) if mode <= MAX_MODE => Ok(mode),
			_ => Err(ParseError::out_of_range("A mode may not exceed 0777").at(0)),
		}
	}

	/// Parse with errors positioned by byte offset
	fn scan(s: &str) -> Result<Self, ParseError> {
		let mode = match s.chars().next() {
			None => 0,
			Some('-') => Self::symbolic(s)?,
			Some('0') => Self::numeric(s, 8)?,
			Some(_) => Self::numeric(s, 10)?,
		};
		Ok(Self(mode))
	}
}

impl FromStr for UnixPermissions {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::scan(s).map_err(|err| err.in_chars(s))
	}
}

impl fmt::Display for UnixPermissions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:04o}", self.0)
	}
}

string_serde!(UnixPermissions);
