//! Helper methods for extracting configuration values from search results.
use std::str::FromStr;

use ldap3::SearchEntry;

use crate::error::{Error, ParseError};

/// An extension trait for [`SearchEntry`] that provides convenience methods for
/// extracting data.
pub trait SearchEntryExt {
	/// Get the first value of an attribute. Will return `None` if attribute
	/// value is not valid UTF-8.
	fn attr_first(&self, attr: &str) -> Option<&str>;

	/// Get every value of an attribute, in the order the server returned them
	fn attr_all(&self, attr: &str) -> &[String];

	/// Parse the first value of an attribute
	fn parse_first<T>(&self, attr: &str) -> Option<Result<T, Error>>
	where
		T: FromStr<Err = ParseError>,
	{
		self.attr_first(attr).map(|raw| parse_value(attr, raw))
	}

	/// Parse every value of an attribute
	fn parse_all<T>(&self, attr: &str) -> Result<Vec<T>, Error>
	where
		T: FromStr<Err = ParseError>,
	{
		self.attr_all(attr).iter().map(|raw| parse_value(attr, raw)).collect()
	}
}

impl SearchEntryExt for SearchEntry {
	fn attr_first(&self, attr: &str) -> Option<&str> {
		let attr = self.attrs.get(attr)?;
		attr.first().map(String::as_str)
	}

	fn attr_all(&self, attr: &str) -> &[String] {
		self.attrs.get(attr).map_or(&[], Vec::as_slice)
	}
}

/// Parse one attribute value, naming the attribute on failure
fn parse_value<T: FromStr<Err = ParseError>>(attr: &str, raw: &str) -> Result<T, Error> {
	raw.parse().map_err(|source| Error::Parse { attribute: attr.to_owned(), source })
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use ldap3::SearchEntry;

	use super::SearchEntryExt;
	use crate::{error::Error, server_id::ServerId, size_limit::SizeLimit};

	fn entry(attrs: &[(&str, &[&str])]) -> SearchEntry {
		SearchEntry {
			dn: String::from("cn=config"),
			attrs: attrs
				.iter()
				.map(|(name, values)| {
					((*name).to_owned(), values.iter().map(|v| (*v).to_owned()).collect())
				})
				.collect(),
			bin_attrs: HashMap::default(),
		}
	}

	#[test]
	fn attr_first() {
		let entry = entry(&[("olcServerID", &["1 ldap://a", "2 ldap://b"])]);
		assert_eq!(
			entry.attr_first("attribute_does_not_exist"),
			None,
			"Undefined attributes should return None"
		);
		assert_eq!(entry.attr_first("olcServerID"), Some("1 ldap://a"), "Should return the first value");
		assert_eq!(entry.attr_all("olcServerID").len(), 2);
		assert!(entry.attr_all("olcTCPBuffer").is_empty());
	}

	#[test]
	fn parse_values() -> Result<(), Box<dyn std::error::Error>> {
		let entry = entry(&[
			("olcSizeLimit", &["size.soft=100 size.hard=unlimited"]),
			("olcServerID", &["1 ldap://a", "2 ldap://b"]),
		]);
		let size: SizeLimit = entry.parse_first("olcSizeLimit").transpose()?.unwrap_or_default();
		assert_eq!(size.to_string(), "size.soft=100 size.hard=unlimited");

		let servers: Vec<ServerId> = entry.parse_all("olcServerID")?;
		assert_eq!(servers.iter().map(|s| s.id).collect::<Vec<_>>(), [1, 2]);
		Ok(())
	}

	#[test]
	fn parse_failure_names_attribute() {
		let entry = entry(&[("olcSizeLimit", &["size.bogus=1"])]);
		let result: Option<Result<SizeLimit, Error>> = entry.parse_first("olcSizeLimit");
		match result {
			Some(Err(Error::Parse { attribute, .. })) => assert_eq!(attribute, "olcSizeLimit"),
			other => panic!("unexpected result {other:?}"),
		}
	}
}
