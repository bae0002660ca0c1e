use std::error::Error;

use ldap3::{LdapConnAsync, Scope, SearchEntry};
use slapd_config::{Config, ConnectionConfig};
use url::Url;

pub const LDAP_URL: &str = "ldap://localhost:1389";
pub const CONFIG_ADMIN: &str = "cn=admin,cn=config";
pub const CONFIG_PASSWORD: &str = "configpassword";

pub fn client_config() -> Result<Config, Box<dyn Error>> {
	Ok(Config {
		url: Url::parse(LDAP_URL)?,
		connection: ConnectionConfig::default(),
		bind_dn: CONFIG_ADMIN.to_owned(),
		bind_password: CONFIG_PASSWORD.to_owned(),
		config_base: "cn=config".to_owned(),
	})
}

pub async fn ldap_connect() -> Result<ldap3::Ldap, Box<dyn Error>> {
	let (conn, mut ldap) = LdapConnAsync::new(LDAP_URL).await?;
	let _handle = tokio::spawn(async move {
		if let Err(err) = conn.drive().await {
			panic!("Ldap connection error {err}");
		}
	});
	ldap.simple_bind(CONFIG_ADMIN, CONFIG_PASSWORD).await?.success()?;
	Ok(ldap)
}

/// The RDN of the first database of the given type, e.g. `olcDatabase={2}mdb`
pub async fn ldap_find_database(
	ldap: &mut ldap3::Ldap,
	db_type: &str,
) -> Result<String, Box<dyn Error>> {
	let (result, _res) = ldap
		.search(
			"cn=config",
			Scope::OneLevel,
			&format!("(olcDatabase=*{db_type})"),
			vec!["olcDatabase"],
		)
		.await?
		.success()?;
	let entry = SearchEntry::construct(result.first().ok_or("No database found")?.clone());
	let rdn = entry.dn.split(',').next().ok_or("Empty DN")?;
	Ok(rdn.to_owned())
}

pub async fn ldap_read_attribute(
	ldap: &mut ldap3::Ldap,
	dn: &str,
	attribute: &str,
) -> Result<Vec<String>, Box<dyn Error>> {
	let (result, _res) =
		ldap.search(dn, Scope::Base, "(objectClass=*)", vec![attribute]).await?.success()?;
	let entry = SearchEntry::construct(result.first().ok_or("No entry found")?.clone());
	Ok(entry.attrs.get(attribute).cloned().unwrap_or_default())
}

pub async fn ldap_replace_attribute(
	ldap: &mut ldap3::Ldap,
	dn: &str,
	attribute: &str,
	values: &[&str],
) -> Result<(), Box<dyn Error>> {
	ldap.modify(dn, vec![ldap3::Mod::Replace(attribute, values.iter().copied().collect())])
		.await?
		.success()?;
	Ok(())
}
