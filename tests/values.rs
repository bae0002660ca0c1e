#![allow(clippy::missing_docs_in_private_items, clippy::unwrap_used)]
use std::{error::Error, fmt, str::FromStr};

use slapd_config::{
	AccessLogPurge, DbIndex, ErrorKind, GlobalConfig, Interval, KeepAlive, LimitEditor,
	LimitIntent, LimitKind, LimitValue, Limits, LogLevel, ParseError, Retry, RetryCount, SaslFlag,
	SaslIntent, SaslSecProps, SaslSecPropsEditor, Security, ServerId, SizeLimit, SyncRepl,
	TcpBuffer, TimeLimit, TimeSpan, UnixPermissions,
};

/// Parse every input, then check that the printed form parses back to the
/// same value and prints the same again.
fn reads_back<T>(inputs: &[&str]) -> Result<(), Box<dyn Error>>
where
	T: FromStr<Err = ParseError> + fmt::Display + fmt::Debug + PartialEq,
{
	for input in inputs {
		let value: T = input.parse()?;
		let printed = value.to_string();
		let reparsed: T = printed.parse()?;
		assert_eq!(reparsed, value, "{input:?} printed as {printed:?}");
		assert_eq!(reparsed.to_string(), printed, "{input:?}");
	}
	Ok(())
}

#[test]
fn purge_time_spans() -> Result<(), Box<dyn Error>> {
	let span: TimeSpan = "1+02:03:04".parse()?;
	assert_eq!((span.days(), span.hours(), span.minutes(), span.seconds()), (1, 2, 3, 4));
	assert_eq!(span.to_string(), "1+02:03:04");

	let span: TimeSpan = "02:03".parse()?;
	assert_eq!(span.seconds(), 0);
	assert_eq!(span.to_string(), "02:03");

	let err = "25:00".parse::<TimeSpan>().unwrap_err();
	assert_eq!(err.kind, ErrorKind::OutOfRange);

	let purge: AccessLogPurge = "07+00:00 01:00".parse()?;
	assert_eq!(purge.age.days(), 7);
	assert_eq!(purge.to_string(), "7+00:00 01:00");
	Ok(())
}

#[test]
fn limits_and_retry() -> Result<(), Box<dyn Error>> {
	let size: SizeLimit = "size.soft=100 size.hard=unlimited".parse()?;
	assert_eq!(size.soft, Some(LimitValue::Value(100)));
	assert_eq!(size.hard, Some(LimitValue::Unlimited));
	assert_eq!(size.to_string().parse::<SizeLimit>()?, size);

	let retry: Retry = "60 3 300 +".parse()?;
	let pairs = retry.pairs();
	assert_eq!((pairs[0].interval, pairs[0].count), (60, RetryCount::Times(3)));
	assert_eq!((pairs[1].interval, pairs[1].count), (300, RetryCount::Forever));
	assert_eq!(retry.to_string(), "60 3 300 +");
	Ok(())
}

#[test]
fn edit_session() -> Result<(), Box<dyn Error>> {
	let mut time: LimitEditor<TimeLimit> = "time=3600".parse()?;
	time.apply(LimitIntent::Text(LimitKind::Soft, "60".to_owned()))?;
	time.apply(LimitIntent::Unlimited(LimitKind::Hard, true))?;
	assert_eq!(time.confirm()?, "time.soft=60 time.hard=unlimited");

	let mut sasl = SaslSecPropsEditor::default();
	sasl.apply(SaslIntent::Flag(SaslFlag::NoPlain, true))?;
	sasl.apply(SaslIntent::Flag(SaslFlag::None, true))?;
	assert_eq!(sasl.confirm()?, "none");
	Ok(())
}

#[test]
fn serde_uses_canonical_strings() -> Result<(), Box<dyn Error>> {
	let global: GlobalConfig = serde_json::from_str(
		r#"{
			"size_limit": "SIZE.SOFT=10",
			"time_limit": null,
			"sasl_sec_props": "noanonymous, minssf=1",
			"server_ids": ["1 ldap://a.example.com"],
			"security": "tls=128"
		}"#,
	)?;
	assert_eq!(global.size_limit.unwrap().soft, Some(LimitValue::Value(10)));
	assert!(global.tcp_buffers.is_empty());

	let json = serde_json::to_value(&global)?;
	assert_eq!(json["size_limit"], "size.soft=10");
	assert_eq!(json["sasl_sec_props"], "noanonymous,minssf=1");

	let err = serde_json::from_str::<SizeLimit>(r#""size.soft=x""#).unwrap_err();
	assert!(err.to_string().contains("position"));
	Ok(())
}

#[test]
fn canonical_forms_read_back() -> Result<(), Box<dyn Error>> {
	reads_back::<LimitValue>(&["0", "500", "-1", "NONE", "unlimited", "disabled", "soft", "hard"])?;
	reads_back::<TimeSpan>(&["00:00", "23:59", "1+02:03:04", "007+00:00:59"])?;
	reads_back::<AccessLogPurge>(&["07+00:00 01+00:00", "1:00 0:30:15"])?;
	reads_back::<SizeLimit>(&[
		"",
		"500",
		"size.soft=100 size.hard=unlimited",
		"SIZE=NONE Size.Unchecked=Disabled size.PR=NoEstimate",
		"size.pr=10 size.prtotal=hard size.hard=soft",
	])?;
	reads_back::<TimeLimit>(&["", "3600", "TIME.Hard=Soft time.soft=-1", "time=unlimited"])?;
	reads_back::<Limits>(&[
		"* size=100",
		"{2}Anonymous time.soft=10 size.hard=unlimited",
		r#"dn.one="dc=example" size=5"#,
		r#"dn.regex="cn=\"x\",dc=org" size=1"#,
		r#"group/groupOfNames/member="cn=admins,dc=example,dc=org" time=unlimited"#,
	])?;
	reads_back::<SaslSecProps>(&["", "none", "noplain, NOANONYMOUS minssf=56,maxbufsize=65536"])?;
	reads_back::<Retry>(&["60 +", "5 5 300 +", "  10   3  "])?;
	reads_back::<Interval>(&["01:02:03:04", "00:30:00"])?;
	reads_back::<KeepAlive>(&["240:10:30", "0:0:0"])?;
	reads_back::<TcpBuffer>(&["65536", "listener=ldap://localhost:389 READ=4096", "write=0"])?;
	reads_back::<ServerId>(&["0", "0x2A", "1 ldap://provider1.example.com"])?;
	reads_back::<Security>(&["ssf=1 update_tls=256", "Simple_Bind=128"])?;
	reads_back::<DbIndex>(&["objectClass", "cn,sn EQ,sub,eq", "default pres,eq"])?;
	reads_back::<LogLevel>(&["", "any", "-1", "stats sync", "ACL 0x1000 1"])?;
	reads_back::<UnixPermissions>(&["", "0600", "384", "-rw-r-----"])?;
	reads_back::<SyncRepl>(&[
		"rid=1",
		"{3}rid=001 provider=ldaps://ldapmaster.symas.com:389 binddn=\"cn=config\" \
		 bindmethod=simple credentials=secret searchbase=\"cn=config\" \
		 type=refreshAndPersist retry=\"5 5 300 5\" timeout=1",
		"rid=123 type=refreshOnly interval=01:00:00:00 filter='(cn=\\'x\\')' scope=sub \
		 attrs=cn,sn attrsonly sizelimit=-1 schemachecking=off keepalive=1:2:3 \
		 secprops=noplain starttls=critical tls_reqcert=demand tls_crlcheck=all \
		 syncdata=changelog",
	])?;
	Ok(())
}
