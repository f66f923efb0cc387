use panos_xapi::firewall::check_status;
use panos_xapi::{parse_str, ApiError};

const TRAFFIC_LOGS: &str = r#"<?xml version="1.0"?>
<response status="success">
  <result>
    <job>
      <tenq>10:02:11</tenq>
      <id>1042</id>
      <status>FIN</status>
    </job>
    <log>
      <logs count="2" progress="100">
        <entry logid="7181916543213813761">
          <receive_time>2024/01/31 10:00:02</receive_time>
          <src>10.0.0.5</src>
          <dst>8.8.8.8</dst>
          <app>dns</app>
        </entry>
        <entry logid="7181916543213813762">
          <receive_time>2024/01/31 10:00:04</receive_time>
          <src>10.0.0.9</src>
          <rule><![CDATA[allow-web]]></rule>
          <natsrc/>
        </entry>
      </logs>
    </log>
  </result>
</response>
"#;

#[test]
fn parses_log_entries_with_sparse_fields() {
    let response = check_status(parse_str(TRAFFIC_LOGS).expect("parse")).expect("success");

    let entries = response.find_all("entry");
    assert_eq!(entries.len(), 2);

    let first = entries[0];
    assert_eq!(first.attribute("logid"), Some("7181916543213813761"));
    assert_eq!(first.get_text(&["app"]), Some("dns"));
    assert!(first.get_child("rule").is_none());

    let second = entries[1];
    assert_eq!(second.get_text(&["rule"]), Some("allow-web"));
    assert!(second.get_child("natsrc").is_some());
    assert_eq!(second.get_text(&["natsrc"]), None);
}

#[test]
fn job_header_is_not_mistaken_for_entries() {
    let response = parse_str(TRAFFIC_LOGS).expect("parse");
    assert_eq!(response.get_text(&["result", "job", "status"]), Some("FIN"));
    assert_eq!(
        response
            .get_child("result")
            .and_then(|r| r.get_child("log"))
            .and_then(|l| l.get_child("logs"))
            .and_then(|l| l.attribute("count")),
        Some("2")
    );
}

#[test]
fn error_response_becomes_device_error() {
    let doc = parse_str(
        r#"<response status="error" code="403"><result><msg>Invalid credentials.</msg></result></response>"#,
    )
    .expect("parse");

    let err = check_status(doc).expect_err("error status");
    assert!(matches!(err, ApiError::Device { .. }));
    assert_eq!(err.to_string(), "device error (code 403): Invalid credentials.");
}

#[test]
fn escaped_text_is_decoded() {
    let doc = parse_str("<response status=\"success\"><result><msg>a &amp; b &lt;c&gt;</msg></result></response>")
        .expect("parse");
    assert_eq!(doc.get_text(&["result", "msg"]), Some("a & b <c>"));
}
