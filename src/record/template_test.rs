use serde_json::json;

use crate::Event;
use crate::Template;

fn event(value: serde_json::Value) -> Event {
    Event::from_json(&value.to_string()).unwrap()
}

#[test]
fn static_text_renders_unchanged() {
    let template = Template::parse("no match").unwrap();
    assert_eq!(template.render(&Event::new()), "no match");
}

#[test]
fn references_are_interpolated_from_the_record() {
    let template = Template::parse("%{missing_translation}").unwrap();
    let e = event(json!({"status": "200", "missing_translation": "missing no match"}));

    assert_eq!(template.render(&e), "missing no match");
}

#[test]
fn nested_and_non_string_values_are_rendered() {
    let template = Template::parse("code %{[http][status]} ok=%{[http][ok]} tags=%{tags}").unwrap();
    let e = event(json!({"http": {"status": 503, "ok": false}, "tags": ["a", "b"]}));

    assert_eq!(template.render(&e), r#"code 503 ok=false tags=["a","b"]"#);
}

#[test]
fn missing_reference_is_left_verbatim() {
    let template = Template::parse("unknown %{[http][status]}").unwrap();
    assert_eq!(template.render(&Event::new()), "unknown %{[http][status]}");
}

#[test]
fn unterminated_reference_is_literal() {
    let template = Template::parse("100%{ done").unwrap();
    assert_eq!(template.render(&Event::new()), "100%{ done");
}

#[test]
fn malformed_reference_is_an_error() {
    assert!(Template::parse("%{[broken}").is_err());
}
