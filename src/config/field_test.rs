use super::*;

fn source(source: &str) -> FieldConfig {
    FieldConfig {
        source: source.to_string(),
        ..Default::default()
    }
}

#[test]
fn bare_and_bracket_references_validate() {
    for reference in ["status", "[status]", "[http][response][0]"] {
        assert!(source(reference).validate().is_ok(), "{reference}");
    }
}

#[test]
fn blank_source_is_rejected() {
    assert!(source("").validate().is_err());
    assert!(source("   ").validate().is_err());
}

#[test]
fn malformed_references_are_rejected() {
    for reference in ["[unclosed", "a]b", "[a]b", "[]"] {
        assert!(source(reference).validate().is_err(), "{reference}");
    }

    let mut config = source("status");
    config.iterate_on = Some("[hits".to_string());
    assert!(config.validate().is_err());

    let mut config = source("status");
    config.target = Some("x]".to_string());
    assert!(config.validate().is_err());
}

#[test]
fn fallback_template_references_are_checked() {
    let mut config = source("status");
    config.fallback = Some("unknown %{[http][status]}".to_string());
    assert!(config.validate().is_ok());

    config.fallback = Some("unknown %{[broken}".to_string());
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("field.fallback"));
}

#[test]
fn override_key_is_renamed() {
    let config: FieldConfig =
        serde_json::from_str(r#"{"source": "a", "override": true, "fallback_format": "yaml"}"#).unwrap();

    assert!(config.override_existing);
    assert_eq!(config.fallback_format, FallbackFormat::Yaml);
}
