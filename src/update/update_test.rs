use std::sync::Arc;

use mockall::predicate::eq;
use serde_json::json;
use serde_json::Value;

use crate::Dictionary;
use crate::DictionaryStore;
use crate::Error;
use crate::Event;
use crate::FallbackFormat;
use crate::FieldConfig;
use crate::FieldRef;
use crate::FieldUpdater;
use crate::MatchMode;
use crate::MockRecord;
use crate::Record;
use crate::RecordError;
use crate::UpdateSpec;

fn store(pairs: &[(&str, Value)]) -> Arc<DictionaryStore> {
    let entries: Dictionary = pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
    Arc::new(DictionaryStore::from_entries(entries, MatchMode::Exact).unwrap())
}

fn status_store() -> Arc<DictionaryStore> {
    store(&[("200", json!("OK")), ("300", json!("Redirect")), ("404", json!("Not Found"))])
}

fn field_config(source: &str) -> FieldConfig {
    FieldConfig {
        source: source.to_string(),
        ..Default::default()
    }
}

fn updater(
    config: FieldConfig,
    store: Arc<DictionaryStore>,
) -> FieldUpdater {
    FieldUpdater::new(UpdateSpec::from_config(&config, store).unwrap())
}

fn event(value: Value) -> Event {
    Event::from_json(&value.to_string()).unwrap()
}

fn field(reference: &str) -> FieldRef {
    FieldRef::parse(reference).unwrap()
}

/// Inclusion test followed by the update, as the filter runs them
fn run(
    updater: &FieldUpdater,
    event: &mut Event,
) -> bool {
    updater.test_for_inclusion(&*event) && updater.update(event).unwrap()
}

#[test]
fn shape_is_selected_from_iterate_on() {
    let single = updater(field_config("status"), status_store());
    assert!(matches!(single, FieldUpdater::SingleValue(_)));

    let mut config = field_config("[codes]");
    config.iterate_on = Some("codes".to_string());
    let values = updater(config, status_store());
    assert!(matches!(values, FieldUpdater::ArrayOfValues(_)));

    let mut config = field_config("[code]");
    config.iterate_on = Some("[hits]".to_string());
    let maps = updater(config, status_store());
    assert!(matches!(maps, FieldUpdater::ArrayOfMaps(_)));
}

#[test]
fn target_defaults_next_to_source() {
    let u = updater(field_config("[http][status]"), status_store());
    assert_eq!(u.spec().target, field("[http][status_translation]"));
}

#[test]
fn scalar_match_and_fallback() {
    let mut config = field_config("status");
    config.fallback = Some("no match".to_string());
    let u = updater(config, store(&[("foo", json!("bar"))]));

    let mut miss = event(json!({"status": "baz"}));
    assert!(run(&u, &mut miss));
    assert_eq!(miss.get(&field("status_translation")), Some(json!("no match")));

    let mut hit = event(json!({"status": "foo"}));
    assert!(run(&u, &mut hit));
    assert_eq!(hit.get(&field("status_translation")), Some(json!("bar")));
}

#[test]
fn scalar_without_fallback_leaves_record_untouched() {
    let u = updater(field_config("status"), status_store());
    let mut e = event(json!({"status": "999"}));

    assert!(!run(&u, &mut e));
    assert_eq!(e, event(json!({"status": "999"})));
}

#[test]
fn scalar_uses_first_array_element_and_coerces_numbers() {
    let mut config = field_config("status");
    config.target = Some("[out]".to_string());
    let u = updater(config, status_store());

    let mut e = event(json!({"status": ["300", "200"]}));
    assert!(run(&u, &mut e));
    assert_eq!(e.get(&field("out")), Some(json!("Redirect")));

    let mut e = event(json!({"status": 404}));
    assert!(run(&u, &mut e));
    assert_eq!(e.get(&field("out")), Some(json!("Not Found")));
}

#[test]
fn inclusion_requires_source_and_respects_override() {
    let mut config = field_config("status");
    config.target = Some("text".to_string());
    let keep = updater(config.clone(), status_store());
    config.override_existing = true;
    let overwrite = updater(config, status_store());

    let mut missing = event(json!({"other": "200"}));
    assert!(!keep.test_for_inclusion(&missing));
    assert!(!run(&overwrite, &mut missing));

    let mut existing = event(json!({"status": "200", "text": "old"}));
    assert!(!keep.test_for_inclusion(&existing));
    assert!(run(&overwrite, &mut existing));
    assert_eq!(existing.get(&field("text")), Some(json!("OK")));
}

#[test]
fn array_of_values_leaves_unmatched_positions_null() {
    let mut config = field_config("codes");
    config.iterate_on = Some("codes".to_string());
    let u = updater(config, store(&[("200", json!("OK")), ("300", json!("Redirect"))]));

    let mut e = event(json!({"codes": ["200", "400"]}));
    assert!(run(&u, &mut e));
    assert_eq!(e.get(&field("codes_translation")), Some(json!(["OK", null])));
}

#[test]
fn array_of_values_without_any_match_still_writes() {
    let mut config = field_config("codes");
    config.iterate_on = Some("codes".to_string());
    let u = updater(config, status_store());

    let mut e = event(json!({"codes": ["1", "2"]}));
    assert!(!run(&u, &mut e));
    assert_eq!(e.get(&field("codes_translation")), Some(json!([null, null])));
}

#[test]
fn array_of_values_fills_fallback_per_position() {
    let mut config = field_config("codes");
    config.iterate_on = Some("codes".to_string());
    config.fallback = Some("unknown from %{host}".to_string());
    let u = updater(config, status_store());

    let mut e = event(json!({"host": "web-1", "codes": ["200", "999", "300"]}));
    assert!(run(&u, &mut e));
    assert_eq!(
        e.get(&field("codes_translation")),
        Some(json!(["OK", "unknown from web-1", "Redirect"]))
    );
}

#[test]
fn array_of_maps_translates_each_object() {
    let mut config = field_config("[code]");
    config.iterate_on = Some("[hits]".to_string());
    config.target = Some("[text]".to_string());
    let u = updater(config, status_store());

    let mut e = event(json!({"hits": [{"code": "200"}, {"code": "500"}, {"code": "404"}]}));
    assert!(run(&u, &mut e));
    assert_eq!(
        e.get(&field("hits")),
        Some(json!([
            {"code": "200", "text": "OK"},
            {"code": "500"},
            {"code": "404", "text": "Not Found"}
        ]))
    );
}

#[test]
fn array_of_maps_checks_override_per_object() {
    let mut config = field_config("code");
    config.iterate_on = Some("hits".to_string());
    config.target = Some("text".to_string());
    let u = updater(config, status_store());

    let mut e = event(json!({"hits": [{"code": "200", "text": "keep"}, {"code": "300"}]}));
    assert!(run(&u, &mut e));
    assert_eq!(
        e.get(&field("hits")),
        Some(json!([{"code": "200", "text": "keep"}, {"code": "300", "text": "Redirect"}]))
    );
}

#[test]
fn array_of_maps_applies_fallback_when_nested_source_missing() {
    let mut config = field_config("code");
    config.iterate_on = Some("hits".to_string());
    config.fallback = Some("n/a".to_string());
    let u = updater(config, status_store());

    let mut e = event(json!({"hits": [{"other": 1}, {"code": "200"}]}));
    assert!(run(&u, &mut e));
    assert_eq!(e.get(&field("[hits][0][code_translation]")), Some(json!("n/a")));
    assert_eq!(e.get(&field("[hits][1][code_translation]")), Some(json!("OK")));
}

#[test]
fn array_of_maps_ignores_non_array_base() {
    let mut config = field_config("code");
    config.iterate_on = Some("hits".to_string());
    let u = updater(config, status_store());

    let mut e = event(json!({"hits": {"code": "200"}}));
    assert!(u.test_for_inclusion(&e));
    assert!(!u.update(&mut e).unwrap());
    assert!(!run(&u, &mut event(json!({"nothing": []}))));
}

#[test]
fn array_of_maps_fallback_error_leaves_objects_untouched() {
    let mut config = field_config("code");
    config.iterate_on = Some("hits".to_string());
    config.target = Some("text".to_string());
    config.fallback = Some("{not json".to_string());
    config.fallback_format = FallbackFormat::Json;
    let u = updater(config, status_store());

    let original = json!({"hits": [{"code": "200"}, {"code": "999"}]});
    let mut e = event(original.clone());
    let err = u.update(&mut e).unwrap_err();

    assert!(matches!(err, Error::Record(RecordError::Fallback { format: "json", .. })));
    assert_eq!(e.into_value(), original);
}

#[test]
fn array_of_maps_write_error_restores_array() {
    let mut config = field_config("code");
    config.iterate_on = Some("hits".to_string());
    config.fallback = Some("n/a".to_string());
    let u = updater(config, status_store());

    let original = json!({"hits": [{"code": "200"}, "scalar"]});
    let mut e = event(original.clone());
    let err = u.update(&mut e).unwrap_err();

    assert!(matches!(err, Error::Record(RecordError::PathConflict { .. })));
    assert_eq!(e.into_value(), original);
}

#[test]
fn array_of_maps_rewrites_original_array_after_failed_set() {
    let mut config = field_config("code");
    config.iterate_on = Some("hits".to_string());
    let u = updater(config, status_store());

    let hits = json!([{"code": "200"}, {"code": "404"}]);
    let mut record = MockRecord::new();
    let array = hits.clone();
    record
        .expect_get()
        .with(eq(field("hits")))
        .returning(move |_| Some(array.clone()));
    record
        .expect_get()
        .with(eq(field("[hits][0][code]")))
        .returning(|_| Some(json!("200")));
    record
        .expect_get()
        .with(eq(field("[hits][1][code]")))
        .returning(|_| Some(json!("404")));
    record.expect_includes().returning(|_| false);
    record
        .expect_set()
        .with(eq(field("[hits][0][code_translation]")), eq(json!("OK")))
        .times(1)
        .returning(|_, _| Ok(()));
    record
        .expect_set()
        .with(eq(field("[hits][1][code_translation]")), eq(json!("Not Found")))
        .times(1)
        .returning(|_, _| Err(Error::Fatal("out of memory".to_string())));
    record
        .expect_set()
        .with(eq(field("hits")), eq(hits))
        .times(1)
        .returning(|_, _| Ok(()));

    let err = u.update(&mut record).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn json_fallback_is_deserialized() {
    let mut config = field_config("status");
    config.fallback = Some(r#"{"code": "%{status}", "known": false}"#.to_string());
    config.fallback_format = FallbackFormat::Json;
    let u = updater(config, status_store());

    let mut e = event(json!({"status": "999"}));
    assert!(run(&u, &mut e));
    assert_eq!(
        e.get(&field("status_translation")),
        Some(json!({"code": "999", "known": false}))
    );
}

#[test]
fn yaml_fallback_is_deserialized() {
    let mut config = field_config("status");
    config.fallback = Some("labels: [unknown, \"%{status}\"]".to_string());
    config.fallback_format = FallbackFormat::Yaml;
    let u = updater(config, status_store());

    let mut e = event(json!({"status": "999"}));
    assert!(run(&u, &mut e));
    assert_eq!(
        e.get(&field("status_translation")),
        Some(json!({"labels": ["unknown", "999"]}))
    );
}

#[test]
fn malformed_fallback_is_a_record_error() {
    let mut config = field_config("status");
    config.fallback = Some("{not json".to_string());
    config.fallback_format = FallbackFormat::Json;
    let u = updater(config, status_store());

    let mut e = event(json!({"status": "999"}));
    let err = u.update(&mut e).unwrap_err();
    assert!(matches!(err, Error::Record(RecordError::Fallback { format: "json", .. })));
    assert!(!err.is_fatal());
    assert!(!e.includes(&field("status_translation")));
}

#[test]
fn scalar_update_writes_through_record_trait() {
    let u = updater(field_config("status"), status_store());

    let mut record = MockRecord::new();
    record
        .expect_get()
        .with(eq(field("status")))
        .returning(|_| Some(json!("200")));
    record
        .expect_set()
        .with(eq(field("status_translation")), eq(json!("OK")))
        .times(1)
        .returning(|_, _| Ok(()));

    assert!(u.update(&mut record).unwrap());
}

#[test]
fn record_write_errors_propagate_from_update() {
    let u = updater(field_config("status"), status_store());

    let mut record = MockRecord::new();
    record.expect_get().returning(|_| Some(json!("200")));
    record
        .expect_set()
        .returning(|_, _| Err(Error::Fatal("out of memory".to_string())));

    let err = u.update(&mut record).unwrap_err();
    assert!(err.is_fatal());
}
