use context_codec::{
    ContextSerializer, ContextValue, CustomValue, Error, ExecutionContext, JobParameter, Locale,
};

fn write_to_string(codec: &ContextSerializer, context: &ExecutionContext) -> String {
    let mut blob = Vec::new();
    codec.write(context, &mut blob).unwrap();
    String::from_utf8(blob).unwrap()
}

// ---- envelope shape ---------------------------------------------------------

#[test]
fn every_entry_is_a_two_field_envelope() {
    let mut context = ExecutionContext::new();
    context.insert("a", ContextValue::Long(1));
    context.insert("b", ContextValue::from("two"));
    context.insert("c", ContextValue::List(vec![ContextValue::from("x")]));

    let doc = write_to_string(&ContextSerializer::new(), &context);
    let parsed: serde_json::Value = serde_json::from_str(&doc).unwrap();

    let top = parsed.as_object().unwrap();
    assert_eq!(top.len(), 3);
    for (_, envelope) in top {
        let envelope = envelope.as_object().unwrap();
        let keys: Vec<&str> = envelope.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["@class", "value"]);
    }
}

#[test]
fn class_precedes_value_in_output() {
    let mut context = ExecutionContext::new();
    context.insert("entry", ContextValue::Long(5));

    let doc = write_to_string(&ContextSerializer::new(), &context);
    assert!(doc.find("\"@class\"").unwrap() < doc.find("\"value\"").unwrap());
    assert!(doc.contains("\"@class\":\"java.lang.Long\""));
}

#[test]
fn parameter_envelope_matches_wire_format() {
    let mut context = ExecutionContext::new();
    context.insert(
        "name",
        ContextValue::Parameter(JobParameter::string("foo", true)),
    );

    let doc = write_to_string(&ContextSerializer::new(), &context);
    let parsed: serde_json::Value = serde_json::from_str(&doc).unwrap();

    assert_eq!(
        parsed["name"]["@class"],
        serde_json::json!("org.springframework.batch.core.JobParameter")
    );
    assert_eq!(
        parsed["name"]["value"],
        serde_json::json!({
            "type": "java.lang.String",
            "value": "foo",
            "identifying": true
        })
    );
}

#[test]
fn locale_emits_underscore_form() {
    let mut context = ExecutionContext::new();
    context.insert(
        "locale",
        ContextValue::Locale(Locale::with_country("de", "CH")),
    );

    let doc = write_to_string(&ContextSerializer::new(), &context);
    let parsed: serde_json::Value = serde_json::from_str(&doc).unwrap();
    assert_eq!(parsed["locale"]["value"], serde_json::json!("de_CH"));
}

#[test]
fn pretty_output_roundtrips() {
    let codec = ContextSerializer::builder().pretty(true).build();
    let mut context = ExecutionContext::new();
    context.insert("entry", ContextValue::Long(5));

    let doc = write_to_string(&codec, &context);
    assert!(doc.contains('\n'));
    assert_eq!(codec.read(doc.as_bytes()).unwrap(), context);
}

// ---- collection tag normalization -------------------------------------------

#[test]
fn non_public_singleton_list_decodes_to_public_list() {
    let doc = r#"{"list": {"@class": "java.util.Collections$SingletonList", "value": ["foo"]}}"#;
    let restored = ContextSerializer::new().read(doc.as_bytes()).unwrap();

    assert_eq!(
        restored.get("list"),
        Some(&ContextValue::List(vec![ContextValue::from("foo")]))
    );

    // Re-encoding names the canonical public implementation.
    let redoc = write_to_string(&ContextSerializer::new(), &restored);
    assert!(redoc.contains("\"@class\":\"java.util.ArrayList\""));
}

#[test]
fn immutable_map_alias_decodes_to_map() {
    let doc = r#"{"m": {"@class": "java.util.ImmutableCollections$Map1", "value": {"k": 1}}}"#;
    let restored = ContextSerializer::new().read(doc.as_bytes()).unwrap();
    match restored.get("m") {
        Some(ContextValue::Map(entries)) => {
            assert_eq!(entries.get("k"), Some(&ContextValue::Long(1)));
        }
        other => panic!("expected map, got {other:?}"),
    }
}

// ---- failure taxonomy -------------------------------------------------------

#[test]
fn unknown_class_is_rejected() {
    let doc = r#"{"x": {"@class": "com.example.DoesNotExist", "value": 1}}"#;
    let err = ContextSerializer::new().read(doc.as_bytes()).unwrap_err();
    assert_eq!(err, Error::ClassNotFound("com.example.DoesNotExist".into()));
}

#[test]
fn extra_envelope_key_is_a_schema_error() {
    let doc = r#"{"x": {"@class": "java.lang.Long", "value": 1, "extra": 2}}"#;
    let err = ContextSerializer::new().read(doc.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::Schema(_)), "got {err:?}");
}

#[test]
fn value_before_class_is_a_schema_error() {
    let doc = r#"{"x": {"value": 1, "@class": "java.lang.Long"}}"#;
    let err = ContextSerializer::new().read(doc.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::Schema(_)), "got {err:?}");
}

#[test]
fn missing_value_is_a_schema_error() {
    let doc = r#"{"x": {"@class": "java.lang.Long"}}"#;
    let err = ContextSerializer::new().read(doc.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::Schema(_)), "got {err:?}");
}

#[test]
fn null_payload_is_a_schema_error() {
    let doc = r#"{"x": {"@class": "java.lang.Long", "value": null}}"#;
    let err = ContextSerializer::new().read(doc.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::Schema(_)), "got {err:?}");
}

#[test]
fn bare_scalar_entry_is_a_schema_error() {
    let doc = r#"{"x": 12345}"#;
    let err = ContextSerializer::new().read(doc.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::Schema(_)), "got {err:?}");
}

#[test]
fn trailing_garbage_is_a_schema_error() {
    let doc = "{} trailing";
    let err = ContextSerializer::new().read(doc.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::Schema(_)), "got {err:?}");
}

#[test]
fn mistyped_payload_is_a_schema_error() {
    let doc = r#"{"x": {"@class": "java.lang.Long", "value": "not a number"}}"#;
    let err = ContextSerializer::new().read(doc.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::Schema(_)), "got {err:?}");
}

#[test]
fn malformed_locale_in_document_is_invalid_argument() {
    let doc = r#"{"x": {"@class": "java.util.Locale", "value": "_CH"}}"#;
    let err = ContextSerializer::new().read(doc.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "got {err:?}");
}

#[test]
fn top_level_null_write_is_invalid_argument() {
    let mut context = ExecutionContext::new();
    context.insert("x", ContextValue::Null);

    let mut blob = Vec::new();
    let err = ContextSerializer::new()
        .write(&context, &mut blob)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "got {err:?}");
    assert!(blob.is_empty(), "no document may be produced on failure");
}

#[test]
fn unregistered_custom_tag_fails_closed_on_read() {
    let codec = ContextSerializer::new();
    let mut context = ExecutionContext::new();
    context.insert(
        "widget",
        ContextValue::Custom(CustomValue::new(
            "com.example.Widget",
            serde_json::json!({"id": 1}),
        )),
    );

    // Writing is fine; only decoding resolves tags.
    let doc = write_to_string(&codec, &context);
    let err = codec.read(doc.as_bytes()).unwrap_err();
    assert_eq!(err, Error::ClassNotFound("com.example.Widget".into()));
}

#[test]
fn sink_failure_surfaces_as_io_error() {
    struct FailingSink;

    impl std::io::Write for FailingSink {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "down"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "down"))
        }
    }

    let mut context = ExecutionContext::new();
    context.insert("entry", ContextValue::Long(5));

    let err = ContextSerializer::new()
        .write(&context, FailingSink)
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)), "got {err:?}");
}

#[test]
fn truncated_source_surfaces_as_schema_error() {
    let doc = r#"{"x": {"@class": "java.lang.Long", "va"#;
    let err = ContextSerializer::new().read(doc.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::Schema(_)), "got {err:?}");
}
