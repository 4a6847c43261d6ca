//! Property-based tests using proptest
//!
//! These tests verify env file parsing, masking, URL building, event
//! parsing and resource name handling using randomized inputs.

use gcpkit::config::{mask, parse_env_file};
use gcpkit::firestore::field_paths;
use gcpkit::gcp::auth::validate_project_id;
use gcpkit::gcp::client::add_query_params;
use gcpkit::resource::short_name;
use gcpkit::trigger::{EventError, StorageEvent};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

/// Env keys as they appear in real files
fn arb_key() -> impl Strategy<Value = String> {
    "[A-Z][A-Z0-9_]{0,20}"
}

/// Unquoted values without comment markers or surrounding whitespace
fn arb_plain_value() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_./:@-]{0,30}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_env_file_keeps_every_assignment(
        pairs in prop::collection::vec((arb_key(), arb_plain_value()), 0..20)
    ) {
        let content: String = pairs
            .iter()
            .map(|(k, v)| format!("{}={}\n", k, v))
            .collect();

        prop_assert_eq!(parse_env_file(&content), pairs);
    }

    #[test]
    fn test_env_file_ignores_comments_and_blanks(
        key in arb_key(),
        value in "[A-Za-z0-9_./:@-]{1,30}",
        comment in "[ -~]{0,40}",
    ) {
        let content = format!("# {}\n\n   \nexport {}={} # {}\n", comment, key, value, comment);

        prop_assert_eq!(parse_env_file(&content), vec![(key, value)]);
    }

    #[test]
    fn test_double_quoted_values_keep_spaces_and_hashes(
        key in arb_key(),
        value in "[A-Za-z0-9 #=]{0,30}",
    ) {
        let content = format!("{}=\"{}\"", key, value);

        prop_assert_eq!(parse_env_file(&content), vec![(key, value)]);
    }

    #[test]
    fn test_parse_never_panics(content in "\\PC{0,200}") {
        let _ = parse_env_file(&content);
    }

    #[test]
    fn test_short_values_are_not_masked(value in "\\PC{0,10}") {
        prop_assert_eq!(mask(&value), value);
    }

    #[test]
    fn test_long_values_keep_head_and_tail(value in "\\PC{11,80}") {
        let masked = mask(&value);
        let chars: Vec<char> = value.chars().collect();
        let head: String = chars[..5].iter().collect();
        let tail: String = chars[chars.len() - 3..].iter().collect();

        prop_assert_eq!(masked.chars().count(), 11);
        prop_assert!(masked.starts_with(&head));
        prop_assert!(masked.ends_with(&tail));
        prop_assert!(masked.contains("..."));
    }

    #[test]
    fn test_query_params_round_trip(
        params in prop::collection::vec(("[a-zA-Z]{1,10}", "\\PC{0,20}"), 0..6)
    ) {
        let borrowed: Vec<(&str, Option<&str>)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), Some(v.as_str())))
            .collect();

        let url = add_query_params("https://pubsub.googleapis.com/v1/projects/p/topics", &borrowed)
            .unwrap();
        let parsed = url::Url::parse(&url).unwrap();
        let decoded: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();

        prop_assert_eq!(decoded, params.clone());
        prop_assert_eq!(parsed.path(), "/v1/projects/p/topics");
        if params.is_empty() {
            prop_assert!(!url.contains('?'));
        }
    }

    #[test]
    fn test_none_params_are_skipped(key in "[a-z]{1,10}") {
        let url = add_query_params("https://storage.googleapis.com/storage/v1/b", &[(key.as_str(), None)])
            .unwrap();

        prop_assert_eq!(url, "https://storage.googleapis.com/storage/v1/b");
    }

    #[test]
    fn test_valid_project_ids_accepted(id in "[a-z][a-z0-9-]{4,28}[a-z0-9]") {
        prop_assert!(validate_project_id(&id));
    }

    #[test]
    fn test_project_ids_with_uppercase_rejected(
        prefix in "[a-z][a-z0-9-]{2,10}",
        upper in "[A-Z]",
        suffix in "[a-z0-9]{2,10}",
    ) {
        let id = format!("{}{}{}", prefix, upper, suffix);
        prop_assert!(!validate_project_id(&id));
    }

    #[test]
    fn test_short_name_is_last_segment(
        segments in prop::collection::vec("[a-z0-9-]{1,12}", 1..6)
    ) {
        let path = segments.join("/");
        prop_assert_eq!(short_name(&path), segments.last().unwrap().as_str());
    }

    #[test]
    fn test_simple_field_paths_are_not_quoted(keys in prop::collection::btree_set("[a-z_][a-zA-Z0-9_]{0,12}", 0..8)) {
        let fields: Map<String, Value> = keys.iter().map(|k| (k.clone(), json!(1))).collect();

        let paths = field_paths(&fields);

        prop_assert_eq!(paths, keys.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_field_paths_with_symbols_are_quoted(key in "[a-z]{1,6}[ .-][a-z]{1,6}") {
        let fields: Map<String, Value> = [(key.clone(), json!(true))].into_iter().collect();

        prop_assert_eq!(field_paths(&fields), vec![format!("`{}`", key)]);
    }

    #[test]
    fn test_event_shapes_agree(
        bucket in "[a-z][a-z0-9-]{2,20}",
        name in "[a-zA-Z0-9/._-]{1,40}",
        id in "[0-9]{1,16}",
    ) {
        let object = json!({"bucket": bucket, "name": name});
        let structured = json!({"id": id, "type": "google.cloud.storage.object.v1.finalized", "data": object});

        let binary = StorageEvent::parse(object.to_string().as_bytes(), Some(&id)).unwrap();
        let wrapped = StorageEvent::parse(structured.to_string().as_bytes(), None).unwrap();

        prop_assert_eq!(&binary, &wrapped);
        prop_assert_eq!(binary.bucket, bucket);
        prop_assert_eq!(binary.name, name);
        prop_assert_eq!(binary.id, id);
    }

    #[test]
    fn test_event_without_bucket_rejected(name in "[a-z]{1,20}") {
        let body = json!({"name": name}).to_string();

        prop_assert_eq!(
            StorageEvent::parse(body.as_bytes(), None),
            Err(EventError::MissingField("bucket"))
        );
    }

    #[test]
    fn test_event_parse_never_panics(body in prop::collection::vec(any::<u8>(), 0..200)) {
        let _ = StorageEvent::parse(&body, None);
    }
}
