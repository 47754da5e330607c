use crate::{
    error::{ErrorClass, ErrorOrigin},
    fragment::MetricKind,
    response::{AggregationResult, AggregationResults, Bucket, BucketKey},
};
use serde_json::json;
use std::str::FromStr;

// ---- typed keys --------------------------------------------------------

#[test]
fn typed_keys_resolve_shapes_and_strip_prefixes() {
    let results = AggregationResults::from_json(&json!({
        "sterms#school": {
            "doc_count_error_upper_bound": 0,
            "sum_other_doc_count": 3,
            "buckets": [
                { "key": "Oak", "doc_count": 8 },
                { "key": "Pine", "doc_count": 2 }
            ]
        },
        "lterms#grade": {
            "buckets": [{ "key": 1, "doc_count": 7 }]
        },
        "avg#avgAge": { "value": 12.5 },
        "histogram#ages": { "buckets": [] }
    }))
    .unwrap();

    assert_eq!(results.len(), 4);

    let school = results.get("school").unwrap();
    assert_eq!(school.shape(), "sterms");
    let AggregationResult::StringTerms(terms) = school else {
        panic!("expected string terms, got {school:?}");
    };
    assert_eq!(terms.sum_other_doc_count, 3);
    assert_eq!(
        terms.buckets,
        vec![Bucket::new("Oak", 8), Bucket::new("Pine", 2)]
    );

    assert_eq!(
        results.get("grade").unwrap(),
        &AggregationResult::long_terms([Bucket::new(1_i64, 7)])
    );
    assert_eq!(
        results.get("avgAge").unwrap(),
        &AggregationResult::metric(MetricKind::Avg, Some(12.5))
    );

    let ages = results.get("ages").unwrap();
    assert_eq!(ages.shape(), "histogram");
    assert!(ages.buckets().is_none());
}

#[test]
fn typed_keys_are_used_inside_buckets() {
    let results = AggregationResults::from_json(&json!({
        "sterms#school": {
            "buckets": [{
                "key": "Oak",
                "doc_count": 8,
                "lterms#grade": {
                    "buckets": [
                        { "key": 1, "key_as_string": "G1", "doc_count": 3 },
                        { "key": 2, "key_as_string": "G2", "doc_count": 5 }
                    ]
                },
                "max#oldest": { "value": null }
            }]
        }
    }))
    .unwrap();

    let buckets = results.get("school").unwrap().buckets().unwrap();
    let oak = &buckets[0];
    assert_eq!(oak.aggregations.len(), 2);

    let grades = oak.aggregations.get("grade").unwrap().buckets().unwrap();
    assert_eq!(grades[0].key, BucketKey::Long(1));
    assert_eq!(grades[0].key_text(), "G1");
    assert_eq!(grades[1].key_text(), "G2");

    assert_eq!(
        oak.aggregations.get("oldest").unwrap(),
        &AggregationResult::metric(MetricKind::Max, None)
    );
}

// ---- inferred shapes ---------------------------------------------------

#[test]
fn untyped_integer_keys_infer_long_terms() {
    let results = AggregationResults::from_json(&json!({
        "grade": { "buckets": [{ "key": 1, "doc_count": 7 }, { "key": 2, "doc_count": 2 }] },
        "school": { "buckets": [{ "key": "Oak", "doc_count": 1 }] },
        "empty": { "buckets": [] },
        "count": { "value": 10 },
        "weird": { "hits": [] }
    }))
    .unwrap();

    assert_eq!(results.get("grade").unwrap().shape(), "lterms");
    assert_eq!(results.get("school").unwrap().shape(), "sterms");
    assert_eq!(results.get("empty").unwrap().shape(), "sterms");
    assert_eq!(results.get("count").unwrap().shape(), "value");
    assert_eq!(results.get("weird").unwrap().shape(), "unknown");
}

#[test]
fn mixed_untyped_keys_fall_back_to_string_terms() {
    let results = AggregationResults::from_json(&json!({
        "mixed": { "buckets": [{ "key": 1, "doc_count": 1 }, { "key": "x", "doc_count": 1 }] }
    }))
    .unwrap();

    let buckets = results.get("mixed").unwrap().buckets().unwrap();
    assert_eq!(buckets[0].key, BucketKey::Str("1".to_string()));
    assert_eq!(buckets[1].key, BucketKey::Str("x".to_string()));
}

#[test]
fn keyed_filters_sibling_does_not_block_terms() {
    let results = AggregationResults::from_json(&json!({
        "school": { "buckets": [{ "key": "Oak", "doc_count": 8 }] },
        "levels": { "buckets": { "errors": { "doc_count": 3 } } }
    }))
    .unwrap();

    assert_eq!(
        results.get("school").unwrap(),
        &AggregationResult::string_terms([Bucket::new("Oak", 8)])
    );
    let levels = results.get("levels").unwrap();
    assert_eq!(levels.shape(), "unknown");
    assert!(levels.buckets().is_none());
}

#[test]
fn composite_sibling_does_not_block_terms() {
    let results = AggregationResults::from_json(&json!({
        "school": { "buckets": [{ "key": "Oak", "doc_count": 8 }] },
        "pairs": {
            "after_key": { "school": "Oak", "grade": 2 },
            "buckets": [{ "key": { "school": "Oak", "grade": 2 }, "doc_count": 4 }]
        }
    }))
    .unwrap();

    assert_eq!(results.get("school").unwrap().shape(), "sterms");
    assert_eq!(results.get("pairs").unwrap().shape(), "unknown");
}

#[test]
fn fractional_histogram_keys_are_not_terms() {
    let results = AggregationResults::from_json(&json!({
        "ages": { "buckets": [{ "key": 1.0, "doc_count": 2 }, { "key": 1.5, "doc_count": 1 }] }
    }))
    .unwrap();

    let ages = results.get("ages").unwrap();
    assert_eq!(ages.shape(), "unknown");
    assert!(ages.buckets().is_none());
}

#[test]
fn non_object_bucket_members_are_not_sub_aggregations() {
    let results = AggregationResults::from_json(&json!({
        "school": { "buckets": [{ "key": "Oak", "doc_count": 1, "doc_count_error_upper_bound": 0, "score": 3 }] }
    }))
    .unwrap();

    let buckets = results.get("school").unwrap().buckets().unwrap();
    assert!(buckets[0].aggregations.is_empty());
}

// ---- response wrappers -------------------------------------------------

#[test]
fn response_without_aggregations_is_empty() {
    let results = AggregationResults::from_response_json(&json!({ "took": 3 })).unwrap();

    assert!(results.is_empty());
}

#[test]
fn response_aggregations_member_is_parsed() {
    let results = AggregationResults::from_response_json(&json!({
        "took": 3,
        "aggregations": { "sterms#school": { "buckets": [] } }
    }))
    .unwrap();

    assert!(results.contains_key("school"));
}

#[test]
fn from_str_parses_text() {
    let results =
        AggregationResults::from_str(r#"{"lterms#grade":{"buckets":[{"key":3,"doc_count":1}]}}"#)
            .unwrap();

    assert_eq!(
        results.get("grade").unwrap(),
        &AggregationResult::long_terms([Bucket::new(3_i64, 1)])
    );
}

// ---- corruption --------------------------------------------------------

#[test]
fn malformed_inputs_are_response_corruption() {
    let cases = [
        json!([]),
        json!({ "sterms#a": { "buckets": {} } }),
        json!({ "sterms#a": { "buckets": [{ "key": "x" }] } }),
        json!({ "sterms#a": { "buckets": [{ "key": "x", "doc_count": -1 }] } }),
        json!({ "sterms#a": { "buckets": [7] } }),
        json!({ "sterms#a": { "buckets": [{ "doc_count": 1 }] } }),
        json!({ "sterms#a": { "buckets": [{ "key": [1], "doc_count": 1 }] } }),
        json!({ "lterms#a": { "buckets": [{ "key": "x", "doc_count": 1 }] } }),
        json!({ "lterms#a": { "buckets": [{ "key": 1.5, "doc_count": 1 }] } }),
        json!({ "avg#a": { "value": "high" } }),
    ];

    for case in cases {
        let err = AggregationResults::from_json(&case)
            .expect_err(&format!("{case} should be rejected"));

        assert_eq!(err.class, ErrorClass::Corruption, "{case}");
        assert_eq!(err.origin, ErrorOrigin::Response, "{case}");
    }
}

#[test]
fn invalid_json_text_is_response_corruption() {
    let err = AggregationResults::from_str("{not json").unwrap_err();

    assert_eq!(err.class, ErrorClass::Corruption);
    assert!(
        err.display_with_class()
            .starts_with("response:corruption: aggregations are not valid JSON")
    );
}

// ---- buckets -----------------------------------------------------------

#[test]
fn key_text_prefers_engine_formatting() {
    assert_eq!(Bucket::new(42_i64, 1).key_text(), "42");
    assert_eq!(Bucket::new(-3_i64, 1).key_text(), "-3");
    assert_eq!(Bucket::new("math", 1).key_text(), "math");
    assert_eq!(
        Bucket::new(1_700_000_000_000_i64, 1)
            .with_key_as_string("2023-11-14")
            .key_text(),
        "2023-11-14"
    );
}

#[test]
fn only_terms_shapes_expose_buckets() {
    assert!(AggregationResult::string_terms([]).buckets().is_some());
    assert!(AggregationResult::long_terms([]).buckets().is_some());
    assert!(
        AggregationResult::metric(MetricKind::Sum, Some(1.0))
            .buckets()
            .is_none()
    );
}
