use crate::{
    error::InternalError,
    fragment::MetricKind,
    response::{AggregationResult, AggregationResults, Bucket, BucketKey, MetricValue, Terms},
};
use serde_json::{Map, Value as JsonValue};

///
/// CONSTANTS
///

const TYPED_KEY_DELIMITER: char = '#';
const STRING_TERMS_TAG: &str = "sterms";
const LONG_TERMS_TAG: &str = "lterms";
const UNTYPED_METRIC_TAG: &str = "value";
const UNKNOWN_TAG: &str = "unknown";

/// Bucket members that are never sub-aggregations.
const BUCKET_RESERVED: [&str; 4] = [
    "key",
    "key_as_string",
    "doc_count",
    "doc_count_error_upper_bound",
];

///
/// KeyKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum KeyKind {
    Str,
    Long,
}

pub(super) fn parse_results(value: &JsonValue) -> Result<AggregationResults, InternalError> {
    let object = value.as_object().ok_or_else(|| {
        InternalError::response_corruption(format!(
            "aggregations must be a JSON object, found {}",
            json_kind(value)
        ))
    })?;

    parse_object(object, |_, _| false)
}

// Parse every member of `object` as a named aggregation, skipping the
// members `skip` rejects.
fn parse_object(
    object: &Map<String, JsonValue>,
    skip: impl Fn(&str, &JsonValue) -> bool,
) -> Result<AggregationResults, InternalError> {
    let mut results = AggregationResults::new();

    for (raw_name, body) in object {
        if skip(raw_name, body) {
            continue;
        }
        let (name, result) = parse_entry(raw_name, body)?;
        results.insert(name, result);
    }

    Ok(results)
}

fn parse_entry(raw_name: &str, body: &JsonValue) -> Result<(String, AggregationResult), InternalError> {
    match raw_name.split_once(TYPED_KEY_DELIMITER) {
        Some((tag, name)) => Ok((name.to_string(), parse_typed(tag, name, body)?)),
        None => Ok((raw_name.to_string(), parse_inferred(raw_name, body)?)),
    }
}

fn parse_typed(tag: &str, name: &str, body: &JsonValue) -> Result<AggregationResult, InternalError> {
    match tag {
        STRING_TERMS_TAG => parse_terms(name, body, KeyKind::Str).map(AggregationResult::StringTerms),
        LONG_TERMS_TAG => parse_terms(name, body, KeyKind::Long).map(AggregationResult::LongTerms),
        _ if MetricKind::from_tag(tag).is_some() => {
            parse_metric(tag, name, body).map(AggregationResult::SingleValue)
        }
        _ => Ok(AggregationResult::Other {
            kind: tag.to_string(),
            body: body.clone(),
        }),
    }
}

fn parse_inferred(name: &str, body: &JsonValue) -> Result<AggregationResult, InternalError> {
    if let Some(key_kind) = infer_terms(body) {
        let terms = parse_terms(name, body, key_kind)?;

        return Ok(match key_kind {
            KeyKind::Long => AggregationResult::LongTerms(terms),
            KeyKind::Str => AggregationResult::StringTerms(terms),
        });
    }

    if body.get("value").is_some() {
        return parse_metric(UNTYPED_METRIC_TAG, name, body).map(AggregationResult::SingleValue);
    }

    Ok(AggregationResult::Other {
        kind: UNKNOWN_TAG.to_string(),
        body: body.clone(),
    })
}

// A plain-key body reads as terms only when `buckets` is an array of
// objects with a count and a string or integer key. Keyed buckets,
// composite keys and fractional histogram keys fall through to `Other`.
fn infer_terms(body: &JsonValue) -> Option<KeyKind> {
    let buckets = body.get("buckets")?.as_array()?;

    let mut all_long = true;
    for bucket in buckets {
        if bucket.get("doc_count").and_then(JsonValue::as_u64).is_none() {
            return None;
        }
        match bucket.get("key")? {
            JsonValue::String(_) => all_long = false,
            JsonValue::Number(n) if n.is_i64() => {}
            _ => return None,
        }
    }

    if all_long && !buckets.is_empty() {
        Some(KeyKind::Long)
    } else {
        Some(KeyKind::Str)
    }
}

fn parse_terms(name: &str, body: &JsonValue, key_kind: KeyKind) -> Result<Terms, InternalError> {
    let buckets = body
        .get("buckets")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| {
            InternalError::response_corruption(format!(
                "terms aggregation '{name}' has no bucket array"
            ))
        })?;

    let buckets = buckets
        .iter()
        .enumerate()
        .map(|(index, bucket)| parse_bucket(name, index, bucket, key_kind))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Terms {
        buckets,
        doc_count_error_upper_bound: optional_count(body, "doc_count_error_upper_bound"),
        sum_other_doc_count: optional_count(body, "sum_other_doc_count"),
    })
}

fn parse_bucket(
    name: &str,
    index: usize,
    bucket: &JsonValue,
    key_kind: KeyKind,
) -> Result<Bucket, InternalError> {
    let corrupt = |what: &str| {
        InternalError::response_corruption(format!("bucket {index} of '{name}' {what}"))
    };

    let object = bucket
        .as_object()
        .ok_or_else(|| corrupt("is not a JSON object"))?;

    let doc_count = object
        .get("doc_count")
        .and_then(JsonValue::as_u64)
        .ok_or_else(|| corrupt("has no non-negative doc_count"))?;

    let raw_key = object.get("key").ok_or_else(|| corrupt("has no key"))?;
    let key = match (key_kind, raw_key) {
        (KeyKind::Long, JsonValue::Number(n)) => n
            .as_i64()
            .map(BucketKey::Long)
            .ok_or_else(|| corrupt("has a non-integer key in a numeric terms result"))?,
        (KeyKind::Long, _) => return Err(corrupt("has a non-numeric key in a numeric terms result")),
        (KeyKind::Str, JsonValue::String(s)) => BucketKey::Str(s.clone()),
        (KeyKind::Str, JsonValue::Number(n)) => BucketKey::Str(n.to_string()),
        (KeyKind::Str, JsonValue::Bool(b)) => BucketKey::Str(b.to_string()),
        (KeyKind::Str, _) => return Err(corrupt("has a key that is not a scalar")),
    };

    let key_as_string = object
        .get("key_as_string")
        .and_then(JsonValue::as_str)
        .map(str::to_string);

    let aggregations = parse_object(object, |member, body| {
        BUCKET_RESERVED.contains(&member) || !body.is_object()
    })?;

    Ok(Bucket {
        key,
        key_as_string,
        doc_count,
        aggregations,
    })
}

fn parse_metric(tag: &str, name: &str, body: &JsonValue) -> Result<MetricValue, InternalError> {
    let value = match body.get("value") {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::Number(n)) => n.as_f64(),
        Some(other) => {
            return Err(InternalError::response_corruption(format!(
                "metric aggregation '{name}' has a {} value",
                json_kind(other)
            )));
        }
    };

    Ok(MetricValue {
        kind: tag.to_string(),
        value,
        value_as_string: body
            .get("value_as_string")
            .and_then(JsonValue::as_str)
            .map(str::to_string),
    })
}

fn optional_count(body: &JsonValue, member: &str) -> u64 {
    body.get(member).and_then(JsonValue::as_u64).unwrap_or(0)
}

const fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
