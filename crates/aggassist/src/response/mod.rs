//! Response side: the parsed aggregation result tree.
//!
//! The engine's loosely shaped JSON is resolved into [`AggregationResult`]
//! once, here. Collectors only ever match on the enum.

mod parse;

#[cfg(test)]
mod tests;

use crate::{error::InternalError, fragment::MetricKind};
use derive_more::{Deref, Display, IntoIterator};
use serde_json::Value as JsonValue;
use std::{collections::BTreeMap, str::FromStr};

///
/// AggregationResults
///
/// Named aggregation results at one level of the response tree.
/// Names are the plain node names; typed-key prefixes are already stripped.
///

#[derive(Clone, Debug, Default, Deref, IntoIterator, PartialEq)]
pub struct AggregationResults(BTreeMap<String, AggregationResult>);

impl AggregationResults {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add one named result; later inserts replace earlier ones.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, result: AggregationResult) -> Self {
        self.insert(name, result);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, result: AggregationResult) {
        self.0.insert(name.into(), result);
    }

    /// Parse the engine's `aggregations` object.
    ///
    /// Keys in `type#name` form (typed keys) decide the shape explicitly;
    /// plain keys have their shape inferred from the body.
    ///
    /// Inference is limited. A plain body reads as terms only when its
    /// `buckets` array holds string or integer keys, so keyed `filters` or
    /// `range` results, `composite` keys and fractional `histogram` keys
    /// become [`AggregationResult::Other`]. An integer-keyed
    /// `date_histogram` still reads as numeric terms; request typed keys
    /// when such siblings share a level with list nodes.
    pub fn from_json(value: &JsonValue) -> Result<Self, InternalError> {
        parse::parse_results(value)
    }

    /// Parse a full search response, reading its `aggregations` member.
    /// A response without aggregations yields an empty set.
    pub fn from_response_json(response: &JsonValue) -> Result<Self, InternalError> {
        match response.get("aggregations") {
            Some(aggregations) => Self::from_json(aggregations),
            None => Ok(Self::new()),
        }
    }
}

impl FromStr for AggregationResults {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: JsonValue = serde_json::from_str(s).map_err(|err| {
            InternalError::response_corruption(format!("aggregations are not valid JSON: {err}"))
        })?;

        Self::from_json(&value)
    }
}

///
/// AggregationResult
///
/// The raw result of one aggregation, resolved to a closed set of shapes.
///

#[derive(Clone, Debug, PartialEq)]
pub enum AggregationResult {
    StringTerms(Terms),
    LongTerms(Terms),
    SingleValue(MetricValue),
    Other { kind: String, body: JsonValue },
}

impl AggregationResult {
    /// String-keyed terms result from buckets.
    #[must_use]
    pub fn string_terms(buckets: impl IntoIterator<Item = Bucket>) -> Self {
        Self::StringTerms(Terms::new(buckets))
    }

    /// Numeric-keyed terms result from buckets.
    #[must_use]
    pub fn long_terms(buckets: impl IntoIterator<Item = Bucket>) -> Self {
        Self::LongTerms(Terms::new(buckets))
    }

    /// Single-value metric result.
    #[must_use]
    pub fn metric(kind: MetricKind, value: Option<f64>) -> Self {
        Self::SingleValue(MetricValue {
            kind: kind.as_str().to_string(),
            value,
            value_as_string: None,
        })
    }

    /// Shape tag, as the engine names it in typed keys.
    #[must_use]
    pub fn shape(&self) -> &str {
        match self {
            Self::StringTerms(_) => "sterms",
            Self::LongTerms(_) => "lterms",
            Self::SingleValue(metric) => &metric.kind,
            Self::Other { kind, .. } => kind,
        }
    }

    /// Ordered buckets for the bucketed shapes, `None` for everything else.
    #[must_use]
    pub fn buckets(&self) -> Option<&[Bucket]> {
        match self {
            Self::StringTerms(terms) | Self::LongTerms(terms) => Some(&terms.buckets),
            Self::SingleValue(_) | Self::Other { .. } => None,
        }
    }
}

///
/// Terms
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Terms {
    pub buckets: Vec<Bucket>,
    pub doc_count_error_upper_bound: u64,
    pub sum_other_doc_count: u64,
}

impl Terms {
    #[must_use]
    pub fn new(buckets: impl IntoIterator<Item = Bucket>) -> Self {
        Self {
            buckets: buckets.into_iter().collect(),
            doc_count_error_upper_bound: 0,
            sum_other_doc_count: 0,
        }
    }
}

///
/// Bucket
///
/// One group of a terms result: its key, document count and the nested
/// results of the sub-aggregations attached under it.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Bucket {
    pub key: BucketKey,
    pub key_as_string: Option<String>,
    pub doc_count: u64,
    pub aggregations: AggregationResults,
}

impl Bucket {
    #[must_use]
    pub fn new(key: impl Into<BucketKey>, doc_count: u64) -> Self {
        Self {
            key: key.into(),
            key_as_string: None,
            doc_count,
            aggregations: AggregationResults::new(),
        }
    }

    /// Attach a nested result under `name`.
    #[must_use]
    pub fn with_sub(mut self, name: impl Into<String>, result: AggregationResult) -> Self {
        self.aggregations.insert(name, result);
        self
    }

    #[must_use]
    pub fn with_key_as_string(mut self, key: impl Into<String>) -> Self {
        self.key_as_string = Some(key.into());
        self
    }

    /// Textual key handed to row factories.
    /// Prefers the engine-formatted key, falling back to the raw key.
    #[must_use]
    pub fn key_text(&self) -> String {
        match &self.key_as_string {
            Some(text) => text.clone(),
            None => self.key.to_string(),
        }
    }
}

///
/// BucketKey
///

#[derive(Clone, Debug, Display, Eq, Hash, PartialEq)]
pub enum BucketKey {
    #[display("{_0}")]
    Str(String),
    #[display("{_0}")]
    Long(i64),
}

impl From<&str> for BucketKey {
    fn from(key: &str) -> Self {
        Self::Str(key.to_string())
    }
}

impl From<String> for BucketKey {
    fn from(key: String) -> Self {
        Self::Str(key)
    }
}

impl From<i64> for BucketKey {
    fn from(key: i64) -> Self {
        Self::Long(key)
    }
}

///
/// MetricValue
///
/// Result of a single-value metric. `value` is `None` when the engine
/// reports null (e.g. `avg` over no documents).
///

#[derive(Clone, Debug, PartialEq)]
pub struct MetricValue {
    pub kind: String,
    pub value: Option<f64>,
    pub value_as_string: Option<String>,
}
