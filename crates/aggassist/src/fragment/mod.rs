//! Request side: aggregation fragments and their JSON rendering.

mod script;


use crate::{DEFAULT_TERMS_SIZE, assistant::Child, error::InternalError};
use serde::Serialize;
use serde_json::{Value as JsonValue, json};
use std::collections::{BTreeMap, btree_map::Entry};

// re-exports
pub use script::Script;

///
/// AggregationRequest
///
/// The body one node contributes to the query, before any sub-aggregations
/// are attached. Serializes to the engine's externally tagged form, e.g.
/// `{"terms":{"field":"schoolName","size":1000}}`.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationRequest {
    Terms(TermsRequest),
    ValueCount(FieldRequest),
    Sum(FieldRequest),
    Avg(FieldRequest),
    Min(FieldRequest),
    Max(FieldRequest),
    Cardinality(FieldRequest),
}

impl AggregationRequest {
    /// Terms aggregation over a field, capped at [`DEFAULT_TERMS_SIZE`].
    #[must_use]
    pub fn terms_field(field: impl Into<String>) -> Self {
        Self::Terms(TermsRequest {
            source: TermsSource::Field(field.into()),
            size: DEFAULT_TERMS_SIZE,
        })
    }

    /// Terms aggregation over a script, capped at [`DEFAULT_TERMS_SIZE`].
    #[must_use]
    pub const fn terms_script(script: Script) -> Self {
        Self::Terms(TermsRequest {
            source: TermsSource::Script(script),
            size: DEFAULT_TERMS_SIZE,
        })
    }

    /// Single-value metric aggregation over a field.
    #[must_use]
    pub fn metric(kind: MetricKind, field: impl Into<String>) -> Self {
        let body = FieldRequest {
            field: field.into(),
        };

        match kind {
            MetricKind::ValueCount => Self::ValueCount(body),
            MetricKind::Sum => Self::Sum(body),
            MetricKind::Avg => Self::Avg(body),
            MetricKind::Min => Self::Min(body),
            MetricKind::Max => Self::Max(body),
            MetricKind::Cardinality => Self::Cardinality(body),
        }
    }

    /// Engine tag for this request (`terms`, `avg`, ...).
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Terms(_) => "terms",
            Self::ValueCount(_) => MetricKind::ValueCount.as_str(),
            Self::Sum(_) => MetricKind::Sum.as_str(),
            Self::Avg(_) => MetricKind::Avg.as_str(),
            Self::Min(_) => MetricKind::Min.as_str(),
            Self::Max(_) => MetricKind::Max.as_str(),
            Self::Cardinality(_) => MetricKind::Cardinality.as_str(),
        }
    }
}

///
/// TermsRequest
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TermsRequest {
    #[serde(flatten)]
    pub source: TermsSource,
    pub size: u32,
}

///
/// TermsSource
///
/// What a terms aggregation groups by.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TermsSource {
    Field(String),
    Script(Script),
}

///
/// FieldRequest
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FieldRequest {
    pub field: String,
}

///
/// MetricKind
///
/// Single-value metric aggregations understood on both the request and the
/// response side.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MetricKind {
    ValueCount,
    Sum,
    Avg,
    Min,
    Max,
    Cardinality,
}

impl MetricKind {
    pub const ALL: [Self; 6] = [
        Self::ValueCount,
        Self::Sum,
        Self::Avg,
        Self::Min,
        Self::Max,
        Self::Cardinality,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValueCount => "value_count",
            Self::Sum => "sum",
            Self::Avg => "avg",
            Self::Min => "min",
            Self::Max => "max",
            Self::Cardinality => "cardinality",
        }
    }

    /// Resolve a typed-keys prefix back into a metric kind.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

///
/// Fragment
///
/// One node's request plus the fragments of its children, keyed by child
/// name. The name a fragment is attached under is the name its result comes
/// back under.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Fragment {
    #[serde(flatten)]
    request: AggregationRequest,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    aggs: BTreeMap<String, Self>,
}

impl Fragment {
    #[must_use]
    pub const fn new(request: AggregationRequest) -> Self {
        Self {
            request,
            aggs: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn request(&self) -> &AggregationRequest {
        &self.request
    }

    /// Attach a sub-fragment under `name`.
    /// Sibling names must be unique; a second attach under the same name fails.
    pub fn attach(&mut self, name: impl Into<String>, child: Self) -> Result<(), InternalError> {
        match self.aggs.entry(name.into()) {
            Entry::Vacant(slot) => {
                slot.insert(child);
                Ok(())
            }
            Entry::Occupied(slot) => Err(InternalError::fragment_conflict(slot.key())),
        }
    }

    /// Look up the sub-fragment attached under `name`.
    #[must_use]
    pub fn sub(&self, name: &str) -> Option<&Self> {
        self.aggs.get(name)
    }

    /// Names of the attached sub-fragments.
    pub fn sub_names(&self) -> impl Iterator<Item = &str> {
        self.aggs.keys().map(String::as_str)
    }

    /// Render this fragment as engine JSON.
    pub fn to_json(&self) -> Result<JsonValue, InternalError> {
        serde_json::to_value(self).map_err(|err| {
            InternalError::fragment_internal(format!("fragment serialization failed: {err}"))
        })
    }
}

/// Build a complete search body (`{"size":0,"aggs":{...}}`) from root nodes.
///
/// Hits are suppressed; only aggregations are requested.
pub fn build_request(roots: &[Child]) -> Result<JsonValue, InternalError> {
    let mut aggs = serde_json::Map::new();

    for root in roots {
        if aggs.contains_key(root.name()) {
            return Err(InternalError::fragment_conflict(root.name()));
        }
        let fragment = root.build_fragment()?;
        aggs.insert(root.name().to_string(), fragment.to_json()?);
    }

    Ok(json!({ "size": 0, "aggs": aggs }))
}
