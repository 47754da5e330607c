use crate::{
    assistant::Assistant,
    error::{CollectError, InternalError},
    fragment::{AggregationRequest, MetricKind},
    response::AggregationResult,
};
use tracing::debug;

///
/// AggValue
///
/// Leaf node over a single-value metric (count, sum, avg, ...). Collects
/// to the metric's value, `None` when the engine reported null.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AggValue {
    name: String,
    kind: MetricKind,
    field: String,
}

impl AggValue {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: MetricKind, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            field: field.into(),
        }
    }

    #[must_use]
    pub fn value_count(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, MetricKind::ValueCount, field)
    }

    #[must_use]
    pub fn sum(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, MetricKind::Sum, field)
    }

    #[must_use]
    pub fn avg(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, MetricKind::Avg, field)
    }

    #[must_use]
    pub fn min(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, MetricKind::Min, field)
    }

    #[must_use]
    pub fn max(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, MetricKind::Max, field)
    }

    #[must_use]
    pub fn cardinality(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, MetricKind::Cardinality, field)
    }

    #[must_use]
    pub const fn kind(&self) -> MetricKind {
        self.kind
    }
}

impl Assistant for AggValue {
    type Output = Option<f64>;

    fn name(&self) -> &str {
        &self.name
    }

    fn fragment(&self) -> AggregationRequest {
        AggregationRequest::metric(self.kind, self.field.clone())
    }

    fn collect(&self, raw: &AggregationResult) -> Result<Option<f64>, InternalError> {
        match raw {
            AggregationResult::SingleValue(metric) => {
                debug!(assistant = %self.name, shape = raw.shape(), "collecting value");
                Ok(metric.value)
            }
            _ => Err(CollectError::UnsupportedShape {
                node: self.name.clone(),
                shape: raw.shape().to_string(),
            }
            .into()),
        }
    }
}
