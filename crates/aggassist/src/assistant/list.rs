use crate::{
    assistant::{Assistant, Child, RowContext},
    config::{AssistantConfig, MissingChildPolicy},
    error::{CollectError, InternalError},
    fragment::{AggregationRequest, Script},
    response::{AggregationResult, Bucket},
};
use std::{fmt, sync::Arc};
use tracing::{debug, trace};

///
/// FragmentBuilder
///
/// Strategy producing a list node's request body from the node's name.
///

pub type FragmentBuilder = Arc<dyn Fn(&str) -> AggregationRequest + Send + Sync>;

///
/// RowFactory
///
/// Turns one bucket's key and row context into a row; `None` drops the row.
///

pub type RowFactory<T> = Arc<dyn Fn(String, RowContext) -> Option<T> + Send + Sync>;

///
/// AggList
///
/// List node over a terms aggregation. Collecting yields one row per bucket,
/// in the order the engine returned the buckets, built by the row factory
/// from the bucket key and the bucket's row context.
///

pub struct AggList<T> {
    name: String,
    builder: FragmentBuilder,
    factory: RowFactory<T>,
    children: Vec<Child>,
    missing_child: MissingChildPolicy,
    trace_rows: bool,
}

impl<T> AggList<T>
where
    T: Send + 'static,
{
    /// List node with a custom request strategy.
    pub fn new<B, F>(name: impl Into<String>, builder: B, factory: F, children: Vec<Child>) -> Self
    where
        B: Fn(&str) -> AggregationRequest + Send + Sync + 'static,
        F: Fn(String, RowContext) -> Option<T> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            builder: Arc::new(builder),
            factory: Arc::new(factory),
            children,
            missing_child: MissingChildPolicy::default(),
            trace_rows: false,
        }
    }

    /// Group by the literal value of a field.
    pub fn list_field<F>(
        name: impl Into<String>,
        field: impl Into<String>,
        factory: F,
        children: Vec<Child>,
    ) -> Self
    where
        F: Fn(String, RowContext) -> Option<T> + Send + Sync + 'static,
    {
        let field = field.into();

        Self::new(
            name,
            move |_| AggregationRequest::terms_field(field.clone()),
            factory,
            children,
        )
    }

    /// Group by the result of a prepared script.
    pub fn list_script<F>(
        name: impl Into<String>,
        script: Script,
        factory: F,
        children: Vec<Child>,
    ) -> Self
    where
        F: Fn(String, RowContext) -> Option<T> + Send + Sync + 'static,
    {
        Self::new(
            name,
            move |_| AggregationRequest::terms_script(script.clone()),
            factory,
            children,
        )
    }

    /// Group by a server-stored script, referenced by id, with no params.
    pub fn list_script_id<F>(
        name: impl Into<String>,
        script_id: impl Into<String>,
        factory: F,
        children: Vec<Child>,
    ) -> Self
    where
        F: Fn(String, RowContext) -> Option<T> + Send + Sync + 'static,
    {
        Self::list_script(name, Script::stored(script_id), factory, children)
    }

    /// Group by an inline script given as source text.
    pub fn list_script_code<F>(
        name: impl Into<String>,
        source: impl Into<String>,
        factory: F,
        children: Vec<Child>,
    ) -> Self
    where
        F: Fn(String, RowContext) -> Option<T> + Send + Sync + 'static,
    {
        Self::list_script(name, Script::inline(source), factory, children)
    }

    #[must_use]
    pub fn with_missing_child(mut self, policy: MissingChildPolicy) -> Self {
        self.missing_child = policy;
        self
    }

    /// Apply the collect-time settings of a config.
    #[must_use]
    pub fn with_config(mut self, config: &AssistantConfig) -> Self {
        self.missing_child = config.missing_child;
        self.trace_rows = config.trace_rows;
        self
    }

    #[must_use]
    pub const fn missing_child(&self) -> MissingChildPolicy {
        self.missing_child
    }

    // Fresh context for one bucket: doc count plus every child's value.
    fn row_context(&self, bucket: &Bucket) -> Result<RowContext, InternalError> {
        let mut ctx = RowContext::for_bucket(bucket.doc_count);

        for child in &self.children {
            let Some(raw) = bucket.aggregations.get(child.name()) else {
                match self.missing_child {
                    MissingChildPolicy::Absent => {
                        trace!(
                            assistant = %self.name,
                            child = child.name(),
                            key = %bucket.key,
                            "child result absent from bucket"
                        );
                        continue;
                    }
                    MissingChildPolicy::Reject => {
                        return Err(CollectError::MissingChild {
                            node: self.name.clone(),
                            child: child.name().to_string(),
                        }
                        .into());
                    }
                }
            };

            ctx.insert_boxed(child.name(), child.collect_boxed(raw)?);
        }

        Ok(ctx)
    }
}

impl<T> Assistant for AggList<T>
where
    T: Send + 'static,
{
    type Output = Vec<T>;

    fn name(&self) -> &str {
        &self.name
    }

    fn children(&self) -> &[Child] {
        &self.children
    }

    fn fragment(&self) -> AggregationRequest {
        (self.builder)(&self.name)
    }

    fn collect(&self, raw: &AggregationResult) -> Result<Vec<T>, InternalError> {
        let Some(buckets) = raw.buckets() else {
            return Err(CollectError::UnsupportedShape {
                node: self.name.clone(),
                shape: raw.shape().to_string(),
            }
            .into());
        };

        debug!(
            assistant = %self.name,
            shape = raw.shape(),
            buckets = buckets.len(),
            "collecting list"
        );

        let mut rows = Vec::with_capacity(buckets.len());
        for bucket in buckets {
            let ctx = self.row_context(bucket)?;

            match (self.factory)(bucket.key_text(), ctx) {
                Some(row) => {
                    if self.trace_rows {
                        trace!(assistant = %self.name, key = %bucket.key, "row produced");
                    }
                    rows.push(row);
                }
                None => trace!(assistant = %self.name, key = %bucket.key, "row dropped"),
            }
        }

        Ok(rows)
    }
}

impl<T> Clone for AggList<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            builder: Arc::clone(&self.builder),
            factory: Arc::clone(&self.factory),
            children: self.children.clone(),
            missing_child: self.missing_child,
            trace_rows: self.trace_rows,
        }
    }
}

impl<T> fmt::Debug for AggList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggList")
            .field("name", &self.name)
            .field("children", &self.children)
            .field("missing_child", &self.missing_child)
            .finish_non_exhaustive()
    }
}
